//! HTTP implementation of the resource repositories.

use async_trait::async_trait;
use proven_core::error::Result;
use proven_core::identity::UserId;
use proven_core::resource::{MutationAck, RecordId, Resource, ResourceRepository};
use std::marker::PhantomData;

use super::client::{ApiClient, send};
use super::envelope::{ApiEnvelope, interpret, interpret_read};

/// Repository for one resource category backed by its `*.php` endpoint.
///
/// The owner's id travels as the `user_id` query parameter on every call;
/// item operations add `id`.
pub struct HttpResourceRepository<R> {
    api: ApiClient,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> HttpResourceRepository<R> {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            _resource: PhantomData,
        }
    }

    fn endpoint(&self) -> &'static str {
        R::KIND.endpoint()
    }

    /// Query identifying one record. Singletons are addressed by owner only.
    fn item_query<'a>(&self, owner: &'a UserId, id: &'a RecordId) -> Vec<(&'static str, &'a str)> {
        let mut query = vec![("user_id", owner.as_str())];
        if !R::SINGLETON {
            query.push(("id", id.as_str()));
        }
        query
    }

    fn failure(&self, verb: &str) -> String {
        format!("Failed to {} {}", verb, R::KIND.label().to_lowercase())
    }

    async fn mutate(&self, request: reqwest::RequestBuilder, verb: &str) -> Result<MutationAck> {
        let (status, body) = send(request).await?;
        let envelope: ApiEnvelope<serde_json::Value> =
            interpret(status, &body, &self.failure(verb))?;
        Ok(MutationAck {
            message: envelope.message,
        })
    }
}

impl<R> Clone for HttpResourceRepository<R> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            _resource: PhantomData,
        }
    }
}

#[async_trait]
impl<R: Resource> ResourceRepository<R> for HttpResourceRepository<R> {
    async fn fetch(&self, owner: &UserId) -> Result<R::Collection> {
        let request = self
            .api
            .get(self.endpoint())
            .query(&[("user_id", owner.as_str())]);
        let (status, body) = send(request).await?;
        interpret_read(status, &body, &self.failure("load"))
    }

    async fn create(&self, owner: &UserId, form: &R::Form) -> Result<MutationAck> {
        let request = self
            .api
            .post(self.endpoint())
            .query(&[("user_id", owner.as_str())])
            .json(form);
        self.mutate(request, "save").await
    }

    async fn update(&self, owner: &UserId, id: &RecordId, form: &R::Form) -> Result<MutationAck> {
        let request = self
            .api
            .put(self.endpoint())
            .query(&self.item_query(owner, id))
            .json(form);
        self.mutate(request, "save").await
    }

    async fn delete(&self, owner: &UserId, id: &RecordId) -> Result<MutationAck> {
        let request = self
            .api
            .delete(self.endpoint())
            .query(&self.item_query(owner, id));
        self.mutate(request, "delete").await
    }
}

/// The four HTTP repositories sharing one client.
pub struct HttpResourceRepositories {
    pub profile: HttpResourceRepository<proven_core::resource::ProfileResource>,
    pub work_experience: HttpResourceRepository<proven_core::resource::WorkExperienceResource>,
    pub referees: HttpResourceRepository<proven_core::resource::RefereeResource>,
    pub cvs: HttpResourceRepository<proven_core::resource::CvResource>,
}

impl HttpResourceRepositories {
    pub fn new(api: &ApiClient) -> Self {
        Self {
            profile: HttpResourceRepository::new(api.clone()),
            work_experience: HttpResourceRepository::new(api.clone()),
            referees: HttpResourceRepository::new(api.clone()),
            cvs: HttpResourceRepository::new(api.clone()),
        }
    }
}
