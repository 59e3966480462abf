//! In-memory repository doubles shared by the application tests.

use async_trait::async_trait;
use proven_core::error::{ProvenError, Result};
use proven_core::identity::UserId;
use proven_core::resource::{
    CvResource, MutationAck, ProfileResource, RecordId, RefereeResource, Resource,
    ResourceRepository, WorkExperienceResource,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::dashboard::ResourceRepositories;

/// Mutation observed by a [`MockRepository`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create(UserId),
    Update(UserId, RecordId),
    Delete(UserId, RecordId),
}

pub struct MockRepository<R: Resource> {
    collections: Mutex<HashMap<String, R::Collection>>,
    delays: Mutex<HashMap<String, Duration>>,
    fetch_failures: Mutex<HashMap<String, ProvenError>>,
    mutation_failure: Mutex<Option<ProvenError>>,
    mutation_delay: Mutex<Option<Duration>>,
    calls: Mutex<Vec<Call>>,
    fetches: AtomicUsize,
}

impl<R: Resource> MockRepository<R> {
    pub fn new() -> Self {
        Self {
            collections: Mutex::new(HashMap::new()),
            delays: Mutex::new(HashMap::new()),
            fetch_failures: Mutex::new(HashMap::new()),
            mutation_failure: Mutex::new(None),
            mutation_delay: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn set(&self, owner: &str, collection: R::Collection) {
        self.collections
            .lock()
            .unwrap()
            .insert(owner.to_string(), collection);
    }

    pub fn delay_for(&self, owner: &str, delay: Duration) {
        self.delays.lock().unwrap().insert(owner.to_string(), delay);
    }

    pub fn fail_fetch_for(&self, owner: &str, error: ProvenError) {
        self.fetch_failures
            .lock()
            .unwrap()
            .insert(owner.to_string(), error);
    }

    pub fn heal(&self, owner: &str) {
        self.fetch_failures.lock().unwrap().remove(owner);
    }

    pub fn fail_mutations(&self, error: ProvenError) {
        *self.mutation_failure.lock().unwrap() = Some(error);
    }

    pub fn delay_mutations(&self, delay: Duration) {
        *self.mutation_delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    async fn mutate(&self, call: Call) -> Result<MutationAck> {
        self.calls.lock().unwrap().push(call);
        let delay = *self.mutation_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let failure = self.mutation_failure.lock().unwrap().clone();
        match failure {
            Some(error) => Err(error),
            None => Ok(MutationAck::default()),
        }
    }
}

#[async_trait]
impl<R: Resource> ResourceRepository<R> for MockRepository<R> {
    async fn fetch(&self, owner: &UserId) -> Result<R::Collection> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let delay = self.delays.lock().unwrap().get(owner.as_str()).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let failure = self
            .fetch_failures
            .lock()
            .unwrap()
            .get(owner.as_str())
            .cloned();
        if let Some(error) = failure {
            return Err(error);
        }
        Ok(self
            .collections
            .lock()
            .unwrap()
            .get(owner.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn create(&self, owner: &UserId, _form: &R::Form) -> Result<MutationAck> {
        self.mutate(Call::Create(owner.clone())).await
    }

    async fn update(&self, owner: &UserId, id: &RecordId, _form: &R::Form) -> Result<MutationAck> {
        self.mutate(Call::Update(owner.clone(), id.clone())).await
    }

    async fn delete(&self, owner: &UserId, id: &RecordId) -> Result<MutationAck> {
        self.mutate(Call::Delete(owner.clone(), id.clone())).await
    }
}

/// The four mocks, kept typed so tests can configure them after wiring.
pub struct MockRepositories {
    pub profile: Arc<MockRepository<ProfileResource>>,
    pub work_experience: Arc<MockRepository<WorkExperienceResource>>,
    pub referees: Arc<MockRepository<RefereeResource>>,
    pub cvs: Arc<MockRepository<CvResource>>,
}

impl MockRepositories {
    pub fn new() -> Self {
        Self {
            profile: Arc::new(MockRepository::new()),
            work_experience: Arc::new(MockRepository::new()),
            referees: Arc::new(MockRepository::new()),
            cvs: Arc::new(MockRepository::new()),
        }
    }

    pub fn delay_for(&self, owner: &str, delay: Duration) {
        self.profile.delay_for(owner, delay);
        self.work_experience.delay_for(owner, delay);
        self.referees.delay_for(owner, delay);
        self.cvs.delay_for(owner, delay);
    }

    pub fn wire(&self) -> ResourceRepositories {
        ResourceRepositories {
            profile: self.profile.clone(),
            work_experience: self.work_experience.clone(),
            referees: self.referees.clone(),
            cvs: self.cvs.clone(),
        }
    }
}
