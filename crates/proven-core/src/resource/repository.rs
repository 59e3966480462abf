//! Resource repository trait.

use async_trait::async_trait;

use super::kind::Resource;
use super::model::RecordId;
use crate::error::Result;
use crate::identity::UserId;

/// Confirmation returned by an endpoint for a successful mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationAck {
    pub message: Option<String>,
}

/// CRUD access to one resource category, scoped by owning user.
///
/// A rejected request (`success: false` or a non-2xx status) is returned as
/// `ProvenError::Api` carrying the endpoint's message.
#[async_trait]
pub trait ResourceRepository<R: Resource>: Send + Sync {
    async fn fetch(&self, owner: &UserId) -> Result<R::Collection>;

    async fn create(&self, owner: &UserId, form: &R::Form) -> Result<MutationAck>;

    async fn update(&self, owner: &UserId, id: &RecordId, form: &R::Form) -> Result<MutationAck>;

    async fn delete(&self, owner: &UserId, id: &RecordId) -> Result<MutationAck>;
}
