//! Credential verification service trait.

use async_trait::async_trait;

use super::model::{Credentials, Registration};
use crate::error::Result;
use crate::identity::Identity;

/// External collaborator that owns password verification and account
/// uniqueness.
///
/// Implementations map rejected credentials to `ProvenError::Api` with the
/// service's status (401, 422, 409, 500) and message.
#[async_trait]
pub trait CredentialService: Send + Sync {
    /// Verifies the credentials and returns the identity they belong to.
    async fn authenticate(&self, credentials: &Credentials) -> Result<Identity>;

    /// Creates an account and returns the service's confirmation message.
    async fn register(&self, registration: &Registration) -> Result<String>;
}
