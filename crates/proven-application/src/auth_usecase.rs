//! Sign-in, registration and sign-out.

use proven_core::auth::{CredentialService, Credentials, Registration};
use proven_core::error::{ProvenError, Result};
use proven_core::identity::Identity;
use std::sync::Arc;

use crate::session::SessionLifecycleManager;

/// Use case for the credential flows.
///
/// Client-side checks run first; the credential service is only called with
/// input that passed them. A successful sign-in hands the issued identity to
/// the lifecycle manager, which persists it.
pub struct AuthUseCase {
    credentials: Arc<dyn CredentialService>,
    session: SessionLifecycleManager,
}

impl AuthUseCase {
    pub fn new(credentials: Arc<dyn CredentialService>, session: SessionLifecycleManager) -> Self {
        Self {
            credentials,
            session,
        }
    }

    pub async fn sign_in(&self, credentials: Credentials) -> Result<Identity> {
        credentials.validate()?;

        let state = self.session.state();
        if state.is_authenticated() {
            return Err(ProvenError::InvalidTransition {
                action: "log in",
                state: state.name(),
            });
        }

        let identity = self.credentials.authenticate(&credentials).await?;
        tracing::debug!("Credential service issued identity {}", identity.id);
        self.session.login(identity.clone()).await?;
        Ok(identity)
    }

    /// Creates an account. Does not sign in.
    ///
    /// Returns the service's confirmation message.
    pub async fn register(&self, registration: Registration) -> Result<String> {
        registration.validate()?;
        let message = self.credentials.register(&registration).await?;
        tracing::info!("Registered account for {}", registration.email);
        Ok(message)
    }

    pub async fn sign_out(&self) -> Result<()> {
        self.session.logout().await
    }

    pub fn session(&self) -> &SessionLifecycleManager {
        &self.session
    }
}
