//! HTTP implementation of the credential verification service.

use async_trait::async_trait;
use proven_core::auth::{CredentialService, Credentials, Registration};
use proven_core::error::{ProvenError, Result};
use proven_core::identity::Identity;

use super::client::{ApiClient, send};
use super::envelope::{ApiEnvelope, LoginEnvelope, interpret};

const LOGIN_ENDPOINT: &str = "login.php";
const REGISTER_ENDPOINT: &str = "register.php";

/// Talks to `login.php` and `register.php`.
#[derive(Clone)]
pub struct HttpCredentialService {
    api: ApiClient,
}

impl HttpCredentialService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl CredentialService for HttpCredentialService {
    async fn authenticate(&self, credentials: &Credentials) -> Result<Identity> {
        tracing::debug!(email = %credentials.email, "Sending login request");
        let (status, body) = send(self.api.post(LOGIN_ENDPOINT).json(credentials)).await?;

        let envelope: LoginEnvelope<Identity> = interpret(status, &body, "Login failed")?;
        envelope
            .user
            .ok_or_else(|| ProvenError::api(status, "Login failed"))
    }

    async fn register(&self, registration: &Registration) -> Result<String> {
        tracing::debug!(email = %registration.email, "Sending registration request");
        let (status, body) = send(self.api.post(REGISTER_ENDPOINT).json(registration)).await?;

        let envelope: ApiEnvelope<serde_json::Value> =
            interpret(status, &body, "Registration failed")?;
        Ok(envelope
            .message
            .unwrap_or_else(|| "User registered successfully".to_string()))
    }
}
