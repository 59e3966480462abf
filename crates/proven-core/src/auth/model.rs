//! Credential request models.

use serde::{Deserialize, Serialize};

use crate::error::{ProvenError, Result};

/// Email/password pair sent to the credential service.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_string(),
            password: password.into(),
        }
    }

    /// Mirrors the checks the service performs, so obviously bad input never
    /// leaves the client.
    pub fn validate(&self) -> Result<()> {
        if self.email.is_empty() || self.password.is_empty() {
            return Err(ProvenError::validation("Email and password are required"));
        }
        validate_email(&self.email)
    }
}

// Never print the password.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// New account request.
#[derive(Clone, Serialize, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Registration {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into().trim().to_string(),
            email: email.into().trim().to_string(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() || self.email.is_empty() || self.password.is_empty() {
            return Err(ProvenError::validation(
                "Name, email and password are required",
            ));
        }
        validate_email(&self.email)
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Rough shape check: one `@`, non-empty local part, dotted domain, no spaces.
fn validate_email(email: &str) -> Result<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(ProvenError::validation("Invalid email address"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_require_both_fields() {
        let err = Credentials::new("", "secret").validate().unwrap_err();
        assert_eq!(err.user_message(""), "Email and password are required");
        assert!(Credentials::new("a@b.io", "").validate().is_err());
    }

    #[test]
    fn test_credentials_trim_email() {
        let credentials = Credentials::new("  ada@example.com ", "pw");
        assert_eq!(credentials.email, "ada@example.com");
        assert!(credentials.validate().is_ok());
    }

    #[test]
    fn test_invalid_emails() {
        for email in ["ada", "ada@", "@example.com", "ada@example", "a da@example.com", "a@b@c.d"] {
            assert!(
                Credentials::new(email, "pw").validate().is_err(),
                "{} should be rejected",
                email
            );
        }
    }

    #[test]
    fn test_registration_requires_name() {
        let err = Registration::new(" ", "ada@example.com", "pw")
            .validate()
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_debug_hides_password() {
        let rendered = format!("{:?}", Credentials::new("ada@example.com", "hunter2"));
        assert!(!rendered.contains("hunter2"));
    }
}
