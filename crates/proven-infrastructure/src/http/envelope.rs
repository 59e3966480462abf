//! Response envelope shared by every endpoint: `{success, message?, data?}`.

use proven_core::error::{ProvenError, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;

#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
}

/// Login responses carry the identity under `user` instead of `data`.
#[derive(Debug, Deserialize)]
pub struct LoginEnvelope<U> {
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
    pub user: Option<U>,
}

/// Envelopes that report an outcome.
pub trait Outcome {
    fn succeeded(&self) -> bool;
    fn message(&self) -> Option<&str>;
}

impl<T> Outcome for ApiEnvelope<T> {
    fn succeeded(&self) -> bool {
        self.success
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl<U> Outcome for LoginEnvelope<U> {
    fn succeeded(&self) -> bool {
        self.success
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// Parses a body and turns a rejection into `ProvenError::Api`.
///
/// A request counts as rejected when the status is not 2xx or the envelope
/// says `success: false`. The endpoint's message is kept verbatim; `fallback`
/// is used when it sent none.
pub fn interpret<E>(status: u16, body: &str, fallback: &str) -> Result<E>
where
    E: DeserializeOwned + Outcome,
{
    let ok_status = (200..300).contains(&status);

    let envelope: E = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(e) if ok_status => return Err(e.into()),
        Err(_) => return Err(ProvenError::api(status, fallback)),
    };

    if ok_status && envelope.succeeded() {
        return Ok(envelope);
    }

    let message = envelope
        .message()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or(fallback)
        .to_string();
    Err(ProvenError::api(status, message))
}

/// Parses the body of a read. Reads only look at the status, not at
/// `success`, and a missing `data` means "nothing stored yet".
pub fn interpret_read<T>(status: u16, body: &str, fallback: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<ApiEnvelope<serde_json::Value>>(body)
            .ok()
            .and_then(|e| e.message)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string());
        return Err(ProvenError::api(status, message));
    }

    let envelope: ApiEnvelope<T> = serde_json::from_str(body)?;
    Ok(envelope.data.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proven_core::identity::Identity;
    use proven_core::resource::{ProfileRecord, WorkExperienceRecord};

    #[test]
    fn test_login_success() {
        let body = r#"{"success": true, "message": "Login successful",
                       "user": {"id": 4, "name": "Ada", "email": "ada@example.com", "role": "user"}}"#;
        let envelope: LoginEnvelope<Identity> = interpret(200, body, "Login failed").unwrap();
        assert_eq!(envelope.user.unwrap().id.as_str(), "4");
    }

    #[test]
    fn test_unauthorized_keeps_message() {
        let body = r#"{"success": false, "message": "Invalid email or password"}"#;
        let err = interpret::<LoginEnvelope<Identity>>(401, body, "Login failed").unwrap_err();
        assert!(err.is_api_status(401));
        assert_eq!(err.user_message(""), "Invalid email or password");
    }

    #[test]
    fn test_success_false_on_200_is_rejection() {
        let body = r#"{"success": false, "message": "Failed to save work experience"}"#;
        let err = interpret::<ApiEnvelope<serde_json::Value>>(200, body, "fallback").unwrap_err();
        assert!(err.is_api_status(200));
        assert_eq!(err.user_message(""), "Failed to save work experience");
    }

    #[test]
    fn test_unparsable_error_body_uses_fallback() {
        let err = interpret::<ApiEnvelope<serde_json::Value>>(500, "<html>oops</html>", "Registration failed")
            .unwrap_err();
        assert_eq!(err.user_message(""), "Registration failed");
    }

    #[test]
    fn test_unparsable_success_body_is_serialization_error() {
        let err = interpret::<ApiEnvelope<serde_json::Value>>(200, "nope", "x").unwrap_err();
        assert!(matches!(err, ProvenError::Serialization { .. }));
    }

    #[test]
    fn test_read_missing_data_defaults() {
        let profile: ProfileRecord = interpret_read(200, r#"{"success": true}"#, "x").unwrap();
        assert_eq!(profile, ProfileRecord::default());

        let work: Vec<WorkExperienceRecord> =
            interpret_read(200, r#"{"success": true, "data": null}"#, "x").unwrap();
        assert!(work.is_empty());
    }

    #[test]
    fn test_read_ignores_success_flag() {
        let work: Vec<WorkExperienceRecord> = interpret_read(
            200,
            r#"{"success": false, "data": [{"id": 1, "job_title": "Dev", "company": "Acme"}]}"#,
            "x",
        )
        .unwrap();
        assert_eq!(work.len(), 1);
    }

    #[test]
    fn test_read_error_status() {
        let err = interpret_read::<Vec<WorkExperienceRecord>>(404, "", "Not found").unwrap_err();
        assert!(err.is_api_status(404));
    }
}
