//! Owned resource records and the forms that create or update them.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::error::{ProvenError, Result};
use crate::identity::UserId;
use crate::serde_util::optional_date;

/// Identifier of a single resource record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        crate::serde_util::string_or_number(deserializer).map(Self)
    }
}

fn is_filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

fn require(value: &str, message: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(ProvenError::validation(message))
    } else {
        Ok(())
    }
}

// ============================================================================
// Profile
// ============================================================================

/// Personal details of a user. One per user; every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    #[serde(default)]
    pub name: Option<String>,
    /// Read-only; owned by the account, not the profile editor.
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "optional_date")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    /// Path relative to the API host.
    #[serde(default)]
    pub profile_picture: Option<String>,
}

impl ProfileRecord {
    /// True when at least one of name, email or phone is populated.
    pub fn has_personal_details(&self) -> bool {
        is_filled(&self.name) || is_filled(&self.email) || is_filled(&self.phone)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Editable profile fields. Email is deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileForm {
    pub name: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub bio: Option<String>,
}

impl ProfileForm {
    /// Prefills the form from the stored profile.
    pub fn from_record(record: &ProfileRecord) -> Self {
        Self {
            name: record.name.clone().unwrap_or_default(),
            phone: record.phone.clone(),
            location: record.location.clone(),
            date_of_birth: record.date_of_birth,
            gender: record
                .gender
                .as_deref()
                .and_then(|g| serde_json::from_value(serde_json::Value::from(g)).ok()),
            bio: record.bio.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require(&self.name, "Full name is required")
    }
}

// ============================================================================
// Work experience
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkExperienceRecord {
    pub id: RecordId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "optional_date")]
    pub start_date: Option<NaiveDate>,
    /// `None` while the position is still held.
    #[serde(default, deserialize_with = "optional_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub responsibilities: Option<String>,
}

impl WorkExperienceRecord {
    pub fn is_current(&self) -> bool {
        self.end_date.is_none()
    }

    /// Human-readable period, e.g. `2021-03-01 - Present`.
    pub fn period(&self) -> String {
        let start = self
            .start_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "?".to_string());
        let end = self
            .end_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "Present".to_string());
        format!("{} - {}", start, end)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkExperienceForm {
    pub job_title: String,
    pub company: String,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub responsibilities: Option<String>,
}

impl WorkExperienceForm {
    /// Prefills the form for editing an existing record.
    pub fn from_record(record: &WorkExperienceRecord) -> Self {
        Self {
            job_title: record.job_title.clone(),
            company: record.company.clone(),
            location: record.location.clone(),
            start_date: record.start_date,
            end_date: record.end_date,
            responsibilities: record.responsibilities.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require(&self.job_title, "Job title is required")?;
        require(&self.company, "Company is required")?;
        let start = self
            .start_date
            .ok_or_else(|| ProvenError::validation("Start date is required"))?;
        if let Some(end) = self.end_date
            && end < start
        {
            return Err(ProvenError::validation(
                "End date cannot be before start date",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Referees
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefereeRecord {
    pub id: RecordId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub relationship: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefereeForm {
    pub name: String,
    pub position: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub relationship: Option<String>,
}

impl RefereeForm {
    pub fn from_record(record: &RefereeRecord) -> Self {
        Self {
            name: record.name.clone(),
            position: record.position.clone(),
            company: record.company.clone(),
            email: record.email.clone(),
            phone: record.phone.clone(),
            relationship: record.relationship.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require(&self.name, "Referee name is required")?;
        if !is_filled(&self.email) && !is_filled(&self.phone) {
            return Err(ProvenError::validation(
                "Provide an email or phone number for the referee",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// CV
// ============================================================================

/// How a CV came to exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CvKind {
    Generated,
    /// Anything the server does not call `generated` is treated as uploaded.
    #[default]
    #[serde(other)]
    Uploaded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvRecord {
    pub id: RecordId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: CvKind,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvForm {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: CvKind,
    pub file_path: Option<String>,
    pub content: Option<String>,
}

impl CvForm {
    pub fn validate(&self) -> Result<()> {
        require(&self.title, "CV title is required")?;
        if self.kind == CvKind::Uploaded && !is_filled(&self.file_path) {
            return Err(ProvenError::validation("Choose a file to upload"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn work_form() -> WorkExperienceForm {
        WorkExperienceForm {
            job_title: "Engineer".to_string(),
            company: "Acme".to_string(),
            start_date: date(2024, 1, 1),
            ..Default::default()
        }
    }

    #[test]
    fn test_profile_personal_details() {
        assert!(!ProfileRecord::default().has_personal_details());

        let blank = ProfileRecord {
            name: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(!blank.has_personal_details());

        let phone_only = ProfileRecord {
            phone: Some("0123".to_string()),
            ..Default::default()
        };
        assert!(phone_only.has_personal_details());
    }

    #[test]
    fn test_profile_record_tolerates_nulls_and_empty_dates() {
        let record: ProfileRecord = serde_json::from_str(
            r#"{"name": "Ada", "phone": null, "date_of_birth": "", "gender": "female"}"#,
        )
        .unwrap();
        assert_eq!(record.name.as_deref(), Some("Ada"));
        assert!(record.date_of_birth.is_none());

        let form = ProfileForm::from_record(&record);
        assert_eq!(form.gender, Some(Gender::Female));
    }

    #[test]
    fn test_work_form_rejects_end_before_start() {
        let form = WorkExperienceForm {
            end_date: date(2023, 12, 1),
            ..work_form()
        };
        let err = form.validate().unwrap_err();
        assert_eq!(err.user_message(""), "End date cannot be before start date");
    }

    #[test]
    fn test_work_form_accepts_same_day_and_open_end() {
        assert!(work_form().validate().is_ok());
        let same_day = WorkExperienceForm {
            end_date: date(2024, 1, 1),
            ..work_form()
        };
        assert!(same_day.validate().is_ok());
    }

    #[test]
    fn test_work_form_required_fields() {
        let missing_start = WorkExperienceForm {
            start_date: None,
            ..work_form()
        };
        assert!(missing_start.validate().is_err());

        let missing_company = WorkExperienceForm {
            company: String::new(),
            ..work_form()
        };
        assert_eq!(
            missing_company.validate().unwrap_err().user_message(""),
            "Company is required"
        );
    }

    #[test]
    fn test_work_record_numeric_ids_and_period() {
        let record: WorkExperienceRecord = serde_json::from_str(
            r#"{"id": 9, "user_id": 3, "job_title": "Dev", "company": "Acme",
                "start_date": "2020-05-01", "end_date": null}"#,
        )
        .unwrap();
        assert_eq!(record.id.as_str(), "9");
        assert!(record.is_current());
        assert_eq!(record.period(), "2020-05-01 - Present");
    }

    #[test]
    fn test_referee_needs_contact() {
        let form = RefereeForm {
            name: "Grace".to_string(),
            ..Default::default()
        };
        assert!(form.validate().is_err());

        let form = RefereeForm {
            phone: Some("555".to_string()),
            ..form
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_cv_kind_defaults_to_uploaded() {
        let record: CvRecord = serde_json::from_str(r#"{"id": "1", "type": "pdf"}"#).unwrap();
        assert_eq!(record.kind, CvKind::Uploaded);
        let record: CvRecord = serde_json::from_str(r#"{"id": "2", "type": "generated"}"#).unwrap();
        assert_eq!(record.kind, CvKind::Generated);
        let record: CvRecord = serde_json::from_str(r#"{"id": "3"}"#).unwrap();
        assert_eq!(record.kind, CvKind::Uploaded);
    }

    #[test]
    fn test_uploaded_cv_needs_file() {
        let form = CvForm {
            title: "Main CV".to_string(),
            kind: CvKind::Uploaded,
            ..Default::default()
        };
        assert!(form.validate().is_err());

        let generated = CvForm {
            kind: CvKind::Generated,
            ..form
        };
        assert!(generated.validate().is_ok());
    }
}
