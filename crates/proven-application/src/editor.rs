//! Create, update and delete for one resource category.
//!
//! One editor type serves all four categories. Validation runs before any
//! request. An editor allows a single operation at a time; nothing is
//! mutated locally, callers reload through the aggregator on success.

use proven_core::identity::UserId;
use proven_core::resource::{
    CvResource, ProfileResource, RecordId, RefereeResource, Resource, ResourceRepository,
    WorkExperienceResource,
};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::dashboard::ResourceRepositories;

/// Answer to "are you sure?" before a deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Affirmed,
    Declined,
}

impl From<bool> for Confirmation {
    fn from(affirmed: bool) -> Self {
        if affirmed {
            Self::Affirmed
        } else {
            Self::Declined
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditAction {
    Create,
    Update,
    Delete,
}

impl EditAction {
    fn past_tense(&self) -> &'static str {
        match self {
            Self::Create => "added",
            Self::Update => "updated",
            Self::Delete => "deleted",
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            Self::Create | Self::Update => "save",
            Self::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditStatus {
    Success,
    Failure,
    /// The user declined the confirmation; nothing was sent.
    Cancelled,
    /// Another operation of the same editor was still running; nothing was sent.
    Busy,
}

/// Outcome of one editor operation, ready to show to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditReport {
    pub action: EditAction,
    pub status: EditStatus,
    pub message: String,
}

impl EditReport {
    pub fn is_success(&self) -> bool {
        self.status == EditStatus::Success
    }
}

impl fmt::Display for EditReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

pub struct ResourceEditor<R: Resource> {
    repository: Arc<dyn ResourceRepository<R>>,
    in_flight: Mutex<()>,
}

impl<R: Resource> ResourceEditor<R> {
    pub fn new(repository: Arc<dyn ResourceRepository<R>>) -> Self {
        Self {
            repository,
            in_flight: Mutex::new(()),
        }
    }

    /// Creates a record, or updates `existing` when an id is given.
    ///
    /// Singleton resources are always updated in place.
    pub async fn submit(
        &self,
        owner: &UserId,
        form: &R::Form,
        existing: Option<&RecordId>,
    ) -> EditReport {
        let target = match existing {
            Some(id) => Some(id.clone()),
            None if R::SINGLETON => Some(RecordId::default()),
            None => None,
        };
        let action = match target {
            Some(_) => EditAction::Update,
            None => EditAction::Create,
        };

        if let Err(e) = R::validate(form) {
            return self.failure(action, &e);
        }

        let Ok(_guard) = self.in_flight.try_lock() else {
            return Self::busy(action);
        };

        let result = match &target {
            Some(id) => self.repository.update(owner, id, form).await,
            None => self.repository.create(owner, form).await,
        };

        match result {
            Ok(_) => self.success(action),
            Err(e) => self.failure(action, &e),
        }
    }

    /// Deletes a record once the caller has confirmed.
    pub async fn remove(
        &self,
        owner: &UserId,
        id: &RecordId,
        confirmation: Confirmation,
    ) -> EditReport {
        if confirmation == Confirmation::Declined {
            return EditReport {
                action: EditAction::Delete,
                status: EditStatus::Cancelled,
                message: "Deletion cancelled".to_string(),
            };
        }

        let Ok(_guard) = self.in_flight.try_lock() else {
            return Self::busy(EditAction::Delete);
        };

        match self.repository.delete(owner, id).await {
            Ok(_) => self.success(EditAction::Delete),
            Err(e) => self.failure(EditAction::Delete, &e),
        }
    }

    /// Whether an operation is currently running.
    pub fn is_busy(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    fn success(&self, action: EditAction) -> EditReport {
        let message = format!("{} {} successfully!", R::KIND.label(), action.past_tense());
        tracing::info!("{}", message);
        EditReport {
            action,
            status: EditStatus::Success,
            message,
        }
    }

    fn failure(&self, action: EditAction, error: &proven_core::ProvenError) -> EditReport {
        if !error.is_validation() {
            tracing::warn!(
                "Failed to {} {}: {}",
                action.verb(),
                R::KIND.label().to_lowercase(),
                error
            );
        }
        let fallback = format!(
            "Failed to {} {}",
            action.verb(),
            R::KIND.label().to_lowercase()
        );
        EditReport {
            action,
            status: EditStatus::Failure,
            message: error.user_message(&fallback),
        }
    }

    fn busy(action: EditAction) -> EditReport {
        EditReport {
            action,
            status: EditStatus::Busy,
            message: "Please wait for the current change to finish".to_string(),
        }
    }
}

/// One editor per resource category.
pub struct ResourceEditors {
    pub profile: ResourceEditor<ProfileResource>,
    pub work_experience: ResourceEditor<WorkExperienceResource>,
    pub referees: ResourceEditor<RefereeResource>,
    pub cvs: ResourceEditor<CvResource>,
}

impl ResourceEditors {
    pub fn new(repositories: &ResourceRepositories) -> Self {
        Self {
            profile: ResourceEditor::new(repositories.profile.clone()),
            work_experience: ResourceEditor::new(repositories.work_experience.clone()),
            referees: ResourceEditor::new(repositories.referees.clone()),
            cvs: ResourceEditor::new(repositories.cvs.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, MockRepository};
    use chrono::NaiveDate;
    use proven_core::error::{GENERIC_FAILURE_MESSAGE, ProvenError};
    use proven_core::resource::{CvForm, CvKind, ProfileForm, RefereeForm, WorkExperienceForm};
    use std::time::Duration;

    fn owner() -> UserId {
        UserId::new("7")
    }

    fn work_form() -> WorkExperienceForm {
        WorkExperienceForm {
            job_title: "Engineer".to_string(),
            company: "Acme".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..Default::default()
        }
    }

    fn work_editor() -> (
        Arc<MockRepository<WorkExperienceResource>>,
        ResourceEditor<WorkExperienceResource>,
    ) {
        let repo = Arc::new(MockRepository::new());
        let editor = ResourceEditor::new(repo.clone() as Arc<dyn ResourceRepository<_>>);
        (repo, editor)
    }

    #[tokio::test]
    async fn test_submit_without_id_creates() {
        let (repo, editor) = work_editor();

        let report = editor.submit(&owner(), &work_form(), None).await;

        assert!(report.is_success());
        assert_eq!(report.action, EditAction::Create);
        assert_eq!(report.message, "Work experience added successfully!");
        assert_eq!(repo.calls(), vec![Call::Create(owner())]);
    }

    #[tokio::test]
    async fn test_submit_with_id_updates() {
        let (repo, editor) = work_editor();
        let id = RecordId::new("12");

        let report = editor.submit(&owner(), &work_form(), Some(&id)).await;

        assert_eq!(report.message, "Work experience updated successfully!");
        assert_eq!(repo.calls(), vec![Call::Update(owner(), id)]);
    }

    #[tokio::test]
    async fn test_profile_is_always_updated() {
        let repo = Arc::new(MockRepository::<ProfileResource>::new());
        let editor = ResourceEditor::new(repo.clone() as Arc<dyn ResourceRepository<_>>);
        let form = ProfileForm {
            name: "Alice".to_string(),
            ..Default::default()
        };

        let report = editor.submit(&owner(), &form, None).await;

        assert_eq!(report.message, "Profile updated successfully!");
        assert_eq!(repo.calls(), vec![Call::Update(owner(), RecordId::default())]);
    }

    #[tokio::test]
    async fn test_profile_requires_name() {
        let repo = Arc::new(MockRepository::<ProfileResource>::new());
        let editor = ResourceEditor::new(repo.clone() as Arc<dyn ResourceRepository<_>>);

        let report = editor.submit(&owner(), &ProfileForm::default(), None).await;

        assert_eq!(report.message, "Full name is required");
        assert!(repo.calls().is_empty());
    }

    #[tokio::test]
    async fn test_end_before_start_rejected_without_request() {
        let (repo, editor) = work_editor();
        let form = WorkExperienceForm {
            end_date: NaiveDate::from_ymd_opt(2023, 12, 1),
            ..work_form()
        };

        let report = editor.submit(&owner(), &form, None).await;

        assert_eq!(report.status, EditStatus::Failure);
        assert_eq!(report.message, "End date cannot be before start date");
        assert!(repo.calls().is_empty());
    }

    #[tokio::test]
    async fn test_referee_needs_contact() {
        let repo = Arc::new(MockRepository::<RefereeResource>::new());
        let editor = ResourceEditor::new(repo.clone() as Arc<dyn ResourceRepository<_>>);
        let form = RefereeForm {
            name: "Jane".to_string(),
            ..Default::default()
        };

        let report = editor.submit(&owner(), &form, None).await;

        assert_eq!(
            report.message,
            "Provide an email or phone number for the referee"
        );
        assert!(repo.calls().is_empty());
    }

    #[tokio::test]
    async fn test_uploaded_cv_needs_file() {
        let repo = Arc::new(MockRepository::<CvResource>::new());
        let editor = ResourceEditor::new(repo.clone() as Arc<dyn ResourceRepository<_>>);
        let mut form = CvForm {
            title: "Main".to_string(),
            kind: CvKind::Uploaded,
            ..Default::default()
        };

        let report = editor.submit(&owner(), &form, None).await;
        assert_eq!(report.message, "Choose a file to upload");

        form.file_path = Some("uploads/cv.pdf".to_string());
        let report = editor.submit(&owner(), &form, None).await;
        assert_eq!(report.message, "CV added successfully!");
    }

    #[tokio::test]
    async fn test_declined_delete_sends_nothing() {
        let (repo, editor) = work_editor();

        let report = editor
            .remove(&owner(), &RecordId::new("3"), Confirmation::Declined)
            .await;

        assert_eq!(report.status, EditStatus::Cancelled);
        assert!(repo.calls().is_empty());
    }

    #[tokio::test]
    async fn test_affirmed_delete() {
        let (repo, editor) = work_editor();
        let id = RecordId::new("3");

        let report = editor.remove(&owner(), &id, true.into()).await;

        assert_eq!(report.message, "Work experience deleted successfully!");
        assert_eq!(repo.calls(), vec![Call::Delete(owner(), id)]);
    }

    #[tokio::test]
    async fn test_endpoint_message_passed_verbatim() {
        let (repo, editor) = work_editor();
        repo.fail_mutations(ProvenError::api(422, "Company name too long"));

        let report = editor.submit(&owner(), &work_form(), None).await;

        assert_eq!(report.status, EditStatus::Failure);
        assert_eq!(report.message, "Company name too long");
    }

    #[tokio::test]
    async fn test_blank_endpoint_message_uses_fallback() {
        let (repo, editor) = work_editor();
        repo.fail_mutations(ProvenError::api(500, ""));

        let report = editor
            .remove(&owner(), &RecordId::new("1"), Confirmation::Affirmed)
            .await;

        assert_eq!(report.message, "Failed to delete work experience");
    }

    #[tokio::test]
    async fn test_transport_failure_uses_generic_message() {
        let (repo, editor) = work_editor();
        repo.fail_mutations(ProvenError::Network("connection refused".into()));

        let report = editor.submit(&owner(), &work_form(), None).await;

        assert_eq!(report.message, GENERIC_FAILURE_MESSAGE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_operation_is_busy() {
        let (repo, editor) = work_editor();
        repo.delay_mutations(Duration::from_millis(100));
        let form = work_form();
        let owner = owner();
        let id = RecordId::new("1");

        let (first, second) = tokio::join!(
            editor.submit(&owner, &form, None),
            editor.remove(&owner, &id, Confirmation::Affirmed),
        );

        assert!(first.is_success());
        assert_eq!(second.status, EditStatus::Busy);
        assert_eq!(repo.calls().len(), 1);
        assert!(!editor.is_busy());
    }
}
