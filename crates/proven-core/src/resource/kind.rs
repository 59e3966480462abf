use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::model::{
    CvForm, CvRecord, ProfileForm, ProfileRecord, RefereeForm, RefereeRecord, WorkExperienceForm,
    WorkExperienceRecord,
};
use crate::error::Result;

/// The four resource categories a user owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Profile,
    WorkExperience,
    Referees,
    Cv,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Profile,
        ResourceKind::WorkExperience,
        ResourceKind::Referees,
        ResourceKind::Cv,
    ];

    /// Capitalized singular used in user-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Profile => "Profile",
            Self::WorkExperience => "Work experience",
            Self::Referees => "Referee",
            Self::Cv => "CV",
        }
    }

    /// Path of the endpoint relative to the API base URL.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Profile => "profile.php",
            Self::WorkExperience => "work-experience.php",
            Self::Referees => "referees.php",
            Self::Cv => "cv.php",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Type-level description of one resource category.
///
/// Editors and repositories are generic over it so the create/update/delete
/// pattern is written once for all four categories.
pub trait Resource: Send + Sync + 'static {
    const KIND: ResourceKind;

    /// One record per user, addressed by its owner alone and never created
    /// or deleted on its own.
    const SINGLETON: bool = false;

    /// What a fetch for one user returns.
    type Collection: Clone + fmt::Debug + Default + DeserializeOwned + Send + Sync + 'static;

    /// What a create or update sends.
    type Form: Clone + fmt::Debug + Serialize + Send + Sync + 'static;

    /// Client-side checks run before any request is made.
    fn validate(form: &Self::Form) -> Result<()>;
}

#[derive(Debug, Clone, Copy)]
pub struct ProfileResource;

impl Resource for ProfileResource {
    const KIND: ResourceKind = ResourceKind::Profile;
    const SINGLETON: bool = true;
    type Collection = ProfileRecord;
    type Form = ProfileForm;

    fn validate(form: &Self::Form) -> Result<()> {
        form.validate()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WorkExperienceResource;

impl Resource for WorkExperienceResource {
    const KIND: ResourceKind = ResourceKind::WorkExperience;
    type Collection = Vec<WorkExperienceRecord>;
    type Form = WorkExperienceForm;

    fn validate(form: &Self::Form) -> Result<()> {
        form.validate()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RefereeResource;

impl Resource for RefereeResource {
    const KIND: ResourceKind = ResourceKind::Referees;
    type Collection = Vec<RefereeRecord>;
    type Form = RefereeForm;

    fn validate(form: &Self::Form) -> Result<()> {
        form.validate()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CvResource;

impl Resource for CvResource {
    const KIND: ResourceKind = ResourceKind::Cv;
    type Collection = Vec<CvRecord>;
    type Form = CvForm;

    fn validate(form: &Self::Form) -> Result<()> {
        form.validate()
    }
}
