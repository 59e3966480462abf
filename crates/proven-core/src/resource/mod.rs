//! Resource domain module.
//!
//! # Module Structure
//!
//! - `model`: records and forms for profile, work experience, referees and CVs
//! - `kind`: the resource categories and the `Resource` type-level description
//! - `repository`: user-scoped CRUD trait implemented by the HTTP layer

mod kind;
mod model;
mod repository;

pub use kind::{
    CvResource, ProfileResource, RefereeResource, Resource, ResourceKind, WorkExperienceResource,
};
pub use model::{
    CvForm, CvKind, CvRecord, Gender, ProfileForm, ProfileRecord, RecordId, RefereeForm,
    RefereeRecord, WorkExperienceForm, WorkExperienceRecord,
};
pub use repository::{MutationAck, ResourceRepository};
