//! Authentication domain module.
//!
//! - `model`: credential and registration requests with client-side checks
//! - `service`: the credential verification collaborator

mod model;
mod service;

pub use model::{Credentials, Registration};
pub use service::CredentialService;
