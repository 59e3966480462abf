//! HTTP collaborators.
//!
//! - `client`: base-URL bound `reqwest` client
//! - `envelope`: `{success, message?, data?}` decoding and rejection mapping
//! - `credential_client`: login and registration
//! - `resource_client`: user-scoped CRUD for the four resource endpoints

mod client;
mod credential_client;
pub mod envelope;
mod resource_client;

pub use client::ApiClient;
pub use credential_client::HttpCredentialService;
pub use resource_client::{HttpResourceRepositories, HttpResourceRepository};
