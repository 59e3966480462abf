pub mod config_service;
pub mod file_session_store;
pub mod http;
pub mod memory_session_store;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::file_session_store::FileSessionStore;
pub use crate::http::{ApiClient, HttpCredentialService, HttpResourceRepositories, HttpResourceRepository};
pub use crate::memory_session_store::MemorySessionStore;
pub use crate::paths::ProvenPaths;
