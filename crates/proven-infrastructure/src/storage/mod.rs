//! Storage primitives.
//!
//! - `atomic_file`: locked, atomically replaced text and TOML files

pub mod atomic_file;

pub use atomic_file::{AtomicFile, AtomicFileError, AtomicTomlFile};
