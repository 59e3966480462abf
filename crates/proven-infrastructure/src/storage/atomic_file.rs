//! Atomic file operations with locking.
//!
//! Writes go through a temporary file and a rename, so readers in other
//! processes see either the old or the new content, never a torn write.

use proven_core::ProvenError;
use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Errors that can occur during atomic file operations.
#[derive(Debug)]
pub enum AtomicFileError {
    /// File I/O error.
    IoError(std::io::Error),
    /// TOML deserialization error.
    TomlError(toml::de::Error),
    /// TOML serialization error.
    TomlSerError(toml::ser::Error),
    /// File locking error.
    LockError(String),
}

impl std::fmt::Display for AtomicFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AtomicFileError::IoError(e) => write!(f, "I/O error: {}", e),
            AtomicFileError::TomlError(e) => write!(f, "TOML parse error: {}", e),
            AtomicFileError::TomlSerError(e) => write!(f, "TOML serialization error: {}", e),
            AtomicFileError::LockError(e) => write!(f, "Lock error: {}", e),
        }
    }
}

impl std::error::Error for AtomicFileError {}

impl From<std::io::Error> for AtomicFileError {
    fn from(e: std::io::Error) -> Self {
        AtomicFileError::IoError(e)
    }
}

impl From<toml::de::Error> for AtomicFileError {
    fn from(e: toml::de::Error) -> Self {
        AtomicFileError::TomlError(e)
    }
}

impl From<toml::ser::Error> for AtomicFileError {
    fn from(e: toml::ser::Error) -> Self {
        AtomicFileError::TomlSerError(e)
    }
}

impl From<AtomicFileError> for ProvenError {
    fn from(e: AtomicFileError) -> Self {
        match e {
            AtomicFileError::IoError(io) => io.into(),
            AtomicFileError::TomlError(de) => de.into(),
            AtomicFileError::TomlSerError(ser) => ser.into(),
            AtomicFileError::LockError(message) => ProvenError::io(message),
        }
    }
}

/// A handle to a plain text file that is replaced atomically.
#[derive(Debug, Clone)]
pub struct AtomicFile {
    path: PathBuf,
}

impl AtomicFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the file.
    ///
    /// Returns `None` when the file does not exist.
    pub fn load(&self) -> Result<Option<String>, AtomicFileError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Replaces the file content under an exclusive lock.
    pub fn store(&self, content: &str) -> Result<(), AtomicFileError> {
        let _lock = self.acquire_lock()?;
        self.write_atomically(content)
    }

    /// Deletes the file under an exclusive lock. Missing files are fine.
    pub fn remove(&self) -> Result<(), AtomicFileError> {
        let _lock = self.acquire_lock()?;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_atomically(&self, content: &str) -> Result<(), AtomicFileError> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        // Write to temporary file in the same directory
        let tmp_path = self.get_temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(content.as_bytes())?;

        // Ensure data is written to disk
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }

    /// Gets a temporary file path for atomic writes.
    fn get_temp_path(&self) -> Result<PathBuf, AtomicFileError> {
        let parent = self.path.parent().ok_or_else(|| {
            AtomicFileError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Path has no parent directory",
            ))
        })?;

        let file_name = self.path.file_name().ok_or_else(|| {
            AtomicFileError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Path has no file name",
            ))
        })?;

        let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
        Ok(parent.join(tmp_name))
    }

    fn acquire_lock(&self) -> Result<FileLock, AtomicFileError> {
        FileLock::acquire(&self.path)
    }
}

/// A TOML document stored through [`AtomicFile`].
pub struct AtomicTomlFile<T> {
    file: AtomicFile,
    _phantom: PhantomData<T>,
}

impl<T> AtomicTomlFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: AtomicFile::new(path),
            _phantom: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Loads and deserializes the document.
    ///
    /// - `Ok(Some(T))`: Successfully loaded and deserialized
    /// - `Ok(None)`: File doesn't exist or is empty
    /// - `Err`: Failed to read or parse the file
    pub fn load(&self) -> Result<Option<T>, AtomicFileError> {
        match self.file.load()? {
            Some(content) if !content.trim().is_empty() => Ok(Some(toml::from_str(&content)?)),
            _ => Ok(None),
        }
    }

    pub fn save(&self, data: &T) -> Result<(), AtomicFileError> {
        let toml_string = toml::to_string_pretty(data)?;
        self.file.store(&toml_string)
    }
}

/// A file lock guard that automatically releases the lock when dropped.
struct FileLock {
    #[allow(dead_code)]
    file: File,
}

impl FileLock {
    /// Acquires an exclusive lock on a sibling `.lock` file.
    fn acquire(path: &Path) -> Result<Self, AtomicFileError> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            file.lock_exclusive()
                .map_err(|e| AtomicFileError::LockError(format!("Failed to acquire lock: {}", e)))?;
        }

        Ok(FileLock { file })
    }
}
