use crate::error::StorageError;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Durable slot for a single secret string.
pub trait SecretStorage: Send + Sync {
    fn load(&self) -> Result<Option<String>, StorageError>;
    fn save(&self, secret: &str) -> Result<(), StorageError>;
    /// Succeeds when nothing is stored.
    fn clear(&self) -> Result<(), StorageError>;
}

#[derive(Debug, Clone)]
pub struct FileSecretStorage {
    path: PathBuf,
}

impl FileSecretStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SecretStorage for FileSecretStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let secret = content.trim();
                Ok((!secret.is_empty()).then(|| secret.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn save(&self, secret: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        fs::write(&self.path, secret).map_err(|e| self.io_error(e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))
                .map_err(|e| self.io_error(e))?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// Process-local storage, for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemorySecretStorage {
    secret: Mutex<Option<String>>,
}

impl MemorySecretStorage {
    pub fn with_secret(secret: &str) -> Self {
        Self {
            secret: Mutex::new(Some(secret.to_string())),
        }
    }
}

impl SecretStorage for MemorySecretStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self
            .secret
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone())
    }

    fn save(&self, secret: &str) -> Result<(), StorageError> {
        *self.secret.lock().unwrap_or_else(|e| e.into_inner()) = Some(secret.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.secret.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}
