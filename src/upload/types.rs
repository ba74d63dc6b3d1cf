use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionStatus {
    Uploading,
    Completed,
    Error(String),
    Timeout,
}

impl ConversionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ConversionStatus::Uploading)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStatus {
    pub name: String,
    pub status: ConversionStatus,
}

#[derive(Debug, Clone)]
pub enum FileSource {
    Bytes(Arc<[u8]>),
    Path(PathBuf),
}

/// One file of an upload batch.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub source: FileSource,
}

impl UploadFile {
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            source: FileSource::Bytes(bytes.into()),
        }
    }

    pub async fn read(&self) -> std::io::Result<Vec<u8>> {
        match &self.source {
            FileSource::Bytes(bytes) => Ok(bytes.to_vec()),
            FileSource::Path(path) => tokio::fs::read(path).await,
        }
    }
}

/// Outcome of one `submit` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub uploaded: Vec<String>,
    pub failed: Vec<(String, String)>,
    pub skipped: Vec<(String, String)>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.uploaded.len() + self.failed.len() + self.skipped.len()
    }
}

/// Session-wide conversion status per original file name.
#[derive(Debug, Clone, Default)]
pub struct StatusBoard {
    inner: Arc<Mutex<BTreeMap<String, ConversionStatus>>>,
}

impl StatusBoard {
    /// Marks `name` as uploading. Refuses while a previous upload of the same name is in flight.
    pub fn begin(&self, name: &str) -> bool {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if map.get(name) == Some(&ConversionStatus::Uploading) {
            return false;
        }
        map.insert(name.to_string(), ConversionStatus::Uploading);
        true
    }

    /// Overwrites an existing entry. Unknown names are ignored.
    pub fn set(&self, name: &str, status: ConversionStatus) -> bool {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        match map.get_mut(name) {
            Some(slot) => {
                *slot = status;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<ConversionStatus> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
    }

    pub fn snapshot(&self) -> BTreeMap<String, ConversionStatus> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
