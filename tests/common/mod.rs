#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::hash::{Hash, Hasher};
use std::sync::mpsc::{channel, Receiver};
use std::sync::{Arc, Mutex};
use word2md_uploader::error::GatewayError;
use word2md_uploader::gateway::{ContentGateway, Identity, RemoteArtifact};
use word2md_uploader::upload::decode_content;
use word2md_uploader::{Session, SessionEvent, UploaderConfig};

/// Scripted outcome of one `read_file` call.
#[derive(Debug, Clone)]
pub enum Probe {
    Missing,
    Broken,
}

/// In-memory stand-in for the contents API.
#[derive(Default)]
pub struct FakeRepo {
    files: Mutex<BTreeMap<String, Vec<u8>>>,
    write_failures: Mutex<HashMap<String, (u16, String)>>,
    scripts: Mutex<HashMap<String, VecDeque<Probe>>>,
    reads: Mutex<Vec<String>>,
    writes: Mutex<Vec<(String, String, Option<String>)>>,
}

impl FakeRepo {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn put(&self, path: &str, bytes: &[u8]) {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), bytes.to_vec());
    }

    pub fn fail_writes_to(&self, path: &str, status: u16, message: &str) {
        self.write_failures
            .lock()
            .unwrap()
            .insert(path.to_string(), (status, message.to_string()));
    }

    /// Answers the next reads of `path` from `probes` before falling back to stored files.
    pub fn script(&self, path: &str, probes: Vec<Probe>) {
        self.scripts
            .lock()
            .unwrap()
            .insert(path.to_string(), probes.into());
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(path).cloned()
    }

    pub fn reads_of(&self, path: &str) -> usize {
        self.reads
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.as_str() == path)
            .count()
    }

    /// (path, commit message, sha) of every attempted write, in order.
    pub fn writes(&self) -> Vec<(String, String, Option<String>)> {
        self.writes.lock().unwrap().clone()
    }

    fn artifact(path: &str, bytes: &[u8]) -> RemoteArtifact {
        let name = path.rsplit('/').next().unwrap_or(path).to_string();
        RemoteArtifact {
            name,
            path: path.to_string(),
            sha: content_sha(bytes),
            size: bytes.len() as u64,
            kind: "file".to_string(),
            download_url: Some(format!("https://raw.example/{}", path)),
            html_url: Some(format!("https://github.example/{}", path)),
            content: None,
        }
    }
}

#[async_trait]
impl ContentGateway for FakeRepo {
    async fn write_file(
        &self,
        path: &str,
        content: &str,
        message: &str,
        sha: Option<&str>,
    ) -> Result<(), GatewayError> {
        self.writes.lock().unwrap().push((
            path.to_string(),
            message.to_string(),
            sha.map(String::from),
        ));
        if let Some((status, message)) = self.write_failures.lock().unwrap().get(path) {
            return Err(GatewayError::Write {
                status: *status,
                message: message.clone(),
            });
        }
        let bytes = decode_content(content).map_err(|e| GatewayError::Write {
            status: 422,
            message: e.to_string(),
        })?;
        self.put(path, &bytes);
        Ok(())
    }

    async fn read_file(&self, path: &str) -> Result<RemoteArtifact, GatewayError> {
        self.reads.lock().unwrap().push(path.to_string());

        let scripted = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(path)
            .and_then(|queue| queue.pop_front());
        match scripted {
            Some(Probe::Missing) => return Err(GatewayError::NotFound),
            Some(Probe::Broken) => {
                return Err(GatewayError::Read {
                    status: 502,
                    message: "Bad Gateway".to_string(),
                })
            }
            None => {}
        }

        self.files
            .lock()
            .unwrap()
            .get(path)
            .map(|bytes| Self::artifact(path, bytes))
            .ok_or(GatewayError::NotFound)
    }

    async fn list_directory(&self, path: &str) -> Result<Vec<RemoteArtifact>, GatewayError> {
        let prefix = format!("{}/", path);
        Ok(self
            .files
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p.starts_with(&prefix))
            .map(|(p, bytes)| Self::artifact(p, bytes))
            .collect())
    }
}

/// Stand-in for a git blob sha: changes whenever the content does.
pub fn content_sha(bytes: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

/// Gateway whose calls never complete, like a connection that stopped answering.
pub struct StalledRepo;

#[async_trait]
impl ContentGateway for StalledRepo {
    async fn write_file(
        &self,
        _path: &str,
        _content: &str,
        _message: &str,
        _sha: Option<&str>,
    ) -> Result<(), GatewayError> {
        std::future::pending().await
    }

    async fn read_file(&self, _path: &str) -> Result<RemoteArtifact, GatewayError> {
        std::future::pending().await
    }

    async fn list_directory(&self, _path: &str) -> Result<Vec<RemoteArtifact>, GatewayError> {
        std::future::pending().await
    }
}

pub fn identity() -> Identity {
    Identity {
        login: "octocat".to_string(),
    }
}

/// Session already attached to `repo`, plus the UI side of its event channel.
pub fn attached_session(repo: &Arc<FakeRepo>) -> (Arc<Session>, Receiver<SessionEvent>) {
    let (events, receiver) = channel();
    let session = Arc::new(Session::new(Arc::new(UploaderConfig::default()), events));
    session.attach(identity(), repo.clone());
    (session, receiver)
}
