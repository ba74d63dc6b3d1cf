use crate::config::UploaderConfig;
use crate::error::UploadError;
use crate::gateway::{ContentGateway, Identity};
use crate::upload::{BatchReport, ConversionStatus, FileStatus, StatusBoard};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use tokio::task::AbortHandle;

/// Everything the UI needs to hear about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    StatusChanged(FileStatus),
    BatchFinished(BatchReport),
}

#[derive(Clone)]
struct Connection {
    identity: Identity,
    gateway: Arc<dyn ContentGateway>,
}

/// State shared by the coordinator, pollers and renderer for one run of the app.
///
/// Created on startup, attached once a credential is verified, closed on teardown. Closing aborts
/// every in-flight poller; statuses are not kept anywhere else.
pub struct Session {
    config: Arc<UploaderConfig>,
    statuses: StatusBoard,
    events: Sender<SessionEvent>,
    connection: Mutex<Option<Connection>>,
    pollers: Mutex<Vec<AbortHandle>>,
}

impl Session {
    pub fn new(config: Arc<UploaderConfig>, events: Sender<SessionEvent>) -> Self {
        Self {
            config,
            statuses: StatusBoard::default(),
            events,
            connection: Mutex::new(None),
            pollers: Mutex::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &UploaderConfig {
        &self.config
    }

    pub fn statuses(&self) -> &StatusBoard {
        &self.statuses
    }

    pub fn attach(&self, identity: Identity, gateway: Arc<dyn ContentGateway>) {
        tracing::info!("Session attached for {}", identity.login);
        *self.connection.lock().unwrap_or_else(|e| e.into_inner()) =
            Some(Connection { identity, gateway });
    }

    pub fn detach(&self) {
        *self.connection.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub fn identity(&self) -> Option<Identity> {
        self.connection
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|c| c.identity.clone())
    }

    pub fn gateway(&self) -> Result<Arc<dyn ContentGateway>, UploadError> {
        self.connection
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|c| c.gateway.clone())
            .ok_or(UploadError::NotReady)
    }

    /// Inserts `name` as uploading; see [`StatusBoard::begin`].
    pub fn begin(&self, name: &str) -> bool {
        if !self.statuses.begin(name) {
            return false;
        }
        self.emit_status(name, ConversionStatus::Uploading);
        true
    }

    pub fn update(&self, name: &str, status: ConversionStatus) {
        if self.statuses.set(name, status.clone()) {
            self.emit_status(name, status);
        } else {
            tracing::warn!("Ignoring status for unknown file {}", name);
        }
    }

    pub fn notify(&self, event: SessionEvent) {
        // A closed receiver just means the window is gone.
        let _ = self.events.send(event);
    }

    pub fn track(&self, handle: AbortHandle) {
        let mut pollers = self.pollers.lock().unwrap_or_else(|e| e.into_inner());
        pollers.retain(|h| !h.is_finished());
        pollers.push(handle);
    }

    pub fn active_pollers(&self) -> usize {
        self.pollers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|h| !h.is_finished())
            .count()
    }

    /// Abandons all pollers and drops the connection.
    pub fn close(&self) {
        let pollers: Vec<AbortHandle> = self
            .pollers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain(..)
            .collect();
        if !pollers.is_empty() {
            tracing::info!("Abandoning {} conversion poller(s)", pollers.len());
        }
        for handle in pollers {
            handle.abort();
        }
        self.detach();
    }

    fn emit_status(&self, name: &str, status: ConversionStatus) {
        self.notify(SessionEvent::StatusChanged(FileStatus {
            name: name.to_string(),
            status,
        }));
    }
}
