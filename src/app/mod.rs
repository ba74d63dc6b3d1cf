mod state;
mod ui;

pub use state::{Banner, BannerKind, ConnectionState, UploadState};

use crate::config::UploaderConfig;
use crate::credentials::{ChannelProvider, CredentialStore, FileSecretStorage, PromptRequest};
use crate::error::{CredentialError, StartupError};
use crate::gateway::{GitHubApi, Identity};
use crate::session::{Session, SessionEvent};
use crate::upload::{BatchReport, UploadCoordinator, UploadFile};
use crate::view::{DisplayRow, ViewRenderer};
use eframe::{egui, App};
use std::sync::mpsc as std_mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;

/// Results of background work, delivered back to the UI thread.
enum AppMessage {
    Connected(Result<Identity, CredentialError>),
    Rendered(Result<Vec<DisplayRow>, String>),
    Submitted(Result<BatchReport, String>),
}

pub struct Word2MdUploader {
    runtime: Runtime,
    config: Arc<UploaderConfig>,
    api: GitHubApi,
    session: Arc<Session>,
    credentials: Arc<CredentialStore>,
    coordinator: UploadCoordinator,
    renderer: ViewRenderer,
    state: UploadState,
    messages: std_mpsc::Sender<AppMessage>,
    message_receiver: std_mpsc::Receiver<AppMessage>,
    session_events: std_mpsc::Receiver<SessionEvent>,
    prompt_requests: std_mpsc::Receiver<PromptRequest>,
}

impl Word2MdUploader {
    pub fn new(config: UploaderConfig) -> Result<Self, StartupError> {
        tracing::info!(
            "Initializing Word2MD uploader for repository {} ({})",
            config.repo,
            config.branch
        );
        let config = Arc::new(config);
        let runtime = Runtime::new()?;
        let api = GitHubApi::new(&config)?;

        let (event_sender, session_events) = std_mpsc::channel();
        let (prompt_sender, prompt_requests) = std_mpsc::channel();
        let (messages, message_receiver) = std_mpsc::channel();

        let session = Arc::new(Session::new(config.clone(), event_sender));
        let credentials = Arc::new(CredentialStore::new(
            Arc::new(FileSecretStorage::new(config.credential_path.clone())),
            Arc::new(api.clone()),
            Arc::new(ChannelProvider::new(prompt_sender)),
        ));

        let mut app = Self {
            runtime,
            config,
            api,
            coordinator: UploadCoordinator::new(session.clone()),
            renderer: ViewRenderer::new(session.clone()),
            session,
            credentials,
            state: UploadState::default(),
            messages,
            message_receiver,
            session_events,
            prompt_requests,
        };
        app.connect();
        Ok(app)
    }

    /// Resolves a credential in the background. Prompts arrive through `prompt_requests`.
    pub fn connect(&mut self) {
        self.session.detach();
        self.state.connection = Some(ConnectionState::Connecting);
        self.state.show(BannerKind::Info, "Connecting to GitHub...");

        let credentials = self.credentials.clone();
        let api = self.api.clone();
        let session = self.session.clone();
        let messages = self.messages.clone();

        self.runtime.spawn(async move {
            let result = match credentials.ensure_credential().await {
                Ok((credential, identity)) => match api.gateway(credential.secret(), &identity) {
                    Ok(gateway) => {
                        session.attach(identity.clone(), Arc::new(gateway));
                        Ok(identity)
                    }
                    Err(e) => Err(CredentialError::Gateway(e)),
                },
                Err(e) => Err(e),
            };
            let _ = messages.send(AppMessage::Connected(result));
        });
    }

    pub fn forget_token(&mut self) {
        if let Err(e) = self.credentials.forget() {
            tracing::error!("Failed to remove stored token: {}", e);
            self.state.show(BannerKind::Danger, e.to_string());
            return;
        }
        self.session.detach();
        self.state.rows.clear();
        self.state.connection = Some(ConnectionState::Disabled {
            reason: "Token removed".to_string(),
        });
        self.state.show(BannerKind::Info, "Token removed. Uploads are disabled.");
    }

    pub fn submit(&mut self, files: Vec<UploadFile>) {
        if files.is_empty() {
            return;
        }
        if let Some(reason) = self.state.upload_blocker() {
            self.state.show(BannerKind::Warning, reason);
            return;
        }

        self.state.is_uploading = true;
        self.state
            .show(BannerKind::Info, format!("Uploading {} file(s)...", files.len()));

        let coordinator = self.coordinator.clone();
        let messages = self.messages.clone();
        self.runtime.spawn(async move {
            let result = coordinator.submit(files).await.map_err(|e| e.to_string());
            let _ = messages.send(AppMessage::Submitted(result));
        });
    }

    /// Rebuilds the artifact list. Requests made while one is running are coalesced.
    pub fn refresh(&mut self) {
        if self.session.identity().is_none() {
            return;
        }
        if self.state.is_refreshing {
            self.state.refresh_queued = true;
            return;
        }
        self.state.is_refreshing = true;

        let renderer = self.renderer.clone();
        let messages = self.messages.clone();
        self.runtime.spawn(async move {
            let result = renderer.render().await.map_err(|e| e.to_string());
            let _ = messages.send(AppMessage::Rendered(result));
        });
    }

    pub fn update_state(&mut self, ctx: &egui::Context) {
        ctx.request_repaint_after(Duration::from_millis(200));

        if self.state.prompt.is_none() {
            if let Ok(request) = self.prompt_requests.try_recv() {
                self.state.prompt_input.clear();
                self.state.prompt = Some(request);
            }
        }

        while let Ok(message) = self.message_receiver.try_recv() {
            self.handle_message(message);
        }

        let mut needs_refresh = false;
        while let Ok(event) = self.session_events.try_recv() {
            needs_refresh = true;
            self.handle_event(event);
        }
        if needs_refresh {
            self.refresh();
        }

        self.state.expire_banner(Instant::now());
    }

    fn handle_message(&mut self, message: AppMessage) {
        match message {
            AppMessage::Connected(result) => {
                if self.state.on_connected(result) {
                    self.refresh();
                }
            }
            AppMessage::Rendered(result) => {
                self.state.is_refreshing = false;
                match result {
                    Ok(rows) => self.state.rows = rows,
                    Err(e) => {
                        tracing::error!("Error updating file list: {}", e);
                        self.state.show(BannerKind::Danger, "Error loading file list");
                    }
                }
                if std::mem::take(&mut self.state.refresh_queued) {
                    self.refresh();
                }
            }
            AppMessage::Submitted(result) => {
                self.state.is_uploading = false;
                if let Err(e) = result {
                    self.state.show(BannerKind::Danger, e);
                }
            }
        }
    }

    fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::StatusChanged(status) => self.state.on_status(status, &self.config),
            SessionEvent::BatchFinished(report) => self.state.report_batch(&report),
        }
    }

    /// Answers the open token prompt; `None` declines.
    fn answer_prompt(&mut self, secret: Option<String>) {
        if let Some(request) = self.state.prompt.take() {
            request.respond(secret);
        }
        self.state.prompt_input.clear();
    }
}

impl App for Word2MdUploader {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_state(ctx);
        self.render(ctx);
    }
}

impl Drop for Word2MdUploader {
    fn drop(&mut self) {
        self.answer_prompt(None);
        self.session.close();
    }
}
