use crate::config::UploaderConfig;
use crate::credentials::PromptRequest;
use crate::error::CredentialError;
use crate::gateway::Identity;
use crate::upload::{BatchReport, ConversionStatus, FileStatus};
use crate::view::DisplayRow;
use std::time::{Duration, Instant};

const BANNER_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Info,
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
    shown_at: Instant,
}

impl Banner {
    pub fn new(kind: BannerKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            shown_at: Instant::now(),
        }
    }

    /// Success and danger banners fade out; info and warning stay until replaced.
    pub fn expired(&self, now: Instant) -> bool {
        matches!(self.kind, BannerKind::Success | BannerKind::Danger)
            && now.duration_since(self.shown_at) >= BANNER_TTL
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Ready { login: String },
    /// Uploads stay disabled until the user supplies a working token.
    Disabled { reason: String },
}

#[derive(Default)]
pub struct UploadState {
    pub banner: Option<Banner>,
    pub rows: Vec<DisplayRow>,
    pub file_statuses: Vec<FileStatus>,
    pub show_details: bool,
    pub is_uploading: bool,
    pub is_refreshing: bool,
    pub refresh_queued: bool,
    pub connection: Option<ConnectionState>,
    pub prompt: Option<PromptRequest>,
    pub prompt_input: String,
}

impl UploadState {
    pub fn show(&mut self, kind: BannerKind, message: impl Into<String>) {
        self.banner = Some(Banner::new(kind, message));
    }

    pub fn expire_banner(&mut self, now: Instant) {
        if self.banner.as_ref().is_some_and(|b| b.expired(now)) {
            self.banner = None;
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.connection, Some(ConnectionState::Ready { .. }))
    }

    pub fn can_upload(&self) -> bool {
        self.is_connected() && !self.is_uploading
    }

    /// Why a submission would be refused right now, if it would.
    pub fn upload_blocker(&self) -> Option<&'static str> {
        if !self.is_connected() {
            Some("Connect to GitHub before uploading.")
        } else if self.is_uploading {
            Some("Wait for the current upload to finish.")
        } else {
            None
        }
    }

    /// Applies the outcome of credential resolution. Returns whether uploads are now possible.
    pub fn on_connected(&mut self, result: Result<Identity, CredentialError>) -> bool {
        match result {
            Ok(identity) => {
                self.show(
                    BannerKind::Success,
                    format!("Ready. Connected as {}.", identity.login),
                );
                self.connection = Some(ConnectionState::Ready {
                    login: identity.login,
                });
                true
            }
            Err(e) => {
                tracing::warn!("Could not connect: {}", e);
                let banner = match e {
                    CredentialError::NoCredential => {
                        "No GitHub token provided. Uploads are disabled.".to_string()
                    }
                    CredentialError::InvalidCredential => {
                        "GitHub rejected the token. Uploads are disabled.".to_string()
                    }
                    ref other => format!("Could not connect to GitHub: {}", other),
                };
                self.connection = Some(ConnectionState::Disabled {
                    reason: e.to_string(),
                });
                self.show(BannerKind::Danger, banner);
                false
            }
        }
    }

    /// Records a status change in the details log and announces terminal outcomes.
    pub fn on_status(&mut self, status: FileStatus, config: &UploaderConfig) {
        let converted = config.converted_name(&status.name);
        match &status.status {
            ConversionStatus::Uploading => {}
            ConversionStatus::Completed => {
                self.show(BannerKind::Success, format!("{} is ready", converted))
            }
            ConversionStatus::Timeout => self.show(
                BannerKind::Warning,
                format!(
                    "Timed out waiting for {}. It may still appear later.",
                    converted
                ),
            ),
            ConversionStatus::Error(message) => {
                self.show(BannerKind::Danger, format!("{}: {}", status.name, message))
            }
        }
        self.file_statuses.push(status);
    }

    pub fn pending_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| r.state == crate::view::RowState::Pending)
            .count()
    }

    /// Banner summarising a finished batch.
    pub fn report_batch(&mut self, report: &BatchReport) {
        if !report.failed.is_empty() {
            let details: Vec<String> = report
                .failed
                .iter()
                .map(|(name, message)| format!("{}: {}", name, message))
                .collect();
            self.show(
                BannerKind::Danger,
                format!(
                    "{} of {} upload(s) failed. {}",
                    report.failed.len(),
                    report.total(),
                    details.join("; ")
                ),
            );
        } else if !report.skipped.is_empty() {
            let names: Vec<&str> = report.skipped.iter().map(|(n, _)| n.as_str()).collect();
            self.show(
                BannerKind::Warning,
                format!(
                    "Uploaded {} file(s), skipped {}: {}",
                    report.uploaded.len(),
                    report.skipped.len(),
                    names.join(", ")
                ),
            );
        } else if !report.uploaded.is_empty() {
            self.show(
                BannerKind::Success,
                format!(
                    "Uploaded {} file(s). Waiting for conversion...",
                    report.uploaded.len()
                ),
            );
        }
    }
}
