use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failures of the GitHub contents API layer.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The path does not exist (yet). Expected while waiting for a conversion.
    #[error("not found")]
    NotFound,
    #[error("write failed ({status}): {message}")]
    Write { status: u16, message: String },
    #[error("read failed ({status}): {message}")]
    Read { status: u16, message: String },
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    /// No answer within the allotted time.
    #[error("no response within {0:?}")]
    TimedOut(Duration),
    #[error("invalid API base url: {0}")]
    BaseUrl(String),
    #[error("credential contains characters not allowed in a header")]
    InvalidHeader,
}

impl GatewayError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::NotFound)
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access credential file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum CredentialError {
    /// The user declined to provide a token.
    #[error("no GitHub token provided")]
    NoCredential,
    /// GitHub rejected the token; it has been removed from storage.
    #[error("GitHub rejected the token")]
    InvalidCredential,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("could not verify token: {0}")]
    Gateway(#[from] GatewayError),
}

#[derive(Debug, Error)]
pub enum UploadError {
    /// Submitted before a credential was resolved.
    #[error("not connected to GitHub yet")]
    NotReady,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid accepted pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    NotReady(#[from] UploadError),
    #[error("could not list converted files: {0}")]
    Gateway(#[from] GatewayError),
}

/// Failures while bringing the window up.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("window error: {0}")]
    Ui(String),
}
