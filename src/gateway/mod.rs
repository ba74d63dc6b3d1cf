mod github;
mod types;

pub use github::{GitHubApi, GitHubGateway};
pub use types::{Identity, RemoteArtifact};

use crate::error::GatewayError;
use async_trait::async_trait;

/// Path-addressed content store backing uploads and conversions.
#[async_trait]
pub trait ContentGateway: Send + Sync {
    /// `sha` must be the current blob sha when replacing an existing file.
    async fn write_file(
        &self,
        path: &str,
        content: &str,
        message: &str,
        sha: Option<&str>,
    ) -> Result<(), GatewayError>;

    async fn read_file(&self, path: &str) -> Result<RemoteArtifact, GatewayError>;

    /// A directory that does not exist yet lists as empty.
    async fn list_directory(&self, path: &str) -> Result<Vec<RemoteArtifact>, GatewayError>;
}

/// Resolves the account that owns a token.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, secret: &str) -> Result<Identity, GatewayError>;
}
