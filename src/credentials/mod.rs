mod provider;
mod storage;

pub use provider::{ChannelProvider, CredentialProvider, PromptReason, PromptRequest};
pub use storage::{FileSecretStorage, MemorySecretStorage, SecretStorage};

use crate::error::{CredentialError, GatewayError};
use crate::gateway::{Identity, IdentityVerifier};
use derivative::Derivative;
use std::sync::Arc;

/// A GitHub token. Never printed.
#[derive(Derivative, Clone, PartialEq, Eq)]
#[derivative(Debug)]
pub struct Credential {
    #[derivative(Debug = "ignore")]
    secret: String,
}

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into().trim().to_string(),
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

pub struct CredentialStore {
    storage: Arc<dyn SecretStorage>,
    verifier: Arc<dyn IdentityVerifier>,
    provider: Arc<dyn CredentialProvider>,
}

impl CredentialStore {
    pub fn new(
        storage: Arc<dyn SecretStorage>,
        verifier: Arc<dyn IdentityVerifier>,
        provider: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            storage,
            verifier,
            provider,
        }
    }

    /// Returns a verified credential, prompting when none is stored. A rejected token triggers
    /// exactly one more prompt before giving up.
    pub async fn ensure_credential(&self) -> Result<(Credential, Identity), CredentialError> {
        let credential = match self.storage.load()? {
            Some(secret) => Credential::new(secret),
            None => self.prompt(PromptReason::Missing).await?,
        };

        match self.validate(&credential).await {
            Ok(identity) => Ok((credential, identity)),
            Err(CredentialError::InvalidCredential) => {
                tracing::info!("Stored token rejected, asking for a new one");
                let retry = self.prompt(PromptReason::Rejected).await?;
                let identity = self.validate(&retry).await?;
                Ok((retry, identity))
            }
            Err(e) => Err(e),
        }
    }

    /// Checks the token against the identity endpoint. Any non-success answer clears storage.
    pub async fn validate(&self, credential: &Credential) -> Result<Identity, CredentialError> {
        match self.verifier.verify(credential.secret()).await {
            Ok(identity) => {
                tracing::info!("Authenticated as {}", identity.login);
                Ok(identity)
            }
            Err(GatewayError::Read { status, message }) => {
                tracing::warn!("Token rejected ({}): {}", status, message);
                self.storage.clear()?;
                Err(CredentialError::InvalidCredential)
            }
            Err(GatewayError::InvalidHeader) => {
                tracing::warn!("Token is not a valid header value");
                self.storage.clear()?;
                Err(CredentialError::InvalidCredential)
            }
            Err(e) => Err(CredentialError::Gateway(e)),
        }
    }

    /// Removes the stored token.
    pub fn forget(&self) -> Result<(), CredentialError> {
        self.storage.clear()?;
        Ok(())
    }

    async fn prompt(&self, reason: PromptReason) -> Result<Credential, CredentialError> {
        let credential = self
            .provider
            .request(reason)
            .await
            .map(Credential::new)
            .filter(|c| !c.secret().is_empty())
            .ok_or(CredentialError::NoCredential)?;
        self.storage.save(credential.secret())?;
        Ok(credential)
    }
}
