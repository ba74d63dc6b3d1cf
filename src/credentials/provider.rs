use async_trait::async_trait;
use std::sync::mpsc::Sender;
use tokio::sync::oneshot;

/// Why the user is being asked for a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptReason {
    Missing,
    Rejected,
}

impl PromptReason {
    pub fn message(&self) -> &'static str {
        match self {
            PromptReason::Missing => "Enter a GitHub personal access token with repo access.",
            PromptReason::Rejected => {
                "GitHub rejected the stored token. Enter a new one to continue."
            }
        }
    }
}

/// Source of a fresh token when none is stored or the stored one is rejected.
/// `None` means the user declined.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn request(&self, reason: PromptReason) -> Option<String>;
}

/// A pending prompt handed to whoever owns the input surface.
#[derive(Debug)]
pub struct PromptRequest {
    pub reason: PromptReason,
    reply: oneshot::Sender<Option<String>>,
}

impl PromptRequest {
    pub fn respond(self, secret: Option<String>) {
        // Receiver gone means the session was torn down; nothing left to answer.
        let _ = self.reply.send(secret);
    }
}

/// Forwards prompts over a channel and waits for the answer.
#[derive(Debug, Clone)]
pub struct ChannelProvider {
    requests: Sender<PromptRequest>,
}

impl ChannelProvider {
    pub fn new(requests: Sender<PromptRequest>) -> Self {
        Self { requests }
    }
}

#[async_trait]
impl CredentialProvider for ChannelProvider {
    async fn request(&self, reason: PromptReason) -> Option<String> {
        let (reply, answer) = oneshot::channel();
        if self.requests.send(PromptRequest { reason, reply }).is_err() {
            tracing::warn!("No prompt surface available for credential request");
            return None;
        }
        answer.await.ok().flatten()
    }
}
