use super::types::ConversionStatus;
use crate::error::GatewayError;
use crate::gateway::ContentGateway;
use crate::session::Session;
use std::sync::Arc;
use tokio::time::{sleep, timeout};

/// Waits for the converted counterpart of each uploaded file.
#[derive(Clone)]
pub struct ConversionPoller {
    session: Arc<Session>,
}

impl ConversionPoller {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// Starts an independent polling task for `name`. The task dies with the session.
    ///
    /// `stale_sha` is the blob sha of the artifact that existed before this upload, if any; that
    /// artifact does not count as the result of the new conversion.
    pub fn enqueue(&self, gateway: Arc<dyn ContentGateway>, name: String, stale_sha: Option<String>) {
        let poller = self.clone();
        let handle = tokio::spawn(async move {
            poller
                .watch(gateway.as_ref(), &name, stale_sha.as_deref())
                .await;
        });
        self.session.track(handle.abort_handle());
    }

    /// Probes until a fresh artifact shows up or the attempt budget runs out, and records the
    /// terminal status.
    pub async fn watch(
        &self,
        gateway: &dyn ContentGateway,
        name: &str,
        stale_sha: Option<&str>,
    ) -> ConversionStatus {
        let config = self.session.config();
        let policy = &config.poll;
        let target = config.converted_path(name);
        let mut last_error: Option<GatewayError> = None;

        sleep(policy.initial_delay()).await;

        for attempt in 1..=policy.max_attempts {
            let probe = timeout(policy.probe_timeout(), gateway.read_file(&target))
                .await
                .unwrap_or_else(|_| Err(GatewayError::TimedOut(policy.probe_timeout())));

            match probe {
                Ok(artifact) if stale_sha == Some(artifact.sha.as_str()) => {
                    tracing::debug!(
                        "{} still holds the previous conversion ({}/{})",
                        target,
                        attempt,
                        policy.max_attempts
                    );
                    last_error = None;
                }
                Ok(_) => {
                    tracing::info!("{} converted after {} probe(s)", name, attempt);
                    self.session.update(name, ConversionStatus::Completed);
                    return ConversionStatus::Completed;
                }
                Err(GatewayError::NotFound) => {
                    tracing::debug!("{} not there yet ({}/{})", target, attempt, policy.max_attempts);
                    last_error = None;
                }
                Err(e) => {
                    tracing::warn!(
                        "Probe {}/{} for {} failed: {}",
                        attempt,
                        policy.max_attempts,
                        target,
                        e
                    );
                    last_error = Some(e);
                }
            }

            if attempt < policy.max_attempts {
                sleep(policy.interval()).await;
            }
        }

        let status = match last_error {
            Some(e) => ConversionStatus::Error(e.to_string()),
            None => ConversionStatus::Timeout,
        };
        tracing::warn!("Gave up waiting for {}: {:?}", target, status);
        self.session.update(name, status.clone());
        status
    }
}
