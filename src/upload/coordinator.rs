use super::poller::ConversionPoller;
use super::types::{BatchReport, ConversionStatus, UploadFile};
use crate::error::{GatewayError, UploadError};
use crate::gateway::{ContentGateway, RemoteArtifact};
use crate::session::{Session, SessionEvent};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

pub fn encode_content(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Accepts the line-wrapped base64 the contents API returns.
pub fn decode_content(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD.decode(compact)
}

/// Writes a batch to the uploads directory, one file at a time, and hands each success to the
/// poller.
#[derive(Clone)]
pub struct UploadCoordinator {
    session: Arc<Session>,
    poller: ConversionPoller,
}

impl UploadCoordinator {
    pub fn new(session: Arc<Session>) -> Self {
        let poller = ConversionPoller::new(session.clone());
        Self { session, poller }
    }

    pub async fn submit(&self, batch: Vec<UploadFile>) -> Result<BatchReport, UploadError> {
        let gateway = self.session.gateway()?;
        let config = self.session.config();
        let mut report = BatchReport::default();

        tracing::info!("Uploading batch of {} file(s)", batch.len());

        for file in batch {
            if !config.is_accepted(&file.name) {
                tracing::debug!("Skipping {}: unsupported type", file.name);
                report
                    .skipped
                    .push((file.name, "Unsupported file type".to_string()));
                continue;
            }
            if !self.session.begin(&file.name) {
                tracing::debug!("Skipping {}: conversion already in progress", file.name);
                report
                    .skipped
                    .push((file.name, "Already converting".to_string()));
                continue;
            }

            match self.upload_file(gateway.as_ref(), &file).await {
                Ok(stale_sha) => {
                    tracing::info!("Uploaded {}", file.name);
                    self.poller
                        .enqueue(gateway.clone(), file.name.clone(), stale_sha);
                    report.uploaded.push(file.name);
                }
                Err(message) => {
                    tracing::warn!("Upload of {} failed: {}", file.name, message);
                    self.session
                        .update(&file.name, ConversionStatus::Error(message.clone()));
                    report.failed.push((file.name, message));
                }
            }
        }

        self.session
            .notify(SessionEvent::BatchFinished(report.clone()));
        Ok(report)
    }

    /// Writes one file and returns the sha of the converted artifact it supersedes, if any.
    async fn upload_file(
        &self,
        gateway: &dyn ContentGateway,
        file: &UploadFile,
    ) -> Result<Option<String>, String> {
        let config = self.session.config();
        let limit = config.request_timeout();
        let bytes = file
            .read()
            .await
            .map_err(|e| format!("Failed to read file: {}", e))?;
        let content = encode_content(&bytes);
        let path = config.upload_path(&file.name);

        // Replacing an earlier upload of the same name needs its blob sha.
        let upload_sha = existing_sha(limit, gateway.read_file(&path)).await?;
        // Recorded before the write so a fast conversion is not mistaken for the old one.
        let stale_sha =
            existing_sha(limit, gateway.read_file(&config.converted_path(&file.name))).await?;

        let message = format!("Upload {} for conversion", file.name);
        bounded(
            limit,
            gateway.write_file(&path, &content, &message, upload_sha.as_deref()),
        )
        .await
        .map_err(|e| e.to_string())?;
        Ok(stale_sha)
    }
}

async fn bounded<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, GatewayError>>,
) -> Result<T, GatewayError> {
    timeout(limit, call)
        .await
        .unwrap_or_else(|_| Err(GatewayError::TimedOut(limit)))
}

async fn existing_sha(
    limit: Duration,
    lookup: impl Future<Output = Result<RemoteArtifact, GatewayError>>,
) -> Result<Option<String>, String> {
    match bounded(limit, lookup).await {
        Ok(existing) => Ok(Some(existing.sha)),
        Err(GatewayError::NotFound) => Ok(None),
        Err(e) => Err(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_round_trips_every_byte_value() {
        let bytes: Vec<u8> = (0..=255u8).cycle().take(1031).collect();
        assert_eq!(decode_content(&encode_content(&bytes)).unwrap(), bytes);
        assert_eq!(decode_content(&encode_content(&[])).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn decode_tolerates_wrapped_lines() {
        let encoded = encode_content(b"PK\x03\x04 word document body");
        let (head, tail) = encoded.split_at(10);
        let wrapped = format!("{}\n{}\n", head, tail);
        assert_eq!(
            decode_content(&wrapped).unwrap(),
            b"PK\x03\x04 word document body".to_vec()
        );
    }
}
