use crate::config::PublishConfig;
use crate::constants::PUBLISH_TOKEN_ENV;
use crate::error::{ReportError, Result};
use crate::types::{ComposedArtifact, PublishReceipt};
use async_trait::async_trait;
use chrono::Utc;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Boundary handing the composed artifact to the external publishing
/// service. The core treats it as opaque: no retries, errors surface
/// upward unchanged.
#[async_trait]
pub trait PublisherPort: Send + Sync {
    async fn publish(&self, artifact: &ComposedArtifact) -> Result<PublishReceipt>;
}

/// Posts the artifact to the configured endpoint as a multipart form, with a
/// bearer token taken from the environment.
pub struct HttpPublisher {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPublisher {
    pub fn new(config: &PublishConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
        }
    }
}

#[async_trait]
impl PublisherPort for HttpPublisher {
    async fn publish(&self, artifact: &ComposedArtifact) -> Result<PublishReceipt> {
        let token = std::env::var(PUBLISH_TOKEN_ENV)?;

        let media = reqwest::multipart::Part::bytes(artifact.image.clone())
            .file_name("report.png")
            .mime_str("image/png")
            .map_err(|e| ReportError::Publish(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .text("status", artifact.text.clone())
            .part("media", media);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ReportError::Publish(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ReportError::Publish(format!(
                "publisher responded with HTTP {}",
                status.as_u16()
            )));
        }

        let id = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|v| v.get("id").map(|id| id.to_string()))
            .unwrap_or_else(|| format!("http-{}", status.as_u16()));
        info!(id = %id, "artifact accepted by publisher");
        Ok(PublishReceipt {
            id,
            published_at: Utc::now(),
        })
    }
}

/// Writes the artifact into the output directory instead of publishing.
/// Backs `--dry-run` and the `preview` subcommand.
pub struct FileSink {
    output_dir: PathBuf,
}

impl FileSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

#[async_trait]
impl PublisherPort for FileSink {
    async fn publish(&self, artifact: &ComposedArtifact) -> Result<PublishReceipt> {
        fs::create_dir_all(&self.output_dir)?;

        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let text_path = self.output_dir.join(format!("report_{timestamp}.txt"));
        let image_path = self.output_dir.join(format!("report_{timestamp}.png"));
        fs::write(&text_path, &artifact.text)?;
        fs::write(&image_path, &artifact.image)?;

        info!(text = %text_path.display(), image = %image_path.display(), "wrote artifact to disk");
        Ok(PublishReceipt {
            id: image_path.to_string_lossy().into_owned(),
            published_at: Utc::now(),
        })
    }
}
