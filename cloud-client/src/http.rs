//! HTTP client for the helper service

use crate::types::{
    CloudFile, DeleteTarget, DownloadRequest, Empty, Envelope, LatestFile, ListBody,
    PatternRequest, PulledFile, RemoteFileId, UploadBody, UploadRequest,
};
use crate::{ClientConfig, ClientError, ClientResult};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// HTTP client for the helper service
#[derive(Debug, Clone)]
pub struct HelperClient {
    client: Client,
    base_url: String,
}

impl HelperClient {
    /// Create a new client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Make a POST request with JSON body
    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> ClientResult<T> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Self::handle_response(response).await
    }

    /// Handle the HTTP response
    ///
    /// The service reports failures in the body (`"status": "error"`) and
    /// usually with a non-2xx status; both are checked.
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        let text = response.text().await?;

        let value: Value = match serde_json::from_str(&text) {
            Ok(v) => v,
            Err(_) if !status.is_success() => {
                return Err(ClientError::Service {
                    status: status.as_u16(),
                    message: text,
                });
            }
            Err(e) => return Err(e.into()),
        };

        let envelope: Envelope<Value> = serde_json::from_value(value.clone())
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        if !envelope.is_success() || !status.is_success() {
            let message = envelope
                .message
                .unwrap_or_else(|| "Unknown error".to_string());
            return match status {
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(message)),
                _ => Err(ClientError::Service {
                    status: status.as_u16(),
                    message,
                }),
            };
        }

        if let Some(message) = envelope.message.as_deref() {
            tracing::debug!(message, "Helper service response");
        }

        serde_json::from_value(value).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    // ========== Service API ==========

    /// Check the service answers at all
    pub async fn ping(&self) -> ClientResult<()> {
        self.client.get(self.url("")).send().await?;
        Ok(())
    }

    /// Upload a local file (path on the helper's machine) under `drive_filename`
    pub async fn upload(&self, file_path: &str, drive_filename: &str) -> ClientResult<RemoteFileId> {
        let request = UploadRequest {
            file_path,
            drive_filename,
        };
        let body: UploadBody = self.post("/upload", &request).await?;
        tracing::info!(file_path, drive_filename, file_id = %body.file_id, "Uploaded file");
        Ok(body.file_id)
    }

    /// Download a remote file into the helper's data directory
    pub async fn download(&self, file_id: &str, dest_filename: &str) -> ClientResult<()> {
        let request = DownloadRequest {
            file_id,
            dest_path: dest_filename,
        };
        let _: Empty = self.post("/download", &request).await?;
        Ok(())
    }

    /// Newest remote file named `<prefix>…<suffix>` (by name, descending)
    pub async fn latest_file_id(&self, prefix: &str, suffix: &str) -> ClientResult<LatestFile> {
        self.post("/latest_db_file_id", &PatternRequest { prefix, suffix })
            .await
    }

    /// Download the newest remote file named `<prefix>…<suffix>`
    pub async fn pull_latest_db(&self, prefix: &str, suffix: &str) -> ClientResult<PulledFile> {
        let pulled: PulledFile = self
            .post("/pull_latest_db", &PatternRequest { prefix, suffix })
            .await?;
        tracing::info!(name = %pulled.name, local_path = %pulled.local_path, "Pulled latest file");
        Ok(pulled)
    }

    /// List remote files named `<prefix>…<suffix>`
    pub async fn list(&self, prefix: &str, suffix: &str) -> ClientResult<Vec<CloudFile>> {
        let body: ListBody = self.post("/list", &PatternRequest { prefix, suffix }).await?;
        Ok(body.files)
    }

    /// Delete a remote file by id or by name
    pub async fn delete(&self, target: &DeleteTarget) -> ClientResult<()> {
        let _: Empty = self.post("/delete", target).await?;
        tracing::info!(?target, "Deleted remote file");
        Ok(())
    }

    /// Ask the service to exit. The reply is plain text, so only the status
    /// is checked.
    pub async fn shutdown(&self) -> ClientResult<()> {
        let response = self.client.post(self.url("/shutdown")).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Service {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }
        Ok(())
    }
}
