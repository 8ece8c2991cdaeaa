// HTTP backend implementation over reqwest
use crate::application::telemetry_backend::{FetchError, TelemetryBackend};
use crate::domain::telemetry::{HistoryResponse, LatestResponse, StatusResponse};
use anyhow::Context;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn history_path(location: &str, limit: usize) -> String {
        format!(
            "/api/history/{}?limit={}",
            urlencoding::encode(location),
            limit
        )
    }

    /// GET and decode a JSON body.
    ///
    /// Non-2xx answers are still decoded so a `success: false` body is honoured;
    /// only an undecodable non-2xx answer becomes `FetchError::Status`.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        let transport = |e: reqwest::Error| FetchError::Transport {
            endpoint: path.to_string(),
            message: e.to_string(),
        };

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let body = response.bytes().await.map_err(transport)?;

        match serde_json::from_slice::<T>(&body) {
            Ok(decoded) => {
                if !status.is_success() {
                    tracing::warn!("{} answered {} with a JSON body", path, status);
                }
                Ok(decoded)
            }
            Err(_) if !status.is_success() => Err(FetchError::Status {
                endpoint: path.to_string(),
                status: status.as_u16(),
            }),
            Err(e) => Err(FetchError::Decode {
                endpoint: path.to_string(),
                message: e.to_string(),
            }),
        }
    }
}

#[async_trait]
impl TelemetryBackend for HttpBackend {
    async fn fetch_latest(&self) -> Result<LatestResponse, FetchError> {
        self.get_json("/api/latest").await
    }

    async fn fetch_status(&self) -> Result<StatusResponse, FetchError> {
        self.get_json("/api/status").await
    }

    async fn fetch_history(
        &self,
        location: &str,
        limit: usize,
    ) -> Result<HistoryResponse, FetchError> {
        self.get_json(&Self::history_path(location, limit)).await
    }
}
