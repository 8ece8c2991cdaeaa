// Backend trait for ice-condition telemetry access
use crate::domain::telemetry::{HistoryResponse, LatestResponse, StatusResponse};
use async_trait::async_trait;
use thiserror::Error;

/// Why a backend request produced no usable response.
///
/// A response with `success: false` is not an error; callers skip that section.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },
    #[error("{endpoint} answered with HTTP {status}")]
    Status { endpoint: String, status: u16 },
    #[error("could not decode {endpoint} response: {message}")]
    Decode { endpoint: String, message: String },
}

#[async_trait]
pub trait TelemetryBackend: Send + Sync {
    /// Latest reading for every location (`/api/latest`)
    async fn fetch_latest(&self) -> Result<LatestResponse, FetchError>;

    /// Aggregate canal status (`/api/status`)
    async fn fetch_status(&self) -> Result<StatusResponse, FetchError>;

    /// Most recent `limit` history points for one location, oldest first
    async fn fetch_history(
        &self,
        location: &str,
        limit: usize,
    ) -> Result<HistoryResponse, FetchError>;
}
