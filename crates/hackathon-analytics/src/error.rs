use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::hackathon::{status_for, ExportError, HackathonServiceError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Top-level failure for the binaries and for handlers mounted outside the workflow router.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
    #[error("export error: {0}")]
    Export(#[from] ExportError),
    #[error("hackathon error: {0}")]
    Hackathon(#[from] HackathonServiceError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Hackathon(err) => status_for(err),
            AppError::Snapshot(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
