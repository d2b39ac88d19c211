//! HTTP gateway to the remote scheduling service.
//!
//! Every operation is a fresh request against the configured base URL; the
//! gateway keeps no state between calls and applies no retry policy. A
//! failed call surfaces immediately to its caller as an [`AppError`].

use std::time::{Duration as StdDuration, Instant};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::debug;
use uuid::Uuid;

use crate::error::{ApiErrorCode, AppError, AppResult};
use crate::models::contract::{HealthStatus, PlanRequest, PlanResponse, UploadDescriptor};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

const BASE_URL_ENV: &str = "COURTPLAN_API_BASE_URL";
const TIMEOUT_ENV: &str = "COURTPLAN_HTTP_TIMEOUT_SECS";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub http_timeout: StdDuration,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let base_url = std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let http_timeout = std::env::var(TIMEOUT_ENV)
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .map(StdDuration::from_secs)
            .unwrap_or_else(|| StdDuration::from_secs(30));

        Self {
            base_url,
            http_timeout,
        }
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http_timeout: StdDuration::from_secs(30),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }
}

/// A roster file handed to the upload endpoint, already read into memory.
#[derive(Debug, Clone)]
pub struct RosterFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl RosterFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    fn content_type(&self) -> &'static str {
        match self.filename.rsplit('.').next() {
            Some(ext) if ext.eq_ignore_ascii_case("xlsx") => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            Some(ext) if ext.eq_ignore_ascii_case("csv") => "text/csv",
            _ => "application/octet-stream",
        }
    }
}

/// The four operations the client performs against the planner service.
/// Behind a trait so session operations can be exercised without a server.
#[async_trait]
pub trait PlannerApi: Send + Sync {
    async fn check_health(&self) -> AppResult<HealthStatus>;
    async fn upload_file(&self, file: RosterFile) -> AppResult<UploadDescriptor>;
    async fn submit_plan(&self, request: &PlanRequest) -> AppResult<PlanResponse>;
    async fn get_plan(&self, id: &str) -> AppResult<PlanResponse>;
}

pub struct PlannerClient {
    client: reqwest::Client,
    base_url: String,
}

impl PlannerClient {
    pub fn new(config: &ApiConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .pool_max_idle_per_host(2)
            .pool_idle_timeout(Some(StdDuration::from_secs(90)))
            .build()
            .map_err(|err| AppError::other(format!("failed to build planner HTTP client: {err}")))?;

        let base_url = config.base_url.trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_payload<T: DeserializeOwned>(
        response: reqwest::Response,
        operation: &str,
        correlation_id: &str,
        started: Instant,
    ) -> AppResult<T> {
        let status = response.status();
        if status.is_success() {
            let latency_ms = started.elapsed().as_millis();
            debug!(
                target: "app::api",
                operation,
                correlation_id = %correlation_id,
                status = status.as_u16(),
                latency_ms,
                "planner responded"
            );

            response.json::<T>().await.map_err(|err| {
                AppError::transport_with_detail(
                    ApiErrorCode::InvalidResponse,
                    format!("failed to decode planner response: {err}"),
                    None,
                    Some(correlation_id),
                )
            })
        } else {
            let detail = Self::extract_detail(response).await;
            Err(Self::status_error(status, detail, correlation_id))
        }
    }

    /// Probes an error body for the service's `{"detail": ...}` payload.
    async fn extract_detail(response: reqwest::Response) -> Option<String> {
        let body: JsonValue = response.json().await.ok()?;
        match body.get("detail")? {
            JsonValue::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }

    fn status_error(status: StatusCode, detail: Option<String>, correlation_id: &str) -> AppError {
        let (code, message) = match status {
            StatusCode::NOT_FOUND => (
                ApiErrorCode::NotFound,
                "requested plan was not found".to_string(),
            ),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => (
                ApiErrorCode::InvalidRequest,
                format!("planner rejected the request (status {})", status.as_u16()),
            ),
            status if status.is_server_error() => (
                ApiErrorCode::Unavailable,
                format!(
                    "planner service is temporarily unavailable (status {})",
                    status.as_u16()
                ),
            ),
            status => (
                ApiErrorCode::Unknown,
                format!("planner returned status {}", status.as_u16()),
            ),
        };

        AppError::transport_with_detail(code, message, detail, Some(correlation_id))
    }

    fn request_error(err: reqwest::Error, correlation_id: &str) -> AppError {
        let (code, message) = if err.is_timeout() {
            (
                ApiErrorCode::Timeout,
                "planner request timed out".to_string(),
            )
        } else if err.is_connect() {
            (
                ApiErrorCode::Connect,
                format!("failed to reach the planner service: {err}"),
            )
        } else {
            (ApiErrorCode::Unknown, format!("planner request failed: {err}"))
        };

        AppError::transport_with_detail(code, message, None, Some(correlation_id))
    }
}

#[async_trait]
impl PlannerApi for PlannerClient {
    async fn check_health(&self) -> AppResult<HealthStatus> {
        let correlation_id = Uuid::new_v4().to_string();
        debug!(target: "app::api", operation = "checkHealth", correlation_id = %correlation_id, "calling planner");

        let started = Instant::now();
        let response = self
            .client
            .get(self.endpoint("/health"))
            .send()
            .await
            .map_err(|err| Self::request_error(err, &correlation_id))?;

        Self::read_payload(response, "checkHealth", &correlation_id, started).await
    }

    async fn upload_file(&self, file: RosterFile) -> AppResult<UploadDescriptor> {
        let correlation_id = Uuid::new_v4().to_string();
        debug!(
            target: "app::api",
            operation = "uploadFile",
            correlation_id = %correlation_id,
            filename = %file.filename,
            size = file.bytes.len(),
            "calling planner"
        );

        let content_type = file.content_type();
        let part = reqwest::multipart::Part::bytes(file.bytes)
            .file_name(file.filename.clone())
            .mime_str(content_type)
            .map_err(|err| AppError::other(format!("failed to build multipart body: {err}")))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let started = Instant::now();
        let response = self
            .client
            .post(self.endpoint("/upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|err| Self::request_error(err, &correlation_id))?;

        Self::read_payload(response, "uploadFile", &correlation_id, started).await
    }

    async fn submit_plan(&self, request: &PlanRequest) -> AppResult<PlanResponse> {
        let correlation_id = Uuid::new_v4().to_string();
        debug!(
            target: "app::api",
            operation = "submitPlan",
            correlation_id = %correlation_id,
            courts = request.courts.len(),
            groups = request.groups.len(),
            constraints = request.constraints.len(),
            "calling planner"
        );

        let started = Instant::now();
        let response = self
            .client
            .post(self.endpoint("/schedule/plan"))
            .json(request)
            .send()
            .await
            .map_err(|err| Self::request_error(err, &correlation_id))?;

        Self::read_payload(response, "submitPlan", &correlation_id, started).await
    }

    async fn get_plan(&self, id: &str) -> AppResult<PlanResponse> {
        let correlation_id = Uuid::new_v4().to_string();
        debug!(target: "app::api", operation = "getPlan", correlation_id = %correlation_id, plan_id = %id, "calling planner");

        let started = Instant::now();
        let response = self
            .client
            .get(self.endpoint(&format!("/schedule/{id}")))
            .send()
            .await
            .map_err(|err| Self::request_error(err, &correlation_id))?;

        Self::read_payload(response, "getPlan", &correlation_id, started).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_falls_back_to_default_base_url() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.http_timeout, StdDuration::from_secs(30));
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = PlannerClient::new(&ApiConfig::with_base_url("http://localhost:8000/"))
            .expect("client");
        assert_eq!(client.endpoint("/health"), "http://localhost:8000/health");
    }

    #[test]
    fn roster_content_type_follows_extension() {
        assert_eq!(
            RosterFile::new("roster.csv", Vec::new()).content_type(),
            "text/csv"
        );
        assert_eq!(
            RosterFile::new("roster.XLSX", Vec::new()).content_type(),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
        assert_eq!(
            RosterFile::new("notes.docx", Vec::new()).content_type(),
            "application/octet-stream"
        );
    }
}
