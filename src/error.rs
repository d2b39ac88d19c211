use std::fmt;

use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{error, warn};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCode {
    Timeout,
    Connect,
    Unavailable,
    NotFound,
    InvalidRequest,
    InvalidResponse,
    Unknown,
}

impl ApiErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ApiErrorCode::Timeout => "HTTP_TIMEOUT",
            ApiErrorCode::Connect => "CONNECTION_FAILED",
            ApiErrorCode::Unavailable => "SERVICE_UNAVAILABLE",
            ApiErrorCode::NotFound => "NOT_FOUND",
            ApiErrorCode::InvalidRequest => "INVALID_REQUEST",
            ApiErrorCode::InvalidResponse => "INVALID_RESPONSE",
            ApiErrorCode::Unknown => "UNKNOWN_API_ERROR",
        }
    }
}

impl fmt::Display for ApiErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Transport {
        code: ApiErrorCode,
        message: String,
        detail: Option<String>,
        correlation_id: Option<String>,
    },

    #[error("validation failed: {message}")]
    Validation {
        message: String,
        details: Option<JsonValue>,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "app::validation", %message, "validation error");
        AppError::Validation {
            message,
            details: None,
        }
    }

    pub fn validation_with_details(message: impl Into<String>, details: JsonValue) -> Self {
        let message = message.into();
        warn!(target: "app::validation", %message, details = %details, "validation error with details");
        AppError::Validation {
            message,
            details: Some(details),
        }
    }

    pub fn transport(code: ApiErrorCode, message: impl Into<String>) -> Self {
        Self::transport_with_detail(code, message, None, None)
    }

    pub fn transport_with_detail(
        code: ApiErrorCode,
        message: impl Into<String>,
        detail: Option<String>,
        correlation_id: Option<&str>,
    ) -> Self {
        let message = message.into();
        let correlation = correlation_id.map(|value| value.to_string());
        match (&correlation, &detail) {
            (Some(id), Some(text)) => {
                warn!(
                    target: "app::api::error",
                    code = %code,
                    correlation_id = %id,
                    detail = %text,
                    %message
                );
            }
            (Some(id), None) => {
                warn!(target: "app::api::error", code = %code, correlation_id = %id, %message);
            }
            (None, Some(text)) => {
                warn!(target: "app::api::error", code = %code, detail = %text, %message);
            }
            (None, None) => {
                warn!(target: "app::api::error", code = %code, %message);
            }
        }

        AppError::Transport {
            code,
            message,
            detail,
            correlation_id: correlation,
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "app::other", %message, "other error");
        AppError::Other(message)
    }

    pub fn code(&self) -> Option<ApiErrorCode> {
        match self {
            AppError::Transport { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn correlation_id(&self) -> Option<&str> {
        match self {
            AppError::Transport { correlation_id, .. } => correlation_id.as_deref(),
            _ => None,
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            AppError::Transport { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.code() == Some(ApiErrorCode::NotFound)
    }

    /// Text shown to the user. A server-supplied detail wins over the
    /// generic transport message when both are present.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Transport {
                detail: Some(detail),
                ..
            } => detail.clone(),
            AppError::Validation { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
