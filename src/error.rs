use axum::{
    http::StatusCode,
    response::{ IntoResponse, Response },
    Json,
};
use log::{ error, warn };
use serde_json::json;
use thiserror::Error;

use crate::agent::AgentError;
use crate::appointments::AppointmentError;
use crate::history::ConversationError;
use crate::llm::chat::LlmError;

/// Errors surfaced by the HTTP layer. Domain errors convert into these.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{}: {}", status, self);
        } else {
            warn!("{}: {}", status, self);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::ProviderNotFound(_) => AppError::NotFound("Provider not found".into()),
            AppointmentError::SlotUnavailable { .. } =>
                AppError::Conflict(
                    "Failed to create appointment. The time slot may no longer be available.".into()
                ),
            AppointmentError::Invite(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<ConversationError> for AppError {
    fn from(err: ConversationError) -> Self {
        match err {
            ConversationError::NotFound(_) => AppError::NotFound(err.to_string()),
        }
    }
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        AppError::Upstream(err.to_string())
    }
}

impl From<AgentError> for AppError {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::Conversation(e) => e.into(),
            AgentError::Llm(e) => e.into(),
        }
    }
}

/// Failures while reading provider or schedule data at startup.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in '{path}': {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("invalid record in '{path}': {message}")]
    Record {
        path: String,
        message: String,
    },
}
