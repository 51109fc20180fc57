use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{detail}")]
    Rejected {
        message: Option<String>,
        detail: String,
    },
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{message}: {source}")]
    Storage {
        message: String,
        #[source]
        source: StoreError,
    },
    #[error("blocking task was cancelled")]
    Blocking(#[from] actix_web::error::BlockingError),
}

/// JSON body of every error response. `error` is always present,
/// `message` only when there is a summary on top of the detail.
#[derive(Serialize, Debug)]
pub struct ErrorBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'a str>,
    pub error: String,
}

impl ApiError {
    pub fn rejected(message: impl Into<String>, detail: impl ToString) -> Self {
        ApiError::Rejected {
            message: Some(message.into()),
            detail: detail.to_string(),
        }
    }

    pub fn invalid(detail: impl ToString) -> Self {
        ApiError::Rejected {
            message: None,
            detail: detail.to_string(),
        }
    }

    /// Replaces the summary of a storage failure.
    pub fn context(self, message: &str) -> Self {
        match self {
            ApiError::Storage { source, .. } => ApiError::Storage {
                message: message.to_string(),
                source,
            },
            other => other,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(source: StoreError) -> Self {
        ApiError::Storage {
            message: "Transaction log unavailable".to_string(),
            source,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Rejected { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Storage { .. } | ApiError::Blocking(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::Rejected { message, detail } => ErrorBody {
                message: message.as_deref(),
                error: detail.clone(),
            },
            ApiError::NotFound(message) => ErrorBody {
                message: Some(message.as_str()),
                error: message.clone(),
            },
            ApiError::Conflict(detail) => ErrorBody {
                message: None,
                error: detail.clone(),
            },
            ApiError::Storage { message, source } => ErrorBody {
                message: Some(message.as_str()),
                error: source.to_string(),
            },
            ApiError::Blocking(e) => ErrorBody {
                message: None,
                error: e.to_string(),
            },
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}
