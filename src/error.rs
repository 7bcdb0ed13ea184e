use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;

use crate::store::StoreError;

/// Why a portal interaction stopped.
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error("Please enter your company email.")]
    EmptyEmail,

    /// Query string or JSON body that could not be read.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Email not found. Contact HR.")]
    NotFound,

    #[error("Your account is inactive.")]
    Inactive,

    #[error("Already punched in today")]
    AlreadyPunchedIn,

    #[error("No punch-in found for today")]
    NotPunchedIn,

    #[error("Already punched out today")]
    AlreadyPunchedOut,

    #[error("No shift rule named {0:?}")]
    ShiftNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ResponseError for PortalError {
    fn status_code(&self) -> StatusCode {
        match self {
            PortalError::EmptyEmail | PortalError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            PortalError::NotFound => StatusCode::NOT_FOUND,
            PortalError::Inactive => StatusCode::FORBIDDEN,
            PortalError::AlreadyPunchedIn
            | PortalError::NotPunchedIn
            | PortalError::AlreadyPunchedOut => StatusCode::CONFLICT,
            PortalError::ShiftNotFound(_) | PortalError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            PortalError::ShiftNotFound(_) | PortalError::Store(_) => {
                tracing::error!(error = %self, "Attendance request failed");
                "Something went wrong, Contact with system admin".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}
