// ============================================================================
// TopSteel API - Error Mapping
// File: crates/topsteel-api/src/error.rs
// ============================================================================
//! HTTP error type and its mapping from [`DomainError`]

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use topsteel_core::DomainError;

use crate::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Domain(e) => match e {
                e if e.is_not_found() => StatusCode::NOT_FOUND,
                e if e.is_conflict() => StatusCode::CONFLICT,
                DomainError::ActiveConfigurationProtected => StatusCode::CONFLICT,
                DomainError::SystemConfigurationProtected(_) | DomainError::ParameterReadonly { .. } => {
                    StatusCode::FORBIDDEN
                }
                DomainError::InvalidParent { .. }
                | DomainError::MenuTreeCycle(_)
                | DomainError::MalformedPreferencePayload(_)
                | DomainError::InvalidParameterValue { .. }
                | DomainError::ValidationError(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Domain(e) => match e {
                DomainError::ConfigurationNotFound(_)
                | DomainError::MenuItemNotFound(_)
                | DomainError::PreferenceNotFound { .. }
                | DomainError::ParameterNotFound { .. } => "NOT_FOUND",
                DomainError::NoActiveConfiguration => "NO_ACTIVE_CONFIGURATION",
                DomainError::ConfigurationNameAlreadyExists(_) | DomainError::ParameterAlreadyExists { .. } => {
                    "ALREADY_EXISTS"
                }
                DomainError::VersionConflict { .. } => "VERSION_CONFLICT",
                DomainError::SystemConfigurationProtected(_) => "SYSTEM_CONFIGURATION_PROTECTED",
                DomainError::ActiveConfigurationProtected => "ACTIVE_CONFIGURATION_PROTECTED",
                DomainError::ParameterReadonly { .. } => "PARAMETER_READONLY",
                DomainError::InvalidParent { .. } | DomainError::MenuTreeCycle(_) => "INVALID_MENU_TREE",
                DomainError::MalformedPreferencePayload(_) => "MALFORMED_PAYLOAD",
                DomainError::InvalidParameterValue { .. } | DomainError::ValidationError(_) => "VALIDATION_ERROR",
                DomainError::CacheError(_) | DomainError::DatabaseError(_) | DomainError::InternalError(_) => {
                    "INTERNAL_ERROR"
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        let message = if status.is_server_error() {
            tracing::error!(error = %self, code, status = status.as_u16(), "Server error");
            "Internal server error".to_string()
        } else {
            tracing::warn!(error = %self, code, status = status.as_u16(), "Client error");
            self.to_string()
        };

        (status, Json(ApiResponse::<()>::error(code, &message))).into_response()
    }
}
