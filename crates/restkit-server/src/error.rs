use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use restkit_core::ToolkitError;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Recurso no encontrado
    #[error("{0}")]
    NotFound(String),

    /// Parametros invalidos
    #[error("{0}")]
    BadRequest(String),

    /// Store de cache inaccesible
    #[error("{0}")]
    Unavailable(String),

    /// Error interno
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::NotFound(detail.into())
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::BadRequest(detail.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ToolkitError> for AppError {
    fn from(err: ToolkitError) -> Self {
        match err {
            ToolkitError::NotFound { detail, .. } => AppError::NotFound(detail),
            ToolkitError::Validation { message, .. } => AppError::BadRequest(message),
            ToolkitError::Store(msg) => AppError::Unavailable(msg),
            other => AppError::Internal(other.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        }

        let body = Json(ErrorResponse {
            detail: self.to_string(),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404_with_detail() {
        let err: AppError =
            ToolkitError::not_found("Todo", "The requested Todo was not found.").into();

        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "The requested Todo was not found.");
    }

    #[test]
    fn test_configuration_is_internal() {
        let err: AppError = ToolkitError::configuration("no rate for scope").into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_is_bad_request() {
        let err: AppError = ToolkitError::validation("priority", "not a valid choice").into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
