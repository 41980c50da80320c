use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Core(#[from] tg_core::CoreError),
}

#[cfg(feature = "http")]
impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;
        use tg_core::CoreError;

        let status = match &self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Core(err) => match err {
                CoreError::MalformedInput(_)
                | CoreError::SchemaViolation(_)
                | CoreError::InvalidDefinition(_) => StatusCode::BAD_REQUEST,
                CoreError::AuthorizationDenied(_) => StatusCode::FORBIDDEN,
                CoreError::NotFound(_) => StatusCode::NOT_FOUND,
                CoreError::InvalidTransition(_) => StatusCode::CONFLICT,
            },
        };

        let body = axum::Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
