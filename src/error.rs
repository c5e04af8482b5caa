use axum::{ http::StatusCode, response::{ IntoResponse, Response }, Json };
use serde::Serialize;
use serde_json::Value as JsonValue;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0} not configured")]
    NotConfigured(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{message}")]
    Provider {
        message: String,
        details: Option<JsonValue>,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("{0}")]
    Timeout(String),
}

impl RelayError {
    pub fn invalid(message: impl Into<String>) -> Self {
        RelayError::InvalidRequest(message.into())
    }

    pub fn provider(message: impl Into<String>) -> Self {
        RelayError::Provider { message: message.into(), details: None }
    }

    pub fn provider_with_details(message: impl Into<String>, details: JsonValue) -> Self {
        RelayError::Provider { message: message.into(), details: Some(details) }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RelayError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            RelayError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            RelayError::Provider { .. } => StatusCode::BAD_GATEWAY,
            RelayError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RelayError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        RelayError::provider(format!("API request failed: {}", err))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<JsonValue>,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let details = match &self {
            RelayError::Provider { details, .. } => details.clone(),
            _ => None,
        };
        let body = ErrorBody { error: self.to_string(), details };
        (status, Json(body)).into_response()
    }
}

pub type RelayResult<T> = Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_each_kind_to_a_failure_status() {
        assert_eq!(RelayError::invalid("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            RelayError::NotConfigured("D_ID_API_KEY".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            RelayError::PayloadTooLarge("too big".into()).status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(RelayError::provider("x").status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            RelayError::Storage(std::io::Error::other("disk")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            RelayError::Timeout("video generation timed out".into()).status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn not_configured_names_the_missing_setting() {
        let err = RelayError::NotConfigured("GEMINI_API_KEY".into());
        assert_eq!(err.to_string(), "GEMINI_API_KEY not configured");
    }

    #[tokio::test]
    async fn provider_error_body_carries_details() {
        let err = RelayError::provider_with_details(
            "D-ID video generation failed",
            json!({ "status": "error", "error": { "kind": "FaceError" } })
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "D-ID video generation failed");
        assert_eq!(body["details"]["error"]["kind"], "FaceError");
    }
}
