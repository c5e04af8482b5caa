use crate::error::{ RelayError, RelayResult };
use reqwest::{ Client as HttpClient, header::HeaderMap };
use serde_json::Value as JsonValue;
use std::time::Duration;

pub fn build_client(headers: HeaderMap, timeout: Duration) -> RelayResult<HttpClient> {
    HttpClient::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()
        .map_err(|e| RelayError::provider(format!("Failed to build HTTP client: {}", e)))
}

/// Reads a provider response as JSON. Non-2xx answers become a provider error carrying the body,
/// parsed as JSON when possible and as a string otherwise.
pub async fn read_json(provider: &str, resp: reqwest::Response) -> RelayResult<JsonValue> {
    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        let details = serde_json
            ::from_str::<JsonValue>(&body)
            .unwrap_or_else(|_| JsonValue::String(body.clone()));
        return Err(
            RelayError::provider_with_details(
                format!("{} API returned {}", provider, status),
                details
            )
        );
    }

    if body.trim().is_empty() {
        return Ok(JsonValue::Null);
    }

    serde_json
        ::from_str(&body)
        .map_err(|e|
            RelayError::provider_with_details(
                format!("{} API returned malformed JSON: {}", provider, e),
                JsonValue::String(body)
            )
        )
}
