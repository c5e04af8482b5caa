use async_trait::async_trait;
use base64::{ engine::general_purpose::STANDARD, Engine as _ };
use log::{ debug, info };
use reqwest::{
    Client as HttpClient,
    header::{ HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION },
    multipart::{ Form, Part },
};
use serde_json::Value as JsonValue;
use std::time::Duration;

use super::{ CreatedTalk, TalkRequest, VideoProvider };
use crate::config::RelayConfig;
use crate::error::{ RelayError, RelayResult };
use crate::http::{ build_client, read_json };
use crate::models::video::{ HostedImage, JobSnapshot, JobStatus };

const PROVIDER: &str = "D-ID";

/// HTTP Basic credentials for D-ID. Keys issued as `user:password` are encoded here; keys that
/// are already encoded are sent unchanged.
pub fn authorization_value(api_key: &str) -> String {
    let api_key = api_key.trim();
    if api_key.contains(':') {
        format!("Basic {}", STANDARD.encode(api_key))
    } else {
        format!("Basic {}", api_key)
    }
}

pub fn parse_snapshot(raw: JsonValue) -> RelayResult<JobSnapshot> {
    let status = match raw.get("status").and_then(JsonValue::as_str) {
        Some(s) => JobStatus::parse(s),
        None => {
            return Err(RelayError::provider_with_details("D-ID talk status missing", raw));
        }
    };
    let result_url = raw
        .get("result_url")
        .and_then(JsonValue::as_str)
        .filter(|u| !u.is_empty())
        .map(str::to_owned);
    Ok(JobSnapshot { status, result_url, raw })
}

pub struct DidClient {
    http: HttpClient,
    base_url: String,
}

impl DidClient {
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> RelayResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&authorization_value(api_key)).map_err(|e|
                RelayError::invalid(format!("Invalid API key format: {}", e))
            )?
        );

        Ok(Self {
            http: build_client(headers, timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &RelayConfig) -> RelayResult<Self> {
        let api_key = config.d_id_api_key
            .as_deref()
            .ok_or_else(|| RelayError::NotConfigured("D_ID_API_KEY".to_string()))?;
        Self::new(api_key, &config.d_id_base_url, config.provider_timeout)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl VideoProvider for DidClient {
    async fn create_talk(&self, request: &TalkRequest) -> RelayResult<CreatedTalk> {
        info!("DidClient::create_talk() → source_url={}", request.source_url);
        let resp = self.http.post(self.url("/talks")).json(request).send().await?;
        let raw = read_json(PROVIDER, resp).await?;
        let id = raw
            .get("id")
            .and_then(JsonValue::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_owned);
        Ok(CreatedTalk { id, raw })
    }

    async fn get_talk(&self, talk_id: &str) -> RelayResult<JobSnapshot> {
        debug!("DidClient::get_talk() → {}", talk_id);
        let resp = self.http
            .get(self.url(&format!("/talks/{}", talk_id)))
            .send().await?;
        parse_snapshot(read_json(PROVIDER, resp).await?)
    }

    async fn upload_image(
        &self,
        file_name: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>
    ) -> RelayResult<HostedImage> {
        info!("DidClient::upload_image() → {} ({} bytes)", file_name, bytes.len());
        let mut part = Part::bytes(bytes).file_name(file_name.to_string());
        if let Some(ct) = content_type {
            part = part
                .mime_str(ct)
                .map_err(|e| RelayError::invalid(format!("Invalid content type '{}': {}", ct, e)))?;
        }
        let form = Form::new().part("image", part);

        let resp = self.http.post(self.url("/images")).multipart(form).send().await?;
        let raw = read_json(PROVIDER, resp).await?;
        serde_json
            ::from_value::<HostedImage>(raw.clone())
            .map_err(|e|
                RelayError::provider_with_details(
                    format!("Unexpected D-ID image response: {}", e),
                    raw
                )
            )
    }

    async fn credits(&self) -> RelayResult<JsonValue> {
        let resp = self.http.get(self.url("/credits")).send().await?;
        read_json(PROVIDER, resp).await
    }
}
