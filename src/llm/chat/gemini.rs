use async_trait::async_trait;
use log::info;
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderValue, CONTENT_TYPE } };
use serde::{ Deserialize, Serialize };
use serde_json::Value as JsonValue;

use super::{ ChatClient, ChatRequest, CompletionResponse };
use crate::config::persona::GenerationConfig;
use crate::error::{ RelayError, RelayResult };
use crate::http::{ build_client, read_json };
use crate::llm::LlmConfig;
use crate::models::chat::{ ConversationTurn, Role };

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    system_instruction: GeminiSystemInstruction<'a>,
    contents: Vec<GeminiContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GeminiSystemInstruction<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    role: Role,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    candidates: Vec<GoogleCandidate>,
}

#[derive(Deserialize)]
struct GoogleCandidate {
    content: Option<GoogleContent>,
}

#[derive(Deserialize)]
struct GoogleContent {
    #[serde(default)]
    parts: Vec<GooglePart>,
}

#[derive(Deserialize)]
struct GooglePart {
    text: Option<String>,
}

fn turn_content(turn: &ConversationTurn) -> GeminiContent<'_> {
    GeminiContent {
        role: turn.role,
        parts: turn.parts
            .iter()
            .map(|text| GeminiPart { text })
            .collect(),
    }
}

fn build_request<'a>(request: &ChatRequest<'a>) -> GeminiRequest<'a> {
    let mut contents: Vec<GeminiContent<'a>> = request.history.iter().map(turn_content).collect();
    contents.push(GeminiContent {
        role: Role::User,
        parts: vec![GeminiPart { text: request.message }],
    });

    GeminiRequest {
        system_instruction: GeminiSystemInstruction {
            parts: vec![GeminiPart { text: request.system }],
        },
        contents,
        generation_config: request.generation,
    }
}

fn extract_text(body: JsonValue) -> RelayResult<String> {
    let parsed: GoogleResponse = serde_json
        ::from_value(body.clone())
        .map_err(|e|
            RelayError::provider_with_details(
                format!("Unexpected Gemini response: {}", e),
                body.clone()
            )
        )?;

    let text: String = parsed.candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(RelayError::provider_with_details("Gemini returned no text", body));
    }
    Ok(text)
}

pub struct GeminiChatClient {
    http: HttpClient,
    model: String,
    base_url: String,
}

impl GeminiChatClient {
    pub fn new(
        api_key: String,
        model: Option<String>,
        base_url: Option<String>,
        timeout: std::time::Duration
    ) -> RelayResult<Self> {
        let chat_model = model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(&api_key).map_err(|e|
                RelayError::invalid(format!("Invalid API key format: {}", e))
            )?
        );

        Ok(Self {
            http: build_client(headers, timeout)?,
            model: chat_model,
            base_url,
        })
    }

    pub fn from_config(config: &LlmConfig) -> RelayResult<Self> {
        let api_key = config.api_key
            .clone()
            .ok_or_else(|| RelayError::NotConfigured("GEMINI_API_KEY".to_string()))?;
        Self::new(api_key, config.completion_model.clone(), config.base_url.clone(), config.timeout)
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl ChatClient for GeminiChatClient {
    async fn complete(&self, request: ChatRequest<'_>) -> RelayResult<CompletionResponse> {
        info!(
            "GeminiChatClient::complete() → model={} history_turns={}",
            self.model,
            request.history.len()
        );
        let payload = build_request(&request);
        let resp = self.http.post(self.endpoint()).json(&payload).send().await?;
        let body = read_json("Gemini", resp).await?;
        Ok(CompletionResponse { response: extract_text(body)? })
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }
}
