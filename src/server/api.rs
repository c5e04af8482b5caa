use crate::config::{ RelayConfig, UPLOADS_ROUTE };
use crate::conversation::ConversationRelay;
use crate::error::{ RelayError, RelayResult };
use crate::llm::chat::new_client as new_chat_client;
use crate::llm::LlmConfig;
use crate::media::{ sanitize_filename, MediaStore };
use crate::models::chat::ConversationTurn;
use crate::models::video::VideoResult;
use crate::video::did::DidClient;
use crate::video::orchestrator::VideoJobOrchestrator;

use axum::{
    extract::{
        multipart::{ MultipartError, MultipartRejection },
        rejection::JsonRejection,
        DefaultBodyLimit,
        Multipart,
        State,
    },
    http::StatusCode,
    routing::{ get, post },
    Json,
    Router,
};
use log::{ info, warn };
use serde::{ Deserialize, Serialize };
use std::error::Error;
use std::sync::Arc;
use tower_http::cors::{ Any, CorsLayer };
use tower_http::services::ServeDir;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct KnowledgeRequest {
    pub text: Option<String>,
    #[serde(default)]
    pub history: Vec<ConversationTurn>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct KnowledgeResponse {
    pub response: String,
    pub history: Vec<ConversationTurn>,
}

#[derive(Deserialize)]
pub struct TalkBody {
    pub image_url: Option<String>,
    pub text: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct UploadImageResponse {
    pub image_url: String,
    pub did_image_id: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct HealthResponse {
    pub status: String,
    pub chat_configured: bool,
    pub video_configured: bool,
    pub base_url_configured: bool,
}

/// Shared, read-only handler state. Providers are `None` when their credential is missing and the
/// matching endpoints answer with `NotConfigured`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayConfig>,
    pub conversation: Option<ConversationRelay>,
    pub videos: Option<VideoJobOrchestrator>,
    pub media: MediaStore,
}

impl AppState {
    pub async fn from_config(config: RelayConfig) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let conversation = if config.gemini_api_key.is_some() {
            let chat_client = new_chat_client(&LlmConfig::from_relay_config(&config))?;
            info!("Chat client configured: Model={}", chat_client.get_model());
            Some(ConversationRelay::new(chat_client))
        } else {
            warn!("GEMINI_API_KEY not set, /knowledge is disabled");
            None
        };

        let videos = if config.d_id_api_key.is_some() {
            let client = DidClient::from_config(&config)?;
            info!(
                "Video client configured: BaseURL={} MaxPolls={} Interval={:?}",
                config.d_id_base_url,
                config.poll.max_attempts,
                config.poll.interval
            );
            Some(VideoJobOrchestrator::new(Arc::new(client), config.poll.clone()))
        } else {
            warn!("D_ID_API_KEY not set, video endpoints are disabled");
            None
        };

        if config.base_url.is_none() {
            warn!("BASE_URL not set, /generate-video is disabled");
        }

        let media = MediaStore::init(&config.upload_dir).await.map_err(|e|
            format!("Failed to create upload directory '{}': {}", config.upload_dir.display(), e)
        )?;

        Ok(Self { config: Arc::new(config), conversation, videos, media })
    }

    fn conversation(&self) -> RelayResult<&ConversationRelay> {
        self.conversation.as_ref().ok_or_else(|| RelayError::NotConfigured("GEMINI_API_KEY".into()))
    }

    fn videos(&self) -> RelayResult<&VideoJobOrchestrator> {
        self.videos.as_ref().ok_or_else(|| RelayError::NotConfigured("D_ID_API_KEY".into()))
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    let uploads = ServeDir::new(state.media.upload_dir());
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/knowledge", post(knowledge_handler))
        .route("/generate-video", post(generate_video_handler))
        .route("/mirror/upload-image", post(upload_image_handler))
        .route("/talk", post(talk_handler))
        .route("/health", get(health_handler))
        .nest_service(UPLOADS_ROUTE, uploads)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(state)
}

fn required(value: Option<String>, message: &str) -> RelayResult<String> {
    value.filter(|v| !v.trim().is_empty()).ok_or_else(|| RelayError::invalid(message))
}

struct UploadedFile {
    file_name: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Default)]
struct ImageForm {
    image: Option<UploadedFile>,
    text: Option<String>,
}

fn multipart_error(err: MultipartError, context: &str, limit: usize) -> RelayError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        RelayError::PayloadTooLarge(format!("Upload exceeds the {} byte limit", limit))
    } else {
        RelayError::invalid(format!("{}: {}", context, err.body_text()))
    }
}

async fn read_image_form(
    multipart: Result<Multipart, MultipartRejection>,
    limit: usize
) -> RelayResult<ImageForm> {
    let mut multipart = multipart.map_err(|e| RelayError::invalid(e.body_text()))?;
    let mut form = ImageForm::default();

    while
        let Some(field) = multipart
            .next_field().await
            .map_err(|e| multipart_error(e, "Invalid multipart body", limit))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("image") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_owned);
                let bytes = field
                    .bytes().await
                    .map_err(|e| multipart_error(e, "Failed to read 'image'", limit))?;
                form.image = Some(UploadedFile { file_name, content_type, bytes: bytes.to_vec() });
            }
            Some("text") => {
                let text = field
                    .text().await
                    .map_err(|e| multipart_error(e, "Failed to read 'text'", limit))?;
                form.text = Some(text);
            }
            _ => {}
        }
    }
    Ok(form)
}

async fn knowledge_handler(
    State(state): State<AppState>,
    payload: Result<Json<KnowledgeRequest>, JsonRejection>
) -> RelayResult<Json<KnowledgeResponse>> {
    let relay = state.conversation()?;
    let Json(req) = payload.map_err(|e| RelayError::invalid(e.body_text()))?;
    let text = required(req.text, "No 'text' provided")?;

    let reply = relay.reply(&text, req.history).await?;
    Ok(Json(KnowledgeResponse { response: reply.reply_text, history: reply.updated_history }))
}

async fn generate_video_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>
) -> RelayResult<Json<VideoResult>> {
    let videos = state.videos()?;
    let base_url = state.config.base_url
        .clone()
        .ok_or_else(|| RelayError::NotConfigured("BASE_URL".into()))?;

    let form = read_image_form(multipart, state.config.max_upload_bytes).await?;
    let image = form.image.ok_or_else(|| RelayError::invalid("No 'image' file part"))?;
    let text = required(form.text, "No 'text' form data")?;

    let asset = state.media.store(&base_url, &image.file_name, &image.bytes).await?;
    let result = videos.submit_detached(asset.public_address, text).await?;
    Ok(Json(result))
}

async fn upload_image_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>
) -> RelayResult<Json<UploadImageResponse>> {
    let videos = state.videos()?;

    let form = read_image_form(multipart, state.config.max_upload_bytes).await?;
    let image = form.image.ok_or_else(|| RelayError::invalid("No 'image' file part"))?;
    if image.file_name.trim().is_empty() {
        return Err(RelayError::invalid("No selected file"));
    }
    if image.bytes.is_empty() {
        return Err(RelayError::invalid("Uploaded file is empty"));
    }

    let file_name = format!("{}_{}", Uuid::new_v4(), sanitize_filename(&image.file_name));
    let hosted = videos
        .provider()
        .upload_image(&file_name, image.content_type.as_deref(), image.bytes).await?;
    info!("Uploaded {} to D-ID as {}", file_name, hosted.id);

    Ok(Json(UploadImageResponse { image_url: hosted.url, did_image_id: hosted.id }))
}

async fn talk_handler(
    State(state): State<AppState>,
    payload: Result<Json<TalkBody>, JsonRejection>
) -> RelayResult<Json<VideoResult>> {
    let videos = state.videos()?;
    let Json(body) = payload.map_err(|e| RelayError::invalid(e.body_text()))?;
    let image_url = required(body.image_url, "No 'image_url' provided")?;
    let text = required(body.text, "No 'text' provided")?;

    let result = videos.submit_detached(image_url, text).await?;
    Ok(Json(result))
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        chat_configured: state.conversation.is_some(),
        video_configured: state.videos.is_some(),
        base_url_configured: state.config.base_url.is_some(),
    })
}
