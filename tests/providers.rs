use axum::extract::{ Multipart, Path, State };
use axum::http::{ HeaderMap, StatusCode };
use axum::response::IntoResponse;
use axum::routing::{ get, post };
use axum::{ Json, Router };
use serde_json::{ json, Value as JsonValue };
use std::sync::{ Arc, Mutex };
use std::time::Duration;

use mirror_relay::config::persona::{ GENERATION_CONFIG, SYSTEM_DIRECTIVE };
use mirror_relay::config::PollPolicy;
use mirror_relay::error::RelayError;
use mirror_relay::llm::chat::gemini::GeminiChatClient;
use mirror_relay::llm::chat::{ ChatClient, ChatRequest };
use mirror_relay::models::chat::ConversationTurn;
use mirror_relay::video::did::DidClient;
use mirror_relay::video::orchestrator::VideoJobOrchestrator;
use mirror_relay::video::{ TalkRequest, VideoProvider, MIRROR_VOICE };

const TIMEOUT: Duration = Duration::from_secs(5);

/// Serves `app` on an ephemeral local port and returns its base address.
async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn did_client(base_url: &str) -> DidClient {
    DidClient::new("user:pass", base_url, TIMEOUT).unwrap()
}

fn talk_request() -> TalkRequest {
    TalkRequest::new("https://relay.example/static/uploads/face.png", "hello", MIRROR_VOICE)
}

fn provider_details(err: RelayError) -> (String, Option<JsonValue>) {
    match err {
        RelayError::Provider { message, details } => (message, details),
        other => panic!("expected a provider error, got {:?}", other),
    }
}

#[tokio::test]
async fn create_talk_rejection_carries_json_body() {
    let app = Router::new().route(
        "/talks",
        post(|| async {
            (StatusCode::PAYMENT_REQUIRED, Json(json!({ "kind": "InsufficientCreditsError" })))
        })
    );
    let base = serve(app).await;

    let err = did_client(&base).create_talk(&talk_request()).await.unwrap_err();
    let (message, details) = provider_details(err);

    assert_eq!(message, "D-ID API returned 402 Payment Required");
    assert_eq!(details, Some(json!({ "kind": "InsufficientCreditsError" })));
}

#[tokio::test]
async fn talk_status_failure_keeps_plain_text_body() {
    let app = Router::new().route(
        "/talks/{id}",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom text") })
    );
    let base = serve(app).await;

    let err = did_client(&base).get_talk("tlk_1").await.unwrap_err();
    let (message, details) = provider_details(err);

    assert_eq!(message, "D-ID API returned 500 Internal Server Error");
    assert_eq!(details, Some(JsonValue::String("boom text".into())));
}

type Seen<T> = Arc<Mutex<Option<T>>>;

async fn record_talk(
    State(seen): State<Seen<(HeaderMap, JsonValue)>>,
    headers: HeaderMap,
    Json(body): Json<JsonValue>
) -> impl IntoResponse {
    *seen.lock().unwrap() = Some((headers, body));
    (StatusCode::CREATED, Json(json!({ "id": "tlk_9", "status": "created" })))
}

#[tokio::test]
async fn create_talk_sends_basic_auth_and_voice() {
    let seen: Seen<(HeaderMap, JsonValue)> = Arc::default();
    let app = Router::new().route("/talks", post(record_talk)).with_state(seen.clone());
    let base = serve(app).await;

    let created = did_client(&base).create_talk(&talk_request()).await.unwrap();
    assert_eq!(created.id.as_deref(), Some("tlk_9"));

    let (headers, body) = seen.lock().unwrap().take().unwrap();
    assert_eq!(headers["authorization"], "Basic dXNlcjpwYXNz");
    assert_eq!(body["source_url"], "https://relay.example/static/uploads/face.png");
    assert_eq!(body["script"]["input"], "hello");
    assert_eq!(body["script"]["provider"]["voice_id"], "en-US-DavisNeural");
}

#[tokio::test]
async fn talk_created_without_id_is_never_polled() {
    let polls: Arc<Mutex<usize>> = Arc::default();
    let app = Router::new()
        .route(
            "/talks",
            post(|| async { (StatusCode::CREATED, Json(json!({ "status": "created" }))) })
        )
        .route(
            "/talks/{id}",
            get(|State(polls): State<Arc<Mutex<usize>>>| async move {
                *polls.lock().unwrap() += 1;
                Json(json!({ "status": "done", "result_url": "https://d-id/v.mp4" }))
            })
        )
        .with_state(polls.clone());
    let base = serve(app).await;

    let client = did_client(&base);
    let created = client.create_talk(&talk_request()).await.unwrap();
    assert!(created.id.is_none());
    assert_eq!(created.raw, json!({ "status": "created" }));

    let orchestrator = VideoJobOrchestrator::new(
        Arc::new(client),
        PollPolicy { max_attempts: 3, interval: Duration::ZERO }
    );
    let err = orchestrator
        .submit_and_wait("https://relay.example/face.png", "hello").await
        .unwrap_err();

    let (message, _) = provider_details(err);
    assert_eq!(message, "Failed to create talk");
    assert_eq!(*polls.lock().unwrap(), 0);
}

#[tokio::test]
async fn done_with_empty_result_url_is_a_provider_error() {
    let app = Router::new()
        .route(
            "/talks",
            post(|| async { (StatusCode::CREATED, Json(json!({ "id": "tlk_2", "status": "created" }))) })
        )
        .route(
            "/talks/{id}",
            get(|| async { Json(json!({ "id": "tlk_2", "status": "done", "result_url": "" })) })
        );
    let base = serve(app).await;

    let snapshot = did_client(&base).get_talk("tlk_2").await.unwrap();
    assert!(snapshot.result_url.is_none());

    let orchestrator = VideoJobOrchestrator::new(
        Arc::new(did_client(&base)),
        PollPolicy { max_attempts: 3, interval: Duration::ZERO }
    );
    let err = orchestrator
        .submit_and_wait("https://relay.example/face.png", "hello").await
        .unwrap_err();

    let (message, details) = provider_details(err);
    assert_eq!(message, "D-ID reported done without a result_url");
    assert_eq!(details.unwrap()["status"], "done");
}

#[derive(Debug, Default)]
struct ReceivedImage {
    field: String,
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

async fn accept_image(
    State(received): State<Arc<Mutex<Vec<ReceivedImage>>>>,
    mut multipart: Multipart
) -> impl IntoResponse {
    while let Some(field) = multipart.next_field().await.unwrap() {
        let image = ReceivedImage {
            field: field.name().unwrap_or_default().to_string(),
            file_name: field.file_name().map(str::to_owned),
            content_type: field.content_type().map(str::to_owned),
            bytes: field.bytes().await.unwrap().to_vec(),
        };
        received.lock().unwrap().push(image);
    }
    (
        StatusCode::CREATED,
        Json(json!({ "id": "img_7", "url": "s3://d-id-images/img_7.png", "extra": true })),
    )
}

#[tokio::test]
async fn upload_image_posts_multipart_image_field() {
    let received: Arc<Mutex<Vec<ReceivedImage>>> = Arc::default();
    let app = Router::new().route("/images", post(accept_image)).with_state(received.clone());
    let base = serve(app).await;

    let hosted = did_client(&base)
        .upload_image("abc_face.png", Some("image/png"), b"PNGDATA".to_vec()).await
        .unwrap();

    assert_eq!(hosted.id, "img_7");
    assert_eq!(hosted.url, "s3://d-id-images/img_7.png");

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].field, "image");
    assert_eq!(received[0].file_name.as_deref(), Some("abc_face.png"));
    assert_eq!(received[0].content_type.as_deref(), Some("image/png"));
    assert_eq!(received[0].bytes, b"PNGDATA");
}

#[tokio::test]
async fn upload_image_response_without_url_is_a_provider_error() {
    let app = Router::new().route(
        "/images",
        post(|| async { (StatusCode::CREATED, Json(json!({ "id": "img_8" }))) })
    );
    let base = serve(app).await;

    let err = did_client(&base)
        .upload_image("face.png", None, b"x".to_vec()).await
        .unwrap_err();

    let (_, details) = provider_details(err);
    assert_eq!(details, Some(json!({ "id": "img_8" })));
}

fn gemini_client(base_url: &str) -> GeminiChatClient {
    GeminiChatClient::new(
        "g-key".to_string(),
        Some("gemini-1.5-flash".to_string()),
        Some(base_url.to_string()),
        TIMEOUT
    ).unwrap()
}

#[tokio::test]
async fn gemini_rejection_carries_json_body() {
    let app = Router::new().route(
        "/models/{call}",
        post(|| async { (StatusCode::BAD_REQUEST, Json(json!({ "error": { "message": "bad key" } }))) })
    );
    let base = serve(app).await;

    let history: Vec<ConversationTurn> = Vec::new();
    let request = ChatRequest {
        system: SYSTEM_DIRECTIVE,
        history: &history,
        message: "who am I?",
        generation: GENERATION_CONFIG,
    };
    let err = gemini_client(&base).complete(request).await.unwrap_err();
    let (message, details) = provider_details(err);

    assert_eq!(message, "Gemini API returned 400 Bad Request");
    assert_eq!(details, Some(json!({ "error": { "message": "bad key" } })));
}

async fn record_generate(
    State(seen): State<Seen<(String, HeaderMap, JsonValue)>>,
    Path(call): Path<String>,
    headers: HeaderMap,
    Json(body): Json<JsonValue>
) -> Json<JsonValue> {
    *seen.lock().unwrap() = Some((call, headers, body));
    Json(
        json!({
            "candidates": [
                { "content": { "role": "model", "parts": [{ "text": "A reflection " }, { "text": "stares back." }] } }
            ]
        })
    )
}

#[tokio::test]
async fn gemini_completion_reads_candidate_text() {
    let seen: Seen<(String, HeaderMap, JsonValue)> = Arc::default();
    let app = Router::new().route("/models/{call}", post(record_generate)).with_state(seen.clone());
    let base = serve(app).await;

    let history = vec![ConversationTurn::user("hi"), ConversationTurn::model("hello")];
    let request = ChatRequest {
        system: SYSTEM_DIRECTIVE,
        history: &history,
        message: "who am I?",
        generation: GENERATION_CONFIG,
    };
    let completion = gemini_client(&base).complete(request).await.unwrap();
    assert_eq!(completion.response, "A reflection stares back.");

    let (call, headers, body) = seen.lock().unwrap().take().unwrap();
    assert_eq!(call, "gemini-1.5-flash:generateContent");
    assert_eq!(headers["x-goog-api-key"], "g-key");
    assert_eq!(body["systemInstruction"]["parts"][0]["text"], SYSTEM_DIRECTIVE);
    assert_eq!(body["contents"].as_array().unwrap().len(), 3);
    assert_eq!(body["contents"][2]["parts"][0]["text"], "who am I?");
}
