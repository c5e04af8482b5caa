use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Video Provider Args ---
    /// API key for the D-ID talks API ("username:password" or already base64-encoded)
    #[arg(long, env = "D_ID_API_KEY")]
    pub d_id_api_key: Option<String>,

    /// Base URL of the D-ID API
    #[arg(long, env = "D_ID_BASE_URL", default_value = "https://api.d-id.com")]
    pub d_id_base_url: String,

    /// Maximum number of status reads before a video job is reported as timed out
    #[arg(long, env = "VIDEO_POLL_MAX_ATTEMPTS", default_value = "30")]
    pub video_poll_max_attempts: u32,

    /// Seconds to wait between two status reads of a video job
    #[arg(long, env = "VIDEO_POLL_INTERVAL_SECS", default_value = "2")]
    pub video_poll_interval_secs: u64,

    // --- Chat LLM Provider Args ---
    /// API key for the Gemini generative language API
    #[arg(long, env = "GEMINI_API_KEY")]
    pub gemini_api_key: Option<String>,

    /// Base URL of the Gemini API, without the model path
    #[arg(
        long,
        env = "GEMINI_BASE_URL",
        default_value = "https://generativelanguage.googleapis.com/v1beta"
    )]
    pub gemini_base_url: String,

    /// Model name used for the conversation relay
    #[arg(long, env = "CHAT_MODEL", default_value = "gemini-1.5-flash")]
    pub chat_model: String,

    /// Timeout in seconds for a single outbound provider request
    #[arg(long, env = "PROVIDER_TIMEOUT_SECS", default_value = "30")]
    pub provider_timeout_secs: u64,

    // --- Media Args ---
    /// Public URL of this server (e.g. an ngrok tunnel) so the video provider can fetch uploads
    #[arg(long, env = "BASE_URL")]
    pub base_url: Option<String>,

    /// Directory where uploaded images are stored and served from /static/uploads
    #[arg(long, env = "UPLOAD_DIR", default_value = "static/uploads")]
    pub upload_dir: String,

    /// Maximum accepted upload size in bytes.
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value = "10485760")]
    pub max_upload_bytes: usize,

    /// Age in seconds after which uploaded files are deleted. 0 keeps them forever.
    #[arg(long, env = "UPLOAD_RETENTION_SECS", default_value = "86400")]
    pub upload_retention_secs: u64,

    // --- General App Args ---
    /// Host address and port for the server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:5000")]
    pub server_addr: String,

    /// Run the setup diagnostics and exit instead of serving
    #[arg(long, default_value = "false")]
    pub check_setup: bool,

    /// Optional path to the TLS certificate file (PEM format). Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format). Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}
