pub mod persona;

use crate::cli::Args;
use std::path::PathBuf;
use std::time::Duration;

/// Route under which stored uploads are served.
pub const UPLOADS_ROUTE: &str = "/static/uploads";

#[derive(Debug, Clone)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            interval: Duration::from_secs(2),
        }
    }
}

/// Process-wide settings, built once from [`Args`] and shared read-only with every handler.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub server_addr: String,
    pub d_id_api_key: Option<String>,
    pub d_id_base_url: String,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub chat_model: String,
    pub provider_timeout: Duration,
    pub base_url: Option<String>,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub upload_retention: Option<Duration>,
    pub poll: PollPolicy,
    pub tls: Option<TlsPaths>,
}

#[derive(Debug, Clone)]
pub struct TlsPaths {
    pub cert_path: String,
    pub key_path: String,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

impl RelayConfig {
    pub fn from_args(args: &Args) -> Result<Self, String> {
        if args.video_poll_max_attempts == 0 {
            return Err("VIDEO_POLL_MAX_ATTEMPTS must be at least 1".to_string());
        }
        if args.provider_timeout_secs == 0 {
            return Err("PROVIDER_TIMEOUT_SECS must be at least 1".to_string());
        }

        let tls = if args.enable_tls {
            match (&args.tls_cert_path, &args.tls_key_path) {
                (Some(cert_path), Some(key_path)) =>
                    Some(TlsPaths {
                        cert_path: cert_path.clone(),
                        key_path: key_path.clone(),
                    }),
                _ => {
                    return Err(
                        "Both --tls-cert-path and --tls-key-path must be provided to enable TLS.".to_string()
                    );
                }
            }
        } else {
            None
        };

        let upload_retention = match args.upload_retention_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Ok(Self {
            server_addr: args.server_addr.clone(),
            d_id_api_key: non_empty(&args.d_id_api_key),
            d_id_base_url: args.d_id_base_url.trim_end_matches('/').to_string(),
            gemini_api_key: non_empty(&args.gemini_api_key),
            gemini_base_url: args.gemini_base_url.trim_end_matches('/').to_string(),
            chat_model: args.chat_model.clone(),
            provider_timeout: Duration::from_secs(args.provider_timeout_secs),
            base_url: non_empty(&args.base_url).map(|u| u.trim_end_matches('/').to_string()),
            upload_dir: PathBuf::from(&args.upload_dir),
            max_upload_bytes: args.max_upload_bytes,
            upload_retention,
            poll: PollPolicy {
                max_attempts: args.video_poll_max_attempts,
                interval: Duration::from_secs(args.video_poll_interval_secs),
            },
            tls,
        })
    }
}

/// Shows only the first characters of a secret.
pub fn mask_secret(value: &str) -> String {
    if value.chars().count() > 8 {
        let prefix: String = value.chars().take(8).collect();
        format!("{}...", prefix)
    } else {
        "***".to_string()
    }
}
