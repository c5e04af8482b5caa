pub mod cli;
pub mod config;
pub mod conversation;
pub mod diagnostics;
pub mod error;
pub mod http;
pub mod llm;
pub mod media;
pub mod models;
pub mod server;
pub mod video;

use cli::Args;
use config::RelayConfig;
use log::info;
use server::Server;
use std::error::Error;
use video::VideoProvider;
use video::did::DidClient;

fn configured(value: &Option<String>) -> &'static str {
    if value.is_some() { "configured" } else { "MISSING" }
}

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = RelayConfig::from_args(&args)?;

    info!("--- Core Configuration ---");
    info!("Server Address: {}", config.server_addr);
    info!("D-ID API Key: {}", configured(&config.d_id_api_key));
    info!("D-ID Base URL: {}", config.d_id_base_url);
    info!("Gemini API Key: {}", configured(&config.gemini_api_key));
    info!("Chat Model: {}", config.chat_model);
    info!("Public Base URL: {}", config.base_url.as_deref().unwrap_or("MISSING"));
    info!("Upload Dir: {}", config.upload_dir.display());
    info!(
        "Upload Retention: {}",
        config.upload_retention.map_or("forever".to_string(), |d| format!("{}s", d.as_secs()))
    );
    info!(
        "Video Polling: {} attempts every {}s",
        config.poll.max_attempts,
        config.poll.interval.as_secs()
    );
    info!("TLS Enabled: {}", config.tls.is_some());
    info!("-------------------------");

    if args.check_setup {
        let provider = match &config.d_id_api_key {
            Some(_) => Some(DidClient::from_config(&config)?),
            None => None,
        };
        let passed = diagnostics::run_setup_check(
            &config,
            provider.as_ref().map(|p| p as &dyn VideoProvider)
        ).await;
        return if passed { Ok(()) } else { Err("Setup check failed".into()) };
    }

    let server = Server::new(config).await?;
    server.run().await?;

    Ok(())
}
