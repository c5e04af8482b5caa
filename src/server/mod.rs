pub mod api;

use crate::config::RelayConfig;
use crate::media::spawn_retention_sweeper;
use api::AppState;
use log::info;
use std::error::Error;
use std::net::SocketAddr;

pub struct Server {
    addr: SocketAddr,
    state: AppState,
}

impl Server {
    pub async fn new(config: RelayConfig) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let addr = config.server_addr
            .parse::<SocketAddr>()
            .map_err(|e| format!("Invalid server address '{}': {}", config.server_addr, e))?;
        let state = AppState::from_config(config).await?;
        Ok(Self { addr, state })
    }

    pub async fn run(self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let config = self.state.config.clone();

        let sweeper = config.upload_retention.map(|retention|
            spawn_retention_sweeper(self.state.media.upload_dir().to_path_buf(), retention)
        );
        if sweeper.is_none() {
            info!("Upload retention disabled, uploads are kept forever");
        }

        let app = api::router(self.state);

        let result = match &config.tls {
            Some(tls) => {
                info!(
                    "TLS enabled. Loading certificate from '{}' and key from '{}'",
                    tls.cert_path,
                    tls.key_path
                );
                let tls_config = axum_server::tls_rustls::RustlsConfig
                    ::from_pem_file(&tls.cert_path, &tls.key_path).await
                    .map_err(|e| format!("Failed to load TLS certificate/key: {}", e))?;
                info!("HTTPS server listening on: https://{}", self.addr);
                axum_server
                    ::bind_rustls(self.addr, tls_config)
                    .serve(app.into_make_service()).await
                    .map_err(|e| format!("HTTPS server error: {}", e))
            }
            None => {
                let listener = tokio::net::TcpListener
                    ::bind(self.addr).await
                    .map_err(|e|
                        format!("Failed to bind HTTP server to {}: {}. Try a different port.", self.addr, e)
                    )?;
                info!("HTTP server listening on: http://{}", self.addr);
                axum::serve(listener, app.into_make_service()).await.map_err(|e|
                    format!("HTTP server error: {}", e)
                )
            }
        };

        if let Some(handle) = sweeper {
            handle.abort();
        }
        Ok(result?)
    }
}
