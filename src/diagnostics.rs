use log::{ error, info, warn };
use std::path::Path;
use url::Url;

use crate::config::{ mask_secret, RelayConfig };
use crate::video::VideoProvider;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub name: &'static str,
    pub passed: bool,
    pub messages: Vec<String>,
}

impl CheckOutcome {
    fn new(name: &'static str) -> Self {
        Self { name, passed: true, messages: Vec::new() }
    }

    fn ok(&mut self, message: String) {
        self.messages.push(message);
    }

    fn fail(&mut self, message: String) {
        self.passed = false;
        self.messages.push(message);
    }
}

pub fn check_environment(config: &RelayConfig) -> CheckOutcome {
    let mut outcome = CheckOutcome::new("Environment Variables");
    let secrets = [
        ("D_ID_API_KEY", config.d_id_api_key.as_deref()),
        ("GEMINI_API_KEY", config.gemini_api_key.as_deref()),
    ];
    for (name, value) in secrets {
        match value {
            Some(v) => outcome.ok(format!("{}: {}", name, mask_secret(v))),
            None => outcome.fail(format!("{}: NOT SET", name)),
        }
    }
    match &config.base_url {
        Some(url) => outcome.ok(format!("BASE_URL: {}", url)),
        None => outcome.fail("BASE_URL: NOT SET".to_string()),
    }
    outcome
}

pub async fn check_upload_dir(dir: &Path) -> CheckOutcome {
    let mut outcome = CheckOutcome::new("Uploads Folder");
    if let Err(e) = tokio::fs::create_dir_all(dir).await {
        outcome.fail(format!("Cannot create {}: {}", dir.display(), e));
        return outcome;
    }
    let marker = dir.join(".write-check");
    let written = tokio::fs::write(&marker, b"test").await;
    match written {
        Ok(()) => {
            let _ = tokio::fs::remove_file(&marker).await;
            outcome.ok(format!("{} is writable", dir.display()));
        }
        Err(e) => outcome.fail(format!("{} is not writable: {}", dir.display(), e)),
    }
    outcome
}

pub fn check_base_url(base_url: Option<&str>) -> CheckOutcome {
    let mut outcome = CheckOutcome::new("Base URL");
    let Some(raw) = base_url else {
        outcome.fail("BASE_URL not set".to_string());
        return outcome;
    };
    match Url::parse(raw) {
        Ok(url) => {
            let local = matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "0.0.0.0" | "[::1]"));
            if local {
                outcome.fail(
                    format!("{} points to this machine; the video provider cannot fetch uploads from it", raw)
                );
            } else {
                outcome.ok(format!("{} is publicly addressable", raw));
            }
        }
        Err(e) => outcome.fail(format!("{} is not a valid URL: {}", raw, e)),
    }
    outcome
}

pub async fn check_video_provider(provider: Option<&dyn VideoProvider>) -> CheckOutcome {
    let mut outcome = CheckOutcome::new("D-ID API");
    let Some(provider) = provider else {
        outcome.fail("Cannot test - D_ID_API_KEY not set".to_string());
        return outcome;
    };
    match provider.credits().await {
        Ok(body) => {
            let remaining = body
                .get("remaining")
                .map(|v| v.to_string())
                .unwrap_or_else(|| "Unknown".to_string());
            outcome.ok(format!("Connection OK, remaining credits: {}", remaining));
        }
        Err(e) => outcome.fail(format!("Connection failed: {}", e)),
    }
    outcome
}

/// Runs every check, logs the summary and reports whether all of them passed.
pub async fn run_setup_check(config: &RelayConfig, provider: Option<&dyn VideoProvider>) -> bool {
    let outcomes = vec![
        check_environment(config),
        check_upload_dir(&config.upload_dir).await,
        check_base_url(config.base_url.as_deref()),
        check_video_provider(provider).await
    ];

    info!("--- Setup Check ---");
    for outcome in &outcomes {
        for message in &outcome.messages {
            if outcome.passed {
                info!("  [{}] {}", outcome.name, message);
            } else {
                warn!("  [{}] {}", outcome.name, message);
            }
        }
    }
    let mut all_passed = true;
    for outcome in &outcomes {
        if outcome.passed {
            info!("PASS: {}", outcome.name);
        } else {
            error!("FAIL: {}", outcome.name);
            all_passed = false;
        }
    }
    info!("-------------------");
    all_passed
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn localhost_base_url_fails() {
        assert!(!check_base_url(Some("http://localhost:5000")).passed);
        assert!(!check_base_url(Some("http://127.0.0.1:5000")).passed);
        assert!(!check_base_url(None).passed);
        assert!(!check_base_url(Some("not a url")).passed);
        assert!(check_base_url(Some("https://abc.ngrok.app")).passed);
    }

    #[tokio::test]
    async fn upload_dir_check_leaves_no_file() {
        let dir = tempdir().unwrap();
        let uploads = dir.path().join("static/uploads");

        let outcome = check_upload_dir(&uploads).await;

        assert!(outcome.passed);
        assert!(uploads.exists());
        assert!(!uploads.join(".write-check").exists());
    }

    #[tokio::test]
    async fn missing_provider_fails_the_connectivity_check() {
        assert!(!check_video_provider(None).await.passed);
    }
}
