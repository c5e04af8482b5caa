use log::{ error, info, warn };
use std::io;
use std::path::{ Path, PathBuf };
use std::time::{ Duration, SystemTime };
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::config::UPLOADS_ROUTE;
use crate::error::{ RelayError, RelayResult };
use crate::models::asset::UploadedAsset;

const MIN_SWEEP_PERIOD: Duration = Duration::from_secs(60);
const MAX_SWEEP_PERIOD: Duration = Duration::from_secs(60 * 60);

/// Reduces a client supplied file name to a safe single path component.
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
            out.push(c);
        } else if c.is_whitespace() || c == '/' || c == '\\' {
            if !out.ends_with('_') {
                out.push('_');
            }
        }
    }
    let trimmed = out.trim_start_matches(['.', '_']).trim_end_matches('_');
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Writes uploaded images into the upload directory that is served under [`UPLOADS_ROUTE`].
#[derive(Debug, Clone)]
pub struct MediaStore {
    upload_dir: PathBuf,
}

impl MediaStore {
    pub async fn init(upload_dir: impl Into<PathBuf>) -> io::Result<Self> {
        let upload_dir = upload_dir.into();
        tokio::fs::create_dir_all(&upload_dir).await?;
        Ok(Self { upload_dir })
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub async fn store(
        &self,
        public_base: &str,
        original_name: &str,
        bytes: &[u8]
    ) -> RelayResult<UploadedAsset> {
        if original_name.trim().is_empty() {
            return Err(RelayError::invalid("No selected file"));
        }
        if bytes.is_empty() {
            return Err(RelayError::invalid("Uploaded file is empty"));
        }

        let generated_id = Uuid::new_v4();
        let file_name = format!("{}_{}", generated_id, sanitize_filename(original_name));
        let storage_path = self.upload_dir.join(&file_name);

        tokio::fs::write(&storage_path, bytes).await.map_err(|e| {
            error!("Failed to write upload {}: {}", storage_path.display(), e);
            RelayError::Storage(e)
        })?;
        info!("Stored upload {} ({} bytes)", storage_path.display(), bytes.len());

        Ok(UploadedAsset {
            generated_id,
            original_name: original_name.to_string(),
            public_address: format!(
                "{}{}/{}",
                public_base.trim_end_matches('/'),
                UPLOADS_ROUTE,
                file_name
            ),
            storage_path,
        })
    }
}

/// Deletes regular files in `dir` whose modification time is at least `max_age` ago.
pub async fn sweep_expired(dir: &Path, max_age: Duration) -> io::Result<usize> {
    let now = SystemTime::now();
    let mut removed = 0;
    let mut entries = tokio::fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let metadata = match entry.metadata().await {
            Ok(m) => m,
            Err(e) => {
                warn!("Skipping {}: {}", entry.path().display(), e);
                continue;
            }
        };
        if !metadata.is_file() {
            continue;
        }
        let expired = metadata
            .modified()
            .ok()
            .and_then(|modified| now.duration_since(modified).ok())
            .map_or(false, |age| age >= max_age);
        if expired {
            match tokio::fs::remove_file(entry.path()).await {
                Ok(()) => {
                    removed += 1;
                }
                Err(e) => warn!("Failed to remove expired upload {}: {}", entry.path().display(), e),
            }
        }
    }
    Ok(removed)
}

pub fn sweep_period(retention: Duration) -> Duration {
    (retention / 4).clamp(MIN_SWEEP_PERIOD, MAX_SWEEP_PERIOD)
}

pub fn spawn_retention_sweeper(dir: PathBuf, retention: Duration) -> JoinHandle<()> {
    let period = sweep_period(retention);
    info!(
        "Upload retention: deleting files older than {}s from {} every {}s",
        retention.as_secs(),
        dir.display(),
        period.as_secs()
    );
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            match sweep_expired(&dir, retention).await {
                Ok(0) => {}
                Ok(n) => info!("Removed {} expired uploads", n),
                Err(e) => error!("Upload sweep failed for {}: {}", dir.display(), e),
            }
        }
    })
}
