use std::path::PathBuf;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct UploadedAsset {
    pub generated_id: Uuid,
    pub original_name: String,
    pub storage_path: PathBuf,
    pub public_address: String,
}

impl UploadedAsset {
    pub fn file_name(&self) -> Option<&str> {
        self.storage_path.file_name().and_then(|n| n.to_str())
    }
}
