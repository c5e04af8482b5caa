pub mod did;
pub mod orchestrator;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::RelayResult;
use crate::models::video::{ HostedImage, JobSnapshot };

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceProfile {
    pub provider: &'static str,
    pub voice_id: &'static str,
    pub style: &'static str,
    pub rate: &'static str,
    pub stitch: bool,
}

pub const MIRROR_VOICE: VoiceProfile = VoiceProfile {
    provider: "microsoft",
    voice_id: "en-US-DavisNeural",
    style: "Whispering",
    rate: "0.9",
    stitch: true,
};

/// Body of a talk creation request.
#[derive(Debug, Clone, Serialize)]
pub struct TalkRequest {
    pub source_url: String,
    pub script: TalkScript,
    pub config: TalkConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct TalkScript {
    #[serde(rename = "type")]
    pub script_type: &'static str,
    pub input: String,
    pub provider: VoiceProvider,
}

#[derive(Debug, Clone, Serialize)]
pub struct VoiceProvider {
    #[serde(rename = "type")]
    pub provider_type: &'static str,
    pub voice_id: &'static str,
    pub voice_config: VoiceConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct VoiceConfig {
    pub style: &'static str,
    pub rate: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct TalkConfig {
    pub stitch: bool,
}

impl TalkRequest {
    pub fn new(source_url: &str, text: &str, voice: VoiceProfile) -> Self {
        Self {
            source_url: source_url.to_string(),
            script: TalkScript {
                script_type: "text",
                input: text.to_string(),
                provider: VoiceProvider {
                    provider_type: voice.provider,
                    voice_id: voice.voice_id,
                    voice_config: VoiceConfig {
                        style: voice.style,
                        rate: voice.rate,
                    },
                },
            },
            config: TalkConfig { stitch: voice.stitch },
        }
    }
}

/// Provider answer to a talk creation; `id` is absent when the provider refused the job.
#[derive(Debug, Clone)]
pub struct CreatedTalk {
    pub id: Option<String>,
    pub raw: JsonValue,
}

#[async_trait]
pub trait VideoProvider: Send + Sync {
    async fn create_talk(&self, request: &TalkRequest) -> RelayResult<CreatedTalk>;

    async fn get_talk(&self, talk_id: &str) -> RelayResult<JobSnapshot>;

    async fn upload_image(
        &self,
        file_name: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>
    ) -> RelayResult<HostedImage>;

    /// Remaining account credits, used by the setup check.
    async fn credits(&self) -> RelayResult<JsonValue>;
}
