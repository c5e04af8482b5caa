use serde::{ Deserialize, Serialize };
use serde_json::Value as JsonValue;
use std::fmt;

/// Status of a talk as reported by the video provider. Values this service does not know are
/// kept verbatim and treated as still running.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobStatus {
    Created,
    Started,
    Done,
    Error,
    Other(String),
}

impl JobStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "created" => JobStatus::Created,
            "started" => JobStatus::Started,
            "done" => JobStatus::Done,
            "error" => JobStatus::Error,
            other => JobStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Created => "created",
            JobStatus::Started => "started",
            JobStatus::Done => "done",
            JobStatus::Error => "error",
            JobStatus::Other(raw) => raw,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One status read of a talk. `raw` keeps the full provider payload for error reporting.
#[derive(Clone, Debug)]
pub struct JobSnapshot {
    pub status: JobStatus,
    pub result_url: Option<String>,
    pub raw: JsonValue,
}

/// A video job tracked for the lifetime of one orchestrating request.
#[derive(Clone, Debug)]
pub struct VideoJob {
    pub job_id: String,
    pub source_image_address: String,
    pub script_text: String,
    pub status: JobStatus,
    pub result_address: Option<String>,
}

impl VideoJob {
    pub fn submitted(job_id: String, source_image_address: &str, script_text: &str) -> Self {
        Self {
            job_id,
            source_image_address: source_image_address.to_string(),
            script_text: script_text.to_string(),
            status: JobStatus::Created,
            result_address: None,
        }
    }

    pub fn apply(&mut self, snapshot: &JobSnapshot) {
        self.status = snapshot.status.clone();
        if let Some(url) = &snapshot.result_url {
            self.result_address = Some(url.clone());
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VideoResult {
    #[serde(rename = "video_url")]
    pub video_address: String,
    #[serde(rename = "talk_id")]
    pub job_id: String,
}

/// Image hosted by the video provider itself.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct HostedImage {
    pub id: String,
    pub url: String,
}
