use log::{ debug, error, info, warn };
use std::sync::Arc;

use super::{ TalkRequest, VideoProvider, VoiceProfile, MIRROR_VOICE };
use crate::config::PollPolicy;
use crate::error::{ RelayError, RelayResult };
use crate::models::video::{ JobStatus, VideoJob, VideoResult };

/// Submits a talk and waits for it, polling at most `policy.max_attempts` times.
#[derive(Clone)]
pub struct VideoJobOrchestrator {
    provider: Arc<dyn VideoProvider>,
    policy: PollPolicy,
    voice: VoiceProfile,
}

impl VideoJobOrchestrator {
    pub fn new(provider: Arc<dyn VideoProvider>, policy: PollPolicy) -> Self {
        Self { provider, policy, voice: MIRROR_VOICE }
    }

    pub fn provider(&self) -> &Arc<dyn VideoProvider> {
        &self.provider
    }

    pub async fn submit_and_wait(
        &self,
        source_image_address: &str,
        script_text: &str
    ) -> RelayResult<VideoResult> {
        if source_image_address.trim().is_empty() {
            return Err(RelayError::invalid("No image address provided"));
        }
        if script_text.trim().is_empty() {
            return Err(RelayError::invalid("No 'text' provided"));
        }

        let request = TalkRequest::new(source_image_address, script_text, self.voice);
        let created = self.provider.create_talk(&request).await?;
        let job_id = match created.id {
            Some(id) => id,
            None => {
                error!("Talk creation returned no id: {}", created.raw);
                return Err(RelayError::provider_with_details("Failed to create talk", created.raw));
            }
        };

        let mut job = VideoJob::submitted(job_id, source_image_address, script_text);
        info!("Submitted talk {} for {}", job.job_id, job.source_image_address);

        for attempt in 1..=self.policy.max_attempts {
            tokio::time::sleep(self.policy.interval).await;

            let snapshot = self.provider.get_talk(&job.job_id).await?;
            job.apply(&snapshot);

            match &job.status {
                JobStatus::Created | JobStatus::Started => {
                    debug!(
                        "Talk {} is {} (attempt {}/{})",
                        job.job_id,
                        job.status,
                        attempt,
                        self.policy.max_attempts
                    );
                }
                JobStatus::Done => {
                    return match job.result_address.take() {
                        Some(video_address) => {
                            info!("Talk {} done after {} polls", job.job_id, attempt);
                            Ok(VideoResult { video_address, job_id: job.job_id })
                        }
                        None =>
                            Err(
                                RelayError::provider_with_details(
                                    "D-ID reported done without a result_url",
                                    snapshot.raw
                                )
                            ),
                    };
                }
                JobStatus::Error => {
                    error!("Talk {} failed: {}", job.job_id, snapshot.raw);
                    return Err(
                        RelayError::provider_with_details(
                            "D-ID video generation failed",
                            snapshot.raw
                        )
                    );
                }
                JobStatus::Other(raw) => {
                    warn!(
                        "Talk {} reported unrecognized status '{}' (attempt {}/{}), continuing",
                        job.job_id,
                        raw,
                        attempt,
                        self.policy.max_attempts
                    );
                }
            }
        }

        warn!("Talk {} did not finish within {} polls", job.job_id, self.policy.max_attempts);
        Err(RelayError::Timeout("Video generation timed out".to_string()))
    }

    /// Runs [`Self::submit_and_wait`] on its own task so the poll loop keeps going even if the
    /// awaiting request is dropped.
    pub async fn submit_detached(
        &self,
        source_image_address: String,
        script_text: String
    ) -> RelayResult<VideoResult> {
        let orchestrator = self.clone();
        tokio::spawn(async move {
            orchestrator.submit_and_wait(&source_image_address, &script_text).await
        }).await.map_err(|e| RelayError::provider(format!("Video job task failed: {}", e)))?
    }
}
