//! Polling for asynchronously delivered tasks
//!
//! Video and audio tasks are acknowledged immediately and produced in the
//! background. These helpers issue `getResponse` polls until the task
//! reaches a terminal status, the attempt budget runs out, or a hard error
//! occurs. Each poll gets its own short deadline, decoupled from the overall
//! budget, and a poll-level timeout is transient: the loop sleeps and tries
//! again rather than giving up.

use std::time::Duration;

use tracing::debug;

use taskwire_core::models::{AudioInferenceResponse, VideoInferenceResponse};
use taskwire_core::{Error, Result, TaskResult, TaskStatus};

use crate::client::Client;

/// Deadline for one individual poll round trip
const POLL_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
enum PollOutcome<T> {
    Done(T),
    NotYet,
}

impl Client {
    /// Poll a video task until it succeeds, fails, or the budget runs out.
    ///
    /// Returns `Error::TaskFailed` for a terminal failure and
    /// `Error::PollingExhausted` when `max_attempts` polls all saw the task
    /// still processing.
    pub async fn poll_video_result(
        &self,
        task_uuid: &str,
        max_attempts: u32,
        poll_interval: Duration,
    ) -> Result<VideoInferenceResponse> {
        self.poll_result(task_uuid, max_attempts, poll_interval, |result| {
            let video = result.into_video()?;
            Some(check_status(video.status, video, task_uuid))
        })
        .await
    }

    /// Poll an audio task until it succeeds, fails, or the budget runs out.
    pub async fn poll_audio_result(
        &self,
        task_uuid: &str,
        max_attempts: u32,
        poll_interval: Duration,
    ) -> Result<AudioInferenceResponse> {
        self.poll_result(task_uuid, max_attempts, poll_interval, |result| {
            let audio = result.into_audio()?;
            Some(check_status(audio.status, audio, task_uuid))
        })
        .await
    }

    async fn poll_result<T, F>(
        &self,
        task_uuid: &str,
        max_attempts: u32,
        poll_interval: Duration,
        classify: F,
    ) -> Result<T>
    where
        F: Fn(TaskResult) -> Option<Result<PollOutcome<T>>>,
    {
        for attempt in 1..=max_attempts {
            match self.get_response_with_timeout(task_uuid, POLL_TIMEOUT).await {
                Ok(result) => match classify(result) {
                    Some(Ok(PollOutcome::Done(response))) => return Ok(response),
                    Some(Err(e)) => return Err(e),
                    Some(Ok(PollOutcome::NotYet)) | None => {
                        debug!(task_uuid, attempt, "task still processing");
                    }
                },
                // a poll-level timeout is transient, keep polling
                Err(e) if e.is_timeout() => {
                    debug!(task_uuid, attempt, "poll timed out, retrying");
                }
                Err(e) => return Err(e),
            }
            if attempt < max_attempts {
                tokio::time::sleep(poll_interval).await;
            }
        }
        Err(Error::PollingExhausted {
            attempts: max_attempts,
        })
    }
}

fn check_status<T>(status: Option<TaskStatus>, response: T, task_uuid: &str) -> Result<PollOutcome<T>> {
    match status {
        Some(TaskStatus::Success) => Ok(PollOutcome::Done(response)),
        Some(TaskStatus::Error) => Err(Error::TaskFailed {
            task_uuid: task_uuid.to_string(),
        }),
        // processing or absent: not terminal yet
        Some(TaskStatus::Processing) | None => Ok(PollOutcome::NotYet),
    }
}
