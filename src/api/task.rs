//! Asynchronous task polling with capped exponential backoff.

use crate::api::ApiError;

use log::debug;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Maximum full jitter added to each poll delay.
const JITTER_MS: u64 = 1000;

/// Default overall polling deadline.
pub const DEFAULT_TIMEOUT_MS: u64 = 30000;

/// Default base poll interval.
pub const DEFAULT_INTERVAL_MS: u64 = 1000;

/// Default cap on the backoff interval.
pub const DEFAULT_MAX_INTERVAL_MS: u64 = 10000;

// ----------------------------------------------------------------------------
// Task Status
// ----------------------------------------------------------------------------

/// Status of an asynchronous backend task.
///
/// Only [`Success`](TaskStatus::Success) is terminal on a successful status
/// response; every other status keeps the task in flight until the overall
/// polling deadline. Task failures surface as error responses with a detail
/// message from the result endpoint instead.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskStatus {
    Pending,
    Started,
    Processing,
    Success,
    Failure,
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::Started => "STARTED",
            TaskStatus::Processing => "PROCESSING",
            TaskStatus::Success => "SUCCESS",
            TaskStatus::Failure => "FAILURE",
        };
        write!(f, "{status}")
    }
}

/// Response shape of the task status and result endpoints.
///
/// Generic over the job-specific result payload: a processed session file
/// for uploads, a computed ring for ring tasks.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct TaskResponse<T> {
    pub task_id: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub result: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// A terminal poll outcome with the number of retries it took.
#[derive(Clone, Debug)]
pub struct TaskResult<T> {
    pub response: TaskResponse<T>,
    /// Status checks that observed a non-terminal status before success.
    pub retries: u32,
}

// ----------------------------------------------------------------------------
// Polling
// ----------------------------------------------------------------------------

/// Poll intervals and the overall deadline.
#[derive(Clone, Copy, Debug)]
pub struct PollSettings {
    /// Overall deadline for the whole polling call.
    pub timeout: Duration,
    /// Base interval between status checks.
    pub interval: Duration,
    /// Cap on the exponential component of the backoff.
    pub max_interval: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        PollSettings {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            max_interval: Duration::from_millis(DEFAULT_MAX_INTERVAL_MS),
        }
    }
}

/// Poll a task status endpoint until success, failure, or the deadline.
///
/// Transport errors and non-2xx responses are fatal and reported with the
/// server-provided detail when present. Successful responses with any status
/// other than `SUCCESS` schedule another check after an exponentially
/// increasing, jittered, capped delay. The overall deadline races the poll
/// loop; the losing branch is dropped, which aborts its in-flight request or
/// sleep.
pub async fn poll<T>(
    client: &reqwest::Client,
    status_url: &str,
    settings: &PollSettings,
) -> Result<TaskResult<T>, ApiError>
where
    T: DeserializeOwned,
{
    let polling = async {
        let mut attempt: u32 = 0;
        loop {
            let response = client
                .get(status_url)
                .send()
                .await
                .map_err(|error| ApiError::RequestFailed(error.to_string()))?;

            if !response.status().is_success() {
                return Err(ApiError::from_response(response).await);
            }

            let response: TaskResponse<T> = response
                .json()
                .await
                .map_err(|_| ApiError::Unrecognized)?;

            if response.status == TaskStatus::Success {
                return Ok(TaskResult {
                    response,
                    retries: attempt,
                });
            }

            let delay = backoff_delay(settings.interval, settings.max_interval, attempt);
            debug!(
                "Task {} is {}, next status check in {} ms",
                response.task_id,
                response.status,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    };

    match tokio::time::timeout(settings.timeout, polling).await {
        Ok(result) => result,
        Err(_) => Err(ApiError::TimedOut(settings.timeout.as_millis() as u64)),
    }
}

/// Delay before poll cycle `attempt + 1`.
///
/// The exponential component doubles the base interval per attempt and is
/// capped at the maximum interval; up to one second of full jitter is added
/// on top of the cap.
///
/// ## Examples
///
/// ```rust
/// use brick::api::task::backoff_delay;
/// use std::time::Duration;
///
/// let interval = Duration::from_millis(100);
/// let max_interval = Duration::from_millis(1000);
///
/// let delay = backoff_delay(interval, max_interval, 3).as_millis();
/// assert!((800..1800).contains(&delay));
/// ```
pub fn backoff_delay(interval: Duration, max_interval: Duration, attempt: u32) -> Duration {
    let interval_ms = interval.as_millis() as u64;
    let max_ms = max_interval.as_millis() as u64;

    let exponential = interval_ms.saturating_mul(2u64.saturating_pow(attempt));
    let jitter = rand::thread_rng().gen_range(0..JITTER_MS);

    Duration::from_millis(exponential.min(max_ms) + jitter)
}
