use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::instrument;

use crate::client::{JobApi, RemoteJobClient, DEFAULT_REQUEST_TIMEOUT};
use crate::credentials::Credentials;
use crate::error::{QueryError, Result};
use crate::types::{ExecutionRequest, JobStatus, ResultSet};

/// How the controller waits for a job to finish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Fixed delay between two status checks
    pub interval: Duration,
    /// Upper bound on the time spent polling
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Execution stages. `Done`, `Failed` and `TimedOut` are terminal.
#[derive(Debug)]
enum ExecutionState {
    Submitting,
    Polling {
        job_id: String,
        started: Instant,
        deadline: Instant,
    },
    Fetching {
        job_id: String,
        result_id: u64,
    },
    Done(ResultSet),
    Failed(QueryError),
    TimedOut {
        job_id: String,
        waited: Duration,
    },
}

impl ExecutionState {
    fn name(&self) -> &'static str {
        match self {
            ExecutionState::Submitting => "submitting",
            ExecutionState::Polling { .. } => "polling",
            ExecutionState::Fetching { .. } => "fetching",
            ExecutionState::Done(_) => "done",
            ExecutionState::Failed(_) => "failed",
            ExecutionState::TimedOut { .. } => "timed_out",
        }
    }
}

/// Runs one query end to end: submit, poll until terminal, fetch.
///
/// Holds no per-execution state, so a single controller serves any number of
/// concurrent executions.
#[derive(Clone)]
pub struct ExecutionController {
    api: Arc<dyn JobApi>,
    policy: PollPolicy,
}

impl ExecutionController {
    pub fn new(api: Arc<dyn JobApi>, policy: PollPolicy) -> Self {
        Self { api, policy }
    }

    /// Controller backed by a [`RemoteJobClient`] for the given credentials
    pub fn from_credentials(credentials: &Credentials, policy: PollPolicy) -> Result<Self> {
        Self::with_request_timeout(credentials, policy, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_request_timeout(
        credentials: &Credentials,
        policy: PollPolicy,
        request_timeout: Duration,
    ) -> Result<Self> {
        let client = RemoteJobClient::new(credentials, request_timeout)?;
        Ok(Self::new(Arc::new(client), policy))
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    #[instrument(skip(self, request), fields(query_id = request.query_id()))]
    pub async fn execute(&self, request: &ExecutionRequest) -> Result<ResultSet> {
        let mut state = ExecutionState::Submitting;

        loop {
            state = match state {
                ExecutionState::Submitting => self.submit(request).await,
                ExecutionState::Polling {
                    job_id,
                    started,
                    deadline,
                } => self.poll(job_id, started, deadline).await,
                ExecutionState::Fetching { job_id, result_id } => {
                    self.fetch(request, job_id, result_id).await
                }
                ExecutionState::Done(result) => {
                    tracing::debug!("Query execution completed");
                    return Ok(result);
                }
                ExecutionState::Failed(err) => {
                    tracing::warn!(error = %err, "Query execution failed");
                    return Err(err);
                }
                ExecutionState::TimedOut { job_id, waited } => {
                    tracing::warn!(job_id = %job_id, waited_ms = waited.as_millis() as u64, "Query execution timed out");
                    return Err(QueryError::Timeout { job_id, waited });
                }
            };
            tracing::debug!(state = state.name(), "Execution state changed");
        }
    }

    async fn submit(&self, request: &ExecutionRequest) -> ExecutionState {
        match self
            .api
            .submit(request.query_id(), request.parameters())
            .await
        {
            Ok(job_id) => {
                let started = Instant::now();
                ExecutionState::Polling {
                    job_id,
                    started,
                    deadline: started + self.policy.timeout,
                }
            }
            Err(err) => ExecutionState::Failed(err),
        }
    }

    /// Poll until the job leaves Pending/Started or the deadline passes.
    ///
    /// A status call still in flight at the deadline is abandoned. Errors from
    /// the status call are not retried.
    async fn poll(&self, job_id: String, started: Instant, deadline: Instant) -> ExecutionState {
        loop {
            let polled = tokio::time::timeout_at(deadline, self.api.poll_status(&job_id)).await;
            let job = match polled {
                Ok(Ok(job)) => job,
                Ok(Err(err)) => return ExecutionState::Failed(err),
                Err(_) => {
                    return ExecutionState::TimedOut {
                        waited: Instant::now() - started,
                        job_id,
                    }
                }
            };

            let status = job.status;
            match status {
                JobStatus::Completed => {
                    return match job.query_result_id {
                        Some(result_id) => ExecutionState::Fetching { job_id, result_id },
                        None => ExecutionState::Failed(QueryError::MissingData(
                            "No result ID returned".to_string(),
                        )),
                    };
                }
                JobStatus::Failed | JobStatus::Cancelled => {
                    let message = job
                        .error
                        .filter(|msg| !msg.is_empty())
                        .unwrap_or_else(|| match status {
                            JobStatus::Cancelled => "job was cancelled".to_string(),
                            _ => "job reported failure".to_string(),
                        });
                    return ExecutionState::Failed(QueryError::JobFailed { job_id, message });
                }
                JobStatus::Pending | JobStatus::Started => {
                    tracing::trace!(job_id = %job_id, status = ?status, "Job still running");
                }
            }

            tokio::time::sleep(self.policy.interval).await;

            let now = Instant::now();
            if now >= deadline {
                return ExecutionState::TimedOut {
                    job_id,
                    waited: now - started,
                };
            }
        }
    }

    async fn fetch(
        &self,
        request: &ExecutionRequest,
        job_id: String,
        result_id: u64,
    ) -> ExecutionState {
        tracing::debug!(job_id = %job_id, result_id, "Fetching query result");
        match self.api.fetch_result(request.query_id(), result_id).await {
            Ok(result) => ExecutionState::Done(result),
            Err(err) => ExecutionState::Failed(err),
        }
    }
}
