//! Job lifecycle as a pure state machine.
//!
//! `Created → Polling → {Succeeded, Failed, Cancelled, TimedOut}`. Transitions
//! are driven by [`PollEvent`]s and perform no I/O, so the whole lifecycle can
//! be exercised without a network.

use crate::tools::ToolError;
use serde::Deserialize;
use serde_json::Value;

/// Status reported by the job service, normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
    Unknown,
}

impl JobStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "queued" | "pending" | "notstarted" => JobStatus::Queued,
            "preprocessing" | "running" | "processing" | "inprogress" => JobStatus::Running,
            "succeeded" => JobStatus::Succeeded,
            "failed" => JobStatus::Failed,
            "cancelled" | "canceled" => JobStatus::Cancelled,
            _ => JobStatus::Unknown,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Succeeded | JobStatus::Failed | JobStatus::Cancelled
        )
    }
}

/// Body of a job status response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatusDocument {
    #[serde(default)]
    pub status: Option<String>,
    /// Kept untyped; its shape is only checked once the job has succeeded.
    #[serde(default)]
    pub generations: Value,
}

impl StatusDocument {
    fn raw_status(&self) -> String {
        self.status.clone().unwrap_or_default()
    }
}

/// Input to a state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    /// A status document was fetched.
    Observed(StatusDocument),
    /// The poll deadline passed before a terminal status was seen.
    DeadlineElapsed,
}

/// Where a job is in its lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum JobState {
    Created {
        job_id: String,
    },
    Polling {
        job_id: String,
        status: JobStatus,
        raw_status: String,
        polls: u32,
    },
    Succeeded {
        job_id: String,
        document: StatusDocument,
    },
    Failed {
        job_id: String,
        raw_status: String,
    },
    Cancelled {
        job_id: String,
        raw_status: String,
    },
    TimedOut {
        job_id: String,
        last_status: Option<String>,
    },
}

impl JobState {
    pub fn created(job_id: impl Into<String>) -> Self {
        JobState::Created {
            job_id: job_id.into(),
        }
    }

    pub fn job_id(&self) -> &str {
        match self {
            JobState::Created { job_id }
            | JobState::Polling { job_id, .. }
            | JobState::Succeeded { job_id, .. }
            | JobState::Failed { job_id, .. }
            | JobState::Cancelled { job_id, .. }
            | JobState::TimedOut { job_id, .. } => job_id,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobState::Created { .. } | JobState::Polling { .. })
    }

    /// Number of status documents observed while polling.
    pub fn polls(&self) -> u32 {
        match self {
            JobState::Polling { polls, .. } => *polls,
            _ => 0,
        }
    }

    /// Advance the job. Terminal states absorb every further event.
    pub fn apply(self, event: PollEvent) -> JobState {
        if self.is_terminal() {
            return self;
        }

        let (job_id, last_raw, polls) = match self {
            JobState::Created { job_id } => (job_id, None, 0),
            JobState::Polling {
                job_id,
                raw_status,
                polls,
                ..
            } => (job_id, Some(raw_status), polls),
            terminal => return terminal,
        };

        match event {
            PollEvent::DeadlineElapsed => JobState::TimedOut {
                job_id,
                last_status: last_raw,
            },
            PollEvent::Observed(document) => {
                let raw_status = document.raw_status();
                match JobStatus::parse(&raw_status) {
                    JobStatus::Succeeded => JobState::Succeeded { job_id, document },
                    JobStatus::Failed => JobState::Failed { job_id, raw_status },
                    JobStatus::Cancelled => JobState::Cancelled { job_id, raw_status },
                    status => JobState::Polling {
                        job_id,
                        status,
                        raw_status,
                        polls: polls + 1,
                    },
                }
            }
        }
    }

    /// Evaluate a terminal state: the first generation id on success, a
    /// structured failure otherwise.
    pub fn into_generation_id(self) -> Result<String, ToolError> {
        match self {
            JobState::Succeeded { job_id, document } => first_generation_id(job_id, &document),
            JobState::Failed { job_id, raw_status } | JobState::Cancelled { job_id, raw_status } => {
                Err(ToolError::JobNotSucceeded {
                    job: job_id,
                    final_status: raw_status,
                    last_status: None,
                })
            }
            JobState::TimedOut {
                job_id,
                last_status,
            } => Err(ToolError::JobNotSucceeded {
                job: job_id,
                final_status: "timed_out".to_string(),
                last_status,
            }),
            JobState::Created { job_id } => Err(ToolError::JobNotSucceeded {
                job: job_id,
                final_status: "unknown".to_string(),
                last_status: None,
            }),
            JobState::Polling {
                job_id, raw_status, ..
            } => Err(ToolError::JobNotSucceeded {
                job: job_id,
                final_status: raw_status,
                last_status: None,
            }),
        }
    }
}

fn first_generation_id(job_id: String, document: &StatusDocument) -> Result<String, ToolError> {
    let first = document
        .generations
        .as_array()
        .and_then(|generations| generations.first())
        .ok_or_else(|| ToolError::NoGenerations {
            job: job_id.clone(),
        })?;

    first
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.trim().is_empty())
        .map(str::to_string)
        .ok_or(ToolError::MissingGenerationId { job: job_id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn observed(body: Value) -> PollEvent {
        PollEvent::Observed(serde_json::from_value(body).unwrap())
    }

    #[test]
    fn test_queued_then_running_then_succeeded() {
        let state = JobState::created("job-1")
            .apply(observed(json!({ "status": "queued" })))
            .apply(observed(json!({ "status": "running" })));
        assert!(matches!(
            state,
            JobState::Polling {
                status: JobStatus::Running,
                polls: 2,
                ..
            }
        ));

        let done = state.apply(observed(json!({
            "status": "succeeded",
            "generations": [{ "id": "gen-9" }]
        })));
        assert!(done.is_terminal());
        assert_eq!(done.into_generation_id().unwrap(), "gen-9");
    }

    #[test]
    fn test_terminal_state_absorbs_events() {
        let failed = JobState::created("job-1").apply(observed(json!({ "status": "failed" })));
        let after = failed
            .clone()
            .apply(observed(json!({ "status": "succeeded" })))
            .apply(PollEvent::DeadlineElapsed);
        assert_eq!(after, failed);
    }

    #[test]
    fn test_failed_and_cancelled_report_status() {
        let cancelled = JobState::created("job-2").apply(observed(json!({ "status": "cancelled" })));
        assert_eq!(
            cancelled.into_generation_id(),
            Err(ToolError::JobNotSucceeded {
                job: "job-2".to_string(),
                final_status: "cancelled".to_string(),
                last_status: None,
            })
        );
    }

    #[test]
    fn test_deadline_yields_timed_out_with_last_status() {
        let state = JobState::created("job-3")
            .apply(observed(json!({ "status": "running" })))
            .apply(PollEvent::DeadlineElapsed);

        assert_eq!(
            state.into_generation_id(),
            Err(ToolError::JobNotSucceeded {
                job: "job-3".to_string(),
                final_status: "timed_out".to_string(),
                last_status: Some("running".to_string()),
            })
        );
    }

    #[test]
    fn test_unknown_status_keeps_polling() {
        let state = JobState::created("job-4").apply(observed(json!({ "status": "warming_up" })));
        assert!(!state.is_terminal());

        let missing = JobState::created("job-4").apply(observed(json!({})));
        assert!(matches!(
            missing,
            JobState::Polling {
                status: JobStatus::Unknown,
                ..
            }
        ));
    }

    #[test]
    fn test_success_without_generations() {
        let empty = JobState::created("job-5")
            .apply(observed(json!({ "status": "succeeded", "generations": [] })));
        assert_eq!(
            empty.into_generation_id(),
            Err(ToolError::NoGenerations {
                job: "job-5".to_string()
            })
        );

        let no_id = JobState::created("job-6")
            .apply(observed(json!({ "status": "succeeded", "generations": [{ "url": "x" }] })));
        assert_eq!(
            no_id.into_generation_id(),
            Err(ToolError::MissingGenerationId {
                job: "job-6".to_string()
            })
        );
    }

    #[test]
    fn test_simulated_deadline_bounds_poll_count() {
        // 5 minute budget with a 5 second delay before every poll.
        let interval = 5u64;
        let deadline = 300u64;
        let mut elapsed = 0u64;
        let mut state = JobState::created("job-7");
        let mut attempts = 0;

        while !state.is_terminal() {
            if elapsed >= deadline {
                state = state.apply(PollEvent::DeadlineElapsed);
                break;
            }
            elapsed += interval;
            attempts += 1;
            state = state.apply(observed(json!({ "status": "running" })));
        }

        assert!(attempts <= 61, "made {} attempts", attempts);
        assert!(matches!(state, JobState::TimedOut { .. }));
    }
}
