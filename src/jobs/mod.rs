//! Long-running remote jobs.
//!
//! A job is created with one request, polled until it reaches a terminal
//! status or its poll deadline, and then its output is fetched. The lifecycle
//! lives in [`state`]; [`video`] implements the protocol for video generation.

pub mod state;
pub mod video;

pub use state::{JobState, JobStatus, PollEvent, StatusDocument};
pub use video::{VideoJobClient, VideoJobConfig};
