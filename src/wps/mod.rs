//! Minimal OGC WPS 1.0.0 client: submit a process for asynchronous
//! execution, poll its stored status, read its embedded outputs.

pub mod client;
pub mod describe;
pub mod request;
pub mod response;

use async_trait::async_trait;
use thiserror::Error;

pub use client::WpsClient;
pub use request::{ExecuteRequest, InputValue, RequestedOutput};

#[derive(Debug, Error)]
pub enum WpsError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("response is not valid xml: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The document parsed but is structurally unusable.
    #[error("unusable response: {0}")]
    InvalidResponse(String),

    /// The server answered with an `ows:ExceptionReport`.
    #[error("server exception: {0}")]
    Exception(String),
}

/// The operations the download pipeline needs from a WPS server. A fake
/// implementation stands in for the network in tests.
#[async_trait]
pub trait WpsService {
    /// Submits a process for stored asynchronous execution.
    async fn execute(&self, request: &ExecuteRequest) -> Result<Job, WpsError>;

    /// Waits out the polling interval, then fetches the job's latest status.
    async fn check_status(&self, job: &Job) -> Result<JobStatus, WpsError>;
}

/// Handle to a submitted asynchronous job.
#[derive(Debug, Clone)]
pub struct Job {
    /// Identifier of the process that was submitted.
    pub process: String,
    /// URL the server keeps the evolving execute response at.
    pub status_location: String,
    pub status: JobStatus,
}

impl Job {
    pub fn is_complete(&self) -> bool {
        matches!(
            self.status.state,
            JobState::Succeeded | JobState::Failed { .. }
        )
    }

    /// Percent complete in [0, 100]; terminal states count as 100.
    pub fn percent_completed(&self) -> f32 {
        match &self.status.state {
            JobState::Accepted => 0.0,
            JobState::Started { percent } | JobState::Paused { percent } => *percent,
            JobState::Succeeded | JobState::Failed { .. } => 100.0,
        }
    }

    /// Named output channels; empty until the job has succeeded.
    pub fn outputs(&self) -> &[ProcessOutput] {
        &self.status.outputs
    }
}

/// One parsed execute-response status document.
#[derive(Debug, Clone, PartialEq)]
pub struct JobStatus {
    pub state: JobState,
    /// Embedded outputs, present once the job has succeeded.
    pub outputs: Vec<ProcessOutput>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobState {
    Accepted,
    Started { percent: f32 },
    Paused { percent: f32 },
    Succeeded,
    Failed { message: String },
}

/// A named output channel of a completed job.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOutput {
    pub identifier: String,
    /// Payload text in document order; consumers concatenate.
    pub chunks: Vec<String>,
}

impl ProcessOutput {
    pub fn text(&self) -> String {
        self.chunks.concat()
    }
}

// -- Tests -------------------------------------------------------------------
