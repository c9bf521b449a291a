//! Error taxonomy for the download pipeline.

use std::io;

use thiserror::Error;

use crate::wps::WpsError;

#[derive(Debug, Error)]
pub enum SmipsError {
    /// The server rejected the job submission or could not be reached.
    #[error("failed to submit `{process}`")]
    Submission {
        process: String,
        #[source]
        source: WpsError,
    },

    /// A status check on a submitted job failed.
    #[error("status check failed for `{process}` job")]
    Polling {
        process: String,
        #[source]
        source: WpsError,
    },

    /// The job reached completion in the failed state.
    #[error("`{process}` failed on the server: {message}")]
    ProcessFailed { process: String, message: String },

    /// A completed job has no output channel with the expected identifier.
    #[error("`{process}` completed without a `{channel}` output")]
    MissingOutput { process: String, channel: String },

    /// The payload is not a parseable table with a date column.
    #[error("payload is not a valid table: {reason}")]
    MalformedPayload { reason: String },

    /// A date value matches neither the server timestamp format nor `YYYY-MM-DD`.
    #[error("unrecognised date `{value}`")]
    DateFormat { value: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<csv::Error> for SmipsError {
    fn from(err: csv::Error) -> Self {
        let reason = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(e) => SmipsError::Io(e),
            _ => SmipsError::MalformedPayload { reason },
        }
    }
}

pub type Result<T> = std::result::Result<T, SmipsError>;
