//! Error types for request handling.

use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

/// Failure while running the external command.
#[derive(Debug, Error)]
pub enum SubprocessError {
    /// The program could not be started (not installed, bad working directory).
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The program ran but reported failure.
    #[error("`{program}` exited with {status}: {stderr}")]
    Exited {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    /// Reading the program's output or waiting for it failed.
    #[error("I/O error while running command: {0}")]
    Io(#[from] std::io::Error),

    #[error("command timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("command output exceeded {0} bytes")]
    OutputTooLarge(u64),
}

/// Request could not be interpreted.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("malformed query string: {0}")]
    MalformedQuery(String),
}

/// Everything that can stop a report from being produced.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Subprocess(#[from] SubprocessError),
}
