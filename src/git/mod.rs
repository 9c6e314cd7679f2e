//! Subprocess execution for the per-request repository log.
//!
//! The handler only sees the [`CommandRunner`] trait so it can be driven by
//! fakes in tests; [`GitLogRunner`] is the production implementation that
//! shells out to the system `git` binary.

mod runner;

use std::future::Future;
use std::pin::Pin;

use crate::error::SubprocessError;

pub use runner::GitLogRunner;

/// Boxed future returned by [`CommandRunner::run`].
pub type RunFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<u8>, SubprocessError>> + Send + 'a>>;

/// Runs a fixed external command and returns its standard output, byte for byte.
pub trait CommandRunner: Send + Sync {
    fn run(&self) -> RunFuture<'_>;

    /// Human-readable command line, used in log lines.
    fn describe(&self) -> String;
}
