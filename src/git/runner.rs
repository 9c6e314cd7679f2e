// Git command runner
// Spawns the configured command with tokio::process, bounded by a timeout and an output cap

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

use super::{CommandRunner, RunFuture};
use crate::config::GitConfig;
use crate::error::SubprocessError;

/// Bytes of stderr kept for error messages; the rest is drained and dropped
const STDERR_KEEP: u64 = 4096;

/// Runs `git log --oneline` (or whatever the `[git]` section says)
#[derive(Debug, Clone)]
pub struct GitLogRunner {
    program: String,
    args: Vec<String>,
    repo_path: Option<PathBuf>,
    timeout: Duration,
    max_output_bytes: u64,
}

impl GitLogRunner {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            repo_path: None,
            timeout: Duration::from_secs(30),
            max_output_bytes: 16 * 1024 * 1024,
        }
    }

    pub fn from_config(cfg: &GitConfig) -> Self {
        let runner = Self::new(cfg.program.clone(), cfg.args.clone())
            .with_timeout(cfg.timeout())
            .with_max_output_bytes(cfg.max_output_bytes);
        match &cfg.repo_path {
            Some(path) => runner.with_repo_path(path),
            None => runner,
        }
    }

    #[must_use]
    pub fn with_repo_path(mut self, path: impl AsRef<Path>) -> Self {
        self.repo_path = Some(path.as_ref().to_path_buf());
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_max_output_bytes(mut self, limit: u64) -> Self {
        self.max_output_bytes = limit;
        self
    }

    async fn execute(&self) -> Result<Vec<u8>, SubprocessError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.repo_path {
            cmd.current_dir(dir);
        }

        cmd.env("GIT_TERMINAL_PROMPT", "0");
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        // the child is killed if the timeout drops this future
        cmd.kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| SubprocessError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        let stdout = child.stdout.take().ok_or_else(|| missing_pipe("stdout"))?;
        let stderr = child.stderr.take().ok_or_else(|| missing_pipe("stderr"))?;

        let (stdout, stderr, status) = tokio::try_join!(
            read_capped(stdout, self.max_output_bytes),
            async { read_stderr(stderr).await.map_err(SubprocessError::from) },
            async { child.wait().await.map_err(SubprocessError::from) },
        )?;

        if !status.success() {
            return Err(SubprocessError::Exited {
                program: self.program.clone(),
                status,
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }

        Ok(stdout)
    }
}

impl CommandRunner for GitLogRunner {
    fn run(&self) -> RunFuture<'_> {
        Box::pin(async move {
            tokio::time::timeout(self.timeout, self.execute())
                .await
                .map_err(|_| SubprocessError::Timeout(self.timeout))?
        })
    }

    fn describe(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        if let Some(dir) = &self.repo_path {
            line.push_str(&format!(" (in {})", dir.display()));
        }
        line
    }
}

/// Read everything from `reader`, failing once more than `limit` bytes arrive
async fn read_capped<R>(reader: R, limit: u64) -> Result<Vec<u8>, SubprocessError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    let read = reader
        .take(limit.saturating_add(1))
        .read_to_end(&mut buf)
        .await?;
    if read as u64 > limit {
        return Err(SubprocessError::OutputTooLarge(limit));
    }
    Ok(buf)
}

/// Keep the head of stderr and drain the rest so the child never blocks on a full pipe
async fn read_stderr<R>(mut reader: R) -> io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    (&mut reader).take(STDERR_KEEP).read_to_end(&mut buf).await?;
    tokio::io::copy(&mut reader, &mut tokio::io::sink()).await?;
    Ok(buf)
}

fn missing_pipe(name: &str) -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, format!("{name} was not captured"))
}
