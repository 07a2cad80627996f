// src/assets/site.rs

//! External site generator.

use std::path::PathBuf;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::task::{Failure, Task, TaskFuture, names};

/// Runs the configured site generator command in the project root.
///
/// The generator is a black box: a zero exit status is success, anything
/// else is a `ProcessExit` failure.
#[derive(Debug, Clone)]
pub struct SiteTask {
    root: PathBuf,
    cmd: String,
    out_dir: PathBuf,
}

impl SiteTask {
    pub fn new(root: impl Into<PathBuf>, cmd: impl Into<String>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cmd: cmd.into(),
            out_dir: out_dir.into(),
        }
    }

    async fn generate(&self) -> Result<(), Failure> {
        info!(task = names::RUN_SITE_GENERATOR, cmd = %self.cmd, "running site generator");

        // Build a shell command appropriate for the platform.
        let mut cmd = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(&self.cmd);
            c
        } else {
            let mut c = Command::new("sh");
            c.arg("-c").arg(&self.cmd);
            c
        };

        cmd.current_dir(&self.root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            Failure::io(
                names::RUN_SITE_GENERATOR,
                format!("spawning `{}`: {e}", self.cmd),
            )
        })?;

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    info!(task = names::RUN_SITE_GENERATOR, "{}", line);
                }
            });
        }

        // Keep the last stderr lines for the failure message.
        let stderr_tail = child.stderr.take().map(|stderr| {
            tokio::spawn(async move {
                let mut tail: Vec<String> = Vec::new();
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!(task = names::RUN_SITE_GENERATOR, "stderr: {}", line);
                    tail.push(line);
                    if tail.len() > STDERR_TAIL_LINES {
                        tail.remove(0);
                    }
                }
                tail
            })
        });

        let status = child.wait().await.map_err(|e| {
            Failure::io(
                names::RUN_SITE_GENERATOR,
                format!("waiting for `{}`: {e}", self.cmd),
            )
        })?;

        let tail = match stderr_tail {
            Some(handle) => handle.await.unwrap_or_default(),
            None => Vec::new(),
        };

        if status.success() {
            info!(task = names::RUN_SITE_GENERATOR, out = %self.out_dir.display(), "site generated");
            return Ok(());
        }

        let code = status.code().unwrap_or(-1);
        let mut message = format!("`{}` exited with status {code}", self.cmd);
        if !tail.is_empty() {
            message.push('\n');
            message.push_str(&tail.join("\n"));
        }
        Err(Failure::process_exit(names::RUN_SITE_GENERATOR, code, message))
    }
}

const STDERR_TAIL_LINES: usize = 20;

impl Task for SiteTask {
    fn name(&self) -> &str {
        names::RUN_SITE_GENERATOR
    }

    fn outputs(&self) -> Vec<PathBuf> {
        vec![self.out_dir.clone()]
    }

    fn run(&self) -> TaskFuture<'_> {
        Box::pin(self.generate())
    }
}
