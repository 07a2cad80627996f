use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::TaskName;

/// What went wrong, at the granularity operators care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Malformed source asset.
    Syntax,
    /// External tool exited with a non-zero status.
    ProcessExit { code: i32 },
    /// Filesystem or process-spawn failure.
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Syntax => write!(f, "SyntaxError"),
            FailureKind::ProcessExit { code } => write!(f, "ProcessExitError (exit code {code})"),
            FailureKind::Io => write!(f, "IOError"),
        }
    }
}

/// Failure reported by a leaf task.
///
/// Location fields are filled in when the underlying tool knows them
/// (e.g. a CSS parse error). Lines and columns are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct Failure {
    pub task: TaskName,
    pub kind: FailureKind,
    pub message: String,
    pub file: Option<PathBuf>,
    pub line: Option<u32>,
    pub col: Option<u32>,
}

impl Failure {
    pub fn new(task: impl Into<TaskName>, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            kind,
            message: message.into(),
            file: None,
            line: None,
            col: None,
        }
    }

    pub fn syntax(task: impl Into<TaskName>, message: impl Into<String>) -> Self {
        Self::new(task, FailureKind::Syntax, message)
    }

    pub fn process_exit(task: impl Into<TaskName>, code: i32, message: impl Into<String>) -> Self {
        Self::new(task, FailureKind::ProcessExit { code }, message)
    }

    pub fn io(task: impl Into<TaskName>, message: impl Into<String>) -> Self {
        Self::new(task, FailureKind::Io, message)
    }

    /// `io` failure from an `std::io::Error` with the offending path.
    pub fn from_io(task: impl Into<TaskName>, path: &Path, err: &std::io::Error) -> Self {
        Self::io(task, format!("{}: {err}", path.display())).at_file(path)
    }

    pub fn at_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn at_location(mut self, line: u32, col: u32) -> Self {
        self.line = Some(line);
        self.col = Some(col);
        self
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.task, self.message)?;
        if let Some(file) = &self.file {
            write!(f, " ({}", file.display())?;
            if let Some(line) = self.line {
                write!(f, ":{line}")?;
                if let Some(col) = self.col {
                    write!(f, ":{col}")?;
                }
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}
