//! Error types for post-processing.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while turning a downloaded artifact into something runnable.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// A required external tool is not installed.
    #[error("Required binary '{binary}' was not found on PATH")]
    BinaryNotFound { binary: String },

    /// An external tool ran and exited unsuccessfully.
    #[error("'{program}' failed ({}): {}", describe_status(.status), summarize(.stderr, .stdout))]
    SubprocessError {
        program: String,
        /// Exit code, `None` when the process was killed by a signal.
        status: Option<i32>,
        stdout: String,
        stderr: String,
    },

    /// A caller-supplied value cannot be passed to an external tool.
    #[error("Invalid {what} '{value}': {reason}")]
    InvalidArgument {
        what: &'static str,
        value: String,
        reason: String,
    },

    /// The input artifact does not exist.
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Local filesystem failure.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl RuntimeError {
    /// Create an `InvalidArgument` error.
    pub fn invalid(what: &'static str, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            what,
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Wrap an I/O error with what was being attempted.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

#[allow(clippy::ref_option)]
fn describe_status(status: &Option<i32>) -> String {
    status.map_or_else(|| "terminated by signal".to_string(), |code| format!("exit code {code}"))
}

fn summarize<'a>(stderr: &'a str, stdout: &'a str) -> &'a str {
    let text = if stderr.trim().is_empty() { stdout } else { stderr };
    text.trim()
}

/// Result type alias for post-processing operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subprocess_error_prefers_stderr() {
        let err = RuntimeError::SubprocessError {
            program: "docker".to_string(),
            status: Some(1),
            stdout: "ignored".to_string(),
            stderr: "  no such file\n".to_string(),
        };
        assert_eq!(err.to_string(), "'docker' failed (exit code 1): no such file");
    }

    #[test]
    fn subprocess_error_falls_back_to_stdout() {
        let err = RuntimeError::SubprocessError {
            program: "qemu-img".to_string(),
            status: None,
            stdout: "oops".to_string(),
            stderr: String::new(),
        };
        assert_eq!(
            err.to_string(),
            "'qemu-img' failed (terminated by signal): oops"
        );
    }
}
