//! External command execution.
//!
//! Every invocation is a program plus a literal argument vector; nothing is
//! ever passed through a shell. Binaries are looked up on `PATH` before they
//! are run so a missing tool surfaces as [`RuntimeError::BinaryNotFound`]
//! rather than a spawn failure.

use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::process::Command;

use tracing::debug;

use crate::error::{RuntimeError, RuntimeResult};

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when terminated by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// A successful run with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            status: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Whether the process exited with code 0.
    pub const fn succeeded(&self) -> bool {
        matches!(self.status, Some(0))
    }
}

/// Runs external programs.
///
/// Post-processors only talk to this trait so tests can record invocations
/// instead of spawning real tools.
pub trait CommandRunner: Send + Sync {
    /// Resolve `binary` on `PATH`.
    fn locate(&self, binary: &str) -> RuntimeResult<PathBuf>;

    /// Run `program` with `args` and capture its output. A non-zero exit is
    /// not an error at this level.
    fn run(&self, program: &OsStr, args: &[OsString]) -> RuntimeResult<CommandOutput>;
}

/// Production runner backed by [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn locate(&self, binary: &str) -> RuntimeResult<PathBuf> {
        which::which(binary).map_err(|_| RuntimeError::BinaryNotFound {
            binary: binary.to_string(),
        })
    }

    fn run(&self, program: &OsStr, args: &[OsString]) -> RuntimeResult<CommandOutput> {
        let output = Command::new(program).args(args).output().map_err(|e| {
            RuntimeError::io(format!("failed to start {}", program.to_string_lossy()), e)
        })?;

        Ok(CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Builds a literal argument vector.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Args(Vec<OsString>);

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.0.push(arg.into());
        self
    }

    pub fn as_slice(&self) -> &[OsString] {
        &self.0
    }
}

/// Locate `binary`, run it, and turn a non-zero exit into
/// [`RuntimeError::SubprocessError`].
pub fn run_checked(
    runner: &dyn CommandRunner,
    binary: &str,
    args: &Args,
) -> RuntimeResult<CommandOutput> {
    let program = runner.locate(binary)?;
    debug!(program = %program.display(), args = ?args.as_slice(), "Running external command");

    let output = runner.run(program.as_os_str(), args.as_slice())?;
    if output.succeeded() {
        Ok(output)
    } else {
        Err(RuntimeError::SubprocessError {
            program: binary.to_string(),
            status: output.status,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

#[cfg(test)]
pub mod testing {
    //! Recording runner for post-processor tests.

    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    use super::*;

    /// One recorded invocation: binary name plus arguments as strings.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Invocation {
        pub binary: String,
        pub args: Vec<String>,
    }

    /// Fake runner that knows a fixed set of binaries and replays canned
    /// outputs keyed by binary name.
    #[derive(Default)]
    pub struct RecordingRunner {
        installed: HashSet<String>,
        producers: HashSet<String>,
        outputs: Mutex<HashMap<String, Vec<CommandOutput>>>,
        calls: Mutex<Vec<Invocation>>,
    }

    impl RecordingRunner {
        pub fn with_binaries(binaries: &[&str]) -> Self {
            Self {
                installed: binaries.iter().map(|b| (*b).to_string()).collect(),
                ..Self::default()
            }
        }

        /// Make `binary` write a file at its last argument before exiting,
        /// whatever its exit status.
        #[must_use]
        pub fn producing_output(mut self, binary: &str) -> Self {
            self.producers.insert(binary.to_string());
            self
        }

        /// Queue an output for the next call of `binary`. Calls with nothing
        /// queued succeed with empty output.
        pub fn respond(&self, binary: &str, output: CommandOutput) {
            self.outputs
                .lock()
                .unwrap()
                .entry(binary.to_string())
                .or_default()
                .push(output);
        }

        pub fn calls(&self) -> Vec<Invocation> {
            self.calls.lock().unwrap().clone()
        }

        pub fn binaries_called(&self) -> Vec<String> {
            self.calls().into_iter().map(|c| c.binary).collect()
        }
    }

    impl CommandRunner for RecordingRunner {
        fn locate(&self, binary: &str) -> RuntimeResult<PathBuf> {
            if self.installed.contains(binary) {
                Ok(PathBuf::from(binary))
            } else {
                Err(RuntimeError::BinaryNotFound {
                    binary: binary.to_string(),
                })
            }
        }

        fn run(&self, program: &OsStr, args: &[OsString]) -> RuntimeResult<CommandOutput> {
            let binary = program.to_string_lossy().into_owned();
            self.calls.lock().unwrap().push(Invocation {
                binary: binary.clone(),
                args: args.iter().map(|a| a.to_string_lossy().into_owned()).collect(),
            });
            if self.producers.contains(&binary) {
                if let Some(output) = args.last() {
                    std::fs::write(output, b"produced").unwrap();
                }
            }
            let mut outputs = self.outputs.lock().unwrap();
            let queued = outputs.get_mut(&binary).filter(|q| !q.is_empty());
            Ok(queued.map_or_else(|| CommandOutput::success(""), |q| q.remove(0)))
        }
    }
}
