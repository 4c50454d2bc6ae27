//! External command runner. Every subprocess except the editor is spawned here.
//!
//! Every subprocess-backed adapter (`xdotool`, `xset`, `xclip`) describes
//! its invocation as an [`ExternalCommand`] and hands it to a
//! [`CommandRunner`]. Tests substitute a recording runner.

use std::fmt;
use std::io;
use std::process::{ExitStatus, Stdio};

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// A subprocess invocation with fixed argument shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    pub program: String,
    pub args: Vec<String>,
    /// Bytes piped to stdin. `None` means stdin is `/dev/null`.
    pub stdin: Option<Vec<u8>>,
    /// Capture stdout instead of discarding it.
    pub capture_stdout: bool,
}

impl ExternalCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: None,
            capture_stdout: false,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn stdin(mut self, input: &[u8]) -> Self {
        self.stdin = Some(input.to_vec());
        self
    }

    pub fn capture_stdout(mut self) -> Self {
        self.capture_stdout = true;
        self
    }
}

impl fmt::Display for ExternalCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Exit status plus whatever was captured from stdout.
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
}

/// Runs external commands to completion.
///
/// A spawn or pipe failure is the `Err` case. A non-zero exit is not an
/// error at this level; the calling adapter decides what it means.
pub trait CommandRunner {
    async fn run(&self, command: &ExternalCommand) -> io::Result<CommandOutput>;
}

impl<R: CommandRunner> CommandRunner for &R {
    async fn run(&self, command: &ExternalCommand) -> io::Result<CommandOutput> {
        (**self).run(command).await
    }
}

/// Runs commands on the host via `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    async fn run(&self, command: &ExternalCommand) -> io::Result<CommandOutput> {
        tracing::debug!(command = %command, "running");

        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(if command.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            // xclip forks a selection server that inherits stdout; capturing
            // it unconditionally would block until that server exits.
            .stdout(if command.capture_stdout {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stderr(Stdio::inherit())
            .spawn()?;

        // Feed stdin while waiting so a child that fills its stdout pipe
        // cannot stall the write. Dropping stdin closes the pipe (EOF).
        let stdin = child.stdin.take();
        let feed = async {
            match (command.stdin.as_deref(), stdin) {
                (Some(input), Some(mut stdin)) => stdin.write_all(input).await,
                _ => Ok(()),
            }
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output?;

        match fed {
            // The child closed stdin early; its exit status tells the rest.
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                tracing::debug!(command = %command, "stdin closed early");
            }
            other => other?,
        }

        Ok(CommandOutput {
            status: output.status,
            stdout: output.stdout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_program_and_args() {
        let cmd = ExternalCommand::new("xdotool").args(["windowactivate", "--sync", "123"]);
        assert_eq!(cmd.to_string(), "xdotool windowactivate --sync 123");
    }

    #[test]
    fn builder_defaults() {
        let cmd = ExternalCommand::new("xset");
        assert!(cmd.args.is_empty());
        assert!(cmd.stdin.is_none());
        assert!(!cmd.capture_stdout);
    }

    #[tokio::test]
    async fn pipes_stdin_and_captures_stdout() {
        let cmd = ExternalCommand::new("cat").stdin(b"hello").capture_stdout();
        let output = SystemRunner.run(&cmd).await.unwrap();
        assert!(output.status.success());
        assert_eq!(output.stdout, b"hello");
    }

    #[tokio::test]
    async fn large_stdin_and_stdout_do_not_deadlock() {
        let input = vec![b'x'; 1 << 20];
        let cmd = ExternalCommand::new("cat").stdin(&input).capture_stdout();
        let output = SystemRunner.run(&cmd).await.unwrap();
        assert!(output.status.success());
        assert_eq!(output.stdout.len(), input.len());
    }

    #[tokio::test]
    async fn child_ignoring_stdin_reports_its_status() {
        let input = vec![b'x'; 1 << 20];
        let cmd = ExternalCommand::new("sh").args(["-c", "exit 4"]).stdin(&input);
        let output = SystemRunner.run(&cmd).await.unwrap();
        assert_eq!(output.status.code(), Some(4));
    }

    #[tokio::test]
    async fn stdout_discarded_unless_requested() {
        let cmd = ExternalCommand::new("echo").args(["ignored"]);
        let output = SystemRunner.run(&cmd).await.unwrap();
        assert!(output.status.success());
        assert!(output.stdout.is_empty());
    }

    #[tokio::test]
    async fn non_zero_exit_is_not_an_error() {
        let output = SystemRunner
            .run(&ExternalCommand::new("false"))
            .await
            .unwrap();
        assert!(!output.status.success());
    }

    #[tokio::test]
    async fn missing_program_is_spawn_error() {
        let err = SystemRunner
            .run(&ExternalCommand::new("diva-no-such-program"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
