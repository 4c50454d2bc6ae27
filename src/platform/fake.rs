//! Recording command runner for adapter tests.

use std::io;
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;
use std::sync::Mutex;

use super::command::{CommandOutput, CommandRunner, ExternalCommand};

type Responder = Box<dyn Fn(&ExternalCommand) -> io::Result<CommandOutput> + Send + Sync>;

/// Records every command and answers from a scripted responder.
pub struct RecordingRunner {
    calls: Mutex<Vec<ExternalCommand>>,
    respond: Responder,
}

impl RecordingRunner {
    /// Every command exits 0 with empty stdout.
    pub fn ok() -> Self {
        Self::with(|_| Ok(exited(0, b"")))
    }

    pub fn with(
        respond: impl Fn(&ExternalCommand) -> io::Result<CommandOutput> + Send + Sync + 'static,
    ) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            respond: Box::new(respond),
        }
    }

    /// Recorded commands rendered as shell-like lines.
    pub fn lines(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    pub fn calls(&self) -> Vec<ExternalCommand> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandRunner for RecordingRunner {
    async fn run(&self, command: &ExternalCommand) -> io::Result<CommandOutput> {
        self.calls.lock().unwrap().push(command.clone());
        (self.respond)(command)
    }
}

/// Build an output for a process that exited with `code`.
pub fn exited(code: i32, stdout: &[u8]) -> CommandOutput {
    CommandOutput {
        status: ExitStatus::from_raw(code << 8),
        stdout: stdout.to_vec(),
    }
}
