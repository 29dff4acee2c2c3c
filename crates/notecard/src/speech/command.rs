//! Speech recognition through an external transcriber process.
//!
//! The transcriber is started with the session settings in its environment
//! and writes one JSON [`RecognitionEvent`] per line to standard output:
//!
//! ```text
//! {"type":"result","results":[{"alternatives":[{"transcript":"hello"}],"isFinal":false}]}
//! {"type":"error","error":"no-speech","message":"nothing heard"}
//! ```
//!
//! Every `result` line carries all segments recognized so far. The session
//! ends when the process exits or is stopped.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use super::{EventSender, RecognitionEvent, RecognitionSession, RecognitionSettings, SpeechRecognizer};
use crate::error::{Error, Result};

const NAME: &str = "command";

/// Environment variable carrying the language tag.
pub const ENV_LANGUAGE: &str = "NOTECARD_SPEECH_LANG";
/// Environment variable carrying the continuous flag.
pub const ENV_CONTINUOUS: &str = "NOTECARD_SPEECH_CONTINUOUS";
/// Environment variable carrying the interim-results flag.
pub const ENV_INTERIM_RESULTS: &str = "NOTECARD_SPEECH_INTERIM_RESULTS";
/// Environment variable carrying the number of alternatives.
pub const ENV_MAX_ALTERNATIVES: &str = "NOTECARD_SPEECH_MAX_ALTERNATIVES";

/// Recognizer backed by an external transcriber program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRecognizer {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandRecognizer {
    /// Create a recognizer that runs `program` with `args`.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// The configured program.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Locate the program, searching `PATH` for bare names.
    #[must_use]
    pub fn resolve(&self) -> Option<PathBuf> {
        if self.program.as_os_str().is_empty() {
            return None;
        }

        if self.program.components().count() > 1 || self.program.is_absolute() {
            return self.program.is_file().then(|| self.program.clone());
        }

        let path_var = env::var_os("PATH")?;
        env::split_paths(&path_var)
            .map(|dir| dir.join(&self.program))
            .find(|candidate| candidate.is_file())
    }
}

impl SpeechRecognizer for CommandRecognizer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn is_available(&self) -> bool {
        self.resolve().is_some()
    }

    fn start(
        &self,
        settings: &RecognitionSettings,
        events: EventSender,
    ) -> Result<Box<dyn RecognitionSession>> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| Error::speech_start(NAME, "no async runtime is running"))?;
        let program = self.resolve().ok_or_else(|| {
            Error::speech_start(NAME, format!("{} not found", self.program.display()))
        })?;

        debug!(program = %program.display(), args = ?self.args, "Spawning transcriber");
        let mut child = Command::new(&program)
            .args(&self.args)
            .env(ENV_LANGUAGE, &settings.language)
            .env(ENV_CONTINUOUS, settings.continuous.to_string())
            .env(ENV_INTERIM_RESULTS, settings.interim_results.to_string())
            .env(ENV_MAX_ALTERNATIVES, settings.max_alternatives.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| Error::speech_start(NAME, err.to_string()))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::speech_start(NAME, "transcriber stdout was not captured"))?;
        let reader = runtime.spawn(read_events(stdout, events));

        Ok(Box::new(CommandSession { child, reader }))
    }
}

/// Parse one line of transcriber output.
///
/// Lines that are not a valid event become [`RecognitionEvent::Error`].
#[must_use]
pub fn parse_event_line(line: &str) -> RecognitionEvent {
    serde_json::from_str(line).unwrap_or_else(|err| RecognitionEvent::Error {
        error: "malformed-event".to_string(),
        message: Some(err.to_string()),
    })
}

async fn read_events(stdout: ChildStdout, events: EventSender) {
    let mut lines = BufReader::new(stdout).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                trace!(line, "Transcriber output");
                if events.send(parse_event_line(line)).is_err() {
                    break;
                }
            }
            Ok(None) => {
                let _ = events.send(RecognitionEvent::Ended);
                break;
            }
            Err(err) => {
                let _ = events.send(RecognitionEvent::Error {
                    error: "io".to_string(),
                    message: Some(err.to_string()),
                });
                break;
            }
        }
    }
}

#[derive(Debug)]
struct CommandSession {
    child: Child,
    reader: JoinHandle<()>,
}

impl RecognitionSession for CommandSession {
    fn stop(&mut self) -> Result<()> {
        self.reader.abort();

        match self.child.try_wait() {
            Ok(Some(status)) => {
                debug!(%status, "Transcriber already exited");
                Ok(())
            }
            Ok(None) => self.child.start_kill().map_err(|err| {
                warn!("Failed to kill transcriber: {err}");
                Error::speech_stop(NAME, err.to_string())
            }),
            Err(err) => Err(Error::speech_stop(NAME, err.to_string())),
        }
    }
}
