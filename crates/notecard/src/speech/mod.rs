//! Speech recognition for dictated notes.
//!
//! A [`SpeechRecognizer`] starts sessions that deliver [`RecognitionEvent`]s
//! over a channel. [`Dictation`] owns the one session that may be active at a
//! time: starting a second session is rejected, and stopping or dropping the
//! owner always halts the active one.

pub mod command;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

pub use command::CommandRecognizer;

/// Default spoken language of a session.
pub const DEFAULT_LANGUAGE: &str = "pt-BR";

/// How a recognition session is configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionSettings {
    /// BCP 47 language tag of the spoken language.
    pub language: String,
    /// Keep listening after the first final result.
    pub continuous: bool,
    /// Report results before they are final.
    pub interim_results: bool,
    /// Number of alternatives per segment.
    pub max_alternatives: u32,
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self::for_language(DEFAULT_LANGUAGE)
    }
}

impl RecognitionSettings {
    /// Continuous, interim-enabled, single-alternative settings for `language`.
    #[must_use]
    pub fn for_language(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            continuous: true,
            interim_results: true,
            max_alternatives: 1,
        }
    }
}

/// One candidate transcription of a segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechAlternative {
    /// The recognized text.
    pub transcript: String,
    /// Recognizer confidence in `[0, 1]`, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

/// A recognized stretch of speech.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechSegment {
    /// Candidate transcriptions, best first.
    pub alternatives: Vec<SpeechAlternative>,
    /// Whether the recognizer will no longer revise this segment.
    #[serde(default)]
    pub is_final: bool,
}

impl SpeechSegment {
    /// A segment with a single alternative.
    #[must_use]
    pub fn new(transcript: impl Into<String>, is_final: bool) -> Self {
        Self {
            alternatives: vec![SpeechAlternative {
                transcript: transcript.into(),
                confidence: None,
            }],
            is_final,
        }
    }

    /// The best alternative's text.
    #[must_use]
    pub fn best(&self) -> Option<&str> {
        self.alternatives.first().map(|alt| alt.transcript.as_str())
    }
}

/// Something a recognition session reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecognitionEvent {
    /// Every segment recognized so far in the session, interim and final.
    Result {
        /// Segments in spoken order.
        results: Vec<SpeechSegment>,
    },
    /// The recognizer reported a problem.
    Error {
        /// Short error code.
        error: String,
        /// Optional human-readable detail.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// The session finished on its own.
    Ended,
}

/// Join the best alternative of every segment into one transcript.
#[must_use]
pub fn transcript(results: &[SpeechSegment]) -> String {
    results.iter().filter_map(SpeechSegment::best).collect()
}

/// Sending half of a session's event channel.
pub type EventSender = mpsc::UnboundedSender<RecognitionEvent>;

/// A platform capability that can transcribe speech.
pub trait SpeechRecognizer: Send + Sync + fmt::Debug {
    /// The name of this recognizer (for logging/debugging).
    fn name(&self) -> &'static str;

    /// Whether the capability is present on this system.
    fn is_available(&self) -> bool;

    /// Start a session that reports through `events`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be started.
    fn start(
        &self,
        settings: &RecognitionSettings,
        events: EventSender,
    ) -> Result<Box<dyn RecognitionSession>>;
}

/// Handle to a running recognition session.
pub trait RecognitionSession: Send + fmt::Debug {
    /// Halt the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session does not stop cleanly.
    fn stop(&mut self) -> Result<()>;
}

#[derive(Debug)]
struct ActiveSession {
    session: Box<dyn RecognitionSession>,
    /// `None` once every sender is gone.
    events: Option<mpsc::UnboundedReceiver<RecognitionEvent>>,
}

/// Exclusive owner of the active recognition session.
#[derive(Debug)]
pub struct Dictation {
    recognizer: Option<Arc<dyn SpeechRecognizer>>,
    settings: RecognitionSettings,
    active: Option<ActiveSession>,
}

impl Dictation {
    /// Create an owner that starts sessions on `recognizer`.
    #[must_use]
    pub fn new(recognizer: Option<Arc<dyn SpeechRecognizer>>, settings: RecognitionSettings) -> Self {
        Self {
            recognizer,
            settings,
            active: None,
        }
    }

    /// An owner without any speech capability.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::new(None, RecognitionSettings::default())
    }

    /// The settings every session is started with.
    #[must_use]
    pub fn settings(&self) -> &RecognitionSettings {
        &self.settings
    }

    /// Name of the configured recognizer.
    #[must_use]
    pub fn recognizer_name(&self) -> Option<&'static str> {
        self.recognizer.as_ref().map(|r| r.name())
    }

    /// Whether a session could be started.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.recognizer.as_ref().is_some_and(|r| r.is_available())
    }

    /// Whether a session is running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Start a session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionActive`] if a session is already running (the
    /// running one is left untouched), [`Error::SpeechUnavailable`] if there
    /// is no usable recognizer, or the recognizer's start error.
    pub fn start(&mut self) -> Result<()> {
        if self.active.is_some() {
            warn!("Refusing to start a second recognition session");
            return Err(Error::SessionActive);
        }

        let recognizer = self
            .recognizer
            .as_ref()
            .filter(|r| r.is_available())
            .ok_or(Error::SpeechUnavailable)?;

        let (tx, rx) = mpsc::unbounded_channel();
        let session = recognizer.start(&self.settings, tx)?;
        info!(
            recognizer = recognizer.name(),
            language = %self.settings.language,
            "Recognition session started"
        );

        self.active = Some(ActiveSession {
            session,
            events: Some(rx),
        });
        Ok(())
    }

    /// Stop and release the active session.
    ///
    /// Returns `false` if no session was running. The session is released
    /// even when stopping it fails.
    ///
    /// # Errors
    ///
    /// Returns the session's stop error.
    pub fn stop(&mut self) -> Result<bool> {
        let Some(mut active) = self.active.take() else {
            return Ok(false);
        };

        let result = active.session.stop();
        info!("Recognition session stopped");
        result.map(|()| true)
    }

    /// Take the next queued event without waiting.
    pub fn try_next_event(&mut self) -> Option<RecognitionEvent> {
        let active = self.active.as_mut()?;
        let events = active.events.as_mut()?;

        match events.try_recv() {
            Ok(event) => Some(event),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                debug!("Recognition event channel closed");
                active.events = None;
                None
            }
        }
    }

    /// Wait for the next event of the active session.
    ///
    /// Never resolves while no session is running or after the session's
    /// channel has closed, so it can sit in a `select!` next to other input.
    pub async fn next_event(&mut self) -> Option<RecognitionEvent> {
        let Some(events) = self.active.as_mut().and_then(|a| a.events.as_mut()) else {
            return std::future::pending().await;
        };

        let event = events.recv().await;
        if event.is_none() {
            debug!("Recognition event channel closed");
            if let Some(active) = self.active.as_mut() {
                active.events = None;
            }
        }
        event
    }
}

impl Drop for Dictation {
    fn drop(&mut self) {
        if let Err(err) = self.stop() {
            warn!("Failed to stop recognition session: {err}");
        }
    }
}

/// In-process recognizer doubles for tests.
#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::{
        Arc, Error, EventSender, RecognitionEvent, RecognitionSession, RecognitionSettings,
        Result, SpeechRecognizer,
    };

    /// Recognizer whose events are pushed by the test.
    #[derive(Debug, Default)]
    pub(crate) struct ScriptedRecognizer {
        available: bool,
        fail_start: bool,
        sender: Arc<Mutex<Option<EventSender>>>,
        starts: AtomicUsize,
        stops: Arc<AtomicUsize>,
        last_settings: Mutex<Option<RecognitionSettings>>,
    }

    impl ScriptedRecognizer {
        pub(crate) fn new() -> Arc<Self> {
            Arc::new(Self {
                available: true,
                ..Self::default()
            })
        }

        pub(crate) fn unavailable() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub(crate) fn failing() -> Arc<Self> {
            Arc::new(Self {
                available: true,
                fail_start: true,
                ..Self::default()
            })
        }

        /// Deliver an event to the running session.
        pub(crate) fn emit(&self, event: RecognitionEvent) -> bool {
            self.sender
                .lock()
                .unwrap()
                .as_ref()
                .is_some_and(|tx| tx.send(event).is_ok())
        }

        pub(crate) fn starts(&self) -> usize {
            self.starts.load(Ordering::SeqCst)
        }

        pub(crate) fn stops(&self) -> usize {
            self.stops.load(Ordering::SeqCst)
        }

        pub(crate) fn last_settings(&self) -> Option<RecognitionSettings> {
            self.last_settings.lock().unwrap().clone()
        }
    }

    impl SpeechRecognizer for ScriptedRecognizer {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn is_available(&self) -> bool {
            self.available
        }

        fn start(
            &self,
            settings: &RecognitionSettings,
            events: EventSender,
        ) -> Result<Box<dyn RecognitionSession>> {
            if self.fail_start {
                return Err(Error::speech_start("scripted", "microphone busy"));
            }
            self.starts.fetch_add(1, Ordering::SeqCst);
            *self.last_settings.lock().unwrap() = Some(settings.clone());
            *self.sender.lock().unwrap() = Some(events);
            Ok(Box::new(ScriptedSession {
                sender: Arc::clone(&self.sender),
                stops: Arc::clone(&self.stops),
            }))
        }
    }

    #[derive(Debug)]
    struct ScriptedSession {
        sender: Arc<Mutex<Option<EventSender>>>,
        stops: Arc<AtomicUsize>,
    }

    impl RecognitionSession for ScriptedSession {
        fn stop(&mut self) -> Result<()> {
            self.stops.fetch_add(1, Ordering::SeqCst);
            self.sender.lock().unwrap().take();
            Ok(())
        }
    }
}
