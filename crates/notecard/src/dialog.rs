//! The note creation dialog.
//!
//! The dialog is a small state machine. Pending content lives inside the
//! state that owns it, so a closed or onboarding dialog cannot hold text and
//! a recording dialog always has a session behind it.
//!
//! ```text
//! Closed --open--> Onboarding --text--> TextEntry
//!                      |                  ^
//!                      +--audio--> Recording --stop--+
//! ```
//!
//! Confirming a non-empty note hands it to the creation callback and returns
//! to `Onboarding`; the dialog stays open until it is closed.

use std::sync::Arc;

use tracing::{debug, error, info, trace, warn};

use crate::error::{Error, Result};
use crate::notify::Notifier;
use crate::speech::{self, Dictation, RecognitionEvent};

/// Notice shown when confirming without content.
pub const EMPTY_NOTE_NOTICE: &str = "Please type a note to be saved";

/// Notice shown after a note is created.
pub const NOTE_CREATED_NOTICE: &str = "Note successfully created!";

/// Notice shown when no speech capability can be used.
pub const SPEECH_UNSUPPORTED_NOTICE: &str = "Your device does not support speech recognition. :(";

/// Where the dialog is in its open/close cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DialogState {
    /// Not shown.
    #[default]
    Closed,
    /// Offering a choice between an audio note and a text note.
    Onboarding,
    /// Free-form text editing.
    TextEntry {
        /// The pending note text.
        content: String,
    },
    /// Dictating; `content` is the transcript so far.
    Recording {
        /// The pending note text.
        content: String,
    },
}

impl DialogState {
    /// Short name used in messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Onboarding => "choosing a note type",
            Self::TextEntry { .. } => "editing text",
            Self::Recording { .. } => "recording",
        }
    }

    /// The pending content; empty when there is none.
    #[must_use]
    pub fn content(&self) -> &str {
        match self {
            Self::TextEntry { content } | Self::Recording { content } => content,
            Self::Closed | Self::Onboarding => "",
        }
    }

    /// Whether the dialog is shown.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }
}

/// Modal that captures a new note by typing or by dictation.
#[derive(Debug)]
pub struct NoteDialog {
    state: DialogState,
    dictation: Dictation,
    notifier: Arc<dyn Notifier>,
}

impl NoteDialog {
    /// Create a closed dialog.
    #[must_use]
    pub fn new(dictation: Dictation, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            state: DialogState::Closed,
            dictation,
            notifier,
        }
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> &DialogState {
        &self.state
    }

    /// The pending content.
    #[must_use]
    pub fn content(&self) -> &str {
        self.state.content()
    }

    /// Whether the dialog is shown.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    /// The speech session owner.
    #[must_use]
    pub fn dictation(&self) -> &Dictation {
        &self.dictation
    }

    /// Show the dialog, starting at the note type choice.
    pub fn open(&mut self) {
        if self.state == DialogState::Closed {
            debug!("Dialog opened");
            self.state = DialogState::Onboarding;
        }
    }

    /// Hide the dialog, discarding any pending content.
    pub fn close(&mut self) {
        self.halt_dictation();
        if !self.content().is_empty() {
            debug!(
                chars = self.content().chars().count(),
                "Discarding unsaved note"
            );
        }
        self.state = DialogState::Closed;
        debug!("Dialog closed");
    }

    /// Switch from the note type choice to text editing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DialogTransition`] outside of onboarding.
    pub fn start_text_note(&mut self) -> Result<()> {
        if self.state != DialogState::Onboarding {
            return Err(Error::dialog_transition(
                "start a text note",
                self.state.name(),
            ));
        }
        self.state = DialogState::TextEntry {
            content: String::new(),
        };
        Ok(())
    }

    /// Switch from the note type choice to dictation.
    ///
    /// Without a usable speech capability a notice is shown and the dialog
    /// stays in onboarding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DialogTransition`] outside of onboarding, or
    /// [`Error::SessionActive`] if a session is somehow still running.
    pub fn start_audio_note(&mut self) -> Result<()> {
        if self.state != DialogState::Onboarding {
            return Err(Error::dialog_transition(
                "start an audio note",
                self.state.name(),
            ));
        }

        if !self.dictation.is_available() {
            info!("Speech recognition is not available");
            self.notifier.info(SPEECH_UNSUPPORTED_NOTICE);
            return Ok(());
        }

        match self.dictation.start() {
            Ok(()) => {
                self.state = DialogState::Recording {
                    content: String::new(),
                };
                Ok(())
            }
            Err(Error::SessionActive) => Err(Error::SessionActive),
            Err(err) => {
                warn!("Could not start speech recognition: {err}");
                self.notifier.info(SPEECH_UNSUPPORTED_NOTICE);
                Ok(())
            }
        }
    }

    /// Replace the pending content.
    ///
    /// Erasing everything while typing returns to onboarding. While
    /// recording the next transcript update replaces the edit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DialogTransition`] unless typing or recording.
    pub fn edit(&mut self, text: impl Into<String>) -> Result<()> {
        let text = text.into();
        match &mut self.state {
            DialogState::TextEntry { content } | DialogState::Recording { content } => {
                *content = text;
            }
            DialogState::Closed | DialogState::Onboarding => {
                return Err(Error::dialog_transition("edit the note", self.state.name()));
            }
        }

        if matches!(&self.state, DialogState::TextEntry { content } if content.is_empty()) {
            self.state = DialogState::Onboarding;
        }
        Ok(())
    }

    /// Apply one event from the recognition session.
    pub fn handle_recognition(&mut self, event: RecognitionEvent) {
        match event {
            RecognitionEvent::Result { results } => {
                if let DialogState::Recording { content } = &mut self.state {
                    *content = speech::transcript(&results);
                    trace!(transcript = %content, "Transcript updated");
                } else {
                    debug!("Ignoring transcript outside of recording");
                }
            }
            RecognitionEvent::Error { error, message } => {
                error!(error = %error, message = ?message, "Speech recognition error");
            }
            RecognitionEvent::Ended => {
                info!("Speech recognition session ended");
            }
        }
    }

    /// Apply every queued recognition event. Returns how many were applied.
    pub fn pump_recognition(&mut self) -> usize {
        let mut applied = 0;
        while let Some(event) = self.dictation.try_next_event() {
            self.handle_recognition(event);
            applied += 1;
        }
        applied
    }

    /// Wait for the next recognition event.
    ///
    /// Never resolves while no session is running.
    pub async fn next_recognition_event(&mut self) -> Option<RecognitionEvent> {
        self.dictation.next_event().await
    }

    /// Stop dictating and continue editing the transcript as text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DialogTransition`] unless recording.
    pub fn stop_recording(&mut self) -> Result<()> {
        if !matches!(self.state, DialogState::Recording { .. }) {
            return Err(Error::dialog_transition(
                "stop recording",
                self.state.name(),
            ));
        }

        self.pump_recognition();
        self.halt_dictation();

        if let DialogState::Recording { content } = std::mem::take(&mut self.state) {
            self.state = DialogState::TextEntry { content };
        }
        Ok(())
    }

    /// Save the pending content through `on_create`.
    ///
    /// Empty content shows a notice and leaves everything as it is. Otherwise
    /// `on_create` is called once with the full content, dictation stops, and
    /// the dialog returns to onboarding. Returns whether a note was created.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DialogTransition`] when closed. An error from
    /// `on_create` is returned unchanged and the dialog keeps its state.
    pub fn confirm<F>(&mut self, on_create: F) -> Result<bool>
    where
        F: FnOnce(String) -> Result<()>,
    {
        if !self.state.is_open() {
            return Err(Error::dialog_transition("save a note", self.state.name()));
        }

        if matches!(self.state, DialogState::Recording { .. }) {
            self.pump_recognition();
        }

        if self.content().is_empty() {
            self.notifier.info(EMPTY_NOTE_NOTICE);
            return Ok(false);
        }

        on_create(self.content().to_string())?;

        self.halt_dictation();
        self.state = DialogState::Onboarding;
        self.notifier.success(NOTE_CREATED_NOTICE);
        Ok(true)
    }

    fn halt_dictation(&mut self) {
        if let Err(err) = self.dictation.stop() {
            warn!("Failed to stop recognition session: {err}");
        }
    }
}
