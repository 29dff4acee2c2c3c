//! `notecard` - Short notes, typed or dictated
//!
//! Notes live in a single slot of a local SQLite key-value table and are
//! listed newest first. New notes go through a small dialog that accepts
//! typed text or a transcript from a speech recognizer.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod dialog;
pub mod error;
pub mod logging;
pub mod note;
pub mod notify;
pub mod shell;
pub mod speech;
pub mod storage;
pub mod store;
pub mod view;

pub use config::Config;
pub use dialog::{DialogState, NoteDialog};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use note::Note;
pub use notify::{ConsoleNotifier, Notifier, Severity};
pub use speech::{Dictation, RecognitionEvent, RecognitionSettings, SpeechRecognizer};
pub use storage::{Storage, StorageStats};
pub use store::NoteStore;
