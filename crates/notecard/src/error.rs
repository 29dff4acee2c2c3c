//! Error types for notecard.
//!
//! This module defines all error types used throughout the notecard crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for notecard operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// The persisted slot holds data that is not a valid note list.
    #[error("slot '{key}' holds malformed note data: {source}")]
    CorruptSlot {
        /// Key of the slot.
        key: String,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Speech Errors ===
    /// No speech recognition capability is available.
    #[error("speech recognition is not available")]
    SpeechUnavailable,

    /// A recognition session is already running.
    #[error("a speech recognition session is already active")]
    SessionActive,

    /// A recognizer failed to start a session.
    #[error("failed to start recognizer '{name}': {message}")]
    SpeechStart {
        /// Name of the recognizer.
        name: &'static str,
        /// Description of what went wrong.
        message: String,
    },

    /// A recognizer failed to stop a session.
    #[error("failed to stop recognizer '{name}': {message}")]
    SpeechStop {
        /// Name of the recognizer.
        name: &'static str,
        /// Description of what went wrong.
        message: String,
    },

    // === Dialog Errors ===
    /// The requested action is not valid in the dialog's current state.
    #[error("cannot {action} while the dialog is {state}")]
    DialogTransition {
        /// The attempted action.
        action: &'static str,
        /// Name of the current dialog state.
        state: &'static str,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for notecard operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a recognizer start error.
    #[must_use]
    pub fn speech_start(name: &'static str, message: impl Into<String>) -> Self {
        Self::SpeechStart {
            name,
            message: message.into(),
        }
    }

    /// Create a recognizer stop error.
    #[must_use]
    pub fn speech_stop(name: &'static str, message: impl Into<String>) -> Self {
        Self::SpeechStop {
            name,
            message: message.into(),
        }
    }

    /// Create a dialog transition error.
    #[must_use]
    pub fn dialog_transition(action: &'static str, state: &'static str) -> Self {
        Self::DialogTransition { action, state }
    }

    /// Check if this error means the persisted slot could not be parsed.
    #[must_use]
    pub fn is_corrupt_slot(&self) -> bool {
        matches!(self, Self::CorruptSlot { .. })
    }
}
