//! The note record.
//!
//! A note is write-once: its id, creation time and content are fixed when it
//! is created and never change afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single persisted note.
///
/// Serializes to `{"id": ..., "createdAt": ..., "content": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Opaque unique identifier, used as the deletion key.
    pub id: String,

    /// When the note was created.
    #[serde(alias = "date")]
    pub created_at: DateTime<Utc>,

    /// The note body.
    pub content: String,
}

impl Note {
    /// Create a new note with a fresh id, stamped with the current time.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            content: content.into(),
        }
    }

    /// Case-insensitive substring match against the content.
    ///
    /// `needle` must already be lower-cased.
    #[must_use]
    pub fn matches(&self, needle: &str) -> bool {
        self.content.to_lowercase().contains(needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_new() {
        let note = Note::new("Buy milk");
        assert_eq!(note.content, "Buy milk");
        assert!(Uuid::parse_str(&note.id).is_ok());
        assert!(note.created_at <= Utc::now());
    }

    #[test]
    fn test_note_ids_are_unique() {
        let a = Note::new("same");
        let b = Note::new("same");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_note_matches_is_case_insensitive() {
        let note = Note::new("Buy Milk tomorrow");
        assert!(note.matches("milk"));
        assert!(note.matches("buy milk"));
        assert!(!note.matches("call"));
    }

    #[test]
    fn test_note_wire_shape() {
        let note = Note::new("hello");
        let json = serde_json::to_value(&note).unwrap();
        assert!(json.get("id").is_some());
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["content"], "hello");
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn test_note_accepts_legacy_date_field() {
        let json = r#"{"id":"abc","date":"2024-01-31T12:00:00.000Z","content":"old note"}"#;
        let note: Note = serde_json::from_str(json).unwrap();
        assert_eq!(note.id, "abc");
        assert_eq!(note.content, "old note");
        assert_eq!(note.created_at.to_rfc3339(), "2024-01-31T12:00:00+00:00");
    }
}
