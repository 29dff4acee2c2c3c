//! The note store.
//!
//! [`NoteStore`] owns the canonical list of notes and is the only place that
//! mutates it. Every mutation rewrites the whole list into a single storage
//! slot before the in-memory list is replaced, so what is in memory never
//! runs ahead of what is persisted.

use std::borrow::Cow;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::note::Note;
use crate::storage::Storage;

/// Default key of the slot that holds the note list.
pub const DEFAULT_SLOT_KEY: &str = "notes";

/// The canonical note list plus the live search string.
#[derive(Debug)]
pub struct NoteStore {
    storage: Storage,
    slot_key: String,
    /// Newest first.
    notes: Vec<Note>,
    search: String,
}

impl NoteStore {
    /// Load the note list from the slot named `slot_key`.
    ///
    /// A missing slot yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptSlot`] if the slot exists but does not hold a
    /// valid note list, or a storage error if the read fails.
    pub fn load(storage: Storage, slot_key: impl Into<String>) -> Result<Self> {
        let slot_key = slot_key.into();

        let notes = match storage.get_item(&slot_key)? {
            Some(raw) => {
                serde_json::from_str::<Vec<Note>>(&raw).map_err(|source| Error::CorruptSlot {
                    key: slot_key.clone(),
                    source,
                })?
            }
            None => Vec::new(),
        };

        info!(count = notes.len(), slot = %slot_key, "Loaded notes");
        Ok(Self {
            storage,
            slot_key,
            notes,
            search: String::new(),
        })
    }

    /// The key of the backing slot.
    #[must_use]
    pub fn slot_key(&self) -> &str {
        &self.slot_key
    }

    /// The backing storage.
    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// All notes, newest first.
    #[must_use]
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Number of stored notes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Whether the store holds no notes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Look up a note by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    /// The current search string.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.search
    }

    /// Replace the live search string.
    pub fn search(&mut self, query: impl Into<String>) {
        self.search = query.into();
        debug!(query = %self.search, "Search updated");
    }

    /// Notes matching the current search, in list order.
    ///
    /// With an empty search string the full list is returned borrowed,
    /// without running the filter.
    #[must_use]
    pub fn filtered_notes(&self) -> Cow<'_, [Note]> {
        if self.search.is_empty() {
            return Cow::Borrowed(&self.notes);
        }

        let needle = self.search.to_lowercase();
        Cow::Owned(
            self.notes
                .iter()
                .filter(|note| note.matches(&needle))
                .cloned()
                .collect(),
        )
    }

    /// Create a note and put it at the head of the list.
    ///
    /// The content is not validated here; callers reject empty input.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated list cannot be written. The in-memory
    /// list is left untouched in that case.
    pub fn create(&mut self, content: impl Into<String>) -> Result<&Note> {
        let note = Note::new(content);

        let mut next = Vec::with_capacity(self.notes.len() + 1);
        next.push(note);
        next.extend_from_slice(&self.notes);

        self.persist(&next)?;
        self.notes = next;

        let created = &self.notes[0];
        info!(id = %created.id, "Created note");
        Ok(created)
    }

    /// Delete the note with the given id.
    ///
    /// Returns `false` if no note has that id. The slot is rewritten either
    /// way.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated list cannot be written.
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        let next: Vec<Note> = self
            .notes
            .iter()
            .filter(|note| note.id != id)
            .cloned()
            .collect();
        let removed = next.len() != self.notes.len();

        self.persist(&next)?;
        self.notes = next;

        if removed {
            info!(id, "Deleted note");
        } else {
            debug!(id, "No note to delete");
        }
        Ok(removed)
    }

    fn persist(&self, notes: &[Note]) -> Result<()> {
        let raw = serde_json::to_string(notes)?;
        self.storage.set_item(&self.slot_key, &raw)
    }
}
