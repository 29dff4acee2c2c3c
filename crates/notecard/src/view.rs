//! Card grid rendering.
//!
//! The grid always starts with the "add note" entry point, followed by one
//! card per note that matches the store's current search.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::note::Note;
use crate::store::NoteStore;

/// Title of the creation entry point.
pub const NEW_NOTE_TITLE: &str = "Add note";

/// Description of the creation entry point.
pub const NEW_NOTE_HINT: &str =
    "Record a note in audio which will be converted to text automatically.";

/// One cell of the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Cell {
    /// Opens the creation dialog.
    NewNote,
    /// A stored note.
    Card(Note),
}

impl Cell {
    /// The key that identifies this cell among its siblings.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::NewNote => "new-note",
            Self::Card(note) => &note.id,
        }
    }
}

/// How cards are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Maximum characters of content in one-line previews.
    pub preview_chars: usize,
    /// Show "5 minutes ago" instead of absolute timestamps.
    pub relative_dates: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            preview_chars: 80,
            relative_dates: true,
        }
    }
}

/// The rendered view of a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<Cell>,
}

impl Grid {
    /// Build the grid for the store's current search.
    #[must_use]
    pub fn build(store: &NoteStore) -> Self {
        let filtered = store.filtered_notes();
        let mut cells = Vec::with_capacity(filtered.len() + 1);
        cells.push(Cell::NewNote);
        cells.extend(filtered.iter().cloned().map(Cell::Card));
        Self { cells }
    }

    /// All cells, entry point first.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// The note cards.
    pub fn cards(&self) -> impl Iterator<Item = &Note> {
        self.cells.iter().filter_map(|cell| match cell {
            Cell::Card(note) => Some(note),
            Cell::NewNote => None,
        })
    }

    /// Render as indented blocks, one per cell.
    #[must_use]
    pub fn render_plain(&self, now: DateTime<Utc>, options: RenderOptions) -> String {
        let mut out = String::new();
        for (i, cell) in self.cells.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            match cell {
                Cell::NewNote => {
                    let _ = writeln!(out, "[+] {NEW_NOTE_TITLE}");
                    let _ = writeln!(out, "    {NEW_NOTE_HINT}");
                }
                Cell::Card(note) => {
                    let _ = writeln!(out, "[{}] {}", note.id, date_label(note, now, options));
                    for line in note.content.lines() {
                        let _ = writeln!(out, "    {line}");
                    }
                }
            }
        }
        out
    }

    /// Render as an aligned table with one-line previews.
    #[must_use]
    pub fn render_table(&self, now: DateTime<Utc>, options: RenderOptions) -> String {
        let rows: Vec<(String, String, String)> = self
            .cells
            .iter()
            .map(|cell| match cell {
                Cell::NewNote => (
                    "+".to_string(),
                    String::new(),
                    NEW_NOTE_TITLE.to_string(),
                ),
                Cell::Card(note) => (
                    note.id.clone(),
                    date_label(note, now, options),
                    preview(&note.content, options.preview_chars),
                ),
            })
            .collect();

        let id_width = rows
            .iter()
            .map(|(id, _, _)| id.chars().count())
            .chain(std::iter::once("ID".len()))
            .max()
            .unwrap_or(2);
        let date_width = rows
            .iter()
            .map(|(_, date, _)| date.chars().count())
            .chain(std::iter::once("CREATED".len()))
            .max()
            .unwrap_or(7);

        let mut out = String::new();
        let _ = writeln!(out, "{:<id_width$}  {:<date_width$}  CONTENT", "ID", "CREATED");
        for (id, date, content) in rows {
            let _ = writeln!(out, "{id:<id_width$}  {date:<date_width$}  {content}");
        }
        out
    }

    /// Render as a JSON array of cells.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.cells)?)
    }
}

fn date_label(note: &Note, now: DateTime<Utc>, options: RenderOptions) -> String {
    if options.relative_dates {
        relative_label(note.created_at, now)
    } else {
        note.created_at.format("%Y-%m-%d %H:%M").to_string()
    }
}

/// Describe how long ago `then` was, e.g. "5 minutes ago".
#[must_use]
pub fn relative_label(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds();
    if secs < 45 {
        return "just now".to_string();
    }
    if secs < 90 {
        return "a minute ago".to_string();
    }

    let minutes = secs / 60;
    if minutes < 45 {
        return format!("{minutes} minutes ago");
    }
    if minutes < 90 {
        return "about an hour ago".to_string();
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours} hours ago");
    }
    if hours < 48 {
        return "a day ago".to_string();
    }

    let days = hours / 24;
    if days < 30 {
        return format!("{days} days ago");
    }
    if days < 60 {
        return "a month ago".to_string();
    }
    if days < 365 {
        return format!("{} months ago", days / 30);
    }

    match days / 365 {
        1 => "a year ago".to_string(),
        years => format!("{years} years ago"),
    }
}

/// Flatten `content` to one line of at most `max_chars` characters.
#[must_use]
pub fn preview(content: &str, max_chars: usize) -> String {
    let flat = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let mut cut: String = flat.chars().take(max_chars.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
