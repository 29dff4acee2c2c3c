//! Line-oriented front end for the note dialog.
//!
//! Each input line is either a command or text for the pending note.
//! Recognition events are applied as they arrive, between lines.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::dialog::{DialogState, NoteDialog};
use crate::error::{Error, Result};
use crate::speech::RecognitionEvent;
use crate::store::NoteStore;

const HELP: &str = "\
Commands:
  text     write a note
  audio    dictate a note
  :save    save the pending note
  :stop    stop dictating and keep editing as text
  :clear   discard the pending text
  :show    print the pending text
  :help    show this help
  :close   close the dialog
Any other line is added to the pending note.";

/// How the dialog starts out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartMode {
    /// Let the user pick text or audio.
    #[default]
    Choose,
    /// Go straight to text entry.
    Text,
    /// Go straight to dictation.
    Audio,
}

/// Run `dialog` against `input` until EOF or `:close`.
///
/// Saved notes are created in `store`. Prompts and transcripts are written
/// to `out`. Returns the number of notes created. The dialog is closed on
/// return.
///
/// # Errors
///
/// Returns an error if reading input, writing output, or persisting a note
/// fails. Commands that do not apply in the current state are reported to
/// `out` instead.
pub async fn run_dialog<R, W>(
    dialog: &mut NoteDialog,
    store: &mut NoteStore,
    input: R,
    out: &mut W,
    start: StartMode,
) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    dialog.open();
    let started = match start {
        StartMode::Choose => Ok(()),
        StartMode::Text => dialog.start_text_note(),
        StartMode::Audio => dialog.start_audio_note(),
    };
    report(out, started)?;
    prompt(dialog, out)?;

    let mut lines = input.lines();
    let mut created = 0;

    // Unbiased so a chatty transcriber cannot hold off `:stop` or `:save`.
    loop {
        tokio::select! {
            Some(event) = dialog.next_recognition_event() => {
                let is_result = matches!(event, RecognitionEvent::Result { .. });
                dialog.handle_recognition(event);
                if is_result && matches!(dialog.state(), DialogState::Recording { .. }) {
                    writeln!(out, "~ {}", dialog.content())?;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("Input closed");
                    break;
                };
                match handle_line(dialog, store, out, line.trim_end())? {
                    Flow::Continue => {}
                    Flow::Created => created += 1,
                    Flow::Close => break,
                }
            }
        }
    }

    dialog.close();
    Ok(created)
}

enum Flow {
    Continue,
    Created,
    Close,
}

fn handle_line<W: Write>(
    dialog: &mut NoteDialog,
    store: &mut NoteStore,
    out: &mut W,
    line: &str,
) -> Result<Flow> {
    match line {
        "text" if is_onboarding(dialog) => {
            report(out, dialog.start_text_note())?;
            prompt(dialog, out)?;
        }
        "audio" if is_onboarding(dialog) => {
            report(out, dialog.start_audio_note())?;
            prompt(dialog, out)?;
        }
        ":save" => {
            let saved = dialog.confirm(|content| store.create(content).map(|_| ()));
            if let Some(true) = report(out, saved)? {
                if let Some(note) = store.notes().first() {
                    writeln!(out, "saved {}", note.id)?;
                }
                prompt(dialog, out)?;
                return Ok(Flow::Created);
            }
        }
        ":stop" => {
            report(out, dialog.stop_recording())?;
            prompt(dialog, out)?;
        }
        ":clear" => {
            report(out, dialog.edit(String::new()))?;
            prompt(dialog, out)?;
        }
        ":show" => {
            writeln!(out, "[{}]", dialog.state().name())?;
            if !dialog.content().is_empty() {
                writeln!(out, "{}", dialog.content())?;
            }
        }
        ":help" => writeln!(out, "{HELP}")?,
        ":close" => return Ok(Flow::Close),
        text => {
            let content = if dialog.content().is_empty() {
                text.to_string()
            } else {
                format!("{}\n{text}", dialog.content())
            };
            report(out, dialog.edit(content))?;
        }
    }
    Ok(Flow::Continue)
}

fn is_onboarding(dialog: &NoteDialog) -> bool {
    matches!(dialog.state(), DialogState::Onboarding)
}

/// Write rejected transitions to `out`; propagate everything else.
fn report<T, W: Write>(out: &mut W, result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err @ (Error::DialogTransition { .. } | Error::SessionActive)) => {
            writeln!(out, "! {err}")?;
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

fn prompt<W: Write>(dialog: &NoteDialog, out: &mut W) -> Result<()> {
    match dialog.state() {
        DialogState::Onboarding => writeln!(out, "Start by typing `text` or dictate with `audio`.")?,
        DialogState::TextEntry { .. } => writeln!(out, "Type your note, then `:save`.")?,
        DialogState::Recording { .. } => {
            writeln!(out, "Recording... `:stop` to edit, `:save` to keep it.")?;
        }
        DialogState::Closed => {}
    }
    Ok(())
}
