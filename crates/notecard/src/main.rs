//! `notecard` - CLI for keeping short notes
//!
//! Lists, adds and deletes notes, and runs the note dialog on the terminal
//! for typed or dictated notes.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tokio::io::BufReader;
use tracing::info;

use notecard::cli::{
    AddCommand, Cli, Command, ConfigCommand, DeleteCommand, ListCommand, OutputFormat,
};
use notecard::shell::{run_dialog, StartMode};
use notecard::speech::command::CommandRecognizer;
use notecard::view::Grid;
use notecard::{
    init_logging, Config, ConsoleNotifier, Dictation, NoteDialog, NoteStore, SpeechRecognizer,
    Storage,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    match cli.command {
        Command::List(cmd) => handle_list(&config, &cmd),
        Command::Add(cmd) => handle_add(&config, &cmd),
        Command::Delete(cmd) => handle_delete(&config, &cmd),
        Command::New => handle_dialog(&config, StartMode::Choose).await,
        Command::Dictate => handle_dialog(&config, StartMode::Audio).await,
        Command::Status(cmd) => handle_status(&config, cmd.json),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn open_store(config: &Config) -> anyhow::Result<NoteStore> {
    let path = config.database_path();
    let storage = Storage::open(&path)
        .with_context(|| format!("failed to open database at {}", path.display()))?;
    let store = NoteStore::load(storage, config.storage.slot_key.clone())
        .with_context(|| format!("failed to load notes from slot {:?}", config.storage.slot_key))?;
    Ok(store)
}

fn build_dictation(config: &Config) -> Dictation {
    let recognizer = config.speech.command.as_ref().map(|program| {
        Arc::new(CommandRecognizer::new(program.clone(), config.speech.args.clone()))
            as Arc<dyn SpeechRecognizer>
    });
    Dictation::new(recognizer, config.recognition_settings())
}

fn handle_list(config: &Config, cmd: &ListCommand) -> anyhow::Result<()> {
    let mut store = open_store(config)?;
    if let Some(query) = &cmd.search {
        store.search(query.clone());
    }

    let grid = Grid::build(&store);
    let options = config.render_options();
    match cmd.format {
        OutputFormat::Plain => print!("{}", grid.render_plain(Utc::now(), options)),
        OutputFormat::Table => print!("{}", grid.render_table(Utc::now(), options)),
        OutputFormat::Json => println!("{}", grid.render_json()?),
    }
    Ok(())
}

fn handle_add(config: &Config, cmd: &AddCommand) -> anyhow::Result<()> {
    let mut store = open_store(config)?;
    let mut dialog = NoteDialog::new(Dictation::unavailable(), Arc::new(ConsoleNotifier));

    dialog.open();
    dialog.start_text_note()?;
    dialog.edit(cmd.content())?;

    let mut created_id = None;
    let saved = dialog.confirm(|content| {
        let note = store.create(content)?;
        created_id = Some(note.id.clone());
        Ok(())
    })?;
    dialog.close();

    if !saved {
        anyhow::bail!("nothing to save");
    }
    if let Some(id) = created_id {
        println!("{id}");
    }
    Ok(())
}

fn handle_delete(config: &Config, cmd: &DeleteCommand) -> anyhow::Result<()> {
    let mut store = open_store(config)?;
    if store.delete(&cmd.id)? {
        println!("Deleted {}", cmd.id);
    } else {
        println!("No note with id {}", cmd.id);
    }
    Ok(())
}

async fn handle_dialog(config: &Config, start: StartMode) -> anyhow::Result<()> {
    let mut store = open_store(config)?;
    let mut dialog = NoteDialog::new(build_dictation(config), Arc::new(ConsoleNotifier));

    let input = BufReader::new(tokio::io::stdin());
    let mut out = std::io::stdout();
    let created = run_dialog(&mut dialog, &mut store, input, &mut out, start).await?;

    info!(created, "Dialog finished");
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let stats = store.storage().stats()?;
    let dictation = build_dictation(config);

    if json {
        let status = serde_json::json!({
            "database_path": config.database_path(),
            "database_size_bytes": stats.db_size_bytes,
            "slot_key": store.slot_key(),
            "slots": stats.slot_count,
            "notes": store.len(),
            "last_write": stats.last_write,
            "speech": {
                "recognizer": dictation.recognizer_name(),
                "available": dictation.is_available(),
                "language": dictation.settings().language.as_str(),
            },
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("notecard status");
        println!("---------------");
        println!("Database:      {}", config.database_path().display());
        println!("Size:          {} bytes", stats.db_size_bytes);
        println!("Slot:          {}", store.slot_key());
        println!("Slots stored:  {}", stats.slot_count);
        println!("Notes:         {}", store.len());
        match stats.last_write {
            Some(at) => println!("Last write:    {}", at.to_rfc3339()),
            None => println!("Last write:    never"),
        }
        println!(
            "Speech:        {} ({})",
            if dictation.is_available() {
                "available"
            } else {
                "unavailable"
            },
            dictation.settings().language
        );
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!("  Slot key:           {}", config.storage.slot_key);
                println!();
                println!("[Speech]");
                println!("  Language:           {}", config.speech.language);
                match &config.speech.command {
                    Some(command) => {
                        println!("  Command:            {}", command.display());
                        println!("  Arguments:          {}", config.speech.args.join(" "));
                    }
                    None => println!("  Command:            (none, dictation disabled)"),
                }
                println!();
                println!("[Display]");
                println!("  Preview chars:      {}", config.display.preview_chars);
                println!("  Relative dates:     {}", config.display.relative_dates);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::load_from(Some(path)).context("configuration is invalid")?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}
