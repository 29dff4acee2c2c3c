//! Configuration management for notecard.
//!
//! Settings are layered with figment: built-in defaults, then the TOML
//! config file, then `NOTECARD_` environment variables.

use std::path::PathBuf;
use std::sync::LazyLock;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::speech::{RecognitionSettings, DEFAULT_LANGUAGE};
use crate::store::DEFAULT_SLOT_KEY;
use crate::view::RenderOptions;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "notecard";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "notes.db";

/// Environment variable prefix. Nested keys are separated by `__`,
/// e.g. `NOTECARD_SPEECH__LANGUAGE`.
const ENV_PREFIX: &str = "NOTECARD_";

/// Shape of a BCP 47 style language tag such as `pt-BR`.
static LANGUAGE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z]{2,3}(-[A-Za-z0-9]{2,8})*$").expect("language tag pattern is valid")
});

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `NOTECARD_`)
/// 2. TOML config file at `~/.config/notecard/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Speech recognition configuration.
    pub speech: SpeechConfig,
    /// Display configuration.
    pub display: DisplayConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/notecard/notes.db`
    pub database_path: Option<PathBuf>,
    /// Key of the slot holding the note list.
    pub slot_key: String,
}

/// Speech-recognition configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Language tag passed to the recognizer.
    pub language: String,
    /// Transcriber program. Dictation is unavailable when unset.
    pub command: Option<PathBuf>,
    /// Extra arguments for the transcriber.
    pub args: Vec<String>,
}

/// Display-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Maximum characters shown per note in table output.
    pub preview_chars: usize,
    /// Show relative dates ("5 minutes ago") instead of timestamps.
    pub relative_dates: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            slot_key: DEFAULT_SLOT_KEY.to_string(),
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            command: None,
            args: Vec::new(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        let options = RenderOptions::default();
        Self {
            preview_chars: options.preview_chars,
            relative_dates: options.relative_dates,
        }
    }
}

impl Config {
    /// Load configuration with an optional custom config path.
    ///
    /// A missing config file is not an error; defaults apply.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing, or validation
    /// fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let config: Config = Self::figment(&config_file).extract()?;
        config.validate()?;
        Ok(config)
    }

    fn figment(config_file: &std::path::Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.storage.slot_key.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "storage.slot_key must not be empty".to_string(),
            });
        }

        if !LANGUAGE_TAG.is_match(&self.speech.language) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "speech.language is not a valid language tag: {}",
                    self.speech.language
                ),
            });
        }

        if self
            .speech
            .command
            .as_ref()
            .is_some_and(|command| command.as_os_str().is_empty())
        {
            return Err(Error::ConfigValidation {
                message: "speech.command must not be empty when set".to_string(),
            });
        }

        if self.display.preview_chars == 0 {
            return Err(Error::ConfigValidation {
                message: "display.preview_chars must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Settings for new dictation sessions.
    #[must_use]
    pub fn recognition_settings(&self) -> RecognitionSettings {
        RecognitionSettings::for_language(self.speech.language.clone())
    }

    /// Options for rendering the note grid.
    #[must_use]
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            preview_chars: self.display.preview_chars,
            relative_dates: self.display.relative_dates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.storage.database_path.is_none());
        assert_eq!(config.storage.slot_key, "notes");
        assert_eq!(config.speech.language, "pt-BR");
        assert!(config.speech.command.is_none());
        assert!(config.speech.args.is_empty());
        assert_eq!(config.display.preview_chars, 80);
        assert!(config.display.relative_dates);
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_slot_key() {
        let mut config = Config::default();
        config.storage.slot_key = "  ".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("slot_key"));
    }

    #[test]
    fn test_validate_language_tags() {
        let mut config = Config::default();
        for tag in ["en", "en-US", "pt-BR", "zh-Hant-TW", "es-419"] {
            config.speech.language = tag.to_string();
            assert!(config.validate().is_ok(), "rejected {tag}");
        }

        for tag in ["", "e", "english language", "en_US", "-US"] {
            config.speech.language = tag.to_string();
            let err = config.validate().unwrap_err().to_string();
            assert!(err.contains("speech.language"), "accepted {tag}");
        }
    }

    #[test]
    fn test_language_tag_pattern_compiles_once() {
        let first: *const Regex = &*LANGUAGE_TAG;
        let second: *const Regex = &*LANGUAGE_TAG;
        assert_eq!(first, second);
        assert!(LANGUAGE_TAG.is_match("pt-BR"));

        let mut config = Config::default();
        for _ in 0..3 {
            assert!(config.validate().is_ok());
        }
        config.speech.language = "pt_BR".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_empty_command() {
        let mut config = Config::default();
        config.speech.command = Some(PathBuf::new());

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("speech.command"));
    }

    #[test]
    fn test_validate_zero_preview() {
        let mut config = Config::default();
        config.display.preview_chars = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("preview_chars"));
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        let path = config.database_path();

        assert!(path.to_string_lossy().contains("notecard"));
        assert!(path.to_string_lossy().ends_with("notes.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
    }

    #[test]
    fn test_recognition_settings() {
        let mut config = Config::default();
        config.speech.language = "en-GB".to_string();

        let settings = config.recognition_settings();
        assert_eq!(settings.language, "en-GB");
        assert!(settings.continuous);
        assert!(settings.interim_results);
        assert_eq!(settings.max_alternatives, 1);
    }

    #[test]
    fn test_render_options() {
        let mut config = Config::default();
        config.display.preview_chars = 12;
        config.display.relative_dates = false;

        assert_eq!(
            config.render_options(),
            RenderOptions {
                preview_chars: 12,
                relative_dates: false,
            }
        );
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("notecard"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config.storage, StorageConfig::default());
        assert_eq!(config.display, DisplayConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[storage]
slot_key = "work-notes"

[speech]
language = "en-US"
command = "/usr/local/bin/transcribe"
args = ["--model", "small"]

[display]
preview_chars = 40
"#,
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.storage.slot_key, "work-notes");
        assert_eq!(config.speech.language, "en-US");
        assert_eq!(
            config.speech.command,
            Some(PathBuf::from("/usr/local/bin/transcribe"))
        );
        assert_eq!(config.speech.args, vec!["--model", "small"]);
        assert_eq!(config.display.preview_chars, 40);
        assert!(config.display.relative_dates);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[display]\npreview_chars = 0\n").unwrap();

        let err = Config::load_from(Some(path)).unwrap_err();
        assert!(matches!(err, Error::ConfigValidation { .. }));
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[display\npreview_chars = ").unwrap();

        let err = Config::load_from(Some(path)).unwrap_err();
        assert!(matches!(err, Error::ConfigLoad(_)));
    }

    #[test]
    fn test_config_serialize() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("slot_key"));
        assert!(json.contains("preview_chars"));
    }

    #[test]
    fn test_speech_config_deserialize() {
        let json = r#"{"language": "fr-FR"}"#;
        let speech: SpeechConfig = serde_json::from_str(json).unwrap();
        assert_eq!(speech.language, "fr-FR");
        assert!(speech.command.is_none());
    }
}
