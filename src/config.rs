use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Default inference thread count
pub const DEFAULT_THREADS: usize = 4;
/// Default beam search width
pub const DEFAULT_BEAM_SIZE: usize = 5;
/// Default language hint
pub const DEFAULT_LANGUAGE: &str = "en";

/// Values supplied on the command line or through environment variables.
/// Take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Whisper model path
    pub model: Option<PathBuf>,
    /// Input audio path
    pub audio: Option<PathBuf>,
    /// Language hint ("auto" enables detection)
    pub language: Option<String>,
    /// Inference thread count
    pub threads: Option<usize>,
    /// Beam search width
    pub beam_size: Option<usize>,
}

/// Optional TOML config file supplying defaults for the CLI flags
#[derive(Debug, Deserialize, Clone, Default)]
pub struct FileConfig {
    /// Whisper model path (supports `~` expansion)
    pub model_path: Option<String>,
    /// Input audio path (supports `~` expansion)
    pub audio_path: Option<String>,
    /// Language hint
    pub language: Option<String>,
    /// Inference thread count
    pub threads: Option<usize>,
    /// Beam search width
    pub beam_size: Option<usize>,
}

impl FileConfig {
    /// Loads and parses a TOML config file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config TOML {}", path.display()))?;

        Ok(config)
    }
}

/// Fully resolved runtime settings for one transcription run
#[derive(Debug, Clone)]
pub struct Settings {
    /// Whisper model file
    pub model_path: PathBuf,
    /// Input audio file
    pub audio_path: PathBuf,
    /// Language hint for the engine (None = auto-detect)
    pub language: Option<String>,
    /// Inference thread count
    pub threads: usize,
    /// Beam search width
    pub beam_size: usize,
}

impl Settings {
    /// Merges CLI/env overrides with config file values and built-in
    /// defaults. Precedence: overrides > file > defaults.
    ///
    /// # Errors
    /// Returns error if no model or audio path was supplied anywhere, or if
    /// `~` expansion fails.
    pub fn resolve(overrides: Overrides, file: FileConfig) -> Result<Self> {
        let model_path = match overrides.model {
            Some(path) => path,
            None => match file.model_path.as_deref() {
                Some(path) => Self::expand_path(path)?,
                None => anyhow::bail!(
                    "no model path given (use --model, WHISPER_MODEL, or model_path in the config file)"
                ),
            },
        };

        let audio_path = match overrides.audio {
            Some(path) => path,
            None => match file.audio_path.as_deref() {
                Some(path) => Self::expand_path(path)?,
                None => anyhow::bail!(
                    "no audio path given (use --audio, WHISPER_AUDIO, or audio_path in the config file)"
                ),
            },
        };

        let language = overrides
            .language
            .or(file.language)
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_owned());
        // "auto" means let the model detect the language
        let language = if language == "auto" {
            None
        } else {
            Some(language)
        };

        Ok(Self {
            model_path,
            audio_path,
            language,
            threads: overrides
                .threads
                .or(file.threads)
                .unwrap_or(DEFAULT_THREADS),
            beam_size: overrides
                .beam_size
                .or(file.beam_size)
                .unwrap_or(DEFAULT_BEAM_SIZE),
        })
    }

    /// Expand ~ in paths to home directory
    ///
    /// # Errors
    /// Returns error if HOME is not set while the path needs it.
    pub fn expand_path(path: &str) -> Result<PathBuf> {
        if let Some(stripped) = path.strip_prefix("~/") {
            let home = std::env::var("HOME").context("HOME environment variable not set")?;
            Ok(PathBuf::from(home).join(stripped))
        } else {
            Ok(PathBuf::from(path))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn overrides_with_paths() -> Overrides {
        Overrides {
            model: Some(PathBuf::from("models/test.bin")),
            audio: Some(PathBuf::from("audio/hello.wav")),
            ..Overrides::default()
        }
    }

    #[test]
    fn test_resolve_defaults() {
        let settings = Settings::resolve(overrides_with_paths(), FileConfig::default()).unwrap();
        assert_eq!(settings.model_path, PathBuf::from("models/test.bin"));
        assert_eq!(settings.audio_path, PathBuf::from("audio/hello.wav"));
        assert_eq!(settings.language, Some("en".to_owned()));
        assert_eq!(settings.threads, DEFAULT_THREADS);
        assert_eq!(settings.beam_size, DEFAULT_BEAM_SIZE);
    }

    #[test]
    fn test_resolve_missing_model_path() {
        let overrides = Overrides {
            audio: Some(PathBuf::from("audio/hello.wav")),
            ..Overrides::default()
        };
        let err = Settings::resolve(overrides, FileConfig::default()).unwrap_err();
        assert!(err.to_string().contains("no model path"));
    }

    #[test]
    fn test_resolve_missing_audio_path() {
        let overrides = Overrides {
            model: Some(PathBuf::from("models/test.bin")),
            ..Overrides::default()
        };
        let err = Settings::resolve(overrides, FileConfig::default()).unwrap_err();
        assert!(err.to_string().contains("no audio path"));
    }

    #[test]
    fn test_resolve_auto_language_maps_to_none() {
        let overrides = Overrides {
            language: Some("auto".to_owned()),
            ..overrides_with_paths()
        };
        let settings = Settings::resolve(overrides, FileConfig::default()).unwrap();
        assert_eq!(settings.language, None);
    }

    #[test]
    fn test_overrides_win_over_file() {
        let file = FileConfig {
            model_path: Some("file-model.bin".to_owned()),
            audio_path: Some("file-audio.wav".to_owned()),
            language: Some("de".to_owned()),
            threads: Some(2),
            beam_size: Some(1),
        };
        let overrides = Overrides {
            language: Some("fr".to_owned()),
            threads: Some(8),
            ..overrides_with_paths()
        };

        let settings = Settings::resolve(overrides, file).unwrap();
        assert_eq!(settings.model_path, PathBuf::from("models/test.bin"));
        assert_eq!(settings.language, Some("fr".to_owned()));
        assert_eq!(settings.threads, 8);
        // Not overridden: file value applies
        assert_eq!(settings.beam_size, 1);
    }

    #[test]
    fn test_file_supplies_paths() {
        let file = FileConfig {
            model_path: Some("file-model.bin".to_owned()),
            audio_path: Some("file-audio.wav".to_owned()),
            ..FileConfig::default()
        };
        let settings = Settings::resolve(Overrides::default(), file).unwrap();
        assert_eq!(settings.model_path, PathBuf::from("file-model.bin"));
        assert_eq!(settings.audio_path, PathBuf::from("file-audio.wav"));
    }

    #[test]
    fn test_file_config_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            "model_path = \"models/test.bin\"\naudio_path = \"audio/hello.wav\"\nlanguage = \"en\"\nthreads = 2"
        )
        .unwrap();

        let config = FileConfig::load(&path).unwrap();
        assert_eq!(config.model_path.as_deref(), Some("models/test.bin"));
        assert_eq!(config.audio_path.as_deref(), Some("audio/hello.wav"));
        assert_eq!(config.language.as_deref(), Some("en"));
        assert_eq!(config.threads, Some(2));
        assert_eq!(config.beam_size, None);
    }

    #[test]
    fn test_file_config_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "model_path = [not toml").unwrap();

        let err = FileConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse config TOML"));
    }

    #[test]
    fn test_file_config_load_missing_file() {
        let err = FileConfig::load(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let home = std::env::var("HOME").unwrap();
        let result = Settings::expand_path("~/models/test.bin").unwrap();
        assert_eq!(result, PathBuf::from(home).join("models/test.bin"));
    }

    #[test]
    fn test_expand_path_without_tilde() {
        let result = Settings::expand_path("/opt/models/test.bin").unwrap();
        assert_eq!(result, PathBuf::from("/opt/models/test.bin"));
    }

    #[test]
    fn test_expand_path_relative() {
        let result = Settings::expand_path("models/test.bin").unwrap();
        assert_eq!(result, PathBuf::from("models/test.bin"));
    }
}
