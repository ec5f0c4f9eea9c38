//! Transcribe one audio file with a local Whisper model and print the text.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use whisper_transcribe::config::{FileConfig, Overrides, Settings};
use whisper_transcribe::transcription::{self, TranscriptionEngine};
use whisper_transcribe::{telemetry, validate};

/// Transcribe a single audio file with a local Whisper model.
#[derive(Parser, Debug)]
#[command(name = "whisper-transcribe", version)]
struct Cli {
    /// Path to the ggml Whisper model file.
    #[arg(long, env = "WHISPER_MODEL")]
    model: Option<PathBuf>,

    /// Path to the input WAV file.
    #[arg(long, env = "WHISPER_AUDIO")]
    audio: Option<PathBuf>,

    /// Language hint, e.g. "en" ("auto" enables detection).
    #[arg(long)]
    language: Option<String>,

    /// Inference thread count.
    #[arg(long)]
    threads: Option<usize>,

    /// Beam search width (1 = greedy).
    #[arg(long)]
    beam_size: Option<usize>,

    /// TOML config file supplying defaults for the flags above.
    #[arg(long, env = "WHISPER_TRANSCRIBE_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose logging to stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.verbose);

    let file_config = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };

    let settings = Settings::resolve(
        Overrides {
            model: cli.model,
            audio: cli.audio,
            language: cli.language,
            threads: cli.threads,
            beam_size: cli.beam_size,
        },
        file_config,
    )?;

    tracing::info!(
        model = %settings.model_path.display(),
        audio = %settings.audio_path.display(),
        language = ?settings.language,
        "starting transcription run"
    );

    // Fail fast on missing inputs before touching the model
    validate::ensure_files_exist([
        ("model", settings.model_path.as_path()),
        ("audio", settings.audio_path.as_path()),
    ])?;

    let engine = TranscriptionEngine::new(
        &settings.model_path,
        settings.threads,
        settings.beam_size,
        settings.language.clone(),
    )?;

    let transcript = transcription::transcribe_file(&engine, &settings.audio_path)?;

    #[allow(clippy::print_stdout)] // The transcript is the program's output
    {
        println!("{}", transcript.text);
    }

    Ok(())
}
