/// Whisper model inference engine
pub mod engine;

pub use engine::{Transcriber, Transcript, TranscriptionEngine, TranscriptionError};

use anyhow::{Context, Result};
use std::path::Path;

/// Loads one audio file and runs it through the given transcriber.
///
/// Blocking and synchronous: returns only when inference has completed or
/// failed. The audio file is decoded first, so a missing or unreadable file
/// fails before the transcriber is invoked.
///
/// # Errors
/// Returns error if the audio file cannot be decoded or inference fails.
pub fn transcribe_file(transcriber: &dyn Transcriber, audio_path: &Path) -> Result<Transcript> {
    let samples = crate::audio::load_wav(audio_path)?;

    let transcript = transcriber
        .transcribe(&samples)
        .with_context(|| format!("transcription failed for {}", audio_path.display()))?;

    Ok(transcript)
}
