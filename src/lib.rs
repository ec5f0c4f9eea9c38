//! Whisper Transcribe - one-shot audio file transcription
//!
//! Transcribes a single WAV file with a local whisper.cpp model and prints
//! the recognized text. The library exports the pipeline pieces so they can
//! be tested without the binary.

/// WAV decoding and conversion to Whisper input format
pub mod audio;
/// Configuration resolution (CLI, environment, config file)
pub mod config;
/// Logging setup
pub mod telemetry;
/// Whisper transcription engine
pub mod transcription;
/// Input path validation
pub mod validate;
