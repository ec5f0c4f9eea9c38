use anyhow::{Context, Result};
use hound::{SampleFormat, WavReader};
use std::path::Path;
use tracing::{debug, info};

/// Sample rate Whisper expects
pub const WHISPER_SAMPLE_RATE: u32 = 16_000;

/// Loads a WAV file and converts it to 16kHz mono f32 samples.
///
/// Accepts PCM16 and 32-bit float WAV. Multi-channel audio is downmixed by
/// averaging; other sample rates are resampled by linear interpolation.
///
/// # Errors
/// Returns error if the file cannot be opened, is not a WAV, or uses an
/// unsupported bit depth.
pub fn load_wav(path: &Path) -> Result<Vec<f32>> {
    let mut reader =
        WavReader::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let spec = reader.spec();
    let channels = spec.channels.max(1);

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("failed to read float samples from {}", path.display()))?,
        SampleFormat::Int => match spec.bits_per_sample {
            16 => reader
                .samples::<i16>()
                .map(|s| s.map(|v| f32::from(v) / f32::from(i16::MAX)))
                .collect::<Result<Vec<_>, _>>()
                .with_context(|| {
                    format!("failed to read int16 samples from {}", path.display())
                })?,
            other => anyhow::bail!(
                "unsupported bit depth {} in {} (expected 16-bit PCM or float)",
                other,
                path.display()
            ),
        },
    };

    debug!(
        channels = channels,
        sample_rate = spec.sample_rate,
        samples = samples.len(),
        "decoded WAV"
    );

    let mono = downmix_to_mono(&samples, channels);
    let converted = resample(&mono, spec.sample_rate, WHISPER_SAMPLE_RATE);

    info!(
        path = %path.display(),
        input_rate = spec.sample_rate,
        output_samples = converted.len(),
        "audio loaded"
    );

    Ok(converted)
}

/// Averages interleaved channels down to mono.
fn downmix_to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }

    let channels_f64 = f64::from(channels);
    samples
        .chunks(channels as usize)
        .map(|frame| {
            let sum_f64: f64 = frame.iter().map(|&s| f64::from(s)).sum();
            // f64 → f32: audio samples are stored as f32, precision sufficient
            #[allow(clippy::cast_possible_truncation)]
            {
                (sum_f64 / channels_f64) as f32
            }
        })
        .collect()
}

/// Linear interpolation resampling.
///
/// Algorithm requires f64 ↔ usize conversions for fractional index calculations
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = f64::from(from_rate) / f64::from(to_rate);

    let output_len_f64 = (samples.len() as f64) / ratio;
    let output_len = if output_len_f64.is_finite() && output_len_f64 >= 0.0 {
        output_len_f64.ceil() as usize
    } else {
        samples.len()
    };

    let mut resampled = Vec::with_capacity(output_len);
    for i in 0..output_len {
        let src_idx_f64 = (i as f64) * ratio;

        // Floor gives integer part, safe because src_idx >= 0
        let src_idx_floor = if src_idx_f64 >= 0.0 && src_idx_f64 < (usize::MAX as f64) {
            src_idx_f64.floor() as usize
        } else {
            0
        };

        let src_idx_ceil = (src_idx_floor + 1).min(samples.len().saturating_sub(1));
        let fract = src_idx_f64 - src_idx_f64.floor();

        let sample = if src_idx_floor < samples.len() {
            let s1 = f64::from(samples[src_idx_floor]);
            let s2 = f64::from(samples[src_idx_ceil]);
            let interpolated = s1.mul_add(1.0 - fract, s2 * fract);
            interpolated as f32
        } else {
            0.0_f32
        };

        resampled.push(sample);
    }

    debug!(
        from_rate = from_rate,
        to_rate = to_rate,
        input_samples = samples.len(),
        output_samples = resampled.len(),
        "resampling completed"
    );

    resampled
}
