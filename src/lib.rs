//! # repet-dsp
//!
//! Repeating-pattern extraction for background/foreground separation in
//! audio mixtures. Mixtures are often a repeating accompaniment under a
//! varying foreground (vocals over a looping backing track, speech over a
//! periodic noise floor); this crate finds the repetition in the
//! time-frequency plane, derives a soft spectral mask for the repeating
//! content, and reconstructs the background waveform. The foreground is
//! the residual `mixture - background`.
//!
//! ## Pipeline
//!
//! ```text
//! Signal -> STFT -> channel-mean power -> beat spectrogram -> periods
//!                          |                                     |
//!                          v                                     v
//!        complex spectrogram -> period-locked median mask -> inverse STFT
//! ```
//!
//! The periodicity analysis slides an adaptive window across the time
//! frames so the estimated repeating period can track slow tempo and
//! structure changes. Everything is an offline, pure, in-memory
//! computation: no I/O, no shared state, each call independently
//! reentrant.
//!
//! ## Quick Start
//!
//! ```no_run
//! use repet_dsp::{separate, SeparationConfig};
//!
//! // Channel-major samples, normalized to [-1.0, 1.0].
//! let mixture: Vec<Vec<f32>> = vec![vec![0.0f32; 44100 * 30]]; // 30 s mono
//! let result = separate(&mixture, 44100, SeparationConfig::default())?;
//!
//! let background = &result.background[0];
//! let foreground: Vec<f32> = mixture[0]
//!     .iter()
//!     .zip(background.iter())
//!     .map(|(&mix, &bg)| mix - bg)
//!     .collect();
//! # let _ = foreground;
//! # Ok::<(), repet_dsp::SeparationError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod masking;
pub mod periodicity;
pub mod progress;
pub mod result;
pub mod spectral;

// Re-export main types
pub use config::SeparationConfig;
pub use error::SeparationError;
pub use progress::{Progress, Stage};
pub use result::{SeparationMetadata, SeparationResult};

use crate::masking::{repeating_mask, resynthesis};
use crate::periodicity::{beat_spectrogram, period_estimator};
use crate::spectral::stft;
use crate::spectral::window::periodic_hamming;

/// Separate the repeating background from a mixture.
///
/// Equivalent to [`separate_with_progress`] with a no-op callback.
///
/// # Arguments
///
/// * `signal` - Channel-major samples; all channels must share one length
/// * `sample_rate` - Sample rate in Hz
/// * `config` - Separation parameters (see [`SeparationConfig`])
///
/// # Returns
///
/// [`SeparationResult`] with the background signal (same shape as the
/// input), the per-frame repeating-period map and metadata.
///
/// # Errors
///
/// Returns [`SeparationError`] for invalid input or configuration; a
/// zero-length or all-silent signal is not an error and maps to an equally
/// silent background.
pub fn separate(
    signal: &[Vec<f32>],
    sample_rate: u32,
    config: SeparationConfig,
) -> Result<SeparationResult, SeparationError> {
    separate_with_progress(signal, sample_rate, config, |_| true)
}

/// Separate the repeating background, reporting progress.
///
/// `progress` is invoked at defined checkpoints of the two slow stages
/// (once per sampled periodicity-analysis position, once per frame of each
/// channel's mask pass). Returning `false` cancels the separation with
/// [`SeparationError::Cancelled`].
///
/// # Errors
///
/// As [`separate`], plus [`SeparationError::Cancelled`].
pub fn separate_with_progress(
    signal: &[Vec<f32>],
    sample_rate: u32,
    config: SeparationConfig,
    mut progress: impl FnMut(Progress) -> bool,
) -> Result<SeparationResult, SeparationError> {
    use std::time::Instant;
    let start_time = Instant::now();

    if signal.is_empty() {
        return Err(SeparationError::InvalidInput(
            "Signal must have at least one channel".to_string(),
        ));
    }
    let num_samples = signal[0].len();
    for (channel, samples) in signal.iter().enumerate() {
        if samples.len() != num_samples {
            return Err(SeparationError::InvalidInput(format!(
                "Channel {} has {} samples, channel 0 has {}",
                channel,
                samples.len(),
                num_samples
            )));
        }
    }

    let params = config.resolve(sample_rate)?;
    let num_channels = signal.len();

    log::debug!(
        "Separating {} channel(s) x {} samples at {} Hz (window {}, hop {})",
        num_channels,
        num_samples,
        sample_rate,
        params.window_length,
        params.hop
    );

    if num_samples == 0 {
        return Ok(SeparationResult {
            background: vec![Vec::new(); num_channels],
            periods_seconds: Vec::new(),
            metadata: metadata(sample_rate, num_channels, 0, 0, &params, start_time),
        });
    }

    let window = periodic_hamming(params.window_length);

    // Per-channel complex spectrograms and half-spectrum magnitudes.
    let mut spectrograms = Vec::with_capacity(num_channels);
    let mut magnitudes = Vec::with_capacity(num_channels);
    for samples in signal {
        let spectrogram = stft::forward(samples, &window, params.hop)?;
        magnitudes.push(stft::half_magnitude(&spectrogram));
        spectrograms.push(spectrogram);
    }

    let num_frames = spectrograms[0].len();
    let half_bins = params.window_length / 2 + 1;

    // Channel-averaged power spectrogram drives the periodicity analysis.
    let channel_scale = 1.0 / num_channels as f32;
    let mut power = vec![vec![0.0f32; half_bins]; num_frames];
    for magnitude in &magnitudes {
        for (power_row, magnitude_row) in power.iter_mut().zip(magnitude.iter()) {
            for (slot, &value) in power_row.iter_mut().zip(magnitude_row.iter()) {
                *slot += value * value * channel_scale;
            }
        }
    }

    let beat = beat_spectrogram::build(
        &power,
        params.window_frames,
        params.hop_frames,
        &mut |completed, total| {
            progress(Progress {
                stage: Stage::BeatSpectrogram,
                completed,
                total,
            })
        },
    )?;

    let periods = period_estimator::estimate_periods(&beat, params.min_lag, params.max_lag)?;
    log::debug!(
        "Estimated periods over {} frames (lag range [{}, {}])",
        periods.len(),
        params.min_lag,
        params.max_lag
    );

    let mask_total = num_frames * num_channels;
    let mut background = Vec::with_capacity(num_channels);
    for (channel, (spectrogram, magnitude)) in
        spectrograms.iter().zip(magnitudes.iter()).enumerate()
    {
        let mask = repeating_mask::repeating_mask(
            magnitude,
            &periods,
            params.filter_order,
            &mut |completed, _| {
                progress(Progress {
                    stage: Stage::MaskSynthesis,
                    completed: channel * num_frames + completed,
                    total: mask_total,
                })
            },
        )?;
        background.push(resynthesis::apply_mask(
            spectrogram,
            &mask,
            params.high_pass_cutoff_bins,
            &window,
            params.hop,
            num_samples,
        )?);
    }

    let seconds_per_frame = params.hop as f32 / sample_rate as f32;
    let periods_seconds = periods.iter().map(|&p| p as f32 * seconds_per_frame).collect();

    Ok(SeparationResult {
        background,
        periods_seconds,
        metadata: metadata(
            sample_rate,
            num_channels,
            num_samples,
            num_frames,
            &params,
            start_time,
        ),
    })
}

fn metadata(
    sample_rate: u32,
    num_channels: usize,
    num_samples: usize,
    num_frames: usize,
    params: &config::ResolvedParameters,
    start_time: std::time::Instant,
) -> SeparationMetadata {
    SeparationMetadata {
        duration_seconds: num_samples as f32 / sample_rate as f32,
        sample_rate,
        num_channels,
        num_frames,
        window_length: params.window_length,
        hop_length: params.hop,
        processing_time_ms: start_time.elapsed().as_secs_f32() * 1000.0,
        algorithm_version: env!("CARGO_PKG_VERSION").to_string(),
    }
}
