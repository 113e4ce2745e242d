//! Short-time Fourier transform with constant-overlap-add synthesis
//!
//! The forward transform zero-pads the signal at both edges so that every
//! sample is covered by the same number of windows and the frame grid is
//! hop-aligned; the inverse transform overlap-adds the real part of each
//! inverse FFT into an explicit local accumulator, strips the edge padding
//! and normalizes by the hop-sampled window sum.
//!
//! Reconstruction is exact (up to floating error) for any window/hop pair
//! satisfying constant overlap-add, such as the periodic Hamming window at
//! half-window hop (see [`crate::spectral::window`]).

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use crate::error::SeparationError;

/// Number of frames produced by [`forward`] for a signal of `num_samples`.
///
/// `M = ceil((window_length - hop + num_samples) / hop)`; at least one frame
/// is produced even for an empty signal.
pub fn num_frames(num_samples: usize, window_length: usize, hop: usize) -> usize {
    (window_length + num_samples - 1) / hop
}

/// Forward STFT.
///
/// Zero-pads the signal by `window_length - hop` samples at the start and
/// enough trailing zeros for the last frame to be full, windows each frame
/// and applies a forward FFT. Returns one complex column of `window_length`
/// bins per frame.
///
/// # Errors
///
/// Returns `SeparationError::InvalidConfig` if the window is empty or of odd
/// length, or if the hop is zero or larger than the window.
pub fn forward(
    samples: &[f32],
    window: &[f32],
    hop: usize,
) -> Result<Vec<Vec<Complex<f32>>>, SeparationError> {
    let window_length = window.len();
    validate_window_and_hop(window_length, hop)?;

    let frames = num_frames(samples.len(), window_length, hop);
    let padded_length = (frames - 1) * hop + window_length;

    // Leading pad centers the first window; trailing pad fills the last frame.
    let lead = window_length - hop;
    let mut padded = vec![0.0f32; padded_length];
    padded[lead..lead + samples.len()].copy_from_slice(samples);

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(window_length);

    let mut spectrogram = Vec::with_capacity(frames);
    for frame_index in 0..frames {
        let start = frame_index * hop;
        let mut column: Vec<Complex<f32>> = padded[start..start + window_length]
            .iter()
            .zip(window.iter())
            .map(|(&x, &w)| Complex::new(x * w, 0.0))
            .collect();
        fft.process(&mut column);
        spectrogram.push(column);
    }

    Ok(spectrogram)
}

/// Inverse STFT with overlap-add synthesis.
///
/// For each frame, takes the real part of the inverse FFT and adds it into
/// an accumulator at the frame's hop-aligned offset. The leading and
/// trailing `window_length - hop` padding samples are stripped and the
/// result is divided by the sum of the window sampled every `hop` samples
/// (the window is not unit-gain under overlap-add).
///
/// The output length is `(frames - 1) * hop` for half-window hop; callers
/// truncate or pad to the original signal length themselves.
///
/// # Errors
///
/// Returns `SeparationError::InvalidConfig` for a bad window/hop pair and
/// `SeparationError::ProcessingError` if a column's length does not match
/// the window.
pub fn inverse(
    spectrogram: &[Vec<Complex<f32>>],
    window: &[f32],
    hop: usize,
) -> Result<Vec<f32>, SeparationError> {
    if spectrogram.is_empty() {
        return Ok(Vec::new());
    }

    let window_length = window.len();
    validate_window_and_hop(window_length, hop)?;

    let frames = spectrogram.len();
    let padded_length = (frames - 1) * hop + window_length;
    let mut accumulator = vec![0.0f32; padded_length];

    let mut planner = FftPlanner::new();
    let ifft = planner.plan_fft_inverse(window_length);
    // rustfft's inverse is unnormalized.
    let scale = 1.0 / window_length as f32;

    let mut buffer = vec![Complex::new(0.0f32, 0.0); window_length];
    for (frame_index, column) in spectrogram.iter().enumerate() {
        if column.len() != window_length {
            return Err(SeparationError::ProcessingError(format!(
                "Spectrogram column {} has {} bins, expected {}",
                frame_index,
                column.len(),
                window_length
            )));
        }
        buffer.copy_from_slice(column);
        ifft.process(&mut buffer);

        let start = frame_index * hop;
        for (k, value) in buffer.iter().enumerate() {
            accumulator[start + k] += value.re * scale;
        }
    }

    let edge = window_length - hop;
    if padded_length < 2 * edge {
        return Ok(Vec::new());
    }

    let normalization: f32 = window.iter().step_by(hop).sum();
    if normalization.abs() < f32::EPSILON {
        return Err(SeparationError::ProcessingError(
            "Window sums to zero under overlap-add; cannot normalize".to_string(),
        ));
    }

    Ok(accumulator[edge..padded_length - edge]
        .iter()
        .map(|&x| x / normalization)
        .collect())
}

/// Magnitudes of the non-redundant half spectrum (bins `0..=N/2`).
///
/// For a real-valued input signal, bins above the Nyquist bin are conjugate
/// mirrors of the lower half and carry no extra information.
pub fn half_magnitude(spectrogram: &[Vec<Complex<f32>>]) -> Vec<Vec<f32>> {
    let half = match spectrogram.first() {
        Some(column) => column.len() / 2 + 1,
        None => return Vec::new(),
    };
    spectrogram
        .iter()
        .map(|column| column[..half].iter().map(|c| c.norm()).collect())
        .collect()
}

fn validate_window_and_hop(window_length: usize, hop: usize) -> Result<(), SeparationError> {
    if window_length == 0 {
        return Err(SeparationError::InvalidConfig(
            "Analysis window is empty".to_string(),
        ));
    }
    if window_length % 2 != 0 {
        return Err(SeparationError::InvalidConfig(format!(
            "Analysis window length must be even for overlap-add, got {}",
            window_length
        )));
    }
    if hop == 0 || hop > window_length {
        return Err(SeparationError::InvalidConfig(format!(
            "Hop must be in 1..={}, got {}",
            window_length, hop
        )));
    }
    Ok(())
}
