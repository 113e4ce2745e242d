//! Mask application and time-domain resynthesis
//!
//! The half-spectrum mask is forced to 1 below the high-pass cutoff (the
//! background is assumed to dominate the lows, so the carve-out keeps them
//! out of the foreground residual the caller computes), mirrored back into
//! a full spectrum by the conjugate symmetry of a real signal, multiplied
//! bin-wise into the complex spectrogram (phase untouched), and inverse
//! transformed.

use rustfft::num_complex::Complex;

use crate::error::SeparationError;
use crate::spectral::stft;

/// Apply a half-spectrum soft mask to a complex spectrogram and rebuild the
/// time-domain signal, truncated (or zero-padded, defensively) to
/// `original_length` samples.
///
/// `mask` is frame-major with `N/2 + 1` bins per row for an `N`-bin
/// spectrogram; `high_pass_cutoff_bins` bins at the bottom of each row are
/// forced to 1 before mirroring (0 disables the carve-out).
///
/// # Errors
///
/// Returns `SeparationError::ProcessingError` on shape mismatches between
/// the mask and the spectrogram, and propagates inverse-transform errors.
pub fn apply_mask(
    spectrogram: &[Vec<Complex<f32>>],
    mask: &[Vec<f32>],
    high_pass_cutoff_bins: usize,
    window: &[f32],
    hop: usize,
    original_length: usize,
) -> Result<Vec<f32>, SeparationError> {
    if mask.len() != spectrogram.len() {
        return Err(SeparationError::ProcessingError(format!(
            "Mask covers {} frames, spectrogram has {}",
            mask.len(),
            spectrogram.len()
        )));
    }
    if spectrogram.is_empty() {
        return Ok(vec![0.0; original_length]);
    }

    let num_bins = spectrogram[0].len();
    let half = num_bins / 2 + 1;

    let mut full = vec![0.0f32; num_bins];
    let mut masked = Vec::with_capacity(spectrogram.len());
    for (frame, (column, row)) in spectrogram.iter().zip(mask.iter()).enumerate() {
        if column.len() != num_bins || row.len() != half {
            return Err(SeparationError::ProcessingError(format!(
                "Frame {}: column has {} bins, mask row {} (expected {} and {})",
                frame,
                column.len(),
                row.len(),
                num_bins,
                half
            )));
        }

        for (bin, slot) in full.iter_mut().take(half).enumerate() {
            *slot = if bin < high_pass_cutoff_bins { 1.0 } else { row[bin] };
        }
        // Conjugate symmetry of the real original: bins above Nyquist
        // mirror the lower half (the mask is real, so the multiplied
        // spectrum stays symmetric).
        for bin in 1..half - 1 {
            full[num_bins - bin] = full[bin];
        }

        masked.push(
            column
                .iter()
                .zip(full.iter())
                .map(|(&value, &weight)| value * weight)
                .collect::<Vec<Complex<f32>>>(),
        );
    }

    let mut signal = stft::inverse(&masked, window, hop)?;
    signal.resize(original_length, 0.0);
    Ok(signal)
}
