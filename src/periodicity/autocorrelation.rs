//! Unbiased autocorrelation via the power-spectrum identity
//!
//! Each column is zero-padded to twice its length, transformed, reduced to
//! its power spectral density, transformed back, and the first half (the
//! non-negative lags) is kept: `ACF = IFFT(|FFT(x, 2n)|²)[..n]`. Lag `k` is
//! then divided by `(n - k)` to remove the bias introduced by zero-padding
//! (fewer overlapping products survive at larger lags), so lag 0 equals the
//! mean power of the column.
//!
//! The O(n log n) transform identity is required here, not a direct O(n²)
//! correlation; the floating-point behavior of the two differs.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use crate::error::SeparationError;

/// Compute the unbiased autocorrelation of each column independently.
///
/// All columns must share one length `n` (one FFT plan serves them all);
/// each output column holds lags `0..n`.
///
/// # Errors
///
/// Returns `SeparationError::ProcessingError` if the columns have
/// mismatched lengths.
pub fn unbiased_autocorrelation(columns: &[Vec<f32>]) -> Result<Vec<Vec<f32>>, SeparationError> {
    let n = match columns.first() {
        Some(first) => first.len(),
        None => return Ok(Vec::new()),
    };
    if n == 0 {
        return Ok(vec![Vec::new(); columns.len()]);
    }
    for (index, column) in columns.iter().enumerate() {
        if column.len() != n {
            return Err(SeparationError::ProcessingError(format!(
                "Autocorrelation column {} has length {}, expected {}",
                index,
                column.len(),
                n
            )));
        }
    }

    let padded_length = 2 * n;
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(padded_length);
    let ifft = planner.plan_fft_inverse(padded_length);
    // rustfft's inverse is unnormalized.
    let scale = 1.0 / padded_length as f32;

    let mut buffer = vec![Complex::new(0.0f32, 0.0); padded_length];
    let mut lags = Vec::with_capacity(columns.len());
    for column in columns {
        for (k, slot) in buffer.iter_mut().enumerate() {
            *slot = if k < n {
                Complex::new(column[k], 0.0)
            } else {
                Complex::new(0.0, 0.0)
            };
        }
        fft.process(&mut buffer);
        for value in buffer.iter_mut() {
            *value = Complex::new(value.norm_sqr(), 0.0);
        }
        ifft.process(&mut buffer);

        lags.push(
            (0..n)
                .map(|k| buffer[k].re * scale / (n - k) as f32)
                .collect(),
        );
    }

    Ok(lags)
}
