//! Analysis window derivation
//!
//! The analysis window is a periodic (DFT-even) Hamming window whose length
//! is derived from the sample rate: roughly 40 ms of audio, rounded up to a
//! power of two. At a hop of half the window length, the periodic Hamming
//! window satisfies constant overlap-add: shifted copies sum to a constant
//! (1.08), so windowed frames can be recombined without amplitude ripple.
//!
//! The symmetric Hamming window does *not* have this property; the periodic
//! variant omits the final sample of the symmetric window of length N+1.

use std::f64::consts::PI;

/// Analysis window duration in seconds, before rounding up to a power of two.
///
/// Tied to the stationarity assumptions of typical audio; deliberately not
/// caller-configurable.
const WINDOW_DURATION_SECONDS: f64 = 0.04;

/// Analysis window length in samples for the given sample rate.
///
/// Computed as `2^ceil(log2(0.04 * sample_rate))`, i.e. the smallest power
/// of two covering 40 ms of audio. Always even, so the half-window hop is
/// exact.
///
/// # Example
///
/// ```
/// use repet_dsp::spectral::window::analysis_window_length;
///
/// assert_eq!(analysis_window_length(44100), 2048);
/// assert_eq!(analysis_window_length(16000), 1024);
/// assert_eq!(analysis_window_length(8000), 512);
/// ```
pub fn analysis_window_length(sample_rate: u32) -> usize {
    let samples = (WINDOW_DURATION_SECONDS * sample_rate as f64).ceil() as usize;
    samples.max(2).next_power_of_two()
}

/// Hop length for constant overlap-add: half the window length.
pub fn hop_length(window_length: usize) -> usize {
    window_length / 2
}

/// Generate a periodic Hamming window of the given length.
///
/// `w[n] = 0.54 - 0.46 * cos(2*pi*n / length)` for `n` in `0..length`.
pub fn periodic_hamming(length: usize) -> Vec<f32> {
    (0..length)
        .map(|n| (0.54 - 0.46 * (2.0 * PI * n as f64 / length as f64).cos()) as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_length_common_rates() {
        assert_eq!(analysis_window_length(8000), 512);
        assert_eq!(analysis_window_length(16000), 1024);
        assert_eq!(analysis_window_length(22050), 1024);
        assert_eq!(analysis_window_length(44100), 2048);
        assert_eq!(analysis_window_length(48000), 2048);
        assert_eq!(analysis_window_length(96000), 4096);
    }

    #[test]
    fn test_window_length_is_power_of_two() {
        for rate in [8000u32, 11025, 16000, 22050, 32000, 44100, 48000] {
            let n = analysis_window_length(rate);
            assert!(n.is_power_of_two(), "length {} for rate {}", n, rate);
            assert_eq!(n % 2, 0);
        }
    }

    #[test]
    fn test_periodic_hamming_endpoints() {
        let w = periodic_hamming(8);
        assert_eq!(w.len(), 8);
        // Periodic window starts at 0.08 and peaks at exactly 1.0 mid-window.
        assert!((w[0] - 0.08).abs() < 1e-6);
        assert!((w[4] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_constant_overlap_add_at_half_hop() {
        // w[n] + w[n + N/2] must be constant for ripple-free reconstruction.
        for n in [8usize, 64, 512, 2048] {
            let w = periodic_hamming(n);
            let hop = hop_length(n);
            for i in 0..hop {
                let sum = w[i] + w[i + hop];
                assert!(
                    (sum - 1.08).abs() < 1e-5,
                    "overlap sum {} at index {} for length {}",
                    sum,
                    i,
                    n
                );
            }
        }
    }
}
