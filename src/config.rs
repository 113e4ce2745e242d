//! Configuration for the separation pipeline

use serde::{Deserialize, Serialize};

use crate::error::SeparationError;
use crate::spectral::window::{analysis_window_length, hop_length};

/// Separation configuration parameters.
///
/// Every field is independently defaulted. Fields expressed in seconds are
/// converted to analysis frames against the signal's sample rate when the
/// configuration is resolved; the adaptive window is resolved before the
/// period-range default, which references it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeparationConfig {
    /// Length in seconds of the sliding periodicity-analysis window
    /// (default: 24.0). Longer windows give sharper period estimates,
    /// shorter ones track tempo/structure changes faster.
    pub adaptive_window_seconds: f32,

    /// Step in seconds between periodicity-analysis positions
    /// (default: 12.0).
    pub adaptive_hop_seconds: f32,

    /// Order of the period-locked median filter (default: 7). Defines a
    /// centered offset set of this size; even orders are biased one extra
    /// step forward.
    pub median_filter_order: usize,

    /// Inclusive repeating-period search range in seconds.
    /// `None` (default) resolves to `(0.8, min(8.0, adaptive_window_seconds / 3.0))`.
    pub period_range_seconds: Option<(f32, f32)>,

    /// Frequency below which the background mask is forced to 1
    /// (default: 100.0 Hz). The background is assumed to dominate the lows;
    /// the carve-out keeps them out of the foreground residual. 0 disables
    /// it.
    pub high_pass_cutoff_hz: f32,
}

impl Default for SeparationConfig {
    fn default() -> Self {
        Self {
            adaptive_window_seconds: 24.0,
            adaptive_hop_seconds: 12.0,
            median_filter_order: 7,
            period_range_seconds: None,
            high_pass_cutoff_hz: 100.0,
        }
    }
}

/// Frame-domain parameters derived from a [`SeparationConfig`] and a sample
/// rate, validated and ready for the pipeline.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedParameters {
    pub window_length: usize,
    pub hop: usize,
    pub window_frames: usize,
    pub hop_frames: usize,
    pub min_lag: usize,
    pub max_lag: usize,
    pub filter_order: usize,
    pub high_pass_cutoff_bins: usize,
}

impl SeparationConfig {
    /// Resolve the configuration against a sample rate.
    ///
    /// Resolution order: analysis window length from the sample rate, then
    /// the adaptive window/hop in frames, then the period range (whose
    /// default references the adaptive window).
    pub(crate) fn resolve(&self, sample_rate: u32) -> Result<ResolvedParameters, SeparationError> {
        if sample_rate == 0 {
            return Err(SeparationError::InvalidInput(
                "Sample rate must be positive".to_string(),
            ));
        }
        if !self.adaptive_window_seconds.is_finite() || self.adaptive_window_seconds <= 0.0 {
            return Err(SeparationError::InvalidConfig(format!(
                "Adaptive window must be a positive duration, got {} s",
                self.adaptive_window_seconds
            )));
        }
        if !self.adaptive_hop_seconds.is_finite() || self.adaptive_hop_seconds <= 0.0 {
            return Err(SeparationError::InvalidConfig(format!(
                "Adaptive hop must be a positive duration, got {} s",
                self.adaptive_hop_seconds
            )));
        }
        if self.median_filter_order == 0 {
            return Err(SeparationError::InvalidConfig(
                "Median filter order must be positive".to_string(),
            ));
        }
        if !self.high_pass_cutoff_hz.is_finite() || self.high_pass_cutoff_hz < 0.0 {
            return Err(SeparationError::InvalidConfig(format!(
                "High-pass cutoff must be non-negative, got {} Hz",
                self.high_pass_cutoff_hz
            )));
        }

        let window_length = analysis_window_length(sample_rate);
        let hop = hop_length(window_length);
        let rate = sample_rate as f64;
        let frames_per_second = rate / hop as f64;

        let window_frames =
            (self.adaptive_window_seconds as f64 * frames_per_second).round() as usize;
        if window_frames < 2 {
            return Err(SeparationError::InvalidConfig(format!(
                "Adaptive window of {} s spans {} analysis frame(s); need at least 2",
                self.adaptive_window_seconds, window_frames
            )));
        }
        let hop_frames =
            ((self.adaptive_hop_seconds as f64 * frames_per_second).round() as usize).max(1);

        let (min_seconds, max_seconds) = self.period_range_seconds.unwrap_or((
            0.8,
            8.0f32.min(self.adaptive_window_seconds / 3.0),
        ));
        if !min_seconds.is_finite() || !max_seconds.is_finite() || min_seconds <= 0.0 {
            return Err(SeparationError::InvalidConfig(format!(
                "Period range must be positive and finite, got [{}, {}] s",
                min_seconds, max_seconds
            )));
        }
        if min_seconds > max_seconds {
            return Err(SeparationError::InvalidConfig(format!(
                "Period range is inverted: [{}, {}] s",
                min_seconds, max_seconds
            )));
        }

        let min_lag = ((min_seconds as f64 * frames_per_second).round() as usize).max(1);
        let max_lag = (max_seconds as f64 * frames_per_second).round() as usize;
        if min_lag > max_lag || max_lag >= window_frames {
            return Err(SeparationError::InvalidConfig(format!(
                "Period range [{}, {}] s maps to lags [{}, {}], outside the representable \
                 range [1, {}] for an adaptive window of {} frames",
                min_seconds,
                max_seconds,
                min_lag,
                max_lag,
                window_frames - 1,
                window_frames
            )));
        }

        let high_pass_cutoff_bins =
            (self.high_pass_cutoff_hz as f64 * (window_length - 1) as f64 / rate).ceil() as usize;

        Ok(ResolvedParameters {
            window_length,
            hop,
            window_frames,
            hop_frames,
            min_lag,
            max_lag,
            filter_order: self.median_filter_order,
            high_pass_cutoff_bins,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_resolve_at_44100() {
        let params = SeparationConfig::default().resolve(44100).unwrap();
        assert_eq!(params.window_length, 2048);
        assert_eq!(params.hop, 1024);
        // 24 s of frames at ~43.07 frames/s.
        assert_eq!(params.window_frames, 1034);
        assert_eq!(params.hop_frames, 517);
        // [0.8, 8.0] s default range.
        assert_eq!(params.min_lag, 34);
        assert_eq!(params.max_lag, 345);
        assert_eq!(params.filter_order, 7);
        // ceil(100 * 2047 / 44100)
        assert_eq!(params.high_pass_cutoff_bins, 5);
    }

    #[test]
    fn test_default_period_range_tracks_short_window() {
        // window/3 < 8 s: the default upper bound follows the window.
        let config = SeparationConfig {
            adaptive_window_seconds: 6.0,
            adaptive_hop_seconds: 3.0,
            ..Default::default()
        };
        let params = config.resolve(16000).unwrap();
        // hop = 512 at 16 kHz -> 31.25 frames/s; max = 2.0 s -> lag 63.
        assert_eq!(params.max_lag, 63);
        assert_eq!(params.min_lag, 25);
    }

    #[test]
    fn test_explicit_period_range() {
        let config = SeparationConfig {
            adaptive_window_seconds: 8.0,
            adaptive_hop_seconds: 4.0,
            period_range_seconds: Some((0.8, 3.0)),
            ..Default::default()
        };
        let params = config.resolve(16000).unwrap();
        assert_eq!(params.min_lag, 25);
        assert_eq!(params.max_lag, 94);
    }

    #[test]
    fn test_zero_sample_rate_rejected() {
        assert!(SeparationConfig::default().resolve(0).is_err());
    }

    #[test]
    fn test_zero_filter_order_rejected() {
        let config = SeparationConfig {
            median_filter_order: 0,
            ..Default::default()
        };
        assert!(config.resolve(44100).is_err());
    }

    #[test]
    fn test_window_shorter_than_frame_rejected() {
        let config = SeparationConfig {
            adaptive_window_seconds: 0.01,
            ..Default::default()
        };
        assert!(config.resolve(44100).is_err());
    }

    #[test]
    fn test_inverted_period_range_rejected() {
        let config = SeparationConfig {
            period_range_seconds: Some((4.0, 2.0)),
            ..Default::default()
        };
        assert!(config.resolve(44100).is_err());
    }

    #[test]
    fn test_period_range_beyond_window_rejected() {
        // A 2 s adaptive window cannot represent an 8 s period lag.
        let config = SeparationConfig {
            adaptive_window_seconds: 2.0,
            period_range_seconds: Some((0.8, 8.0)),
            ..Default::default()
        };
        assert!(config.resolve(44100).is_err());
    }

    #[test]
    fn test_negative_cutoff_rejected() {
        let config = SeparationConfig {
            high_pass_cutoff_hz: -1.0,
            ..Default::default()
        };
        assert!(config.resolve(44100).is_err());
    }

    #[test]
    fn test_cutoff_zero_disables_carve_out() {
        let config = SeparationConfig {
            high_pass_cutoff_hz: 0.0,
            ..Default::default()
        };
        let params = config.resolve(44100).unwrap();
        assert_eq!(params.high_pass_cutoff_bins, 0);
    }
}
