//! Periodicity analysis over the time-frequency plane
//!
//! Builds a beat spectrogram (a time-local periodicity map) from the
//! channel-averaged power spectrogram and estimates one repeating period
//! per frame from it:
//! - FFT-accelerated unbiased autocorrelation per frequency bin
//! - sliding centered window producing one beat spectrum per sampled frame
//! - lag-range argmax with first-max tie-breaking, held between samples

pub mod autocorrelation;
pub mod beat_spectrogram;
pub mod period_estimator;

/// Time-local periodicity map: one lag profile per sampled frame position.
///
/// Columns at frame positions between samples are never computed and stay
/// zero; consumers must go through [`sampled_frames`](Self::sampled_frames)
/// (the period estimator expands sampled estimates by nearest-neighbor
/// hold).
#[derive(Debug, Clone)]
pub struct BeatSpectrogram {
    /// Lag axis length: the adaptive analysis window size in frames.
    pub window_frames: usize,

    /// Number of spectrogram frames the map covers.
    pub num_frames: usize,

    /// One column per frame (`num_frames` columns of `window_frames` lags);
    /// only columns listed in `sampled_frames` hold values.
    pub columns: Vec<Vec<f32>>,

    /// Frame positions that were actually computed, ascending; always
    /// includes the final frame.
    pub sampled_frames: Vec<usize>,
}
