//! Beat spectrogram: a sliding-window periodicity map
//!
//! A single beat spectrum assumes one stationary repeating period for the
//! whole signal. Sliding a centered window across the time frames and
//! re-computing the beat spectrum per position lets the period estimate
//! track slow tempo and structure changes, trading lag resolution for
//! locality via the window/hop pair.
//!
//! Each sampled column is the per-bin unbiased autocorrelation of the
//! windowed power spectrogram, averaged across frequency bins. Positions
//! between samples are never computed.

use crate::error::SeparationError;
use crate::periodicity::autocorrelation::unbiased_autocorrelation;
use crate::periodicity::BeatSpectrogram;

/// Build the beat spectrogram of a frame-major power spectrogram.
///
/// The time axis is implicitly zero-padded by `ceil((W-1)/2)` frames before
/// and `floor((W-1)/2)` after, so a centered window of `window_frames`
/// frames is valid at every position. Positions step by `hop_frames`
/// starting at frame 0; the final frame is always sampled.
///
/// `progress` is called once per sampled position with
/// `(completed, total)`; returning `false` cancels the computation.
///
/// # Errors
///
/// Returns `SeparationError::InvalidConfig` for a zero window or hop,
/// `SeparationError::ProcessingError` for ragged input rows, and
/// `SeparationError::Cancelled` if the progress callback requests it.
pub fn build(
    power_spectrogram: &[Vec<f32>],
    window_frames: usize,
    hop_frames: usize,
    progress: &mut dyn FnMut(usize, usize) -> bool,
) -> Result<BeatSpectrogram, SeparationError> {
    if window_frames == 0 {
        return Err(SeparationError::InvalidConfig(
            "Adaptive window must span at least one frame".to_string(),
        ));
    }
    if hop_frames == 0 {
        return Err(SeparationError::InvalidConfig(
            "Adaptive hop must span at least one frame".to_string(),
        ));
    }

    let num_frames = power_spectrogram.len();
    if num_frames == 0 {
        return Ok(BeatSpectrogram {
            window_frames,
            num_frames: 0,
            columns: Vec::new(),
            sampled_frames: Vec::new(),
        });
    }

    let num_bins = power_spectrogram[0].len();
    for (index, row) in power_spectrogram.iter().enumerate() {
        if row.len() != num_bins {
            return Err(SeparationError::ProcessingError(format!(
                "Power spectrogram frame {} has {} bins, expected {}",
                index,
                row.len(),
                num_bins
            )));
        }
    }

    let mut sampled_frames: Vec<usize> = (0..num_frames).step_by(hop_frames).collect();
    if sampled_frames.last() != Some(&(num_frames - 1)) {
        sampled_frames.push(num_frames - 1);
    }

    log::debug!(
        "Beat spectrogram: {} frames x {} bins, window {} frames, hop {} frames, {} sampled positions",
        num_frames,
        num_bins,
        window_frames,
        hop_frames,
        sampled_frames.len()
    );

    // Leading zero-pad of the centered window.
    let lead = window_frames / 2; // == ceil((window_frames - 1) / 2)

    let mut columns = vec![vec![0.0f32; window_frames]; num_frames];
    let mut series = vec![vec![0.0f32; window_frames]; num_bins];

    for (completed, &position) in sampled_frames.iter().enumerate() {
        // Gather the centered sub-window, transposed to per-bin time series.
        for t in 0..window_frames {
            let padded_index = position + t;
            let frame = match padded_index.checked_sub(lead) {
                Some(frame) if frame < num_frames => Some(frame),
                _ => None,
            };
            match frame {
                Some(frame) => {
                    for (bin, column) in series.iter_mut().enumerate() {
                        column[t] = power_spectrogram[frame][bin];
                    }
                }
                None => {
                    for column in series.iter_mut() {
                        column[t] = 0.0;
                    }
                }
            }
        }

        let lag_profiles = unbiased_autocorrelation(&series)?;

        // One beat spectrum: lag profile averaged across all bins.
        let beat_column = &mut columns[position];
        let bin_scale = 1.0 / num_bins as f32;
        for profile in &lag_profiles {
            for (slot, &value) in beat_column.iter_mut().zip(profile.iter()) {
                *slot += value * bin_scale;
            }
        }

        if !progress(completed + 1, sampled_frames.len()) {
            return Err(SeparationError::Cancelled);
        }
    }

    Ok(BeatSpectrogram {
        window_frames,
        num_frames,
        columns,
        sampled_frames,
    })
}
