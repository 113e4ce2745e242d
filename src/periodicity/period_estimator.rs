//! Per-frame repeating-period estimation
//!
//! Picks, for each sampled beat-spectrogram column, the lag with the
//! largest periodicity value inside the caller's inclusive lag range, then
//! expands the sampled estimates to every frame.
//!
//! Two behaviorally significant rules are fixed here:
//! - **First-max tie-breaking**: when several lags share the maximum value,
//!   the lowest lag wins. A fully degenerate column (all values equal)
//!   therefore deterministically yields `min_lag`.
//! - **Nearest-neighbor hold**: frames between sampled columns take the
//!   period of the nearest sampled column, ties going to the earlier one.
//!   Beat-spectrogram columns at unsampled positions are never read.

use crate::error::SeparationError;
use crate::periodicity::BeatSpectrogram;

/// Estimate one repeating period (in frames) per frame.
///
/// Lag 0 is trivially maximal ("no shift") and excluded by requiring
/// `min_lag >= 1`; estimates lie in `min_lag..=max_lag`.
///
/// # Errors
///
/// Returns `SeparationError::InvalidConfig` if the lag range is empty,
/// touches lag 0, or exceeds the beat spectrogram's lag axis.
pub fn estimate_periods(
    beat: &BeatSpectrogram,
    min_lag: usize,
    max_lag: usize,
) -> Result<Vec<usize>, SeparationError> {
    if min_lag == 0 {
        return Err(SeparationError::InvalidConfig(
            "Minimum period lag must be at least 1 (lag 0 is the trivial maximum)".to_string(),
        ));
    }
    if min_lag > max_lag {
        return Err(SeparationError::InvalidConfig(format!(
            "Empty period lag range [{}, {}]",
            min_lag, max_lag
        )));
    }
    if max_lag >= beat.window_frames {
        return Err(SeparationError::InvalidConfig(format!(
            "Maximum period lag {} exceeds the adaptive window of {} frames",
            max_lag, beat.window_frames
        )));
    }

    if beat.num_frames == 0 {
        return Ok(Vec::new());
    }
    if beat.sampled_frames.is_empty() {
        return Err(SeparationError::ProcessingError(
            "Beat spectrogram has frames but no sampled positions".to_string(),
        ));
    }

    let mut sampled_periods = Vec::with_capacity(beat.sampled_frames.len());
    for &position in &beat.sampled_frames {
        let column = &beat.columns[position];
        let mut best_lag = min_lag;
        let mut best_value = f32::NEG_INFINITY;
        for lag in min_lag..=max_lag {
            let value = column[lag];
            // Strict comparison keeps the first (lowest) lag on ties.
            if value > best_value {
                best_value = value;
                best_lag = lag;
            }
        }
        if best_value <= 0.0 {
            log::warn!(
                "Degenerate beat spectrum at frame {}; holding lag {}",
                position,
                best_lag
            );
        }
        sampled_periods.push(best_lag);
    }

    // Nearest-neighbor hold over the full frame range.
    let mut periods = Vec::with_capacity(beat.num_frames);
    let mut nearest = 0usize;
    for frame in 0..beat.num_frames {
        while nearest + 1 < beat.sampled_frames.len() {
            let current = beat.sampled_frames[nearest].abs_diff(frame);
            let next = beat.sampled_frames[nearest + 1].abs_diff(frame);
            if next < current {
                nearest += 1;
            } else {
                break;
            }
        }
        periods.push(sampled_periods[nearest]);
    }

    Ok(periods)
}
