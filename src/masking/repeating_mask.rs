//! Period-locked median masking
//!
//! For each frame, the frames offset by integer multiples of that frame's
//! repeating period are gathered and the element-wise median across them
//! models the "typical" repeating content. The model is clamped to the
//! observed magnitude (the background estimate must never exceed what was
//! observed) and turned into a soft mask by an ε-guarded ratio, so silence
//! maps to a mask of 1 (pass-through) instead of 0/0.

use crate::error::SeparationError;

/// Guards the mask ratio against division by zero; keeps 0/0 == 1.
const MASK_EPSILON: f32 = 1e-16;

/// Centered integer offset bounds for a median filter of order `k`:
/// `(1 - ceil(k/2)) ..= floor(k/2)`.
///
/// Odd orders are symmetric (k=3 gives -1..=1); even orders carry one extra
/// step forward (k=4 gives -1..=2). The asymmetry is deliberate and must
/// not be rounded to a symmetric set.
pub(crate) fn offset_bounds(filter_order: usize) -> (i64, i64) {
    let half_up = ((filter_order + 1) / 2) as i64; // ceil(k/2)
    let half_down = (filter_order / 2) as i64; // floor(k/2)
    (1 - half_up, half_down)
}

/// Derive the repeating soft mask from a frame-major magnitude spectrogram
/// and the per-frame period map.
///
/// Candidate frames falling outside the valid frame range are discarded;
/// the frame itself (offset 0) always survives, so the candidate set is
/// never empty. An even number of surviving candidates takes the mean of
/// the two middle values as the median.
///
/// `progress` is called once per frame with `(completed, total)`; returning
/// `false` cancels the computation.
///
/// # Errors
///
/// Returns `SeparationError::InvalidConfig` for a zero filter order,
/// `SeparationError::ProcessingError` for shape mismatches, and
/// `SeparationError::Cancelled` if the progress callback requests it.
pub fn repeating_mask(
    magnitude: &[Vec<f32>],
    periods: &[usize],
    filter_order: usize,
    progress: &mut dyn FnMut(usize, usize) -> bool,
) -> Result<Vec<Vec<f32>>, SeparationError> {
    if filter_order == 0 {
        return Err(SeparationError::InvalidConfig(
            "Median filter order must be positive".to_string(),
        ));
    }
    let num_frames = magnitude.len();
    if periods.len() != num_frames {
        return Err(SeparationError::ProcessingError(format!(
            "Period map covers {} frames, magnitude spectrogram has {}",
            periods.len(),
            num_frames
        )));
    }

    let num_bins = magnitude.first().map_or(0, Vec::len);
    for (index, row) in magnitude.iter().enumerate() {
        if row.len() != num_bins {
            return Err(SeparationError::ProcessingError(format!(
                "Magnitude frame {} has {} bins, expected {}",
                index,
                row.len(),
                num_bins
            )));
        }
    }

    let (first_offset, last_offset) = offset_bounds(filter_order);
    log::debug!(
        "Repeating mask: {} frames, filter order {} (offsets {}..={})",
        num_frames,
        filter_order,
        first_offset,
        last_offset
    );

    let mut mask = Vec::with_capacity(num_frames);
    let mut candidates: Vec<usize> = Vec::with_capacity(filter_order);
    let mut gathered: Vec<f32> = Vec::with_capacity(filter_order);

    for frame in 0..num_frames {
        let period = periods[frame] as i64;

        candidates.clear();
        for offset in first_offset..=last_offset {
            let index = frame as i64 + offset * period;
            if index >= 0 && (index as usize) < num_frames {
                candidates.push(index as usize);
            }
        }

        let observed_row = &magnitude[frame];
        let mut row = Vec::with_capacity(num_bins);
        for (bin, &observed) in observed_row.iter().enumerate() {
            gathered.clear();
            for &candidate in &candidates {
                gathered.push(magnitude[candidate][bin]);
            }
            let model = median_in_place(&mut gathered);
            // The background model cannot overshoot the observation.
            let clamped = model.min(observed);
            row.push((clamped + MASK_EPSILON) / (observed + MASK_EPSILON));
        }
        mask.push(row);

        if !progress(frame + 1, num_frames) {
            return Err(SeparationError::Cancelled);
        }
    }

    Ok(mask)
}

/// Median of a non-empty scratch buffer; even counts average the two middle
/// values. Sorts the buffer.
fn median_in_place(values: &mut [f32]) -> f32 {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noise_magnitude(num_frames: usize, num_bins: usize, mut seed: u32) -> Vec<Vec<f32>> {
        (0..num_frames)
            .map(|_| {
                (0..num_bins)
                    .map(|_| {
                        seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
                        (seed >> 8) as f32 / (1 << 24) as f32
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_offset_bounds() {
        assert_eq!(offset_bounds(1), (0, 0));
        assert_eq!(offset_bounds(2), (0, 1));
        assert_eq!(offset_bounds(3), (-1, 1));
        assert_eq!(offset_bounds(4), (-1, 2));
        assert_eq!(offset_bounds(5), (-2, 2));
        assert_eq!(offset_bounds(7), (-3, 3));
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median_in_place(&mut [3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median_in_place(&mut [4.0, 1.0, 2.0, 3.0]), 2.5);
        assert_eq!(median_in_place(&mut [5.0]), 5.0);
    }

    #[test]
    fn test_mask_bounded() {
        let magnitude = noise_magnitude(40, 9, 2024);
        let periods = vec![4usize; 40];
        let mask = repeating_mask(&magnitude, &periods, 5, &mut |_, _| true).unwrap();
        for row in &mask {
            for &value in row {
                assert!((0.0..=1.0).contains(&value), "mask value {}", value);
            }
        }
    }

    #[test]
    fn test_repeating_content_passes_through() {
        // Identical frames at the period: median equals the observation.
        let magnitude = vec![vec![0.5f32, 2.0, 0.1]; 12];
        let periods = vec![3usize; 12];
        let mask = repeating_mask(&magnitude, &periods, 3, &mut |_, _| true).unwrap();
        for row in &mask {
            for &value in row {
                assert!((value - 1.0).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_outlier_frame_suppressed() {
        // A loud non-repeating burst in frame 5; its neighbors at the
        // period are quiet, so the median model stays low.
        let mut magnitude = vec![vec![0.1f32]; 11];
        magnitude[5] = vec![10.0];
        let periods = vec![2usize; 11];
        let mask = repeating_mask(&magnitude, &periods, 3, &mut |_, _| true).unwrap();
        // Candidates for frame 5 are frames {3, 5, 7}: median 0.1.
        let expected = (0.1 + MASK_EPSILON) / (10.0 + MASK_EPSILON);
        assert!((mask[5][0] - expected).abs() < 1e-5);
        // Quiet repeating frames keep their content.
        assert!((mask[3][0] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_model_clamped_to_observation() {
        // Observation below the median of its candidates: mask must be 1,
        // never amplifying.
        let mut magnitude = vec![vec![5.0f32]; 9];
        magnitude[4] = vec![1.0];
        let periods = vec![2usize; 9];
        let mask = repeating_mask(&magnitude, &periods, 3, &mut |_, _| true).unwrap();
        assert!((mask[4][0] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_silence_maps_to_unity_mask() {
        let magnitude = vec![vec![0.0f32; 4]; 8];
        let periods = vec![2usize; 8];
        let mask = repeating_mask(&magnitude, &periods, 5, &mut |_, _| true).unwrap();
        for row in &mask {
            assert!(row.iter().all(|&v| (v - 1.0).abs() < 1e-6));
        }
    }

    #[test]
    fn test_edge_candidates_discarded() {
        // Frame 0 with period 3 and order 3: offset -1 lands at -3,
        // leaving candidates {0, 3}.
        let mut magnitude = vec![vec![0.0f32]; 6];
        magnitude[0] = vec![2.0];
        magnitude[3] = vec![4.0];
        let periods = vec![3usize; 6];
        let mask = repeating_mask(&magnitude, &periods, 3, &mut |_, _| true).unwrap();
        // Median of {2, 4} = 3, clamped to 2 -> mask 1.
        assert!((mask[0][0] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_zero_filter_order_rejected() {
        let magnitude = vec![vec![1.0f32]; 4];
        let periods = vec![1usize; 4];
        assert!(repeating_mask(&magnitude, &periods, 0, &mut |_, _| true).is_err());
    }

    #[test]
    fn test_period_map_length_mismatch_rejected() {
        let magnitude = vec![vec![1.0f32]; 4];
        let periods = vec![1usize; 3];
        assert!(repeating_mask(&magnitude, &periods, 3, &mut |_, _| true).is_err());
    }

    #[test]
    fn test_cancellation() {
        let magnitude = vec![vec![1.0f32]; 4];
        let periods = vec![1usize; 4];
        let result = repeating_mask(&magnitude, &periods, 3, &mut |_, _| false);
        assert!(matches!(result, Err(SeparationError::Cancelled)));
    }
}
