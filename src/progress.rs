//! Progress reporting for the two slow pipeline stages
//!
//! The periodicity analysis is O(window² × bins) and the mask synthesis is
//! O(frames × filter order × bins); an interactive front end embedding the
//! core gets a checkpoint between their per-position iterations. Progress
//! reporting is never required for correctness: [`crate::separate`] runs
//! with a no-op callback.

/// Pipeline stage a [`Progress`] snapshot refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Sliding-window periodicity analysis (one step per sampled position).
    BeatSpectrogram,

    /// Period-locked median masking (one step per frame per channel).
    MaskSynthesis,
}

/// Snapshot handed to the progress callback at each checkpoint.
///
/// The callback returns `true` to continue and `false` to cancel the
/// separation with [`crate::SeparationError::Cancelled`].
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    /// Stage being executed.
    pub stage: Stage,

    /// Completed steps within the stage, starting at 1.
    pub completed: usize,

    /// Total steps in the stage.
    pub total: usize,
}
