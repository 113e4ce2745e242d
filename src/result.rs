//! Separation result types

use serde::{Deserialize, Serialize};

/// Complete separation result.
///
/// The foreground is the residual `mixture - background`, computed by the
/// caller sample-wise per channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeparationResult {
    /// Estimated repeating background, channel-major, same shape as the
    /// input signal.
    pub background: Vec<Vec<f32>>,

    /// Estimated repeating period per analysis frame, in seconds.
    pub periods_seconds: Vec<f32>,

    /// Separation metadata.
    pub metadata: SeparationMetadata,
}

/// Separation metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeparationMetadata {
    /// Input duration in seconds.
    pub duration_seconds: f32,

    /// Sample rate in Hz.
    pub sample_rate: u32,

    /// Number of channels processed.
    pub num_channels: usize,

    /// Number of analysis frames.
    pub num_frames: usize,

    /// Analysis window length in samples.
    pub window_length: usize,

    /// Analysis hop length in samples.
    pub hop_length: usize,

    /// Processing time in milliseconds.
    pub processing_time_ms: f32,

    /// Algorithm version.
    pub algorithm_version: String,
}
