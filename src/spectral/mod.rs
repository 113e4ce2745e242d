//! Windowed time-frequency analysis and synthesis
//!
//! The window is fixed by the sample rate; analysis and synthesis share the
//! constant-overlap-add discipline described in [`window`].

pub mod stft;
pub mod window;
