//! Repeating-background mask synthesis and signal resynthesis
//!
//! Turns the per-frame period map into a soft spectral mask (median model
//! of the repeating content, clamped and ratio-normalized) and applies it
//! to the complex spectrogram to rebuild the background waveform.

pub mod repeating_mask;
pub mod resynthesis;
