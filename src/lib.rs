//! Resynth - FFT round-trip verification harness
//!
//! Resynth streams an audio clip through a cascade of forward/inverse
//! FFT stages and writes the resynthesized signal back out, so the
//! transform pair can be checked for transparency at any cascade depth.
//!
//! # Architecture
//!
//! The pipeline is a straight line with no fan-out:
//! - Source: WAV file decoded and downmixed to a mono sample stream
//! - Chain: N identical window/FFT/IFFT/renormalize stages
//! - Sink: raw little-endian `f32` samples, headerless
//!
//! Each stage buffers to its block size internally, so the stream can be
//! fed in runs of any length and the output is invariant to the chunking.

pub mod audio;
pub mod config;
pub mod dsp;
pub mod error;
pub mod pipeline;

pub use audio::AudioBuffer;
pub use config::{PipelineConfig, TailPolicy, DEFAULT_WINDOW_SIZE};
pub use dsp::{FftRoundTrip, StageChain, WindowFunction};
pub use error::{ResynthError, Result};
pub use pipeline::{Pipeline, RunStats};
