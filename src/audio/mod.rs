//! Audio containers and stream adapters
//!
//! This module provides the audio data structures, the streaming source
//! and sink the pipeline is wired to, and reconstruction measurement.

mod buffer;
mod io;
pub mod verification;

pub use buffer::AudioBuffer;
pub use io::{load_raw, load_wav, save_wav, save_wav_with_depth, RawSink, WavSource};
pub use verification::ReconstructionReport;
