//! Pipeline configuration

use serde::Serialize;

use crate::dsp::window::WindowFunction;
use crate::error::{ResynthError, Result};

/// Window size used when the caller does not specify one.
pub const DEFAULT_WINDOW_SIZE: usize = 1024;

/// What a stage does with a partial block at end-of-stream.
///
/// The choice fixes the output length for inputs that are not a
/// multiple of the window size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TailPolicy {
    /// Zero-fill the partial block to full window size and emit it.
    /// Output length is `ceil(len / window) * window`.
    PadWithZero,
    /// Drop the remainder; only complete blocks are emitted.
    /// Output length is `floor(len / window) * window`.
    DiscardRemainder,
}

/// Configuration for one pipeline
#[derive(Debug, Clone, Serialize)]
pub struct PipelineConfig {
    /// Samples per transform block (default: 1024)
    pub window_size: usize,

    /// Number of cascaded FFT/IFFT stages (default: 1)
    pub fft_count: usize,

    /// Window applied before each forward transform (default: Rectangular)
    ///
    /// A tapering window is applied on the way into the forward transform
    /// only and is never compensated, so anything but Rectangular reshapes
    /// the signal per block.
    pub window: WindowFunction,

    /// End-of-stream handling for partial blocks (default: PadWithZero)
    pub tail: TailPolicy,

    /// Largest inverse-transform imaginary residue tolerated per sample.
    /// None (the default) truncates silently; Some(t) makes an exceedance
    /// a fatal TransformFailure.
    pub imag_tolerance: Option<f32>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            fft_count: 1,
            window: WindowFunction::Rectangular,
            tail: TailPolicy::PadWithZero,
            imag_tolerance: None,
        }
    }
}

impl PipelineConfig {
    /// Check the construction-time invariants.
    ///
    /// This runs before any stage is built; a failure here means the
    /// pipeline never starts.
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(ResynthError::InvalidConfiguration {
                reason: "window_size must be positive".to_string(),
            });
        }
        if self.fft_count == 0 {
            return Err(ResynthError::InvalidConfiguration {
                reason: "fft_count must be positive".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.window_size, 1024);
        assert_eq!(config.fft_count, 1);
        assert_eq!(config.window, WindowFunction::Rectangular);
        assert_eq!(config.tail, TailPolicy::PadWithZero);
        assert!(config.imag_tolerance.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_window_size_rejected() {
        let config = PipelineConfig {
            window_size: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ResynthError::InvalidConfiguration { .. }));
        assert!(err.to_string().contains("window_size"));
    }

    #[test]
    fn test_zero_fft_count_rejected() {
        let config = PipelineConfig {
            fft_count: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("fft_count must be positive"));
    }
}
