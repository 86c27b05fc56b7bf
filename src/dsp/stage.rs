//! Windowed FFT/IFFT round-trip stage
//!
//! A stage consumes a scalar sample stream and produces one of the same
//! nominal rate. Per block of `window_size` samples it:
//!
//! 1. accumulates exactly `window_size` input samples (emitting nothing
//!    until a full block is available),
//! 2. multiplies element-wise by the window coefficients and runs the
//!    forward transform,
//! 3. runs the inverse transform on the spectrum,
//! 4. scales every element by `1 / window_size` to undo the gain of the
//!    unnormalized transform pair,
//! 5. keeps the real part of each element as the output sample.
//!
//! The imaginary parts left after step 4 are numerical noise for a
//! well-behaved transform pair; they are dropped, tracked as a residue
//! statistic, and optionally enforced against a tolerance.

use std::fmt;
use std::sync::Arc;

use log::{debug, warn};
use num_traits::Zero;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::config::{PipelineConfig, TailPolicy};
use crate::error::{ResynthError, Result};

/// Imaginary residue above which a single warning is logged for the run.
const IMAG_WARN_THRESHOLD: f32 = 1e-3;

/// One windowed forward/inverse transform round trip over a sample stream.
pub struct FftRoundTrip {
    window_size: usize,
    coefficients: Vec<f32>,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
    tail: TailPolicy,
    imag_tolerance: Option<f32>,
    /// Input samples accumulated toward the next full block
    pending: Vec<f32>,
    /// In-place transform workspace, one block long
    workspace: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    blocks: u64,
    max_imag_residue: f32,
    residue_warned: bool,
}

impl FftRoundTrip {
    /// Build a stage with its own transform planner.
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        let mut planner = FftPlanner::new();
        Self::with_planner(config, &mut planner)
    }

    /// Build a stage from a shared planner so cascaded stages of the same
    /// window size reuse one set of twiddle tables.
    pub fn with_planner(config: &PipelineConfig, planner: &mut FftPlanner<f32>) -> Result<Self> {
        if config.window_size == 0 {
            return Err(ResynthError::InvalidConfiguration {
                reason: "window_size must be positive".to_string(),
            });
        }

        let window_size = config.window_size;
        let forward = planner.plan_fft_forward(window_size);
        let inverse = planner.plan_fft_inverse(window_size);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());

        Ok(Self {
            window_size,
            coefficients: config.window.coefficients(window_size),
            forward,
            inverse,
            tail: config.tail,
            imag_tolerance: config.imag_tolerance,
            pending: Vec::with_capacity(window_size),
            workspace: vec![Complex::zero(); window_size],
            scratch: vec![Complex::zero(); scratch_len],
            blocks: 0,
            max_imag_residue: 0.0,
            residue_warned: false,
        })
    }

    /// Feed input samples. One full block of output is appended to `out`
    /// per completed block of input; anything short of a block stays
    /// buffered until more samples arrive or [`finish`](Self::finish) runs.
    pub fn push(&mut self, input: &[f32], out: &mut Vec<f32>) -> Result<()> {
        let mut rest = input;
        while !rest.is_empty() {
            let need = self.window_size - self.pending.len();
            let take = need.min(rest.len());
            self.pending.extend_from_slice(&rest[..take]);
            rest = &rest[take..];

            if self.pending.len() == self.window_size {
                self.process_block(out)?;
            }
        }
        Ok(())
    }

    /// Signal end-of-stream. A partial block is zero-padded and emitted or
    /// discarded according to the configured tail policy; an empty buffer
    /// emits nothing under either policy.
    pub fn finish(&mut self, out: &mut Vec<f32>) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        match self.tail {
            TailPolicy::PadWithZero => {
                self.pending.resize(self.window_size, 0.0);
                self.process_block(out)
            }
            TailPolicy::DiscardRemainder => {
                debug!(
                    "discarding {} tail samples short of a full block",
                    self.pending.len()
                );
                self.pending.clear();
                Ok(())
            }
        }
    }

    /// Run one accumulated block through the transform pair.
    fn process_block(&mut self, out: &mut Vec<f32>) -> Result<()> {
        debug_assert_eq!(self.pending.len(), self.window_size);

        for ((slot, &sample), &coeff) in self
            .workspace
            .iter_mut()
            .zip(&self.pending)
            .zip(&self.coefficients)
        {
            *slot = Complex::new(sample * coeff, 0.0);
        }
        // The block now lives in the workspace; clearing here keeps the
        // stage pushable even when the residue check below rejects it.
        self.pending.clear();

        self.forward
            .process_with_scratch(&mut self.workspace, &mut self.scratch);
        self.inverse
            .process_with_scratch(&mut self.workspace, &mut self.scratch);

        // The unnormalized pair scales by window_size; divide it back out.
        let scale = 1.0 / self.window_size as f32;

        let mut block_residue = 0.0f32;
        for value in &self.workspace {
            block_residue = block_residue.max((value.im * scale).abs());
        }
        self.max_imag_residue = self.max_imag_residue.max(block_residue);

        if let Some(tolerance) = self.imag_tolerance {
            if block_residue > tolerance {
                return Err(ResynthError::TransformFailure {
                    details: format!(
                        "imaginary residue {:.3e} after inverse transform exceeds tolerance {:.3e}",
                        block_residue, tolerance
                    ),
                });
            }
        }
        if block_residue > IMAG_WARN_THRESHOLD && !self.residue_warned {
            warn!(
                "inverse transform left imaginary residue {:.3e} (window_size {})",
                block_residue, self.window_size
            );
            self.residue_warned = true;
        }

        out.extend(self.workspace.iter().map(|value| value.re * scale));
        self.blocks += 1;
        Ok(())
    }

    /// Samples per transform block.
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Input samples currently buffered toward the next block.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Blocks emitted so far.
    pub fn blocks(&self) -> u64 {
        self.blocks
    }

    /// Worst imaginary residue observed since construction.
    pub fn max_imag_residue(&self) -> f32 {
        self.max_imag_residue
    }
}

impl fmt::Debug for FftRoundTrip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FftRoundTrip")
            .field("window_size", &self.window_size)
            .field("tail", &self.tail)
            .field("pending", &self.pending.len())
            .field("blocks", &self.blocks)
            .finish()
    }
}
