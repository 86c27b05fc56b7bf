//! Stage chain construction and cascading
//!
//! Builds N independently-owned round-trip stages and wires stage i's
//! output stream to stage i+1's input. The chain itself is the composite
//! unit: `push` is the head input port, the `out` vector the tail output.

use std::fmt;

use log::debug;
use rustfft::FftPlanner;

use crate::config::PipelineConfig;
use crate::dsp::stage::FftRoundTrip;
use crate::error::Result;

/// Linear cascade of [`FftRoundTrip`] stages.
///
/// Strictly ordered, no branching: every chunk flows through stage 0..N-1
/// in sequence, and blocks reach each stage in the exact order produced
/// upstream.
pub struct StageChain {
    stages: Vec<FftRoundTrip>,
    /// Ping-pong buffers carrying the stream between adjacent stages
    feed: Vec<f32>,
    carry: Vec<f32>,
}

impl StageChain {
    /// Validate the configuration and build all stages before any samples
    /// flow. One planner is shared so every stage reuses the same twiddle
    /// tables.
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        config.validate()?;

        let mut planner = FftPlanner::new();
        let mut stages = Vec::with_capacity(config.fft_count);
        for _ in 0..config.fft_count {
            stages.push(FftRoundTrip::with_planner(config, &mut planner)?);
        }
        debug!(
            "built chain: {} stage(s), window_size {}, window {:?}, tail {:?}",
            stages.len(),
            config.window_size,
            config.window,
            config.tail
        );

        Ok(Self {
            stages,
            feed: Vec::new(),
            carry: Vec::new(),
        })
    }

    /// Feed a chunk through every stage in order, appending whatever
    /// reaches the tail to `out`.
    pub fn push(&mut self, input: &[f32], out: &mut Vec<f32>) -> Result<()> {
        let Self {
            stages,
            feed,
            carry,
        } = self;

        feed.clear();
        feed.extend_from_slice(input);
        for stage in stages.iter_mut() {
            carry.clear();
            stage.push(feed, carry)?;
            std::mem::swap(feed, carry);
        }
        out.extend_from_slice(feed);
        Ok(())
    }

    /// Propagate end-of-stream down the chain. Each stage's tail output is
    /// pushed through the stages after it before they in turn finish, so
    /// a padded final block cascades exactly once.
    pub fn finish(&mut self, out: &mut Vec<f32>) -> Result<()> {
        let Self {
            stages,
            feed,
            carry,
        } = self;

        feed.clear();
        for stage in stages.iter_mut() {
            carry.clear();
            stage.push(feed, carry)?;
            stage.finish(carry)?;
            std::mem::swap(feed, carry);
        }
        out.extend_from_slice(feed);
        Ok(())
    }

    /// Number of stages in the cascade.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Samples per transform block.
    pub fn window_size(&self) -> usize {
        self.stages[0].window_size()
    }

    /// Blocks emitted by the final stage (i.e. blocks that reached the
    /// chain output).
    pub fn blocks_emitted(&self) -> u64 {
        self.stages.last().map(FftRoundTrip::blocks).unwrap_or(0)
    }

    /// Worst imaginary residue observed across all stages.
    pub fn max_imag_residue(&self) -> f32 {
        self.stages
            .iter()
            .map(FftRoundTrip::max_imag_residue)
            .fold(0.0, f32::max)
    }
}

impl fmt::Debug for StageChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageChain")
            .field("stages", &self.stages.len())
            .field("feed", &self.feed.len())
            .field("carry", &self.carry.len())
            .finish()
    }
}
