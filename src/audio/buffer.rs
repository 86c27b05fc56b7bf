//! In-memory audio container
//!
//! AudioBuffer holds a whole decoded clip. The streaming path goes through
//! [`crate::audio::WavSource`] instead; buffers are for fixtures and for the
//! post-run verification pass, which needs both signals fully in memory.

use crate::error::{ResynthError, Result};

/// Audio sample data with metadata
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    /// Interleaved audio samples normalized to -1.0..1.0
    samples: Vec<f32>,
    /// Number of audio channels (1 = mono, 2 = stereo)
    channels: u16,
    /// Sample rate in Hz
    sample_rate: u32,
}

impl AudioBuffer {
    /// Create a new audio buffer with the given parameters.
    ///
    /// An empty sample vector is allowed; a zero-length clip is a legitimate
    /// (if degenerate) input to the pipeline.
    pub fn new(samples: Vec<f32>, channels: u16, sample_rate: u32) -> Result<Self> {
        if channels == 0 {
            return Err(ResynthError::InvalidConfiguration {
                reason: "channel count must be positive".to_string(),
            });
        }
        if samples.len() % channels as usize != 0 {
            return Err(ResynthError::InvalidConfiguration {
                reason: format!(
                    "sample count {} is not divisible by channel count {}",
                    samples.len(),
                    channels
                ),
            });
        }
        Ok(Self {
            samples,
            channels,
            sample_rate,
        })
    }

    /// Create a silent mono buffer with the given duration
    pub fn silence(duration_secs: f32, sample_rate: u32) -> Self {
        let num_samples = (duration_secs * sample_rate as f32) as usize;
        Self {
            samples: vec![0.0; num_samples],
            channels: 1,
            sample_rate,
        }
    }

    /// Create a sine wave test tone
    pub fn sine_wave(frequency: f32, duration_secs: f32, sample_rate: u32) -> Self {
        let num_samples = (duration_secs * sample_rate as f32) as usize;
        let mut samples = Vec::with_capacity(num_samples);

        for i in 0..num_samples {
            let t = i as f32 / sample_rate as f32;
            let sample = (2.0 * std::f32::consts::PI * frequency * t).sin();
            samples.push(sample);
        }

        Self {
            samples,
            channels: 1,
            sample_rate,
        }
    }

    /// Get a reference to the samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Get the number of channels
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Get the sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get the number of frames (samples per channel)
    pub fn num_frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Get the duration in seconds
    pub fn duration(&self) -> f32 {
        self.num_frames() as f32 / self.sample_rate as f32
    }

    /// Fold all channels down to one by averaging each frame.
    ///
    /// This mirrors what the streaming source does on the way into the
    /// pipeline, so verification can rebuild the exact reference signal.
    pub fn downmix_mono(&self) -> Vec<f32> {
        if self.channels == 1 {
            return self.samples.clone();
        }
        let channels = self.channels as usize;
        self.samples
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    }

    /// Check if buffers are approximately equal within tolerance
    pub fn is_approx_equal(&self, other: &AudioBuffer, tolerance: f32) -> bool {
        if self.channels != other.channels || self.sample_rate != other.sample_rate {
            return false;
        }
        if self.samples.len() != other.samples.len() {
            return false;
        }
        self.samples
            .iter()
            .zip(other.samples.iter())
            .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sine_wave_generation() {
        let buffer = AudioBuffer::sine_wave(440.0, 1.0, 44100);
        assert_eq!(buffer.channels(), 1);
        assert_eq!(buffer.sample_rate(), 44100);
        assert_eq!(buffer.num_frames(), 44100);
        assert!((buffer.duration() - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_silence_generation() {
        let buffer = AudioBuffer::silence(2.0, 48000);
        assert_eq!(buffer.num_frames(), 96000);
        assert!(buffer.samples().iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_empty_buffer_is_valid() {
        let buffer = AudioBuffer::new(vec![], 1, 44100).unwrap();
        assert_eq!(buffer.num_frames(), 0);
        assert_eq!(buffer.duration(), 0.0);
    }

    #[test]
    fn test_ragged_interleaving_rejected() {
        let result = AudioBuffer::new(vec![1.0, 2.0, 3.0], 2, 44100);
        assert!(matches!(
            result,
            Err(ResynthError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_downmix_averages_frames() {
        let samples = vec![1.0, 0.0, 0.5, 0.5, -1.0, 1.0]; // L, R pairs
        let buffer = AudioBuffer::new(samples, 2, 44100).unwrap();
        assert_eq!(buffer.downmix_mono(), vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_downmix_of_mono_is_copy() {
        let buffer = AudioBuffer::new(vec![0.25, -0.25], 1, 8000).unwrap();
        assert_eq!(buffer.downmix_mono(), buffer.samples());
    }

    #[test]
    fn test_approx_equality_tolerance() {
        let a = AudioBuffer::new(vec![0.5, -0.5], 1, 44100).unwrap();
        let b = AudioBuffer::new(vec![0.5005, -0.4995], 1, 44100).unwrap();
        assert!(a.is_approx_equal(&b, 0.001));
        assert!(!a.is_approx_equal(&b, 0.0001));
    }
}
