//! Reconstruction verification utilities
//!
//! Objective measurements for checking how closely a processed stream
//! tracks its reference, without manual listening. The comparison runs
//! over the common prefix of the two streams so a zero-padded tail on
//! the processed side never counts against it.

use serde::Serialize;

/// Convert linear amplitude to decibels
pub fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        f32::NEG_INFINITY
    } else {
        20.0 * linear.log10()
    }
}

/// Calculate RMS (Root Mean Square) of samples
pub fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// Calculate peak (maximum absolute value) of samples
pub fn calculate_peak(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0_f32, f32::max)
}

/// How far a processed stream strays from its reference
#[derive(Debug, Clone, Serialize)]
pub struct ReconstructionReport {
    /// Length of the common prefix the comparison ran over
    pub samples_compared: usize,
    /// Largest absolute per-sample difference
    pub max_abs_error: f32,
    /// Offset of the largest difference
    pub worst_index: usize,
    /// RMS of the per-sample differences
    pub rms_error: f32,
}

/// Compare a processed stream against its reference sample by sample.
///
/// Only the common prefix is examined; when tail handling pads or drops
/// samples the two streams legitimately differ in length.
pub fn compare_streams(reference: &[f32], produced: &[f32]) -> ReconstructionReport {
    let n = reference.len().min(produced.len());

    let mut max_abs_error = 0.0_f32;
    let mut worst_index = 0;
    let mut sum_squares = 0.0_f32;

    for i in 0..n {
        let err = (reference[i] - produced[i]).abs();
        if err > max_abs_error {
            max_abs_error = err;
            worst_index = i;
        }
        sum_squares += err * err;
    }

    let rms_error = if n == 0 {
        0.0
    } else {
        (sum_squares / n as f32).sqrt()
    };

    ReconstructionReport {
        samples_compared: n,
        max_abs_error,
        worst_index,
        rms_error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioBuffer;

    #[test]
    fn test_rms_sine_wave() {
        // A sine wave with amplitude 1.0 should have RMS of ~0.707
        let buffer = AudioBuffer::sine_wave(440.0, 1.0, 44100);
        let rms = calculate_rms(buffer.samples());
        assert!((rms - 0.707).abs() < 0.01);
    }

    #[test]
    fn test_peak_sine_wave() {
        let buffer = AudioBuffer::sine_wave(440.0, 1.0, 44100);
        let peak = calculate_peak(buffer.samples());
        assert!((peak - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_db_conversion() {
        assert!((linear_to_db(1.0) - 0.0).abs() < 0.001);
        assert!((linear_to_db(0.5) - (-6.02)).abs() < 0.1);
        assert_eq!(linear_to_db(0.0), f32::NEG_INFINITY);
    }

    #[test]
    fn test_identical_streams_have_zero_error() {
        let signal = AudioBuffer::sine_wave(440.0, 0.1, 8000);
        let report = compare_streams(signal.samples(), signal.samples());
        assert_eq!(report.samples_compared, signal.samples().len());
        assert_eq!(report.max_abs_error, 0.0);
        assert_eq!(report.rms_error, 0.0);
    }

    #[test]
    fn test_worst_offset_is_reported() {
        let reference = [0.0, 0.0, 0.0, 0.0];
        let produced = [0.0, 0.1, 0.0, 0.02];
        let report = compare_streams(&reference, &produced);
        assert!((report.max_abs_error - 0.1).abs() < 1e-7);
        assert_eq!(report.worst_index, 1);
    }

    #[test]
    fn test_padded_tail_is_ignored() {
        let reference = [0.5, -0.5, 0.25];
        let produced = [0.5, -0.5, 0.25, 0.0, 0.0];
        let report = compare_streams(&reference, &produced);
        assert_eq!(report.samples_compared, 3);
        assert_eq!(report.max_abs_error, 0.0);
    }

    #[test]
    fn test_empty_streams() {
        let report = compare_streams(&[], &[]);
        assert_eq!(report.samples_compared, 0);
        assert_eq!(report.max_abs_error, 0.0);
        assert_eq!(report.rms_error, 0.0);
    }
}
