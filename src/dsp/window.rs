//! Window functions applied before the forward transform
//!
//! Coefficients are computed once at stage construction and reused for
//! every block. The symmetric forms are used throughout.

use std::f32::consts::PI;

use serde::Serialize;

/// Tapering function multiplied into each block ahead of the forward
/// transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum WindowFunction {
    /// All-ones window; the transform sees the raw block. The only
    /// choice under which the round trip is the identity.
    Rectangular,
    /// 0.5 - 0.5*cos(2πn/(N-1))
    Hann,
    /// 0.54 - 0.46*cos(2πn/(N-1))
    Hamming,
    /// Classic 3-term Blackman
    Blackman,
    /// 4-term Blackman-Harris, -92 dB sidelobes
    BlackmanHarris,
}

impl WindowFunction {
    /// Generate the coefficient sequence for a block of `len` samples.
    pub fn coefficients(&self, len: usize) -> Vec<f32> {
        match self {
            WindowFunction::Rectangular => vec![1.0; len],
            WindowFunction::Hann => cosine_sum(len, &[0.5, 0.5]),
            WindowFunction::Hamming => cosine_sum(len, &[0.54, 0.46]),
            WindowFunction::Blackman => cosine_sum(len, &[0.42, 0.5, 0.08]),
            WindowFunction::BlackmanHarris => {
                cosine_sum(len, &[0.35875, 0.48829, 0.14128, 0.01168])
            }
        }
    }

    /// True when applying this window leaves every sample unchanged.
    pub fn is_unity(&self) -> bool {
        matches!(self, WindowFunction::Rectangular)
    }
}

/// Evaluate a generalized cosine-sum window with alternating-sign terms:
/// w[n] = a0 - a1*cos(x) + a2*cos(2x) - a3*cos(3x), x = 2πn/(N-1).
fn cosine_sum(len: usize, terms: &[f32]) -> Vec<f32> {
    if len == 0 {
        return Vec::new();
    }
    if len == 1 {
        return vec![1.0];
    }

    let n_minus_1 = (len - 1) as f32;
    (0..len)
        .map(|n| {
            let x = 2.0 * PI * n as f32 / n_minus_1;
            terms
                .iter()
                .enumerate()
                .map(|(k, &a)| {
                    let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
                    sign * a * (k as f32 * x).cos()
                })
                .sum()
        })
        .collect()
}
