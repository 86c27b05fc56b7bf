//! Transform stages and chain wiring
//!
//! The processing graph is built from [`FftRoundTrip`] stages strung
//! together by a [`StageChain`]; window shapes live in [`window`].

mod chain;
mod stage;
pub mod window;

pub use chain::StageChain;
pub use stage::FftRoundTrip;
pub use window::WindowFunction;
