//! Per-frame animation parameter.

mod oscillator;

pub use oscillator::{Oscillator, OscillatorConfig};
