//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the single Window, wires them to the GPU
//! layer, and paces redraws with a `RedrawClock`.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
