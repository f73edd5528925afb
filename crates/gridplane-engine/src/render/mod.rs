//! GPU rendering subsystem.
//!
//! `GridRenderer` owns every GPU object the grid needs (buffers, uniform,
//! pipeline) and records one draw per frame into a `RenderTarget`.
//!
//! Convention:
//! - mesh positions are already in clip space (`[-0.5, 0.5]` on x and y)
//! - the viewport always covers the whole surface

mod grid;
mod target;

pub use target::RenderTarget;
pub use grid::{GridRenderer, WireframeMode};
