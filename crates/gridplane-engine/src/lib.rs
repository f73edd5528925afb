//! Gridplane engine crate.
//!
//! Generates a tessellated grid mesh, bootstraps a GLSL shader program and
//! draws the grid as an animated wireframe through wgpu, inside a winit
//! window paced by a fixed-rate redraw clock.

pub mod anim;
pub mod core;
pub mod device;
pub mod error;
pub mod logging;
pub mod mesh;
pub mod render;
pub mod shader;
pub mod time;
pub mod window;

pub use error::{GridError, GridResult, Stage};
