//! Procedural grid mesh.
//!
//! Produces the vertex positions and triangle indices for a regular,
//! subdivided square in one deterministic pass. No GPU access happens here;
//! the renderer uploads the byte views as static buffers.

mod grid;
mod wireframe;

pub use grid::{generate, GridMesh, MAX_RESOLUTION};
