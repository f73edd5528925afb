//! Shader pipeline bootstrap.
//!
//! Turns two GLSL source texts into a linked program:
//! - each stage is parsed and validated on its own (`compile_stage`)
//! - the pair is checked as a whole (`link`), which also reflects the
//!   `s_vPosition` attribute and the `var` uniform
//! - the linked pair is uploaded as wgpu shader modules (`ShaderProgram`)

mod compile;
mod link;
mod program;
mod source;

pub use compile::{compile_stage, CompiledStage};
pub use link::{
    link, AttributeSlot, ProgramInterface, UniformBlockInfo, UniformSlot, ANIMATION_UNIFORM,
    POSITION_ATTRIBUTE,
};
pub use program::{LinkedProgram, ShaderProgram};
pub use source::load_source;
