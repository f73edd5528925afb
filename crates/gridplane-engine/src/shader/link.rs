use std::collections::BTreeMap;

use wgpu::naga;
use wgpu::naga::{AddressSpace, Binding, Handle, Module, Type, TypeInner};

use crate::error::{GridError, GridResult, Stage};

use super::compile::CompiledStage;

/// Vertex attribute feeding the grid positions.
pub const POSITION_ATTRIBUTE: &str = "s_vPosition";

/// Scalar uniform driven by the animation each frame.
pub const ANIMATION_UNIFORM: &str = "var";

/// Resolved vertex input.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct AttributeSlot {
    pub location: u32,
    /// `None` when the declared type has no matching float vertex format.
    pub format: Option<wgpu::VertexFormat>,
}

/// The program's single uniform block, always in bind group 0.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct UniformBlockInfo {
    pub binding: u32,
    /// Size of the block in bytes.
    pub size: u32,
    pub visibility: wgpu::ShaderStages,
}

/// Resolved `f32` uniform inside the uniform block.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct UniformSlot {
    pub binding: u32,
    /// Byte offset of the scalar inside its block.
    pub offset: u32,
}

/// Interface of a linked program: the two named lookups the renderer needs,
/// plus the uniform block it has to bind.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ProgramInterface {
    pub position: Option<AttributeSlot>,
    pub uniform_block: Option<UniformBlockInfo>,
    pub var: Option<UniformSlot>,
}

#[derive(Debug)]
struct IoVar {
    location: u32,
    name: Option<String>,
    ty: Handle<Type>,
}

impl IoVar {
    fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("`{name}` (location {})", self.location),
            None => format!("location {}", self.location),
        }
    }
}

#[derive(Debug)]
struct UniformBlock {
    ty: Handle<Type>,
    name: Option<String>,
    stages: wgpu::ShaderStages,
}

/// Links a vertex and a fragment stage.
///
/// Checks that both entry points exist, that every fragment input is fed by a
/// vertex output of the same type, and that resources agree between stages.
/// Returns the reflected attribute and uniform slots on success.
pub fn link(vertex: &CompiledStage, fragment: &CompiledStage) -> GridResult<ProgramInterface> {
    if vertex.stage() != Stage::Vertex || fragment.stage() != Stage::Fragment {
        return Err(GridError::link(format!(
            "expected vertex + fragment stages, got {} + {}",
            vertex.stage(),
            fragment.stage()
        )));
    }

    let vs_entry = vertex
        .entry_point()
        .ok_or_else(|| GridError::link("vertex stage has no `main` entry point"))?;
    let fs_entry = fragment
        .entry_point()
        .ok_or_else(|| GridError::link("fragment stage has no `main` entry point"))?;

    let vs_module = vertex.module();
    let fs_module = fragment.module();

    let mut problems = Vec::new();

    // ── varyings ──────────────────────────────────────────────────────────

    let vs_outputs = outputs(vs_module, &vs_entry.function);
    for input in inputs(fs_module, &fs_entry.function) {
        match vs_outputs.iter().find(|o| o.location == input.location) {
            None => problems.push(format!(
                "fragment input {} is not written by the vertex stage",
                input.label()
            )),
            Some(output) => {
                if vs_module.types[output.ty].inner != fs_module.types[input.ty].inner {
                    problems.push(format!(
                        "fragment input {} does not match the type of vertex output {}",
                        input.label(),
                        output.label()
                    ));
                }
            }
        }
    }

    // ── resources ─────────────────────────────────────────────────────────

    let mut blocks: BTreeMap<u32, UniformBlock> = BTreeMap::new();
    collect_uniforms(vs_module, Stage::Vertex, &mut blocks, &mut problems);

    let mut fs_blocks: BTreeMap<u32, UniformBlock> = BTreeMap::new();
    collect_uniforms(fs_module, Stage::Fragment, &mut fs_blocks, &mut problems);

    // Blocks shared by both stages must agree on layout.
    let mut fs_only = BTreeMap::new();
    for (binding, fs_block) in fs_blocks {
        match blocks.get_mut(&binding) {
            Some(vs_block) => {
                if block_layout(vs_module, vs_block.ty) != block_layout(fs_module, fs_block.ty) {
                    problems.push(format!(
                        "uniform binding {binding} is declared with different layouts in the \
                         vertex and fragment stages"
                    ));
                }
                vs_block.stages |= fs_block.stages;
            }
            None => {
                fs_only.insert(binding, fs_block);
            }
        }
    }

    if blocks.len() + fs_only.len() > 1 {
        problems.push(format!(
            "program declares {} uniform blocks; only one is supported",
            blocks.len() + fs_only.len()
        ));
    }

    if !problems.is_empty() {
        return Err(GridError::link(problems.join("\n")));
    }

    let position = inputs(vs_module, &vs_entry.function)
        .into_iter()
        .find(|i| i.name.as_deref() == Some(POSITION_ATTRIBUTE))
        .map(|i| AttributeSlot {
            location: i.location,
            format: vertex_format(&vs_module.types[i.ty].inner),
        });

    // At most one block survives the checks above.
    let block = blocks
        .iter()
        .map(|(b, block)| (*b, block, vs_module))
        .chain(fs_only.iter().map(|(b, block)| (*b, block, fs_module)))
        .next();

    let uniform_block = block.map(|(binding, block, module)| UniformBlockInfo {
        binding,
        size: module.types[block.ty].inner.size(module.to_ctx()),
        visibility: block.stages,
    });

    let var = block.and_then(|(binding, block, module)| {
        find_scalar(module, block, ANIMATION_UNIFORM).map(|offset| UniformSlot { binding, offset })
    });

    Ok(ProgramInterface {
        position,
        uniform_block,
        var,
    })
}

fn location_of(binding: &Option<Binding>) -> Option<u32> {
    match binding {
        Some(Binding::Location { location, .. }) => Some(*location),
        _ => None,
    }
}

/// Flattens a location-bound value or the location-bound members of a struct.
fn flatten_io(
    module: &Module,
    name: Option<&String>,
    ty: Handle<Type>,
    binding: &Option<Binding>,
    out: &mut Vec<IoVar>,
) {
    if let Some(location) = location_of(binding) {
        out.push(IoVar {
            location,
            name: name.cloned(),
            ty,
        });
        return;
    }

    if binding.is_none() {
        if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
            for m in members {
                if let Some(location) = location_of(&m.binding) {
                    out.push(IoVar {
                        location,
                        name: m.name.clone(),
                        ty: m.ty,
                    });
                }
            }
        }
    }
}

fn inputs(module: &Module, function: &naga::Function) -> Vec<IoVar> {
    let mut out = Vec::new();
    for arg in &function.arguments {
        flatten_io(module, arg.name.as_ref(), arg.ty, &arg.binding, &mut out);
    }
    out
}

fn outputs(module: &Module, function: &naga::Function) -> Vec<IoVar> {
    let mut out = Vec::new();
    if let Some(result) = &function.result {
        flatten_io(module, None, result.ty, &result.binding, &mut out);
    }
    out
}

fn stage_flag(stage: Stage) -> wgpu::ShaderStages {
    match stage {
        Stage::Vertex => wgpu::ShaderStages::VERTEX,
        Stage::Fragment => wgpu::ShaderStages::FRAGMENT,
    }
}

fn collect_uniforms(
    module: &Module,
    stage: Stage,
    blocks: &mut BTreeMap<u32, UniformBlock>,
    problems: &mut Vec<String>,
) {
    for (_, global) in module.global_variables.iter() {
        let label = global.name.as_deref().unwrap_or("<unnamed>");
        match global.space {
            AddressSpace::Private | AddressSpace::Function | AddressSpace::WorkGroup => {}
            AddressSpace::Uniform => {
                let Some(rb) = global.binding.as_ref() else {
                    problems.push(format!("{stage} uniform `{label}` has no binding"));
                    continue;
                };
                if rb.group != 0 {
                    problems.push(format!(
                        "{stage} uniform `{label}` uses bind group {}; only group 0 is bound",
                        rb.group
                    ));
                    continue;
                }
                blocks.insert(
                    rb.binding,
                    UniformBlock {
                        ty: global.ty,
                        name: global.name.clone(),
                        stages: stage_flag(stage),
                    },
                );
            }
            _ => problems.push(format!(
                "{stage} resource `{label}` is not a uniform block and cannot be bound"
            )),
        }
    }
}

/// Comparable layout of a uniform block: total size plus named member offsets.
fn block_layout(module: &Module, ty: Handle<Type>) -> (u32, Vec<(Option<String>, u32)>) {
    let inner = &module.types[ty].inner;
    let members = match inner {
        TypeInner::Struct { members, .. } => {
            members.iter().map(|m| (m.name.clone(), m.offset)).collect()
        }
        _ => Vec::new(),
    };
    (inner.size(module.to_ctx()), members)
}

/// Byte offset of the `f32` called `name`, either the block itself or a member.
fn find_scalar(module: &Module, block: &UniformBlock, name: &str) -> Option<u32> {
    let is_f32 = |ty: Handle<Type>| {
        matches!(
            module.types[ty].inner,
            TypeInner::Scalar(naga::Scalar {
                kind: naga::ScalarKind::Float,
                width: 4,
            })
        )
    };

    if block.name.as_deref() == Some(name) && is_f32(block.ty) {
        return Some(0);
    }

    match &module.types[block.ty].inner {
        TypeInner::Struct { members, .. } => members
            .iter()
            .find(|m| m.name.as_deref() == Some(name) && is_f32(m.ty))
            .map(|m| m.offset),
        _ => None,
    }
}

fn vertex_format(inner: &TypeInner) -> Option<wgpu::VertexFormat> {
    use naga::{ScalarKind, VectorSize};

    match inner {
        TypeInner::Scalar(s) if s.kind == ScalarKind::Float && s.width == 4 => {
            Some(wgpu::VertexFormat::Float32)
        }
        TypeInner::Vector { size, scalar }
            if scalar.kind == ScalarKind::Float && scalar.width == 4 =>
        {
            Some(match size {
                VectorSize::Bi => wgpu::VertexFormat::Float32x2,
                VectorSize::Tri => wgpu::VertexFormat::Float32x3,
                VectorSize::Quad => wgpu::VertexFormat::Float32x4,
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::compile_stage;

    const VERTEX: &str = r"#version 450
layout(location = 0) in vec3 s_vPosition;
layout(set = 0, binding = 0) uniform GridParams {
    float var;
};
layout(location = 0) out float v_height;
void main() {
    v_height = s_vPosition.x * var;
    gl_Position = vec4(s_vPosition.xy, v_height, 1.0);
}
";

    const FRAGMENT: &str = r"#version 450
layout(location = 0) in float v_height;
layout(location = 0) out vec4 o_color;
void main() {
    o_color = vec4(v_height, 1.0, 1.0, 1.0);
}
";

    fn stages(vs: &str, fs: &str) -> (CompiledStage, CompiledStage) {
        (
            compile_stage(Stage::Vertex, vs).unwrap(),
            compile_stage(Stage::Fragment, fs).unwrap(),
        )
    }

    fn link_log(vs: &str, fs: &str) -> String {
        let (v, f) = stages(vs, fs);
        match link(&v, &f) {
            Err(GridError::Link { log }) => log,
            other => panic!("expected link error, got {other:?}"),
        }
    }

    // ── success ───────────────────────────────────────────────────────────

    #[test]
    fn resolves_position_and_var() {
        let (v, f) = stages(VERTEX, FRAGMENT);
        let iface = link(&v, &f).unwrap();

        let pos = iface.position.unwrap();
        assert_eq!(pos.location, 0);
        assert_eq!(pos.format, Some(wgpu::VertexFormat::Float32x3));

        let block = iface.uniform_block.unwrap();
        assert_eq!(block.binding, 0);
        assert!(block.size >= 4);
        assert!(block.visibility.contains(wgpu::ShaderStages::VERTEX));

        let var = iface.var.unwrap();
        assert_eq!(var.binding, 0);
        assert_eq!(var.offset, 0);
    }

    #[test]
    fn missing_names_resolve_to_none() {
        let vs = r"#version 450
layout(location = 0) in vec2 a_other;
void main() {
    gl_Position = vec4(a_other, 0.0, 1.0);
}
";
        let fs = r"#version 450
layout(location = 0) out vec4 o_color;
void main() {
    o_color = vec4(1.0);
}
";
        let (v, f) = stages(vs, fs);
        let iface = link(&v, &f).unwrap();
        assert_eq!(iface.position, None);
        assert_eq!(iface.uniform_block, None);
        assert_eq!(iface.var, None);
    }

    // ── failures ──────────────────────────────────────────────────────────

    #[test]
    fn unfed_fragment_input_fails_to_link() {
        let fs = r"#version 450
layout(location = 3) in vec2 v_uv;
layout(location = 0) out vec4 o_color;
void main() {
    o_color = vec4(v_uv, 0.0, 1.0);
}
";
        let log = link_log(VERTEX, fs);
        assert!(log.contains("location 3"), "{log}");
    }

    #[test]
    fn varying_type_mismatch_fails_to_link() {
        let fs = r"#version 450
layout(location = 0) in vec4 v_height;
layout(location = 0) out vec4 o_color;
void main() {
    o_color = v_height;
}
";
        let log = link_log(VERTEX, fs);
        assert!(log.contains("does not match"), "{log}");
    }

    #[test]
    fn conflicting_uniform_layouts_fail_to_link() {
        let fs = r"#version 450
layout(location = 0) in float v_height;
layout(set = 0, binding = 0) uniform GridParams {
    vec4 tint;
    float var;
};
layout(location = 0) out vec4 o_color;
void main() {
    o_color = tint * v_height * var;
}
";
        let log = link_log(VERTEX, fs);
        assert!(log.contains("different layouts"), "{log}");
    }

    #[test]
    fn uniform_outside_group_zero_fails_to_link() {
        let fs = r"#version 450
layout(location = 0) in float v_height;
layout(set = 1, binding = 0) uniform Extra {
    float gain;
};
layout(location = 0) out vec4 o_color;
void main() {
    o_color = vec4(v_height * gain);
}
";
        let log = link_log(VERTEX, fs);
        assert!(log.contains("bind group 1"), "{log}");
    }

    #[test]
    fn swapped_stages_fail_to_link() {
        let (v, f) = stages(VERTEX, FRAGMENT);
        assert!(matches!(link(&f, &v), Err(GridError::Link { .. })));
    }
}
