use wgpu::naga;
use wgpu::naga::front::glsl;
use wgpu::naga::valid::{Capabilities, ValidationFlags, Validator};

use crate::error::{GridError, GridResult, Stage};

/// One successfully compiled and validated shader stage.
#[derive(Debug)]
pub struct CompiledStage {
    stage: Stage,
    source: String,
    module: naga::Module,
}

impl CompiledStage {
    #[inline]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[inline]
    pub fn module(&self) -> &naga::Module {
        &self.module
    }

    /// Entry point `main` of this stage, if the module declares one.
    pub(crate) fn entry_point(&self) -> Option<&naga::EntryPoint> {
        let want = self.stage.to_naga();
        self.module
            .entry_points
            .iter()
            .find(|ep| ep.stage == want && ep.name == "main")
    }
}

/// Compiles GLSL `source` for `stage`.
///
/// Parsing and validation failures are both reported as `ShaderCompile`, with
/// the diagnostics rendered against the source text.
pub fn compile_stage(stage: Stage, source: &str) -> GridResult<CompiledStage> {
    let mut frontend = glsl::Frontend::default();
    let options = glsl::Options::from(stage.to_naga());

    let module = frontend
        .parse(&options, source)
        .map_err(|errors| GridError::ShaderCompile {
            stage,
            log: errors.emit_to_string(source),
        })?;

    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|err| GridError::ShaderCompile {
            stage,
            log: err.emit_to_string(source),
        })?;

    log::debug!(
        "{stage} stage compiled ({} globals, {} entry points)",
        module.global_variables.len(),
        module.entry_points.len()
    );

    Ok(CompiledStage {
        stage,
        source: source.to_owned(),
        module,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_VERTEX: &str = r"#version 450
layout(location = 0) in vec3 s_vPosition;
void main() {
    gl_Position = vec4(s_vPosition, 1.0);
}
";

    #[test]
    fn valid_vertex_stage_compiles() {
        let stage = compile_stage(Stage::Vertex, MINIMAL_VERTEX).unwrap();
        assert_eq!(stage.stage(), Stage::Vertex);
        assert!(stage.entry_point().is_some());
    }

    #[test]
    fn syntax_error_reports_stage_and_log() {
        let broken = "#version 450\nvoid main() { gl_Position = vec4(1.0 }\n";
        let err = compile_stage(Stage::Vertex, broken).unwrap_err();
        match err {
            GridError::ShaderCompile { stage, log } => {
                assert_eq!(stage, Stage::Vertex);
                assert!(!log.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_identifier_is_a_fragment_compile_error() {
        let broken = r"#version 450
layout(location = 0) out vec4 o_color;
void main() {
    o_color = vec4(undeclared_value);
}
";
        let err = compile_stage(Stage::Fragment, broken).unwrap_err();
        assert!(matches!(
            err,
            GridError::ShaderCompile {
                stage: Stage::Fragment,
                ..
            }
        ));
    }
}
