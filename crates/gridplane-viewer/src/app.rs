use std::path::PathBuf;

use anyhow::{Context, Result};

use gridplane_engine::anim::{Oscillator, OscillatorConfig};
use gridplane_engine::core::{App, AppControl, FrameCtx};
use gridplane_engine::device::Gpu;
use gridplane_engine::mesh::GridMesh;
use gridplane_engine::render::GridRenderer;
use gridplane_engine::shader::{load_source, ShaderProgram};

const CLEAR: wgpu::Color = wgpu::Color {
    r: 0.02,
    g: 0.02,
    b: 0.04,
    a: 1.0,
};

/// Locations of the vertex and fragment shader sources.
#[derive(Debug, Clone)]
pub struct ShaderPaths {
    pub vertex: PathBuf,
    pub fragment: PathBuf,
}

impl ShaderPaths {
    /// The shader pair shipped in this crate's `shaders/` directory.
    pub fn bundled() -> Self {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("shaders");
        Self {
            vertex: dir.join("grid.vert"),
            fragment: dir.join("grid.frag"),
        }
    }
}

/// The grid viewer: one mesh, one program, one animated scalar.
pub struct GridApp {
    mesh: GridMesh,
    shaders: ShaderPaths,
    oscillator: Oscillator,
    renderer: Option<GridRenderer>,
}

impl GridApp {
    pub fn new(mesh: GridMesh, shaders: ShaderPaths, animation: OscillatorConfig) -> Self {
        Self {
            mesh,
            shaders,
            oscillator: Oscillator::new(animation),
            renderer: None,
        }
    }
}

impl App for GridApp {
    fn on_start(&mut self, gpu: &Gpu<'_>) -> Result<()> {
        let vertex_src = load_source(&self.shaders.vertex)?;
        let fragment_src = load_source(&self.shaders.fragment)?;

        let program = ShaderProgram::compile(gpu.device(), &vertex_src, &fragment_src)?;

        let renderer = GridRenderer::new(
            gpu.device(),
            gpu.surface_format(),
            gpu.features(),
            program,
            &self.mesh,
        )
        .context("failed to build grid pipeline")?;
        log::info!("wireframe mode: {:?}", renderer.mode());

        self.renderer = Some(renderer);
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let Some(renderer) = self.renderer.as_ref() else {
            return AppControl::Exit;
        };

        // Exactly one animation step per redraw.
        let value = self.oscillator.advance();
        renderer.set_var(ctx.gpu.queue(), value);

        ctx.render(CLEAR, |target| renderer.render(target))
    }
}
