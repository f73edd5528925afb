mod app;

use anyhow::Result;

use gridplane_engine::anim::OscillatorConfig;
use gridplane_engine::device::GpuInit;
use gridplane_engine::logging::{init_logging, LoggingConfig};
use gridplane_engine::mesh;
use gridplane_engine::window::{Runtime, RuntimeConfig};

use app::{GridApp, ShaderPaths};

/// Subdivisions per grid axis.
const GRID_RESOLUTION: u32 = 32;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let mesh = mesh::generate(GRID_RESOLUTION)?;
    log::info!(
        "grid mesh: {} vertices, {} triangles",
        mesh.vertex_count(),
        mesh.triangle_count()
    );

    let app = GridApp::new(mesh, ShaderPaths::bundled(), OscillatorConfig::default());

    Runtime::run(RuntimeConfig::default(), GpuInit::default(), app)
}
