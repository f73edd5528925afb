use std::borrow::Cow;

use crate::error::{GridResult, Stage};

use super::compile::{compile_stage, CompiledStage};
use super::link::{link, ProgramInterface, ANIMATION_UNIFORM};

/// Compiled and linked shader pair, before any GPU objects exist.
#[derive(Debug)]
pub struct LinkedProgram {
    vertex: CompiledStage,
    fragment: CompiledStage,
    interface: ProgramInterface,
}

impl LinkedProgram {
    /// Compiles the vertex stage, then the fragment stage, then links them.
    ///
    /// The first failure stops the sequence: a vertex compile error never
    /// reaches the fragment compiler or the linker.
    pub fn from_sources(vertex_src: &str, fragment_src: &str) -> GridResult<Self> {
        let vertex = compile_stage(Stage::Vertex, vertex_src)?;
        let fragment = compile_stage(Stage::Fragment, fragment_src)?;
        let interface = link(&vertex, &fragment)?;

        if interface.var.is_none() {
            log::warn!("program has no `{ANIMATION_UNIFORM}` uniform; animation will not be visible");
        }

        Ok(Self {
            vertex,
            fragment,
            interface,
        })
    }

    #[inline]
    pub fn interface(&self) -> &ProgramInterface {
        &self.interface
    }

    #[inline]
    pub fn vertex(&self) -> &CompiledStage {
        &self.vertex
    }

    #[inline]
    pub fn fragment(&self) -> &CompiledStage {
        &self.fragment
    }
}

/// GPU-side program: one shader module per stage plus the reflected interface.
pub struct ShaderProgram {
    vertex: wgpu::ShaderModule,
    fragment: wgpu::ShaderModule,
    interface: ProgramInterface,
}

impl ShaderProgram {
    /// Compiles, links and uploads a shader pair.
    pub fn compile(device: &wgpu::Device, vertex_src: &str, fragment_src: &str) -> GridResult<Self> {
        let linked = LinkedProgram::from_sources(vertex_src, fragment_src)?;
        Ok(Self::upload(device, &linked))
    }

    /// Creates the GPU shader modules for an already linked program.
    pub fn upload(device: &wgpu::Device, linked: &LinkedProgram) -> Self {
        let vertex = create_module(device, linked.vertex(), "gridplane vertex shader");
        let fragment = create_module(device, linked.fragment(), "gridplane fragment shader");

        log::info!(
            "shader program ready (position: {:?}, var: {:?})",
            linked.interface.position.map(|p| p.location),
            linked.interface.var.map(|v| v.binding)
        );

        Self {
            vertex,
            fragment,
            interface: linked.interface,
        }
    }

    #[inline]
    pub fn vertex_module(&self) -> &wgpu::ShaderModule {
        &self.vertex
    }

    #[inline]
    pub fn fragment_module(&self) -> &wgpu::ShaderModule {
        &self.fragment
    }

    #[inline]
    pub fn interface(&self) -> &ProgramInterface {
        &self.interface
    }
}

fn create_module(device: &wgpu::Device, stage: &CompiledStage, label: &str) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Owned(stage.source().to_owned()),
            stage: stage.stage().to_naga(),
            defines: &[],
        },
    })
}
