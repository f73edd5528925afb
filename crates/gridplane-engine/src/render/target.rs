use winit::dpi::PhysicalSize;

/// One frame's drawing destination: the open encoder, the swapchain view and
/// its size in physical pixels.
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
    pub size: PhysicalSize<u32>,
}
