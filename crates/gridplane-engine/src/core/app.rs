use anyhow::Result;

use crate::device::Gpu;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract driven by `window::Runtime`.
pub trait App {
    /// Called once, after the window and GPU context exist and before the first
    /// frame. An error aborts startup and is returned from `Runtime::run`.
    fn on_start(&mut self, gpu: &Gpu<'_>) -> Result<()>;

    /// Called once per redraw.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
