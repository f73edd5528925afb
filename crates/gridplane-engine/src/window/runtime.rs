use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl, FrameCtx};
use crate::device::{Gpu, GpuInit};
use crate::time::RedrawClock;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// Fixed redraw period; one frame is drawn per period.
    pub redraw_period: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "Grid Plane".to_string(),
            initial_size: LogicalSize::new(600.0, 600.0),
            redraw_period: RedrawClock::DEFAULT_PERIOD,
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window, starts `app` and drives it until the window closes.
    ///
    /// A startup failure (GPU acquisition or `App::on_start`) is logged, ends
    /// the event loop and is returned here.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: App + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.startup_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    clock: RedrawClock,
    redraw_pending: bool,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<A>
where
    A: App + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    entry: Option<WindowEntry>,
    startup_error: Option<anyhow::Error>,
    exit_requested: bool,
}

impl<A> AppState<A>
where
    A: App + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            entry: None,
            startup_error: None,
            exit_requested: false,
        }
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        event_loop.exit();
    }

    /// Creates the window + GPU context and runs `App::on_start` against it.
    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<WindowEntry> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        let entry = WindowEntryTryBuilder {
            clock: RedrawClock::new(self.config.redraw_period),
            redraw_pending: false,
            window,
            gpu_builder: |w| {
                pollster::block_on(Gpu::new(w, gpu_init)).context("GPU initialization failed")
            },
        }
        .try_build()?;

        entry
            .with_gpu(|gpu| self.app.on_start(gpu))
            .context("application startup failed")?;

        Ok(entry)
    }

    fn request_redraw(entry: &mut WindowEntry) {
        entry.with_mut(|fields| {
            *fields.redraw_pending = true;
            fields.window.request_redraw();
        });
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let app = &mut self.app;
        let Some(entry) = self.entry.as_mut() else { return };

        let control = entry.with_mut(|fields| {
            *fields.redraw_pending = false;

            // Minimized: keep the schedule running but draw nothing.
            if !fields.gpu.is_drawable() {
                fields.clock.tick(Instant::now());
                return AppControl::Continue;
            }

            let tick = fields.clock.tick(Instant::now());
            log::trace!("frame {} (dt {:.3}s)", tick.frame_index, tick.dt);

            let mut ctx = FrameCtx {
                window: fields.window,
                gpu: fields.gpu,
                tick,
            };
            app.on_frame(&mut ctx)
        });

        if control == AppControl::Exit {
            self.request_exit(event_loop);
        }
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: App + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || self.exit_requested {
            return;
        }

        match self.start(event_loop) {
            Ok(mut entry) => {
                log::info!("window ready; redrawing every {:?}", self.config.redraw_period);
                Self::request_redraw(&mut entry);
                self.entry = Some(entry);
            }
            Err(e) => {
                log::error!("{e:#}");
                self.startup_error = Some(e);
                self.request_exit(event_loop);
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let Some(entry) = self.entry.as_mut() else {
            event_loop.set_control_flow(ControlFlow::Wait);
            return;
        };

        let now = Instant::now();
        let (pending, due, deadline) = entry.with(|fields| {
            (
                *fields.redraw_pending,
                fields.clock.is_due(now),
                fields.clock.deadline(),
            )
        });

        // The deadline is re-armed by the redraw itself, so wait for it first.
        if pending {
            event_loop.set_control_flow(ControlFlow::Wait);
        } else if due {
            Self::request_redraw(entry);
            event_loop.set_control_flow(ControlFlow::Wait);
        } else {
            event_loop.set_control_flow(ControlFlow::WaitUntil(deadline));
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("window closed");
                self.entry = None;
                self.request_exit(event_loop);
            }

            WindowEvent::Resized(new_size) => {
                if let Some(entry) = self.entry.as_mut() {
                    entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = self.entry.as_mut() {
                    let new_size = entry.with_window(|w| w.inner_size());
                    entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }
}
