use std::time::Instant;

use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl, FrameCtx};
use crate::device::{Gpu, GpuInit};
use crate::gfx::WgpuGraphics;
use crate::input::platform::winit::translate_window_event;
use crate::input::TapDetector;
use crate::time::{FrameClock, FrameTime};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "quadspin".to_string(),
            // Portrait phone-sized window.
            initial_size: LogicalSize::new(375.0, 667.0),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Runs `app` in a single window until it exits or the window closes.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + App,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        Ok(())
    }
}

/// Decides per redraw whether the app advances, and with which `dt`.
///
/// Nothing advances while paused. The first frame after a resume measures
/// from the resume, not from the last frame before the pause.
#[derive(Debug, Default)]
struct FramePacer {
    clock: FrameClock,
    /// App was paused on the last redraw.
    paused: bool,
}

impl FramePacer {
    fn next_frame(&mut self, app_paused: bool) -> Option<FrameTime> {
        self.next_frame_at(app_paused, Instant::now())
    }

    fn next_frame_at(&mut self, app_paused: bool, now: Instant) -> Option<FrameTime> {
        let was_paused = std::mem::replace(&mut self.paused, app_paused);
        if app_paused {
            return None;
        }
        if was_paused {
            self.clock.reset_at(now);
        }
        Some(self.clock.tick_at(now))
    }
}

#[self_referencing]
struct WindowEntry {
    pacer: FramePacer,
    cursor: Option<(f32, f32)>,
    taps: TapDetector,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gfx: WgpuGraphics<'this>,
}

struct AppState<A>
where
    A: App + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    entry: Option<WindowEntry>,
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
            exit_requested: false,
        }
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();

        let mut entry = WindowEntryTryBuilder {
            pacer: FramePacer::default(),
            cursor: None,
            taps: TapDetector::default(),
            window,
            gfx_builder: |w| {
                pollster::block_on(Gpu::new(w, gpu_init))
                    .map(WgpuGraphics::new)
                    .context("GPU initialization failed for window")
            },
        }
        .try_build()?;

        let app = &mut self.app;
        let control = entry.with_gfx_mut(|gfx| app.on_surface_ready(gfx));

        entry.with_window(|w| w.request_redraw());
        self.entry = Some(entry);

        if control == AppControl::Exit {
            self.request_exit();
        }
        Ok(())
    }

    /// Notifies the app and drops the window together with its surface.
    fn destroy_window_entry(&mut self) {
        if let Some(mut entry) = self.entry.take() {
            let app = &mut self.app;
            entry.with_gfx_mut(|gfx| app.on_surface_lost(gfx));
        }
    }

    fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    fn redraw(&mut self) {
        let (app, entry) = (&mut self.app, &mut self.entry);
        let Some(entry) = entry.as_mut() else {
            return;
        };

        let mut control = AppControl::Continue;
        let mut fatal = false;

        entry.with_mut(|fields| {
            let presented = match fields.pacer.next_frame(app.is_paused()) {
                Some(time) => {
                    let viewport = fields.gfx.viewport();
                    let mut ctx = FrameCtx {
                        gfx: &mut *fields.gfx,
                        time,
                        viewport,
                    };
                    control = app.on_frame(&mut ctx);
                    fields.gfx.present()
                }
                // Paused: show the held frame again, e.g. on a freshly
                // resized surface.
                None => fields.gfx.present_last(),
            };

            match presented {
                Ok(()) => {}
                Err(skipped) if skipped.is_fatal() => fatal = true,
                Err(skipped) => log::debug!("frame not presented: {skipped}"),
            }
        });

        if fatal {
            log::error!("fatal surface error; exiting");
            self.request_exit();
        }
        if control == AppControl::Exit {
            self.request_exit();
        }
    }

    fn pointer_input(&mut self, event: &WindowEvent) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };

        let tapped = entry.with_mut(|fields| {
            translate_window_event(fields.window, fields.cursor, event)
                .is_some_and(|ev| fields.taps.feed(ev))
        });

        if tapped {
            self.app.on_tap();
            entry.with_window(|w| w.request_redraw());
        }
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: App + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }

        if let Err(e) = self.create_window_entry(event_loop) {
            log::error!("failed to create window: {e:#}");
            self.request_exit();
        }

        if self.exit_requested {
            self.destroy_window_entry();
            event_loop.exit();
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        // Mobile platforms destroy the surface while suspended.
        log::info!("suspended; releasing surface");
        self.destroy_window_entry();
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            self.destroy_window_entry();
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw while animating; a tap wakes the loop when paused.
        if !self.app.is_paused() {
            if let Some(entry) = &self.entry {
                entry.with_window(|w| w.request_redraw());
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            self.destroy_window_entry();
            event_loop.exit();
            return;
        }

        self.pointer_input(&event);

        match &event {
            WindowEvent::CloseRequested => self.request_exit(),

            WindowEvent::Resized(new_size) => {
                if let Some(entry) = self.entry.as_mut() {
                    entry.with_gfx_mut(|gfx| gfx.resize(*new_size));
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = self.entry.as_mut() {
                    let new_size = entry.with_window(|w| w.inner_size());
                    entry.with_gfx_mut(|gfx| gfx.resize(new_size));
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::RedrawRequested => self.redraw(),

            _ => {}
        }

        if self.exit_requested {
            self.destroy_window_entry();
            event_loop.exit();
        }
    }
}
