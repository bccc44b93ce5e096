use quadspin_engine::core::{App, AppControl, FrameCtx};
use quadspin_engine::gfx::GraphicsApi;
use quadspin_engine::input::PauseState;
use quadspin_engine::session::{RenderSession, SessionConfig, SessionError, SessionState};

/// Hosts one [`RenderSession`] per surface and toggles pause on tap.
pub struct SquareApp {
    config: SessionConfig,
    session: RenderSession,
    pause: PauseState,
}

impl SquareApp {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            session: RenderSession::new(config.clone()),
            config,
            pause: PauseState::default(),
        }
    }
}

impl App for SquareApp {
    fn on_surface_ready(&mut self, gfx: &mut dyn GraphicsApi) -> AppControl {
        // A torn-down session cannot come back; start over for the new surface.
        if self.session.state() == SessionState::TornDown {
            self.session = RenderSession::new(self.config.clone());
        }

        match self.session.initialize(gfx) {
            Ok(()) => AppControl::Continue,
            Err(e) => {
                log::error!("cannot start rendering: {e}");
                AppControl::Exit
            }
        }
    }

    fn on_tap(&mut self) {
        self.pause.toggle();
    }

    fn is_paused(&self) -> bool {
        self.pause.is_paused()
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl {
        if let Err(e) = self.session.update(ctx.time.dt, ctx.viewport) {
            log::error!("update failed: {e}");
            return AppControl::Exit;
        }

        match self.session.draw(&mut *ctx.gfx) {
            Ok(()) => AppControl::Continue,
            Err(e @ SessionError::Graphics(_)) => {
                log::warn!("frame {} dropped: {e}", ctx.time.frame_index);
                AppControl::Continue
            }
            Err(e) => {
                log::error!("draw failed: {e}");
                AppControl::Exit
            }
        }
    }

    fn on_surface_lost(&mut self, gfx: &mut dyn GraphicsApi) {
        if let Err(e) = self.session.teardown(gfx) {
            log::warn!("teardown: {e}");
        }
    }
}
