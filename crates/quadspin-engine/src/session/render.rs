use crate::coords::Viewport;
use crate::effect::TransformEffect;
use crate::geometry::{Geometry, QUAD, Vertex};
use crate::gfx::{
    BufferTarget, ContextId, GpuHandle, GraphicsApi, GraphicsError, IndexType,
};

use super::{SessionConfig, SessionError};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Ready,
    TornDown,
}

/// GPU resources and per-frame transform state of the spinning quad.
///
/// The session never holds the graphics API itself; every call that talks to
/// the GPU borrows it, and the session makes its own context current first.
#[derive(Debug)]
pub struct RenderSession {
    config: SessionConfig,
    geometry: Geometry<4, 6>,
    state: SessionState,

    context: Option<ContextId>,
    vertex_array: GpuHandle,
    vertex_buffer: GpuHandle,
    index_buffer: GpuHandle,

    /// Always in `[0, 360)`.
    rotation_degrees: f32,
    aspect: f32,
    effect: TransformEffect,
}

impl Default for RenderSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl RenderSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            geometry: QUAD,
            state: SessionState::Uninitialized,
            context: None,
            vertex_array: GpuHandle::Unallocated,
            vertex_buffer: GpuHandle::Unallocated,
            index_buffer: GpuHandle::Unallocated,
            rotation_degrees: 0.0,
            aspect: 1.0,
            effect: TransformEffect::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn geometry(&self) -> &Geometry<4, 6> {
        &self.geometry
    }

    pub fn context(&self) -> Option<ContextId> {
        self.context
    }

    pub fn vertex_array(&self) -> GpuHandle {
        self.vertex_array
    }

    pub fn vertex_buffer(&self) -> GpuHandle {
        self.vertex_buffer
    }

    pub fn index_buffer(&self) -> GpuHandle {
        self.index_buffer
    }

    pub fn rotation_degrees(&self) -> f32 {
        self.rotation_degrees
    }

    /// Aspect ratio used by the current projection.
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn effect(&self) -> &TransformEffect {
        &self.effect
    }

    /// Creates the context and uploads the quad.
    ///
    /// On a backend failure everything allocated so far is released and the
    /// session stays `Uninitialized`, so the call may be retried.
    pub fn initialize<G>(&mut self, api: &mut G) -> Result<(), SessionError>
    where
        G: GraphicsApi + ?Sized,
    {
        match self.state {
            SessionState::Uninitialized => {}
            SessionState::Ready => return Err(SessionError::AlreadyInitialized),
            SessionState::TornDown => return Err(SessionError::TornDown),
        }

        self.geometry.validate()?;

        if let Err(err) = self.upload(api) {
            log::error!("render session: initialize failed: {err}");
            if let Err(cleanup) = self.release(api) {
                log::warn!("render session: cleanup after failed initialize: {cleanup}");
            }
            return Err(err.into());
        }

        self.state = SessionState::Ready;
        log::info!(
            "render session ready (context {}, {} vertices, {} indices)",
            self.context.map_or(0, ContextId::get),
            self.geometry.vertices.len(),
            self.geometry.index_count(),
        );
        Ok(())
    }

    fn upload<G>(&mut self, api: &mut G) -> Result<(), GraphicsError>
    where
        G: GraphicsApi + ?Sized,
    {
        let ctx = api.create_context()?;
        self.context = Some(ctx);
        api.make_current(ctx)?;

        let vao = api.create_vertex_array()?;
        self.vertex_array = GpuHandle::Allocated(vao);
        let vbo = api.create_buffer()?;
        self.vertex_buffer = GpuHandle::Allocated(vbo);
        let ibo = api.create_buffer()?;
        self.index_buffer = GpuHandle::Allocated(ibo);

        api.bind_vertex_array(Some(vao))?;

        api.bind_buffer(BufferTarget::Array, Some(vbo))?;
        api.buffer_data(BufferTarget::Array, self.geometry.vertex_bytes())?;

        api.bind_buffer(BufferTarget::ElementArray, Some(ibo))?;
        api.buffer_data(BufferTarget::ElementArray, self.geometry.index_bytes())?;

        for attrib in Vertex::ATTRIBS {
            api.vertex_attrib(attrib)?;
        }

        // Leave nothing bound for unrelated draw calls.
        api.bind_vertex_array(None)?;
        api.bind_buffer(BufferTarget::Array, None)?;
        api.bind_buffer(BufferTarget::ElementArray, None)?;
        Ok(())
    }

    /// Advances the rotation by `dt` seconds and recomputes both matrices for
    /// `viewport`.
    ///
    /// Negative or non-finite `dt` counts as zero. A degenerate viewport keeps
    /// the previous aspect ratio.
    pub fn update(&mut self, dt: f32, viewport: Viewport) -> Result<(), SessionError> {
        self.require_ready()?;

        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        self.rotation_degrees =
            (self.rotation_degrees + self.config.degrees_per_second * dt).rem_euclid(360.0);

        match viewport.aspect() {
            Some(aspect) => self.aspect = aspect,
            None => log::debug!("render session: ignoring degenerate viewport {viewport:?}"),
        }

        self.effect = TransformEffect {
            projection: self.config.perspective.matrix(self.aspect),
            model_view: TransformEffect::spin_z(self.config.translation, self.rotation_degrees),
        };
        Ok(())
    }

    /// Clears the framebuffer and draws the quad with the current transforms.
    pub fn draw<G>(&self, api: &mut G) -> Result<(), SessionError>
    where
        G: GraphicsApi + ?Sized,
    {
        self.require_ready()?;
        let (Some(ctx), Some(vao)) = (self.context, self.vertex_array.id()) else {
            return Err(SessionError::NotInitialized);
        };

        api.make_current(ctx)?;
        api.clear(self.config.clear_color)?;
        self.effect.apply(api)?;

        api.bind_vertex_array(Some(vao))?;
        let drawn = api.draw_indexed(self.geometry.index_count(), IndexType::U8);
        let unbound = api.bind_vertex_array(None);
        drawn?;
        unbound?;
        Ok(())
    }

    /// Deletes the GPU objects and the context.
    ///
    /// A no-op unless the session is `Ready`. Every object is released even if
    /// an earlier deletion fails; the first failure is returned. The session is
    /// `TornDown` afterwards either way.
    pub fn teardown<G>(&mut self, api: &mut G) -> Result<(), SessionError>
    where
        G: GraphicsApi + ?Sized,
    {
        if self.state != SessionState::Ready {
            log::debug!("render session: teardown in state {:?} ignored", self.state);
            return Ok(());
        }

        let released = self.release(api);
        self.state = SessionState::TornDown;
        log::info!("render session torn down");
        released.map_err(SessionError::from)
    }

    fn release<G>(&mut self, api: &mut G) -> Result<(), GraphicsError>
    where
        G: GraphicsApi + ?Sized,
    {
        let mut first_err: Option<GraphicsError> = None;
        let mut note = |result: Result<(), GraphicsError>| {
            if let Err(e) = result {
                log::warn!("render session: release failed: {e}");
                first_err.get_or_insert(e);
            }
        };

        let vbo = self.vertex_buffer.take();
        let ibo = self.index_buffer.take();
        let vao = self.vertex_array.take();

        if let Some(ctx) = self.context.take() {
            note(api.make_current(ctx));
            for id in [vbo, ibo].into_iter().flatten() {
                note(api.delete_buffer(id));
            }
            if let Some(id) = vao {
                note(api.delete_vertex_array(id));
            }
            note(api.destroy_context(ctx));
        }

        first_err.map_or(Ok(()), Err)
    }

    fn require_ready(&self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Ready => Ok(()),
            SessionState::Uninitialized => Err(SessionError::NotInitialized),
            SessionState::TornDown => Err(SessionError::TornDown),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::ColorRgba;
    use crate::gfx::{GfxCall, HeadlessGraphics};

    const PHONE: Viewport = Viewport::new(750.0, 1334.0);

    fn ready() -> (RenderSession, HeadlessGraphics) {
        let mut gfx = HeadlessGraphics::new();
        let mut session = RenderSession::default();
        session.initialize(&mut gfx).unwrap();
        (session, gfx)
    }

    #[test]
    fn draw_before_initialize_fails_without_gpu_calls() {
        let mut gfx = HeadlessGraphics::new();
        let session = RenderSession::default();
        assert_eq!(session.draw(&mut gfx), Err(SessionError::NotInitialized));
        assert!(gfx.calls().is_empty());
    }

    #[test]
    fn update_before_initialize_fails() {
        let mut session = RenderSession::default();
        assert_eq!(session.update(0.1, PHONE), Err(SessionError::NotInitialized));
        assert_eq!(session.rotation_degrees(), 0.0);
    }

    #[test]
    fn initialize_allocates_three_objects_and_unbinds() {
        let (session, gfx) = ready();
        assert_eq!(session.state(), SessionState::Ready);
        assert!(session.vertex_array().is_allocated());
        assert!(session.vertex_buffer().is_allocated());
        assert!(session.index_buffer().is_allocated());
        assert_eq!(gfx.live_objects(), 3);
        assert_eq!(gfx.live_contexts(), 1);

        assert_eq!(gfx.bound_vertex_array(), None);
        assert_eq!(gfx.binding(BufferTarget::Array), None);
        assert_eq!(gfx.binding(BufferTarget::ElementArray), None);
    }

    #[test]
    fn initialize_uploads_geometry_bytes() {
        let (session, gfx) = ready();
        let vbo = session.vertex_buffer().id().unwrap();
        let ibo = session.index_buffer().id().unwrap();
        assert_eq!(gfx.buffer_contents(vbo), Some(QUAD.vertex_bytes()));
        assert_eq!(gfx.buffer_contents(ibo), Some(&[0u8, 1, 2, 2, 3, 0][..]));
    }

    #[test]
    fn initialize_configures_position_then_color() {
        let (_, gfx) = ready();
        let attribs: Vec<_> = gfx
            .calls()
            .iter()
            .filter_map(|c| match c {
                GfxCall::VertexAttrib(a) => Some(*a),
                _ => None,
            })
            .collect();
        assert_eq!(attribs, Vertex::ATTRIBS.to_vec());
        assert_eq!(attribs[1].offset, 12);
    }

    #[test]
    fn second_initialize_is_rejected_without_allocating() {
        let (mut session, mut gfx) = ready();
        gfx.take_calls();
        assert_eq!(session.initialize(&mut gfx), Err(SessionError::AlreadyInitialized));
        assert!(gfx.calls().is_empty());
        assert_eq!(gfx.live_objects(), 3);
    }

    #[test]
    fn failed_initialize_releases_partial_allocations() {
        // Context + vertex array + one buffer, then the index buffer fails.
        let mut gfx = HeadlessGraphics::with_allocation_limit(3);
        let mut session = RenderSession::default();

        assert_eq!(
            session.initialize(&mut gfx),
            Err(SessionError::Graphics(GraphicsError::OutOfMemory))
        );
        assert_eq!(session.state(), SessionState::Uninitialized);
        assert_eq!(session.context(), None);
        assert!(!session.vertex_array().is_allocated());
        assert!(!session.vertex_buffer().is_allocated());
        assert_eq!(gfx.live_objects(), 0);
        assert_eq!(gfx.live_contexts(), 0);
    }

    #[test]
    fn update_accumulates_ninety_degrees_per_second() {
        let (mut session, _) = ready();
        session.update(0.5, PHONE).unwrap();
        assert_eq!(session.rotation_degrees(), 45.0);
        session.update(0.25, PHONE).unwrap();
        assert_eq!(session.rotation_degrees(), 67.5);
    }

    #[test]
    fn rotation_wraps_at_full_turn() {
        let (mut session, _) = ready();
        session.update(4.5, PHONE).unwrap();
        assert!((session.rotation_degrees() - 45.0).abs() < 1e-4);
        assert!(session.rotation_degrees() < 360.0);
    }

    #[test]
    fn negative_and_nan_dt_do_not_rotate() {
        let (mut session, _) = ready();
        session.update(-1.0, PHONE).unwrap();
        session.update(f32::NAN, PHONE).unwrap();
        assert_eq!(session.rotation_degrees(), 0.0);
    }

    #[test]
    fn update_uses_viewport_aspect() {
        let (mut session, _) = ready();
        session.update(0.0, PHONE).unwrap();
        assert!((session.aspect() - 0.5622).abs() < 1e-3);

        let expected = session.config().perspective.matrix(750.0 / 1334.0);
        assert_eq!(session.effect().projection, expected);
    }

    #[test]
    fn degenerate_viewport_keeps_previous_aspect() {
        let (mut session, _) = ready();
        session.update(0.0, Viewport::new(800.0, 400.0)).unwrap();
        session.update(0.0, Viewport::new(800.0, 0.0)).unwrap();
        assert_eq!(session.aspect(), 2.0);
    }

    #[test]
    fn model_view_moves_quad_in_front_of_eye() {
        let (mut session, _) = ready();
        session.update(1.0, PHONE).unwrap();
        let origin = session.effect().model_view * glam::Vec4::W;
        assert_eq!(origin, glam::Vec4::new(0.0, 0.0, -6.0, 1.0));
    }

    #[test]
    fn draw_issues_one_indexed_draw_and_unbinds() {
        let (mut session, mut gfx) = ready();
        session.update(0.5, PHONE).unwrap();
        gfx.take_calls();

        session.draw(&mut gfx).unwrap();

        let vao = session.vertex_array().id();
        let ctx = session.context().unwrap();
        let effect = *session.effect();
        assert_eq!(
            gfx.calls(),
            &[
                GfxCall::MakeCurrent(ctx),
                GfxCall::Clear(session.config().clear_color),
                GfxCall::SetTransforms {
                    projection: effect.projection,
                    model_view: effect.model_view,
                },
                GfxCall::BindVertexArray(vao),
                GfxCall::DrawIndexed { index_count: 6, index_type: IndexType::U8 },
                GfxCall::BindVertexArray(None),
            ]
        );
        assert_eq!(gfx.bound_vertex_array(), None);
    }

    #[test]
    fn draw_clears_light_gray_in_the_session_context() {
        let (mut session, mut gfx) = ready();
        session.update(0.1, PHONE).unwrap();

        let other = gfx.create_context().unwrap();
        gfx.make_current(other).unwrap();

        session.draw(&mut gfx).unwrap();
        assert_eq!(gfx.current_context(), session.context());
        assert_eq!(gfx.clear_color(), Some(ColorRgba::LIGHT_GRAY));
    }

    #[test]
    fn draw_does_not_change_rotation() {
        let (mut session, mut gfx) = ready();
        session.update(0.3, PHONE).unwrap();
        let before = session.rotation_degrees();
        session.draw(&mut gfx).unwrap();
        session.draw(&mut gfx).unwrap();
        assert_eq!(session.rotation_degrees(), before);
        assert_eq!(gfx.draw_count(), 2);
    }

    #[test]
    fn teardown_releases_everything() {
        let (mut session, mut gfx) = ready();
        session.teardown(&mut gfx).unwrap();

        assert_eq!(session.state(), SessionState::TornDown);
        assert_eq!(session.context(), None);
        assert_eq!(session.vertex_array(), GpuHandle::Unallocated);
        assert_eq!(session.vertex_buffer(), GpuHandle::Unallocated);
        assert_eq!(session.index_buffer(), GpuHandle::Unallocated);
        assert_eq!(gfx.live_objects(), 0);
        assert_eq!(gfx.live_contexts(), 0);
    }

    #[test]
    fn second_teardown_makes_no_calls() {
        let (mut session, mut gfx) = ready();
        session.teardown(&mut gfx).unwrap();
        gfx.take_calls();

        session.teardown(&mut gfx).unwrap();
        assert!(gfx.calls().is_empty());
    }

    #[test]
    fn teardown_without_initialize_is_a_no_op() {
        let mut gfx = HeadlessGraphics::new();
        let mut session = RenderSession::default();
        session.teardown(&mut gfx).unwrap();
        assert!(gfx.calls().is_empty());
        assert_eq!(session.state(), SessionState::Uninitialized);
    }

    #[test]
    fn torn_down_session_rejects_everything() {
        let (mut session, mut gfx) = ready();
        session.teardown(&mut gfx).unwrap();

        assert_eq!(session.draw(&mut gfx), Err(SessionError::TornDown));
        assert_eq!(session.update(0.1, PHONE), Err(SessionError::TornDown));
        assert_eq!(session.initialize(&mut gfx), Err(SessionError::TornDown));
    }

    #[test]
    fn teardown_targets_the_session_context() {
        let (mut session, mut gfx) = ready();
        let ours = session.context().unwrap();

        // Another context is current when the host tears down.
        let other = gfx.create_context().unwrap();
        gfx.make_current(other).unwrap();
        gfx.take_calls();

        session.teardown(&mut gfx).unwrap();
        assert_eq!(gfx.calls().first(), Some(&GfxCall::MakeCurrent(ours)));
        assert_eq!(gfx.live_contexts(), 1);
        assert_eq!(gfx.current_context(), None);
    }
}
