//! Drives `RenderSession` end to end through the headless backend.

use glam::Vec4;

use quadspin_engine::coords::{ColorRgba, Viewport};
use quadspin_engine::gfx::{GfxCall, GraphicsApi, HeadlessGraphics, IndexType};
use quadspin_engine::session::{RenderSession, SessionConfig, SessionError, SessionState};

const PHONE: Viewport = Viewport::new(750.0, 1334.0);

fn ready_session(gfx: &mut HeadlessGraphics) -> RenderSession {
    let mut session = RenderSession::new(SessionConfig::default());
    session.initialize(gfx).expect("initialize");
    session
}

#[test]
fn half_second_frame_draws_quad_turned_45_degrees() {
    let mut gfx = HeadlessGraphics::new();
    let mut session = ready_session(&mut gfx);

    session.update(0.5, PHONE).expect("update");
    gfx.take_calls();
    session.draw(&mut gfx).expect("draw");

    assert!((session.rotation_degrees() - 45.0).abs() < 1e-4);
    assert!((session.aspect() - 750.0 / 1334.0).abs() < 1e-6);

    let calls = gfx.take_calls();
    assert!(calls.contains(&GfxCall::Clear(ColorRgba::LIGHT_GRAY)));
    assert!(calls.contains(&GfxCall::DrawIndexed {
        index_count: 6,
        index_type: IndexType::U8,
    }));

    let (_, model_view) = gfx.transforms().expect("transforms applied");
    let corner = model_view * Vec4::new(1.0, 0.0, 0.0, 1.0);
    let half = std::f32::consts::FRAC_1_SQRT_2;
    assert!((corner - Vec4::new(half, half, -6.0, 1.0)).abs().max_element() < 1e-5);

    session.teardown(&mut gfx).expect("teardown");
    assert_eq!(session.state(), SessionState::TornDown);
    assert!(!session.vertex_array().is_allocated());
    assert!(!session.vertex_buffer().is_allocated());
    assert!(!session.index_buffer().is_allocated());
    assert_eq!(gfx.live_contexts(), 0);
    assert_eq!(gfx.live_objects(), 0);
}

#[test]
fn rotation_tracks_total_elapsed_time() {
    let mut gfx = HeadlessGraphics::new();
    let mut session = ready_session(&mut gfx);

    let dts = [0.016_f32, 0.5, 1.25, 0.75, 2.0, 0.034];
    let total: f32 = dts.iter().sum();
    for dt in dts {
        session.update(dt, PHONE).expect("update");
        session.draw(&mut gfx).expect("draw");
    }

    let expected = (90.0 * total).rem_euclid(360.0);
    assert!((session.rotation_degrees() - expected).abs() < 1e-3);
    assert_eq!(gfx.draw_count(), dts.len());
}

#[test]
fn sessions_on_one_backend_are_isolated() {
    let mut gfx = HeadlessGraphics::new();
    let mut first = ready_session(&mut gfx);
    let mut second = ready_session(&mut gfx);
    assert_ne!(first.context(), second.context());

    first.update(0.1, PHONE).expect("update first");
    second.update(0.1, PHONE).expect("update second");

    first.teardown(&mut gfx).expect("teardown first");
    assert_eq!(gfx.live_contexts(), 1);
    assert_eq!(gfx.live_objects(), 3);

    second.draw(&mut gfx).expect("second still draws");
    second.teardown(&mut gfx).expect("teardown second");
    assert_eq!(gfx.live_objects(), 0);
}

#[test]
fn session_runs_behind_a_trait_object() {
    let mut headless = HeadlessGraphics::new();
    let gfx: &mut dyn GraphicsApi = &mut headless;

    let mut session = RenderSession::default();
    session.initialize(gfx).expect("initialize");
    session.update(1.0, PHONE).expect("update");
    session.draw(gfx).expect("draw");
    session.teardown(gfx).expect("teardown");

    assert_eq!(headless.draw_count(), 1);
    assert_eq!(headless.live_contexts(), 0);
}

#[test]
fn out_of_order_calls_are_rejected() {
    let mut gfx = HeadlessGraphics::new();
    let mut session = RenderSession::default();

    assert_eq!(session.draw(&mut gfx), Err(SessionError::NotInitialized));
    assert_eq!(session.update(0.1, PHONE), Err(SessionError::NotInitialized));
    assert!(gfx.calls().is_empty());

    session.initialize(&mut gfx).expect("initialize");
    assert_eq!(
        session.initialize(&mut gfx),
        Err(SessionError::AlreadyInitialized)
    );

    session.teardown(&mut gfx).expect("teardown");
    let before = gfx.calls().len();
    session.teardown(&mut gfx).expect("second teardown is a no-op");
    assert_eq!(gfx.calls().len(), before);
    assert_eq!(session.draw(&mut gfx), Err(SessionError::TornDown));
}
