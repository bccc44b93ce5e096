use winit::dpi::PhysicalSize;

use super::{FrameSkipped, GpuInit};

/// Builds the swapchain configuration for `size`.
///
/// Returns `None` when the surface reports no formats, i.e. the adapter
/// cannot present to it.
pub(crate) fn configuration(
    caps: &wgpu::SurfaceCapabilities,
    init: &GpuInit,
    size: PhysicalSize<u32>,
) -> Option<wgpu::SurfaceConfiguration> {
    let format = caps
        .formats
        .iter()
        .copied()
        .find(|&f| init.encoding.matches(f))
        .or_else(|| caps.formats.first().copied())?;

    if !init.encoding.matches(format) {
        log::warn!("no {:?} surface format; using {format:?}", init.encoding);
    }

    // The quad is drawn over an opaque clear; never blend with the desktop.
    let alpha_mode = if caps.alpha_modes.contains(&wgpu::CompositeAlphaMode::Opaque) {
        wgpu::CompositeAlphaMode::Opaque
    } else {
        caps.alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto)
    };

    let wanted = init.present_mode();
    let present_mode = if caps.present_modes.contains(&wanted) || caps.present_modes.is_empty() {
        wanted
    } else {
        wgpu::PresentMode::Fifo
    };

    Some(wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width: size.width.max(1),
        height: size.height.max(1),
        present_mode,
        alpha_mode,
        view_formats: Vec::new(),
        desired_maximum_frame_latency: init.frame_latency,
    })
}

/// Maps an acquire failure. `Reconfigured` tells the caller to configure the
/// surface again before the next frame.
pub(crate) fn classify(err: &wgpu::SurfaceError) -> FrameSkipped {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => FrameSkipped::Reconfigured,
        wgpu::SurfaceError::OutOfMemory => FrameSkipped::OutOfMemory,
        _ => FrameSkipped::Unavailable,
    }
}
