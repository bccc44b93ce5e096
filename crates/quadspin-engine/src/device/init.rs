/// Color encoding of the swapchain.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum SurfaceEncoding {
    /// Fragment output is stored unchanged, so vertex colors reach the screen
    /// at their literal values.
    #[default]
    Linear,
    /// The swapchain converts linear output to sRGB on store.
    Srgb,
}

impl SurfaceEncoding {
    pub(crate) fn matches(self, format: wgpu::TextureFormat) -> bool {
        format.is_srgb() == (self == Self::Srgb)
    }
}

/// How the GPU and its window surface are set up.
#[derive(Debug, Clone)]
pub struct GpuInit {
    pub encoding: SurfaceEncoding,

    /// Pace presentation to the display refresh; frame `dt` then follows it.
    pub vsync: bool,

    pub power_preference: wgpu::PowerPreference,

    /// Frames the CPU may queue ahead of the display.
    pub frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            encoding: SurfaceEncoding::Linear,
            vsync: true,
            // One quad does not need the discrete GPU.
            power_preference: wgpu::PowerPreference::LowPower,
            frame_latency: 2,
        }
    }
}

impl GpuInit {
    pub(crate) fn present_mode(&self) -> wgpu::PresentMode {
        if self.vsync {
            wgpu::PresentMode::Fifo
        } else {
            wgpu::PresentMode::AutoNoVsync
        }
    }
}

/// Device limits: the WebGL2 baseline so GLES-class adapters qualify, with
/// texture sizes raised to what the adapter offers for large windows.
pub(crate) fn device_limits(adapter: &wgpu::Limits) -> wgpu::Limits {
    wgpu::Limits::downlevel_webgl2_defaults().using_resolution(adapter.clone())
}
