use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::init::device_limits;
use super::surface;
use super::{FrameSkipped, GpuInit};

/// Swapchain texture acquired for one frame.
///
/// Holding it blocks the next acquire; hand it back through
/// [`Gpu::present`] within the same frame.
pub struct SurfaceFrame {
    texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
}

/// Device, queue and configured window surface.
pub struct Gpu<'w> {
    // The surface must not outlive its instance.
    _instance: wgpu::Instance,
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    /// Last size reported by the window; zero while minimized.
    size: PhysicalSize<u32>,
}

impl<'w> Gpu<'w> {
    /// Sets up a device able to present to `window`.
    ///
    /// `WGPU_BACKEND` (e.g. `gl`, `vulkan`) restricts the backends tried.
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(
            size.width > 0 && size.height > 0,
            "window has zero size ({}x{})",
            size.width,
            size.height
        );

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::from_env().unwrap_or_default(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("creating the window surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no GPU adapter can present to this window")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("quadspin device"),
                required_limits: device_limits(&adapter.limits()),
                memory_hints: wgpu::MemoryHints::MemoryUsage,
                ..Default::default()
            })
            .await
            .context("requesting a device with WebGL2-class limits")?;

        let config = surface::configuration(&surface.get_capabilities(&adapter), &init, size)
            .context("the surface reports no usable formats")?;
        surface.configure(&device, &config);

        let info = adapter.get_info();
        log::info!(
            "gpu: {} ({:?}), {:?} {:?}",
            info.name,
            info.backend,
            config.format,
            config.present_mode
        );

        Ok(Self {
            _instance: instance,
            surface,
            device,
            queue,
            config,
            size,
        })
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Drawable size in physical pixels.
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Alignment of dynamic offsets into a uniform buffer.
    pub fn uniform_offset_alignment(&self) -> u32 {
        self.device.limits().min_uniform_buffer_offset_alignment
    }

    fn drawable(&self) -> bool {
        self.size.width > 0 && self.size.height > 0
    }

    /// Records the new window size and configures the swapchain for it.
    /// A minimized (zero-area) window keeps the previous configuration.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.size = new_size;
        if !self.drawable() {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Acquires the next swapchain texture.
    ///
    /// A stale surface is configured again before returning
    /// [`FrameSkipped::Reconfigured`].
    pub fn acquire(&mut self) -> Result<SurfaceFrame, FrameSkipped> {
        match self.surface.get_current_texture() {
            Ok(texture) => {
                let view = texture
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                Ok(SurfaceFrame { texture, view })
            }
            Err(err) => {
                let skipped = surface::classify(&err);
                log::debug!("acquire failed: {err}");
                if skipped == FrameSkipped::Reconfigured && self.drawable() {
                    self.surface.configure(&self.device, &self.config);
                }
                Err(skipped)
            }
        }
    }

    /// Submits `commands` and shows `frame`.
    pub fn present(&self, frame: SurfaceFrame, commands: wgpu::CommandBuffer) {
        self.queue.submit([commands]);
        let SurfaceFrame { texture, view } = frame;
        drop(view);
        texture.present();
    }
}
