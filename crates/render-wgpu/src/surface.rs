use crate::RenderError;
use crate::gpu::{MSAA_SAMPLES, ScenePipeline};
use crate::prepare::clear_color;
use bakedscene_render::{PerspectiveCamera, Renderer, RendererSettings};
use bakedscene_scene::Scene;

/// A rendered frame that has not been presented yet. Overlays such as the
/// debug panel draw into `view` before [`FrameOutput::present`].
pub struct FrameOutput {
    pub texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    /// Physical size of the frame.
    pub size: (u32, u32),
}

impl FrameOutput {
    pub fn present(self) {
        self.texture.present();
    }
}

/// wgpu renderer drawing into a window surface.
pub struct SurfaceRenderer {
    settings: RendererSettings,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: ScenePipeline,
    adapter_info: wgpu::AdapterInfo,
}

impl SurfaceRenderer {
    /// Create the instance, surface, device and scene pipeline for `target`
    /// (typically an `Arc<winit::window::Window>`).
    pub fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        settings: RendererSettings,
    ) -> Result<Self, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(target)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or(RenderError::NoAdapter)?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("bakedscene_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .ok_or(RenderError::NoSurfaceFormat)?;
        if !format.is_srgb() {
            tracing::warn!("no sRGB surface format; colors will be off ({format:?})");
        }

        let (width, height) = settings.drawing_buffer_size();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let sample_count = if settings.antialias { MSAA_SAMPLES } else { 1 };
        let pipeline = ScenePipeline::new(&device, &queue, format, width, height, sample_count);

        let adapter_info = adapter.get_info();
        tracing::info!(
            "GPU initialized with {} backend on {} ({}x{}, {}x MSAA)",
            adapter_info.backend.to_str(),
            adapter_info.name,
            width,
            height,
            sample_count
        );

        Ok(Self {
            settings,
            surface,
            device,
            queue,
            config,
            pipeline,
            adapter_info,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn adapter_info(&self) -> &wgpu::AdapterInfo {
        &self.adapter_info
    }

    /// Acquire a frame cleared to the clear color without drawing the scene.
    /// Used to show overlays while no scene is available.
    pub fn clear_frame(&mut self) -> Result<FrameOutput, RenderError> {
        let (texture, view) = self.acquire()?;
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("clear_encoder"),
            });
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("clear_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_color(self.settings.clear_color)),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            ..Default::default()
        });
        self.queue.submit(std::iter::once(encoder.finish()));

        Ok(FrameOutput {
            texture,
            view,
            size: self.surface_size(),
        })
    }

    fn acquire(&mut self) -> Result<(wgpu::SurfaceTexture, wgpu::TextureView), RenderError> {
        let texture = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return Err(RenderError::SurfaceReconfigured);
            }
            Err(e) => return Err(RenderError::Surface(e)),
        };
        let view = texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        Ok((texture, view))
    }

    fn configure(&mut self) {
        let (width, height) = self.settings.drawing_buffer_size();
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.pipeline.resize(&self.device, width, height);
    }
}

impl Renderer for SurfaceRenderer {
    type Output = Result<FrameOutput, RenderError>;

    fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut RendererSettings {
        &mut self.settings
    }

    fn on_resize(&mut self) {
        if self.settings.drawing_buffer_size() != self.surface_size() {
            self.configure();
        }
    }

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Self::Output {
        self.pipeline.sync(&self.device, &self.queue, scene);

        let (texture, view) = self.acquire()?;
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("scene_encoder"),
            });
        self.pipeline.draw(
            &self.queue,
            &mut encoder,
            &view,
            scene,
            camera,
            clear_color(self.settings.clear_color),
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        Ok(FrameOutput {
            texture,
            view,
            size: self.surface_size(),
        })
    }
}
