use anyhow::{Context, Result};
use bakedscene_common::{Color, ViewportSize};
use bakedscene_controls::PointerInput;
use bakedscene_render::RendererSettings;
use bakedscene_render_wgpu::{RenderError, SurfaceRenderer};
use bakedscene_viewer::{FrameLoop, PendingAssets, ShutdownToken, ViewerConfig, ViewerContext};
use clap::Parser;
use egui::Context as EguiContext;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "bakedscene-desktop", about = "Baked-lighting house viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Directory holding house/ and the decoder directory
    #[arg(long, default_value = "static")]
    asset_dir: PathBuf,

    /// Compressed-geometry decoder directory, relative to the asset directory
    #[arg(long, default_value = "draco")]
    decoder_dir: PathBuf,

    /// Starting fog and clear color, e.g. "#263740"
    #[arg(long)]
    fog_color: Option<Color>,
}

/// What the event loop does after a frame failed to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameFailure {
    /// Skip this frame and ask for another.
    Retry,
    /// Stop rendering and leave the event loop.
    Exit,
}

fn frame_failure(err: &RenderError, token: &ShutdownToken) -> FrameFailure {
    if err.is_fatal() {
        token.cancel();
        FrameFailure::Exit
    } else {
        FrameFailure::Retry
    }
}

fn logical(size: PhysicalSize<u32>, scale: f64) -> ViewportSize {
    let l: LogicalSize<u32> = size.to_logical(scale);
    ViewportSize::new(l.width, l.height)
}

struct App {
    config: ViewerConfig,
    pending: Option<PendingAssets>,
    window: Option<Arc<Window>>,
    viewer: Option<ViewerContext<SurfaceRenderer>>,
    frames: FrameLoop,
    cursor: (f32, f32),
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
    /// Set when the scene could not be loaded; only the panel is drawn.
    load_failed: bool,
    exit_error: Option<anyhow::Error>,
}

impl App {
    fn new(config: ViewerConfig, pending: PendingAssets) -> Self {
        Self {
            config,
            pending: Some(pending),
            window: None,
            viewer: None,
            frames: FrameLoop::new(ShutdownToken::new()),
            cursor: (0.0, 0.0),
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            egui_renderer: None,
            load_failed: false,
            exit_error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("Baked Scene")
            .with_inner_size(LogicalSize::new(1280u32, 720));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let scale = window.scale_factor();
        let mut settings = RendererSettings {
            size: logical(window.inner_size(), scale),
            ..RendererSettings::default()
        };
        settings.set_pixel_ratio(scale);
        let renderer = SurfaceRenderer::new(window.clone(), settings)
            .context("failed to initialize GPU renderer")?;

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(scale as f32),
            None,
            None,
        );
        let egui_renderer =
            egui_wgpu::Renderer::new(renderer.device(), renderer.format(), None, 1, false);

        self.viewer = Some(ViewerContext::new(&self.config, renderer));
        self.window = Some(window);
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);
        Ok(())
    }

    /// Join the background loads and attach the house to the scene. On
    /// failure the error is reported in the panel.
    fn install(&mut self) -> Result<()> {
        let Some(viewer) = self.viewer.as_mut() else {
            anyhow::bail!("viewer is not initialized");
        };
        let assets = match self.pending.take() {
            Some(pending) => pending.join(),
            None => anyhow::bail!("assets were already consumed"),
        };
        if let Err(e) = assets.and_then(|assets| viewer.install_assets(assets)) {
            viewer.report_error(&e);
            return Err(e).context("failed to load the house scene");
        }
        tracing::info!("viewer ready");
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(viewer), Some(window), Some(egui_winit), Some(egui_renderer)) = (
            self.viewer.as_mut(),
            self.window.as_ref(),
            self.egui_winit.as_mut(),
            self.egui_renderer.as_mut(),
        ) else {
            return;
        };

        let result = if self.load_failed {
            viewer.renderer.clear_frame()
        } else {
            match self.frames.tick(viewer) {
                Some(result) => result,
                None => return,
            }
        };
        let frame = match result {
            Ok(frame) => frame,
            Err(e) => {
                match frame_failure(&e, self.frames.token()) {
                    FrameFailure::Retry => {
                        tracing::debug!("skipping frame: {e}");
                        window.request_redraw();
                    }
                    FrameFailure::Exit => {
                        tracing::error!("render error: {e}");
                        if self.exit_error.is_none() {
                            let err = anyhow::Error::new(e).context("rendering failed");
                            self.exit_error = Some(err);
                        }
                        event_loop.exit();
                    }
                }
                return;
            }
        };

        let raw_input = egui_winit.take_egui_input(window);
        let mut picked = None;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            picked = viewer.panel.show(ctx);
        });
        egui_winit.handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [frame.size.0, frame.size.1],
            pixels_per_point: full_output.pixels_per_point,
        };

        {
            let device = viewer.renderer.device();
            let queue = viewer.renderer.queue();
            for (id, image_delta) in &full_output.textures_delta.set {
                egui_renderer.update_texture(device, queue, *id, image_delta);
            }
            let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
            egui_renderer.update_buffers(
                device,
                queue,
                &mut encoder,
                &paint_jobs,
                &screen_descriptor,
            );
            {
                let mut pass = encoder
                    .begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("egui_pass"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view: &frame.view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Load,
                                store: wgpu::StoreOp::Store,
                            },
                        })],
                        depth_stencil_attachment: None,
                        ..Default::default()
                    })
                    .forget_lifetime();
                egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
            }
            queue.submit(std::iter::once(encoder.finish()));
            for id in &full_output.textures_delta.free {
                egui_renderer.free_texture(id);
            }
        }

        frame.present();

        if let Some(color) = picked {
            viewer.set_fog_color(color);
        }
        if self.frames.is_running() {
            window.request_redraw();
        }
    }

    fn pointer(&mut self, input: PointerInput) {
        if let Some(viewer) = &mut self.viewer {
            viewer.pointer(input);
        }
    }

    fn resize(&mut self, size: PhysicalSize<u32>, scale: f64) {
        if let Some(viewer) = &mut self.viewer {
            viewer.handle_resize(logical(size, scale), scale);
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            tracing::error!("{e:#}");
            self.exit_error = Some(e);
            self.frames.token().cancel();
            event_loop.exit();
            return;
        }
        if let Err(e) = self.install() {
            // Keep the window up so the panel can show the error until the
            // user closes it; the frame loop never starts.
            tracing::error!("{e:#}");
            self.exit_error = Some(e);
            self.load_failed = true;
            self.frames.token().cancel();
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(egui_winit), Some(window)) = (&mut self.egui_winit, &self.window) {
            let response = egui_winit.on_window_event(window, &event);
            if response.repaint && self.load_failed {
                window.request_redraw();
            }
            if response.consumed {
                return;
            }
        }

        let scale = self.window.as_ref().map_or(1.0, |w| w.scale_factor());
        match event {
            WindowEvent::CloseRequested => {
                self.frames.token().cancel();
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => self.resize(new_size, scale),
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(size) = self.window.as_ref().map(|w| w.inner_size()) {
                    self.resize(size, scale_factor);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let p = position.to_logical::<f32>(scale);
                self.cursor = (p.x, p.y);
                self.pointer(PointerInput::Move { x: p.x, y: p.y });
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => {
                let (x, y) = self.cursor;
                self.pointer(match state {
                    ElementState::Pressed => PointerInput::Down { x, y },
                    ElementState::Released => PointerInput::Up,
                });
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32,
                };
                self.pointer(PointerInput::Wheel { delta });
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("bakedscene-desktop starting");

    let mut config = ViewerConfig::with_asset_dir(cli.asset_dir);
    config.decoder_dir = cli.decoder_dir;
    if let Some(color) = cli.fog_color {
        config.fog.color = color;
    }

    let pending =
        bakedscene_viewer::spawn_scene_loads(&config).context("failed to start asset loads")?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, pending);
    event_loop.run_app(&mut app)?;

    match app.exit_error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_render_errors_retry_with_loop_live() {
        let token = ShutdownToken::new();
        for err in [
            RenderError::SurfaceReconfigured,
            RenderError::Surface(wgpu::SurfaceError::Timeout),
        ] {
            assert_eq!(frame_failure(&err, &token), FrameFailure::Retry);
        }
        assert!(!token.is_cancelled());
    }

    #[test]
    fn fatal_render_errors_stop_the_loop() {
        for err in [
            RenderError::Surface(wgpu::SurfaceError::OutOfMemory),
            RenderError::Surface(wgpu::SurfaceError::Other),
        ] {
            let token = ShutdownToken::new();
            let frames = FrameLoop::new(token.clone());
            assert_eq!(frame_failure(&err, &token), FrameFailure::Exit);
            assert!(!frames.is_running());
        }
    }
}
