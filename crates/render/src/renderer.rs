use crate::camera::PerspectiveCamera;
use bakedscene_assets::ColorSpace;
use bakedscene_common::{Color, ViewportSize};
use bakedscene_scene::{Scene, SceneObject};
use glam::Mat4;
use std::fmt::Write;

/// Highest pixel ratio a renderer will use, regardless of the display.
pub const MAX_PIXEL_RATIO: f64 = 2.0;

/// Output state shared by every renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RendererSettings {
    /// Logical size of the drawing surface.
    pub size: ViewportSize,
    /// Physical pixels per logical pixel, already clamped.
    pub pixel_ratio: f64,
    pub output_color_space: ColorSpace,
    pub clear_color: Color,
    pub antialias: bool,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            size: ViewportSize::new(1280, 720),
            pixel_ratio: 1.0,
            output_color_space: ColorSpace::Srgb,
            clear_color: Color::from_rgb(0, 0, 0),
            antialias: true,
        }
    }
}

impl RendererSettings {
    /// Store `min(device_ratio, 2)`; non-finite or non-positive ratios fall
    /// back to 1.
    pub fn set_pixel_ratio(&mut self, device_ratio: f64) {
        self.pixel_ratio = if device_ratio.is_finite() && device_ratio > 0.0 {
            device_ratio.min(MAX_PIXEL_RATIO)
        } else {
            1.0
        };
    }

    /// Size of the backing buffer in physical pixels, never below 1x1.
    pub fn drawing_buffer_size(&self) -> (u32, u32) {
        let scale = |v: u32| ((v as f64 * self.pixel_ratio).round() as u32).max(1);
        (scale(self.size.width), scale(self.size.height))
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the scene and camera and produces output. It never
/// mutates the scene.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    fn settings(&self) -> &RendererSettings;

    fn settings_mut(&mut self) -> &mut RendererSettings;

    /// Called after the size or pixel ratio changed.
    fn on_resize(&mut self) {}

    fn set_size(&mut self, size: ViewportSize) {
        self.settings_mut().size = size;
        self.on_resize();
    }

    fn set_pixel_ratio(&mut self, device_ratio: f64) {
        self.settings_mut().set_pixel_ratio(device_ratio);
        self.on_resize();
    }

    fn set_clear_color(&mut self, color: Color) {
        self.settings_mut().clear_color = color;
    }

    /// Render one frame of the scene as seen by the camera.
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Self::Output;
}

/// Text renderer for headless runs and tests.
///
/// Produces a human-readable description of what a frame would draw.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    settings: RendererSettings,
    frames: u64,
}

impl DebugTextRenderer {
    pub fn new(settings: RendererSettings) -> Self {
        Self {
            settings,
            frames: 0,
        }
    }

    /// Number of render calls issued so far.
    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut RendererSettings {
        &mut self.settings
    }

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> String {
        self.frames += 1;
        tracing::trace!("text frame {}", self.frames);
        let (bw, bh) = self.settings.drawing_buffer_size();
        let fog = scene.fog();

        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Frame {} ({}x{} @{:.2}, clear={}) ===",
            self.frames, bw, bh, self.settings.pixel_ratio, self.settings.clear_color
        );
        let _ = writeln!(
            out,
            "Fog: color={} near={:.1} far={:.1}",
            fog.color, fog.near, fog.far
        );
        let _ = writeln!(
            out,
            "Camera: pos=({:.2}, {:.2}, {:.2}) aspect={:.3} fov={:.0}",
            camera.position.x,
            camera.position.y,
            camera.position.z,
            camera.aspect,
            camera.fov_degrees
        );
        let _ = writeln!(out, "Children: {}", scene.child_count());

        for child in scene.children() {
            match &child.object {
                SceneObject::Camera => {
                    let _ = writeln!(out, "  [{}] camera {}", child.id.short(), child.name);
                }
                SceneObject::Model(fragment) => {
                    let _ = writeln!(out, "  [{}] model {}", child.id.short(), child.name);
                    fragment.visit(Mat4::IDENTITY, |node, world| {
                        let Some(mesh) = &node.mesh else { return };
                        let material = node
                            .material
                            .and_then(|h| scene.materials().get(h))
                            .map(|m| m.name.as_str())
                            .unwrap_or("default");
                        let depth = camera.view_depth(world.w_axis.truncate());
                        let _ = writeln!(
                            out,
                            "    {} tris={} material={} fog={:.2}",
                            node.name,
                            mesh.indices.len() / 3,
                            material,
                            fog.factor(depth)
                        );
                    });
                }
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bakedscene_common::{MeshData, ModelFragment, ModelNode};
    use bakedscene_materials::MaterialLibrary;
    use bakedscene_scene::{Fog, REQUIRED_NODES, assemble};

    fn triangle_node(name: &str) -> ModelNode {
        ModelNode {
            mesh: Some(MeshData {
                positions: vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
                uvs: vec![[0.0; 2]; 3],
                indices: vec![0, 1, 2],
            }),
            ..ModelNode::named(name)
        }
    }

    #[test]
    fn pixel_ratio_is_clamped_to_two() {
        let mut settings = RendererSettings::default();
        for (device, expected) in [(1.0, 1.0), (1.5, 1.5), (2.0, 2.0), (3.0, 2.0), (4.5, 2.0)] {
            settings.set_pixel_ratio(device);
            assert_eq!(settings.pixel_ratio, expected);
        }
        settings.set_pixel_ratio(f64::NAN);
        assert_eq!(settings.pixel_ratio, 1.0);
    }

    #[test]
    fn drawing_buffer_scales_with_ratio() {
        let mut settings = RendererSettings {
            size: ViewportSize::new(800, 600),
            ..RendererSettings::default()
        };
        settings.set_pixel_ratio(3.0);
        assert_eq!(settings.drawing_buffer_size(), (1600, 1200));
        settings.size = ViewportSize::new(0, 0);
        assert_eq!(settings.drawing_buffer_size(), (1, 1));
    }

    #[test]
    fn debug_renderer_empty_scene() {
        let mut renderer = DebugTextRenderer::default();
        let output = renderer.render(&Scene::new(), &PerspectiveCamera::default());
        assert!(output.contains("Frame 1"));
        assert!(output.contains("Children: 0"));
        assert!(output.contains("fov=45"));
        assert_eq!(renderer.frames_rendered(), 1);
    }

    #[test]
    fn debug_renderer_lists_assembled_meshes() {
        let mut scene = Scene::with_materials(Fog::default(), MaterialLibrary::baked_scene());
        scene.add_camera("camera");
        let fragment = ModelFragment {
            name: "house".into(),
            children: REQUIRED_NODES.iter().map(|r| triangle_node(r.name)).collect(),
        };
        assemble(&mut scene, fragment).unwrap();

        let mut renderer = DebugTextRenderer::default();
        let output = renderer.render(&scene, &PerspectiveCamera::default());
        assert!(output.contains("Children: 2"));
        assert!(output.contains("bakedModel tris=1 material=baked"));
        assert!(output.contains("poleLightB tris=1 material=poleLight"));
    }

    #[test]
    fn set_clear_color_updates_settings() {
        let mut renderer = DebugTextRenderer::default();
        let color = Color::from_hex("#263740").unwrap();
        renderer.set_clear_color(color);
        renderer.set_size(ViewportSize::new(640, 480));
        assert_eq!(renderer.settings().clear_color, color);
        let output = renderer.render(&Scene::new(), &PerspectiveCamera::default());
        assert!(output.contains("640x480"));
        assert!(output.contains("clear=#263740"));
    }
}
