use crate::{SceneAssets, ViewerConfig, ViewerError};
use bakedscene_common::{Color, NodeId, ViewportSize};
use bakedscene_controls::{OrbitControls, PointerInput};
use bakedscene_materials::{MaterialLibrary, MaterialSlot};
use bakedscene_render::{PerspectiveCamera, Renderer};
use bakedscene_scene::{Scene, assemble};
use bakedscene_tools::DebugPanel;

/// Owns all viewer state: scene, camera, controls, renderer and debug panel.
///
/// Event handlers and the frame loop mutate state only through this type.
pub struct ViewerContext<R: Renderer> {
    pub scene: Scene,
    pub camera: PerspectiveCamera,
    pub controls: OrbitControls,
    pub renderer: R,
    pub panel: DebugPanel,
    viewport: ViewportSize,
    model: Option<NodeId>,
}

impl<R: Renderer> ViewerContext<R> {
    /// Build the empty scene with its camera, and sync the renderer's clear
    /// color and the camera aspect to the starting state.
    pub fn new(config: &ViewerConfig, mut renderer: R) -> Self {
        let mut scene = Scene::with_materials(config.fog, MaterialLibrary::baked_scene());
        scene.add_camera("camera");

        let mut panel = DebugPanel::new(config.fog.color);
        panel.width = config.panel_width;

        renderer.set_clear_color(config.fog.color);
        let viewport = renderer.settings().size;

        let mut camera = config.camera;
        if !viewport.is_empty() {
            camera.set_aspect(viewport.aspect());
        }

        Self {
            scene,
            camera,
            controls: OrbitControls::new(config.controls),
            renderer,
            panel,
            viewport,
            model: None,
        }
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    /// Scene child id of the attached house, once installed.
    pub fn model(&self) -> Option<NodeId> {
        self.model
    }

    /// React to a viewport change. Zero-sized viewports are ignored.
    /// Returns true if anything was applied.
    pub fn handle_resize(&mut self, size: ViewportSize, device_ratio: f64) -> bool {
        if size.is_empty() {
            tracing::debug!("ignoring resize to {}x{}", size.width, size.height);
            return false;
        }
        self.viewport = size;
        self.camera.set_aspect(size.aspect());
        self.renderer.set_size(size);
        self.renderer.set_pixel_ratio(device_ratio);
        tracing::debug!(
            "resized to {}x{} @{:.2}",
            size.width,
            size.height,
            self.renderer.settings().pixel_ratio
        );
        true
    }

    /// Push a new fog color into the scene fog and the renderer clear color.
    /// Returns false when the color is already current.
    pub fn set_fog_color(&mut self, color: Color) -> bool {
        if !self.scene.set_fog_color(color) {
            return false;
        }
        self.renderer.set_clear_color(color);
        self.panel.fog_color = color;
        tracing::info!("fog color set to {color}");
        true
    }

    /// Attach the loaded house and bind its baked textures.
    ///
    /// Assembly runs first so a model with missing nodes leaves the scene and
    /// materials untouched. The error is also shown on the panel.
    pub fn install_assets(&mut self, assets: SceneAssets) -> Result<NodeId, ViewerError> {
        let result = self.try_install(assets);
        if let Err(e) = &result {
            tracing::error!("failed to install scene assets: {e}");
            self.panel.set_status(e.to_string());
        }
        result
    }

    fn try_install(&mut self, assets: SceneAssets) -> Result<NodeId, ViewerError> {
        let id = assemble(&mut self.scene, assets.model)?;
        let materials = self.scene.materials_mut();
        materials.bind_texture(MaterialSlot::Baked, assets.baked)?;
        materials.bind_texture(MaterialSlot::BakedEnvironment, assets.environment)?;
        self.model = Some(id);
        self.panel.clear_status();
        Ok(id)
    }

    /// Record a failure that happened before the context could install
    /// anything, e.g. a load error.
    pub fn report_error(&mut self, err: &ViewerError) {
        tracing::error!("{err}");
        self.panel.set_status(err.to_string());
    }

    /// Route pointer input to the orbit controls.
    pub fn pointer(&mut self, input: PointerInput) -> bool {
        self.controls.handle(input, self.viewport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FrameLoop, ShutdownToken, load_scene_assets};
    use crate::test_support::write_house;
    use bakedscene_assets::TextureData;
    use bakedscene_common::{ModelFragment, ModelNode};
    use bakedscene_render::{DebugTextRenderer, RendererSettings};
    use bakedscene_scene::{AssemblyError, REQUIRED_NODES, SceneEvent};
    use glam::Mat4;

    fn context() -> ViewerContext<DebugTextRenderer> {
        ViewerContext::new(&ViewerConfig::default(), DebugTextRenderer::default())
    }

    fn assets(names: &[&str]) -> SceneAssets {
        SceneAssets {
            baked: TextureData::solid("bakedHouse", [255, 0, 0, 255]),
            environment: TextureData::solid("bakedEnvironment", [0, 255, 0, 255]),
            model: ModelFragment {
                name: "house".into(),
                children: names.iter().map(|n| ModelNode::named(*n)).collect(),
            },
        }
    }

    fn all_names() -> Vec<&'static str> {
        REQUIRED_NODES.iter().map(|r| r.name).collect()
    }

    #[test]
    fn new_context_syncs_clear_color_and_aspect() {
        let renderer = DebugTextRenderer::new(RendererSettings {
            size: ViewportSize::new(800, 400),
            ..RendererSettings::default()
        });
        let ctx = ViewerContext::new(&ViewerConfig::default(), renderer);
        assert_eq!(ctx.renderer.settings().clear_color.to_hex(), "#263740");
        assert_eq!(ctx.camera.aspect, 2.0);
        assert_eq!(ctx.scene.child_count(), 1);
        assert_eq!(ctx.panel.width, 400.0);
    }

    #[test]
    fn resize_updates_camera_and_renderer() {
        let mut ctx = context();
        assert!(ctx.handle_resize(ViewportSize::new(1024, 768), 3.0));
        assert!((ctx.camera.aspect - 1024.0 / 768.0).abs() < 1e-6);
        assert_eq!(
            ctx.camera.projection_matrix(),
            Mat4::perspective_rh(45f32.to_radians(), 1024.0 / 768.0, 0.1, 100.0)
        );
        let settings = ctx.renderer.settings();
        assert_eq!(settings.size, ViewportSize::new(1024, 768));
        assert_eq!(settings.pixel_ratio, 2.0);
        assert_eq!(ctx.viewport(), ViewportSize::new(1024, 768));
    }

    #[test]
    fn zero_sized_resize_is_ignored() {
        let mut ctx = context();
        let before = ctx.camera.aspect;
        assert!(!ctx.handle_resize(ViewportSize::new(0, 600), 1.0));
        assert!(!ctx.handle_resize(ViewportSize::new(800, 0), 1.0));
        assert_eq!(ctx.camera.aspect, before);
        assert_eq!(ctx.renderer.settings().size, ViewportSize::new(1280, 720));
    }

    #[test]
    fn fog_color_updates_clear_and_fog() {
        let mut ctx = context();
        let c = Color::from_hex("#ff8800").unwrap();
        assert!(ctx.set_fog_color(c));
        assert_eq!(ctx.renderer.settings().clear_color, c);
        assert_eq!(ctx.scene.fog().color, c);
        assert_eq!(ctx.panel.fog_color, c);

        let events = ctx.scene.events().len();
        assert!(!ctx.set_fog_color(c));
        assert_eq!(ctx.scene.events().len(), events);
    }

    #[test]
    fn install_assets_attaches_house_and_binds_maps() {
        let mut ctx = context();
        let id = ctx.install_assets(assets(&all_names())).unwrap();
        assert_eq!(ctx.model(), Some(id));
        assert_eq!(ctx.scene.child_count(), 2);
        assert!(ctx.scene.materials().is_ready());
        assert!(ctx.panel.status().is_none());
        let assigned = ctx
            .scene
            .events()
            .iter()
            .filter(|e| matches!(e, SceneEvent::MaterialAssigned { .. }))
            .count();
        assert_eq!(assigned, 5);
    }

    #[test]
    fn install_with_missing_node_leaves_state_untouched() {
        let mut ctx = context();
        let names: Vec<_> = all_names()
            .into_iter()
            .filter(|n| *n != "poleLightB")
            .collect();
        let revision = ctx.scene.materials().revision();

        let err = ctx.install_assets(assets(&names)).unwrap_err();
        assert!(matches!(
            err,
            ViewerError::Assembly(AssemblyError::MissingNode("poleLightB"))
        ));
        assert_eq!(ctx.scene.child_count(), 1);
        assert_eq!(ctx.scene.materials().revision(), revision);
        assert!(!ctx.scene.materials().is_ready());
        assert_eq!(ctx.panel.status(), Some("missing expected node: poleLightB"));
        assert!(ctx.model().is_none());
    }

    #[test]
    fn loads_from_disk_and_installs() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_house(dir.path(), &all_names());
        let mut ctx = ViewerContext::new(&config, DebugTextRenderer::default());
        let loaded = load_scene_assets(&config).unwrap();
        ctx.install_assets(loaded).unwrap();

        let output = ctx.renderer.render(&ctx.scene, &ctx.camera);
        assert!(output.contains("bakedModel tris=1 material=baked"));
        assert!(output.contains("bakedEnv tris=1 material=bakedEnv"));
    }

    #[test]
    fn load_failure_is_shown_in_panel_and_nothing_renders() {
        let dir = tempfile::tempdir().unwrap();
        let config = ViewerConfig::with_asset_dir(dir.path());
        let mut ctx = ViewerContext::new(&config, DebugTextRenderer::default());

        let err = load_scene_assets(&config).unwrap_err();
        ctx.report_error(&err);
        let status = ctx.panel.status().unwrap();
        assert!(status.contains("bakedHouse.jpg"), "{status}");

        let token = ShutdownToken::new();
        token.cancel();
        let mut frames = FrameLoop::new(token);
        assert!(frames.tick(&mut ctx).is_none());
        assert_eq!(ctx.renderer.frames_rendered(), 0);
        assert_eq!(ctx.scene.child_count(), 1);
    }

    #[test]
    fn pointer_input_reaches_controls() {
        let mut ctx = context();
        assert!(ctx.pointer(PointerInput::Down { x: 10.0, y: 10.0 }));
        assert!(ctx.controls.is_dragging());
        assert!(!ctx.pointer(PointerInput::Wheel { delta: 1.0 }));
    }
}
