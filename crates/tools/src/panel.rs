use bakedscene_common::Color;

/// Fixed panel width in logical points.
pub const PANEL_WIDTH: f32 = 400.0;

/// Debug panel state: the fog color control and a status line.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugPanel {
    pub fog_color: Color,
    pub width: f32,
    status: Option<String>,
}

impl DebugPanel {
    pub fn new(fog_color: Color) -> Self {
        Self {
            fog_color,
            width: PANEL_WIDTH,
            status: None,
        }
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Show a message under the color control, e.g. a load failure.
    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    /// Draw the panel. Returns the new color when the user changed it.
    pub fn show(&mut self, ctx: &egui::Context) -> Option<Color> {
        let mut rgb = self.fog_color.to_array();
        let mut changed = false;

        egui::Window::new("Debug")
            .anchor(egui::Align2::RIGHT_TOP, [-8.0, 8.0])
            .default_width(self.width)
            .min_width(self.width)
            .resizable(false)
            .collapsible(true)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label("fogColor");
                    changed = ui.color_edit_button_srgb(&mut rgb).changed();
                    ui.monospace(Color::from_array(rgb).to_hex());
                });
                if let Some(status) = &self.status {
                    ui.separator();
                    ui.colored_label(egui::Color32::LIGHT_RED, status.as_str());
                }
            });

        if !changed {
            return None;
        }
        let color = Color::from_array(rgb);
        if color == self.fog_color {
            return None;
        }
        tracing::debug!("panel fogColor -> {color}");
        self.fog_color = color;
        Some(color)
    }
}
