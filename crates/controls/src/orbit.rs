use crate::pointer::PointerInput;
use bakedscene_common::ViewportSize;
use bakedscene_render::PerspectiveCamera;
use glam::{Vec2, Vec3};
use std::f32::consts::{PI, TAU};

const EPS: f32 = 1e-6;

/// Orbit control tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitConfig {
    pub enable_damping: bool,
    /// Fraction of the pending rotation applied per update when damping.
    pub damping_factor: f32,
    pub enable_zoom: bool,
    pub zoom_speed: f32,
    pub rotate_speed: f32,
    /// Polar angle band, in radians from the +Y axis.
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.05,
            enable_zoom: false,
            zoom_speed: 1.0,
            rotate_speed: 1.0,
            min_polar_angle: 1.0,
            max_polar_angle: 1.5,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
        }
    }
}

/// Spherical coordinates around the orbit target; phi is measured from +Y.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Spherical {
    pub radius: f32,
    pub phi: f32,
    pub theta: f32,
}

impl Spherical {
    pub fn from_offset(v: Vec3) -> Self {
        let radius = v.length();
        if radius == 0.0 {
            return Self::default();
        }
        Self {
            radius,
            theta: v.x.atan2(v.z),
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    pub fn to_offset(self) -> Vec3 {
        let sin_phi_r = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_r * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_r * self.theta.cos(),
        )
    }

    /// Keep phi off the poles so the view basis stays defined.
    pub fn make_safe(&mut self) {
        self.phi = self.phi.clamp(EPS, PI - EPS);
    }
}

/// Camera orbit around a target driven by pointer drags.
///
/// Input only accumulates a rotation delta; [`OrbitControls::update`] must
/// run every frame to move the camera, and with damping the motion eases out
/// over several frames.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub config: OrbitConfig,
    pub target: Vec3,
    pub enabled: bool,
    delta: Spherical,
    scale: f32,
    drag_from: Option<Vec2>,
}

impl OrbitControls {
    pub fn new(config: OrbitConfig) -> Self {
        Self {
            config,
            target: Vec3::ZERO,
            enabled: true,
            delta: Spherical::default(),
            scale: 1.0,
            drag_from: None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_from.is_some()
    }

    /// Current polar angle of `camera` around the target.
    pub fn polar_angle(&self, camera: &PerspectiveCamera) -> f32 {
        Spherical::from_offset(camera.position - self.target).phi
    }

    pub fn azimuthal_angle(&self, camera: &PerspectiveCamera) -> f32 {
        Spherical::from_offset(camera.position - self.target).theta
    }

    /// Feed one pointer event. Returns true if the controls consumed it.
    pub fn handle(&mut self, input: PointerInput, viewport: ViewportSize) -> bool {
        if !self.enabled {
            return false;
        }
        match input {
            PointerInput::Down { x, y } => {
                self.drag_from = Some(Vec2::new(x, y));
                true
            }
            PointerInput::Move { x, y } => {
                let Some(from) = self.drag_from else {
                    return false;
                };
                let to = Vec2::new(x, y);
                let d = (to - from) * self.config.rotate_speed;
                let height = viewport.height.max(1) as f32;
                self.rotate_left(TAU * d.x / height);
                self.rotate_up(TAU * d.y / height);
                self.drag_from = Some(to);
                true
            }
            PointerInput::Up => self.drag_from.take().is_some(),
            PointerInput::Wheel { delta } => {
                if !self.config.enable_zoom {
                    tracing::trace!("zoom disabled; ignoring wheel {delta}");
                    return false;
                }
                let step = 0.95f32.powf(self.config.zoom_speed);
                if delta > 0.0 {
                    self.scale /= step;
                } else if delta < 0.0 {
                    self.scale *= step;
                }
                true
            }
        }
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.delta.theta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.delta.phi -= angle;
    }

    /// Apply pending rotation to the camera. Returns true if it moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let before = camera.position;
        let mut spherical = Spherical::from_offset(camera.position - self.target);

        if self.config.enable_damping {
            spherical.theta += self.delta.theta * self.config.damping_factor;
            spherical.phi += self.delta.phi * self.config.damping_factor;
        } else {
            spherical.theta += self.delta.theta;
            spherical.phi += self.delta.phi;
        }

        spherical.phi = spherical
            .phi
            .clamp(self.config.min_polar_angle, self.config.max_polar_angle);
        spherical.make_safe();

        spherical.radius = (spherical.radius * self.scale)
            .clamp(self.config.min_distance, self.config.max_distance);

        camera.position = self.target + spherical.to_offset();
        camera.look_at(self.target);

        if self.config.enable_damping {
            self.delta.theta *= 1.0 - self.config.damping_factor;
            self.delta.phi *= 1.0 - self.config.damping_factor;
        } else {
            self.delta = Spherical::default();
        }
        self.scale = 1.0;

        (camera.position - before).length_squared() > EPS
    }
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new(OrbitConfig::default())
    }
}
