//! Light set for the deferred lighting pass.
//!
//! The host renders sprites into a G-buffer and then accumulates every light
//! returned by [`LightSet::visible_lights`]. [`LightSet::light_at`] evaluates
//! the same model on the CPU for gameplay (stealth, plant growth, ...).

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::core::color::Rgba;
use crate::renderer::camera::Camera2D;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec2,
    pub color: Rgba,
    pub intensity: f32,
    /// Falloff distance in world units.
    pub radius: f32,
    /// Height above the sprite plane, used for normal mapping.
    pub z: f32,
}

impl PointLight {
    pub fn new(position: Vec2, color: Rgba, intensity: f32, radius: f32) -> Self {
        Self {
            position,
            color,
            intensity,
            radius,
            z: 50.0,
        }
    }

    pub fn with_z(mut self, z: f32) -> Self {
        self.z = z;
        self
    }

    /// `(1 - d/r)^2` inside the radius, zero outside.
    pub fn attenuation(&self, point: Vec2) -> f32 {
        if self.radius <= 0.0 {
            return 0.0;
        }
        let d = self.position.distance(point);
        if d >= self.radius {
            return 0.0;
        }
        let t = 1.0 - d / self.radius;
        t * t
    }
}

/// A point light restricted to a cone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    pub light: PointLight,
    /// Normalized direction the cone points at.
    pub direction: Vec2,
    /// Half-angle of the cone in radians.
    pub cone_angle: f32,
}

impl SpotLight {
    pub fn new(light: PointLight, direction: Vec2, cone_angle: f32) -> Self {
        Self {
            light,
            direction: direction.normalize_or_zero(),
            cone_angle,
        }
    }

    pub fn attenuation(&self, point: Vec2) -> f32 {
        let to_point = point - self.light.position;
        if to_point.length_squared() > f32::EPSILON {
            let cos = self.direction.dot(to_point.normalize());
            if cos < self.cone_angle.cos() {
                return 0.0;
            }
        }
        self.light.attenuation(point)
    }
}

/// Light arriving from infinitely far away, e.g. the sun.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub direction: Vec2,
    pub color: Rgba,
    pub intensity: f32,
}

/// GPU-facing light record, 12 floats.
///
/// `kind` is 0 for point, 1 for spot and 2 for directional lights. For
/// directional lights `x, y` hold the direction and radius is zero.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct LightInstance {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub radius: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub intensity: f32,
    pub dir_x: f32,
    pub dir_y: f32,
    pub cos_cone: f32,
    pub kind: f32,
}

impl LightInstance {
    pub const FLOATS: usize = 12;

    fn point(light: &PointLight) -> Self {
        Self {
            x: light.position.x,
            y: light.position.y,
            z: light.z,
            radius: light.radius,
            r: light.color.r,
            g: light.color.g,
            b: light.color.b,
            intensity: light.intensity,
            dir_x: 0.0,
            dir_y: 0.0,
            cos_cone: -1.0,
            kind: 0.0,
        }
    }

    fn spot(spot: &SpotLight) -> Self {
        Self {
            dir_x: spot.direction.x,
            dir_y: spot.direction.y,
            cos_cone: spot.cone_angle.cos(),
            kind: 1.0,
            ..Self::point(&spot.light)
        }
    }

    fn directional(light: &DirectionalLight) -> Self {
        Self {
            x: light.direction.x,
            y: light.direction.y,
            r: light.color.r,
            g: light.color.g,
            b: light.color.b,
            intensity: light.intensity,
            kind: 2.0,
            ..Self::default()
        }
    }
}

/// All lights of a scene plus the ambient term.
///
/// The ambient color defaults to white, which leaves sprites unlit when no
/// lights are present.
#[derive(Debug, Clone)]
pub struct LightSet {
    pub ambient: Rgba,
    pub point: Vec<PointLight>,
    pub spot: Vec<SpotLight>,
    pub directional: Vec<DirectionalLight>,
}

impl LightSet {
    pub fn new() -> Self {
        Self {
            ambient: Rgba::WHITE,
            point: Vec::new(),
            spot: Vec::new(),
            directional: Vec::new(),
        }
    }

    pub fn add_point(&mut self, light: PointLight) -> usize {
        self.point.push(light);
        self.point.len() - 1
    }

    pub fn add_spot(&mut self, light: SpotLight) -> usize {
        self.spot.push(light);
        self.spot.len() - 1
    }

    pub fn add_directional(&mut self, light: DirectionalLight) -> usize {
        self.directional.push(light);
        self.directional.len() - 1
    }

    /// Remove every light; the ambient color is kept.
    pub fn clear(&mut self) {
        self.point.clear();
        self.spot.clear();
        self.directional.clear();
    }

    pub fn len(&self) -> usize {
        self.point.len() + self.spot.len() + self.directional.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lights whose radius reaches into the camera view, in draw order:
    /// directional, point, spot.
    pub fn visible_lights(&self, camera: &Camera2D) -> Vec<LightInstance> {
        let mut out = Vec::with_capacity(self.len());
        out.extend(self.directional.iter().map(LightInstance::directional));
        out.extend(
            self.point
                .iter()
                .filter(|l| camera.is_circle_visible(l.position, l.radius))
                .map(LightInstance::point),
        );
        out.extend(
            self.spot
                .iter()
                .filter(|s| camera.is_circle_visible(s.light.position, s.light.radius))
                .map(LightInstance::spot),
        );
        out
    }

    /// Light reaching `position`, ignoring normals and occluders. Channels are
    /// clamped to [0, 1]; alpha is always 1.
    pub fn light_at(&self, position: Vec2) -> Rgba {
        let mut total = [self.ambient.r, self.ambient.g, self.ambient.b];
        let mut add = |color: Rgba, amount: f32| {
            total[0] += color.r * amount;
            total[1] += color.g * amount;
            total[2] += color.b * amount;
        };

        for light in &self.directional {
            add(light.color, light.intensity);
        }
        for light in &self.point {
            add(light.color, light.intensity * light.attenuation(position));
        }
        for spot in &self.spot {
            add(spot.light.color, spot.light.intensity * spot.attenuation(position));
        }

        Rgba::rgb(
            total[0].clamp(0.0, 1.0),
            total[1].clamp(0.0, 1.0),
            total[2].clamp(0.0, 1.0),
        )
    }
}

impl Default for LightSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dark() -> LightSet {
        let mut set = LightSet::new();
        set.ambient = Rgba::rgb(0.1, 0.1, 0.1);
        set
    }

    #[test]
    fn light_instance_layout() {
        assert_eq!(std::mem::size_of::<LightInstance>(), LightInstance::FLOATS * 4);
    }

    #[test]
    fn point_falloff_is_quadratic() {
        let light = PointLight::new(Vec2::ZERO, Rgba::WHITE, 1.0, 100.0);
        assert_eq!(light.attenuation(Vec2::ZERO), 1.0);
        assert!((light.attenuation(Vec2::new(50.0, 0.0)) - 0.25).abs() < 1e-6);
        assert_eq!(light.attenuation(Vec2::new(100.0, 0.0)), 0.0);
        assert_eq!(light.attenuation(Vec2::new(0.0, 150.0)), 0.0);
    }

    #[test]
    fn light_at_sums_and_clamps() {
        let mut set = dark();
        set.add_point(PointLight::new(Vec2::ZERO, Rgba::RED, 1.0, 100.0));
        let lit = set.light_at(Vec2::new(50.0, 0.0));
        assert!((lit.r - 0.35).abs() < 1e-5);
        assert!((lit.g - 0.1).abs() < 1e-5);

        set.add_point(PointLight::new(Vec2::ZERO, Rgba::RED, 4.0, 100.0));
        assert_eq!(set.light_at(Vec2::ZERO).r, 1.0);
        assert_eq!(set.light_at(Vec2::new(500.0, 0.0)).r, 0.1);
    }

    #[test]
    fn spot_only_lights_inside_cone() {
        let mut set = dark();
        let base = PointLight::new(Vec2::ZERO, Rgba::WHITE, 1.0, 100.0);
        set.add_spot(SpotLight::new(base, Vec2::X, 0.5));
        assert!(set.light_at(Vec2::new(20.0, 0.0)).r > 0.1);
        assert!((set.light_at(Vec2::new(-20.0, 0.0)).r - 0.1).abs() < 1e-6);
        assert!((set.light_at(Vec2::new(0.0, 20.0)).r - 0.1).abs() < 1e-6);
    }

    #[test]
    fn directional_lights_are_uniform() {
        let mut set = dark();
        set.add_directional(DirectionalLight {
            direction: Vec2::new(0.0, 1.0),
            color: Rgba::BLUE,
            intensity: 0.5,
        });
        assert_eq!(set.light_at(Vec2::new(-1e4, 3.0)), set.light_at(Vec2::ZERO));
        assert!((set.light_at(Vec2::ZERO).b - 0.6).abs() < 1e-6);
    }

    #[test]
    fn visible_lights_culls_by_radius() {
        let mut camera = Camera2D::new(100.0, 100.0);
        camera.center = Vec2::new(50.0, 50.0);

        let mut set = LightSet::new();
        set.add_point(PointLight::new(Vec2::new(50.0, 50.0), Rgba::WHITE, 1.0, 10.0));
        set.add_point(PointLight::new(Vec2::new(-30.0, 50.0), Rgba::WHITE, 1.0, 40.0));
        set.add_point(PointLight::new(Vec2::new(-300.0, 50.0), Rgba::WHITE, 1.0, 40.0));
        set.add_directional(DirectionalLight {
            direction: Vec2::Y,
            color: Rgba::WHITE,
            intensity: 0.2,
        });

        let visible = set.visible_lights(&camera);
        assert_eq!(visible.len(), 3);
        assert_eq!(visible[0].kind, 2.0);
        assert!(visible[1..].iter().all(|l| l.kind == 0.0));

        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.ambient, Rgba::WHITE);
    }
}
