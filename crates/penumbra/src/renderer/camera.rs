use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2};

use crate::core::rect::Rect;

/// Orthographic camera for a Y-down 2D world.
///
/// The host maps screen pixels onto `width x height` world units centred on
/// `center`. Screen (0, 0) is the top-left corner of the viewport.
#[derive(Debug, Clone)]
pub struct Camera2D {
    /// Visible width in world units.
    pub width: f32,
    /// Visible height in world units.
    pub height: f32,
    pub center: Vec2,
    /// The camera never shows anything outside this rectangle.
    pub bounds: Option<Rect>,
    /// Follow smoothing (0.0 = instant, 0.99 = very slow).
    pub smoothing: f32,
}

/// GPU-side uniform data for the camera.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub projection: [[f32; 4]; 4],
}

impl Camera2D {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            center: Vec2::new(width, height) * 0.5,
            bounds: None,
            smoothing: 0.0,
        }
    }

    pub fn half_size(&self) -> Vec2 {
        Vec2::new(self.width, self.height) * 0.5
    }

    /// The world-space rectangle currently in view.
    pub fn view_rect(&self) -> Rect {
        let half = self.half_size();
        Rect::from_corners(self.center - half, self.center + half)
    }

    /// Projection with +Y pointing down the screen, Z in [0, 1].
    pub fn projection_matrix(&self) -> Mat4 {
        let view = self.view_rect();
        let (min, max) = (view.min(), view.max());
        Mat4::orthographic_rh(min.x, max.x, max.y, min.y, 0.0, 1.0)
    }

    pub fn uniform(&self) -> CameraUniform {
        CameraUniform {
            projection: self.projection_matrix().to_cols_array_2d(),
        }
    }

    /// Fit `game_width x game_height` inside a viewport, widening the view on
    /// the longer axis instead of stretching.
    pub fn resize(
        &mut self,
        viewport_width: f32,
        viewport_height: f32,
        game_width: f32,
        game_height: f32,
    ) {
        let scale = (viewport_width / game_width).min(viewport_height / game_height);
        self.width = viewport_width / scale;
        self.height = viewport_height / scale;
        self.clamp_to_bounds();
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = Some(bounds);
        self.clamp_to_bounds();
    }

    pub fn clear_bounds(&mut self) {
        self.bounds = None;
    }

    pub fn set_smoothing(&mut self, smoothing: f32) {
        self.smoothing = smoothing.clamp(0.0, 0.99);
    }

    pub fn look_at(&mut self, target: Vec2) {
        self.center = target;
        self.clamp_to_bounds();
    }

    /// Move toward `target`; call once per frame.
    pub fn follow(&mut self, target: Vec2, dt: f32) {
        if self.smoothing <= 0.0 {
            self.look_at(target);
        } else {
            let t = 1.0 - self.smoothing.powf(dt * 60.0);
            self.center += (target - self.center) * t;
            self.clamp_to_bounds();
        }
    }

    fn clamp_to_bounds(&mut self) {
        let Some(bounds) = self.bounds else {
            return;
        };
        let half = self.half_size();
        let (min, max) = (bounds.min(), bounds.max());

        // Centre on an axis where the view is larger than the bounds.
        self.center.x = if self.width >= bounds.width {
            bounds.center().x
        } else {
            self.center.x.clamp(min.x + half.x, max.x - half.x)
        };
        self.center.y = if self.height >= bounds.height {
            bounds.center().y
        } else {
            self.center.y.clamp(min.y + half.y, max.y - half.y)
        };
    }

    pub fn is_visible(&self, point: Vec2) -> bool {
        self.view_rect().contains(point)
    }

    pub fn is_rect_visible(&self, rect: &Rect) -> bool {
        self.view_rect().intersects(rect)
    }

    pub fn is_circle_visible(&self, center: Vec2, radius: f32) -> bool {
        let view = self.view_rect();
        let nearest = center.clamp(view.min(), view.max());
        nearest.distance_squared(center) <= radius * radius
    }

    /// Convert host viewport pixels to world units.
    pub fn screen_to_world(&self, screen: Vec2, viewport: Vec2) -> Vec2 {
        if viewport.x <= 0.0 || viewport.y <= 0.0 {
            return self.center;
        }
        let normalized = screen / viewport - Vec2::splat(0.5);
        self.center + normalized * Vec2::new(self.width, self.height)
    }

    pub fn world_to_screen(&self, world: Vec2, viewport: Vec2) -> Vec2 {
        let normalized = (world - self.center) / Vec2::new(self.width, self.height);
        (normalized + Vec2::splat(0.5)) * viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_maps_view_corners_to_clip_space() {
        let cam = Camera2D::new(800.0, 600.0);
        let m = cam.projection_matrix();
        let top_left = m.project_point3(glam::Vec3::new(0.0, 0.0, 0.0));
        let bottom_right = m.project_point3(glam::Vec3::new(800.0, 600.0, 0.0));
        assert!((top_left.x + 1.0).abs() < 1e-5 && (top_left.y - 1.0).abs() < 1e-5);
        assert!((bottom_right.x - 1.0).abs() < 1e-5 && (bottom_right.y + 1.0).abs() < 1e-5);
    }

    #[test]
    fn resize_maintains_aspect() {
        let mut cam = Camera2D::new(800.0, 600.0);
        cam.resize(1920.0, 1080.0, 800.0, 600.0);
        assert!((cam.width / cam.height - 1920.0 / 1080.0).abs() < 0.01);
        assert!(cam.height >= 600.0 - 1e-3);
    }

    #[test]
    fn bounds_clamp_camera() {
        let mut cam = Camera2D::new(100.0, 100.0);
        cam.set_bounds(Rect::new(0.0, 0.0, 500.0, 400.0));

        cam.look_at(Vec2::ZERO);
        assert_eq!(cam.center, Vec2::new(50.0, 50.0));

        cam.look_at(Vec2::new(1000.0, 1000.0));
        assert_eq!(cam.center, Vec2::new(450.0, 350.0));

        cam.clear_bounds();
        cam.look_at(Vec2::new(-500.0, -500.0));
        assert_eq!(cam.center, Vec2::new(-500.0, -500.0));
    }

    #[test]
    fn oversized_view_centres_on_bounds() {
        let mut cam = Camera2D::new(1000.0, 50.0);
        cam.set_bounds(Rect::new(0.0, 0.0, 200.0, 200.0));
        cam.look_at(Vec2::new(0.0, 0.0));
        assert_eq!(cam.center, Vec2::new(100.0, 25.0));
    }

    #[test]
    fn follow_with_smoothing_interpolates() {
        let mut cam = Camera2D::new(100.0, 100.0);
        cam.center = Vec2::ZERO;
        cam.follow(Vec2::new(10.0, 10.0), 0.016);
        assert_eq!(cam.center, Vec2::new(10.0, 10.0));

        cam.set_smoothing(0.9);
        cam.follow(Vec2::new(110.0, 110.0), 0.016);
        assert!(cam.center.x > 10.0 && cam.center.x < 110.0);
    }

    #[test]
    fn visibility_tests() {
        let mut cam = Camera2D::new(100.0, 100.0);
        cam.center = Vec2::new(50.0, 50.0);

        assert!(cam.is_visible(Vec2::new(0.0, 0.0)));
        assert!(!cam.is_visible(Vec2::new(-1.0, 50.0)));
        assert!(cam.is_rect_visible(&Rect::new(-15.0, 40.0, 20.0, 20.0)));
        assert!(!cam.is_rect_visible(&Rect::new(-60.0, 40.0, 20.0, 20.0)));
        assert!(cam.is_circle_visible(Vec2::new(-5.0, 50.0), 10.0));
        assert!(!cam.is_circle_visible(Vec2::new(-8.0, -8.0), 10.0));
    }

    #[test]
    fn screen_world_conversion() {
        let mut cam = Camera2D::new(400.0, 300.0);
        cam.center = Vec2::new(1000.0, 500.0);
        let viewport = Vec2::new(800.0, 600.0);

        assert_eq!(cam.screen_to_world(Vec2::new(400.0, 300.0), viewport), cam.center);
        assert_eq!(cam.screen_to_world(Vec2::ZERO, viewport), Vec2::new(800.0, 350.0));

        let world = Vec2::new(900.0, 600.0);
        let back = cam.screen_to_world(cam.world_to_screen(world, viewport), viewport);
        assert!(back.distance(world) < 1e-3);
    }
}
