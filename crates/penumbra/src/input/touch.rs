use glam::Vec2;

use crate::renderer::camera::Camera2D;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchState {
    Pressed,
    Moved,
    Released,
}

/// One finger as reported by the host, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchLocation {
    pub id: u32,
    pub position: Vec2,
    pub state: TouchState,
}

impl TouchLocation {
    pub fn new(id: u32, position: Vec2, state: TouchState) -> Self {
        Self { id, position, state }
    }
}

/// Coordinate helpers for host touch samples.
pub trait TouchExt {
    /// Position divided by the backbuffer scale, for hosts that render to a
    /// scaled surface.
    fn scaled_position(&self, scale: Vec2) -> Vec2;

    /// Position in world space under `camera`.
    fn world_position(&self, camera: &Camera2D, viewport: Vec2) -> Vec2;

    fn is_down(&self) -> bool;
}

impl TouchExt for TouchLocation {
    fn scaled_position(&self, scale: Vec2) -> Vec2 {
        // A zero axis leaves that coordinate untouched.
        let safe = Vec2::select(scale.cmpeq(Vec2::ZERO), Vec2::ONE, scale);
        self.position / safe
    }

    fn world_position(&self, camera: &Camera2D, viewport: Vec2) -> Vec2 {
        camera.screen_to_world(self.position, viewport)
    }

    fn is_down(&self) -> bool {
        self.state != TouchState::Released
    }
}
