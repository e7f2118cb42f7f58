use glam::Vec2;

/// A point mass integrated with position Verlet.
///
/// Velocity is implicit: it is the difference between `position` and
/// `last_position` over one fixed step.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub last_position: Vec2,
    /// Accumulated acceleration for the next step. Cleared after integration.
    pub acceleration: Vec2,
    pub mass: f32,
    /// Collision radius. Zero means the particle collides as a point.
    pub radius: f32,
    pub collides_with_colliders: bool,
    pub is_pinned: bool,
    pub pinned_position: Vec2,
}

impl Particle {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            last_position: position,
            acceleration: Vec2::ZERO,
            mass: 1.0,
            radius: 0.0,
            collides_with_colliders: true,
            is_pinned: false,
            pinned_position: position,
        }
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass.max(f32::EPSILON);
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius.max(0.0);
        self
    }

    pub fn with_collisions(mut self, enabled: bool) -> Self {
        self.collides_with_colliders = enabled;
        self
    }

    /// Accumulate a force for the next step (`a += f / m`).
    pub fn apply_force(&mut self, force: Vec2) {
        self.acceleration += force / self.mass;
    }

    /// Pin the particle where it currently is.
    pub fn pin(&mut self) {
        self.is_pinned = true;
        self.pinned_position = self.position;
    }

    /// Pin the particle to an arbitrary point. It snaps there on the next step.
    pub fn pin_to(&mut self, position: Vec2) {
        self.is_pinned = true;
        self.pinned_position = position;
    }

    pub fn unpin(&mut self) {
        self.is_pinned = false;
    }

    /// Displacement over the last step.
    pub fn velocity(&self) -> Vec2 {
        self.position - self.last_position
    }

    /// Set the per-step displacement without moving the particle.
    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.last_position = self.position - velocity;
    }

    /// Teleport the particle, discarding its velocity.
    pub fn teleport(&mut self, position: Vec2) {
        self.position = position;
        self.last_position = position;
        if self.is_pinned {
            self.pinned_position = position;
        }
    }

    /// Inverse mass used by constraint solving. Pinned particles are immovable.
    pub fn inverse_mass(&self) -> f32 {
        if self.is_pinned {
            0.0
        } else {
            1.0 / self.mass
        }
    }
}
