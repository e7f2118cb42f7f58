use std::f32::consts::PI;

use glam::Vec2;

use super::particle::Particle;
use crate::error::{EngineError, EngineResult};

/// Result of one relaxation pass over a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveOutcome {
    Holding,
    /// Stretched past its tear threshold; the owner should remove it.
    Broken,
}

/// Keeps two particles at a resting distance.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceConstraint {
    pub first: usize,
    pub second: usize,
    /// 0.0..=1.0, fraction of the error corrected per pass.
    pub stiffness: f32,
    pub resting_distance: f32,
    /// Breaks once stretched beyond `resting_distance * tear_sensitivity`.
    pub tear_sensitivity: Option<f32>,
    /// Push the constraint's midpoint out of static colliders too.
    pub collides_with_colliders: bool,
}

impl DistanceConstraint {
    /// A negative `distance` means "the particles' current distance".
    /// Particle positions are needed for that case, so it is resolved by
    /// [`Composite::add_constraint`](super::composite::Composite::add_constraint).
    pub fn new(first: usize, second: usize, stiffness: f32, distance: f32) -> Self {
        Self {
            first,
            second,
            stiffness: stiffness.clamp(0.0, 1.0),
            resting_distance: distance,
            tear_sensitivity: None,
            collides_with_colliders: false,
        }
    }

    pub fn with_tear_sensitivity(mut self, sensitivity: f32) -> Self {
        self.tear_sensitivity = (sensitivity > 0.0).then_some(sensitivity);
        self
    }

    pub fn with_collisions(mut self, enabled: bool) -> Self {
        self.collides_with_colliders = enabled;
        self
    }

    fn solve(&self, particles: &mut [Particle]) -> SolveOutcome {
        let (p1, p2) = (&particles[self.first], &particles[self.second]);
        let diff = p1.position - p2.position;
        let d = diff.length();
        if d <= f32::EPSILON {
            return SolveOutcome::Holding;
        }

        if let Some(tear) = self.tear_sensitivity {
            if d > self.resting_distance * tear {
                return SolveOutcome::Broken;
            }
        }

        let inv1 = p1.inverse_mass();
        let inv2 = p2.inverse_mass();
        let inv_sum = inv1 + inv2;
        if inv_sum <= 0.0 {
            return SolveOutcome::Holding;
        }

        let difference = (self.resting_distance - d) / d;
        let scale1 = inv1 / inv_sum * self.stiffness;
        let scale2 = self.stiffness - scale1;

        particles[self.first].position += diff * scale1 * difference;
        particles[self.second].position -= diff * scale2 * difference;
        SolveOutcome::Holding
    }
}

/// Keeps the angle at `center` between `particle_a` and `particle_c` constant.
#[derive(Debug, Clone, PartialEq)]
pub struct AngleConstraint {
    pub particle_a: usize,
    pub center: usize,
    pub particle_c: usize,
    pub stiffness: f32,
    /// Target angle in radians, measured from a to c around the center.
    /// `None` until resolved from the particles' arrangement.
    pub angle_radius: Option<f32>,
}

impl AngleConstraint {
    /// The target angle is the particles' current angle, resolved by
    /// [`Composite::add_constraint`](super::composite::Composite::add_constraint).
    pub fn new(a: usize, center: usize, c: usize, stiffness: f32) -> Self {
        Self {
            particle_a: a,
            center,
            particle_c: c,
            stiffness: stiffness.clamp(0.0, 1.0),
            angle_radius: None,
        }
    }

    pub fn with_angle(mut self, radians: f32) -> Self {
        self.angle_radius = Some(radians);
        self
    }

    fn solve(&self, particles: &mut [Particle]) -> SolveOutcome {
        let a = particles[self.particle_a].position;
        let b = particles[self.center].position;
        let c = particles[self.particle_c].position;

        let Some(target) = self.angle_radius else {
            return SolveOutcome::Holding;
        };
        let mut diff = angle_between(b, a, c) - target;
        if diff <= -PI {
            diff += 2.0 * PI;
        } else if diff >= PI {
            diff -= 2.0 * PI;
        }
        diff *= self.stiffness;

        let (share_a, share_c) = match (
            particles[self.particle_a].is_pinned,
            particles[self.particle_c].is_pinned,
        ) {
            (true, true) => return SolveOutcome::Holding,
            (true, false) => (0.0, 1.0),
            (false, true) => (1.0, 0.0),
            (false, false) => (0.5, 0.5),
        };

        // Rotating a forward and c backward both shrink the a->c angle.
        particles[self.particle_a].position = rotate_about(a, b, diff * share_a);
        particles[self.particle_c].position = rotate_about(c, b, -diff * share_c);
        SolveOutcome::Holding
    }
}

/// Signed angle at `origin` from `left` to `right`.
fn angle_between(origin: Vec2, left: Vec2, right: Vec2) -> f32 {
    let l = left - origin;
    let r = right - origin;
    l.perp_dot(r).atan2(l.dot(r))
}

fn rotate_about(point: Vec2, origin: Vec2, theta: f32) -> Vec2 {
    let (sin, cos) = theta.sin_cos();
    let local = point - origin;
    Vec2::new(local.x * cos - local.y * sin, local.x * sin + local.y * cos) + origin
}

/// A constraint between particles of one composite (indices are composite-local).
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Distance(DistanceConstraint),
    Angle(AngleConstraint),
}

impl Constraint {
    /// Indices of every particle this constraint touches.
    pub fn particles(&self) -> Vec<usize> {
        match self {
            Constraint::Distance(c) => vec![c.first, c.second],
            Constraint::Angle(c) => vec![c.particle_a, c.center, c.particle_c],
        }
    }

    pub fn references(&self, index: usize) -> bool {
        self.particles().contains(&index)
    }

    /// Check indices against a particle count.
    pub fn validate(&self, particle_count: usize) -> EngineResult<()> {
        let indices = self.particles();
        if indices.iter().any(|&i| i >= particle_count) {
            return Err(EngineError::InvalidConstraint("particle index out of range"));
        }
        for (n, i) in indices.iter().enumerate() {
            if indices[n + 1..].contains(i) {
                return Err(EngineError::InvalidConstraint("particle used twice"));
            }
        }
        Ok(())
    }

    /// Fill in rest lengths and target angles left to the current
    /// arrangement. Indices must already be validated.
    pub(crate) fn resolve_rest(&mut self, particles: &[Particle]) {
        match self {
            Constraint::Distance(c) if c.resting_distance < 0.0 => {
                c.resting_distance = particles[c.first].position.distance(particles[c.second].position);
            }
            Constraint::Angle(c) if c.angle_radius.is_none() => {
                c.angle_radius = Some(angle_between(
                    particles[c.center].position,
                    particles[c.particle_a].position,
                    particles[c.particle_c].position,
                ));
            }
            _ => {}
        }
    }

    /// Shift indices down after the particle at `removed` was taken out.
    pub(crate) fn reindex_after_removal(&mut self, removed: usize) {
        let fix = |i: &mut usize| {
            if *i > removed {
                *i -= 1;
            }
        };
        match self {
            Constraint::Distance(c) => {
                fix(&mut c.first);
                fix(&mut c.second);
            }
            Constraint::Angle(c) => {
                fix(&mut c.particle_a);
                fix(&mut c.center);
                fix(&mut c.particle_c);
            }
        }
    }

    /// Run one relaxation pass.
    pub fn solve(&self, particles: &mut [Particle]) -> SolveOutcome {
        match self {
            Constraint::Distance(c) => c.solve(particles),
            Constraint::Angle(c) => c.solve(particles),
        }
    }

    pub fn collides_with_colliders(&self) -> bool {
        matches!(self, Constraint::Distance(c) if c.collides_with_colliders)
    }
}

impl From<DistanceConstraint> for Constraint {
    fn from(c: DistanceConstraint) -> Self {
        Constraint::Distance(c)
    }
}

impl From<AngleConstraint> for Constraint {
    fn from(c: AngleConstraint) -> Self {
        Constraint::Angle(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(distance: f32) -> Vec<Particle> {
        vec![
            Particle::new(Vec2::ZERO),
            Particle::new(Vec2::new(distance, 0.0)),
        ]
    }

    #[test]
    fn full_stiffness_restores_rest_length_in_one_pass() {
        let mut particles = pair(20.0);
        let c = DistanceConstraint::new(0, 1, 1.0, 10.0);
        assert_eq!(c.solve(&mut particles), SolveOutcome::Holding);
        let d = particles[0].position.distance(particles[1].position);
        assert!((d - 10.0).abs() < 1e-4, "distance was {}", d);
        // Equal masses move symmetrically
        assert!((particles[0].position.x - 5.0).abs() < 1e-4);
        assert!((particles[1].position.x - 15.0).abs() < 1e-4);
    }

    #[test]
    fn pinned_particle_does_not_move() {
        let mut particles = pair(20.0);
        particles[0].pin();
        DistanceConstraint::new(0, 1, 1.0, 10.0).solve(&mut particles);
        assert_eq!(particles[0].position, Vec2::ZERO);
        assert!((particles[1].position.x - 10.0).abs() < 1e-4);
    }

    #[test]
    fn heavier_particle_moves_less() {
        let mut particles = pair(20.0);
        particles[0].mass = 3.0;
        DistanceConstraint::new(0, 1, 1.0, 10.0).solve(&mut particles);
        let moved_heavy = particles[0].position.x.abs();
        let moved_light = (20.0 - particles[1].position.x).abs();
        assert!(moved_heavy < moved_light);
        assert!((moved_heavy + moved_light - 10.0).abs() < 1e-4);
    }

    #[test]
    fn tears_when_overstretched() {
        let mut particles = pair(30.0);
        let c = DistanceConstraint::new(0, 1, 1.0, 10.0).with_tear_sensitivity(2.0);
        assert_eq!(c.solve(&mut particles), SolveOutcome::Broken);
        // Nothing moved
        assert_eq!(particles[1].position.x, 30.0);
    }

    #[test]
    fn angle_constraint_straightens_bent_joint() {
        let mut particles = vec![
            Particle::new(Vec2::new(-10.0, 0.0)),
            Particle::new(Vec2::ZERO),
            Particle::new(Vec2::new(10.0, 0.0)),
        ];
        let mut c: Constraint = AngleConstraint::new(0, 1, 2, 0.5).into();
        c.resolve_rest(&particles);
        let Constraint::Angle(ref angle) = c else {
            unreachable!()
        };
        let target = angle.angle_radius.unwrap();
        assert!((target.abs() - PI).abs() < 1e-5);
        // Bend the joint
        particles[2].position = Vec2::new(0.0, 10.0);
        let bent = angle_between(particles[1].position, particles[0].position, particles[2].position);
        for _ in 0..20 {
            c.solve(&mut particles);
        }
        let after = angle_between(particles[1].position, particles[0].position, particles[2].position);
        let err_before = (bent - target).abs();
        let mut err_after = (after - target).abs();
        if err_after > PI {
            err_after = 2.0 * PI - err_after;
        }
        assert!(err_after < err_before, "before={} after={}", err_before, err_after);
    }

    #[test]
    fn validate_rejects_bad_indices() {
        let c: Constraint = DistanceConstraint::new(0, 5, 1.0, 1.0).into();
        assert!(c.validate(2).is_err());
        let c: Constraint = DistanceConstraint::new(1, 1, 1.0, 1.0).into();
        assert!(c.validate(2).is_err());
        let c: Constraint = DistanceConstraint::new(0, 1, 1.0, 1.0).into();
        assert!(c.validate(2).is_ok());
    }

    #[test]
    fn angle_with_out_of_range_particle_is_rejected() {
        let c: Constraint = AngleConstraint::new(0, 1, 5, 1.0).into();
        assert!(matches!(c.validate(2), Err(EngineError::InvalidConstraint(_))));
        let c: Constraint = AngleConstraint::new(0, 1, 0, 1.0).into();
        assert!(c.validate(3).is_err());
    }

    #[test]
    fn unresolved_angle_does_not_move_particles() {
        let mut particles = vec![
            Particle::new(Vec2::new(-10.0, 0.0)),
            Particle::new(Vec2::ZERO),
            Particle::new(Vec2::new(0.0, 10.0)),
        ];
        let c: Constraint = AngleConstraint::new(0, 1, 2, 1.0).into();
        c.solve(&mut particles);
        assert_eq!(particles[2].position, Vec2::new(0.0, 10.0));
    }

    #[test]
    fn reindex_shifts_higher_indices() {
        let mut c: Constraint = DistanceConstraint::new(1, 3, 1.0, 1.0).into();
        c.reindex_after_removal(2);
        assert_eq!(c.particles(), vec![1, 2]);
    }
}
