use glam::Vec2;

use super::constraint::{Constraint, SolveOutcome};
use super::particle::Particle;
use crate::core::rect::Rect;
use crate::error::EngineResult;

/// A set of particles and the constraints that bind them into one body.
#[derive(Debug, Clone, PartialEq)]
pub struct Composite {
    pub particles: Vec<Particle>,
    pub constraints: Vec<Constraint>,
    /// Per-axis velocity retention applied every step.
    pub friction: Vec2,
    pub draw_particles: bool,
    pub draw_constraints: bool,
    /// Master switch for collisions of every particle in this composite.
    pub collides_with_colliders: bool,
}

impl Default for Composite {
    fn default() -> Self {
        Self::new()
    }
}

impl Composite {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            constraints: Vec::new(),
            friction: Vec2::new(0.98, 1.0),
            draw_particles: true,
            draw_constraints: true,
            collides_with_colliders: true,
        }
    }

    pub fn with_friction(mut self, friction: Vec2) -> Self {
        self.friction = friction;
        self
    }

    /// Add a particle and return its index.
    pub fn add_particle(&mut self, particle: Particle) -> usize {
        self.particles.push(particle);
        self.particles.len() - 1
    }

    /// Remove a particle along with every constraint that references it.
    /// Remaining constraint indices are shifted to stay valid.
    pub fn remove_particle(&mut self, index: usize) -> Option<Particle> {
        if index >= self.particles.len() {
            return None;
        }
        let particle = self.particles.remove(index);
        self.constraints.retain(|c| !c.references(index));
        for c in &mut self.constraints {
            c.reindex_after_removal(index);
        }
        Some(particle)
    }

    /// Add a constraint and return its index.
    ///
    /// Distance constraints built with a negative rest length adopt the
    /// particles' current separation, and angle constraints without a target
    /// adopt the current angle.
    pub fn add_constraint(&mut self, constraint: impl Into<Constraint>) -> EngineResult<usize> {
        let mut constraint = constraint.into();
        constraint.validate(self.particles.len())?;
        constraint.resolve_rest(&self.particles);
        self.constraints.push(constraint);
        Ok(self.constraints.len() - 1)
    }

    pub fn remove_constraint(&mut self, index: usize) -> Option<Constraint> {
        (index < self.constraints.len()).then(|| self.constraints.remove(index))
    }

    /// Accumulate a force on every particle.
    pub fn apply_force(&mut self, force: Vec2) {
        for p in &mut self.particles {
            p.apply_force(force);
        }
    }

    /// Run one relaxation pass over every constraint.
    /// Torn constraints are removed; returns how many tore.
    pub fn solve_constraints(&mut self) -> usize {
        let mut torn = Vec::new();
        for (i, c) in self.constraints.iter().enumerate() {
            if c.solve(&mut self.particles) == SolveOutcome::Broken {
                torn.push(i);
            }
        }
        for &i in torn.iter().rev() {
            self.constraints.remove(i);
            log::debug!("verlet constraint {} tore", i);
        }
        torn.len()
    }

    /// Integrate every particle one step.
    pub fn update_particles(&mut self, dt_squared: f32, gravity: Vec2) {
        for p in &mut self.particles {
            if p.is_pinned {
                p.position = p.pinned_position;
                p.last_position = p.pinned_position;
                p.acceleration = Vec2::ZERO;
                continue;
            }

            p.apply_force(gravity * p.mass);

            let velocity = (p.position - p.last_position) * self.friction;
            let next = p.position + velocity + p.acceleration * 0.5 * dt_squared;
            p.last_position = p.position;
            p.position = next;
            p.acceleration = Vec2::ZERO;
        }
    }

    /// Bounding box of all particles (radius included).
    pub fn bounds(&self) -> Option<Rect> {
        let first = self.particles.first()?;
        let (mut min, mut max) = (
            first.position - Vec2::splat(first.radius),
            first.position + Vec2::splat(first.radius),
        );
        for p in &self.particles[1..] {
            min = min.min(p.position - Vec2::splat(p.radius));
            max = max.max(p.position + Vec2::splat(p.radius));
        }
        Some(Rect::from_corners(min, max))
    }

    /// Mass-weighted center of the particles.
    pub fn centroid(&self) -> Option<Vec2> {
        let total: f32 = self.particles.iter().map(|p| p.mass).sum();
        if self.particles.is_empty() || total <= 0.0 {
            return None;
        }
        let sum = self
            .particles
            .iter()
            .fold(Vec2::ZERO, |acc, p| acc + p.position * p.mass);
        Some(sum / total)
    }

    /// Index and distance of the particle closest to `point`.
    pub fn nearest_particle(&self, point: Vec2) -> Option<(usize, f32)> {
        self.particles
            .iter()
            .enumerate()
            .map(|(i, p)| (i, p.position.distance(point)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Move every particle by `offset`, preserving velocities.
    pub fn translate(&mut self, offset: Vec2) {
        for p in &mut self.particles {
            p.position += offset;
            p.last_position += offset;
            p.pinned_position += offset;
        }
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Outline constraints and particles for debugging.
    #[cfg(feature = "vectors")]
    pub fn debug_draw(&self, vectors: &mut crate::systems::vector::VectorState) {
        use crate::core::color::Rgba;

        if self.draw_constraints {
            for c in &self.constraints {
                let color = match c {
                    Constraint::Distance(_) => Rgba::rgb(0.4, 0.8, 1.0),
                    Constraint::Angle(_) => Rgba::rgb(1.0, 0.6, 0.2),
                };
                let points: Vec<Vec2> = c
                    .particles()
                    .into_iter()
                    .map(|i| self.particles[i].position)
                    .collect();
                vectors.stroke_polyline(&points, 1.0, color);
            }
        }

        if self.draw_particles {
            for p in &self.particles {
                let color = if p.is_pinned { Rgba::RED } else { Rgba::WHITE };
                vectors.fill_circle(p.position, p.radius.max(2.0), color);
            }
        }
    }
}
