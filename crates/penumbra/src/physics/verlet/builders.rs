//! Ready-made composites: balls, boxes, ropes, cloth, tires and ragdolls.
//!
//! All builders add constraints between particles they just created, so the
//! index validation in [`Composite::add_constraint`] cannot fail here and its
//! result is discarded.

use std::f32::consts::TAU;

use glam::Vec2;

use super::composite::Composite;
use super::constraint::{AngleConstraint, DistanceConstraint};
use super::particle::Particle;

impl Composite {
    /// A single particle with a collision radius.
    pub fn ball(position: Vec2, radius: f32) -> Self {
        let mut c = Composite::new();
        c.add_particle(Particle::new(position).with_radius(radius));
        c
    }

    /// Four corners held by border and diagonal constraints.
    pub fn box_shape(
        center: Vec2,
        width: f32,
        height: f32,
        border_stiffness: f32,
        diagonal_stiffness: f32,
    ) -> Self {
        let mut c = Composite::new();
        let half = Vec2::new(width, height) * 0.5;
        let tl = c.add_particle(Particle::new(center + Vec2::new(-half.x, -half.y)));
        let tr = c.add_particle(Particle::new(center + Vec2::new(half.x, -half.y)));
        let br = c.add_particle(Particle::new(center + Vec2::new(half.x, half.y)));
        let bl = c.add_particle(Particle::new(center + Vec2::new(-half.x, half.y)));

        for (a, b) in [(tl, tr), (tr, br), (br, bl), (bl, tl)] {
            let _ = c.add_constraint(DistanceConstraint::new(a, b, border_stiffness, -1.0));
        }
        let _ = c.add_constraint(DistanceConstraint::new(tl, br, diagonal_stiffness, -1.0));
        let _ = c.add_constraint(DistanceConstraint::new(bl, tr, diagonal_stiffness, -1.0));
        c
    }

    /// A chain of particles through `points`, each linked to the next.
    pub fn rope(points: &[Vec2], stiffness: f32) -> Self {
        let mut c = Composite::new();
        for p in points {
            c.add_particle(Particle::new(*p));
        }
        for i in 1..c.particles.len() {
            let _ = c.add_constraint(DistanceConstraint::new(i - 1, i, stiffness, -1.0));
        }
        c
    }

    pub fn pin_first(mut self) -> Self {
        if let Some(p) = self.particles.first_mut() {
            p.pin();
        }
        self
    }

    pub fn pin_last(mut self) -> Self {
        if let Some(p) = self.particles.last_mut() {
            p.pin();
        }
        self
    }

    /// A rectangular grid of `segments x segments` particles.
    ///
    /// Particles are row-major (`row * (segments + 1) + col`). With `pin_top`
    /// every particle of the first row is pinned.
    pub fn cloth(
        top_left: Vec2,
        width: f32,
        height: f32,
        segments: usize,
        stiffness: f32,
        tear_sensitivity: Option<f32>,
        pin_top: bool,
    ) -> Self {
        let segments = segments.max(1);
        let cols = segments + 1;
        let step = Vec2::new(width / segments as f32, height / segments as f32);
        let mut c = Composite::new().with_friction(Vec2::splat(0.98));
        c.draw_particles = false;

        for row in 0..cols {
            for col in 0..cols {
                let mut p = Particle::new(top_left + Vec2::new(col as f32, row as f32) * step);
                if pin_top && row == 0 {
                    p.pin();
                }
                c.add_particle(p);
            }
        }

        let link = |c: &mut Composite, a: usize, b: usize| {
            let mut constraint = DistanceConstraint::new(a, b, stiffness, -1.0);
            if let Some(t) = tear_sensitivity {
                constraint = constraint.with_tear_sensitivity(t);
            }
            let _ = c.add_constraint(constraint);
        };

        for row in 0..cols {
            for col in 0..cols {
                let i = row * cols + col;
                if col > 0 {
                    link(&mut c, i - 1, i);
                }
                if row > 0 {
                    link(&mut c, i - cols, i);
                }
            }
        }
        c
    }

    /// A wheel: rim particles around a hub, with spokes and tread links.
    ///
    /// The hub is the last particle.
    pub fn tire(
        origin: Vec2,
        radius: f32,
        segments: usize,
        spoke_stiffness: f32,
        tread_stiffness: f32,
    ) -> Self {
        let segments = segments.max(3);
        let mut c = Composite::new();

        for i in 0..segments {
            let theta = i as f32 * TAU / segments as f32;
            c.add_particle(Particle::new(origin + Vec2::new(theta.cos(), theta.sin()) * radius));
        }
        let hub = c.add_particle(Particle::new(origin));

        for i in 0..segments {
            let next = (i + 1) % segments;
            let skip = (i + 2) % segments;
            let _ = c.add_constraint(DistanceConstraint::new(i, next, tread_stiffness, -1.0));
            let _ = c.add_constraint(DistanceConstraint::new(i, hub, spoke_stiffness, -1.0));
            // Three rim particles have no next-but-one; four would link each opposite pair twice.
            if segments > 4 || (segments == 4 && i < 2) {
                let _ = c.add_constraint(DistanceConstraint::new(i, skip, tread_stiffness, -1.0));
            }
        }
        c
    }

    /// A stick figure `height` tall standing with its feet at `position`.
    ///
    /// Particle order: head, neck, pelvis, left hand, right hand, left foot, right foot.
    pub fn ragdoll(position: Vec2, height: f32) -> Self {
        let mut c = Composite::new();
        let up = |f: f32| position - Vec2::new(0.0, height * f);

        let head = c.add_particle(Particle::new(up(1.0)).with_radius(height * 0.08).with_mass(4.0));
        let neck = c.add_particle(Particle::new(up(0.85)));
        let pelvis = c.add_particle(Particle::new(up(0.45)).with_mass(2.0));
        let left_hand = c.add_particle(Particle::new(up(0.5) - Vec2::new(height * 0.25, 0.0)));
        let right_hand = c.add_particle(Particle::new(up(0.5) + Vec2::new(height * 0.25, 0.0)));
        let left_foot = c.add_particle(Particle::new(position - Vec2::new(height * 0.12, 0.0)));
        let right_foot = c.add_particle(Particle::new(position + Vec2::new(height * 0.12, 0.0)));

        for (a, b) in [
            (head, neck),
            (neck, pelvis),
            (neck, left_hand),
            (neck, right_hand),
            (pelvis, left_foot),
            (pelvis, right_foot),
        ] {
            let _ = c.add_constraint(DistanceConstraint::new(a, b, 1.0, -1.0));
        }

        // Keep the head roughly above the spine and the legs apart.
        let _ = c.add_constraint(AngleConstraint::new(head, neck, pelvis, 0.1));
        let _ = c.add_constraint(AngleConstraint::new(left_foot, pelvis, right_foot, 0.05));
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ball_is_one_particle_with_radius() {
        let b = Composite::ball(Vec2::new(5.0, 6.0), 12.0);
        assert_eq!(b.particle_count(), 1);
        assert_eq!(b.particles[0].radius, 12.0);
        assert_eq!(b.particles[0].position, Vec2::new(5.0, 6.0));
        assert_eq!(b.constraint_count(), 0);
    }

    #[test]
    fn box_has_borders_and_diagonals() {
        let b = Composite::box_shape(Vec2::ZERO, 20.0, 10.0, 1.0, 0.5);
        assert_eq!(b.particle_count(), 4);
        assert_eq!(b.constraint_count(), 6);
        assert_eq!(b.bounds().unwrap().size(), Vec2::new(20.0, 10.0));
    }

    #[test]
    fn rope_pins() {
        let points: Vec<Vec2> = (0..5).map(|i| Vec2::new(i as f32 * 10.0, 0.0)).collect();
        let r = Composite::rope(&points, 0.9).pin_first();
        assert_eq!(r.constraint_count(), 4);
        assert!(r.particles[0].is_pinned);
        assert!(!r.particles[4].is_pinned);
    }

    #[test]
    fn cloth_grid_layout() {
        let c = Composite::cloth(Vec2::ZERO, 100.0, 100.0, 4, 1.0, None, true);
        assert_eq!(c.particle_count(), 25);
        // 5 rows of 4 horizontal + 4 rows of 5 vertical
        assert_eq!(c.constraint_count(), 40);
        assert!(c.particles[..5].iter().all(|p| p.is_pinned));
        assert!(!c.particles[5].is_pinned);
        assert_eq!(c.particles[24].position, Vec2::new(100.0, 100.0));
    }

    #[test]
    fn tire_hub_is_last() {
        let t = Composite::tire(Vec2::new(50.0, 50.0), 20.0, 24, 0.3, 0.9);
        assert_eq!(t.particle_count(), 25);
        assert_eq!(t.particles[24].position, Vec2::new(50.0, 50.0));
        for p in &t.particles[..24] {
            assert!((p.position.distance(Vec2::new(50.0, 50.0)) - 20.0).abs() < 1e-3);
        }
        assert_eq!(t.constraint_count(), 24 * 3);
    }

    fn links(c: &Composite) -> Vec<(usize, usize)> {
        let mut pairs: Vec<(usize, usize)> = c
            .constraints
            .iter()
            .map(|k| {
                let p = k.particles();
                (p[0].min(p[1]), p[0].max(p[1]))
            })
            .collect();
        pairs.sort();
        pairs
    }

    #[test]
    fn tire_treads_reach_next_and_next_but_one() {
        let t = Composite::tire(Vec2::ZERO, 20.0, 12, 0.3, 0.9);
        let pairs = links(&t);
        assert!(pairs.contains(&(0, 1)));
        assert!(pairs.contains(&(0, 2)));
        assert!(pairs.contains(&(0, 10)));
        assert!(pairs.contains(&(0, 12)));
        assert!(!pairs.contains(&(0, 5)));
    }

    #[test]
    fn small_tires_have_no_duplicate_links() {
        for segments in 3..=5 {
            let pairs = links(&Composite::tire(Vec2::ZERO, 20.0, segments, 0.3, 0.9));
            let mut unique = pairs.clone();
            unique.dedup();
            assert_eq!(pairs, unique, "segments={segments}");
        }
        let square = links(&Composite::tire(Vec2::ZERO, 20.0, 4, 0.3, 0.9));
        assert!(square.contains(&(0, 2)) && square.contains(&(1, 3)));
        assert_eq!(square.len(), 4 + 4 + 2);
    }

    #[test]
    fn ragdoll_stands_on_its_feet() {
        let r = Composite::ragdoll(Vec2::new(0.0, 100.0), 50.0);
        assert_eq!(r.particle_count(), 7);
        assert_eq!(r.constraint_count(), 8);
        let bounds = r.bounds().unwrap();
        assert!((bounds.max().y - 100.0).abs() < 1e-3);
    }
}
