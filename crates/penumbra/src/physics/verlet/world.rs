use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collider::Collider;
use super::composite::Composite;
use super::particle::Particle;
use crate::core::rect::Rect;
use crate::core::time::FixedTimestep;

/// Tunables for a [`VerletWorld`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerletConfig {
    /// Acceleration applied to every particle (Y-down, pixels/s²).
    pub gravity: Vec2,
    /// Relaxation passes per step. More passes = stiffer bodies.
    pub constraint_iterations: u32,
    /// Upper bound on fixed steps per `update` call.
    pub maximum_step_iterations: u32,
    pub fixed_delta_time: f32,
    /// Particles are kept inside this rectangle when set.
    pub simulation_bounds: Option<Rect>,
    pub allow_dragging: bool,
    /// Fraction of tangential motion lost on contact with a collider.
    pub collision_friction: f32,
}

impl Default for VerletConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, 980.0),
            constraint_iterations: 3,
            maximum_step_iterations: 5,
            fixed_delta_time: 1.0 / 60.0,
            simulation_bounds: None,
            allow_dragging: true,
            collision_friction: 0.3,
        }
    }
}

/// Handle to a composite living in a [`VerletWorld`].
///
/// Handles are generational: a handle to a removed composite never resolves
/// to a composite added later in the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompositeId {
    pub index: u32,
    pub generation: u32,
}

/// A particle addressed through its composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticleRef {
    pub composite: CompositeId,
    pub particle: usize,
}

#[derive(Debug, Clone)]
pub(crate) struct Slot {
    pub(crate) generation: u32,
    pub(crate) composite: Option<Composite>,
}

/// Owns composites and static colliders and advances them with position Verlet.
#[derive(Debug, Clone)]
pub struct VerletWorld {
    pub(crate) config: VerletConfig,
    pub(crate) slots: Vec<Slot>,
    pub(crate) colliders: Vec<Collider>,
    timestep: FixedTimestep,
    dragged: Option<ParticleRef>,
    drag_target: Vec2,
}

impl Default for VerletWorld {
    fn default() -> Self {
        Self::new(VerletConfig::default())
    }
}

impl VerletWorld {
    pub fn new(config: VerletConfig) -> Self {
        let timestep = FixedTimestep::new(config.fixed_delta_time)
            .with_max_steps(config.maximum_step_iterations);
        Self {
            config,
            slots: Vec::new(),
            colliders: Vec::new(),
            timestep,
            dragged: None,
            drag_target: Vec2::ZERO,
        }
    }

    pub fn config(&self) -> &VerletConfig {
        &self.config
    }

    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.config.gravity = gravity;
    }

    pub fn set_simulation_bounds(&mut self, bounds: Option<Rect>) {
        self.config.simulation_bounds = bounds;
    }

    // -- Composites --

    pub fn add_composite(&mut self, composite: Composite) -> CompositeId {
        if let Some(index) = self.slots.iter().position(|s| s.composite.is_none()) {
            let slot = &mut self.slots[index];
            slot.generation += 1;
            slot.composite = Some(composite);
            return CompositeId {
                index: index as u32,
                generation: slot.generation,
            };
        }
        self.slots.push(Slot {
            generation: 0,
            composite: Some(composite),
        });
        CompositeId {
            index: (self.slots.len() - 1) as u32,
            generation: 0,
        }
    }

    pub fn remove_composite(&mut self, id: CompositeId) -> Option<Composite> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        if self.dragged.is_some_and(|d| d.composite == id) {
            self.dragged = None;
        }
        slot.composite.take()
    }

    pub fn composite(&self, id: CompositeId) -> Option<&Composite> {
        let slot = self.slots.get(id.index as usize)?;
        (slot.generation == id.generation)
            .then_some(slot.composite.as_ref())
            .flatten()
    }

    pub fn composite_mut(&mut self, id: CompositeId) -> Option<&mut Composite> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.composite.as_mut()
    }

    /// Iterate over live composites with their handles.
    pub fn composites(&self) -> impl Iterator<Item = (CompositeId, &Composite)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.composite.as_ref().map(|c| {
                (
                    CompositeId {
                        index: i as u32,
                        generation: slot.generation,
                    },
                    c,
                )
            })
        })
    }

    pub fn composite_count(&self) -> usize {
        self.slots.iter().filter(|s| s.composite.is_some()).count()
    }

    pub fn particle(&self, r: ParticleRef) -> Option<&Particle> {
        self.composite(r.composite)?.particles.get(r.particle)
    }

    pub fn particle_mut(&mut self, r: ParticleRef) -> Option<&mut Particle> {
        self.composite_mut(r.composite)?.particles.get_mut(r.particle)
    }

    pub fn particle_count(&self) -> usize {
        self.composites().map(|(_, c)| c.particle_count()).sum()
    }

    pub fn constraint_count(&self) -> usize {
        self.composites().map(|(_, c)| c.constraint_count()).sum()
    }

    // -- Colliders --

    pub fn add_collider(&mut self, collider: Collider) -> usize {
        self.colliders.push(collider);
        self.colliders.len() - 1
    }

    pub fn colliders(&self) -> &[Collider] {
        &self.colliders
    }

    pub fn clear_colliders(&mut self) {
        self.colliders.clear();
    }

    // -- Simulation --

    /// Advance by a variable frame time. Returns the number of fixed steps run.
    pub fn update(&mut self, frame_dt: f32) -> u32 {
        let steps = self.timestep.accumulate(frame_dt);
        for _ in 0..steps {
            self.step();
        }
        steps
    }

    /// Run exactly one fixed step.
    pub fn step(&mut self) {
        let dt = self.config.fixed_delta_time;
        let dt_squared = dt * dt;
        let gravity = self.config.gravity;
        let iterations = self.config.constraint_iterations.max(1);
        let friction = self.config.collision_friction.clamp(0.0, 1.0);
        let bounds = self.config.simulation_bounds;
        let held = self.hold_dragged();

        for slot in &mut self.slots {
            let Some(composite) = slot.composite.as_mut() else {
                continue;
            };
            for _ in 0..iterations {
                composite.solve_constraints();
            }
            composite.update_particles(dt_squared, gravity);
            if composite.collides_with_colliders {
                collide_particles(composite, &self.colliders, friction);
                collide_constraints(composite, &self.colliders);
            }
            if let Some(bounds) = bounds {
                constrain_to_bounds(composite, &bounds);
            }
        }

        self.release_dragged(held);
    }

    // -- Dragging --

    /// Nearest free particle within `max_distance` of `point`.
    pub fn pick(&self, point: Vec2, max_distance: f32) -> Option<ParticleRef> {
        let mut best: Option<(ParticleRef, f32)> = None;
        for (id, composite) in self.composites() {
            for (i, p) in composite.particles.iter().enumerate() {
                if p.is_pinned {
                    continue;
                }
                let d = p.position.distance(point);
                if d <= max_distance && best.map_or(true, |(_, bd)| d < bd) {
                    best = Some((ParticleRef { composite: id, particle: i }, d));
                }
            }
        }
        best.map(|(r, _)| r)
    }

    /// Start dragging the particle nearest to `point`. Returns what was grabbed.
    pub fn begin_drag(&mut self, point: Vec2, max_distance: f32) -> Option<ParticleRef> {
        if !self.config.allow_dragging {
            return None;
        }
        self.dragged = self.pick(point, max_distance);
        self.drag_target = point;
        self.dragged
    }

    pub fn drag_to(&mut self, point: Vec2) {
        self.drag_target = point;
    }

    pub fn end_drag(&mut self) {
        self.dragged = None;
    }

    pub fn dragged(&self) -> Option<ParticleRef> {
        self.dragged
    }

    /// Put the dragged particle on the pointer and hold it there for one
    /// step, so constraints relax the rest of the body toward it. Returns
    /// the held particle and whether it was pinned already.
    fn hold_dragged(&mut self) -> Option<(ParticleRef, bool)> {
        if !self.config.allow_dragging {
            return None;
        }
        let r = self.dragged?;
        let target = self.drag_target;
        let Some(p) = self.particle_mut(r) else {
            self.dragged = None;
            return None;
        };
        let was_pinned = p.is_pinned;
        p.position = target;
        p.pin_to(target);
        Some((r, was_pinned))
    }

    fn release_dragged(&mut self, held: Option<(ParticleRef, bool)>) {
        if let Some((r, false)) = held {
            if let Some(p) = self.particle_mut(r) {
                p.unpin();
            }
        }
    }

    /// Debug-draw every composite.
    #[cfg(feature = "vectors")]
    pub fn debug_draw(&self, vectors: &mut crate::systems::vector::VectorState) {
        for (_, composite) in self.composites() {
            composite.debug_draw(vectors);
        }
    }

    pub(crate) fn from_parts(config: VerletConfig, slots: Vec<Slot>, colliders: Vec<Collider>) -> Self {
        let mut world = Self::new(config);
        world.slots = slots;
        world.colliders = colliders;
        world
    }
}

fn collide_particles(composite: &mut Composite, colliders: &[Collider], friction: f32) {
    for p in &mut composite.particles {
        if p.is_pinned || !p.collides_with_colliders {
            continue;
        }
        for collider in colliders {
            let Some(push) = collider.penetration(p.position, p.radius) else {
                continue;
            };
            p.position += push;
            // Bleed off tangential velocity so resting bodies stop sliding.
            let normal = push.normalize_or_zero();
            let velocity = p.position - p.last_position;
            let into_surface = velocity.dot(normal);
            let normal_part = if into_surface < 0.0 { Vec2::ZERO } else { normal * into_surface };
            let tangent_part = velocity - normal_part;
            p.last_position = p.position - (normal_part + tangent_part * (1.0 - friction));
        }
    }
}

/// Push constraint midpoints out of colliders by moving both endpoints.
fn collide_constraints(composite: &mut Composite, colliders: &[Collider]) {
    use super::constraint::Constraint;

    for c in &composite.constraints {
        let Constraint::Distance(d) = c else {
            continue;
        };
        if !d.collides_with_colliders {
            continue;
        }
        let mid = (composite.particles[d.first].position + composite.particles[d.second].position) * 0.5;
        for collider in colliders {
            if let Some(push) = collider.penetration(mid, 0.0) {
                for i in [d.first, d.second] {
                    let p = &mut composite.particles[i];
                    if !p.is_pinned {
                        p.position += push;
                    }
                }
            }
        }
    }
}

fn constrain_to_bounds(composite: &mut Composite, bounds: &Rect) {
    for p in &mut composite.particles {
        if p.is_pinned {
            continue;
        }
        let r = Vec2::splat(p.radius);
        let min = bounds.min() + r;
        let max = (bounds.max() - r).max(min);
        let clamped = p.position.clamp(min, max);
        // Zero the velocity on any axis that hit a wall.
        if clamped.x != p.position.x {
            p.last_position.x = clamped.x;
        }
        if clamped.y != p.position.y {
            p.last_position.y = clamped.y;
        }
        p.position = clamped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::verlet::constraint::DistanceConstraint;

    fn world() -> VerletWorld {
        VerletWorld::new(VerletConfig::default())
    }

    #[test]
    fn ball_falls_under_gravity() {
        let mut w = world();
        let id = w.add_composite(Composite::ball(Vec2::new(100.0, 0.0), 5.0));
        for _ in 0..30 {
            w.step();
        }
        let p = &w.composite(id).unwrap().particles[0];
        assert!(p.position.y > 50.0, "ball should fall, y={}", p.position.y);
        assert!((p.position.x - 100.0).abs() < 1e-3);
    }

    #[test]
    fn ball_rests_on_floor_collider() {
        let mut w = world();
        w.add_collider(Collider::Rect(Rect::new(-500.0, 200.0, 1000.0, 50.0)));
        let id = w.add_composite(Composite::ball(Vec2::new(0.0, 100.0), 10.0));
        for _ in 0..300 {
            w.step();
        }
        let p = &w.composite(id).unwrap().particles[0];
        // Resting on the surface, centre one radius above it
        assert!((p.position.y - 190.0).abs() < 2.0, "y={}", p.position.y);
        assert!(p.velocity().length() < 1.0);
    }

    #[test]
    fn update_runs_bounded_fixed_steps() {
        let mut w = world();
        assert_eq!(w.update(1.0 / 60.0 + 0.001), 1);
        // A long hitch is capped by maximum_step_iterations
        assert_eq!(w.update(10.0), 5);
    }

    #[test]
    fn simulation_bounds_contain_particles() {
        let mut w = VerletWorld::new(VerletConfig {
            simulation_bounds: Some(Rect::new(0.0, 0.0, 100.0, 100.0)),
            ..Default::default()
        });
        let id = w.add_composite(Composite::ball(Vec2::new(50.0, 50.0), 4.0));
        for _ in 0..200 {
            w.step();
        }
        let p = &w.composite(id).unwrap().particles[0];
        assert!(p.position.y <= 96.0 + 1e-3);
        assert!(p.position.y >= 90.0);
    }

    #[test]
    fn removed_handles_go_stale() {
        let mut w = world();
        let a = w.add_composite(Composite::ball(Vec2::ZERO, 1.0));
        assert!(w.remove_composite(a).is_some());
        let b = w.add_composite(Composite::ball(Vec2::ZERO, 2.0));
        assert_eq!(a.index, b.index);
        assert!(w.composite(a).is_none());
        assert_eq!(w.composite(b).unwrap().particles[0].radius, 2.0);
        assert_eq!(w.composite_count(), 1);
    }

    #[test]
    fn dragging_moves_particle_to_pointer() {
        let mut w = VerletWorld::new(VerletConfig {
            gravity: Vec2::ZERO,
            ..Default::default()
        });
        let id = w.add_composite(Composite::ball(Vec2::new(10.0, 10.0), 3.0));
        let grabbed = w.begin_drag(Vec2::new(12.0, 10.0), 5.0).unwrap();
        assert_eq!(grabbed.composite, id);
        w.drag_to(Vec2::new(80.0, 40.0));
        w.step();
        let p = w.particle(grabbed).unwrap();
        assert!(p.position.distance(Vec2::new(80.0, 40.0)) < 1e-3);
        w.end_drag();
        assert!(w.dragged().is_none());
    }

    #[test]
    fn drag_is_applied_before_constraints_relax() {
        let mut w = VerletWorld::new(VerletConfig {
            gravity: Vec2::ZERO,
            ..Default::default()
        });
        let rope = w.add_composite(Composite::rope(&[Vec2::ZERO, Vec2::new(10.0, 0.0)], 1.0));
        let grabbed = w.begin_drag(Vec2::ZERO, 1.0).unwrap();
        assert_eq!(grabbed.particle, 0);
        w.drag_to(Vec2::new(5.0, 0.0));
        w.step();

        let rope = w.composite(rope).unwrap();
        assert_eq!(rope.particles[0].position, Vec2::new(5.0, 0.0));
        // The free end was pulled along in the same step.
        assert!(rope.particles[1].position.x > 14.0, "{}", rope.particles[1].position);
        assert!(!rope.particles[0].is_pinned);
    }

    #[test]
    fn dragging_disabled_grabs_nothing() {
        let mut w = VerletWorld::new(VerletConfig {
            allow_dragging: false,
            ..Default::default()
        });
        w.add_composite(Composite::ball(Vec2::ZERO, 3.0));
        assert!(w.begin_drag(Vec2::ZERO, 10.0).is_none());
    }

    #[test]
    fn pick_skips_pinned_particles() {
        let mut w = world();
        let mut c = Composite::ball(Vec2::ZERO, 1.0);
        c.particles[0].pin();
        w.add_composite(c);
        assert!(w.pick(Vec2::ZERO, 10.0).is_none());
    }

    #[test]
    fn hanging_rope_stays_connected() {
        let mut w = world();
        let points: Vec<Vec2> = (0..10).map(|i| Vec2::new(i as f32 * 10.0, 0.0)).collect();
        let id = w.add_composite(Composite::rope(&points, 1.0).pin_first());
        for _ in 0..240 {
            w.step();
        }
        let rope = w.composite(id).unwrap();
        assert_eq!(rope.particles[0].position, Vec2::ZERO);
        // Rope swung down below its anchor
        assert!(rope.particles[9].position.y > 40.0);
        for pair in rope.particles.windows(2) {
            let d = pair[0].position.distance(pair[1].position);
            assert!(d < 15.0, "link stretched to {}", d);
        }
    }

    #[test]
    fn cloth_tears_under_heavy_pull() {
        let mut w = world();
        let cloth = Composite::cloth(Vec2::ZERO, 40.0, 40.0, 4, 1.0, Some(1.2), true);
        let before = cloth.constraint_count();
        let id = w.add_composite(cloth);
        // Yank the bottom-right corner far away
        w.composite_mut(id).unwrap().particles[24].teleport(Vec2::new(400.0, 400.0));
        w.step();
        assert!(w.composite(id).unwrap().constraint_count() < before);
    }

    #[test]
    fn constraint_midpoints_can_collide() {
        let mut w = VerletWorld::new(VerletConfig {
            gravity: Vec2::ZERO,
            ..Default::default()
        });
        // A peg right under the middle of a two-particle bar
        w.add_collider(Collider::Circle { center: Vec2::new(0.0, 2.0), radius: 4.0 });
        let mut bar = Composite::new();
        bar.add_particle(Particle::new(Vec2::new(-20.0, 0.0)).with_collisions(false));
        bar.add_particle(Particle::new(Vec2::new(20.0, 0.0)).with_collisions(false));
        bar.add_constraint(DistanceConstraint::new(0, 1, 1.0, -1.0).with_collisions(true))
            .unwrap();
        let id = w.add_composite(bar);
        w.step();
        let bar = w.composite(id).unwrap();
        assert!(bar.particles[0].position.y < 0.0);
        assert!(bar.particles[1].position.y < 0.0);
    }
}
