use std::io::{Read, Write};

use glam::Vec2;

use super::{BinaryReader, BinaryWriter, Persistable};
use crate::core::rect::Rect;
use crate::error::{PersistError, PersistResult};
use crate::physics::verlet::world::Slot;
use crate::physics::verlet::{
    AngleConstraint, Collider, Composite, Constraint, DistanceConstraint, Particle, VerletConfig,
    VerletWorld,
};

const CONSTRAINT_DISTANCE: u8 = 0;
const CONSTRAINT_ANGLE: u8 = 1;

const COLLIDER_CIRCLE: u8 = 0;
const COLLIDER_RECT: u8 = 1;
const COLLIDER_SEGMENT: u8 = 2;

impl Persistable for Vec2 {
    fn persist<W: Write>(&self, w: &mut BinaryWriter<W>) -> PersistResult<()> {
        w.write_vec2(*self)
    }

    fn recover<R: Read>(r: &mut BinaryReader<R>) -> PersistResult<Self> {
        r.read_vec2()
    }
}

impl Persistable for Rect {
    fn persist<W: Write>(&self, w: &mut BinaryWriter<W>) -> PersistResult<()> {
        w.write_f32(self.x)?;
        w.write_f32(self.y)?;
        w.write_f32(self.width)?;
        w.write_f32(self.height)
    }

    fn recover<R: Read>(r: &mut BinaryReader<R>) -> PersistResult<Self> {
        Ok(Rect::new(r.read_f32()?, r.read_f32()?, r.read_f32()?, r.read_f32()?))
    }
}

impl Persistable for Particle {
    fn persist<W: Write>(&self, w: &mut BinaryWriter<W>) -> PersistResult<()> {
        w.write_vec2(self.position)?;
        w.write_vec2(self.last_position)?;
        w.write_vec2(self.acceleration)?;
        w.write_f32(self.mass)?;
        w.write_f32(self.radius)?;
        w.write_bool(self.collides_with_colliders)?;
        w.write_bool(self.is_pinned)?;
        w.write_vec2(self.pinned_position)
    }

    fn recover<R: Read>(r: &mut BinaryReader<R>) -> PersistResult<Self> {
        Ok(Particle {
            position: r.read_vec2()?,
            last_position: r.read_vec2()?,
            acceleration: r.read_vec2()?,
            mass: r.read_f32()?,
            radius: r.read_f32()?,
            collides_with_colliders: r.read_bool()?,
            is_pinned: r.read_bool()?,
            pinned_position: r.read_vec2()?,
        })
    }
}

impl Persistable for Constraint {
    fn persist<W: Write>(&self, w: &mut BinaryWriter<W>) -> PersistResult<()> {
        match self {
            Constraint::Distance(c) => {
                w.write_u8(CONSTRAINT_DISTANCE)?;
                w.write_u32(c.first as u32)?;
                w.write_u32(c.second as u32)?;
                w.write_f32(c.stiffness)?;
                w.write_f32(c.resting_distance)?;
                // Negative sensitivity stands for "never tears".
                w.write_f32(c.tear_sensitivity.unwrap_or(-1.0))?;
                w.write_bool(c.collides_with_colliders)
            }
            Constraint::Angle(c) => {
                w.write_u8(CONSTRAINT_ANGLE)?;
                w.write_u32(c.particle_a as u32)?;
                w.write_u32(c.center as u32)?;
                w.write_u32(c.particle_c as u32)?;
                w.write_f32(c.stiffness)?;
                w.write_bool(c.angle_radius.is_some())?;
                w.write_f32(c.angle_radius.unwrap_or(0.0))
            }
        }
    }

    fn recover<R: Read>(r: &mut BinaryReader<R>) -> PersistResult<Self> {
        match r.read_u8()? {
            CONSTRAINT_DISTANCE => {
                let first = r.read_len()?;
                let second = r.read_len()?;
                let stiffness = r.read_f32()?;
                let resting_distance = r.read_f32()?;
                let tear = r.read_f32()?;
                Ok(Constraint::Distance(DistanceConstraint {
                    first,
                    second,
                    stiffness,
                    resting_distance,
                    tear_sensitivity: (tear > 0.0).then_some(tear),
                    collides_with_colliders: r.read_bool()?,
                }))
            }
            CONSTRAINT_ANGLE => {
                let particle_a = r.read_len()?;
                let center = r.read_len()?;
                let particle_c = r.read_len()?;
                let stiffness = r.read_f32()?;
                let resolved = r.read_bool()?;
                let angle = r.read_f32()?;
                Ok(Constraint::Angle(AngleConstraint {
                    particle_a,
                    center,
                    particle_c,
                    stiffness,
                    angle_radius: resolved.then_some(angle),
                }))
            }
            tag => Err(PersistError::InvalidTag { kind: "constraint", tag }),
        }
    }
}

impl Persistable for Composite {
    fn persist<W: Write>(&self, w: &mut BinaryWriter<W>) -> PersistResult<()> {
        w.write_len(self.particles.len())?;
        for p in &self.particles {
            w.write_persistable(p)?;
        }
        w.write_len(self.constraints.len())?;
        for c in &self.constraints {
            w.write_persistable(c)?;
        }
        w.write_vec2(self.friction)?;
        w.write_bool(self.draw_particles)?;
        w.write_bool(self.draw_constraints)?;
        w.write_bool(self.collides_with_colliders)
    }

    fn recover<R: Read>(r: &mut BinaryReader<R>) -> PersistResult<Self> {
        let particles: Vec<Particle> = r.read_vec()?;
        let constraints: Vec<Constraint> = r.read_vec()?;
        for c in &constraints {
            if c.validate(particles.len()).is_err() {
                return Err(PersistError::Corrupt("constraint references a missing particle"));
            }
        }
        Ok(Composite {
            particles,
            constraints,
            friction: r.read_vec2()?,
            draw_particles: r.read_bool()?,
            draw_constraints: r.read_bool()?,
            collides_with_colliders: r.read_bool()?,
        })
    }
}

impl Persistable for Collider {
    fn persist<W: Write>(&self, w: &mut BinaryWriter<W>) -> PersistResult<()> {
        match self {
            Collider::Circle { center, radius } => {
                w.write_u8(COLLIDER_CIRCLE)?;
                w.write_vec2(*center)?;
                w.write_f32(*radius)
            }
            Collider::Rect(rect) => {
                w.write_u8(COLLIDER_RECT)?;
                w.write_persistable(rect)
            }
            Collider::Segment { a, b } => {
                w.write_u8(COLLIDER_SEGMENT)?;
                w.write_vec2(*a)?;
                w.write_vec2(*b)
            }
        }
    }

    fn recover<R: Read>(r: &mut BinaryReader<R>) -> PersistResult<Self> {
        match r.read_u8()? {
            COLLIDER_CIRCLE => Ok(Collider::Circle {
                center: r.read_vec2()?,
                radius: r.read_f32()?,
            }),
            COLLIDER_RECT => Ok(Collider::Rect(r.read_persistable()?)),
            COLLIDER_SEGMENT => Ok(Collider::Segment {
                a: r.read_vec2()?,
                b: r.read_vec2()?,
            }),
            tag => Err(PersistError::InvalidTag { kind: "collider", tag }),
        }
    }
}

impl Persistable for VerletConfig {
    fn persist<W: Write>(&self, w: &mut BinaryWriter<W>) -> PersistResult<()> {
        w.write_vec2(self.gravity)?;
        w.write_u32(self.constraint_iterations)?;
        w.write_u32(self.maximum_step_iterations)?;
        w.write_f32(self.fixed_delta_time)?;
        match &self.simulation_bounds {
            Some(bounds) => {
                w.write_bool(true)?;
                w.write_persistable(bounds)?;
            }
            None => w.write_bool(false)?,
        }
        w.write_bool(self.allow_dragging)?;
        w.write_f32(self.collision_friction)
    }

    fn recover<R: Read>(r: &mut BinaryReader<R>) -> PersistResult<Self> {
        let gravity = r.read_vec2()?;
        let constraint_iterations = r.read_u32()?;
        let maximum_step_iterations = r.read_u32()?;
        let fixed_delta_time = r.read_f32()?;
        if !(fixed_delta_time > 0.0) {
            return Err(PersistError::Corrupt("fixed delta time must be positive"));
        }
        let simulation_bounds = if r.read_bool()? {
            Some(r.read_persistable()?)
        } else {
            None
        };
        Ok(VerletConfig {
            gravity,
            constraint_iterations,
            maximum_step_iterations,
            fixed_delta_time,
            simulation_bounds,
            allow_dragging: r.read_bool()?,
            collision_friction: r.read_f32()?,
        })
    }
}

/// Slots are written with their generations, so [`CompositeId`]s taken
/// before saving still resolve after loading.
///
/// [`CompositeId`]: crate::physics::verlet::CompositeId
impl Persistable for VerletWorld {
    fn persist<W: Write>(&self, w: &mut BinaryWriter<W>) -> PersistResult<()> {
        w.write_persistable(&self.config)?;
        w.write_len(self.slots.len())?;
        for slot in &self.slots {
            w.write_u32(slot.generation)?;
            match &slot.composite {
                Some(composite) => {
                    w.write_bool(true)?;
                    w.write_persistable(composite)?;
                }
                None => w.write_bool(false)?,
            }
        }
        w.write_len(self.colliders.len())?;
        for collider in &self.colliders {
            w.write_persistable(collider)?;
        }
        Ok(())
    }

    fn recover<R: Read>(r: &mut BinaryReader<R>) -> PersistResult<Self> {
        let config: VerletConfig = r.read_persistable()?;
        let slot_count = r.read_len()?;
        let mut slots = Vec::with_capacity(slot_count.min(1024));
        for _ in 0..slot_count {
            let generation = r.read_u32()?;
            let composite = if r.read_bool()? {
                Some(r.read_persistable()?)
            } else {
                None
            };
            slots.push(Slot { generation, composite });
        }
        let colliders = r.read_vec()?;
        log::debug!(
            "recovered verlet world: {} slots, {} colliders",
            slots.len(),
            colliders.len()
        );
        Ok(VerletWorld::from_parts(config, slots, colliders))
    }
}
