//! Position-based soft-body simulation.
//!
//! Particles carry their previous position instead of a velocity. Each fixed
//! step relaxes the composites' constraints, integrates particles under gravity
//! and friction, then resolves contacts against static colliders.

pub mod builders;
pub mod collider;
pub mod composite;
pub mod constraint;
pub mod particle;
pub mod world;

pub use collider::Collider;
pub use composite::Composite;
pub use constraint::{AngleConstraint, Constraint, DistanceConstraint, SolveOutcome};
pub use particle::Particle;
pub use world::{CompositeId, ParticleRef, VerletConfig, VerletWorld};
