//! Penumbra: a 2D engine core.
//!
//! Sprite atlases and Tiled layers feed a flat instance buffer, a Verlet
//! solver drives soft bodies, SVG shapes become vector geometry or bodies,
//! and point/spot/directional lights are culled for a deferred lighting
//! pass. The host owns the window, GPU, audio and file IO.

pub mod api;
pub mod assets;
pub mod components;
pub mod core;
pub mod error;
pub mod input;
pub mod persistence;
pub mod physics;
pub mod renderer;
pub mod svg;
pub mod systems;
pub mod tiled;

// Re-export key types at crate root for convenience
pub use api::game::{EngineContext, Game, GameConfig, RenderContext};
pub use api::runner::GameRunner;
pub use api::types::{EntityId, GameEvent, SoundEvent};
pub use assets::atlas::{Sprite, SpriteAnimation, SpriteAtlas, TextureId, TextureStore};
pub use assets::manifest::AtlasManifest;
pub use assets::registry::AtlasRegistry;
pub use components::animation::AnimationComponent;
pub use components::entity::{Entity, VerletLink};
pub use components::sprite::{AtlasId, BlendMode, SpriteComponent};
pub use core::color::Rgba;
pub use core::rect::Rect;
pub use core::scene::Scene;
pub use core::time::FixedTimestep;
pub use error::{EngineError, EngineResult, PersistError, PersistResult};
pub use input::{InputEvent, InputQueue, TouchExt, TouchLocation, TouchState};
pub use persistence::{BinaryReader, BinaryWriter, Persistable};
pub use physics::verlet::{
    Collider, Composite, CompositeId, Constraint, Particle, ParticleRef, VerletConfig, VerletWorld,
};
pub use renderer::camera::Camera2D;
pub use renderer::instance::{RenderBuffer, RenderInstance};
pub use svg::{SvgCircle, SvgDocument, SvgShape};
pub use systems::animation::tick_animations;
pub use systems::lighting::{DirectionalLight, LightInstance, LightSet, PointLight, SpotLight};
pub use systems::render::build_render_buffer;
#[cfg(feature = "vectors")]
pub use systems::vector::{VectorState, VectorVertex};
pub use tiled::{TmxLayer, TmxMap};
