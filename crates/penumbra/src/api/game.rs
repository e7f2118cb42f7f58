use serde::{Deserialize, Serialize};

use crate::api::types::{EntityId, GameEvent, SoundEvent};
use crate::assets::registry::AtlasRegistry;
use crate::components::entity::{Entity, VerletLink};
use crate::core::scene::Scene;
use crate::error::EngineResult;
use crate::input::queue::InputQueue;
use crate::physics::verlet::{Composite, CompositeId, VerletConfig, VerletWorld};
use crate::renderer::camera::Camera2D;
use crate::renderer::instance::RenderBuffer;
use crate::systems::lighting::LightSet;
#[cfg(feature = "vectors")]
use crate::systems::vector::VectorState;
use crate::tiled::TmxMap;

/// Configuration for the engine, provided by the game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Fixed timestep in seconds (default: 1/60). Also used as the Verlet step.
    pub fixed_dt: f32,
    /// World width in game units.
    pub world_width: f32,
    /// World height in game units.
    pub world_height: f32,
    /// Maximum number of render instances (default: 512).
    pub max_instances: usize,
    /// Maximum number of sound events per frame (default: 32).
    pub max_sounds: usize,
    /// Maximum number of game events per frame (default: 32).
    pub max_events: usize,
    /// How far from a pointer press a particle may be grabbed.
    pub drag_radius: f32,
    /// Draw composites into the vector buffer every frame.
    pub debug_physics: bool,
    pub verlet: VerletConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            world_width: 800.0,
            world_height: 600.0,
            max_instances: 512,
            max_sounds: 32,
            max_events: 32,
            drag_radius: 24.0,
            debug_physics: false,
            verlet: VerletConfig::default(),
        }
    }
}

impl GameConfig {
    pub fn from_json(json: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The Verlet config with its step forced to `fixed_dt`.
    pub fn verlet_config(&self) -> VerletConfig {
        VerletConfig {
            fixed_delta_time: self.fixed_dt,
            ..self.verlet.clone()
        }
    }
}

/// The core contract every game must fulfill.
pub trait Game {
    /// Return engine configuration. Called once before init.
    fn config(&self) -> GameConfig {
        GameConfig::default()
    }

    /// Setup initial state: load atlases, spawn entities, build bodies.
    fn init(&mut self, ctx: &mut EngineContext);

    /// One fixed step of game logic. Physics runs right after.
    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue);

    /// Optional read-only pass for extra instances or vector shapes.
    fn render(&self, _ctx: &mut RenderContext) {}
}

/// Mutable access to engine state, passed to Game::init and Game::update.
pub struct EngineContext {
    pub scene: Scene,
    pub atlases: AtlasRegistry,
    pub verlet: VerletWorld,
    pub lights: LightSet,
    pub camera: Camera2D,
    /// Tile layers drawn beneath the scene's sprites.
    pub map: Option<TmxMap>,
    #[cfg(feature = "vectors")]
    pub vectors: VectorState,
    pub sounds: Vec<SoundEvent>,
    pub events: Vec<GameEvent>,
    next_id: u32,
    max_sounds: usize,
    max_events: usize,
}

impl EngineContext {
    pub fn new() -> Self {
        Self::with_config(&GameConfig::default())
    }

    pub fn with_config(config: &GameConfig) -> Self {
        Self {
            scene: Scene::new(),
            atlases: AtlasRegistry::new(),
            verlet: VerletWorld::new(config.verlet_config()),
            lights: LightSet::new(),
            camera: Camera2D::new(config.world_width, config.world_height),
            map: None,
            #[cfg(feature = "vectors")]
            vectors: VectorState::new(),
            sounds: Vec::with_capacity(config.max_sounds),
            events: Vec::with_capacity(config.max_events),
            next_id: 1,
            max_sounds: config.max_sounds,
            max_events: config.max_events,
        }
    }

    /// Generate the next unique entity ID.
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Queue a sound for the host. Dropped once the per-frame limit is hit.
    pub fn emit_sound(&mut self, event: SoundEvent) {
        if self.sounds.len() < self.max_sounds {
            self.sounds.push(event);
        } else {
            log::debug!("sound {:?} dropped, {} already queued", event, self.max_sounds);
        }
    }

    /// Queue a game event for the host. Dropped once the per-frame limit is hit.
    pub fn emit_event(&mut self, event: GameEvent) {
        if self.events.len() < self.max_events {
            self.events.push(event);
        } else {
            log::debug!("game event kind {} dropped", event.kind);
        }
    }

    /// Clear per-frame transient data (sounds, events, vector shapes).
    pub fn clear_frame_data(&mut self) {
        self.sounds.clear();
        self.events.clear();
        #[cfg(feature = "vectors")]
        self.vectors.clear();
    }

    // -- Physics convenience methods --

    /// Add `composite` to the Verlet world and spawn `entity` tied to its
    /// first particle. The entity starts at that particle's position.
    pub fn spawn_with_body(&mut self, entity: Entity, composite: Composite) -> (EntityId, CompositeId) {
        let id = entity.id;
        let start = composite.particles.first().map(|p| p.position);
        let body = self.verlet.add_composite(composite);
        let mut entity = entity.with_body(VerletLink {
            composite: body,
            particle: 0,
        });
        if let Some(pos) = start {
            entity.pos = pos;
        }
        self.scene.spawn(entity);
        (id, body)
    }

    /// Despawn an entity, removing its composite if it has one.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        let entity = self.scene.despawn(id)?;
        if let Some(link) = entity.body {
            self.verlet.remove_composite(link.composite);
        }
        Some(entity)
    }

    /// One Verlet step, then entity positions synced from their particles.
    /// Called by the runner after every `Game::update`.
    pub fn step_physics(&mut self) {
        self.verlet.step();
        self.sync_bodies();
    }

    /// Copy linked particle positions onto their entities.
    pub fn sync_bodies(&mut self) {
        for entity in self.scene.iter_mut() {
            let Some(link) = entity.body else {
                continue;
            };
            let Some(composite) = self.verlet.composite(link.composite) else {
                continue;
            };
            if let Some(particle) = composite.particles.get(link.particle) {
                entity.pos = particle.position;
            }
        }
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new()
    }
}

/// What `Game::render` may touch.
pub struct RenderContext<'a> {
    pub render_buffer: &'a mut RenderBuffer,
    pub camera: &'a Camera2D,
    pub atlases: &'a AtlasRegistry,
    #[cfg(feature = "vectors")]
    pub vectors: &'a mut VectorState,
}
