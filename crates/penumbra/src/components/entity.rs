use glam::Vec2;

use crate::api::types::EntityId;
use crate::components::animation::AnimationComponent;
use crate::components::sprite::SpriteComponent;
use crate::core::rect::Rect;
use crate::physics::verlet::CompositeId;

/// Ties an entity's position to one particle of a Verlet composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerletLink {
    pub composite: CompositeId,
    pub particle: usize,
}

/// Fat Entity: a single struct with optional components.
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    /// String tag for finding entities by name.
    pub tag: String,
    /// Inactive entities are skipped by systems.
    pub active: bool,
    pub pos: Vec2,
    /// Radians.
    pub rotation: f32,
    /// Rendered size in world units.
    pub scale: Vec2,
    pub sprite: Option<SpriteComponent>,
    pub animation: Option<AnimationComponent>,
    pub body: Option<VerletLink>,
}

impl Entity {
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            tag: String::new(),
            active: true,
            pos: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
            sprite: None,
            animation: None,
            body: None,
        }
    }

    // -- Builder pattern --

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_pos(mut self, pos: Vec2) -> Self {
        self.pos = pos;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_sprite(mut self, sprite: SpriteComponent) -> Self {
        self.sprite = Some(sprite);
        self
    }

    pub fn with_animation(mut self, animation: AnimationComponent) -> Self {
        self.animation = Some(animation);
        self
    }

    pub fn with_body(mut self, body: VerletLink) -> Self {
        self.body = Some(body);
        self
    }

    /// Follow `particle` of `composite` instead of the first one.
    pub fn with_link(self, composite: CompositeId, particle: usize) -> Self {
        self.with_body(VerletLink { composite, particle })
    }

    /// World-space box the sprite covers, ignoring rotation. `pos` is the
    /// sprite's pivot, so `origin` shifts the box.
    pub fn bounds(&self, origin: Vec2) -> Rect {
        let size = self.scale.abs();
        let min = self.pos - size * origin;
        Rect::new(min.x, min.y, size.x, size.y)
    }
}
