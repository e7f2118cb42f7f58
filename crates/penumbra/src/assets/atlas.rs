use std::collections::HashMap;

use glam::Vec2;

use crate::assets::manifest::AtlasManifest;
use crate::core::rect::Rect;
use crate::error::{EngineError, EngineResult};

/// Opaque handle to a texture owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextureId(pub u32);

/// Host-side texture ownership. The engine never frees GPU memory itself;
/// it tells the store when a texture is no longer referenced.
pub trait TextureStore {
    fn release(&mut self, texture: TextureId);
}

/// A named region of an atlas texture.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub name: String,
    pub texture: TextureId,
    /// Source rectangle in texture pixels.
    pub source: Rect,
    /// Pivot, normalized to the source rect (0.5, 0.5 is the center).
    pub origin: Vec2,
}

impl Sprite {
    /// Normalized `[u, v, width, height]` for a texture of `texture_size` pixels.
    pub fn uvs(&self, texture_size: Vec2) -> [f32; 4] {
        [
            self.source.x / texture_size.x,
            self.source.y / texture_size.y,
            self.source.width / texture_size.x,
            self.source.height / texture_size.y,
        ]
    }
}

/// A frame sequence over sprites of one atlas.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteAnimation {
    pub name: String,
    /// Sprite indices into the owning atlas.
    pub frames: Vec<usize>,
    pub fps: f32,
    pub looping: bool,
}

impl SpriteAnimation {
    pub fn frame_duration(&self) -> f32 {
        1.0 / self.fps
    }

    pub fn total_duration(&self) -> f32 {
        self.frame_duration() * self.frames.len() as f32
    }
}

/// Sprites and animations sharing a single texture.
///
/// The atlas owns the texture reference: [`SpriteAtlas::dispose`] hands it
/// back to the [`TextureStore`] exactly once and clears the sprite set.
#[derive(Debug, Clone)]
pub struct SpriteAtlas {
    pub name: String,
    texture: Option<TextureId>,
    texture_size: Vec2,
    sprites: Option<Vec<Sprite>>,
    sprite_names: HashMap<String, usize>,
    animations: Vec<SpriteAnimation>,
    animation_names: HashMap<String, usize>,
}

impl SpriteAtlas {
    pub fn new(name: impl Into<String>, texture: TextureId, texture_size: Vec2) -> Self {
        Self {
            name: name.into(),
            texture: Some(texture),
            texture_size,
            sprites: Some(Vec::new()),
            sprite_names: HashMap::new(),
            animations: Vec::new(),
            animation_names: HashMap::new(),
        }
    }

    /// Build an atlas from a parsed manifest. Animation frames are resolved by sprite name.
    pub fn from_manifest(manifest: &AtlasManifest, texture: TextureId) -> EngineResult<Self> {
        let mut atlas = Self::new(
            manifest.name.clone(),
            texture,
            Vec2::new(manifest.width as f32, manifest.height as f32),
        );

        for entry in &manifest.sprites {
            let origin = entry.origin.map(Vec2::from).unwrap_or(Vec2::splat(0.5));
            atlas.add_sprite(
                entry.name.clone(),
                Rect::new(entry.x as f32, entry.y as f32, entry.w as f32, entry.h as f32),
                origin,
            )?;
        }

        // Sorted so indices do not depend on map iteration order.
        let mut names: Vec<&String> = manifest.animations.keys().collect();
        names.sort();
        for name in names {
            let entry = &manifest.animations[name];
            let frames = entry
                .frames
                .iter()
                .map(|f| {
                    atlas
                        .sprite_index(f)
                        .ok_or_else(|| EngineError::UnknownSprite(f.clone()))
                })
                .collect::<EngineResult<Vec<usize>>>()?;
            atlas.add_animation(name.clone(), frames, entry.fps, entry.looping)?;
        }

        log::info!(
            "atlas {:?}: {} sprites, {} animations",
            atlas.name,
            atlas.sprite_count(),
            atlas.animation_count()
        );
        Ok(atlas)
    }

    /// Register a sprite and return its index.
    pub fn add_sprite(
        &mut self,
        name: impl Into<String>,
        source: Rect,
        origin: Vec2,
    ) -> EngineResult<usize> {
        let name = name.into();
        let (Some(texture), Some(sprites)) = (self.texture, self.sprites.as_mut()) else {
            return Err(EngineError::AtlasDisposed(self.name.clone()));
        };
        if self.sprite_names.contains_key(&name) {
            return Err(EngineError::DuplicateName(name));
        }
        let index = sprites.len();
        sprites.push(Sprite {
            name: name.clone(),
            texture,
            source,
            origin,
        });
        self.sprite_names.insert(name, index);
        Ok(index)
    }

    pub fn add_animation(
        &mut self,
        name: impl Into<String>,
        frames: Vec<usize>,
        fps: f32,
        looping: bool,
    ) -> EngineResult<()> {
        let name = name.into();
        if self.is_disposed() {
            return Err(EngineError::AtlasDisposed(self.name.clone()));
        }
        if self.animation_names.contains_key(&name) {
            return Err(EngineError::DuplicateName(name));
        }
        if !(fps > 0.0) {
            return Err(EngineError::InvalidAnimation { name, reason: "fps must be positive" });
        }
        if frames.is_empty() {
            return Err(EngineError::InvalidAnimation { name, reason: "no frames" });
        }
        if frames.iter().any(|&f| f >= self.sprite_count()) {
            return Err(EngineError::InvalidAnimation { name, reason: "frame out of range" });
        }
        self.animation_names.insert(name.clone(), self.animations.len());
        self.animations.push(SpriteAnimation { name, frames, fps, looping });
        Ok(())
    }

    /// Sprite with exactly this name.
    pub fn get_sprite(&self, name: &str) -> Option<&Sprite> {
        self.sprite(self.sprite_index(name)?)
    }

    /// Animation with exactly this name.
    pub fn get_animation(&self, name: &str) -> Option<&SpriteAnimation> {
        if self.is_disposed() {
            return None;
        }
        self.animations.get(*self.animation_names.get(name)?)
    }

    pub fn sprite_index(&self, name: &str) -> Option<usize> {
        self.sprites.as_ref()?;
        self.sprite_names.get(name).copied()
    }

    pub fn sprite(&self, index: usize) -> Option<&Sprite> {
        self.sprites.as_ref()?.get(index)
    }

    pub fn sprites(&self) -> impl Iterator<Item = &Sprite> {
        self.sprites.iter().flatten()
    }

    pub fn sprite_count(&self) -> usize {
        self.sprites.as_ref().map_or(0, Vec::len)
    }

    pub fn animation_count(&self) -> usize {
        if self.is_disposed() {
            0
        } else {
            self.animations.len()
        }
    }

    pub fn texture(&self) -> Option<TextureId> {
        self.texture
    }

    pub fn texture_size(&self) -> Vec2 {
        self.texture_size
    }

    pub fn is_disposed(&self) -> bool {
        self.sprites.is_none()
    }

    /// Release the shared texture and drop every sprite. Safe to call twice.
    pub fn dispose(&mut self, store: &mut dyn TextureStore) {
        match self.texture.take() {
            Some(texture) => {
                store.release(texture);
                log::debug!("atlas {:?}: released texture {:?}", self.name, texture);
            }
            None => log::debug!("atlas {:?}: already disposed", self.name),
        }
        self.sprites = None;
        self.sprite_names.clear();
        self.animations.clear();
        self.animation_names.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingStore {
        released: Vec<TextureId>,
    }

    impl TextureStore for CountingStore {
        fn release(&mut self, texture: TextureId) {
            self.released.push(texture);
        }
    }

    fn atlas() -> SpriteAtlas {
        let mut atlas = SpriteAtlas::new("hero", TextureId(7), Vec2::new(128.0, 64.0));
        atlas.add_sprite("idle_0", Rect::new(0.0, 0.0, 32.0, 32.0), Vec2::splat(0.5)).unwrap();
        atlas.add_sprite("idle_1", Rect::new(32.0, 0.0, 32.0, 32.0), Vec2::splat(0.5)).unwrap();
        atlas.add_sprite("jump", Rect::new(64.0, 0.0, 32.0, 64.0), Vec2::new(0.5, 1.0)).unwrap();
        atlas.add_animation("idle", vec![0, 1], 8.0, true).unwrap();
        atlas
    }

    #[test]
    fn lookups_match_names_exactly() {
        let atlas = atlas();
        assert_eq!(atlas.get_sprite("jump").unwrap().source.height, 64.0);
        assert!(atlas.get_sprite("Jump").is_none());
        assert!(atlas.get_sprite("jum").is_none());
        assert_eq!(atlas.get_animation("idle").unwrap().frames, vec![0, 1]);
        assert!(atlas.get_animation("idle ").is_none());
    }

    #[test]
    fn sprites_share_the_atlas_texture() {
        let atlas = atlas();
        assert!(atlas.sprites().all(|s| s.texture == TextureId(7)));
    }

    #[test]
    fn uvs_are_normalized() {
        let atlas = atlas();
        let uvs = atlas.get_sprite("idle_1").unwrap().uvs(atlas.texture_size());
        assert_eq!(uvs, [0.25, 0.0, 0.25, 0.5]);
    }

    #[test]
    fn duplicate_and_invalid_entries_are_rejected() {
        let mut atlas = atlas();
        assert!(matches!(
            atlas.add_sprite("jump", Rect::default(), Vec2::ZERO),
            Err(EngineError::DuplicateName(_))
        ));
        assert!(atlas.add_animation("bad", vec![9], 8.0, true).is_err());
        assert!(atlas.add_animation("slow", vec![0], 0.0, true).is_err());
        assert!(atlas.add_animation("empty", vec![], 8.0, true).is_err());
    }

    #[test]
    fn dispose_releases_texture_once() {
        let mut atlas = atlas();
        let mut store = CountingStore::default();
        atlas.dispose(&mut store);
        atlas.dispose(&mut store);
        assert_eq!(store.released, vec![TextureId(7)]);
        assert!(atlas.is_disposed());
        assert!(atlas.texture().is_none());
        assert_eq!(atlas.sprite_count(), 0);
        assert!(atlas.get_sprite("jump").is_none());
        assert!(atlas.get_animation("idle").is_none());
    }

    #[test]
    fn disposed_atlas_rejects_new_sprites() {
        let mut atlas = atlas();
        atlas.dispose(&mut CountingStore::default());
        match atlas.add_sprite("late", Rect::default(), Vec2::ZERO) {
            Err(EngineError::AtlasDisposed(name)) => assert_eq!(name, "hero"),
            other => panic!("expected AtlasDisposed, got {:?}", other),
        }
        assert!(matches!(
            atlas.add_animation("late", vec![0], 8.0, true),
            Err(EngineError::AtlasDisposed(_))
        ));
    }
}
