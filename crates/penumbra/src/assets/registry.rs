use crate::assets::atlas::{Sprite, SpriteAtlas, TextureStore};
use crate::components::sprite::AtlasId;

/// All loaded atlases, addressed by [`AtlasId`] and by name.
pub struct AtlasRegistry {
    atlases: Vec<SpriteAtlas>,
}

impl AtlasRegistry {
    pub fn new() -> Self {
        Self { atlases: Vec::new() }
    }

    /// Add an atlas. An atlas with the same name is replaced in place and
    /// handed back; disposing it is the caller's job.
    pub fn insert(&mut self, atlas: SpriteAtlas) -> (AtlasId, Option<SpriteAtlas>) {
        if let Some(index) = self.atlases.iter().position(|a| a.name == atlas.name) {
            log::warn!("atlas {:?} replaced", atlas.name);
            let old = std::mem::replace(&mut self.atlases[index], atlas);
            return (AtlasId(index as u32), Some(old));
        }
        self.atlases.push(atlas);
        (AtlasId(self.atlases.len() as u32 - 1), None)
    }

    pub fn get(&self, id: AtlasId) -> Option<&SpriteAtlas> {
        self.atlases.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: AtlasId) -> Option<&mut SpriteAtlas> {
        self.atlases.get_mut(id.0 as usize)
    }

    pub fn id_of(&self, name: &str) -> Option<AtlasId> {
        self.atlases
            .iter()
            .position(|a| a.name == name)
            .map(|i| AtlasId(i as u32))
    }

    /// Look up `"atlas/sprite"`, or a bare sprite name searched across atlases in id order.
    pub fn find_sprite(&self, name: &str) -> Option<(AtlasId, usize)> {
        if let Some((atlas_name, sprite_name)) = name.split_once('/') {
            let id = self.id_of(atlas_name)?;
            let index = self.get(id)?.sprite_index(sprite_name)?;
            return Some((id, index));
        }
        self.atlases.iter().enumerate().find_map(|(i, atlas)| {
            atlas.sprite_index(name).map(|index| (AtlasId(i as u32), index))
        })
    }

    /// Resolve a sprite by atlas and index.
    pub fn sprite(&self, atlas: AtlasId, index: usize) -> Option<&Sprite> {
        self.get(atlas)?.sprite(index)
    }

    pub fn len(&self) -> usize {
        self.atlases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atlases.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AtlasId, &SpriteAtlas)> {
        self.atlases
            .iter()
            .enumerate()
            .map(|(i, a)| (AtlasId(i as u32), a))
    }

    /// Dispose every atlas. Ids stay valid but resolve to empty atlases.
    pub fn dispose_all(&mut self, store: &mut dyn TextureStore) {
        for atlas in &mut self.atlases {
            atlas.dispose(store);
        }
    }
}

impl Default for AtlasRegistry {
    fn default() -> Self {
        Self::new()
    }
}
