use glam::Vec2;

use super::layer::{Layer, LayerState, TmxLayer};
use super::object_group::ObjectGroup;
use super::properties::Properties;
use super::tile_layer::{TileLayer, TileRef};
use super::tileset::Tileset;
use crate::assets::registry::AtlasRegistry;
use crate::core::color::Rgba;
use crate::renderer::camera::Camera2D;
use crate::renderer::instance::RenderInstance;

/// An orthogonal Tiled map held in memory.
#[derive(Debug, Clone)]
pub struct TmxMap {
    /// Size in tiles.
    pub width: u32,
    pub height: u32,
    /// Grid cell size in pixels.
    pub tile_width: u32,
    pub tile_height: u32,
    pub background: Option<Rgba>,
    /// Ordered by `first_gid`.
    pub tilesets: Vec<Tileset>,
    /// Bottom-most first.
    pub layers: Vec<Layer>,
    pub properties: Properties,
}

impl TmxMap {
    pub fn new(width: u32, height: u32, tile_width: u32, tile_height: u32) -> Self {
        Self {
            width,
            height,
            tile_width,
            tile_height,
            background: None,
            tilesets: Vec::new(),
            layers: Vec::new(),
            properties: Properties::new(),
        }
    }

    pub fn add_tileset(&mut self, tileset: Tileset) {
        let at = self
            .tilesets
            .partition_point(|t| t.first_gid < tileset.first_gid);
        self.tilesets.insert(at, tileset);
    }

    pub fn add_layer(&mut self, layer: impl Into<Layer>) {
        self.layers.push(layer.into());
    }

    /// Every layer, depth-first, paired with its state composed through its groups.
    pub fn flattened_layers(&self) -> Vec<(LayerState, &Layer)> {
        let mut out = Vec::new();
        for layer in &self.layers {
            layer.walk(LayerState::ROOT, &mut |state, l| out.push((state, l)));
        }
        out
    }

    /// First layer with this name, searching inside groups.
    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.flattened_layers()
            .into_iter()
            .map(|(_, l)| l)
            .find(|l| l.name() == name)
    }

    pub fn tile_layers(&self) -> Vec<&TileLayer> {
        self.flattened_layers()
            .into_iter()
            .filter_map(|(_, l)| l.as_tiles())
            .collect()
    }

    pub fn object_groups(&self) -> Vec<&ObjectGroup> {
        self.flattened_layers()
            .into_iter()
            .filter_map(|(_, l)| l.as_objects())
            .collect()
    }

    /// Tileset owning `gid`. Flip flags are ignored.
    pub fn tileset_for_gid(&self, gid: u32) -> Option<&Tileset> {
        let gid = TileRef::decode(gid)?.gid;
        self.tilesets
            .iter()
            .rev()
            .find(|t| t.first_gid <= gid)
            .filter(|t| t.contains(gid))
    }

    pub fn tile_properties(&self, gid: u32) -> Option<&Properties> {
        let gid = TileRef::decode(gid)?.gid;
        self.tileset_for_gid(gid)?.tile_properties(gid)
    }

    /// Largest tile of any tileset, at least one grid cell.
    pub fn max_tile_size(&self) -> Vec2 {
        self.tilesets.iter().fold(
            Vec2::new(self.tile_width as f32, self.tile_height as f32),
            |acc, t| acc.max(Vec2::new(t.tile_width as f32, t.tile_height as f32)),
        )
    }

    pub fn pixel_size(&self) -> Vec2 {
        Vec2::new(
            (self.width * self.tile_width) as f32,
            (self.height * self.tile_height) as f32,
        )
    }

    /// Grid cell under a world position, if inside the map.
    pub fn world_to_tile(&self, world: Vec2) -> Option<(u32, u32)> {
        if world.x < 0.0 || world.y < 0.0 || self.tile_width == 0 || self.tile_height == 0 {
            return None;
        }
        let tx = (world.x / self.tile_width as f32) as u32;
        let ty = (world.y / self.tile_height as f32) as u32;
        (tx < self.width && ty < self.height).then_some((tx, ty))
    }

    /// Centre of a grid cell.
    pub fn tile_to_world(&self, x: u32, y: u32) -> Vec2 {
        Vec2::new(
            (x as f32 + 0.5) * self.tile_width as f32,
            (y as f32 + 0.5) * self.tile_height as f32,
        )
    }

    /// Instances for every rendered tile layer, bottom to top.
    pub fn build_visible_instances(&self, camera: &Camera2D, atlases: &AtlasRegistry) -> Vec<RenderInstance> {
        let mut instances = Vec::new();
        for (state, layer) in self.flattened_layers() {
            if let Some(tiles) = layer.as_tiles() {
                instances.extend(tiles.build_instances(state, self, camera, atlases));
            }
        }
        instances
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::atlas::{SpriteAtlas, TextureId};
    use crate::components::sprite::AtlasId;
    use crate::tiled::group::GroupLayer;
    use crate::tiled::object_group::ObjectGroup;
    use crate::tiled::tile_layer::FLIPPED_HORIZONTALLY;

    fn map() -> TmxMap {
        let mut map = TmxMap::new(10, 5, 16, 16);
        map.add_tileset(Tileset::new(101, "props", 32, 32, 2, 4, AtlasId(1)));
        map.add_tileset(Tileset::new(1, "terrain", 16, 16, 10, 100, AtlasId(0)));

        let mut ground = TileLayer::new("ground", 10, 5);
        ground.set_raw(0, 4, 1);
        let mut detail = TileLayer::new("detail", 10, 5);
        detail.set_raw(1, 4, 101);

        map.add_layer(ground);
        map.add_layer(
            GroupLayer::new("decor")
                .with_layer(detail)
                .with_layer(ObjectGroup::new("spawns")),
        );
        map
    }

    #[test]
    fn tilesets_sorted_and_resolved() {
        let map = map();
        assert_eq!(map.tilesets[0].name, "terrain");
        assert_eq!(map.tileset_for_gid(1).unwrap().name, "terrain");
        assert_eq!(map.tileset_for_gid(100).unwrap().name, "terrain");
        assert_eq!(map.tileset_for_gid(101 | FLIPPED_HORIZONTALLY).unwrap().name, "props");
        assert!(map.tileset_for_gid(105).is_none());
        assert!(map.tileset_for_gid(0).is_none());
        assert_eq!(map.max_tile_size(), Vec2::splat(32.0));
    }

    #[test]
    fn layer_lookup_descends_into_groups() {
        let map = map();
        assert_eq!(map.layer("spawns").map(|l| l.name()), Some("spawns"));
        assert!(map.layer("missing").is_none());
        assert_eq!(map.tile_layers().len(), 2);
        assert_eq!(map.object_groups().len(), 1);
        assert_eq!(map.flattened_layers().len(), 4);
    }

    #[test]
    fn coordinate_conversion() {
        let map = map();
        assert_eq!(map.pixel_size(), Vec2::new(160.0, 80.0));
        assert_eq!(map.world_to_tile(Vec2::new(17.0, 33.0)), Some((1, 2)));
        assert_eq!(map.world_to_tile(Vec2::new(-1.0, 0.0)), None);
        assert_eq!(map.world_to_tile(Vec2::new(160.0, 0.0)), None);
        assert_eq!(map.tile_to_world(1, 2), Vec2::new(24.0, 40.0));
    }

    #[test]
    fn map_instances_respect_group_state() {
        let mut map = map();
        let mut atlases = AtlasRegistry::new();
        atlases.insert(SpriteAtlas::new("terrain", TextureId(1), Vec2::new(160.0, 160.0)));
        atlases.insert(SpriteAtlas::new("props", TextureId(2), Vec2::new(64.0, 64.0)));

        let camera = Camera2D::new(160.0, 80.0);
        let instances = map.build_visible_instances(&camera, &atlases);
        assert_eq!(instances.len(), 2);
        // The 32px prop overhangs its 16px cell upward.
        assert_eq!((instances[1].x, instances[1].y), (32.0, 64.0));

        if let Layer::Group(group) = &mut map.layers[1] {
            group.set_visible(false);
        }
        assert_eq!(map.build_visible_instances(&camera, &atlases).len(), 1);
    }
}
