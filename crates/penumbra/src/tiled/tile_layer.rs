use std::f32::consts::FRAC_PI_2;

use glam::Vec2;

use super::layer::{LayerCommon, LayerState, TmxLayer};
use super::map::TmxMap;
use crate::assets::registry::AtlasRegistry;
use crate::core::rect::Rect;
use crate::physics::verlet::Collider;
use crate::renderer::camera::Camera2D;
use crate::renderer::instance::RenderInstance;

pub const FLIPPED_HORIZONTALLY: u32 = 0x8000_0000;
pub const FLIPPED_VERTICALLY: u32 = 0x4000_0000;
pub const FLIPPED_DIAGONALLY: u32 = 0x2000_0000;
const FLIP_MASK: u32 = FLIPPED_HORIZONTALLY | FLIPPED_VERTICALLY | FLIPPED_DIAGONALLY;

/// A decoded cell: the global tile id with its flip flags split out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRef {
    pub gid: u32,
    pub flip_h: bool,
    pub flip_v: bool,
    pub flip_d: bool,
}

impl TileRef {
    /// `None` for the empty cell (gid 0).
    pub fn decode(raw: u32) -> Option<Self> {
        let gid = raw & !FLIP_MASK;
        if gid == 0 {
            return None;
        }
        Some(Self {
            gid,
            flip_h: raw & FLIPPED_HORIZONTALLY != 0,
            flip_v: raw & FLIPPED_VERTICALLY != 0,
            flip_d: raw & FLIPPED_DIAGONALLY != 0,
        })
    }

    pub fn encode(&self) -> u32 {
        let mut raw = self.gid;
        if self.flip_h {
            raw |= FLIPPED_HORIZONTALLY;
        }
        if self.flip_v {
            raw |= FLIPPED_VERTICALLY;
        }
        if self.flip_d {
            raw |= FLIPPED_DIAGONALLY;
        }
        raw
    }

    /// Rotation and per-axis mirroring that reproduce the flags when the
    /// renderer scales first and rotates second. A diagonal flip is a
    /// transpose: a quarter turn of a vertically mirrored tile.
    pub fn orientation(&self) -> (f32, bool, bool) {
        if self.flip_d {
            (FRAC_PI_2, self.flip_v, !self.flip_h)
        } else {
            (0.0, self.flip_h, self.flip_v)
        }
    }
}

/// A grid of global tile ids, row-major.
#[derive(Debug, Clone)]
pub struct TileLayer {
    pub common: LayerCommon,
    pub width: u32,
    pub height: u32,
    gids: Vec<u32>,
}

fn cell_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

impl TileLayer {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            common: LayerCommon::new(name),
            width,
            height,
            gids: vec![0; cell_count(width, height)],
        }
    }

    /// Build from raw cell data as stored in a map file. Missing cells are
    /// empty; extra cells are dropped.
    pub fn from_gids(name: impl Into<String>, width: u32, height: u32, mut gids: Vec<u32>) -> Self {
        let count = cell_count(width, height);
        if gids.len() != count {
            log::warn!("tile layer: expected {} cells, got {}", count, gids.len());
            gids.resize(count, 0);
        }
        Self {
            common: LayerCommon::new(name),
            width,
            height,
            gids,
        }
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    /// Raw cell value including flip flags.
    pub fn raw(&self, x: u32, y: u32) -> u32 {
        self.index(x, y).map_or(0, |i| self.gids[i])
    }

    pub fn tile(&self, x: u32, y: u32) -> Option<TileRef> {
        TileRef::decode(self.raw(x, y))
    }

    pub fn set_raw(&mut self, x: u32, y: u32, raw: u32) {
        if let Some(i) = self.index(x, y) {
            self.gids[i] = raw;
        }
    }

    pub fn set_tile(&mut self, x: u32, y: u32, tile: Option<TileRef>) {
        self.set_raw(x, y, tile.map_or(0, |t| t.encode()));
    }

    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, raw: u32) {
        for ty in y..y.saturating_add(h).min(self.height) {
            for tx in x..x.saturating_add(w).min(self.width) {
                self.set_raw(tx, ty, raw);
            }
        }
    }

    pub fn gids(&self) -> &[u32] {
        &self.gids
    }

    /// Instances for tiles inside the camera view, using this layer's own state.
    pub fn build_visible_instances(
        &self,
        map: &TmxMap,
        camera: &Camera2D,
        atlases: &AtlasRegistry,
    ) -> Vec<RenderInstance> {
        self.build_instances(LayerState::of(self), map, camera, atlases)
    }

    /// Instances for tiles inside the camera view under a composed group state.
    pub fn build_instances(
        &self,
        state: LayerState,
        map: &TmxMap,
        camera: &Camera2D,
        atlases: &AtlasRegistry,
    ) -> Vec<RenderInstance> {
        let mut instances = Vec::new();
        if !state.is_rendered() || map.tile_width == 0 || map.tile_height == 0 {
            return instances;
        }

        let cell = Vec2::new(map.tile_width as f32, map.tile_height as f32);
        let origin = state.parallax_offset(camera.center);
        let view = camera.view_rect();

        // Tiles taller or wider than the grid overhang their cell; pad the
        // visible range by the largest tileset tile.
        let pad = map.max_tile_size().max(cell);
        let local_min = view.min() - origin - pad;
        let local_max = view.max() - origin + pad;

        let min_tx = (local_min.x / cell.x).floor().max(0.0) as u32;
        let min_ty = (local_min.y / cell.y).floor().max(0.0) as u32;
        let max_tx = ((local_max.x / cell.x).ceil().max(0.0) as u32).min(self.width);
        let max_ty = ((local_max.y / cell.y).ceil().max(0.0) as u32).min(self.height);

        for ty in min_ty..max_ty {
            for tx in min_tx..max_tx {
                let Some(tile) = self.tile(tx, ty) else {
                    continue;
                };
                let Some(tileset) = map.tileset_for_gid(tile.gid) else {
                    continue;
                };
                let Some(atlas) = atlases.get(tileset.atlas) else {
                    continue;
                };
                let Some(texture) = atlas.texture() else {
                    continue;
                };

                let size = Vec2::new(tileset.tile_width as f32, tileset.tile_height as f32);
                let bounds = Rect::new(
                    origin.x + tx as f32 * cell.x,
                    origin.y + (ty + 1) as f32 * cell.y - size.y,
                    size.x,
                    size.y,
                );
                if !view.intersects(&bounds) {
                    continue;
                }

                let source = tileset.source_rect(tile.gid);
                let texture_size = atlas.texture_size();
                let (rotation, flip_x, flip_y) = tile.orientation();
                let center = bounds.center();
                instances.push(RenderInstance {
                    x: center.x,
                    y: center.y,
                    rotation,
                    scale_x: if flip_x { -size.x } else { size.x },
                    scale_y: if flip_y { -size.y } else { size.y },
                    u: source.x / texture_size.x,
                    v: source.y / texture_size.y,
                    uw: source.width / texture_size.x,
                    vh: source.height / texture_size.y,
                    r: 1.0,
                    g: 1.0,
                    b: 1.0,
                    alpha: state.opacity,
                    texture: texture.0 as f32,
                    origin_x: 0.5,
                    origin_y: 0.5,
                });
            }
        }

        instances
    }

    /// One rectangle per horizontal run of tiles whose tileset tile has the
    /// boolean `property` set. Uses the layer offset, not parallax.
    pub fn solid_colliders(&self, map: &TmxMap, property: &str) -> Vec<Collider> {
        let cell = Vec2::new(map.tile_width as f32, map.tile_height as f32);
        let origin = self.offset();
        let mut colliders = Vec::new();

        let is_solid = |x: u32, y: u32| {
            self.tile(x, y)
                .and_then(|t| map.tile_properties(t.gid))
                .and_then(|p| p.get_bool(property))
                .unwrap_or(false)
        };

        for ty in 0..self.height {
            let mut run_start: Option<u32> = None;
            for tx in 0..=self.width {
                let solid = tx < self.width && is_solid(tx, ty);
                match (solid, run_start) {
                    (true, None) => run_start = Some(tx),
                    (false, Some(start)) => {
                        colliders.push(Collider::Rect(Rect::new(
                            origin.x + start as f32 * cell.x,
                            origin.y + ty as f32 * cell.y,
                            (tx - start) as f32 * cell.x,
                            cell.y,
                        )));
                        run_start = None;
                    }
                    _ => {}
                }
            }
        }

        colliders
    }
}

impl TmxLayer for TileLayer {
    fn common(&self) -> &LayerCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut LayerCommon {
        &mut self.common
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::atlas::{SpriteAtlas, TextureId};
    use crate::tiled::properties::{Properties, PropertyValue};
    use crate::tiled::tileset::Tileset;

    fn setup() -> (TmxMap, AtlasRegistry) {
        let mut atlases = AtlasRegistry::new();
        let (atlas, _) = atlases.insert(SpriteAtlas::new(
            "terrain",
            TextureId(3),
            Vec2::new(64.0, 32.0),
        ));

        let mut tileset = Tileset::new(1, "terrain", 16, 16, 4, 8, atlas);
        tileset.set_tile_properties(1, Properties::new().with("solid", PropertyValue::Bool(true)));

        let mut map = TmxMap::new(8, 4, 16, 16);
        map.tilesets.push(tileset);
        (map, atlases)
    }

    #[test]
    fn flip_flags_decode() {
        let raw = 5 | FLIPPED_HORIZONTALLY | FLIPPED_DIAGONALLY;
        let tile = TileRef::decode(raw).unwrap();
        assert_eq!(tile.gid, 5);
        assert!(tile.flip_h && !tile.flip_v && tile.flip_d);
        assert_eq!(tile.encode(), raw);
        assert_eq!(TileRef::decode(FLIPPED_VERTICALLY), None);
    }

    #[test]
    fn oversized_fill_is_clipped_to_the_layer() {
        let mut layer = TileLayer::new("ground", 8, 4);
        layer.fill_rect(2, 1, u32::MAX, u32::MAX, 5);
        assert_eq!(layer.raw(1, 1), 0);
        assert_eq!(layer.raw(2, 0), 0);
        assert_eq!(layer.raw(2, 1), 5);
        assert_eq!(layer.raw(7, 3), 5);
        assert_eq!(layer.gids().iter().filter(|&&g| g == 5).count(), 6 * 3);
        // Out of range coordinates read as empty instead of wrapping.
        assert_eq!(layer.raw(u32::MAX, u32::MAX), 0);
    }

    #[test]
    fn diagonal_flip_is_quarter_turn() {
        let plain = TileRef::decode(1 | FLIPPED_HORIZONTALLY).unwrap();
        assert_eq!(plain.orientation(), (0.0, true, false));
        let transposed = TileRef::decode(1 | FLIPPED_DIAGONALLY).unwrap();
        assert_eq!(transposed.orientation(), (FRAC_PI_2, false, true));
        let rotated = TileRef::decode(1 | FLIPPED_DIAGONALLY | FLIPPED_HORIZONTALLY).unwrap();
        assert_eq!(rotated.orientation(), (FRAC_PI_2, false, false));
    }

    #[test]
    fn visible_instances_are_culled_and_flipped() {
        let (map, atlases) = setup();
        let mut layer = TileLayer::new("ground", 8, 4);
        layer.set_raw(0, 0, 2 | FLIPPED_HORIZONTALLY);
        layer.set_raw(7, 3, 1);
        layer.common.opacity = 0.5;

        // View covers x in [0, 32), y in [0, 32).
        let mut camera = Camera2D::new(32.0, 32.0);
        camera.center = Vec2::new(16.0, 16.0);

        let instances = layer.build_visible_instances(&map, &camera, &atlases);
        assert_eq!(instances.len(), 1);
        let i = &instances[0];
        assert_eq!((i.x, i.y), (8.0, 8.0));
        assert_eq!((i.scale_x, i.scale_y), (-16.0, 16.0));
        assert_eq!((i.u, i.uw), (0.25, 0.25));
        assert_eq!(i.alpha, 0.5);
        assert_eq!(i.texture, 3.0);

        camera.center = Vec2::new(128.0 - 16.0, 64.0 - 16.0);
        let instances = layer.build_visible_instances(&map, &camera, &atlases);
        assert_eq!(instances.len(), 1);
        assert_eq!((instances[0].x, instances[0].y), (120.0, 56.0));
    }

    #[test]
    fn parallax_shifts_the_layer() {
        let (map, atlases) = setup();
        let mut layer = TileLayer::new("far", 8, 4);
        layer.set_raw(0, 0, 1);
        layer.common.parallax = Vec2::ZERO;

        let mut camera = Camera2D::new(32.0, 32.0);
        camera.center = Vec2::new(500.0, 16.0);
        // A fixed layer stays glued to the camera.
        let instances = layer.build_visible_instances(&map, &camera, &atlases);
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].x, 508.0);
    }

    #[test]
    fn hidden_layer_builds_nothing() {
        let (map, atlases) = setup();
        let mut layer = TileLayer::new("ground", 8, 4);
        layer.fill_rect(0, 0, 8, 4, 1);
        layer.set_visible(false);
        let camera = Camera2D::new(128.0, 64.0);
        assert!(layer.build_visible_instances(&map, &camera, &atlases).is_empty());
    }

    #[test]
    fn solid_runs_merge() {
        let (map, _) = setup();
        let mut layer = TileLayer::new("ground", 8, 4);
        layer.fill_rect(1, 3, 4, 1, 2);
        layer.set_raw(7, 3, 2 | FLIPPED_VERTICALLY);
        layer.set_raw(0, 0, 1);
        layer.common.offset = Vec2::new(0.0, 10.0);

        let colliders = layer.solid_colliders(&map, "solid");
        assert_eq!(
            colliders,
            vec![
                Collider::Rect(Rect::new(16.0, 58.0, 64.0, 16.0)),
                Collider::Rect(Rect::new(112.0, 58.0, 16.0, 16.0)),
            ]
        );
    }

    #[test]
    fn short_gid_data_is_padded() {
        let layer = TileLayer::from_gids("ground", 2, 2, vec![1, 2, 3]);
        assert_eq!(layer.gids().len(), 4);
        assert_eq!(layer.tile(1, 1), None);
        assert_eq!(layer.raw(9, 9), 0);
    }
}
