use std::collections::HashMap;

use super::properties::Properties;
use crate::components::sprite::AtlasId;
use crate::core::rect::Rect;

/// A uniform grid of tiles cut from one image, registered as an atlas.
#[derive(Debug, Clone)]
pub struct Tileset {
    /// Global id of the first tile; gids below belong to other tilesets.
    pub first_gid: u32,
    pub name: String,
    pub tile_width: u32,
    pub tile_height: u32,
    pub columns: u32,
    pub tile_count: u32,
    /// Pixels between tiles.
    pub spacing: u32,
    /// Pixels around the outer edge of the image.
    pub margin: u32,
    pub atlas: AtlasId,
    /// Keyed by local tile id.
    tile_properties: HashMap<u32, Properties>,
}

impl Tileset {
    pub fn new(
        first_gid: u32,
        name: impl Into<String>,
        tile_width: u32,
        tile_height: u32,
        columns: u32,
        tile_count: u32,
        atlas: AtlasId,
    ) -> Self {
        Self {
            first_gid,
            name: name.into(),
            tile_width,
            tile_height,
            columns: columns.max(1),
            tile_count,
            spacing: 0,
            margin: 0,
            atlas,
            tile_properties: HashMap::new(),
        }
    }

    pub fn with_spacing(mut self, spacing: u32, margin: u32) -> Self {
        self.spacing = spacing;
        self.margin = margin;
        self
    }

    pub fn contains(&self, gid: u32) -> bool {
        gid >= self.first_gid && gid - self.first_gid < self.tile_count
    }

    /// Pixel rectangle of `gid` in the tileset image. The gid must be flag-free.
    pub fn source_rect(&self, gid: u32) -> Rect {
        let local = gid.saturating_sub(self.first_gid);
        let col = local % self.columns;
        let row = local / self.columns;
        Rect::new(
            (self.margin + col * (self.tile_width + self.spacing)) as f32,
            (self.margin + row * (self.tile_height + self.spacing)) as f32,
            self.tile_width as f32,
            self.tile_height as f32,
        )
    }

    pub fn set_tile_properties(&mut self, local_id: u32, properties: Properties) {
        self.tile_properties.insert(local_id, properties);
    }

    pub fn tile_properties(&self, gid: u32) -> Option<&Properties> {
        if !self.contains(gid) {
            return None;
        }
        self.tile_properties.get(&(gid - self.first_gid))
    }
}
