use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::EngineResult;

/// Atlas description loaded from JSON at runtime: one texture, its named
/// regions and the animations built from them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtlasManifest {
    pub name: String,
    /// Relative path to the texture file (e.g., "hero.png").
    pub texture: String,
    /// Texture width in pixels.
    pub width: u32,
    /// Texture height in pixels.
    pub height: u32,
    #[serde(default)]
    pub sprites: Vec<SpriteEntry>,
    /// Animation name → frame list.
    #[serde(default)]
    pub animations: HashMap<String, AnimationEntry>,
}

/// A named pixel rectangle in the texture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpriteEntry {
    pub name: String,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    /// Normalized pivot; defaults to the center.
    #[serde(default)]
    pub origin: Option<[f32; 2]>,
}

/// Frames are sprite names from the same manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationEntry {
    pub frames: Vec<String>,
    #[serde(default = "default_fps")]
    pub fps: f32,
    #[serde(default = "default_looping")]
    pub looping: bool,
}

fn default_fps() -> f32 {
    10.0
}

fn default_looping() -> bool {
    true
}

impl AtlasManifest {
    pub fn from_json(json: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Manifest for a uniform sprite sheet: cells named `{prefix}_{n}` in
    /// row-major order. Partial cells at the right/bottom edge are skipped.
    pub fn grid(
        name: impl Into<String>,
        texture: impl Into<String>,
        width: u32,
        height: u32,
        cell_w: u32,
        cell_h: u32,
        prefix: &str,
    ) -> Self {
        let cols = if cell_w == 0 { 0 } else { width / cell_w };
        let rows = if cell_h == 0 { 0 } else { height / cell_h };
        let sprites = (0..rows)
            .flat_map(|row| (0..cols).map(move |col| (row, col)))
            .enumerate()
            .map(|(n, (row, col))| SpriteEntry {
                name: format!("{}_{}", prefix, n),
                x: col * cell_w,
                y: row * cell_h,
                w: cell_w,
                h: cell_h,
                origin: None,
            })
            .collect();
        Self {
            name: name.into(),
            texture: texture.into(),
            width,
            height,
            sprites,
            animations: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::atlas::{SpriteAtlas, TextureId};
    use crate::error::EngineError;

    const HERO: &str = r#"{
        "name": "hero",
        "texture": "hero.png",
        "width": 96,
        "height": 32,
        "sprites": [
            { "name": "run_0", "x": 0, "y": 0, "w": 32, "h": 32 },
            { "name": "run_1", "x": 32, "y": 0, "w": 32, "h": 32, "origin": [0.5, 1.0] },
            { "name": "run_2", "x": 64, "y": 0, "w": 32, "h": 32 }
        ],
        "animations": {
            "run": { "frames": ["run_0", "run_1", "run_2"], "fps": 12 },
            "pose": { "frames": ["run_1"], "looping": false }
        }
    }"#;

    #[test]
    fn parse_and_build_atlas() {
        let manifest = AtlasManifest::from_json(HERO).unwrap();
        assert_eq!(manifest.sprites.len(), 3);
        assert_eq!(manifest.animations["pose"].fps, 10.0);
        assert!(manifest.animations["run"].looping);

        let atlas = SpriteAtlas::from_manifest(&manifest, TextureId(1)).unwrap();
        assert_eq!(atlas.get_animation("run").unwrap().frames, vec![0, 1, 2]);
        assert!(!atlas.get_animation("pose").unwrap().looping);
        assert_eq!(atlas.get_sprite("run_1").unwrap().origin.y, 1.0);
    }

    #[test]
    fn unknown_frame_name_is_an_error() {
        let mut manifest = AtlasManifest::from_json(HERO).unwrap();
        manifest.animations.insert(
            "bad".into(),
            AnimationEntry { frames: vec!["nope".into()], fps: 10.0, looping: true },
        );
        match SpriteAtlas::from_manifest(&manifest, TextureId(1)) {
            Err(EngineError::UnknownSprite(name)) => assert_eq!(name, "nope"),
            other => panic!("expected UnknownSprite, got {:?}", other.map(|a| a.name)),
        }
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(
            AtlasManifest::from_json("{ \"name\": 3 }"),
            Err(EngineError::Json { .. })
        ));
    }

    #[test]
    fn grid_names_cells_row_major() {
        let m = AtlasManifest::grid("tiles", "tiles.png", 100, 64, 32, 32, "tile");
        // 3 full columns, 2 rows
        assert_eq!(m.sprites.len(), 6);
        assert_eq!(m.sprites[4].name, "tile_4");
        assert_eq!((m.sprites[4].x, m.sprites[4].y), (32, 32));
    }
}
