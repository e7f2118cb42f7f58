use crate::core::color::Rgba;

/// Index into the [`AtlasRegistry`](crate::assets::registry::AtlasRegistry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AtlasId(pub u32);

/// Blend mode for sprite rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Standard alpha blending (src-alpha, one-minus-src-alpha).
    #[default]
    Alpha,
    /// Additive blending for glow and light sprites (src-alpha, one).
    Additive,
}

/// How an entity appears: one sprite of one atlas.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteComponent {
    pub atlas: AtlasId,
    /// Sprite index within the atlas.
    pub sprite: usize,
    /// Multiplied into the texture color. Alpha > 1.0 is allowed for HDR glow.
    pub tint: Rgba,
    pub blend: BlendMode,
    pub flip_x: bool,
    pub flip_y: bool,
}

impl SpriteComponent {
    pub fn new(atlas: AtlasId, sprite: usize) -> Self {
        Self {
            atlas,
            sprite,
            ..Default::default()
        }
    }

    pub fn with_tint(mut self, tint: Rgba) -> Self {
        self.tint = tint;
        self
    }

    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }

    pub fn flipped(mut self, flip_x: bool, flip_y: bool) -> Self {
        self.flip_x = flip_x;
        self.flip_y = flip_y;
        self
    }
}

impl Default for SpriteComponent {
    fn default() -> Self {
        Self {
            atlas: AtlasId(0),
            sprite: 0,
            tint: Rgba::WHITE,
            blend: BlendMode::Alpha,
            flip_x: false,
            flip_y: false,
        }
    }
}
