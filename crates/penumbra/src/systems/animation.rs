//! Animation system: advances playback and points sprites at the current frame.

use crate::assets::registry::AtlasRegistry;
use crate::core::scene::Scene;

/// Tick all entity animations and update their sprite index.
///
/// Call once per frame before building the render buffer. Animations whose
/// atlas is missing are left untouched.
pub fn tick_animations(scene: &mut Scene, atlases: &AtlasRegistry, dt: f32) {
    for entity in scene.iter_mut() {
        let Some(anim) = entity.animation.as_mut() else {
            continue;
        };
        let Some(atlas) = atlases.get(anim.atlas) else {
            continue;
        };
        anim.tick(dt, atlas);

        if let (Some(frame), Some(sprite)) = (anim.current_sprite(atlas), entity.sprite.as_mut()) {
            sprite.atlas = anim.atlas;
            sprite.sprite = frame;
        }
    }
}
