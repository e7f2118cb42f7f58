use glam::Vec2;

use crate::assets::registry::AtlasRegistry;
use crate::components::entity::Entity;
use crate::components::sprite::BlendMode;
use crate::core::rect::Rect;
use crate::core::scene::Scene;
use crate::renderer::instance::{RenderBuffer, RenderInstance};

/// Instance for one entity, or `None` when it has nothing drawable
/// (no sprite, unknown atlas or sprite, disposed atlas).
pub fn sprite_instance(entity: &Entity, atlases: &AtlasRegistry) -> Option<RenderInstance> {
    let sprite = entity.sprite.as_ref()?;
    let atlas = atlases.get(sprite.atlas)?;
    let region = atlas.sprite(sprite.sprite)?;
    let [u, v, uw, vh] = region.uvs(atlas.texture_size());
    Some(RenderInstance {
        x: entity.pos.x,
        y: entity.pos.y,
        rotation: entity.rotation,
        scale_x: if sprite.flip_x { -entity.scale.x } else { entity.scale.x },
        scale_y: if sprite.flip_y { -entity.scale.y } else { entity.scale.y },
        u,
        v,
        uw,
        vh,
        r: sprite.tint.r,
        g: sprite.tint.g,
        b: sprite.tint.b,
        alpha: sprite.tint.a,
        texture: region.texture.0 as f32,
        origin_x: region.origin.x,
        origin_y: region.origin.y,
    })
}

/// Rebuild `buffer` from the scene: alpha-blended sprites first, then
/// additive ones starting at `additive_start`. Returns how many instances
/// did not fit.
pub fn build_render_buffer(scene: &Scene, atlases: &AtlasRegistry, buffer: &mut RenderBuffer) -> usize {
    build_render_buffer_over(std::iter::empty(), scene, atlases, None, buffer)
}

/// Like [`build_render_buffer`], with `underlay` (usually tile layers)
/// drawn alpha-blended beneath every sprite. Sprites whose bounds miss
/// `view` are skipped.
pub fn build_render_buffer_over(
    underlay: impl IntoIterator<Item = RenderInstance>,
    scene: &Scene,
    atlases: &AtlasRegistry,
    view: Option<&Rect>,
    buffer: &mut RenderBuffer,
) -> usize {
    buffer.clear();

    let mut additive: Vec<RenderInstance> = Vec::new();
    let mut dropped = 0;

    for instance in underlay {
        if !buffer.push(instance) {
            dropped += 1;
        }
    }

    for entity in scene.iter().filter(|e| e.active) {
        let Some(instance) = sprite_instance(entity, atlases) else {
            continue;
        };
        let pivot = Vec2::new(instance.origin_x, instance.origin_y);
        if view.is_some_and(|v| !v.intersects(&entity.bounds(pivot))) {
            continue;
        }
        let blend = entity.sprite.as_ref().map_or(BlendMode::Alpha, |s| s.blend);
        match blend {
            BlendMode::Alpha => {
                if !buffer.push(instance) {
                    dropped += 1;
                }
            }
            BlendMode::Additive => additive.push(instance),
        }
    }

    buffer.set_additive_start(buffer.instance_count());
    for instance in additive {
        if !buffer.push(instance) {
            dropped += 1;
        }
    }

    if dropped > 0 {
        log::warn!("render buffer full: dropped {dropped} instances");
    }
    dropped
}
