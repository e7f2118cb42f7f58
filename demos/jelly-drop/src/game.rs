use glam::Vec2;
use penumbra::api::game::GameConfig;
use penumbra::input::queue::{InputEvent, InputQueue};
use penumbra::physics::verlet::VerletConfig;
use penumbra::svg::SvgShape;
use penumbra::tiled::{PropertyValue, Properties, TileLayer, Tileset};
use penumbra::*;

pub const WORLD_W: f32 = 640.0;
pub const WORLD_H: f32 = 360.0;
const TILE: u32 = 32;
const MAP_W: u32 = 20;
const MAP_H: u32 = 12;

/// Custom event kinds from the host UI.
pub const CUSTOM_RESET: u32 = 1;
pub const CUSTOM_DROP: u32 = 2;
pub const KEY_SPACE: u32 = 32;

/// Game event kinds to the host.
pub const EVENT_RESTING: f32 = 1.0;
pub const SOUND_DROP: SoundEvent = SoundEvent(1);

const BLOBS: &str = r##"{
    "width": 640, "height": 360,
    "shapes": [
        { "shape": { "type": "circle", "r": 14, "cx": 120, "cy": 40 }, "paint": { "fill": "#f0a" } },
        { "shape": { "type": "circle", "r": 10, "cx": 180, "cy": 20 }, "paint": { "fill": "#0af" } },
        { "shape": { "type": "circle", "r": 18, "cx": 260, "cy": 60 }, "paint": { "fill": "#fa0" } },
        { "shape": { "type": "polyline", "points": "420,40 450,40 480,40 510,40 540,40" },
          "paint": { "fill": "none", "stroke": "white", "stroke-width": 2 } },
        { "shape": { "type": "polygon", "points": "300,320 360,280 420,320" },
          "paint": { "fill": "gray" } }
    ]
}"##;

const BLOB_ATLAS: &str = r#"{
    "name": "blobs",
    "texture": "blobs.png",
    "width": 128,
    "height": 32,
    "sprites": [
        { "name": "blob_0", "x": 0, "y": 0, "w": 32, "h": 32 },
        { "name": "blob_1", "x": 32, "y": 0, "w": 32, "h": 32 },
        { "name": "blob_2", "x": 64, "y": 0, "w": 32, "h": 32 },
        { "name": "glow", "x": 96, "y": 0, "w": 32, "h": 32 }
    ],
    "animations": {
        "wobble": { "frames": ["blob_0", "blob_1", "blob_2", "blob_1"], "fps": 8 }
    }
}"#;

/// Soft blobs, a rope and a tire dropped onto a tiled floor.
pub struct JellyDrop {
    blobs: Vec<EntityId>,
    drops: u32,
    resting_reported: bool,
    frames: u32,
}

impl JellyDrop {
    pub fn new() -> Self {
        Self {
            blobs: Vec::new(),
            drops: 0,
            resting_reported: false,
            frames: 0,
        }
    }

    pub fn blob_count(&self) -> usize {
        self.blobs.len()
    }

    fn load_atlases(ctx: &mut EngineContext) -> EngineResult<()> {
        let manifest = AtlasManifest::from_json(BLOB_ATLAS)?;
        let atlas = SpriteAtlas::from_manifest(&manifest, TextureId(1))?;
        ctx.atlases.insert(atlas);

        let terrain = AtlasManifest::grid("terrain", "terrain.png", 128, 128, TILE, TILE, "tile");
        ctx.atlases.insert(SpriteAtlas::from_manifest(&terrain, TextureId(2))?);
        Ok(())
    }

    fn build_level(ctx: &mut EngineContext) {
        let Some(terrain) = ctx.atlases.id_of("terrain") else {
            return;
        };
        let mut map = TmxMap::new(MAP_W, MAP_H, TILE, TILE);
        let mut tileset = Tileset::new(1, "terrain", TILE, TILE, 4, 16, terrain);
        tileset.set_tile_properties(0, Properties::new().with("solid", PropertyValue::Bool(true)));
        map.add_tileset(tileset);

        let mut ground = TileLayer::new("ground", MAP_W, MAP_H);
        ground.fill_rect(0, MAP_H - 1, MAP_W, 1, 1);
        // A ledge on the left.
        ground.fill_rect(1, 7, 4, 1, 1);
        // Grass decoration, not solid.
        ground.fill_rect(5, MAP_H - 2, 3, 1, 2);

        for collider in ground.solid_colliders(&map, "solid") {
            ctx.verlet.add_collider(collider);
        }
        map.add_layer(ground);
        ctx.map = Some(map);
    }

    /// Blobs from the SVG circles. With `with_static`, also the rope and the
    /// polygon ramp.
    fn spawn_shapes(&mut self, ctx: &mut EngineContext, with_static: bool) -> EngineResult<()> {
        let doc = SvgDocument::from_json(BLOBS)?;
        let Some(blobs) = ctx.atlases.id_of("blobs") else {
            return Ok(());
        };
        for element in &doc.shapes {
            match &element.shape {
                SvgShape::Circle(circle) => {
                    let tint = element.paint.fill_color()?.unwrap_or(Rgba::WHITE);
                    let id = ctx.next_id();
                    let entity = Entity::new(id)
                        .with_tag("blob")
                        .with_scale(Vec2::splat(circle.r * 2.0))
                        .with_sprite(SpriteComponent::new(blobs, 0).with_tint(tint))
                        .with_animation(AnimationComponent::playing(blobs, "wobble"));
                    ctx.spawn_with_body(entity, circle.to_ball());
                    self.blobs.push(id);
                }
                SvgShape::Polyline(line) if with_static => {
                    ctx.verlet.add_composite(line.to_rope(0.9)?.pin_first().pin_last());
                }
                SvgShape::Polygon(polygon) if with_static => {
                    for collider in polygon.to_collider_segments()? {
                        ctx.verlet.add_collider(collider);
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn drop_blob(&mut self, ctx: &mut EngineContext, x: f32) {
        let Some(blobs) = ctx.atlases.id_of("blobs") else {
            return;
        };
        let id = ctx.next_id();
        let entity = Entity::new(id)
            .with_tag("blob")
            .with_scale(Vec2::splat(24.0))
            .with_sprite(SpriteComponent::new(blobs, 0))
            .with_animation(AnimationComponent::playing(blobs, "wobble"));
        ctx.spawn_with_body(entity, Composite::ball(Vec2::new(x, 16.0), 12.0));
        self.blobs.push(id);
        self.drops += 1;
        self.resting_reported = false;
        ctx.emit_sound(SOUND_DROP);
    }

    fn reset(&mut self, ctx: &mut EngineContext) {
        for id in self.blobs.drain(..) {
            ctx.despawn(id);
        }
        if let Err(err) = self.spawn_shapes(ctx, false) {
            log::error!("failed to respawn blobs: {err}");
        }
        self.resting_reported = false;
    }

    fn all_resting(&self, ctx: &EngineContext) -> bool {
        self.blobs.iter().all(|id| {
            ctx.scene
                .get(*id)
                .and_then(|e| e.body)
                .and_then(|link| ctx.verlet.composite(link.composite))
                .and_then(|c| c.particles.first())
                .map_or(true, |p| p.velocity().length() < 0.05)
        })
    }
}

impl Default for JellyDrop {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for JellyDrop {
    fn config(&self) -> GameConfig {
        GameConfig {
            world_width: WORLD_W,
            world_height: WORLD_H,
            max_instances: 256,
            debug_physics: true,
            verlet: VerletConfig {
                simulation_bounds: Some(Rect::new(0.0, 0.0, WORLD_W, WORLD_H)),
                ..VerletConfig::default()
            },
            ..GameConfig::default()
        }
    }

    fn init(&mut self, ctx: &mut EngineContext) {
        if let Err(err) = Self::load_atlases(ctx) {
            log::error!("atlas load failed: {err}");
            return;
        }
        Self::build_level(ctx);
        if let Err(err) = self.spawn_shapes(ctx, true) {
            log::error!("shape load failed: {err}");
        }
        ctx.verlet.add_composite(Composite::tire(Vec2::new(540.0, 200.0), 30.0, 12, 0.4, 0.9));
        ctx.verlet.add_composite(Composite::cloth(Vec2::new(40.0, 20.0), 80.0, 60.0, 6, 0.8, Some(6.0), true));

        ctx.lights.ambient = Rgba::rgb(0.15, 0.15, 0.2);
        ctx.lights.add_point(PointLight::new(Vec2::new(320.0, 80.0), Rgba::YELLOW, 1.2, 260.0));
        ctx.lights.add_spot(SpotLight::new(
            PointLight::new(Vec2::new(600.0, 20.0), Rgba::WHITE, 1.0, 300.0),
            Vec2::new(-1.0, 1.0).normalize(),
            0.5,
        ));
    }

    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue) {
        self.frames += 1;
        for event in input.iter() {
            match *event {
                InputEvent::KeyDown { key_code: KEY_SPACE } => {
                    let x = 100.0 + (self.drops % 5) as f32 * 100.0;
                    self.drop_blob(ctx, x);
                }
                InputEvent::Custom { kind: CUSTOM_DROP, a, .. } => self.drop_blob(ctx, a),
                InputEvent::Custom { kind: CUSTOM_RESET, .. } => self.reset(ctx),
                _ => {}
            }
        }

        if !self.resting_reported && self.frames > 30 && self.all_resting(ctx) {
            self.resting_reported = true;
            ctx.emit_event(GameEvent::new(
                EVENT_RESTING,
                self.blobs.len() as f32,
                self.frames as f32,
                0.0,
            ));
        }
    }
}
