use glam::Vec2;

use crate::api::game::{EngineContext, Game, GameConfig, RenderContext};
use crate::core::time::FixedTimestep;
use crate::input::queue::{InputEvent, InputQueue};
use crate::input::touch::{TouchExt, TouchState};
use crate::renderer::instance::RenderBuffer;
use crate::systems::animation::tick_animations;
use crate::systems::lighting::LightInstance;
use crate::systems::render::build_render_buffer_over;

/// Generic game runner that wires up the engine loop.
///
/// The host owns one runner per game, feeds it input and frame times, then
/// reads the instance, light, vector and sound buffers after each `tick`.
pub struct GameRunner<G: Game> {
    game: G,
    ctx: EngineContext,
    input: InputQueue,
    render_buffer: RenderBuffer,
    lights: Vec<LightInstance>,
    timestep: FixedTimestep,
    config: GameConfig,
    /// Host surface size in pixels, for touch conversion.
    viewport: Vec2,
    /// Touch currently steering a drag.
    drag_touch: Option<u32>,
    initialized: bool,
    /// Flat buffer of sound event IDs for the host.
    sound_buffer: Vec<u32>,
}

impl<G: Game> GameRunner<G> {
    pub fn new(game: G) -> Self {
        let config = game.config();
        Self {
            ctx: EngineContext::with_config(&config),
            input: InputQueue::new(),
            render_buffer: RenderBuffer::with_capacity(config.max_instances),
            lights: Vec::new(),
            timestep: FixedTimestep::new(config.fixed_dt)
                .with_max_steps(config.verlet.maximum_step_iterations),
            viewport: Vec2::new(config.world_width, config.world_height),
            drag_touch: None,
            initialized: false,
            sound_buffer: Vec::with_capacity(config.max_sounds),
            config,
            game,
        }
    }

    /// Initialize the game. Call once after construction.
    pub fn init(&mut self) {
        self.game.init(&mut self.ctx);
        self.ctx.sync_bodies();
        self.initialized = true;
        log::info!(
            "game initialized: {}x{} world, {} entities, {} composites, {} atlases",
            self.config.world_width,
            self.config.world_height,
            self.ctx.scene.len(),
            self.ctx.verlet.composite_count(),
            self.ctx.atlases.len(),
        );
    }

    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Host surface size in pixels.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width, height);
    }

    /// Run one frame: pointer dragging, fixed steps of game logic and
    /// physics, animations, then every output buffer.
    pub fn tick(&mut self, dt: f32) {
        if !self.initialized {
            return;
        }

        self.ctx.clear_frame_data();
        self.apply_pointer_input();

        let steps = self.timestep.accumulate(dt);
        for _ in 0..steps {
            self.game.update(&mut self.ctx, &self.input);
            self.ctx.step_physics();
        }

        // Input is seen by at most one frame, even when no step ran.
        self.input.drain();

        tick_animations(&mut self.ctx.scene, &self.ctx.atlases, dt);
        self.build_frame();

        self.sound_buffer.clear();
        self.sound_buffer.extend(self.ctx.sounds.iter().map(|s| s.0));
    }

    fn apply_pointer_input(&mut self) {
        let radius = self.config.drag_radius;
        for event in self.input.iter() {
            let event = match event {
                InputEvent::Touch(touch) => {
                    // Only one finger drags at a time.
                    if self.drag_touch.is_some_and(|id| id != touch.id) {
                        continue;
                    }
                    match touch.state {
                        TouchState::Pressed => self.drag_touch = Some(touch.id),
                        TouchState::Released => self.drag_touch = None,
                        TouchState::Moved => {}
                    }
                    let world = touch.world_position(&self.ctx.camera, self.viewport);
                    InputEvent::from_touch(touch.state, world)
                }
                other => *other,
            };
            match event {
                InputEvent::PointerDown { x, y } => {
                    self.ctx.verlet.begin_drag(Vec2::new(x, y), radius);
                }
                InputEvent::PointerMove { x, y } => self.ctx.verlet.drag_to(Vec2::new(x, y)),
                InputEvent::PointerUp { .. } => self.ctx.verlet.end_drag(),
                _ => {}
            }
        }
    }

    fn build_frame(&mut self) {
        let ctx = &mut self.ctx;
        let underlay = ctx
            .map
            .as_ref()
            .map(|map| map.build_visible_instances(&ctx.camera, &ctx.atlases))
            .unwrap_or_default();
        let view = ctx.camera.view_rect();
        build_render_buffer_over(
            underlay,
            &ctx.scene,
            &ctx.atlases,
            Some(&view),
            &mut self.render_buffer,
        );

        #[cfg(feature = "vectors")]
        {
            if self.config.debug_physics {
                ctx.verlet.debug_draw(&mut ctx.vectors);
            }
        }

        {
            let mut render_ctx = RenderContext {
                render_buffer: &mut self.render_buffer,
                camera: &ctx.camera,
                atlases: &ctx.atlases,
                #[cfg(feature = "vectors")]
                vectors: &mut ctx.vectors,
            };
            self.game.render(&mut render_ctx);
        }

        self.lights = ctx.lights.visible_lights(&ctx.camera);
    }

    // ---- Accessors for the host ----

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn context(&self) -> &EngineContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut EngineContext {
        &mut self.ctx
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn render_buffer(&self) -> &RenderBuffer {
        &self.render_buffer
    }

    pub fn instance_count(&self) -> u32 {
        self.render_buffer.instance_count()
    }

    pub fn additive_start(&self) -> u32 {
        self.render_buffer.additive_start
    }

    pub fn lights(&self) -> &[LightInstance] {
        &self.lights
    }

    pub fn light_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.lights)
    }

    #[cfg(feature = "vectors")]
    pub fn vector_floats(&self) -> &[f32] {
        self.ctx.vectors.as_floats()
    }

    pub fn sound_events(&self) -> &[u32] {
        &self.sound_buffer
    }

    pub fn game_event_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.ctx.events)
    }

    pub fn world_width(&self) -> f32 {
        self.config.world_width
    }

    pub fn world_height(&self) -> f32 {
        self.config.world_height
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}
