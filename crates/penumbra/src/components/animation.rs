//! Playback state for sprite animations.
//!
//! Frame sequences live in the [`SpriteAtlas`]; the component only tracks
//! which animation is playing and where it is.

use crate::assets::atlas::SpriteAtlas;
use crate::components::sprite::AtlasId;

#[derive(Debug, Clone)]
pub struct AnimationComponent {
    /// Atlas that owns the animations.
    pub atlas: AtlasId,
    /// Currently playing animation name.
    pub current: Option<String>,
    pub frame_index: usize,
    /// Time accumulated in the current frame.
    pub frame_timer: f32,
    pub playing: bool,
    /// Playback speed multiplier (1.0 = normal).
    pub speed: f32,
}

impl AnimationComponent {
    pub fn new(atlas: AtlasId) -> Self {
        Self {
            atlas,
            current: None,
            frame_index: 0,
            frame_timer: 0.0,
            playing: false,
            speed: 1.0,
        }
    }

    /// Start `name` already playing.
    pub fn playing(atlas: AtlasId, name: impl Into<String>) -> Self {
        let mut anim = Self::new(atlas);
        anim.current = Some(name.into());
        anim.playing = true;
        anim
    }

    /// Play a named animation from the beginning.
    pub fn play(&mut self, name: &str) {
        self.current = Some(name.to_string());
        self.frame_index = 0;
        self.frame_timer = 0.0;
        self.playing = true;
    }

    /// Play only if it's different from the current animation.
    pub fn play_if_different(&mut self, name: &str) {
        if self.current.as_deref() != Some(name) {
            self.play(name);
        }
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn resume(&mut self) {
        self.playing = true;
    }

    /// Stop and reset to frame 0.
    pub fn stop(&mut self) {
        self.playing = false;
        self.frame_index = 0;
        self.frame_timer = 0.0;
    }

    /// Sprite index of the current frame.
    pub fn current_sprite(&self, atlas: &SpriteAtlas) -> Option<usize> {
        let def = atlas.get_animation(self.current.as_deref()?)?;
        def.frames.get(self.frame_index).copied()
    }

    /// True once a non-looping animation has reached its last frame. An
    /// unknown animation counts as finished.
    pub fn is_finished(&self, atlas: &SpriteAtlas) -> bool {
        match self.current.as_deref().and_then(|n| atlas.get_animation(n)) {
            Some(def) => !def.looping && self.frame_index + 1 >= def.frames.len(),
            None => true,
        }
    }

    /// Advance by `dt` seconds. Returns true if the frame changed.
    pub fn tick(&mut self, dt: f32, atlas: &SpriteAtlas) -> bool {
        if !self.playing {
            return false;
        }
        let Some(def) = self.current.as_deref().and_then(|n| atlas.get_animation(n)) else {
            return false;
        };

        let frame_duration = def.frame_duration();
        self.frame_timer += dt * self.speed;
        let mut frame_changed = false;

        while self.frame_timer >= frame_duration {
            self.frame_timer -= frame_duration;
            self.frame_index += 1;
            frame_changed = true;

            if self.frame_index >= def.frames.len() {
                if def.looping {
                    self.frame_index = 0;
                } else {
                    self.frame_index = def.frames.len() - 1;
                    self.playing = false;
                    break;
                }
            }
        }

        frame_changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::atlas::TextureId;
    use crate::core::rect::Rect;
    use glam::Vec2;

    fn atlas() -> SpriteAtlas {
        let mut atlas = SpriteAtlas::new("hero", TextureId(0), Vec2::new(256.0, 32.0));
        for i in 0..6 {
            let source = Rect::new(i as f32 * 32.0, 0.0, 32.0, 32.0);
            atlas.add_sprite(format!("f{}", i), source, Vec2::splat(0.5)).unwrap();
        }
        atlas.add_animation("walk", vec![0, 1, 2, 3], 10.0, true).unwrap();
        atlas.add_animation("attack", vec![3, 4, 5], 10.0, false).unwrap();
        atlas.add_animation("idle", vec![0, 5], 5.0, true).unwrap();
        atlas
    }

    #[test]
    fn ticks_through_frames_and_loops() {
        let atlas = atlas();
        let mut anim = AnimationComponent::playing(AtlasId(0), "walk");
        assert_eq!(anim.current_sprite(&atlas), Some(0));

        assert!(anim.tick(0.15, &atlas));
        assert_eq!(anim.frame_index, 1);
        assert_eq!(anim.current_sprite(&atlas), Some(1));

        anim.tick(0.3, &atlas);
        assert_eq!(anim.frame_index, 0);
    }

    #[test]
    fn non_looping_stops_on_last_frame() {
        let atlas = atlas();
        let mut anim = AnimationComponent::playing(AtlasId(0), "attack");
        anim.tick(0.35, &atlas);
        assert!(anim.is_finished(&atlas));
        assert!(!anim.playing);
        assert_eq!(anim.current_sprite(&atlas), Some(5));
    }

    #[test]
    fn play_if_different_keeps_progress() {
        let atlas = atlas();
        let mut anim = AnimationComponent::new(AtlasId(0));
        anim.play("idle");
        anim.tick(0.25, &atlas);
        let frame = anim.frame_index;

        anim.play_if_different("idle");
        assert_eq!(anim.frame_index, frame);

        anim.play_if_different("walk");
        assert_eq!(anim.current.as_deref(), Some("walk"));
        assert_eq!(anim.frame_index, 0);
    }

    #[test]
    fn paused_and_unknown_do_not_advance() {
        let atlas = atlas();
        let mut anim = AnimationComponent::playing(AtlasId(0), "walk");
        anim.pause();
        assert!(!anim.tick(1.0, &atlas));
        anim.resume();
        anim.speed = 2.0;
        assert!(anim.tick(0.06, &atlas));

        let mut missing = AnimationComponent::playing(AtlasId(0), "swim");
        assert!(!missing.tick(1.0, &atlas));
        assert!(missing.is_finished(&atlas));
        assert_eq!(missing.current_sprite(&atlas), None);
    }
}
