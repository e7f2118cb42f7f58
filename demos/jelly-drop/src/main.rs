//! Runs Jelly Drop headless for a few seconds and logs what a host would
//! receive each frame.

mod game;

use env_logger::Env;
use game::{JellyDrop, CUSTOM_DROP, KEY_SPACE, WORLD_H, WORLD_W};
use penumbra::input::queue::InputEvent;
use penumbra::persistence::{load, save};
use penumbra::{GameRunner, VerletWorld};

const FRAME_DT: f32 = 1.0 / 60.0;
const FRAMES: u32 = 300;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut runner = GameRunner::new(JellyDrop::new());
    runner.set_viewport(WORLD_W * 2.0, WORLD_H * 2.0);
    runner.init();

    for frame in 0..FRAMES {
        match frame {
            60 => runner.push_input(InputEvent::KeyDown { key_code: KEY_SPACE }),
            120 => runner.push_input(InputEvent::Custom { kind: CUSTOM_DROP, a: 480.0, b: 0.0, c: 0.0 }),
            _ => {}
        }
        runner.tick(FRAME_DT);

        if !runner.game_event_floats().is_empty() {
            log::info!("frame {frame}: game events {:?}", runner.game_event_floats());
        }
        if frame % 60 == 0 {
            log::info!(
                "frame {frame}: {} instances ({} additive), {} lights, {} sounds",
                runner.instance_count(),
                runner.instance_count() - runner.additive_start(),
                runner.lights().len(),
                runner.sound_events().len(),
            );
        }
    }

    log::info!("{} blobs after {FRAMES} frames", runner.game().blob_count());

    let world = &runner.context().verlet;
    match save(world).and_then(|bytes| load::<VerletWorld>(&bytes).map(|w| (bytes.len(), w))) {
        Ok((len, restored)) => log::info!(
            "saved world: {len} bytes, {} composites, {} particles",
            restored.composite_count(),
            restored.particle_count()
        ),
        Err(err) => log::error!("save failed: {err}"),
    }
}
