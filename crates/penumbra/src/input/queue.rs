use glam::Vec2;

use super::touch::{TouchLocation, TouchState};

/// Input event types the engine understands.
/// Pointer coordinates are world space; touches arrive in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A click or primary touch began at world coordinates (x, y).
    PointerDown { x: f32, y: f32 },
    PointerUp { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    KeyDown { key_code: u32 },
    KeyUp { key_code: u32 },
    /// Raw multi-touch sample from the host.
    Touch(TouchLocation),
    /// Host-defined event. `kind` identifies it; `a`, `b`, `c` carry data.
    Custom { kind: u32, a: f32, b: f32, c: f32 },
}

impl InputEvent {
    /// World position of a pointer event.
    pub fn pointer_position(&self) -> Option<Vec2> {
        match *self {
            InputEvent::PointerDown { x, y }
            | InputEvent::PointerUp { x, y }
            | InputEvent::PointerMove { x, y } => Some(Vec2::new(x, y)),
            _ => None,
        }
    }

    /// The pointer event a touch corresponds to, given its world position.
    pub fn from_touch(state: TouchState, world: Vec2) -> Self {
        let (x, y) = (world.x, world.y);
        match state {
            TouchState::Pressed => InputEvent::PointerDown { x, y },
            TouchState::Moved => InputEvent::PointerMove { x, y },
            TouchState::Released => InputEvent::PointerUp { x, y },
        }
    }
}

/// Events pushed by the host between frames, drained by the runner.
#[derive(Debug, Default)]
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Take every pending event, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> {
        self.events.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn touches(&self) -> impl Iterator<Item = &TouchLocation> {
        self.events.iter().filter_map(|e| match e {
            InputEvent::Touch(t) => Some(t),
            _ => None,
        })
    }
}
