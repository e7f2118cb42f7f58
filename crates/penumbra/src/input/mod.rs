pub mod queue;
pub mod touch;

pub use queue::{InputEvent, InputQueue};
pub use touch::{TouchExt, TouchLocation, TouchState};
