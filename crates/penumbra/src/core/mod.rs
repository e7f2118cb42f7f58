pub mod color;
pub mod rect;
pub mod scene;
pub mod time;
