use glam::Vec2;

use super::layer::{LayerCommon, TmxLayer};

/// A single image drawn at the layer offset, optionally tiled along each axis.
#[derive(Debug, Clone)]
pub struct ImageLayer {
    pub common: LayerCommon,
    /// Image path relative to the map.
    pub image: String,
    pub repeat_x: bool,
    pub repeat_y: bool,
}

impl ImageLayer {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            common: LayerCommon::new(name),
            image: image.into(),
            repeat_x: false,
            repeat_y: false,
        }
    }

    pub fn with_repeat(mut self, repeat_x: bool, repeat_y: bool) -> Self {
        self.repeat_x = repeat_x;
        self.repeat_y = repeat_y;
        self
    }

    /// Top-left corners of every copy of an `image_size` image needed to
    /// cover `view_min..view_max` when the layer origin is at `origin`.
    pub fn placements(&self, origin: Vec2, image_size: Vec2, view_min: Vec2, view_max: Vec2) -> Vec<Vec2> {
        if image_size.x <= 0.0 || image_size.y <= 0.0 {
            return Vec::new();
        }
        let axis = |repeat: bool, origin: f32, size: f32, min: f32, max: f32| -> Vec<f32> {
            if !repeat {
                return vec![origin];
            }
            let first = origin + ((min - origin) / size).floor() * size;
            let mut out = Vec::new();
            let mut p = first;
            while p < max {
                out.push(p);
                p += size;
            }
            out
        };
        let xs = axis(self.repeat_x, origin.x, image_size.x, view_min.x, view_max.x);
        let ys = axis(self.repeat_y, origin.y, image_size.y, view_min.y, view_max.y);
        ys.iter()
            .flat_map(|&y| xs.iter().map(move |&x| Vec2::new(x, y)))
            .collect()
    }
}

impl TmxLayer for ImageLayer {
    fn common(&self) -> &LayerCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut LayerCommon {
        &mut self.common
    }
}
