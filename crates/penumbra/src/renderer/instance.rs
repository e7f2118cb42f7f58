use bytemuck::{Pod, Zeroable};

/// Per-instance sprite data handed to the host renderer.
/// 16 floats = 64 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct RenderInstance {
    pub x: f32,
    pub y: f32,
    /// Radians.
    pub rotation: f32,
    /// World-space size; negative values flip the sprite on that axis.
    pub scale_x: f32,
    pub scale_y: f32,
    /// Normalized source rectangle in the atlas texture.
    pub u: f32,
    pub v: f32,
    pub uw: f32,
    pub vh: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    /// Opacity (0.0 = invisible, 1.0 = opaque, >1.0 for HDR).
    pub alpha: f32,
    /// Host texture id, as a float.
    pub texture: f32,
    /// Normalized pivot.
    pub origin_x: f32,
    pub origin_y: f32,
}

impl RenderInstance {
    pub const FLOATS: usize = 16;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;
}

/// Sprite instances for one frame. Alpha-blended instances come first,
/// additive ones start at `additive_start`.
pub struct RenderBuffer {
    pub instances: Vec<RenderInstance>,
    pub additive_start: u32,
    capacity: usize,
}

impl RenderBuffer {
    pub fn new() -> Self {
        Self::with_capacity(512)
    }

    /// A buffer that never holds more than `capacity` instances.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            instances: Vec::with_capacity(capacity),
            additive_start: 0,
            capacity,
        }
    }

    pub fn clear(&mut self) {
        self.instances.clear();
        self.additive_start = 0;
    }

    /// Returns false when the buffer is full and the instance was dropped.
    pub fn push(&mut self, instance: RenderInstance) -> bool {
        if self.instances.len() >= self.capacity {
            return false;
        }
        self.instances.push(instance);
        true
    }

    pub fn set_additive_start(&mut self, start: u32) {
        self.additive_start = start;
    }

    pub fn instance_count(&self) -> u32 {
        self.instances.len() as u32
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn alpha_instances(&self) -> &[RenderInstance] {
        &self.instances[..self.additive_start as usize]
    }

    pub fn additive_instances(&self) -> &[RenderInstance] {
        &self.instances[self.additive_start as usize..]
    }

    /// The instance data viewed as raw floats.
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.instances)
    }
}

impl Default for RenderBuffer {
    fn default() -> Self {
        Self::new()
    }
}
