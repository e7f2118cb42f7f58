use super::layer::{Layer, LayerCommon, TmxLayer};

/// A folder of layers. Its offset, opacity, visibility and parallax apply to
/// every child; see [`LayerState::compose`](super::layer::LayerState::compose).
#[derive(Debug, Clone)]
pub struct GroupLayer {
    pub common: LayerCommon,
    pub layers: Vec<Layer>,
}

impl GroupLayer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            common: LayerCommon::new(name),
            layers: Vec::new(),
        }
    }

    pub fn with_layer(mut self, layer: impl Into<Layer>) -> Self {
        self.layers.push(layer.into());
        self
    }

    pub fn push(&mut self, layer: impl Into<Layer>) {
        self.layers.push(layer.into());
    }
}

impl TmxLayer for GroupLayer {
    fn common(&self) -> &LayerCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut LayerCommon {
        &mut self.common
    }
}
