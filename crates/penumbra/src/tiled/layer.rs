use glam::Vec2;

use super::group::GroupLayer;
use super::image_layer::ImageLayer;
use super::object_group::ObjectGroup;
use super::properties::Properties;
use super::tile_layer::TileLayer;

/// State every Tiled layer carries.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerCommon {
    pub name: String,
    pub offset: Vec2,
    pub opacity: f32,
    pub visible: bool,
    /// 1.0 scrolls with the camera, 0.0 stays fixed on screen.
    pub parallax: Vec2,
    pub properties: Properties,
}

impl LayerCommon {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            offset: Vec2::ZERO,
            opacity: 1.0,
            visible: true,
            parallax: Vec2::ONE,
            properties: Properties::new(),
        }
    }
}

/// The capabilities shared by every layer type.
///
/// Implementors only expose their [`LayerCommon`]; everything else is derived.
pub trait TmxLayer {
    fn common(&self) -> &LayerCommon;
    fn common_mut(&mut self) -> &mut LayerCommon;

    fn name(&self) -> &str {
        &self.common().name
    }

    fn offset_x(&self) -> f32 {
        self.common().offset.x
    }

    fn offset_y(&self) -> f32 {
        self.common().offset.y
    }

    fn offset(&self) -> Vec2 {
        self.common().offset
    }

    fn opacity(&self) -> f32 {
        self.common().opacity
    }

    fn visible(&self) -> bool {
        self.common().visible
    }

    fn parallax_factor_x(&self) -> f32 {
        self.common().parallax.x
    }

    fn parallax_factor_y(&self) -> f32 {
        self.common().parallax.y
    }

    fn properties(&self) -> &Properties {
        &self.common().properties
    }

    fn properties_mut(&mut self) -> &mut Properties {
        &mut self.common_mut().properties
    }

    fn set_visible(&mut self, visible: bool) {
        self.common_mut().visible = visible;
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.common_mut().opacity = opacity.clamp(0.0, 1.0);
    }

    /// Where the layer origin is drawn for a camera centred on `camera_center`.
    fn parallax_offset(&self, camera_center: Vec2) -> Vec2 {
        LayerState::of(self).parallax_offset(camera_center)
    }

    fn is_rendered(&self) -> bool {
        self.visible() && self.opacity() > 0.0
    }
}

/// Layer state after composing every enclosing group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerState {
    pub offset: Vec2,
    pub opacity: f32,
    pub visible: bool,
    pub parallax: Vec2,
}

impl LayerState {
    pub const ROOT: LayerState = LayerState {
        offset: Vec2::ZERO,
        opacity: 1.0,
        visible: true,
        parallax: Vec2::ONE,
    };

    pub fn of<L: TmxLayer + ?Sized>(layer: &L) -> Self {
        Self::ROOT.compose(layer)
    }

    /// Offsets add; opacity and parallax multiply; visibility requires every ancestor.
    pub fn compose<L: TmxLayer + ?Sized>(&self, layer: &L) -> Self {
        let common = layer.common();
        Self {
            offset: self.offset + common.offset,
            opacity: self.opacity * common.opacity,
            visible: self.visible && common.visible,
            parallax: self.parallax * common.parallax,
        }
    }

    pub fn parallax_offset(&self, camera_center: Vec2) -> Vec2 {
        self.offset + camera_center * (Vec2::ONE - self.parallax)
    }

    pub fn is_rendered(&self) -> bool {
        self.visible && self.opacity > 0.0
    }
}

/// Any Tiled layer.
#[derive(Debug, Clone)]
pub enum Layer {
    Tiles(TileLayer),
    Image(ImageLayer),
    Objects(ObjectGroup),
    Group(GroupLayer),
}

impl Layer {
    pub fn as_tiles(&self) -> Option<&TileLayer> {
        match self {
            Layer::Tiles(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_objects(&self) -> Option<&ObjectGroup> {
        match self {
            Layer::Objects(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageLayer> {
        match self {
            Layer::Image(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&GroupLayer> {
        match self {
            Layer::Group(l) => Some(l),
            _ => None,
        }
    }

    /// Depth-first walk over this layer and its descendants, each paired with
    /// its composed state.
    pub fn walk<'a>(&'a self, parent: LayerState, visit: &mut dyn FnMut(LayerState, &'a Layer)) {
        let state = parent.compose(self);
        visit(state, self);
        if let Layer::Group(group) = self {
            for child in &group.layers {
                child.walk(state, visit);
            }
        }
    }
}

impl TmxLayer for Layer {
    fn common(&self) -> &LayerCommon {
        match self {
            Layer::Tiles(l) => l.common(),
            Layer::Image(l) => l.common(),
            Layer::Objects(l) => l.common(),
            Layer::Group(l) => l.common(),
        }
    }

    fn common_mut(&mut self) -> &mut LayerCommon {
        match self {
            Layer::Tiles(l) => l.common_mut(),
            Layer::Image(l) => l.common_mut(),
            Layer::Objects(l) => l.common_mut(),
            Layer::Group(l) => l.common_mut(),
        }
    }
}

impl From<TileLayer> for Layer {
    fn from(l: TileLayer) -> Self {
        Layer::Tiles(l)
    }
}

impl From<ImageLayer> for Layer {
    fn from(l: ImageLayer) -> Self {
        Layer::Image(l)
    }
}

impl From<ObjectGroup> for Layer {
    fn from(l: ObjectGroup) -> Self {
        Layer::Objects(l)
    }
}

impl From<GroupLayer> for Layer {
    fn from(l: GroupLayer) -> Self {
        Layer::Group(l)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiled::properties::PropertyValue;

    fn image(name: &str) -> ImageLayer {
        ImageLayer::new(name, "sky.png")
    }

    #[test]
    fn trait_accessors_read_common_state() {
        let mut layer = image("sky");
        layer.common_mut().offset = Vec2::new(4.0, -2.0);
        layer.common_mut().parallax = Vec2::new(0.5, 0.25);
        layer.set_opacity(1.5);
        layer
            .properties_mut()
            .insert("wind", PropertyValue::Float(2.0));

        let layer: Layer = layer.into();
        assert_eq!(layer.name(), "sky");
        assert_eq!((layer.offset_x(), layer.offset_y()), (4.0, -2.0));
        assert_eq!(layer.opacity(), 1.0);
        assert_eq!(layer.parallax_factor_x(), 0.5);
        assert_eq!(layer.parallax_factor_y(), 0.25);
        assert_eq!(layer.properties().get_float("wind"), Some(2.0));
    }

    #[test]
    fn parallax_offset_follows_factor() {
        let mut layer = image("far");
        let camera = Vec2::new(100.0, 40.0);
        // Factor 1 scrolls with the world.
        assert_eq!(layer.parallax_offset(camera), Vec2::ZERO);

        layer.common_mut().parallax = Vec2::new(0.5, 0.0);
        layer.common_mut().offset = Vec2::new(10.0, 0.0);
        assert_eq!(layer.parallax_offset(camera), Vec2::new(60.0, 40.0));
    }

    #[test]
    fn hidden_or_transparent_layers_are_not_rendered() {
        let mut layer = image("fog");
        assert!(layer.is_rendered());
        layer.set_opacity(0.0);
        assert!(!layer.is_rendered());
        layer.set_opacity(0.5);
        layer.set_visible(false);
        assert!(!layer.is_rendered());
    }

    #[test]
    fn group_state_composes_down_the_tree() {
        let mut inner = image("inner");
        inner.common_mut().offset = Vec2::new(1.0, 1.0);
        inner.common_mut().opacity = 0.5;

        let mut group = GroupLayer::new("group").with_layer(inner);
        group.common_mut().offset = Vec2::new(10.0, 0.0);
        group.common_mut().opacity = 0.5;
        group.common_mut().parallax = Vec2::splat(0.5);

        let root = Layer::Group(group);
        let mut seen = Vec::new();
        root.walk(LayerState::ROOT, &mut |state, layer| {
            seen.push((layer.name().to_string(), state));
        });

        assert_eq!(seen.len(), 2);
        let (name, state) = &seen[1];
        assert_eq!(name, "inner");
        assert_eq!(state.offset, Vec2::new(11.0, 1.0));
        assert_eq!(state.opacity, 0.25);
        assert_eq!(state.parallax, Vec2::splat(0.5));
        assert!(state.is_rendered());
    }
}
