//! In-memory Tiled map model.
//!
//! Hosts load `.tmx` / `.tmj` files with whatever reader they like and fill
//! these types in; the engine culls tile layers against the camera, turns
//! solid tiles and collision objects into Verlet colliders, and exposes the
//! common layer capabilities through [`TmxLayer`].

pub mod group;
pub mod image_layer;
pub mod layer;
pub mod map;
pub mod object_group;
pub mod properties;
pub mod tile_layer;
pub mod tileset;

pub use group::GroupLayer;
pub use image_layer::ImageLayer;
pub use layer::{Layer, LayerCommon, LayerState, TmxLayer};
pub use map::TmxMap;
pub use object_group::{MapObject, ObjectGroup, ObjectShape};
pub use properties::{Properties, PropertyValue};
pub use tile_layer::{TileLayer, TileRef};
pub use tileset::Tileset;
