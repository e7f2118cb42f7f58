use glam::Vec2;

use super::layer::{LayerCommon, TmxLayer};
use super::properties::Properties;
use crate::core::rect::Rect;
use crate::physics::verlet::Collider;

/// Geometry of a map object. Points of polygons and polylines are relative
/// to the object position.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectShape {
    Rectangle { width: f32, height: f32 },
    Ellipse { width: f32, height: f32 },
    Point,
    Polygon(Vec<Vec2>),
    Polyline(Vec<Vec2>),
}

#[derive(Debug, Clone)]
pub struct MapObject {
    pub id: u32,
    pub name: String,
    /// The object's class.
    pub kind: String,
    /// Top-left for rectangles and ellipses, origin for everything else.
    pub position: Vec2,
    /// Degrees, clockwise around `position`.
    pub rotation: f32,
    pub visible: bool,
    /// Tile objects reference a tile by global id.
    pub gid: Option<u32>,
    pub shape: ObjectShape,
    pub properties: Properties,
}

impl MapObject {
    pub fn new(id: u32, position: Vec2, shape: ObjectShape) -> Self {
        Self {
            id,
            name: String::new(),
            kind: String::new(),
            position,
            rotation: 0.0,
            visible: true,
            gid: None,
            shape,
            properties: Properties::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    /// Outline in world space (relative to the object group), rotation applied.
    fn outline(&self, local: &[Vec2]) -> Vec<Vec2> {
        let rot = Vec2::from_angle(self.rotation.to_radians());
        local.iter().map(|p| self.position + rot.rotate(*p)).collect()
    }

    /// Static colliders for this object, offset by `origin`.
    pub fn colliders(&self, origin: Vec2) -> Vec<Collider> {
        let mut out = Vec::new();
        match &self.shape {
            ObjectShape::Rectangle { width, height } => {
                if self.rotation == 0.0 {
                    out.push(Collider::Rect(Rect::new(
                        origin.x + self.position.x,
                        origin.y + self.position.y,
                        *width,
                        *height,
                    )));
                } else {
                    let corners = [
                        Vec2::ZERO,
                        Vec2::new(*width, 0.0),
                        Vec2::new(*width, *height),
                        Vec2::new(0.0, *height),
                    ];
                    push_segments(&mut out, &self.outline(&corners), origin, true);
                }
            }
            ObjectShape::Ellipse { width, height } => {
                let half = Vec2::new(*width, *height) * 0.5;
                let rot = Vec2::from_angle(self.rotation.to_radians());
                out.push(Collider::Circle {
                    center: origin + self.position + rot.rotate(half),
                    radius: half.x.min(half.y),
                });
            }
            ObjectShape::Point => {}
            ObjectShape::Polygon(points) => {
                push_segments(&mut out, &self.outline(points), origin, true);
            }
            ObjectShape::Polyline(points) => {
                push_segments(&mut out, &self.outline(points), origin, false);
            }
        }
        out
    }
}

fn push_segments(out: &mut Vec<Collider>, points: &[Vec2], origin: Vec2, closed: bool) {
    for pair in points.windows(2) {
        out.push(Collider::Segment {
            a: origin + pair[0],
            b: origin + pair[1],
        });
    }
    if closed && points.len() > 2 {
        out.push(Collider::Segment {
            a: origin + points[points.len() - 1],
            b: origin + points[0],
        });
    }
}

/// A layer of free-form objects: spawn points, triggers, collision shapes.
#[derive(Debug, Clone)]
pub struct ObjectGroup {
    pub common: LayerCommon,
    pub objects: Vec<MapObject>,
}

impl ObjectGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            common: LayerCommon::new(name),
            objects: Vec::new(),
        }
    }

    pub fn with_object(mut self, object: MapObject) -> Self {
        self.objects.push(object);
        self
    }

    pub fn object(&self, name: &str) -> Option<&MapObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    pub fn objects_of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a MapObject> + 'a {
        self.objects.iter().filter(move |o| o.kind == kind)
    }

    /// Colliders for every visible object, offset by the layer offset.
    pub fn colliders(&self) -> Vec<Collider> {
        let origin = self.offset();
        self.objects
            .iter()
            .filter(|o| o.visible)
            .flat_map(|o| o.colliders(origin))
            .collect()
    }
}

impl TmxLayer for ObjectGroup {
    fn common(&self) -> &LayerCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut LayerCommon {
        &mut self.common
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn near(a: Vec2, b: Vec2) -> bool {
        a.distance(b) < 1e-3
    }

    #[test]
    fn shapes_become_colliders() {
        let mut group = ObjectGroup::new("collision")
            .with_object(MapObject::new(
                1,
                Vec2::new(10.0, 20.0),
                ObjectShape::Rectangle { width: 30.0, height: 5.0 },
            ))
            .with_object(MapObject::new(
                2,
                Vec2::new(0.0, 0.0),
                ObjectShape::Ellipse { width: 40.0, height: 20.0 },
            ))
            .with_object(MapObject::new(3, Vec2::ZERO, ObjectShape::Point).with_name("spawn"))
            .with_object(MapObject::new(
                4,
                Vec2::new(100.0, 0.0),
                ObjectShape::Polygon(vec![Vec2::ZERO, Vec2::new(10.0, 0.0), Vec2::new(0.0, 10.0)]),
            ))
            .with_object(MapObject::new(
                5,
                Vec2::ZERO,
                ObjectShape::Polyline(vec![Vec2::ZERO, Vec2::new(5.0, 5.0), Vec2::new(10.0, 0.0)]),
            ));
        group.common.offset = Vec2::new(1.0, 2.0);

        let colliders = group.colliders();
        // rect + circle + 3 polygon edges + 2 polyline segments
        assert_eq!(colliders.len(), 7);
        assert_eq!(colliders[0], Collider::Rect(Rect::new(11.0, 22.0, 30.0, 5.0)));
        assert_eq!(
            colliders[1],
            Collider::Circle { center: Vec2::new(21.0, 12.0), radius: 10.0 }
        );
        assert_eq!(
            colliders[4],
            Collider::Segment { a: Vec2::new(101.0, 12.0), b: Vec2::new(101.0, 2.0) }
        );
        assert!(group.object("spawn").is_some());
    }

    #[test]
    fn rotated_rectangle_becomes_outline() {
        let obj = MapObject::new(1, Vec2::ZERO, ObjectShape::Rectangle { width: 10.0, height: 4.0 })
            .with_rotation(90.0);
        let colliders = obj.colliders(Vec2::ZERO);
        assert_eq!(colliders.len(), 4);
        let Collider::Segment { a, b } = colliders[0] else {
            panic!("expected a segment");
        };
        assert!(near(a, Vec2::ZERO));
        // Clockwise quarter turn in a Y-down world sends +x to +y.
        assert!(near(b, Vec2::new(0.0, 10.0)));
    }

    #[test]
    fn hidden_objects_and_kinds() {
        let mut hidden = MapObject::new(1, Vec2::ZERO, ObjectShape::Rectangle { width: 1.0, height: 1.0 })
            .with_kind("trigger");
        hidden.visible = false;
        let group = ObjectGroup::new("g")
            .with_object(hidden)
            .with_object(MapObject::new(2, Vec2::ZERO, ObjectShape::Point).with_kind("trigger"));
        assert!(group.colliders().is_empty());
        assert_eq!(group.objects_of_kind("trigger").count(), 2);
    }
}
