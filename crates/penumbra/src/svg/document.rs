use serde::{Deserialize, Serialize};

use super::paint::SvgPaint;
use super::shapes::{SvgCircle, SvgEllipse, SvgLine, SvgPolygon, SvgPolyline, SvgRect};
use crate::error::EngineResult;
use crate::physics::verlet::Collider;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SvgShape {
    Circle(SvgCircle),
    Ellipse(SvgEllipse),
    Rect(SvgRect),
    Line(SvgLine),
    Polygon(SvgPolygon),
    Polyline(SvgPolyline),
}

impl SvgShape {
    /// Static colliders matching the shape's geometry.
    pub fn colliders(&self) -> EngineResult<Vec<Collider>> {
        Ok(match self {
            SvgShape::Circle(c) => vec![c.to_collider()],
            SvgShape::Ellipse(e) => vec![e.to_collider()],
            SvgShape::Rect(r) => vec![r.to_collider()],
            SvgShape::Line(l) => vec![l.to_collider()],
            SvgShape::Polygon(p) => p.to_collider_segments()?,
            SvgShape::Polyline(p) => p.to_collider_segments()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SvgElement {
    pub shape: SvgShape,
    #[serde(default)]
    pub paint: SvgPaint,
}

impl SvgElement {
    pub fn new(shape: SvgShape, paint: SvgPaint) -> Self {
        Self { shape, paint }
    }
}

/// A flat list of painted shapes in document order.
///
/// ```json
/// { "width": 320, "height": 240,
///   "shapes": [ { "shape": { "type": "circle", "r": 10, "cx": 40, "cy": 40 },
///                 "paint": { "fill": "#f80" } } ] }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SvgDocument {
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default)]
    pub shapes: Vec<SvgElement>,
}

impl SvgDocument {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            shapes: Vec::new(),
        }
    }

    pub fn from_json(json: &str) -> EngineResult<Self> {
        let doc: SvgDocument = serde_json::from_str(json)?;
        log::debug!("svg document: {} shapes", doc.shapes.len());
        Ok(doc)
    }

    pub fn push(&mut self, shape: SvgShape, paint: SvgPaint) {
        self.shapes.push(SvgElement::new(shape, paint));
    }

    pub fn circles(&self) -> impl Iterator<Item = &SvgCircle> {
        self.shapes.iter().filter_map(|e| match &e.shape {
            SvgShape::Circle(c) => Some(c),
            _ => None,
        })
    }

    pub fn colliders(&self) -> EngineResult<Vec<Collider>> {
        let mut out = Vec::new();
        for element in &self.shapes {
            out.extend(element.shape.colliders()?);
        }
        Ok(out)
    }

    /// Tessellate every shape, fill first then stroke. Stops at the first
    /// malformed color or point list.
    #[cfg(feature = "vectors")]
    pub fn draw(&self, vectors: &mut crate::systems::vector::VectorState) -> EngineResult<()> {
        use glam::Vec2;

        for element in &self.shapes {
            let fill = element.paint.fill_color()?;
            let stroke = element.paint.stroke_color()?;
            let width = element.paint.stroke_width;
            match &element.shape {
                SvgShape::Circle(c) => {
                    if let Some(color) = fill {
                        vectors.fill_circle(c.center(), c.r, color);
                    }
                    if let Some(color) = stroke {
                        vectors.stroke_circle(c.center(), c.r, width, color);
                    }
                }
                SvgShape::Ellipse(e) => {
                    let radii = Vec2::new(e.rx, e.ry);
                    if let Some(color) = fill {
                        vectors.fill_ellipse(e.center(), radii, color);
                    }
                    if let Some(color) = stroke {
                        vectors.stroke_ellipse(e.center(), radii, width, color);
                    }
                }
                SvgShape::Rect(r) => {
                    if let Some(color) = fill {
                        vectors.fill_rect(r.rect(), color);
                    }
                    if let Some(color) = stroke {
                        vectors.stroke_rect(r.rect(), width, color);
                    }
                }
                SvgShape::Line(l) => {
                    // Lines have no interior.
                    if let Some(color) = stroke {
                        let points = [Vec2::new(l.x1, l.y1), Vec2::new(l.x2, l.y2)];
                        vectors.stroke_polyline(&points, width, color);
                    }
                }
                SvgShape::Polygon(p) => {
                    let points = p.points()?;
                    if let Some(color) = fill {
                        vectors.fill_polygon(&points, color);
                    }
                    if let Some(color) = stroke {
                        vectors.stroke_polygon(&points, width, color);
                    }
                }
                SvgShape::Polyline(p) => {
                    let points = p.points()?;
                    if let Some(color) = fill {
                        vectors.fill_polygon(&points, color);
                    }
                    if let Some(color) = stroke {
                        vectors.stroke_polyline(&points, width, color);
                    }
                }
            }
        }
        Ok(())
    }
}
