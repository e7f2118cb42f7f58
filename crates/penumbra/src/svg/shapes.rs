use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::rect::Rect;
use crate::error::{EngineError, EngineResult};
use crate::physics::verlet::{Collider, Composite};

/// `<circle r cx cy>`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SvgCircle {
    pub r: f32,
    #[serde(default)]
    pub cx: f32,
    #[serde(default)]
    pub cy: f32,
}

impl SvgCircle {
    pub fn new(r: f32, cx: f32, cy: f32) -> Self {
        Self { r, cx, cy }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.cx, self.cy)
    }

    /// A single-particle soft body with this circle's radius.
    pub fn to_ball(&self) -> Composite {
        Composite::ball(self.center(), self.r)
    }

    pub fn to_collider(&self) -> Collider {
        Collider::Circle {
            center: self.center(),
            radius: self.r,
        }
    }
}

/// `<ellipse rx ry cx cy>`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SvgEllipse {
    pub rx: f32,
    pub ry: f32,
    #[serde(default)]
    pub cx: f32,
    #[serde(default)]
    pub cy: f32,
}

impl SvgEllipse {
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.cx, self.cy)
    }

    /// Circle of the smaller radius.
    pub fn to_collider(&self) -> Collider {
        Collider::Circle {
            center: self.center(),
            radius: self.rx.min(self.ry),
        }
    }
}

/// `<rect x y width height>`; rounded corners are not modelled.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SvgRect {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl SvgRect {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn to_collider(&self) -> Collider {
        Collider::Rect(self.rect())
    }
}

/// `<line x1 y1 x2 y2>`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SvgLine {
    #[serde(default)]
    pub x1: f32,
    #[serde(default)]
    pub y1: f32,
    #[serde(default)]
    pub x2: f32,
    #[serde(default)]
    pub y2: f32,
}

impl SvgLine {
    pub fn to_collider(&self) -> Collider {
        Collider::Segment {
            a: Vec2::new(self.x1, self.y1),
            b: Vec2::new(self.x2, self.y2),
        }
    }
}

/// `<polygon points>`: a closed outline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SvgPolygon {
    pub points: String,
}

impl SvgPolygon {
    pub fn new(points: impl Into<String>) -> Self {
        Self { points: points.into() }
    }

    pub fn points(&self) -> EngineResult<Vec<Vec2>> {
        parse_points(&self.points)
    }

    /// One segment per edge, including the closing edge.
    pub fn to_collider_segments(&self) -> EngineResult<Vec<Collider>> {
        let points = self.points()?;
        let mut segments: Vec<Collider> = points
            .windows(2)
            .map(|w| Collider::Segment { a: w[0], b: w[1] })
            .collect();
        if points.len() > 2 {
            segments.push(Collider::Segment {
                a: points[points.len() - 1],
                b: points[0],
            });
        }
        Ok(segments)
    }
}

/// `<polyline points>`: an open path.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SvgPolyline {
    pub points: String,
}

impl SvgPolyline {
    pub fn new(points: impl Into<String>) -> Self {
        Self { points: points.into() }
    }

    pub fn points(&self) -> EngineResult<Vec<Vec2>> {
        parse_points(&self.points)
    }

    /// A rope through the polyline's vertices.
    pub fn to_rope(&self, stiffness: f32) -> EngineResult<Composite> {
        Ok(Composite::rope(&self.points()?, stiffness))
    }

    pub fn to_collider_segments(&self) -> EngineResult<Vec<Collider>> {
        Ok(self
            .points()?
            .windows(2)
            .map(|w| Collider::Segment { a: w[0], b: w[1] })
            .collect())
    }
}

/// Parse an SVG `points` attribute: numbers separated by commas and/or
/// whitespace, taken in x/y pairs.
pub fn parse_points(raw: &str) -> EngineResult<Vec<Vec2>> {
    let invalid = || EngineError::InvalidPoints(raw.to_string());
    let numbers = raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<f32>().map_err(|_| invalid()))
        .collect::<EngineResult<Vec<f32>>>()?;
    if numbers.len() % 2 != 0 {
        return Err(invalid());
    }
    Ok(numbers
        .chunks_exact(2)
        .map(|pair| Vec2::new(pair[0], pair[1]))
        .collect())
}
