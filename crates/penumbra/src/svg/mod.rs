//! SVG basic shapes as plain data.
//!
//! Shapes are described with their SVG attribute names and can be drawn
//! through the vector tessellator or turned into Verlet bodies and colliders.

pub mod document;
pub mod paint;
pub mod shapes;

pub use document::{SvgDocument, SvgElement, SvgShape};
pub use paint::{parse_color, SvgPaint};
pub use shapes::{parse_points, SvgCircle, SvgEllipse, SvgLine, SvgPolygon, SvgPolyline, SvgRect};
