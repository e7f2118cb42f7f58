//! Lyon-based vector shape tessellation.
//!
//! SVG shapes and Verlet debug outlines are tessellated on the CPU into a flat
//! triangle-list buffer (`x, y, r, g, b, a` per vertex) that the host uploads
//! as-is.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use lyon::math::{point, vector, Angle};
use lyon::path::{Path, Winding};
use lyon::tessellation::{
    BuffersBuilder, FillOptions, FillTessellator, FillVertex, FillVertexConstructor,
    StrokeOptions, StrokeTessellator, StrokeVertex, StrokeVertexConstructor, VertexBuffers,
};

use crate::core::color::Rgba;
use crate::core::rect::Rect;

/// Per-vertex data, 6 floats = 24 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct VectorVertex {
    pub x: f32,
    pub y: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl VectorVertex {
    pub const FLOATS: usize = 6;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;

    fn at(position: lyon::math::Point, color: Rgba) -> Self {
        Self {
            x: position.x,
            y: position.y,
            r: color.r,
            g: color.g,
            b: color.b,
            a: color.a,
        }
    }
}

/// Paints every generated vertex with one color, for fills and strokes alike.
struct SolidColor(Rgba);

impl FillVertexConstructor<VectorVertex> for SolidColor {
    fn new_vertex(&mut self, vertex: FillVertex) -> VectorVertex {
        VectorVertex::at(vertex.position(), self.0)
    }
}

impl StrokeVertexConstructor<VectorVertex> for SolidColor {
    fn new_vertex(&mut self, vertex: StrokeVertex) -> VectorVertex {
        VectorVertex::at(vertex.position(), self.0)
    }
}

fn polyline_path(points: &[Vec2], closed: bool) -> Path {
    let mut builder = Path::builder();
    builder.begin(point(points[0].x, points[0].y));
    for p in &points[1..] {
        builder.line_to(point(p.x, p.y));
    }
    builder.end(closed);
    builder.build()
}

/// Tessellators plus the per-frame output buffer.
pub struct VectorState {
    fill_tess: FillTessellator,
    stroke_tess: StrokeTessellator,
    geometry: VertexBuffers<VectorVertex, u32>,
    vertices: Vec<VectorVertex>,
    /// Maximum distance between a curve and its flattened approximation.
    pub tolerance: f32,
}

impl VectorState {
    pub fn new() -> Self {
        Self {
            fill_tess: FillTessellator::new(),
            stroke_tess: StrokeTessellator::new(),
            geometry: VertexBuffers::new(),
            vertices: Vec::with_capacity(4096),
            tolerance: 0.5,
        }
    }

    /// Drop last frame's vertices.
    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn vertices(&self) -> &[VectorVertex] {
        &self.vertices
    }

    /// The vertex buffer viewed as raw floats.
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// De-index the tessellator output into a plain triangle list.
    fn flush_geometry(&mut self) {
        let VertexBuffers { vertices, indices } = &mut self.geometry;
        self.vertices
            .extend(indices.iter().map(|&i| vertices[i as usize]));
        vertices.clear();
        indices.clear();
    }

    pub fn fill_path(&mut self, path: &Path, color: Rgba) {
        let result = self.fill_tess.tessellate_path(
            path,
            &FillOptions::tolerance(self.tolerance),
            &mut BuffersBuilder::new(&mut self.geometry, SolidColor(color)),
        );
        match result {
            Ok(()) => self.flush_geometry(),
            Err(e) => {
                log::warn!("fill tessellation failed: {:?}", e);
                self.geometry.vertices.clear();
                self.geometry.indices.clear();
            }
        }
    }

    pub fn stroke_path(&mut self, path: &Path, width: f32, color: Rgba) {
        if width <= 0.0 {
            return;
        }
        let result = self.stroke_tess.tessellate_path(
            path,
            &StrokeOptions::tolerance(self.tolerance).with_line_width(width),
            &mut BuffersBuilder::new(&mut self.geometry, SolidColor(color)),
        );
        match result {
            Ok(()) => self.flush_geometry(),
            Err(e) => {
                log::warn!("stroke tessellation failed: {:?}", e);
                self.geometry.vertices.clear();
                self.geometry.indices.clear();
            }
        }
    }

    /// Fill a closed polygon; concave shapes are fine.
    pub fn fill_polygon(&mut self, points: &[Vec2], color: Rgba) {
        if points.len() < 3 {
            return;
        }
        let path = polyline_path(points, true);
        self.fill_path(&path, color);
    }

    pub fn stroke_polygon(&mut self, points: &[Vec2], width: f32, color: Rgba) {
        if points.len() < 3 {
            return;
        }
        let path = polyline_path(points, true);
        self.stroke_path(&path, width, color);
    }

    /// Stroke an open polyline.
    pub fn stroke_polyline(&mut self, points: &[Vec2], width: f32, color: Rgba) {
        if points.len() < 2 {
            return;
        }
        let path = polyline_path(points, false);
        self.stroke_path(&path, width, color);
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        self.fill_polygon(&rect_corners(&rect), color);
    }

    pub fn stroke_rect(&mut self, rect: Rect, width: f32, color: Rgba) {
        self.stroke_polygon(&rect_corners(&rect), width, color);
    }

    pub fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        if radius <= 0.0 {
            return;
        }
        self.fill_ellipse(center, Vec2::splat(radius), color);
    }

    pub fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Rgba) {
        if radius <= 0.0 {
            return;
        }
        self.stroke_ellipse(center, Vec2::splat(radius), width, color);
    }

    pub fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, color: Rgba) {
        if let Some(path) = ellipse_path(center, radii) {
            self.fill_path(&path, color);
        }
    }

    pub fn stroke_ellipse(&mut self, center: Vec2, radii: Vec2, width: f32, color: Rgba) {
        if let Some(path) = ellipse_path(center, radii) {
            self.stroke_path(&path, width, color);
        }
    }
}

impl Default for VectorState {
    fn default() -> Self {
        Self::new()
    }
}

fn rect_corners(rect: &Rect) -> [Vec2; 4] {
    let (min, max) = (rect.min(), rect.max());
    [min, Vec2::new(max.x, min.y), max, Vec2::new(min.x, max.y)]
}

fn ellipse_path(center: Vec2, radii: Vec2) -> Option<Path> {
    if radii.x <= 0.0 || radii.y <= 0.0 {
        return None;
    }
    let mut builder = Path::builder();
    builder.add_ellipse(
        point(center.x, center.y),
        vector(radii.x, radii.y),
        Angle::radians(0.0),
        Winding::Positive,
    );
    Some(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layout() {
        assert_eq!(std::mem::size_of::<VectorVertex>(), VectorVertex::STRIDE_BYTES);
    }

    #[test]
    fn triangle_and_rect_vertex_counts() {
        let mut state = VectorState::new();
        state.fill_polygon(
            &[Vec2::ZERO, Vec2::new(100.0, 0.0), Vec2::new(50.0, 100.0)],
            Rgba::RED,
        );
        assert_eq!(state.vertex_count(), 3);

        state.clear();
        state.fill_rect(Rect::new(0.0, 0.0, 100.0, 50.0), Rgba::BLUE);
        assert_eq!(state.vertex_count(), 6);
        assert_eq!(state.as_floats().len(), 6 * VectorVertex::FLOATS);
        assert_eq!(state.vertices()[0].b, 1.0);
    }

    #[test]
    fn degenerate_shapes_produce_nothing() {
        let mut state = VectorState::new();
        state.fill_polygon(&[Vec2::ZERO, Vec2::ONE], Rgba::RED);
        state.stroke_polyline(&[Vec2::ZERO], 2.0, Rgba::RED);
        state.fill_circle(Vec2::ZERO, 0.0, Rgba::RED);
        state.stroke_circle(Vec2::ZERO, 5.0, 0.0, Rgba::RED);
        assert_eq!(state.vertex_count(), 0);
    }

    #[test]
    fn circles_and_strokes_tessellate() {
        let mut state = VectorState::new();
        state.fill_circle(Vec2::new(50.0, 50.0), 25.0, Rgba::GREEN);
        let filled = state.vertex_count();
        assert!(filled > 0);
        state.stroke_polyline(&[Vec2::ZERO, Vec2::new(100.0, 100.0)], 4.0, Rgba::WHITE);
        assert!(state.vertex_count() > filled);
    }
}
