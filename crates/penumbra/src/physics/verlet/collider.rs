use glam::Vec2;

use crate::core::rect::Rect;

/// Static world geometry particles are pushed out of.
#[derive(Debug, Clone, PartialEq)]
pub enum Collider {
    Circle { center: Vec2, radius: f32 },
    Rect(Rect),
    /// A line segment, thickened by the colliding particle's radius.
    Segment { a: Vec2, b: Vec2 },
}

impl Collider {
    /// Minimum translation that moves a circle at `point` with `radius` out of
    /// this collider, or `None` when they do not overlap.
    pub fn penetration(&self, point: Vec2, radius: f32) -> Option<Vec2> {
        match self {
            Collider::Circle { center, radius: r } => {
                let delta = point - *center;
                let min_dist = r + radius;
                let dist_sq = delta.length_squared();
                if dist_sq >= min_dist * min_dist {
                    return None;
                }
                let dist = dist_sq.sqrt();
                let normal = if dist > f32::EPSILON { delta / dist } else { Vec2::NEG_Y };
                Some(normal * (min_dist - dist))
            }
            Collider::Rect(rect) => rect_penetration(rect, point, radius),
            Collider::Segment { a, b } => {
                let closest = closest_point_on_segment(*a, *b, point);
                let delta = point - closest;
                let dist_sq = delta.length_squared();
                let min_dist = radius.max(0.5);
                if dist_sq >= min_dist * min_dist {
                    return None;
                }
                let dist = dist_sq.sqrt();
                let normal = if dist > f32::EPSILON {
                    delta / dist
                } else {
                    // Point sits on the segment: push along the segment's left normal.
                    (*b - *a).perp().try_normalize().unwrap_or(Vec2::NEG_Y)
                };
                Some(normal * (min_dist - dist))
            }
        }
    }

    /// Bounding rectangle of the collider.
    pub fn bounds(&self) -> Rect {
        match self {
            Collider::Circle { center, radius } => {
                Rect::new(center.x - radius, center.y - radius, radius * 2.0, radius * 2.0)
            }
            Collider::Rect(rect) => *rect,
            Collider::Segment { a, b } => Rect::from_corners(*a, *b),
        }
    }
}

fn rect_penetration(rect: &Rect, point: Vec2, radius: f32) -> Option<Vec2> {
    let min = rect.min();
    let max = rect.max();
    let clamped = point.clamp(min, max);
    let delta = point - clamped;

    if delta != Vec2::ZERO {
        // Center outside the rect: resolve against the nearest surface point.
        let dist_sq = delta.length_squared();
        if dist_sq >= radius * radius {
            return None;
        }
        let dist = dist_sq.sqrt();
        return Some(delta / dist * (radius - dist));
    }

    // Center inside: push out through the closest face.
    let to_left = point.x - min.x;
    let to_right = max.x - point.x;
    let to_top = point.y - min.y;
    let to_bottom = max.y - point.y;
    let smallest = to_left.min(to_right).min(to_top).min(to_bottom);
    let push = if smallest == to_top {
        Vec2::new(0.0, -(to_top + radius))
    } else if smallest == to_bottom {
        Vec2::new(0.0, to_bottom + radius)
    } else if smallest == to_left {
        Vec2::new(-(to_left + radius), 0.0)
    } else {
        Vec2::new(to_right + radius, 0.0)
    };
    Some(push)
}

pub(crate) fn closest_point_on_segment(a: Vec2, b: Vec2, p: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}
