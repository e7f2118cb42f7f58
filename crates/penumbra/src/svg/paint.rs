use serde::{Deserialize, Serialize};

use crate::core::color::Rgba;
use crate::error::{EngineError, EngineResult};

/// Presentation attributes of a shape, kept as their SVG attribute text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SvgPaint {
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f32,
    pub opacity: f32,
}

impl Default for SvgPaint {
    fn default() -> Self {
        Self {
            fill: "black".into(),
            stroke: "none".into(),
            stroke_width: 1.0,
            opacity: 1.0,
        }
    }
}

impl SvgPaint {
    pub fn fill(color: &str) -> Self {
        Self {
            fill: color.into(),
            ..Self::default()
        }
    }

    pub fn stroke(color: &str, width: f32) -> Self {
        Self {
            fill: "none".into(),
            stroke: color.into(),
            stroke_width: width,
            ..Self::default()
        }
    }

    /// `None` when the shape is not filled.
    pub fn fill_color(&self) -> EngineResult<Option<Rgba>> {
        Ok(parse_color(&self.fill)?.map(|c| self.fade(c)))
    }

    /// `None` when the shape has no outline.
    pub fn stroke_color(&self) -> EngineResult<Option<Rgba>> {
        if self.stroke_width <= 0.0 {
            return Ok(None);
        }
        Ok(parse_color(&self.stroke)?.map(|c| self.fade(c)))
    }

    fn fade(&self, color: Rgba) -> Rgba {
        color.with_alpha(color.a * self.opacity.clamp(0.0, 1.0))
    }
}

/// Parse an SVG paint value: `none`, `#rgb`, `#rrggbb` or a basic color keyword.
pub fn parse_color(value: &str) -> EngineResult<Option<Rgba>> {
    let value = value.trim();
    let invalid = || EngineError::InvalidColor(value.to_string());
    if value.starts_with('#') {
        // SVG has no alpha-first form.
        if value.len() != 4 && value.len() != 7 {
            return Err(invalid());
        }
        return Rgba::from_hex(value).map(Some).ok_or_else(invalid);
    }
    let color = match value.to_ascii_lowercase().as_str() {
        "none" | "transparent" => return Ok(None),
        "black" => Rgba::BLACK,
        "white" => Rgba::WHITE,
        "red" => Rgba::RED,
        "lime" => Rgba::GREEN,
        "green" => Rgba::rgb8(0, 128, 0),
        "blue" => Rgba::BLUE,
        "yellow" => Rgba::YELLOW,
        "gray" | "grey" => Rgba::rgb8(128, 128, 128),
        "orange" => Rgba::rgb8(255, 165, 0),
        "purple" => Rgba::rgb8(128, 0, 128),
        _ => return Err(invalid()),
    };
    Ok(Some(color))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_and_keywords() {
        assert_eq!(parse_color("#f00").unwrap(), Some(Rgba::RED));
        assert_eq!(parse_color(" #0000FF ").unwrap(), Some(Rgba::BLUE));
        assert_eq!(parse_color("White").unwrap(), Some(Rgba::WHITE));
        assert_eq!(parse_color("none").unwrap(), None);
    }

    #[test]
    fn bad_colors_are_errors() {
        for bad in ["#12", "#ff000000", "#ggg", "#+f+f+f", "chartreuse-ish", ""] {
            assert!(
                matches!(parse_color(bad), Err(EngineError::InvalidColor(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn opacity_fades_both_paints() {
        let paint = SvgPaint {
            fill: "red".into(),
            stroke: "blue".into(),
            stroke_width: 2.0,
            opacity: 0.5,
        };
        assert_eq!(paint.fill_color().unwrap().unwrap().a, 0.5);
        assert_eq!(paint.stroke_color().unwrap().unwrap().a, 0.5);
        assert_eq!(SvgPaint::default().stroke_color().unwrap(), None);
        assert_eq!(SvgPaint::stroke("red", 0.0).stroke_color().unwrap(), None);
    }
}
