use crate::models::scale::{default_scale, ScaleBand};
use serde::Serialize;

/// The resolved presentation of a score on a performance scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerformanceLevel {
    pub label: String,
    pub color: String,
    pub artwork: LevelArtwork,
    pub large_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum LevelArtwork {
    /// A `data:image/...` URI supplied by the packet author.
    Image(String),
    /// A short uppercase fallback drawn as text when no image exists.
    Glyph(String),
}

/// Resolves a point total to a level. A packet's custom scale wins when it
/// has a matching band; otherwise the default scale is consulted, and scores
/// outside every band land on the first default band.
pub fn resolve_level(points: i32, custom_scale: Option<&[ScaleBand]>) -> PerformanceLevel {
    if let Some(scale) = custom_scale {
        if let Some(band) = scale.iter().find(|b| b.contains(points)) {
            return level_from_band(band);
        }
    }
    let defaults = default_scale();
    let band = defaults
        .iter()
        .find(|b| b.contains(points))
        .unwrap_or(&defaults[0]);
    level_from_band(band)
}

fn level_from_band(band: &ScaleBand) -> PerformanceLevel {
    let artwork = if band.image.starts_with("data:image/") {
        LevelArtwork::Image(band.image.clone())
    } else {
        LevelArtwork::Glyph(glyph_for(&band.label))
    };
    PerformanceLevel {
        label: band.label.clone(),
        color: band.color.clone(),
        artwork,
        large_text: band.large_text.clone(),
    }
}

/// Two-letter abbreviation of a level label, usable with the builtin PDF
/// fonts where arbitrary unicode is not.
pub fn glyph_for(label: &str) -> String {
    let mut words = label.split_whitespace().filter(|w| !w.is_empty());
    match (words.next(), words.next()) {
        (Some(first), Some(second)) => {
            let mut glyph = String::new();
            glyph.extend(first.chars().next().map(|c| c.to_ascii_uppercase()));
            glyph.extend(second.chars().next().map(|c| c.to_ascii_uppercase()));
            glyph
        }
        (Some(only), None) => only.chars().take(2).collect::<String>().to_ascii_uppercase(),
        _ => "--".to_string(),
    }
}
