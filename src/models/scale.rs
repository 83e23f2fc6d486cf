use serde::{Deserialize, Serialize};

/// One band of a performance scale: an inclusive point range mapped to a
/// qualitative label, a display color and optional artwork/text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaleBand {
    pub min: i32,
    pub max: i32,
    pub label: String,
    pub color: String,
    /// Either a `data:image/...` URI or a short textual glyph; empty means
    /// "use the fallback glyph".
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub large_text: String,
}

impl ScaleBand {
    pub fn contains(&self, points: i32) -> bool {
        self.min <= points && points <= self.max
    }
}

/// The hard-coded scale applied when a packet carries no custom one.
pub fn default_scale() -> Vec<ScaleBand> {
    vec![
        ScaleBand {
            min: 0,
            max: 2,
            label: "Needs Improvement".to_string(),
            color: "#dc2626".to_string(),
            image: String::new(),
            large_text: "Keep practicing! You're making progress.".to_string(),
        },
        ScaleBand {
            min: 3,
            max: 5,
            label: "Average".to_string(),
            color: "#d97706".to_string(),
            image: String::new(),
            large_text: "Good effort! You're on the right track.".to_string(),
        },
        ScaleBand {
            min: 6,
            max: 8,
            label: "Good".to_string(),
            color: "#059669".to_string(),
            image: String::new(),
            large_text: "Well done! You're showing strong understanding.".to_string(),
        },
        ScaleBand {
            min: 9,
            max: 15,
            label: "Excellent".to_string(),
            color: "#2563eb".to_string(),
            image: String::new(),
            large_text: "Outstanding! You've mastered this material!".to_string(),
        },
    ]
}
