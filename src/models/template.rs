use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Per-quiz report layout settings. Packets without an entry fall back to
/// `PacketDisplayConfig::default()`, which shows everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportTemplate {
    #[serde(default)]
    pub packet_configs: BTreeMap<Uuid, PacketDisplayConfig>,
}

impl ReportTemplate {
    pub fn config_for(&self, packet_id: &Uuid) -> PacketDisplayConfig {
        self.packet_configs.get(packet_id).cloned().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacketDisplayConfig {
    pub enabled: bool,
    /// Packets render sorted by this, ascending; ties keep quiz order.
    pub order: i32,
    /// Hex overrides for the card fill and border.
    pub background_color: Option<String>,
    pub border_color: Option<String>,
    pub show_header: bool,
    pub show_score_breakdown: bool,
    pub show_scaling_level: bool,
    pub show_scaling_image: bool,
    pub show_scaling_text: bool,
    pub show_all_scale_levels: bool,
    pub show_scale_comparison: bool,
    pub show_recommendations: bool,
    pub image_display_style: ImageDisplayStyle,
    pub text_display_position: TextDisplayPosition,
}

impl Default for PacketDisplayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            order: 0,
            background_color: None,
            border_color: None,
            show_header: true,
            show_score_breakdown: true,
            show_scaling_level: true,
            show_scaling_image: true,
            show_scaling_text: false,
            show_all_scale_levels: false,
            show_scale_comparison: false,
            show_recommendations: true,
            image_display_style: ImageDisplayStyle::Small,
            text_display_position: TextDisplayPosition::Below,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageDisplayStyle {
    Small,
    Medium,
    Large,
    Banner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDisplayPosition {
    Above,
    Below,
    Inline,
    Separate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: PacketDisplayConfig = serde_json::from_str("{}").unwrap();
        assert!(cfg.enabled);
        assert!(cfg.show_header);
        assert!(!cfg.show_scaling_text);
        assert_eq!(cfg.image_display_style, ImageDisplayStyle::Small);
        assert_eq!(cfg.text_display_position, TextDisplayPosition::Below);
    }

    #[test]
    fn partial_config_overrides_only_named_fields() {
        let cfg: PacketDisplayConfig = serde_json::from_str(
            r#"{"enabled": false, "order": 3, "image_display_style": "large"}"#,
        )
        .unwrap();
        assert!(!cfg.enabled);
        assert_eq!(cfg.order, 3);
        assert_eq!(cfg.image_display_style, ImageDisplayStyle::Large);
        assert!(cfg.show_score_breakdown);
    }
}
