use crate::models::scale::ScaleBand;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Packet {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub scoring_scale: Option<sqlx::types::Json<Vec<ScaleBand>>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Packet {
    /// The packet's custom scale, if it carries a non-empty one.
    pub fn custom_scale(&self) -> Option<&[ScaleBand]> {
        match &self.scoring_scale {
            Some(scale) if !scale.0.is_empty() => Some(&scale.0),
            _ => None,
        }
    }
}
