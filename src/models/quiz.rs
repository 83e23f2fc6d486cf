use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Quiz {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Free-form markup shown at the top/bottom of the rendered report.
    pub report_header: Option<String>,
    pub report_footer: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Ordered membership of a packet in a quiz.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizPacket {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub packet_id: Uuid,
    pub position: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// At most one assignment exists per (quiz, profile) pair.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizAssignment {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub profile_id: Uuid,
    pub status: String,
    pub due_date: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
