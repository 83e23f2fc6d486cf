use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;
use uuid::Uuid;

/// One learner's submission against a quiz. Totals are computed by the
/// scoring engine at submission time and never recomputed afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizAttempt {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub profile_id: Option<Uuid>,
    pub user_id: Option<String>,
    pub user_name: String,
    pub user_email: Option<String>,
    /// `{question_id: selected_option_text}` as submitted.
    pub answers: sqlx::types::Json<BTreeMap<Uuid, String>>,
    /// Percentage of the maximum achievable points, kept for compatibility.
    pub score: i32,
    pub total_questions: i32,
    pub total_marks: i32,
    pub max_marks: i32,
    /// Points earned per packet name as it was at scoring time.
    pub packet_marks: sqlx::types::Json<BTreeMap<String, PacketScore>>,
    pub status: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketScore {
    pub marks: i32,
    pub questions: i32,
}
