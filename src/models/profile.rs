use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An audience segment quizzes can be assigned to (students, executives...).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
