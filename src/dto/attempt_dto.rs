use std::collections::BTreeMap;

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// A learner's finished answer sheet. Scoring happens server-side; clients
/// never send totals.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAttemptRequest {
    pub quiz_id: Uuid,
    pub profile_id: Option<Uuid>,
    pub user_id: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub user_name: String,
    #[validate(email)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub answers: BTreeMap<Uuid, String>,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListAttemptsQuery {
    pub quiz_id: Option<Uuid>,
    pub profile_id: Option<Uuid>,
    pub user_id: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
