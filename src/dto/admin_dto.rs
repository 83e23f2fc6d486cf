use crate::models::scale::ScaleBand;
use crate::models::template::ReportTemplate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProfileRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePacketRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    pub scoring_scale: Option<Vec<ScaleBand>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePacketRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    /// `Some(vec![])` clears the custom scale back to the default.
    pub scoring_scale: Option<Vec<ScaleBand>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1))]
    pub question_text: String,
    pub question_type: crate::models::question::QuestionType,
    pub options: Option<Vec<OptionInput>>,
    pub marks: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateQuestionRequest {
    #[validate(length(min = 1))]
    pub question_text: Option<String>,
    pub question_type: Option<crate::models::question::QuestionType>,
    pub options: Option<Vec<OptionInput>>,
    pub marks: Option<i32>,
}

/// Options arrive either as bare strings or as `{text, marks}` objects; the
/// marks value is tolerated as a number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OptionInput {
    Scored {
        text: String,
        #[serde(default)]
        marks: Option<serde_json::Value>,
    },
    Text(String),
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuizRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    pub report_header: Option<String>,
    pub report_footer: Option<String>,
    #[serde(default)]
    pub packet_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateQuizRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub report_header: Option<String>,
    pub report_footer: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetQuizPacketsRequest {
    pub packet_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AssignQuizRequest {
    pub quiz_id: Uuid,
    #[validate(length(min = 1))]
    pub profile_ids: Vec<Uuid>,
    pub due_date: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct UnassignQuizRequest {
    pub quiz_id: Uuid,
    pub profile_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct PutTemplateRequest {
    #[serde(flatten)]
    pub template: ReportTemplate,
}

#[derive(Debug, Serialize)]
pub struct QuizSummaryResponse {
    pub quiz_id: Uuid,
    pub name: String,
    pub packet_count: i64,
    pub question_count: i64,
    pub assignment_count: i64,
    pub attempt_count: i64,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: bool,
}
