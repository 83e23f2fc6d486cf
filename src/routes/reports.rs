use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::services::report_service::ReportService;
use crate::AppState;

#[axum::debug_handler]
pub async fn attempt_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let (quiz, learner, attempt, packets) = state.attempt_service.report_input(id).await?;
    let template = state.quiz_service.get_template(attempt.quiz_id).await?;

    let pdf = ReportService::render(&quiz, &learner, &attempt, &packets, &template)?;
    tracing::info!(attempt_id = %id, bytes = pdf.len(), "report rendered");

    let filename = format!(
        "report-{}-{}.pdf",
        sanitize_filename(&learner.name),
        &id.to_string()[..8]
    );
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        pdf,
    )
        .into_response())
}

fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    cleaned.trim_matches('-').to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames_drop_unsafe_characters() {
        assert_eq!(sanitize_filename("Jane Doe"), "jane-doe");
        assert_eq!(sanitize_filename("a/b\\c"), "a-b-c");
        assert_eq!(sanitize_filename("--x--"), "x");
    }
}
