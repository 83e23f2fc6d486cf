use crate::dto::admin_dto::{CreateQuestionRequest, OptionInput, UpdateQuestionRequest};
use crate::error::{Error, Result};
use crate::models::question::{Question, QuestionOptions, ScoredOption};
use chrono::Utc;
use sqlx::types::Json;
use sqlx::SqlitePool;
use uuid::Uuid;

#[derive(Clone)]
pub struct QuestionService {
    pool: SqlitePool,
}

impl QuestionService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list_for_packet(&self, packet_id: Uuid) -> Result<Vec<Question>> {
        // 404 for a packet that does not exist, empty list for one that does.
        let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM packets WHERE id = ?")
            .bind(packet_id)
            .fetch_one(&self.pool)
            .await?;
        if exists == 0 {
            return Err(Error::NotFound("packet not found".into()));
        }

        let questions = sqlx::query_as::<_, Question>(
            "SELECT * FROM questions WHERE packet_id = ? ORDER BY created_at, id",
        )
        .bind(packet_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(questions)
    }

    pub async fn get(&self, id: Uuid) -> Result<Question> {
        let question = sqlx::query_as::<_, Question>("SELECT * FROM questions WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(question)
    }

    pub async fn create(&self, packet_id: Uuid, req: CreateQuestionRequest) -> Result<Question> {
        let options = normalize_options(req.options);
        let now = Utc::now();
        let question = sqlx::query_as::<_, Question>(
            r#"
            INSERT INTO questions (
                id, packet_id, question_text, question_type, options, marks,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(packet_id)
        .bind(req.question_text.trim())
        .bind(req.question_type)
        .bind(Json(options))
        .bind(req.marks.unwrap_or(1).max(0))
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(ref db) if db.message().contains("FOREIGN KEY") => {
                Error::NotFound("packet not found".into())
            }
            other => other.into(),
        })?;
        Ok(question)
    }

    pub async fn update(&self, id: Uuid, req: UpdateQuestionRequest) -> Result<Question> {
        let current = self.get(id).await?;

        let options = match req.options {
            Some(opts) => normalize_options(Some(opts)),
            None => current.options.0,
        };

        let question = sqlx::query_as::<_, Question>(
            r#"
            UPDATE questions
            SET question_text = ?, question_type = ?, options = ?, marks = ?, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(
            req.question_text
                .as_deref()
                .map(str::trim)
                .unwrap_or(current.question_text.as_str()),
        )
        .bind(req.question_type.unwrap_or(current.question_type))
        .bind(Json(options))
        .bind(req.marks.map(|m| m.max(0)).unwrap_or(current.marks))
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(question)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM questions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("question not found".into()));
        }
        Ok(())
    }
}

/// Canonicalizes submitted options. Missing or empty input falls back to a
/// plain True/False pair; all-string input stays legacy; any object in the
/// list promotes the whole set to scored options with marks clamped at zero.
fn normalize_options(options: Option<Vec<OptionInput>>) -> QuestionOptions {
    let options = match options {
        Some(opts) if !opts.is_empty() => opts,
        _ => return QuestionOptions::Legacy(vec!["True".to_string(), "False".to_string()]),
    };

    let any_scored = options
        .iter()
        .any(|o| matches!(o, OptionInput::Scored { .. }));
    if !any_scored {
        let texts = options
            .into_iter()
            .map(|o| match o {
                OptionInput::Text(t) => t,
                OptionInput::Scored { text, .. } => text,
            })
            .collect();
        return QuestionOptions::Legacy(texts);
    }

    let scored = options
        .into_iter()
        .map(|o| match o {
            OptionInput::Text(text) => ScoredOption { text, marks: 0 },
            OptionInput::Scored { text, marks } => ScoredOption {
                text,
                marks: parse_marks(marks.as_ref()),
            },
        })
        .collect();
    QuestionOptions::Scored(scored)
}

fn parse_marks(value: Option<&serde_json::Value>) -> i32 {
    let parsed = match value {
        Some(serde_json::Value::Number(n)) => n.as_i64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.unwrap_or(0).clamp(0, i32::MAX as i64) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_options_fall_back_to_true_false() {
        let opts = normalize_options(None);
        match opts {
            QuestionOptions::Legacy(v) => assert_eq!(v, vec!["True", "False"]),
            _ => panic!("expected legacy options"),
        }
    }

    #[test]
    fn plain_strings_stay_legacy() {
        let input = vec![
            OptionInput::Text("Yes".into()),
            OptionInput::Text("No".into()),
        ];
        assert!(matches!(
            normalize_options(Some(input)),
            QuestionOptions::Legacy(_)
        ));
    }

    #[test]
    fn one_object_promotes_the_whole_set() {
        let input = vec![
            OptionInput::Text("Never".into()),
            OptionInput::Scored {
                text: "Always".into(),
                marks: Some(serde_json::json!("3")),
            },
        ];
        match normalize_options(Some(input)) {
            QuestionOptions::Scored(v) => {
                assert_eq!(v[0].marks, 0);
                assert_eq!(v[1].marks, 3);
            }
            _ => panic!("expected scored options"),
        }
    }

    #[test]
    fn bad_marks_values_clamp_to_zero() {
        assert_eq!(parse_marks(Some(&serde_json::json!("abc"))), 0);
        assert_eq!(parse_marks(Some(&serde_json::json!(-4))), 0);
        assert_eq!(parse_marks(Some(&serde_json::json!(2))), 2);
        assert_eq!(parse_marks(None), 0);
    }
}
