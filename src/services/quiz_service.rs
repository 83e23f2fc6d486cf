use crate::dto::admin_dto::{
    AssignQuizRequest, CreateQuizRequest, QuizSummaryResponse, UpdateQuizRequest,
};
use crate::error::{Error, Result};
use crate::models::packet::Packet;
use crate::models::quiz::{Quiz, QuizAssignment};
use crate::models::template::ReportTemplate;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::SqlitePool;
use uuid::Uuid;

#[derive(Clone)]
pub struct QuizService {
    pool: SqlitePool,
}

impl QuizService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Quiz>> {
        let quizzes = sqlx::query_as::<_, Quiz>("SELECT * FROM quizzes ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(quizzes)
    }

    pub async fn get(&self, id: Uuid) -> Result<Quiz> {
        let quiz = sqlx::query_as::<_, Quiz>("SELECT * FROM quizzes WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(quiz)
    }

    pub async fn create(&self, req: CreateQuizRequest) -> Result<Quiz> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();
        let quiz = sqlx::query_as::<_, Quiz>(
            r#"
            INSERT INTO quizzes (
                id, name, description, report_header, report_footer, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(req.name.trim())
        .bind(req.description)
        .bind(req.report_header)
        .bind(req.report_footer)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        for (position, packet_id) in req.packet_ids.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO quiz_packets (id, quiz_id, packet_id, position, created_at)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(quiz.id)
            .bind(packet_id)
            .bind(position as i32)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(quiz)
    }

    pub async fn update(&self, id: Uuid, req: UpdateQuizRequest) -> Result<Quiz> {
        let current = self.get(id).await?;
        let quiz = sqlx::query_as::<_, Quiz>(
            r#"
            UPDATE quizzes
            SET name = ?, description = ?, report_header = ?, report_footer = ?, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(
            req.name
                .as_deref()
                .map(str::trim)
                .unwrap_or(current.name.as_str()),
        )
        .bind(req.description.or(current.description))
        .bind(req.report_header.or(current.report_header))
        .bind(req.report_footer.or(current.report_footer))
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(quiz)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM quizzes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("quiz not found".into()));
        }
        Ok(())
    }

    /// Packets attached to a quiz in their display order.
    pub async fn packets_for_quiz(&self, quiz_id: Uuid) -> Result<Vec<Packet>> {
        self.get(quiz_id).await?;
        let packets = sqlx::query_as::<_, Packet>(
            r#"
            SELECT p.*
            FROM packets p
            JOIN quiz_packets qp ON qp.packet_id = p.id
            WHERE qp.quiz_id = ?
            ORDER BY qp.position, qp.created_at
            "#,
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(packets)
    }

    /// Replaces a quiz's packet list wholesale, positions following list order.
    pub async fn set_packets(&self, quiz_id: Uuid, packet_ids: &[Uuid]) -> Result<Vec<Packet>> {
        self.get(quiz_id).await?;

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM quiz_packets WHERE quiz_id = ?")
            .bind(quiz_id)
            .execute(&mut *tx)
            .await?;

        let now = Utc::now();
        for (position, packet_id) in packet_ids.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO quiz_packets (id, quiz_id, packet_id, position, created_at)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(quiz_id)
            .bind(packet_id)
            .bind(position as i32)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|err| match err {
                sqlx::Error::Database(ref db) if db.message().contains("FOREIGN KEY") => {
                    Error::BadRequest(format!("unknown packet id {packet_id}"))
                }
                other => other.into(),
            })?;
        }
        tx.commit().await?;

        self.packets_for_quiz(quiz_id).await
    }

    pub async fn list_assignments(&self, quiz_id: Option<Uuid>) -> Result<Vec<QuizAssignment>> {
        let assignments = match quiz_id {
            Some(id) => {
                sqlx::query_as::<_, QuizAssignment>(
                    "SELECT * FROM quiz_assignments WHERE quiz_id = ? ORDER BY created_at DESC",
                )
                .bind(id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, QuizAssignment>(
                    "SELECT * FROM quiz_assignments ORDER BY created_at DESC",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(assignments)
    }

    /// Assigns a quiz to several profiles at once. Re-assigning an already
    /// assigned pair is a no-op rather than an error.
    pub async fn assign(&self, req: AssignQuizRequest) -> Result<Vec<QuizAssignment>> {
        self.get(req.quiz_id).await?;

        let mut tx = self.pool.begin().await?;
        let now = Utc::now();
        for profile_id in &req.profile_ids {
            sqlx::query(
                r#"
                INSERT INTO quiz_assignments (id, quiz_id, profile_id, status, due_date, created_at)
                VALUES (?, ?, ?, 'assigned', ?, ?)
                ON CONFLICT (quiz_id, profile_id) DO NOTHING
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(req.quiz_id)
            .bind(profile_id)
            .bind(req.due_date)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|err| match err {
                sqlx::Error::Database(ref db) if db.message().contains("FOREIGN KEY") => {
                    Error::BadRequest(format!("unknown profile id {profile_id}"))
                }
                other => other.into(),
            })?;
        }
        tx.commit().await?;

        self.list_assignments(Some(req.quiz_id)).await
    }

    pub async fn unassign(&self, quiz_id: Uuid, profile_id: Uuid) -> Result<()> {
        let result =
            sqlx::query("DELETE FROM quiz_assignments WHERE quiz_id = ? AND profile_id = ?")
                .bind(quiz_id)
                .bind(profile_id)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("assignment not found".into()));
        }
        Ok(())
    }

    /// The stored report template, or defaults when none was saved yet.
    pub async fn get_template(&self, quiz_id: Uuid) -> Result<ReportTemplate> {
        self.get(quiz_id).await?;
        let stored: Option<Json<ReportTemplate>> =
            sqlx::query_scalar("SELECT config FROM report_templates WHERE quiz_id = ?")
                .bind(quiz_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(stored.map(|t| t.0).unwrap_or_default())
    }

    pub async fn put_template(
        &self,
        quiz_id: Uuid,
        template: ReportTemplate,
    ) -> Result<ReportTemplate> {
        self.get(quiz_id).await?;
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO report_templates (quiz_id, config, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (quiz_id) DO UPDATE SET config = excluded.config, updated_at = excluded.updated_at
            "#,
        )
        .bind(quiz_id)
        .bind(Json(&template))
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(template)
    }

    pub async fn summary(&self, quiz_id: Uuid) -> Result<QuizSummaryResponse> {
        let quiz = self.get(quiz_id).await?;

        let packet_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM quiz_packets WHERE quiz_id = ?")
                .bind(quiz_id)
                .fetch_one(&self.pool)
                .await?;
        let question_count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM questions q
            JOIN quiz_packets qp ON qp.packet_id = q.packet_id
            WHERE qp.quiz_id = ?
            "#,
        )
        .bind(quiz_id)
        .fetch_one(&self.pool)
        .await?;
        let assignment_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM quiz_assignments WHERE quiz_id = ?")
                .bind(quiz_id)
                .fetch_one(&self.pool)
                .await?;
        let attempt_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM quiz_attempts WHERE quiz_id = ?")
                .bind(quiz_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(QuizSummaryResponse {
            quiz_id: quiz.id,
            name: quiz.name,
            packet_count,
            question_count,
            assignment_count,
            attempt_count,
        })
    }
}
