use crate::dto::attempt_dto::{ListAttemptsQuery, SubmitAttemptRequest};
use crate::error::{Error, Result};
use crate::models::packet::Packet;
use crate::models::question::Question;
use crate::models::quiz::Quiz;
use crate::models::quiz_attempt::{PacketScore, QuizAttempt};
use crate::services::report_service::{ReportLearner, ReportPacket};
use crate::services::scoring_service::{score_attempt, ScoredQuestion};
use chrono::Utc;
use sqlx::types::Json;
use sqlx::SqlitePool;
use uuid::Uuid;

#[derive(Clone)]
pub struct AttemptService {
    pool: SqlitePool,
}

impl AttemptService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Scores and stores a finished answer sheet in one step. The totals are
    /// computed here; whatever the client believes its score to be is ignored.
    pub async fn submit(&self, req: SubmitAttemptRequest) -> Result<QuizAttempt> {
        let quiz = sqlx::query_as::<_, Quiz>("SELECT * FROM quizzes WHERE id = ?")
            .bind(req.quiz_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::BadRequest("unknown quiz id".into()))?;

        let questions = self.question_snapshots(quiz.id).await?;
        let summary = score_attempt(&questions, &req.answers);

        let now = Utc::now();
        let attempt = sqlx::query_as::<_, QuizAttempt>(
            r#"
            INSERT INTO quiz_attempts (
                id, quiz_id, profile_id, user_id, user_name, user_email,
                answers, score, total_questions, total_marks, max_marks,
                packet_marks, status, started_at, completed_at, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'completed', ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(quiz.id)
        .bind(req.profile_id)
        .bind(req.user_id)
        .bind(req.user_name.trim())
        .bind(req.user_email)
        .bind(Json(&req.answers))
        .bind(summary.percentage)
        .bind(summary.total_questions)
        .bind(summary.total_marks)
        .bind(summary.max_marks)
        .bind(Json(&summary.packet_marks))
        .bind(req.started_at.unwrap_or(now))
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(attempt)
    }

    pub async fn get(&self, id: Uuid) -> Result<QuizAttempt> {
        let attempt = sqlx::query_as::<_, QuizAttempt>("SELECT * FROM quiz_attempts WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(attempt)
    }

    pub async fn list(&self, query: ListAttemptsQuery) -> Result<Vec<QuizAttempt>> {
        let limit = query.limit.unwrap_or(100).clamp(1, 500);
        let offset = query.offset.unwrap_or(0).max(0);

        let mut sql = String::from("SELECT * FROM quiz_attempts WHERE 1 = 1");
        if query.quiz_id.is_some() {
            sql.push_str(" AND quiz_id = ?");
        }
        if query.profile_id.is_some() {
            sql.push_str(" AND profile_id = ?");
        }
        if query.user_id.is_some() {
            sql.push_str(" AND user_id = ?");
        }
        sql.push_str(" ORDER BY created_at DESC LIMIT ? OFFSET ?");

        let mut q = sqlx::query_as::<_, QuizAttempt>(&sql);
        if let Some(quiz_id) = query.quiz_id {
            q = q.bind(quiz_id);
        }
        if let Some(profile_id) = query.profile_id {
            q = q.bind(profile_id);
        }
        if let Some(user_id) = query.user_id {
            q = q.bind(user_id);
        }
        let attempts = q.bind(limit).bind(offset).fetch_all(&self.pool).await?;
        Ok(attempts)
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<QuizAttempt>> {
        let attempts = sqlx::query_as::<_, QuizAttempt>(
            "SELECT * FROM quiz_attempts WHERE user_id = ? ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(attempts)
    }

    /// Gathers everything the renderer needs for one attempt. Packets deleted
    /// since the attempt still appear with zeroes because the attempt keeps
    /// only packet names.
    pub async fn report_input(
        &self,
        attempt_id: Uuid,
    ) -> Result<(Quiz, ReportLearner, QuizAttempt, Vec<ReportPacket>)> {
        let attempt = self.get(attempt_id).await?;
        let quiz = sqlx::query_as::<_, Quiz>("SELECT * FROM quizzes WHERE id = ?")
            .bind(attempt.quiz_id)
            .fetch_one(&self.pool)
            .await?;

        let packets = sqlx::query_as::<_, Packet>(
            r#"
            SELECT p.*
            FROM packets p
            JOIN quiz_packets qp ON qp.packet_id = p.id
            WHERE qp.quiz_id = ?
            ORDER BY qp.position, qp.created_at
            "#,
        )
        .bind(attempt.quiz_id)
        .fetch_all(&self.pool)
        .await?;

        let mut report_packets = Vec::with_capacity(packets.len());
        for packet in packets {
            let question_count: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM questions WHERE packet_id = ?")
                    .bind(packet.id)
                    .fetch_one(&self.pool)
                    .await?;
            let questions = sqlx::query_as::<_, Question>(
                "SELECT * FROM questions WHERE packet_id = ?",
            )
            .bind(packet.id)
            .fetch_all(&self.pool)
            .await?;
            let max_marks: i32 = questions
                .iter()
                .map(|q| q.options.0.max_marks(q.marks))
                .sum();

            let score = attempt
                .packet_marks
                .0
                .get(&packet.name)
                .copied()
                .unwrap_or(PacketScore::default());

            report_packets.push(ReportPacket {
                id: packet.id,
                name: packet.name.clone(),
                scale: packet.custom_scale().map(|s| s.to_vec()),
                marks: score.marks,
                questions_answered: score.questions,
                question_count: question_count as i32,
                max_marks,
            });
        }

        let learner = ReportLearner {
            name: attempt.user_name.clone(),
            email: attempt.user_email.clone(),
            completed_at: attempt.completed_at,
        };

        Ok((quiz, learner, attempt, report_packets))
    }

    async fn question_snapshots(&self, quiz_id: Uuid) -> Result<Vec<ScoredQuestion>> {
        let rows = sqlx::query_as::<_, SnapshotRow>(
            r#"
            SELECT q.id, p.name AS packet_name, q.options, q.marks
            FROM questions q
            JOIN packets p ON p.id = q.packet_id
            JOIN quiz_packets qp ON qp.packet_id = p.id
            WHERE qp.quiz_id = ?
            ORDER BY qp.position, q.created_at
            "#,
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ScoredQuestion {
                id: row.id,
                packet_name: row.packet_name,
                options: row.options.0,
                marks: row.marks,
            })
            .collect())
    }
}

#[derive(sqlx::FromRow)]
struct SnapshotRow {
    id: Uuid,
    packet_name: String,
    options: Json<crate::models::question::QuestionOptions>,
    marks: i32,
}
