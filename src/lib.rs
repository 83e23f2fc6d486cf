pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use axum::routing::get;
use axum::Router;
use sqlx::SqlitePool;

use crate::services::{
    attempt_service::AttemptService, packet_service::PacketService,
    profile_service::ProfileService, question_service::QuestionService, quiz_service::QuizService,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub profile_service: ProfileService,
    pub packet_service: PacketService,
    pub question_service: QuestionService,
    pub quiz_service: QuizService,
    pub attempt_service: AttemptService,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        let profile_service = ProfileService::new(pool.clone());
        let packet_service = PacketService::new(pool.clone());
        let question_service = QuestionService::new(pool.clone());
        let quiz_service = QuizService::new(pool.clone());
        let attempt_service = AttemptService::new(pool.clone());

        Self {
            pool,
            profile_service,
            packet_service,
            question_service,
            quiz_service,
            attempt_service,
        }
    }
}

/// Authoring surface: profiles, packets, questions, quizzes, assignments.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/profiles",
            get(routes::profiles::list_profiles).post(routes::profiles::create_profile),
        )
        .route(
            "/api/profiles/:id",
            get(routes::profiles::get_profile)
                .patch(routes::profiles::update_profile)
                .delete(routes::profiles::delete_profile),
        )
        .route(
            "/api/packets",
            get(routes::packets::list_packets).post(routes::packets::create_packet),
        )
        .route(
            "/api/packets/:id",
            get(routes::packets::get_packet)
                .patch(routes::packets::update_packet)
                .delete(routes::packets::delete_packet),
        )
        .route(
            "/api/packets/:id/questions",
            get(routes::questions::list_questions).post(routes::questions::create_question),
        )
        .route(
            "/api/questions/:id",
            get(routes::questions::get_question)
                .patch(routes::questions::update_question)
                .delete(routes::questions::delete_question),
        )
        .route(
            "/api/quizzes",
            get(routes::quizzes::list_quizzes).post(routes::quizzes::create_quiz),
        )
        .route(
            "/api/quizzes/:id",
            get(routes::quizzes::get_quiz)
                .patch(routes::quizzes::update_quiz)
                .delete(routes::quizzes::delete_quiz),
        )
        .route(
            "/api/quizzes/:id/packets",
            get(routes::quizzes::get_quiz_packets).put(routes::quizzes::set_quiz_packets),
        )
        .route(
            "/api/quizzes/:id/template",
            get(routes::quizzes::get_template).put(routes::quizzes::put_template),
        )
        .route("/api/quizzes/:id/summary", get(routes::quizzes::quiz_summary))
        .route(
            "/api/quiz-assignments",
            get(routes::assignments::list_assignments)
                .post(routes::assignments::assign_quiz)
                .delete(routes::assignments::unassign_quiz),
        )
}

/// Delivery surface: attempt submission, history, and rendered reports.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/quiz-attempts",
            get(routes::attempts::list_attempts).post(routes::attempts::submit_attempt),
        )
        .route("/api/quiz-attempts/:id", get(routes::attempts::get_attempt))
        .route(
            "/api/quiz-attempts/:id/report",
            get(routes::reports::attempt_report),
        )
        .route(
            "/api/users/:user_id/quiz-attempts",
            get(routes::attempts::list_user_attempts),
        )
}
