use std::str::FromStr;

use assessment_backend::{admin_routes, public_routes, AppState};
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value as JsonValue};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tower::ServiceExt;

async fn setup() -> (SqlitePool, Router) {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("options")
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("pool");
    sqlx::migrate!("./migrations").run(&pool).await.expect("migrations");

    let state = AppState::new(pool.clone());
    let app = Router::new()
        .merge(admin_routes())
        .merge(public_routes())
        .with_state(state);
    (pool, app)
}

async fn post_json(app: &Router, uri: &str, body: JsonValue) -> (StatusCode, JsonValue) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null);
    (status, value)
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, JsonValue) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null);
    (status, value)
}

fn answers(pairs: &[(&str, &str)]) -> JsonValue {
    let mut map = serde_json::Map::new();
    for (question_id, answer) in pairs {
        map.insert((*question_id).to_string(), json!(answer));
    }
    JsonValue::Object(map)
}

/// Two packets, one with scored options and a custom scale, one with
/// legacy True/False questions. Returns (quiz_id, question ids).
async fn seed_quiz(app: &Router) -> (String, Vec<String>) {
    let (_, listening) = post_json(
        app,
        "/api/packets",
        json!({
            "name": "Listening",
            "scoring_scale": [
                { "min": 0, "max": 2, "label": "Developing", "color": "#d97706" },
                { "min": 3, "max": 10, "label": "Strong", "color": "#059669",
                  "large_text": "Strong listening skills." }
            ]
        }),
    )
    .await;
    let (_, basics) = post_json(app, "/api/packets", json!({ "name": "Basics" })).await;
    let listening_id = listening["id"].as_str().unwrap().to_string();
    let basics_id = basics["id"].as_str().unwrap().to_string();

    let (_, q1) = post_json(
        app,
        &format!("/api/packets/{listening_id}/questions"),
        json!({
            "question_text": "How often do you take notes?",
            "question_type": "mcq",
            "options": [
                { "text": "Always", "marks": 3 },
                { "text": "Sometimes", "marks": 1 },
                { "text": "Never", "marks": 0 }
            ]
        }),
    )
    .await;
    let (_, q2) = post_json(
        app,
        &format!("/api/packets/{listening_id}/questions"),
        json!({
            "question_text": "Do you interrupt speakers?",
            "question_type": "mcq",
            "options": [
                { "text": "Rarely", "marks": 2 },
                { "text": "Often", "marks": 0 }
            ]
        }),
    )
    .await;
    let (_, q3) = post_json(
        app,
        &format!("/api/packets/{basics_id}/questions"),
        json!({
            "question_text": "Listening is passive.",
            "question_type": "true_false"
        }),
    )
    .await;

    let (_, quiz) = post_json(
        app,
        "/api/quizzes",
        json!({
            "name": "Communication Assessment",
            "report_header": "<p>Internal &amp; confidential</p>",
            "packet_ids": [listening_id, basics_id]
        }),
    )
    .await;
    let quiz_id = quiz["id"].as_str().unwrap().to_string();

    let ids = vec![
        q1["id"].as_str().unwrap().to_string(),
        q2["id"].as_str().unwrap().to_string(),
        q3["id"].as_str().unwrap().to_string(),
    ];
    (quiz_id, ids)
}

#[tokio::test]
async fn submit_scores_server_side() {
    let (_pool, app) = setup().await;
    let (quiz_id, qids) = seed_quiz(&app).await;

    let (status, attempt) = post_json(
        &app,
        "/api/quiz-attempts",
        json!({
            "quiz_id": quiz_id,
            "user_id": "learner-1",
            "user_name": "Jamie Learner",
            "user_email": "jamie@example.com",
            "answers": answers(&[
                (&qids[0], "always"),
                (&qids[1], "Rarely"),
                (&qids[2], "False"),
            ])
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // 3 + 2 from Listening, 1 flat mark from Basics; max is 3 + 2 + 1.
    assert_eq!(attempt["total_marks"], 6);
    assert_eq!(attempt["max_marks"], 6);
    assert_eq!(attempt["score"], 100);
    assert_eq!(attempt["total_questions"], 3);
    assert_eq!(attempt["status"], "completed");
    assert_eq!(attempt["packet_marks"]["Listening"]["marks"], 5);
    assert_eq!(attempt["packet_marks"]["Listening"]["questions"], 2);
    assert_eq!(attempt["packet_marks"]["Basics"]["marks"], 1);

    let attempt_id = attempt["id"].as_str().unwrap();
    let (status, fetched) = get_json(&app, &format!("/api/quiz-attempts/{attempt_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["total_marks"], 6);

    let (status, history) = get_json(&app, "/api/users/learner-1/quiz-attempts").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unanswered_and_unmatched_answers_earn_nothing() {
    let (_pool, app) = setup().await;
    let (quiz_id, qids) = seed_quiz(&app).await;

    let (status, attempt) = post_json(
        &app,
        "/api/quiz-attempts",
        json!({
            "quiz_id": quiz_id,
            "user_name": "Casey",
            "answers": answers(&[
                (&qids[0], "Sometimes"),
                (&qids[1], "no such option"),
            ])
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(attempt["total_marks"], 1);
    assert_eq!(attempt["max_marks"], 6);
    assert_eq!(attempt["score"], 17);
    // Packets where nothing matched stay out of the breakdown.
    assert!(attempt["packet_marks"]["Basics"].is_null());
}

#[tokio::test]
async fn submit_rejects_unknown_quiz() {
    let (_pool, app) = setup().await;
    let (status, _) = post_json(
        &app,
        "/api/quiz-attempts",
        json!({
            "quiz_id": uuid::Uuid::new_v4(),
            "user_name": "Nobody",
            "answers": {}
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn report_renders_a_pdf() {
    let (_pool, app) = setup().await;
    let (quiz_id, qids) = seed_quiz(&app).await;

    let (_, attempt) = post_json(
        &app,
        "/api/quiz-attempts",
        json!({
            "quiz_id": quiz_id,
            "user_name": "Jamie Learner",
            "answers": answers(&[(&qids[0], "Always"), (&qids[2], "True")])
        }),
    )
    .await;
    let attempt_id = attempt["id"].as_str().unwrap();

    let req = Request::builder()
        .method("GET")
        .uri(format!("/api/quiz-attempts/{attempt_id}/report"))
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()["content-type"].to_str().unwrap(),
        "application/pdf"
    );
    assert!(resp.headers()["content-disposition"]
        .to_str()
        .unwrap()
        .contains("jamie-learner"));

    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    assert!(bytes.len() > 1000);
}

#[tokio::test]
async fn report_respects_template_and_survives_packet_deletion() {
    let (pool, app) = setup().await;
    let (quiz_id, qids) = seed_quiz(&app).await;

    let (_, attempt) = post_json(
        &app,
        "/api/quiz-attempts",
        json!({
            "quiz_id": quiz_id,
            "user_name": "Robin",
            "answers": answers(&[(&qids[0], "Always"), (&qids[2], "False")])
        }),
    )
    .await;
    let attempt_id = attempt["id"].as_str().unwrap().to_string();

    // Hide one packet from the rendered report.
    let (_, packets) = get_json(&app, &format!("/api/quizzes/{quiz_id}/packets")).await;
    let basics_id = packets
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["name"] == "Basics")
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();
    let mut configs = serde_json::Map::new();
    configs.insert(basics_id.clone(), json!({ "enabled": false }));
    let req = Request::builder()
        .method("PUT")
        .uri(format!("/api/quizzes/{quiz_id}/template"))
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "packet_configs": configs }).to_string(),
        ))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let report_uri = format!("/api/quiz-attempts/{attempt_id}/report");
    let req = Request::builder()
        .method("GET")
        .uri(&report_uri)
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Deleting a packet after the fact must not break stored attempts.
    sqlx::query("DELETE FROM packets WHERE id = ?")
        .bind(uuid::Uuid::parse_str(&basics_id).unwrap())
        .execute(&pool)
        .await
        .unwrap();

    let req = Request::builder()
        .method("GET")
        .uri(&report_uri)
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.starts_with(b"%PDF"));

    let (status, stored) = get_json(&app, &format!("/api/quiz-attempts/{attempt_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["packet_marks"]["Listening"]["marks"], 3);
}
