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

async fn request(app: &Router, method: &str, uri: &str, body: Option<JsonValue>) -> (StatusCode, JsonValue) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null)
    };
    (status, value)
}

#[tokio::test]
async fn profile_crud_flow() {
    let (_pool, app) = setup().await;

    let (status, created) = request(
        &app,
        "POST",
        "/api/profiles",
        Some(json!({ "name": "Students", "category": "education" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, listed) = request(&app, "GET", "/api/profiles", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, updated) = request(
        &app,
        "PATCH",
        &format!("/api/profiles/{id}"),
        Some(json!({ "name": "Graduate Students" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Graduate Students");
    assert_eq!(updated["category"], "education");

    let (status, _) = request(&app, "DELETE", &format!("/api/profiles/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = request(&app, "GET", &format!("/api/profiles/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn profile_validation_rejects_empty_name() {
    let (_pool, app) = setup().await;
    let (status, _) = request(
        &app,
        "POST",
        "/api/profiles",
        Some(json!({ "name": "", "category": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn packet_and_question_flow() {
    let (_pool, app) = setup().await;

    let (status, packet) = request(
        &app,
        "POST",
        "/api/packets",
        Some(json!({
            "name": "Listening",
            "description": "Active listening skills",
            "scoring_scale": [
                { "min": 0, "max": 4, "label": "Developing", "color": "#d97706" },
                { "min": 5, "max": 10, "label": "Strong", "color": "#059669" }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let packet_id = packet["id"].as_str().unwrap().to_string();

    // Scored options, with marks arriving as both numbers and strings.
    let (status, question) = request(
        &app,
        "POST",
        &format!("/api/packets/{packet_id}/questions"),
        Some(json!({
            "question_text": "How often do you paraphrase what you heard?",
            "question_type": "mcq",
            "options": [
                { "text": "Always", "marks": 3 },
                { "text": "Sometimes", "marks": "1" },
                { "text": "Never" }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(question["options"][0]["marks"], 3);
    assert_eq!(question["options"][1]["marks"], 1);
    assert_eq!(question["options"][2]["marks"], 0);
    let question_id = question["id"].as_str().unwrap().to_string();

    // No options at all falls back to a plain True/False pair.
    let (status, tf) = request(
        &app,
        "POST",
        &format!("/api/packets/{packet_id}/questions"),
        Some(json!({
            "question_text": "Listening is a skill.",
            "question_type": "true_false"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(tf["options"], json!(["True", "False"]));
    assert_eq!(tf["marks"], 1);

    let (status, questions) = request(
        &app,
        "GET",
        &format!("/api/packets/{packet_id}/questions"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(questions.as_array().unwrap().len(), 2);

    let (status, updated) = request(
        &app,
        "PATCH",
        &format!("/api/questions/{question_id}"),
        Some(json!({ "marks": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["marks"], 2);

    let (status, _) = request(&app, "DELETE", &format!("/api/questions/{question_id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    // Questions for an unknown packet 404 rather than returning empty.
    let (status, _) = request(
        &app,
        "GET",
        &format!("/api/packets/{}/questions", uuid::Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn packet_rejects_inverted_scale_bands() {
    let (_pool, app) = setup().await;
    let (status, _) = request(
        &app,
        "POST",
        "/api/packets",
        Some(json!({
            "name": "Broken",
            "scoring_scale": [{ "min": 9, "max": 2, "label": "Bad", "color": "#000" }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn quiz_packets_and_template_flow() {
    let (_pool, app) = setup().await;

    let mut packet_ids = Vec::new();
    for name in ["Alpha", "Beta", "Gamma"] {
        let (_, packet) =
            request(&app, "POST", "/api/packets", Some(json!({ "name": name }))).await;
        packet_ids.push(packet["id"].as_str().unwrap().to_string());
    }

    let (status, quiz) = request(
        &app,
        "POST",
        "/api/quizzes",
        Some(json!({
            "name": "Onboarding Quiz",
            "packet_ids": [packet_ids[0].clone(), packet_ids[1].clone()]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let quiz_id = quiz["id"].as_str().unwrap().to_string();

    let (status, packets) =
        request(&app, "GET", &format!("/api/quizzes/{quiz_id}/packets"), None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = packets
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Alpha", "Beta"]);

    // Wholesale replacement, new order wins.
    let (status, packets) = request(
        &app,
        "PUT",
        &format!("/api/quizzes/{quiz_id}/packets"),
        Some(json!({ "packet_ids": [packet_ids[2].clone(), packet_ids[0].clone()] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = packets
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Gamma", "Alpha"]);

    // The template starts empty and round-trips a saved config.
    let (status, template) =
        request(&app, "GET", &format!("/api/quizzes/{quiz_id}/template"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(template["packet_configs"].as_object().unwrap().is_empty());

    let mut configs = serde_json::Map::new();
    configs.insert(packet_ids[0].clone(), json!({ "enabled": false }));
    configs.insert(
        packet_ids[2].clone(),
        json!({ "order": 5, "show_scaling_text": true }),
    );
    let (status, saved) = request(
        &app,
        "PUT",
        &format!("/api/quizzes/{quiz_id}/template"),
        Some(json!({ "packet_configs": configs })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["packet_configs"][&packet_ids[0]]["enabled"], false);

    let (_, reloaded) =
        request(&app, "GET", &format!("/api/quizzes/{quiz_id}/template"), None).await;
    assert_eq!(reloaded["packet_configs"][&packet_ids[2]]["order"], 5);
    assert_eq!(
        reloaded["packet_configs"][&packet_ids[2]]["show_scaling_text"],
        true
    );

    let (status, summary) =
        request(&app, "GET", &format!("/api/quizzes/{quiz_id}/summary"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["packet_count"], 2);
    assert_eq!(summary["attempt_count"], 0);
}

#[tokio::test]
async fn assignment_flow_is_idempotent() {
    let (_pool, app) = setup().await;

    let (_, quiz) = request(&app, "POST", "/api/quizzes", Some(json!({ "name": "Q" }))).await;
    let quiz_id = quiz["id"].as_str().unwrap().to_string();
    let (_, p1) = request(
        &app,
        "POST",
        "/api/profiles",
        Some(json!({ "name": "A", "category": "c" })),
    )
    .await;
    let (_, p2) = request(
        &app,
        "POST",
        "/api/profiles",
        Some(json!({ "name": "B", "category": "c" })),
    )
    .await;
    let p1_id = p1["id"].as_str().unwrap().to_string();
    let p2_id = p2["id"].as_str().unwrap().to_string();

    let (status, assignments) = request(
        &app,
        "POST",
        "/api/quiz-assignments",
        Some(json!({ "quiz_id": quiz_id.clone(), "profile_ids": [p1_id.clone(), p2_id.clone()] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(assignments.as_array().unwrap().len(), 2);

    // Assigning the same pair again does not duplicate or fail.
    let (status, assignments) = request(
        &app,
        "POST",
        "/api/quiz-assignments",
        Some(json!({ "quiz_id": quiz_id.clone(), "profile_ids": [p1_id.clone()] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(assignments.as_array().unwrap().len(), 2);

    let (status, _) = request(
        &app,
        "DELETE",
        "/api/quiz-assignments",
        Some(json!({ "quiz_id": quiz_id.clone(), "profile_id": p1_id.clone() })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, remaining) = request(
        &app,
        "GET",
        &format!("/api/quiz-assignments?quiz_id={quiz_id}"),
        None,
    )
    .await;
    assert_eq!(remaining.as_array().unwrap().len(), 1);
    assert_eq!(remaining[0]["profile_id"].as_str().unwrap(), p2_id);
}
