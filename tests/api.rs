use std::{sync::Arc, time::Duration};

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use fitness_timer::{create_router, AppState};
use futures::StreamExt;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app_with_tick(tick: Duration) -> (Arc<AppState>, Router) {
    let state = Arc::new(AppState::new(0, "127.0.0.1".to_string(), tick));
    let router = create_router(Arc::clone(&state));
    (state, router)
}

async fn call(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = router
        .clone()
        .oneshot(request.body(body).expect("request"))
        .await
        .expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

async fn add(router: &Router, name: &str, sets: Value, rest: Value) -> (StatusCode, Value) {
    call(
        router,
        Method::POST,
        "/exercises",
        Some(json!({ "name": name, "sets": sets, "rest": rest })),
    )
    .await
}

async fn post_raw(router: &Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request");
    let response = router.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

async fn wait_for_idle(router: &Router) -> Value {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let (_, timer) = call(router, Method::GET, "/timer", None).await;
        if timer["active"] == json!(false) {
            return timer;
        }
        assert!(tokio::time::Instant::now() < deadline, "timer never went idle: {}", timer);
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

#[tokio::test]
async fn added_exercise_lands_at_head_with_all_sets_remaining() {
    let (_, router) = app_with_tick(Duration::from_secs(1));

    add(&router, "Squat", json!(5), json!(120)).await;
    let (status, body) = add(&router, "Push-ups", json!("3"), json!("30")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["count"], 2);
    let head = &body["exercises"][0];
    assert_eq!(head["name"], "Push-ups");
    assert_eq!(head["total_sets"], 3);
    assert_eq!(head["remaining_sets"], 3);
    assert_eq!(head["completed"], false);
    assert_eq!(head["can_complete_set"], true);
    assert_eq!(body["exercises"][1]["name"], "Squat");
}

#[tokio::test]
async fn invalid_submissions_are_ignored() {
    let (_, router) = app_with_tick(Duration::from_secs(1));
    add(&router, "Squat", json!(5), json!(120)).await;

    for (name, sets, rest) in [
        ("", json!(3), json!(30)),
        ("Dips", json!(0), json!(30)),
        ("Dips", json!("lots"), json!(30)),
        ("Dips", json!(3), json!(-5)),
    ] {
        let (status, body) = add(&router, name, sets, rest).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ignored");
        assert_eq!(body["count"], 1);
    }

    let (_, list) = call(&router, Method::GET, "/exercises", None).await;
    assert_eq!(list["count"], 1);
}

#[tokio::test]
async fn wrongly_typed_or_unreadable_submissions_are_ignored() {
    let (_, router) = app_with_tick(Duration::from_secs(1));
    add(&router, "Squat", json!(5), json!(120)).await;

    for raw in [
        r#"{"name":"Dips","sets":true,"rest":30}"#,
        r#"{"name":"Dips","sets":[3],"rest":30}"#,
        r#"{"name":null,"sets":3,"rest":30}"#,
        r#"{"name":5,"sets":3,"rest":30}"#,
        "not json",
    ] {
        let (status, body) = post_raw(&router, "/exercises", raw).await;
        assert_eq!(status, StatusCode::OK, "status for {}", raw);
        assert_eq!(body["status"], "ignored", "outcome for {}", raw);
        assert_eq!(body["count"], 1);
        assert_eq!(body["exercises"][0]["name"], "Squat");
    }
}

#[tokio::test]
async fn complete_set_starts_rest_and_countdown_auto_stops() {
    let (_, router) = app_with_tick(Duration::from_millis(25));
    let (_, body) = add(&router, "Push-ups", json!(3), json!(3)).await;
    let id = body["exercises"][0]["id"].as_u64().unwrap();

    let (status, body) = call(&router, Method::POST, &format!("/exercises/{}/complete-set", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "resting");
    assert_eq!(body["exercises"][0]["remaining_sets"], 2);
    assert_eq!(body["exercises"][0]["completed"], false);
    assert_eq!(body["exercises"][0]["resting"], true);
    assert_eq!(body["timer"]["active"], true);
    assert_eq!(body["timer"]["exercise_id"], id);
    assert_eq!(body["timer"]["total_seconds"], 3);

    let timer = wait_for_idle(&router).await;
    assert_eq!(timer["remaining_seconds"], 0);
    assert_eq!(timer["display"], "00:00");

    for _ in 0..2 {
        call(&router, Method::POST, &format!("/exercises/{}/complete-set", id), None).await;
        wait_for_idle(&router).await;
    }

    let (_, list) = call(&router, Method::GET, "/exercises", None).await;
    assert_eq!(list["exercises"][0]["remaining_sets"], 0);
    assert_eq!(list["exercises"][0]["completed"], true);
    assert_eq!(list["exercises"][0]["progress_percent"], 100.0);

    let (_, body) = call(&router, Method::POST, &format!("/exercises/{}/complete-set", id), None).await;
    assert_eq!(body["status"], "ignored");
    assert_eq!(body["timer"]["active"], false);
}

#[tokio::test]
async fn resting_exercise_cannot_complete_another_set() {
    let (_, router) = app_with_tick(Duration::from_secs(60));
    let (_, body) = add(&router, "Row", json!(3), json!(90)).await;
    let id = body["exercises"][0]["id"].as_u64().unwrap();

    call(&router, Method::POST, &format!("/exercises/{}/complete-set", id), None).await;
    let (_, body) = call(&router, Method::POST, &format!("/exercises/{}/complete-set", id), None).await;

    assert_eq!(body["status"], "ignored");
    assert_eq!(body["exercises"][0]["remaining_sets"], 2);
    assert_eq!(body["exercises"][0]["can_complete_set"], false);
}

#[tokio::test]
async fn new_rest_replaces_the_running_one() {
    let (_, router) = app_with_tick(Duration::from_secs(60));
    let (_, body) = add(&router, "Curl", json!(3), json!(45)).await;
    let first = body["exercises"][0]["id"].as_u64().unwrap();
    let (_, body) = add(&router, "Press", json!(3), json!(20)).await;
    let second = body["exercises"][0]["id"].as_u64().unwrap();

    call(&router, Method::POST, &format!("/exercises/{}/complete-set", first), None).await;
    let (_, body) = call(&router, Method::POST, &format!("/exercises/{}/complete-set", second), None).await;

    assert_eq!(body["timer"]["exercise_id"], second);
    assert_eq!(body["timer"]["display"], "00:20");
    let resting: Vec<_> = body["exercises"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|e| e["resting"] == json!(true))
        .collect();
    assert_eq!(resting.len(), 1);
    assert_eq!(resting[0]["id"], second);
}

#[tokio::test]
async fn skip_stops_the_timer() {
    let (_, router) = app_with_tick(Duration::from_secs(60));
    let (_, body) = add(&router, "Bench", json!(3), json!(90)).await;
    let id = body["exercises"][0]["id"].as_u64().unwrap();
    call(&router, Method::POST, &format!("/exercises/{}/complete-set", id), None).await;

    let (status, body) = call(&router, Method::POST, "/timer/skip", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "idle");
    assert_eq!(body["timer"]["active"], false);
    assert_eq!(body["exercises"][0]["can_complete_set"], true);

    let (_, body) = call(&router, Method::POST, "/timer/skip", None).await;
    assert_eq!(body["status"], "ignored");
}

#[tokio::test]
async fn deleting_the_resting_exercise_stops_the_timer() {
    let (state, router) = app_with_tick(Duration::from_secs(60));
    let (_, body) = add(&router, "Lunge", json!(3), json!(60)).await;
    let id = body["exercises"][0]["id"].as_u64().unwrap();
    call(&router, Method::POST, &format!("/exercises/{}/complete-set", id), None).await;
    assert!(state.get_timer_state().unwrap().active);

    let (status, body) = call(&router, Method::DELETE, &format!("/exercises/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
    assert_eq!(body["timer"]["active"], false);
    assert!(!state.get_timer_state().unwrap().active);
}

#[tokio::test]
async fn unknown_ids_return_not_found() {
    let (_, router) = app_with_tick(Duration::from_secs(1));

    let (status, _) = call(&router, Method::POST, "/exercises/99/complete-set", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call(&router, Method::DELETE, "/exercises/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn clear_removes_everything() {
    let (_, router) = app_with_tick(Duration::from_secs(60));
    let (_, body) = add(&router, "Squat", json!(3), json!(60)).await;
    let id = body["exercises"][0]["id"].as_u64().unwrap();
    add(&router, "Bench", json!(3), json!(60)).await;
    call(&router, Method::POST, &format!("/exercises/{}/complete-set", id), None).await;

    let (status, body) = call(&router, Method::DELETE, "/exercises", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
    assert_eq!(body["timer"]["active"], false);
}

#[tokio::test]
async fn status_and_health() {
    let (_, router) = app_with_tick(Duration::from_millis(250));
    add(&router, "Plank", json!(2), json!(0)).await;

    let (status, body) = call(&router, Method::GET, "/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["tick_millis"], 250);
    assert_eq!(body["last_action"], "add");
    assert_eq!(body["timer"]["active"], false);

    let (status, body) = call(&router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn timer_events_stream_opens_with_the_running_timer() {
    let (_, router) = app_with_tick(Duration::from_secs(60));
    let (_, body) = add(&router, "Bench", json!(3), json!(75)).await;
    let id = body["exercises"][0]["id"].as_u64().unwrap();
    call(&router, Method::POST, &format!("/exercises/{}/complete-set", id), None).await;

    let request = Request::builder()
        .uri("/timer/events")
        .body(Body::empty())
        .expect("request");
    let response = router.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/event-stream"), "content type {}", content_type);

    let mut frames = response.into_body().into_data_stream();
    let chunk = tokio::time::timeout(Duration::from_secs(5), frames.next())
        .await
        .expect("first frame")
        .expect("stream open")
        .expect("chunk");
    let text = String::from_utf8(chunk.to_vec()).expect("utf8 frame");
    assert!(text.starts_with("event: timer\n"), "frame {:?}", text);

    let data = text
        .lines()
        .find_map(|line| line.strip_prefix("data: "))
        .expect("data line");
    let timer: Value = serde_json::from_str(data).expect("timer json");
    assert_eq!(timer["active"], true);
    assert_eq!(timer["exercise_id"], id);
    assert_eq!(timer["display"], "01:15");
}
