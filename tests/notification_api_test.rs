mod common;

use std::time::Duration;

use axum::http::{header, StatusCode};
use common::*;
use futures::StreamExt;
use marketplace_backend::models::profile::UserRole;
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;

async fn reviewed_pair(t: &TestApp, titles: &[&str]) -> (User, User) {
    let boss = employer();
    let ana = freelancer();
    for title in titles {
        let job_id = post_job(&t.router, &boss, title).await;
        let app_id = apply(&t.router, &ana, job_id, None).await;
        let (status, _) = send(
            &t.router,
            json_request(
                "PUT",
                &format!("/api/applications/{}/status", app_id),
                Some(&boss.token),
                Some(json!({ "status": "rejected" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
    (boss, ana)
}

#[tokio::test]
async fn mark_read_is_idempotent_and_recipient_only() {
    let t = setup_app();
    let (boss, ana) = reviewed_pair(&t, &["First", "Second"]).await;

    let (_, feed) = send(&t.router, json_request("GET", "/api/notifications", Some(&ana.token), None)).await;
    assert_eq!(feed["unread_count"], 2);
    assert_eq!(feed["items"][0]["type"], "error");
    let id = feed["items"][0]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/notifications/{}/read", id);

    let (status, _) = send(&t.router, json_request("POST", &uri, Some(&boss.token), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&t.router, json_request("POST", &uri, Some(&ana.token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unread_count"], 1);

    let (status, body) = send(&t.router, json_request("POST", &uri, Some(&ana.token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unread_count"], 1);

    let (_, feed) = send(&t.router, json_request("GET", "/api/notifications", Some(&ana.token), None)).await;
    let read = feed["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|n| n["id"] == id.as_str())
        .unwrap();
    assert_eq!(read["read"], true);
}

#[tokio::test]
async fn mark_all_read_clears_unread_count() {
    let t = setup_app();
    let (boss, ana) = reviewed_pair(&t, &["One", "Two", "Three"]).await;

    let (status, body) = send(&t.router, json_request("POST", "/api/notifications/read-all", Some(&ana.token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], 3);

    let (_, body) = send(&t.router, json_request("POST", "/api/notifications/read-all", Some(&ana.token), None)).await;
    assert_eq!(body["updated"], 0);

    let (_, feed) = send(&t.router, json_request("GET", "/api/notifications", Some(&ana.token), None)).await;
    assert_eq!(feed["unread_count"], 0);

    let (_, boss_feed) = send(&t.router, json_request("GET", "/api/notifications", Some(&boss.token), None)).await;
    assert_eq!(boss_feed["items"], json!([]));
}

async fn review(t: &TestApp, boss: &User, applicant: &User, title: &str, status: &str) {
    let job_id = post_job(&t.router, boss, title).await;
    let app_id = apply(&t.router, applicant, job_id, None).await;
    let (code, body) = send(
        &t.router,
        json_request(
            "PUT",
            &format!("/api/applications/{}/status", app_id),
            Some(&boss.token),
            Some(json!({ "status": status })),
        ),
    )
    .await;
    assert_eq!(code, StatusCode::OK, "{}", body);
}

#[tokio::test]
async fn stream_delivers_only_the_callers_notifications() {
    let t = setup_app();
    let boss = employer();
    let ana = freelancer();
    let bo = user(UserRole::Freelancer, "bo@example.com");

    let resp = t
        .router
        .clone()
        .oneshot(json_request("GET", "/api/notifications/stream", Some(&ana.token), None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));
    let mut body = resp.into_body().into_data_stream();

    review(&t, &boss, &bo, "Someone else's gig", "rejected").await;
    review(&t, &boss, &ana, "Ana's gig", "accepted").await;

    let mut frame = String::new();
    while !frame.contains("\n\n") {
        let chunk = tokio::time::timeout(Duration::from_secs(5), body.next())
            .await
            .expect("no event within 5s")
            .expect("stream ended")
            .unwrap();
        frame.push_str(&String::from_utf8_lossy(&chunk));
    }

    assert!(frame.contains("event: notification"), "{}", frame);
    let data = frame
        .lines()
        .find_map(|line| line.strip_prefix("data: "))
        .unwrap();
    let event: JsonValue = serde_json::from_str(data).unwrap();
    assert_eq!(event["type"], "success");
    assert_eq!(
        event["message"],
        "Your application for \"Ana's gig\" has been accepted."
    );
}
