mod common;

use axum::http::StatusCode;
use common::*;
use marketplace_backend::models::profile::UserRole;
use serde_json::json;

#[tokio::test]
async fn health_and_openapi_are_public() {
    let t = setup_app();
    let (status, body) = send(&t.router, json_request("GET", "/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, doc) = send(&t.router, json_request("GET", "/api-docs/openapi.json", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/applications/{id}/status"]["put"].is_object());
}

#[tokio::test]
async fn create_job_validates_and_requires_employer() {
    let t = setup_app();
    let boss = employer();
    let ana = freelancer();

    let valid = json!({ "title": "API work", "description": "Write endpoints" });
    let (status, _) = send(
        &t.router,
        json_request("POST", "/api/employer/jobs", Some(&ana.token), Some(valid.clone())),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &t.router,
        json_request(
            "POST",
            "/api/employer/jobs",
            Some(&boss.token),
            Some(json!({ "title": "", "description": "Write endpoints" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &t.router,
        json_request(
            "POST",
            "/api/employer/jobs",
            Some(&boss.token),
            Some(json!({
                "title": "API work",
                "description": "Write endpoints",
                "budget_min": 900,
                "budget_max": 100
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &t.router,
        json_request("POST", "/api/employer/jobs", Some(&boss.token), Some(valid)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["status"], "open");
    assert_eq!(body["employer_id"], boss.id.to_string());
}

#[tokio::test]
async fn browsing_filters_and_pages_open_jobs() {
    let t = setup_app();
    let boss = employer();
    for i in 0..3 {
        post_job(&t.router, &boss, &format!("Rust gig {}", i)).await;
    }
    let (status, _) = send(
        &t.router,
        json_request(
            "POST",
            "/api/employer/jobs",
            Some(&boss.token),
            Some(json!({
                "title": "Logo design",
                "description": "A simple vector logo",
                "budget_min": 50,
                "budget_max": 200,
                "job_type": "hourly",
                "experience_level": "entry"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, all) = send(&t.router, json_request("GET", "/api/jobs", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all["total"], 4);
    assert_eq!(all["page"], 1);

    let (_, paged) = send(&t.router, json_request("GET", "/api/jobs?page=2&per_page=3", None, None)).await;
    assert_eq!(paged["items"].as_array().unwrap().len(), 1);
    assert_eq!(paged["total_pages"], 2);

    let (_, search) = send(&t.router, json_request("GET", "/api/jobs?search=LOGO", None, None)).await;
    assert_eq!(search["total"], 1);
    assert_eq!(search["items"][0]["title"], "Logo design");

    let (_, by_skill) = send(&t.router, json_request("GET", "/api/jobs?search=sql", None, None)).await;
    assert_eq!(by_skill["total"], 3);

    let (_, typed) = send(&t.router, json_request("GET", "/api/jobs?job_type=hourly", None, None)).await;
    assert_eq!(typed["total"], 1);

    let (_, budget) = send(&t.router, json_request("GET", "/api/jobs?budget_min=400", None, None)).await;
    assert_eq!(budget["total"], 3);

    let (_, blank) = send(&t.router, json_request("GET", "/api/jobs?search=%20%20", None, None)).await;
    assert_eq!(blank["total"], 4);
}

#[tokio::test]
async fn closing_a_job_hides_it_and_is_owner_only() {
    let t = setup_app();
    let boss = employer();
    let rival = user(UserRole::Employer, "rival@example.com");
    let job_id = post_job(&t.router, &boss, "Short contract").await;
    let close_uri = format!("/api/employer/jobs/{}/close", job_id);

    let (status, _) = send(&t.router, json_request("POST", &close_uri, Some(&rival.token), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&t.router, json_request("POST", &close_uri, Some(&boss.token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "closed");

    let (status, again) = send(&t.router, json_request("POST", &close_uri, Some(&boss.token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["status"], "closed");

    let (_, list) = send(&t.router, json_request("GET", "/api/jobs", None, None)).await;
    assert_eq!(list["total"], 0);

    let (status, job) = send(&t.router, json_request("GET", &format!("/api/jobs/{}", job_id), None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(job["status"], "closed");

    let (status, _) = send(
        &t.router,
        json_request("GET", &format!("/api/jobs/{}", uuid::Uuid::new_v4()), None, None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn absurd_page_numbers_return_an_empty_page() {
    let t = setup_app();
    let boss = employer();
    post_job(&t.router, &boss, "Only job").await;

    let (status, body) = send(
        &t.router,
        json_request("GET", "/api/jobs?page=9223372036854775807", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["items"], json!([]));
    assert_eq!(body["total"], 1);
}
