mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
};
use common::*;
use marketplace_backend::models::profile::UserRole;
use serde_json::json;
use tower::ServiceExt;

const PDF: &[u8] = b"%PDF-1.4\n1 0 obj\n<<>>\nendobj\n%%EOF";

#[tokio::test]
async fn freelancer_applies_with_resume() {
    let t = setup_app();
    let boss = employer();
    let ana = freelancer();
    let job_id = post_job(&t.router, &boss, "Rust backend").await;

    let (status, body) = send(
        &t.router,
        multipart_request(
            &format!("/api/jobs/{}/apply", job_id),
            &ana.token,
            &APPLICATION_FIELDS,
            Some(("cv.pdf", PDF)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["has_resume"], true);
    assert_eq!(body["phone_number"], "+1 (555) 123-4567");
    assert!(body["interview"].is_null());

    let keys = t.storage.keys().await;
    assert_eq!(keys.len(), 1);
    assert!(keys[0].starts_with(&ana.id.to_string()));
    assert!(keys[0].ends_with(".pdf"));
}

#[tokio::test]
async fn duplicate_application_conflicts() {
    let t = setup_app();
    let boss = employer();
    let ana = freelancer();
    let job_id = post_job(&t.router, &boss, "Rust backend").await;
    apply(&t.router, &ana, job_id, None).await;

    let (status, body) = send(
        &t.router,
        multipart_request(&format!("/api/jobs/{}/apply", job_id), &ana.token, &APPLICATION_FIELDS, None),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "You have already applied to this job");
}

#[tokio::test]
async fn invalid_forms_are_rejected() {
    let t = setup_app();
    let boss = employer();
    let ana = freelancer();
    let job_id = post_job(&t.router, &boss, "Rust backend").await;
    let uri = format!("/api/jobs/{}/apply", job_id);

    let short_letter = [
        ("name", "Ana Lima"),
        ("email", "ana@example.com"),
        ("phone", "+1 555 123 4567"),
        ("cover_letter", "too short"),
    ];
    let (status, _) = send(&t.router, multipart_request(&uri, &ana.token, &short_letter, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let padded_letter = [
        ("name", "Ana Lima"),
        ("email", "ana@example.com"),
        ("phone", "+1 555 123 4567"),
        ("cover_letter", "          too short          "),
    ];
    let (status, body) = send(&t.router, multipart_request(&uri, &ana.token, &padded_letter, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Cover letter"));

    let bad_email = [
        ("name", "Ana Lima"),
        ("email", "not-an-email"),
        ("phone", "+1 555 123 4567"),
        ("cover_letter", "I have shipped several Axum services to production."),
    ];
    let (status, _) = send(&t.router, multipart_request(&uri, &ana.token, &bad_email, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &t.router,
        multipart_request(&uri, &ana.token, &APPLICATION_FIELDS, Some(("cv.pdf", b"not a pdf"))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid PDF file content");

    let (status, _) = send(
        &t.router,
        multipart_request(&uri, &ana.token, &APPLICATION_FIELDS, Some(("cv.exe", b"MZ"))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(t.storage.keys().await.is_empty());
}

#[tokio::test]
async fn applying_requires_a_freelancer_and_an_open_job() {
    let t = setup_app();
    let boss = employer();
    let ana = freelancer();
    let job_id = post_job(&t.router, &boss, "Rust backend").await;
    let uri = format!("/api/jobs/{}/apply", job_id);

    let (status, _) = send(&t.router, multipart_request(&uri, &boss.token, &APPLICATION_FIELDS, None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &t.router,
        multipart_request(
            &format!("/api/jobs/{}/apply", uuid::Uuid::new_v4()),
            &ana.token,
            &APPLICATION_FIELDS,
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &t.router,
        json_request("POST", &format!("/api/employer/jobs/{}/close", job_id), Some(&boss.token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&t.router, multipart_request(&uri, &ana.token, &APPLICATION_FIELDS, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn requests_without_token_are_unauthorized() {
    let t = setup_app();
    let (status, _) = send(&t.router, json_request("GET", "/api/me/applications", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &t.router,
        json_request("GET", "/api/notifications", Some("not-a-jwt"), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn signed_resume_link_downloads_once_and_rejects_tampering() {
    let t = setup_app();
    let boss = employer();
    let ana = freelancer();
    let stranger = user(UserRole::Freelancer, "eve@example.com");
    let job_id = post_job(&t.router, &boss, "Rust backend").await;
    let app_id = apply(&t.router, &ana, job_id, Some(("cv.pdf", PDF))).await;
    let link_uri = format!("/api/applications/{}/resume", app_id);

    let (status, _) = send(&t.router, json_request("GET", &link_uri, Some(&stranger.token), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, own) = send(&t.router, json_request("GET", &link_uri, Some(&ana.token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(own["url"].as_str().unwrap().starts_with(BASE_URL));

    let (status, link) = send(&t.router, json_request("GET", &link_uri, Some(&boss.token), None)).await;
    assert_eq!(status, StatusCode::OK);
    let url = url::Url::parse(link["url"].as_str().unwrap()).unwrap();
    let path_and_query = format!("{}?{}", url.path(), url.query().unwrap());

    let resp = t
        .router
        .clone()
        .oneshot(Request::builder().uri(&path_and_query).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(resp.headers()[header::CACHE_CONTROL], "private, no-store");
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    assert_eq!(&bytes[..], PDF);

    let tampered = path_and_query.replace("signature=", "signature=00");
    let (status, _) = send(
        &t.router,
        Request::builder().uri(&tampered).body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &t.router,
        Request::builder().uri(url.path()).body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn resume_link_without_attachment_is_not_found() {
    let t = setup_app();
    let boss = employer();
    let ana = freelancer();
    let job_id = post_job(&t.router, &boss, "Rust backend").await;
    let app_id = apply(&t.router, &ana, job_id, None).await;

    let (status, _) = send(
        &t.router,
        json_request("GET", &format!("/api/applications/{}/resume", app_id), Some(&boss.token), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn freelancer_sees_own_applications_only() {
    let t = setup_app();
    let boss = employer();
    let ana = freelancer();
    let bo = user(UserRole::Freelancer, "bo@example.com");
    let job_id = post_job(&t.router, &boss, "Rust backend").await;
    apply(&t.router, &ana, job_id, None).await;

    let (status, mine) = send(&t.router, json_request("GET", "/api/me/applications", Some(&ana.token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 1);
    assert_eq!(mine[0]["job_title"], "Rust backend");

    let (_, theirs) = send(&t.router, json_request("GET", "/api/me/applications", Some(&bo.token), None)).await;
    assert_eq!(theirs, json!([]));
}
