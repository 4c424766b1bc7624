mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use serde_json::json;

use common::{json_request, seed_instructor, send, test_app, TestApp};
use instructor_marketplace_api::repositories::InstructorRepository;

async fn request_token(app: &TestApp, instructor_id: i64, email: &str) -> String {
    let (status, _) = send(
        &app.router,
        json_request(Method::POST, "/forgot-password", json!({ "email": email }), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let mails = app.mailer.wait_for(1).await;
    app.instructors
        .reset_state(instructor_id)
        .and_then(|(token, _)| token)
        .filter(|token| mails.iter().any(|m| m.text.contains(token.as_str())))
        .expect("token stored and mailed")
}

#[tokio::test]
async fn forgot_password_for_unknown_email_is_not_found() {
    let app = test_app();
    let (status, _) = send(
        &app.router,
        json_request(
            Method::POST,
            "/forgot-password",
            json!({ "email": "ghost@example.com" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reset_sets_new_password_and_burns_token() {
    let app = test_app();
    let instructor = seed_instructor(&app, "reset@example.com").await;
    let token = request_token(&app, instructor.id, "reset@example.com").await;
    assert_eq!(token.len(), 32);

    let (status, body) = send(
        &app.router,
        json_request(
            Method::PUT,
            "/reset-password",
            json!({ "token": token, "newPassword": "brand-new-pass" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert_eq!(app.instructors.reset_state(instructor.id), Some((None, None)));

    let (status, _) = send(
        &app.router,
        json_request(
            Method::POST,
            "/instructor-login",
            json!({ "email": "reset@example.com", "password": "brand-new-pass" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // single use
    let (status, _) = send(
        &app.router,
        json_request(
            Method::PUT,
            "/reset-password",
            json!({ "token": token, "newPassword": "another-pass" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn token_is_rejected_at_its_expiry_instant() {
    let app = test_app();
    let instructor = seed_instructor(&app, "late@example.com").await;
    let token = request_token(&app, instructor.id, "late@example.com").await;

    // expiry already reached when the request is handled
    app.instructors.set_reset_expiry(instructor.id, Utc::now());

    let (status, body) = send(
        &app.router,
        json_request(
            Method::PUT,
            "/reset-password",
            json!({ "token": token, "newPassword": "too-late-pass" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["data"]["error"].as_str().unwrap().contains("expired"));
}

#[tokio::test]
async fn token_past_expiry_is_rejected() {
    let app = test_app();
    let instructor = seed_instructor(&app, "later@example.com").await;
    let token = request_token(&app, instructor.id, "later@example.com").await;
    app.instructors
        .set_reset_expiry(instructor.id, Utc::now() - Duration::seconds(30));

    let (status, _) = send(
        &app.router,
        json_request(
            Method::PUT,
            "/reset-password",
            json!({ "token": token, "newPassword": "too-late-pass" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_token_and_short_password_are_rejected() {
    let app = test_app();

    let (status, _) = send(
        &app.router,
        json_request(
            Method::PUT,
            "/reset-password",
            json!({ "token": "deadbeef", "newPassword": "long-enough" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app.router,
        json_request(
            Method::PUT,
            "/reset-password",
            json!({ "token": "deadbeef", "newPassword": "123" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["data"]["errors"]["new_password"].is_array());
}

#[tokio::test]
async fn token_match_is_case_sensitive() {
    let app = test_app();
    let instructor = seed_instructor(&app, "case@example.com").await;
    let token = "abcdef0123456789abcdef0123456789";
    app.instructors
        .store_reset_token(instructor.id, token, Utc::now() + Duration::minutes(2))
        .await
        .unwrap();
    let shouted = token.to_uppercase();

    let (status, _) = send(
        &app.router,
        json_request(
            Method::PUT,
            "/reset-password",
            json!({ "token": shouted, "newPassword": "brand-new-pass" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // the real token is still usable
    let (status, _) = send(
        &app.router,
        json_request(
            Method::PUT,
            "/reset-password",
            json!({ "token": token, "newPassword": "brand-new-pass" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
