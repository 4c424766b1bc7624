mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{Method, Request, StatusCode};
use axum::body::Body;
use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use common::{
    bearer, get_request, json_request, new_instructor, router_with, seed_instructor, send, test_app,
    TestApp,
};
use instructor_marketplace_api::models::instructor::{
    AvailabilityDay, ClosedEvent, Instructor, InstructorCredentials, NewInstructor,
    PasswordResetTicket, ProfileUpdate, Review,
};
use instructor_marketplace_api::repositories::memory::{
    InMemoryBookingRepository, InMemoryInstructorRepository,
};
use instructor_marketplace_api::repositories::{InstructorRepository, RepositoryError};

async fn add_event(app: &TestApp, token: &str, name: &str) -> Value {
    let (status, body) = send(
        &app.router,
        json_request(
            Method::POST,
            "/closed-events",
            json!({
                "eventName": name,
                "startTime": "2026-12-24T08:00:00Z",
                "endTime": "2026-12-26T18:00:00Z"
            }),
            Some(token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "body: {body}");
    body["data"]["event"].clone()
}

fn delete_request(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header("Authorization", token)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn delete_removes_exactly_the_matching_event() {
    let app = test_app();
    let instructor = seed_instructor(&app, "events@example.com").await;
    let token = bearer(instructor.id);

    let first = add_event(&app, &token, "Christmas").await;
    let second = add_event(&app, &token, "Boxing day").await;
    let third = add_event(&app, &token, "Car service").await;
    assert_ne!(first["id"], second["id"]);

    let (status, body) = send(
        &app.router,
        delete_request(&format!("/closed-events/{}", second["id"].as_str().unwrap()), &token),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "body: {body}");

    let (status, body) = send(&app.router, get_request("/closed-events", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    let remaining = body["data"]["closedEvents"].as_array().unwrap();
    assert_eq!(remaining, &vec![first, third]);
}

#[tokio::test]
async fn deleting_unknown_event_is_not_found_and_changes_nothing() {
    let app = test_app();
    let instructor = seed_instructor(&app, "events2@example.com").await;
    let token = bearer(instructor.id);
    add_event(&app, &token, "Holiday").await;

    let (status, _) = send(
        &app.router,
        delete_request("/closed-events/6f1c1b1e-0000-4000-8000-000000000000", &token),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app.router, get_request("/closed-events", Some(&token))).await;
    assert_eq!(body["data"]["closedEvents"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn end_before_start_is_rejected() {
    let app = test_app();
    let instructor = seed_instructor(&app, "events3@example.com").await;

    let (status, body) = send(
        &app.router,
        json_request(
            Method::POST,
            "/closed-events",
            json!({
                "eventName": "Backwards",
                "startTime": "2026-12-26T18:00:00Z",
                "endTime": "2026-12-24T08:00:00Z"
            }),
            Some(&bearer(instructor.id)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["data"]["errors"]["end_time"].is_array());
}

#[tokio::test]
async fn closed_events_require_authentication() {
    let app = test_app();
    let (status, _) = send(&app.router, get_request("/closed-events", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

/// Lands one extra closed event right before each removal reaches storage,
/// the way a second request adding an event would.
struct AddsEventBeforeRemoval {
    inner: InMemoryInstructorRepository,
}

fn late_event() -> ClosedEvent {
    let start = Utc::now() + Duration::days(10);
    ClosedEvent {
        id: Uuid::new_v4(),
        event_name: "Added meanwhile".into(),
        start_time: start,
        end_time: start + Duration::hours(2),
    }
}

#[async_trait]
impl InstructorRepository for AddsEventBeforeRemoval {
    async fn ping(&self) -> Result<(), RepositoryError> {
        self.inner.ping().await
    }

    async fn create(&self, new: NewInstructor) -> Result<Instructor, RepositoryError> {
        self.inner.create(new).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Instructor>, RepositoryError> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Instructor>, RepositoryError> {
        self.inner.find_by_email(email).await
    }

    async fn find_credentials(
        &self,
        email: &str,
    ) -> Result<Option<InstructorCredentials>, RepositoryError> {
        self.inner.find_credentials(email).await
    }

    async fn search(
        &self,
        post_code: &str,
        transmission: &str,
    ) -> Result<Vec<Instructor>, RepositoryError> {
        self.inner.search(post_code, transmission).await
    }

    async fn find_with_expired_licenses(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Instructor>, RepositoryError> {
        self.inner.find_with_expired_licenses(now).await
    }

    async fn update_profile(
        &self,
        id: i64,
        update: &ProfileUpdate,
    ) -> Result<Option<Instructor>, RepositoryError> {
        self.inner.update_profile(id, update).await
    }

    async fn set_avatar(&self, id: i64, url: &str) -> Result<Option<Instructor>, RepositoryError> {
        self.inner.set_avatar(id, url).await
    }

    async fn set_available(
        &self,
        id: i64,
        available: bool,
    ) -> Result<Option<Instructor>, RepositoryError> {
        self.inner.set_available(id, available).await
    }

    async fn push_review(
        &self,
        id: i64,
        review: &Review,
    ) -> Result<Option<Instructor>, RepositoryError> {
        self.inner.push_review(id, review).await
    }

    async fn push_closed_event(
        &self,
        id: i64,
        event: &ClosedEvent,
    ) -> Result<Option<Instructor>, RepositoryError> {
        self.inner.push_closed_event(id, event).await
    }

    async fn remove_closed_event(
        &self,
        id: i64,
        event_id: Uuid,
    ) -> Result<Option<Instructor>, RepositoryError> {
        self.inner.push_closed_event(id, &late_event()).await?;
        self.inner.remove_closed_event(id, event_id).await
    }

    async fn store_reset_token(
        &self,
        id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        self.inner.store_reset_token(id, token, expires_at).await
    }

    async fn find_reset_ticket(
        &self,
        token: &str,
    ) -> Result<Option<PasswordResetTicket>, RepositoryError> {
        self.inner.find_reset_ticket(token).await
    }

    async fn complete_password_reset(
        &self,
        id: i64,
        token: &str,
        password_hash: &str,
        fallback_availability: &[AvailabilityDay],
    ) -> Result<bool, RepositoryError> {
        self.inner
            .complete_password_reset(id, token, password_hash, fallback_availability)
            .await
    }
}

#[tokio::test]
async fn event_added_during_delete_survives() {
    let inner = InMemoryInstructorRepository::new();
    let instructor = inner
        .create(new_instructor("interleave@example.com", "2150", "Auto"))
        .await
        .unwrap();
    let doomed = late_event();
    inner.push_closed_event(instructor.id, &doomed).await.unwrap();

    let router = router_with(
        Arc::new(AddsEventBeforeRemoval { inner: inner.clone() }),
        Arc::new(InMemoryBookingRepository::default()),
    );
    let token = bearer(instructor.id);

    let (status, body) = send(
        &router,
        delete_request(&format!("/closed-events/{}", doomed.id), &token),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "body: {body}");

    let stored = inner.find_by_id(instructor.id).await.unwrap().unwrap();
    assert_eq!(stored.closed_events.len(), 1);
    assert_ne!(stored.closed_events[0].id, doomed.id);
    assert_eq!(body["data"]["closedEvents"].as_array().unwrap().len(), 1);
}
