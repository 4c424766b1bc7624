#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use serde_json::Value;
use tower::util::ServiceExt; // for oneshot

use instructor_marketplace_api::config::AppConfig;
use instructor_marketplace_api::create_app;
use instructor_marketplace_api::models::booking::Booking;
use instructor_marketplace_api::models::instructor::{
    default_week, Car, Instructor, NewInstructor, ServiceSuburb, ServiceSuburbs,
};
use instructor_marketplace_api::models::suburb::Suburb;
use instructor_marketplace_api::repositories::memory::{
    InMemoryBookingRepository, InMemoryInstructorRepository, InMemorySuburbRepository,
};
use instructor_marketplace_api::repositories::{BookingRepository, InstructorRepository};
use instructor_marketplace_api::services::images::{ImageStore, ImageStoreError, ImageUpload};
use instructor_marketplace_api::services::mail::{Email, MailError, Mailer};
use instructor_marketplace_api::state::AppState;
use instructor_marketplace_api::utils::jwt::create_jwt;

pub const TEST_SECRET: &str = "test-secret";
pub const TEST_PASSWORD: &str = "secret123";

/// Image store that remembers file names instead of uploading.
#[derive(Default, Clone)]
pub struct FakeImageStore {
    pub uploads: Arc<Mutex<Vec<String>>>,
}

impl FakeImageStore {
    pub fn count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }
}

#[async_trait]
impl ImageStore for FakeImageStore {
    async fn upload(&self, image: ImageUpload) -> Result<String, ImageStoreError> {
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(image.file_name.clone());
        Ok(format!("https://images.test/{}/{}", uploads.len(), image.file_name))
    }
}

#[derive(Default, Clone)]
pub struct RecordingMailer {
    pub sent: Arc<Mutex<Vec<Email>>>,
}

impl RecordingMailer {
    /// Waits for background sends to land.
    pub async fn wait_for(&self, count: usize) -> Vec<Email> {
        for _ in 0..50 {
            {
                let sent = self.sent.lock().unwrap();
                if sent.len() >= count {
                    return sent.clone();
                }
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub instructors: InMemoryInstructorRepository,
    pub bookings: InMemoryBookingRepository,
    pub images: FakeImageStore,
    pub mailer: RecordingMailer,
}

pub fn test_config(extra: &[(&str, &str)]) -> AppConfig {
    let mut vars: HashMap<String, String> = [
        ("DATABASE_URL", "mysql://unused@localhost/unused"),
        ("JWT_SECRET", TEST_SECRET),
        ("BCRYPT_COST", "4"),
        ("RATE_LIMIT_RPS", "1000"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }
    AppConfig::from_lookup(|key| vars.get(key).cloned()).expect("test config")
}

pub fn suburbs() -> Vec<Suburb> {
    let suburb = |id, name: &str, postcode| Suburb {
        id,
        suburb: name.to_string(),
        state: "NSW".to_string(),
        postcode,
        price: 65.0,
    };
    vec![
        suburb(1, "Parramatta", 2150),
        suburb(2, "North Parramatta", 2151),
        suburb(3, "Harris Park", 2150),
        suburb(4, "Suburb 2150", 2150),
    ]
}

/// Router over caller-supplied instructor and booking stores, for tests that
/// wrap the in-memory ones to control interleavings.
pub fn router_with(
    instructors: Arc<dyn InstructorRepository>,
    bookings: Arc<dyn BookingRepository>,
) -> Router {
    let state = AppState::new(
        test_config(&[]),
        instructors,
        Arc::new(InMemorySuburbRepository::new(suburbs())),
        bookings,
        Arc::new(FakeImageStore::default()),
        Arc::new(RecordingMailer::default()),
    );
    create_app(state)
}

pub fn test_app_with(extra: &[(&str, &str)], bookings: Vec<Booking>) -> TestApp {
    let instructors = InMemoryInstructorRepository::new();
    let bookings = InMemoryBookingRepository::new(bookings);
    let images = FakeImageStore::default();
    let mailer = RecordingMailer::default();

    let state = AppState::new(
        test_config(extra),
        Arc::new(instructors.clone()),
        Arc::new(InMemorySuburbRepository::new(suburbs())),
        Arc::new(bookings.clone()),
        Arc::new(images.clone()),
        Arc::new(mailer.clone()),
    );

    TestApp {
        router: create_app(state),
        instructors,
        bookings,
        images,
        mailer,
    }
}

pub fn test_app() -> TestApp {
    test_app_with(&[], Vec::new())
}

pub fn new_instructor(email: &str, post_code: &str, transmission: &str) -> NewInstructor {
    let far_future = Utc::now() + Duration::days(365);
    NewInstructor {
        first_name: "Jamie".into(),
        last_name: "Nguyen".into(),
        email: email.to_string(),
        phone: "0400111222".into(),
        date_of_birth: "1988-04-12".into(),
        gender: "male".into(),
        password_hash: bcrypt::hash(TEST_PASSWORD, 4).unwrap(),
        available: true,
        transmission_type: transmission.to_string(),
        languages: vec!["English".into()],
        avatar: Some("https://images.test/seed.png".into()),
        bio: None,
        car: Car::default(),
        service_suburbs: ServiceSuburbs {
            suburbs: vec![ServiceSuburb {
                name: "Parramatta".into(),
                post_code: post_code.to_string(),
            }],
        },
        driving_license_expire: far_future,
        instructor_license_expire: far_future,
        children_check_license_expire: far_future,
        has_gst: false,
        bank_account_number: "12345678".into(),
        bsb_number: "062000".into(),
        abn_number: "51824753556".into(),
        invoice_address: "1 George St, Sydney".into(),
        availability: default_week(),
    }
}

pub async fn seed_instructor(app: &TestApp, email: &str) -> Instructor {
    app.instructors
        .create(new_instructor(email, "2150", "Auto"))
        .await
        .expect("seed instructor")
}

pub fn bearer(instructor_id: i64) -> String {
    format!("Bearer {}", create_jwt(instructor_id, TEST_SECRET, 1).unwrap())
}

pub fn json_request(method: Method, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", token);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", token);
    }
    builder.body(Body::empty()).unwrap()
}

pub const BOUNDARY: &str = "XTESTBOUNDARYX";

/// Hand-built multipart body: text fields followed by an optional file part.
pub fn multipart_body(fields: &[(&str, String)], file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, content_type, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, file_name, content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_request(method: Method, uri: &str, body: Vec<u8>, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
    if let Some(token) = token {
        builder = builder.header("Authorization", token);
    }
    builder.body(Body::from(body)).unwrap()
}

pub async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = router.clone().oneshot(req).await.expect("request failed");
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}
