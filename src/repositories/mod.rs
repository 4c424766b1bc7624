//! Persistence seams. Handlers only see these traits; `mysql` backs them
//! with sqlx in production and `memory` keeps everything in process.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::booking::Booking;
use crate::models::instructor::{
    AvailabilityDay, ClosedEvent, Instructor, InstructorCredentials, NewInstructor,
    PasswordResetTicket, ProfileUpdate, Review,
};
use crate::models::suburb::Suburb;

pub mod memory;
pub mod mysql;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("record already exists: {0}")]
    Conflict(String),

    #[error("stored record is malformed: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Storage for instructor accounts and their embedded lists.
///
/// Mutations return the updated instructor, or `None` when `id` is unknown.
#[async_trait]
pub trait InstructorRepository: Send + Sync {
    async fn ping(&self) -> Result<(), RepositoryError>;

    /// Inserts a new instructor. Fails with `Conflict` when the email is taken.
    async fn create(&self, new: NewInstructor) -> Result<Instructor, RepositoryError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Instructor>, RepositoryError>;

    /// `email` must already be normalized (trimmed, lowercase).
    async fn find_by_email(&self, email: &str) -> Result<Option<Instructor>, RepositoryError>;

    async fn find_credentials(
        &self,
        email: &str,
    ) -> Result<Option<InstructorCredentials>, RepositoryError>;

    /// Instructors serving `post_code` whose transmission type contains
    /// `transmission`, ignoring case, ordered by id.
    async fn search(
        &self,
        post_code: &str,
        transmission: &str,
    ) -> Result<Vec<Instructor>, RepositoryError>;

    async fn find_with_expired_licenses(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Instructor>, RepositoryError>;

    async fn update_profile(
        &self,
        id: i64,
        update: &ProfileUpdate,
    ) -> Result<Option<Instructor>, RepositoryError>;

    async fn set_avatar(&self, id: i64, url: &str) -> Result<Option<Instructor>, RepositoryError>;

    async fn set_available(
        &self,
        id: i64,
        available: bool,
    ) -> Result<Option<Instructor>, RepositoryError>;

    async fn push_review(
        &self,
        id: i64,
        review: &Review,
    ) -> Result<Option<Instructor>, RepositoryError>;

    async fn push_closed_event(
        &self,
        id: i64,
        event: &ClosedEvent,
    ) -> Result<Option<Instructor>, RepositoryError>;

    /// Removes the closed event `event_id` in a single write, leaving every
    /// other event in place. `None` when the instructor or the event is unknown.
    async fn remove_closed_event(
        &self,
        id: i64,
        event_id: Uuid,
    ) -> Result<Option<Instructor>, RepositoryError>;

    async fn store_reset_token(
        &self,
        id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;

    /// Exact, case-sensitive token match.
    async fn find_reset_ticket(
        &self,
        token: &str,
    ) -> Result<Option<PasswordResetTicket>, RepositoryError>;

    /// Stores the new hash and clears the reset token, but only while `token`
    /// is still the one on record. Returns false when another reset consumed
    /// it first. `fallback_availability` is written only when the instructor
    /// has no weekly availability yet.
    async fn complete_password_reset(
        &self,
        id: i64,
        token: &str,
        password_hash: &str,
        fallback_availability: &[AvailabilityDay],
    ) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait SuburbRepository: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Suburb>, RepositoryError>;

    /// Suburbs whose name contains `keyword`, ignoring case.
    async fn search_by_name(&self, keyword: &str) -> Result<Vec<Suburb>, RepositoryError>;

    async fn find_by_postcode(&self, postcode: i32) -> Result<Vec<Suburb>, RepositoryError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Booking>, RepositoryError>;

    /// Flips `reviewed` from false to true. Returns false when the booking is
    /// unknown or was already reviewed, so only one caller can ever win.
    async fn mark_reviewed(&self, id: i64) -> Result<bool, RepositoryError>;
}

/// `%keyword%` for LIKE, with LIKE metacharacters escaped.
pub fn contains_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
