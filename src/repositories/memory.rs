use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{BookingRepository, InstructorRepository, RepositoryError, SuburbRepository};
use crate::models::booking::Booking;
use crate::models::instructor::{
    remove_closed_event, AvailabilityDay, ClosedEvent, Instructor, InstructorCredentials,
    NewInstructor, PasswordResetTicket, ProfileUpdate, Review,
};
use crate::models::suburb::Suburb;

#[derive(Debug, Clone)]
struct StoredInstructor {
    instructor: Instructor,
    password_hash: String,
    reset_token: Option<String>,
    reset_expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct InstructorTable {
    next_id: i64,
    rows: BTreeMap<i64, StoredInstructor>,
}

/// Process-local instructor store used by tests and local demos.
#[derive(Debug, Default, Clone)]
pub struct InMemoryInstructorRepository {
    table: Arc<Mutex<InstructorTable>>,
}

impl InMemoryInstructorRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current reset token and expiry of an instructor, for assertions.
    pub fn reset_state(&self, id: i64) -> Option<(Option<String>, Option<DateTime<Utc>>)> {
        let guard = self.table.lock().expect("instructor table poisoned");
        guard
            .rows
            .get(&id)
            .map(|row| (row.reset_token.clone(), row.reset_expires_at))
    }

    /// Overwrites the reset expiry, letting tests move a token across its deadline.
    pub fn set_reset_expiry(&self, id: i64, expires_at: DateTime<Utc>) {
        let mut guard = self.table.lock().expect("instructor table poisoned");
        if let Some(row) = guard.rows.get_mut(&id) {
            row.reset_expires_at = Some(expires_at);
        }
    }

    fn mutate<F>(&self, id: i64, f: F) -> Option<Instructor>
    where
        F: FnOnce(&mut StoredInstructor),
    {
        let mut guard = self.table.lock().expect("instructor table poisoned");
        let row = guard.rows.get_mut(&id)?;
        f(row);
        row.instructor.updated_at = Utc::now();
        Some(row.instructor.clone())
    }

    fn select<P>(&self, predicate: P) -> Vec<Instructor>
    where
        P: Fn(&Instructor) -> bool,
    {
        let guard = self.table.lock().expect("instructor table poisoned");
        guard
            .rows
            .values()
            .filter(|row| predicate(&row.instructor))
            .map(|row| row.instructor.clone())
            .collect()
    }
}

#[async_trait]
impl InstructorRepository for InMemoryInstructorRepository {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn create(&self, new: NewInstructor) -> Result<Instructor, RepositoryError> {
        let mut guard = self.table.lock().expect("instructor table poisoned");
        if guard.rows.values().any(|row| row.instructor.email == new.email) {
            return Err(RepositoryError::Conflict("Email already registered".to_string()));
        }

        guard.next_id += 1;
        let id = guard.next_id;
        let now = Utc::now();
        let instructor = Instructor {
            id,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            phone: new.phone,
            date_of_birth: new.date_of_birth,
            gender: new.gender,
            available: new.available,
            transmission_type: new.transmission_type,
            languages: new.languages,
            avatar: new.avatar,
            bio: new.bio,
            reviews: Vec::new(),
            car: new.car,
            service_suburbs: new.service_suburbs,
            driving_license_expire: new.driving_license_expire,
            instructor_license_expire: new.instructor_license_expire,
            children_check_license_expire: new.children_check_license_expire,
            has_gst: new.has_gst,
            bank_account_number: new.bank_account_number,
            bsb_number: new.bsb_number,
            abn_number: new.abn_number,
            invoice_address: new.invoice_address,
            user_type: "instructor".to_string(),
            availability: new.availability,
            closed_events: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        guard.rows.insert(
            id,
            StoredInstructor {
                instructor: instructor.clone(),
                password_hash: new.password_hash,
                reset_token: None,
                reset_expires_at: None,
            },
        );
        Ok(instructor)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Instructor>, RepositoryError> {
        let guard = self.table.lock().expect("instructor table poisoned");
        Ok(guard.rows.get(&id).map(|row| row.instructor.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Instructor>, RepositoryError> {
        Ok(self.select(|i| i.email == email).into_iter().next())
    }

    async fn find_credentials(
        &self,
        email: &str,
    ) -> Result<Option<InstructorCredentials>, RepositoryError> {
        let guard = self.table.lock().expect("instructor table poisoned");
        Ok(guard
            .rows
            .values()
            .find(|row| row.instructor.email == email)
            .map(|row| InstructorCredentials {
                id: row.instructor.id,
                password_hash: row.password_hash.clone(),
            }))
    }

    async fn search(
        &self,
        post_code: &str,
        transmission: &str,
    ) -> Result<Vec<Instructor>, RepositoryError> {
        let needle = transmission.to_lowercase();
        Ok(self.select(|i| {
            i.serves_postcode(post_code) && i.transmission_type.to_lowercase().contains(&needle)
        }))
    }

    async fn find_with_expired_licenses(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Instructor>, RepositoryError> {
        Ok(self.select(|i| i.has_expired_license(now)))
    }

    async fn update_profile(
        &self,
        id: i64,
        update: &ProfileUpdate,
    ) -> Result<Option<Instructor>, RepositoryError> {
        Ok(self.mutate(id, |row| update.apply(&mut row.instructor)))
    }

    async fn set_avatar(&self, id: i64, url: &str) -> Result<Option<Instructor>, RepositoryError> {
        Ok(self.mutate(id, |row| row.instructor.avatar = Some(url.to_string())))
    }

    async fn set_available(
        &self,
        id: i64,
        available: bool,
    ) -> Result<Option<Instructor>, RepositoryError> {
        Ok(self.mutate(id, |row| row.instructor.available = available))
    }

    async fn push_review(
        &self,
        id: i64,
        review: &Review,
    ) -> Result<Option<Instructor>, RepositoryError> {
        Ok(self.mutate(id, |row| row.instructor.reviews.push(review.clone())))
    }

    async fn push_closed_event(
        &self,
        id: i64,
        event: &ClosedEvent,
    ) -> Result<Option<Instructor>, RepositoryError> {
        Ok(self.mutate(id, |row| row.instructor.closed_events.push(event.clone())))
    }

    async fn remove_closed_event(
        &self,
        id: i64,
        event_id: Uuid,
    ) -> Result<Option<Instructor>, RepositoryError> {
        let mut guard = self.table.lock().expect("instructor table poisoned");
        let Some(row) = guard.rows.get_mut(&id) else {
            return Ok(None);
        };
        if remove_closed_event(&mut row.instructor.closed_events, event_id).is_none() {
            return Ok(None);
        }
        row.instructor.updated_at = Utc::now();
        Ok(Some(row.instructor.clone()))
    }

    async fn store_reset_token(
        &self,
        id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        self.mutate(id, |row| {
            row.reset_token = Some(token.to_string());
            row.reset_expires_at = Some(expires_at);
        });
        Ok(())
    }

    async fn find_reset_ticket(
        &self,
        token: &str,
    ) -> Result<Option<PasswordResetTicket>, RepositoryError> {
        let guard = self.table.lock().expect("instructor table poisoned");
        Ok(guard.rows.values().find_map(|row| {
            match (&row.reset_token, row.reset_expires_at) {
                (Some(stored), Some(expires_at)) if stored == token => Some(PasswordResetTicket {
                    instructor_id: row.instructor.id,
                    token: stored.clone(),
                    expires_at,
                }),
                _ => None,
            }
        }))
    }

    async fn complete_password_reset(
        &self,
        id: i64,
        token: &str,
        password_hash: &str,
        fallback_availability: &[AvailabilityDay],
    ) -> Result<bool, RepositoryError> {
        let mut guard = self.table.lock().expect("instructor table poisoned");
        let Some(row) = guard.rows.get_mut(&id) else {
            return Ok(false);
        };
        if row.reset_token.as_deref() != Some(token) {
            return Ok(false);
        }

        row.password_hash = password_hash.to_string();
        row.reset_token = None;
        row.reset_expires_at = None;
        if row.instructor.availability.is_empty() {
            row.instructor.availability = fallback_availability.to_vec();
        }
        row.instructor.updated_at = Utc::now();
        Ok(true)
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemorySuburbRepository {
    suburbs: Arc<Vec<Suburb>>,
}

impl InMemorySuburbRepository {
    pub fn new(suburbs: Vec<Suburb>) -> Self {
        Self { suburbs: Arc::new(suburbs) }
    }
}

#[async_trait]
impl SuburbRepository for InMemorySuburbRepository {
    async fn list_all(&self) -> Result<Vec<Suburb>, RepositoryError> {
        Ok(self.suburbs.as_ref().clone())
    }

    async fn search_by_name(&self, keyword: &str) -> Result<Vec<Suburb>, RepositoryError> {
        let needle = keyword.to_lowercase();
        Ok(self
            .suburbs
            .iter()
            .filter(|s| s.suburb.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn find_by_postcode(&self, postcode: i32) -> Result<Vec<Suburb>, RepositoryError> {
        Ok(self
            .suburbs
            .iter()
            .filter(|s| s.postcode == postcode)
            .cloned()
            .collect())
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryBookingRepository {
    bookings: Arc<Mutex<BTreeMap<i64, Booking>>>,
}

impl InMemoryBookingRepository {
    pub fn new(bookings: Vec<Booking>) -> Self {
        let map = bookings.into_iter().map(|b| (b.id, b)).collect();
        Self { bookings: Arc::new(Mutex::new(map)) }
    }

    pub fn get(&self, id: i64) -> Option<Booking> {
        self.bookings.lock().expect("booking table poisoned").get(&id).cloned()
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Booking>, RepositoryError> {
        Ok(self.get(id))
    }

    async fn mark_reviewed(&self, id: i64) -> Result<bool, RepositoryError> {
        let mut guard = self.bookings.lock().expect("booking table poisoned");
        match guard.get_mut(&id) {
            Some(booking) if !booking.reviewed => {
                booking.reviewed = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
