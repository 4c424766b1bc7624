use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Public view of an instructor account.
///
/// Credentials (password hash, reset token and its expiry) are deliberately
/// absent from this type so they can never leak through a JSON response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Instructor {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: String,
    pub gender: String,
    pub available: bool,
    pub transmission_type: String,
    pub languages: Vec<String>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub reviews: Vec<Review>,
    pub car: Car,
    pub service_suburbs: ServiceSuburbs,
    pub driving_license_expire: DateTime<Utc>,
    pub instructor_license_expire: DateTime<Utc>,
    pub children_check_license_expire: DateTime<Utc>,
    pub has_gst: bool,
    pub bank_account_number: String,
    pub bsb_number: String,
    pub abn_number: String,
    pub invoice_address: String,
    pub user_type: String,
    pub availability: Vec<AvailabilityDay>,
    pub closed_events: Vec<ClosedEvent>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Instructor {
    /// True when any of the three licences expires at or before `now`.
    pub fn has_expired_license(&self, now: DateTime<Utc>) -> bool {
        self.driving_license_expire <= now
            || self.instructor_license_expire <= now
            || self.children_check_license_expire <= now
    }

    pub fn serves_postcode(&self, post_code: &str) -> bool {
        self.service_suburbs
            .suburbs
            .iter()
            .any(|suburb| suburb.post_code == post_code)
    }
}

/// What learners and other instructors may see. Contact, personal and
/// payment details stay on `Instructor`, which only its owner receives.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicInstructor {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub available: bool,
    pub transmission_type: String,
    pub languages: Vec<String>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub reviews: Vec<Review>,
    pub car: Car,
    pub service_suburbs: ServiceSuburbs,
    pub driving_license_expire: DateTime<Utc>,
    pub instructor_license_expire: DateTime<Utc>,
    pub children_check_license_expire: DateTime<Utc>,
    pub user_type: String,
    pub availability: Vec<AvailabilityDay>,
    pub closed_events: Vec<ClosedEvent>,
}

impl From<Instructor> for PublicInstructor {
    fn from(instructor: Instructor) -> Self {
        PublicInstructor {
            id: instructor.id,
            first_name: instructor.first_name,
            last_name: instructor.last_name,
            gender: instructor.gender,
            available: instructor.available,
            transmission_type: instructor.transmission_type,
            languages: instructor.languages,
            avatar: instructor.avatar,
            bio: instructor.bio,
            reviews: instructor.reviews,
            car: instructor.car,
            service_suburbs: instructor.service_suburbs,
            driving_license_expire: instructor.driving_license_expire,
            instructor_license_expire: instructor.instructor_license_expire,
            children_check_license_expire: instructor.children_check_license_expire,
            user_type: instructor.user_type,
            availability: instructor.availability,
            closed_events: instructor.closed_events,
        }
    }
}

pub fn public_view(instructors: Vec<Instructor>) -> Vec<PublicInstructor> {
    instructors.into_iter().map(PublicInstructor::from).collect()
}

/// Everything needed to insert a new instructor row.
#[derive(Debug, Clone)]
pub struct NewInstructor {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: String,
    pub gender: String,
    pub password_hash: String,
    pub available: bool,
    pub transmission_type: String,
    pub languages: Vec<String>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub car: Car,
    pub service_suburbs: ServiceSuburbs,
    pub driving_license_expire: DateTime<Utc>,
    pub instructor_license_expire: DateTime<Utc>,
    pub children_check_license_expire: DateTime<Utc>,
    pub has_gst: bool,
    pub bank_account_number: String,
    pub bsb_number: String,
    pub abn_number: String,
    pub invoice_address: String,
    pub availability: Vec<AvailabilityDay>,
}

/// Id and password hash, fetched only by the login path.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InstructorCredentials {
    pub id: i64,
    pub password_hash: String,
}

/// A pending password reset as stored on the instructor row.
#[derive(Debug, Clone, PartialEq)]
pub struct PasswordResetTicket {
    pub instructor_id: i64,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Allow-listed profile changes. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub transmission_type: Option<String>,
    pub languages: Option<Vec<String>>,
    pub bio: Option<String>,
    pub car: Option<Car>,
    pub service_suburbs: Option<ServiceSuburbs>,
    pub availability: Option<Vec<AvailabilityDay>>,
    pub driving_license_expire: Option<DateTime<Utc>>,
    pub instructor_license_expire: Option<DateTime<Utc>>,
    pub children_check_license_expire: Option<DateTime<Utc>>,
    pub has_gst: Option<bool>,
    pub bank_account_number: Option<String>,
    pub bsb_number: Option<String>,
    pub abn_number: Option<String>,
    pub invoice_address: Option<String>,
}

impl ProfileUpdate {
    pub fn apply(&self, instructor: &mut Instructor) {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *target = v.clone();
            }
        }

        set(&mut instructor.first_name, &self.first_name);
        set(&mut instructor.last_name, &self.last_name);
        set(&mut instructor.phone, &self.phone);
        set(&mut instructor.date_of_birth, &self.date_of_birth);
        set(&mut instructor.gender, &self.gender);
        set(&mut instructor.transmission_type, &self.transmission_type);
        set(&mut instructor.languages, &self.languages);
        if self.bio.is_some() {
            instructor.bio = self.bio.clone();
        }
        set(&mut instructor.car, &self.car);
        set(&mut instructor.service_suburbs, &self.service_suburbs);
        set(&mut instructor.availability, &self.availability);
        set(&mut instructor.driving_license_expire, &self.driving_license_expire);
        set(&mut instructor.instructor_license_expire, &self.instructor_license_expire);
        set(&mut instructor.children_check_license_expire, &self.children_check_license_expire);
        set(&mut instructor.has_gst, &self.has_gst);
        set(&mut instructor.bank_account_number, &self.bank_account_number);
        set(&mut instructor.bsb_number, &self.bsb_number);
        set(&mut instructor.abn_number, &self.abn_number);
        set(&mut instructor.invoice_address, &self.invoice_address);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub number_plate: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct ServiceSuburbs {
    #[serde(default)]
    #[validate(nested)]
    pub suburbs: Vec<ServiceSuburb>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSuburb {
    #[validate(length(min = 1, message = "Suburb name cannot be empty"))]
    pub name: String,
    #[serde(deserialize_with = "post_code_text")]
    #[validate(length(min = 1, message = "Suburb postcode cannot be empty"))]
    pub post_code: String,
}

/// Postcodes arrive as `"2150"` or `2150`; both are stored as text.
fn post_code_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PostCode {
        Text(String),
        Number(u64),
    }

    Ok(match PostCode::deserialize(deserializer)? {
        PostCode::Text(text) => text,
        PostCode::Number(number) => number.to_string(),
    })
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Sunday,
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AvailabilityDay {
    pub day: Weekday,
    #[serde(default)]
    pub slots: Vec<TimeSlot>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
}

/// Weekly availability given to instructors who have none yet:
/// every day gets an empty slot followed by 6:00 AM to 10:00 PM.
pub fn default_week() -> Vec<AvailabilityDay> {
    Weekday::ALL
        .iter()
        .map(|day| AvailabilityDay {
            day: *day,
            slots: vec![
                TimeSlot::default(),
                TimeSlot {
                    start_time: "6:00 AM".to_string(),
                    end_time: "10:00 PM".to_string(),
                },
            ],
        })
        .collect()
}

/// Returns `availability` unchanged, or the default week when it is empty.
pub fn availability_or_default(availability: Vec<AvailabilityDay>) -> Vec<AvailabilityDay> {
    if availability.is_empty() {
        default_week()
    } else {
        availability
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClosedEvent {
    pub id: Uuid,
    pub event_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Removes the event with `id`, leaving every other event in place.
pub fn remove_closed_event(events: &mut Vec<ClosedEvent>, id: Uuid) -> Option<ClosedEvent> {
    let index = events.iter().position(|event| event.id == id)?;
    Some(events.remove(index))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub user: String,
    pub rating: f64,
    pub message: String,
}
