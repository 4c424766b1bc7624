use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::models::instructor::{AvailabilityDay, Car, ProfileUpdate, ServiceSuburbs};
use crate::utils::dates::deserialize_optional_timestamp;
use crate::utils::multipart::FormSpec;

pub const AVATAR_FORM: FormSpec<'static> = FormSpec {
    file_field: "image",
    json_fields: &[],
    bool_fields: &[],
};

/// Fields an instructor may change on their own profile. Anything else in
/// the body (email, password, avatar, reviews, ...) is ignored.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EditProfileSchema {
    #[validate(length(min = 1, message = "First name cannot be empty"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, message = "Last name cannot be empty"))]
    pub last_name: Option<String>,

    #[validate(length(min = 1, message = "Phone cannot be empty"))]
    pub phone: Option<String>,

    pub date_of_birth: Option<String>,
    pub gender: Option<String>,

    #[validate(length(min = 1, message = "Transmission type cannot be empty"))]
    pub transmission_type: Option<String>,

    pub languages: Option<Vec<String>>,
    pub bio: Option<String>,
    pub car: Option<Car>,

    #[validate(nested)]
    pub service_suburbs: Option<ServiceSuburbs>,

    pub availability: Option<Vec<AvailabilityDay>>,

    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub driving_license_expire: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub instructor_license_expire: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub children_check_license_expire: Option<DateTime<Utc>>,

    pub has_gst: Option<bool>,
    pub bank_account_number: Option<String>,
    pub bsb_number: Option<String>,
    pub abn_number: Option<String>,
    pub invoice_address: Option<String>,
}

impl From<EditProfileSchema> for ProfileUpdate {
    fn from(s: EditProfileSchema) -> Self {
        ProfileUpdate {
            first_name: s.first_name,
            last_name: s.last_name,
            phone: s.phone,
            date_of_birth: s.date_of_birth,
            gender: s.gender,
            transmission_type: s.transmission_type,
            languages: s.languages,
            bio: s.bio,
            car: s.car,
            service_suburbs: s.service_suburbs,
            availability: s.availability,
            driving_license_expire: s.driving_license_expire,
            instructor_license_expire: s.instructor_license_expire,
            children_check_license_expire: s.children_check_license_expire,
            has_gst: s.has_gst,
            bank_account_number: s.bank_account_number,
            bsb_number: s.bsb_number,
            abn_number: s.abn_number,
            invoice_address: s.invoice_address,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AvailabilitySchema {
    pub available: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub language: Option<String>,
}

impl SearchQuery {
    /// The language filter to apply, if any. Empty and `all` mean no filter.
    pub fn language_filter(&self) -> Option<&str> {
        self.language
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.eq_ignore_ascii_case("all"))
    }
}
