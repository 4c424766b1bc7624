use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::error::AppError;
use crate::models::instructor::{
    availability_or_default, AvailabilityDay, Car, NewInstructor, ServiceSuburbs,
};
use crate::utils::dates::deserialize_optional_timestamp;
use crate::utils::multipart::FormSpec;

/// How the registration multipart form maps onto `RegisterSchema`.
pub const REGISTER_FORM: FormSpec<'static> = FormSpec {
    file_field: "image",
    json_fields: &["car", "serviceSuburbs", "languages", "availability"],
    bool_fields: &["hasGst", "available"],
};

fn default_available() -> bool {
    true
}

// Request schema: text parts of the registration form
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterSchema {
    #[serde(default)]
    #[validate(length(min = 1, message = "First name cannot be empty"))]
    pub first_name: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Last name cannot be empty"))]
    pub last_name: String,

    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Phone cannot be empty"))]
    pub phone: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Date of birth cannot be empty"))]
    pub date_of_birth: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Gender cannot be empty"))]
    pub gender: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Transmission type cannot be empty"))]
    pub transmission_type: String,

    #[serde(default)]
    pub languages: Vec<String>,

    #[serde(default)]
    pub bio: Option<String>,

    #[serde(default)]
    pub car: Car,

    #[serde(default)]
    #[validate(nested)]
    pub service_suburbs: ServiceSuburbs,

    #[serde(default)]
    pub availability: Vec<AvailabilityDay>,

    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    #[validate(required(message = "Driving license expiry is required"))]
    pub driving_license_expire: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    #[validate(required(message = "Instructor license expiry is required"))]
    pub instructor_license_expire: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    #[validate(required(message = "Children check license expiry is required"))]
    pub children_check_license_expire: Option<DateTime<Utc>>,

    #[serde(default)]
    pub has_gst: bool,

    #[serde(default = "default_available")]
    pub available: bool,

    #[serde(default)]
    #[validate(length(min = 1, message = "Bank account number cannot be empty"))]
    pub bank_account_number: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "BSB number cannot be empty"))]
    pub bsb_number: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "ABN number cannot be empty"))]
    pub abn_number: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Invoice address cannot be empty"))]
    pub invoice_address: String,
}

fn required_date(value: Option<DateTime<Utc>>, field: &str) -> Result<DateTime<Utc>, AppError> {
    value.ok_or_else(|| AppError::invalid_field(field, "This field is required"))
}

impl RegisterSchema {
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }

    /// Builds the insert record. Empty availability becomes the default week.
    pub fn into_new_instructor(
        self,
        password_hash: String,
        avatar: String,
    ) -> Result<NewInstructor, AppError> {
        let email = self.normalized_email();
        Ok(NewInstructor {
            driving_license_expire: required_date(self.driving_license_expire, "driving_license_expire")?,
            instructor_license_expire: required_date(self.instructor_license_expire, "instructor_license_expire")?,
            children_check_license_expire: required_date(
                self.children_check_license_expire,
                "children_check_license_expire",
            )?,
            first_name: self.first_name,
            last_name: self.last_name,
            email,
            phone: self.phone,
            date_of_birth: self.date_of_birth,
            gender: self.gender,
            password_hash,
            available: self.available,
            transmission_type: self.transmission_type,
            languages: self.languages,
            avatar: Some(avatar),
            bio: self.bio.filter(|b| !b.trim().is_empty()),
            car: self.car,
            service_suburbs: self.service_suburbs,
            has_gst: self.has_gst,
            bank_account_number: self.bank_account_number,
            bsb_number: self.bsb_number,
            abn_number: self.abn_number,
            invoice_address: self.invoice_address,
            availability: availability_or_default(self.availability),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid() -> serde_json::Value {
        json!({
            "firstName": "Sam",
            "lastName": "Lee",
            "email": "Sam.Lee@Example.COM",
            "password": "secret1",
            "phone": "0400000000",
            "dateOfBirth": "1990-01-01",
            "gender": "female",
            "transmissionType": "Auto",
            "languages": ["English"],
            "serviceSuburbs": { "suburbs": [{ "name": "Parramatta", "postCode": "2150" }] },
            "drivingLicenseExpire": "2030-01-01",
            "instructorLicenseExpire": "2030-01-01",
            "childrenCheckLicenseExpire": "2030-01-01",
            "hasGst": true,
            "bankAccountNumber": "12345678",
            "bsbNumber": "062000",
            "abnNumber": "51824753556",
            "invoiceAddress": "1 George St"
        })
    }

    #[test]
    fn valid_form_builds_instructor_with_defaults() {
        let schema: RegisterSchema = serde_json::from_value(valid()).unwrap();
        assert!(schema.validate().is_ok());
        let new = schema.into_new_instructor("hash".into(), "http://img/1.png".into()).unwrap();
        assert_eq!(new.email, "sam.lee@example.com");
        assert!(new.available);
        assert_eq!(new.availability.len(), 7);
        assert_eq!(new.avatar.as_deref(), Some("http://img/1.png"));
    }

    #[test]
    fn missing_licence_date_fails_validation() {
        let mut body = valid();
        body.as_object_mut().unwrap().remove("instructorLicenseExpire");
        let schema: RegisterSchema = serde_json::from_value(body).unwrap();
        let errors = schema.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("instructor_license_expire"));
    }

    #[test]
    fn short_password_and_bad_email_are_reported() {
        let mut body = valid();
        body["password"] = json!("123");
        body["email"] = json!("not-an-email");
        let schema: RegisterSchema = serde_json::from_value(body).unwrap();
        let fields = schema.validate().unwrap_err();
        let fields = fields.field_errors();
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("email"));
    }
}
