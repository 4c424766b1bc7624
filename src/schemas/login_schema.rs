use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::instructor::Instructor;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct LoginSchema {
    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponseSchema {
    pub instructor: Instructor,
    pub token: String,
}
