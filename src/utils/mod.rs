pub mod auth;
pub mod dates;
pub mod handler;
pub mod jwt;
pub mod multipart;
pub mod response;
pub mod validation;
