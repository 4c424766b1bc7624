//! Side-effecting collaborators (image host, mail) and small pure helpers
//! used by the handlers.

pub mod images;
pub mod mail;
pub mod ratings;
pub mod reset_token;
