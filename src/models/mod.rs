pub mod booking;
pub mod instructor;
pub mod suburb;
