pub mod auth_routes;
pub mod instructor_routes;
pub mod suburb_routes;
