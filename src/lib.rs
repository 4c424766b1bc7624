pub mod config;
pub mod error;
pub mod routes;
pub mod handlers;
pub mod schemas;
pub mod services;
pub mod utils;
pub mod middlewares;
pub mod models;
pub mod repositories;
pub mod state;

pub mod app;

pub use app::{build_router, create_app};
pub use state::AppState;
