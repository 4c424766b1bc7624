use std::sync::Arc;

use sqlx::MySqlPool;

use crate::config::AppConfig;
use crate::middlewares::rate_limiter::RateLimiter;
use crate::repositories::mysql::{
    MySqlBookingRepository, MySqlInstructorRepository, MySqlSuburbRepository,
};
use crate::repositories::{BookingRepository, InstructorRepository, SuburbRepository};
use crate::services::images::{image_store_from_config, ImageStore};
use crate::services::mail::{mailer_from_config, Mailer};

/// Shared resources handed to every request through an `Extension` layer.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub instructors: Arc<dyn InstructorRepository>,
    pub suburbs: Arc<dyn SuburbRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub images: Arc<dyn ImageStore>,
    pub mailer: Arc<dyn Mailer>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        instructors: Arc<dyn InstructorRepository>,
        suburbs: Arc<dyn SuburbRepository>,
        bookings: Arc<dyn BookingRepository>,
        images: Arc<dyn ImageStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let rate_limiter = Arc::new(RateLimiter::new(config.rate_limit));
        Self {
            config: Arc::new(config),
            instructors,
            suburbs,
            bookings,
            images,
            mailer,
            rate_limiter,
        }
    }

    /// Production wiring: MySQL repositories plus the configured image host and mailer.
    pub fn with_mysql(config: AppConfig, pool: MySqlPool) -> Self {
        let images = image_store_from_config(&config.images);
        let mailer = mailer_from_config(&config.mail);
        Self::new(
            config,
            Arc::new(MySqlInstructorRepository::new(pool.clone())),
            Arc::new(MySqlSuburbRepository::new(pool.clone())),
            Arc::new(MySqlBookingRepository::new(pool)),
            images,
            mailer,
        )
    }
}
