use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::MySqlPool;
use uuid::Uuid;

use super::{contains_pattern, BookingRepository, InstructorRepository, RepositoryError, SuburbRepository};
use crate::models::booking::Booking;
use crate::models::instructor::{
    AvailabilityDay, Car, ClosedEvent, Instructor, InstructorCredentials, NewInstructor,
    PasswordResetTicket, ProfileUpdate, Review, ServiceSuburbs,
};
use crate::models::suburb::Suburb;

const INSTRUCTOR_COLUMNS: &str = r#"
    id, first_name, last_name, email, phone, date_of_birth, gender, available,
    transmission_type, languages, avatar, bio, reviews, car, service_suburbs,
    driving_license_expire, instructor_license_expire, children_check_license_expire,
    has_gst, bank_account_number, bsb_number, abn_number, invoice_address, user_type,
    availability, closed_events, created_at, updated_at
"#;

#[derive(sqlx::FromRow)]
struct InstructorRow {
    id: i64,
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    date_of_birth: String,
    gender: String,
    available: bool,
    transmission_type: String,
    languages: Json<Vec<String>>,
    avatar: Option<String>,
    bio: Option<String>,
    reviews: Json<Vec<Review>>,
    car: Json<Car>,
    service_suburbs: Json<ServiceSuburbs>,
    driving_license_expire: DateTime<Utc>,
    instructor_license_expire: DateTime<Utc>,
    children_check_license_expire: DateTime<Utc>,
    has_gst: bool,
    bank_account_number: String,
    bsb_number: String,
    abn_number: String,
    invoice_address: String,
    user_type: String,
    availability: Json<Vec<AvailabilityDay>>,
    closed_events: Json<Vec<ClosedEvent>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<InstructorRow> for Instructor {
    fn from(row: InstructorRow) -> Self {
        Instructor {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            date_of_birth: row.date_of_birth,
            gender: row.gender,
            available: row.available,
            transmission_type: row.transmission_type,
            languages: row.languages.0,
            avatar: row.avatar,
            bio: row.bio,
            reviews: row.reviews.0,
            car: row.car.0,
            service_suburbs: row.service_suburbs.0,
            driving_license_expire: row.driving_license_expire,
            instructor_license_expire: row.instructor_license_expire,
            children_check_license_expire: row.children_check_license_expire,
            has_gst: row.has_gst,
            bank_account_number: row.bank_account_number,
            bsb_number: row.bsb_number,
            abn_number: row.abn_number,
            invoice_address: row.invoice_address,
            user_type: row.user_type,
            availability: row.availability.0,
            closed_events: row.closed_events.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn select_instructors(condition: &str) -> String {
    format!(
        "SELECT {} FROM instructors WHERE {} ORDER BY id",
        INSTRUCTOR_COLUMNS, condition
    )
}

fn to_json_text<T: serde::Serialize>(value: &T) -> Result<String, RepositoryError> {
    serde_json::to_string(value).map_err(|e| RepositoryError::Corrupt(e.to_string()))
}

fn is_duplicate_key(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.is_unique_violation() || db_err.message().to_lowercase().contains("duplicate")
        }
        _ => false,
    }
}

#[derive(Clone)]
pub struct MySqlInstructorRepository {
    pool: MySqlPool,
}

impl MySqlInstructorRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InstructorRepository for MySqlInstructorRepository {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    async fn create(&self, new: NewInstructor) -> Result<Instructor, RepositoryError> {
        let result = sqlx::query(
            r#"
            INSERT INTO instructors (
                first_name, last_name, email, phone, date_of_birth, gender, password,
                available, transmission_type, languages, avatar, bio, reviews, car,
                service_suburbs, driving_license_expire, instructor_license_expire,
                children_check_license_expire, has_gst, bank_account_number, bsb_number,
                abn_number, invoice_address, availability, closed_events
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, JSON_ARRAY(), ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, JSON_ARRAY())
            "#,
        )
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.date_of_birth)
        .bind(&new.gender)
        .bind(&new.password_hash)
        .bind(new.available)
        .bind(&new.transmission_type)
        .bind(Json(&new.languages))
        .bind(&new.avatar)
        .bind(&new.bio)
        .bind(Json(&new.car))
        .bind(Json(&new.service_suburbs))
        .bind(new.driving_license_expire)
        .bind(new.instructor_license_expire)
        .bind(new.children_check_license_expire)
        .bind(new.has_gst)
        .bind(&new.bank_account_number)
        .bind(&new.bsb_number)
        .bind(&new.abn_number)
        .bind(&new.invoice_address)
        .bind(Json(&new.availability))
        .execute(&self.pool)
        .await;

        let id = match result {
            Ok(res) => res.last_insert_id() as i64,
            Err(e) if is_duplicate_key(&e) => {
                return Err(RepositoryError::Conflict("Email already registered".to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::Corrupt(format!("instructor {} vanished after insert", id)))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Instructor>, RepositoryError> {
        let sql = select_instructors("id = ?");
        let row = sqlx::query_as::<_, InstructorRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Instructor::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Instructor>, RepositoryError> {
        let sql = select_instructors("email = ?");
        let row = sqlx::query_as::<_, InstructorRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Instructor::from))
    }

    async fn find_credentials(
        &self,
        email: &str,
    ) -> Result<Option<InstructorCredentials>, RepositoryError> {
        let creds = sqlx::query_as::<_, InstructorCredentials>(
            "SELECT id, password AS password_hash FROM instructors WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(creds)
    }

    async fn search(
        &self,
        post_code: &str,
        transmission: &str,
    ) -> Result<Vec<Instructor>, RepositoryError> {
        let sql = select_instructors(
            "JSON_CONTAINS(service_suburbs, JSON_OBJECT('postCode', ?), '$.suburbs') \
             AND LOWER(transmission_type) LIKE ?",
        );
        let rows = sqlx::query_as::<_, InstructorRow>(&sql)
            .bind(post_code)
            .bind(contains_pattern(&transmission.to_lowercase()))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Instructor::from).collect())
    }

    async fn find_with_expired_licenses(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Instructor>, RepositoryError> {
        let sql = select_instructors(
            "driving_license_expire <= ? OR instructor_license_expire <= ? \
             OR children_check_license_expire <= ?",
        );
        let rows = sqlx::query_as::<_, InstructorRow>(&sql)
            .bind(now)
            .bind(now)
            .bind(now)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Instructor::from).collect())
    }

    async fn update_profile(
        &self,
        id: i64,
        update: &ProfileUpdate,
    ) -> Result<Option<Instructor>, RepositoryError> {
        sqlx::query(
            r#"
            UPDATE instructors SET
                first_name = COALESCE(?, first_name),
                last_name = COALESCE(?, last_name),
                phone = COALESCE(?, phone),
                date_of_birth = COALESCE(?, date_of_birth),
                gender = COALESCE(?, gender),
                transmission_type = COALESCE(?, transmission_type),
                languages = COALESCE(CAST(? AS JSON), languages),
                bio = COALESCE(?, bio),
                car = COALESCE(CAST(? AS JSON), car),
                service_suburbs = COALESCE(CAST(? AS JSON), service_suburbs),
                availability = COALESCE(CAST(? AS JSON), availability),
                driving_license_expire = COALESCE(?, driving_license_expire),
                instructor_license_expire = COALESCE(?, instructor_license_expire),
                children_check_license_expire = COALESCE(?, children_check_license_expire),
                has_gst = COALESCE(?, has_gst),
                bank_account_number = COALESCE(?, bank_account_number),
                bsb_number = COALESCE(?, bsb_number),
                abn_number = COALESCE(?, abn_number),
                invoice_address = COALESCE(?, invoice_address)
            WHERE id = ?
            "#,
        )
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.phone)
        .bind(&update.date_of_birth)
        .bind(&update.gender)
        .bind(&update.transmission_type)
        .bind(update.languages.as_ref().map(to_json_text).transpose()?)
        .bind(&update.bio)
        .bind(update.car.as_ref().map(to_json_text).transpose()?)
        .bind(update.service_suburbs.as_ref().map(to_json_text).transpose()?)
        .bind(update.availability.as_ref().map(to_json_text).transpose()?)
        .bind(update.driving_license_expire)
        .bind(update.instructor_license_expire)
        .bind(update.children_check_license_expire)
        .bind(update.has_gst)
        .bind(&update.bank_account_number)
        .bind(&update.bsb_number)
        .bind(&update.abn_number)
        .bind(&update.invoice_address)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id).await
    }

    async fn set_avatar(&self, id: i64, url: &str) -> Result<Option<Instructor>, RepositoryError> {
        sqlx::query("UPDATE instructors SET avatar = ? WHERE id = ?")
            .bind(url)
            .bind(id)
            .execute(&self.pool)
            .await?;
        self.find_by_id(id).await
    }

    async fn set_available(
        &self,
        id: i64,
        available: bool,
    ) -> Result<Option<Instructor>, RepositoryError> {
        sqlx::query("UPDATE instructors SET available = ? WHERE id = ?")
            .bind(available)
            .bind(id)
            .execute(&self.pool)
            .await?;
        self.find_by_id(id).await
    }

    async fn push_review(
        &self,
        id: i64,
        review: &Review,
    ) -> Result<Option<Instructor>, RepositoryError> {
        sqlx::query("UPDATE instructors SET reviews = JSON_ARRAY_APPEND(reviews, '$', CAST(? AS JSON)) WHERE id = ?")
            .bind(to_json_text(review)?)
            .bind(id)
            .execute(&self.pool)
            .await?;
        self.find_by_id(id).await
    }

    async fn push_closed_event(
        &self,
        id: i64,
        event: &ClosedEvent,
    ) -> Result<Option<Instructor>, RepositoryError> {
        sqlx::query(
            "UPDATE instructors SET closed_events = JSON_ARRAY_APPEND(closed_events, '$', CAST(? AS JSON)) WHERE id = ?",
        )
        .bind(to_json_text(event)?)
        .bind(id)
        .execute(&self.pool)
        .await?;
        self.find_by_id(id).await
    }

    async fn remove_closed_event(
        &self,
        id: i64,
        event_id: Uuid,
    ) -> Result<Option<Instructor>, RepositoryError> {
        // JSON_SEARCH yields "$[n].id"; the element path is the part before ".id"
        let result = sqlx::query(
            r#"
            UPDATE instructors SET closed_events = JSON_REMOVE(
                closed_events,
                SUBSTRING_INDEX(JSON_UNQUOTE(JSON_SEARCH(closed_events, 'one', ?, NULL, '$[*].id')), '.', 1)
            )
            WHERE id = ? AND JSON_SEARCH(closed_events, 'one', ?, NULL, '$[*].id') IS NOT NULL
            "#,
        )
        .bind(event_id.to_string())
        .bind(id)
        .bind(event_id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn store_reset_token(
        &self,
        id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE instructors SET reset_password_token = ?, reset_password_expires_at = ? WHERE id = ?",
        )
        .bind(token)
        .bind(expires_at)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_reset_ticket(
        &self,
        token: &str,
    ) -> Result<Option<PasswordResetTicket>, RepositoryError> {
        let row: Option<(i64, String, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT id, reset_password_token, reset_password_expires_at
            FROM instructors
            WHERE reset_password_token = ? AND reset_password_expires_at IS NOT NULL
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(instructor_id, token, expires_at)| PasswordResetTicket {
            instructor_id,
            token,
            expires_at,
        }))
    }

    async fn complete_password_reset(
        &self,
        id: i64,
        token: &str,
        password_hash: &str,
        fallback_availability: &[AvailabilityDay],
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE instructors SET
                password = ?,
                reset_password_token = NULL,
                reset_password_expires_at = NULL,
                availability = CASE
                    WHEN JSON_LENGTH(availability) = 0 THEN CAST(? AS JSON)
                    ELSE availability
                END
            WHERE id = ? AND reset_password_token = ?
            "#,
        )
        .bind(password_hash)
        .bind(to_json_text(&fallback_availability)?)
        .bind(id)
        .bind(token)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}

#[derive(Clone)]
pub struct MySqlSuburbRepository {
    pool: MySqlPool,
}

impl MySqlSuburbRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SuburbRepository for MySqlSuburbRepository {
    async fn list_all(&self) -> Result<Vec<Suburb>, RepositoryError> {
        let suburbs = sqlx::query_as::<_, Suburb>(
            "SELECT id, suburb, state, postcode, price FROM suburbs ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(suburbs)
    }

    async fn search_by_name(&self, keyword: &str) -> Result<Vec<Suburb>, RepositoryError> {
        let suburbs = sqlx::query_as::<_, Suburb>(
            "SELECT id, suburb, state, postcode, price FROM suburbs WHERE LOWER(suburb) LIKE ? ORDER BY id",
        )
        .bind(contains_pattern(&keyword.to_lowercase()))
        .fetch_all(&self.pool)
        .await?;
        Ok(suburbs)
    }

    async fn find_by_postcode(&self, postcode: i32) -> Result<Vec<Suburb>, RepositoryError> {
        let suburbs = sqlx::query_as::<_, Suburb>(
            "SELECT id, suburb, state, postcode, price FROM suburbs WHERE postcode = ? ORDER BY id",
        )
        .bind(postcode)
        .fetch_all(&self.pool)
        .await?;
        Ok(suburbs)
    }
}

#[derive(Clone)]
pub struct MySqlBookingRepository {
    pool: MySqlPool,
}

impl MySqlBookingRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for MySqlBookingRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Booking>, RepositoryError> {
        let booking = sqlx::query_as::<_, Booking>(
            "SELECT id, instructor_id, learner_name, reviewed FROM bookings WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(booking)
    }

    async fn mark_reviewed(&self, id: i64) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE bookings SET reviewed = TRUE WHERE id = ? AND reviewed = FALSE")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}
