//! Durable store on Postgres via sqlx. The pool is created lazily so the
//! process starts even when the database is down; every operation that then
//! fails to reach the database surfaces as `StoreError::Unavailable`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::model::{DriverProfile, LodgeBooking, User, UserType};

use super::{Store, StoreError};

const CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    phone TEXT NOT NULL,
    user_type TEXT NOT NULL,
    license_number TEXT,
    drive_type TEXT,
    car_name TEXT,
    car_model TEXT,
    number_of_seats TEXT,
    car_type TEXT,
    location TEXT,
    car_photo TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

const CREATE_BOOKINGS: &str = r#"
CREATE TABLE IF NOT EXISTS lodge_bookings (
    id UUID PRIMARY KEY,
    user_id UUID,
    place_id TEXT NOT NULL,
    lodge_name TEXT NOT NULL,
    address TEXT NOT NULL DEFAULT '',
    lat DOUBLE PRECISION NOT NULL,
    lng DOUBLE PRECISION NOT NULL,
    check_in TEXT NOT NULL,
    check_out TEXT NOT NULL,
    room_number TEXT NOT NULL,
    booking_id TEXT NOT NULL UNIQUE,
    advance_amount DOUBLE PRECISION NOT NULL,
    payment_method TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

const USER_COLUMNS: &str = "id, name, email, password_hash, phone, user_type, \
     license_number, drive_type, car_name, car_model, number_of_seats, \
     car_type, location, car_photo, created_at";

const BOOKING_COLUMNS: &str = "id, user_id, place_id, lodge_name, address, lat, lng, \
     check_in, check_out, room_number, booking_id, advance_amount, \
     payment_method, created_at";

/// Flat row shape; the driver profile is reassembled in `into_user`.
#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    phone: String,
    user_type: String,
    license_number: Option<String>,
    drive_type: Option<String>,
    car_name: Option<String>,
    car_model: Option<String>,
    number_of_seats: Option<String>,
    car_type: Option<String>,
    location: Option<String>,
    car_photo: Option<String>,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, StoreError> {
        let user_type = UserType::parse(&self.user_type).ok_or_else(|| {
            StoreError::Backend(format!("unknown user_type in row: {}", self.user_type))
        })?;
        let driver = match user_type {
            UserType::Driver => Some(DriverProfile {
                license_number: self.license_number,
                drive_type: self.drive_type,
                car_name: self.car_name,
                car_model: self.car_model,
                number_of_seats: self.number_of_seats,
                car_type: self.car_type,
                location: self.location,
                car_photo: self.car_photo,
            }),
            UserType::Customer => None,
        };
        Ok(User {
            id: self.id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            phone: self.phone,
            user_type,
            driver,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct BookingRow {
    id: Uuid,
    user_id: Option<Uuid>,
    place_id: String,
    lodge_name: String,
    address: String,
    lat: f64,
    lng: f64,
    check_in: String,
    check_out: String,
    room_number: String,
    booking_id: String,
    advance_amount: f64,
    payment_method: String,
    created_at: DateTime<Utc>,
}

impl From<BookingRow> for LodgeBooking {
    fn from(row: BookingRow) -> Self {
        LodgeBooking {
            id: row.id,
            user_id: row.user_id,
            place_id: row.place_id,
            lodge_name: row.lodge_name,
            address: row.address,
            lat: row.lat,
            lng: row.lng,
            check_in: row.check_in,
            check_out: row.check_out,
            room_number: row.room_number,
            booking_id: row.booking_id,
            advance_amount: row.advance_amount,
            payment_method: row.payment_method,
            created_at: row.created_at,
        }
    }
}

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Builds the pool without touching the network; the first query
    /// establishes the actual connection.
    pub fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_lazy(database_url)
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(PgStore { pool })
    }

    /// Idempotent schema bootstrap. Safe to call on every startup; failure
    /// leaves the process running in degraded (503-answering) mode.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_USERS)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;
        sqlx::query(CREATE_BOOKINGS)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;
        Ok(())
    }
}

fn map_err(err: sqlx::Error) -> StoreError {
    match err {
        e @ (sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)) => StoreError::Unavailable(e.to_string()),
        e => StoreError::Backend(e.to_string()),
    }
}

/// Inserts have exactly one unique constraint besides the UUID primary key,
/// so a 23505 can be attributed to that field directly.
fn map_insert_err(err: sqlx::Error, unique_field: &'static str) -> StoreError {
    if let sqlx::Error::Database(ref db) = err {
        if db.code().as_deref() == Some("23505") {
            return StoreError::Duplicate(unique_field);
        }
    }
    map_err(err)
}

#[async_trait]
impl Store for PgStore {
    async fn insert_user(&self, user: User) -> Result<User, StoreError> {
        let driver = user.driver.clone().unwrap_or_default();
        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, phone, user_type, \
             license_number, drive_type, car_name, car_model, number_of_seats, \
             car_type, location, car_photo, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.phone)
        .bind(user.user_type.as_str())
        .bind(driver.license_number)
        .bind(driver.drive_type)
        .bind(driver.car_name)
        .bind(driver.car_model)
        .bind(driver.number_of_seats)
        .bind(driver.car_type)
        .bind(driver.location)
        .bind(driver.car_photo)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_err(e, "email"))?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)?;
        row.map(UserRow::into_user).transpose()
    }

    async fn find_user_for_login(
        &self,
        email: &str,
        user_type: UserType,
    ) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = $1 AND user_type = $2",
            USER_COLUMNS
        ))
        .bind(email)
        .bind(user_type.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)?;
        row.map(UserRow::into_user).transpose()
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users ORDER BY created_at",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)?;
        rows.into_iter().map(UserRow::into_user).collect()
    }

    async fn count_users(&self, user_type: Option<UserType>) -> Result<i64, StoreError> {
        let (count,): (i64,) = match user_type {
            Some(kind) => sqlx::query_as("SELECT COUNT(*) FROM users WHERE user_type = $1")
                .bind(kind.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(map_err)?,
            None => sqlx::query_as("SELECT COUNT(*) FROM users")
                .fetch_one(&self.pool)
                .await
                .map_err(map_err)?,
        };
        Ok(count)
    }

    async fn insert_booking(&self, booking: LodgeBooking) -> Result<LodgeBooking, StoreError> {
        sqlx::query(
            "INSERT INTO lodge_bookings (id, user_id, place_id, lodge_name, address, \
             lat, lng, check_in, check_out, room_number, booking_id, advance_amount, \
             payment_method, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(booking.id)
        .bind(booking.user_id)
        .bind(&booking.place_id)
        .bind(&booking.lodge_name)
        .bind(&booking.address)
        .bind(booking.lat)
        .bind(booking.lng)
        .bind(&booking.check_in)
        .bind(&booking.check_out)
        .bind(&booking.room_number)
        .bind(&booking.booking_id)
        .bind(booking.advance_amount)
        .bind(&booking.payment_method)
        .bind(booking.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_err(e, "bookingId"))?;
        Ok(booking)
    }

    async fn list_bookings(
        &self,
        user_id: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<LodgeBooking>, StoreError> {
        let rows = match user_id {
            Some(owner) => {
                sqlx::query_as::<_, BookingRow>(&format!(
                    "SELECT {} FROM lodge_bookings WHERE user_id = $1 \
                     ORDER BY created_at DESC LIMIT $2",
                    BOOKING_COLUMNS
                ))
                .bind(owner)
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, BookingRow>(&format!(
                    "SELECT {} FROM lodge_bookings ORDER BY created_at DESC LIMIT $1",
                    BOOKING_COLUMNS
                ))
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(map_err)?;
        Ok(rows.into_iter().map(LodgeBooking::from).collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(map_err)?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
