//! Persistence behind a single trait so handlers never depend on the backing
//! technology. Two implementations: a durable Postgres store and an
//! in-memory store for environments without a database, selected at startup
//! by whether `DATABASE_URL` is configured.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::model::{LodgeBooking, User, UserType};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Bookings listings never return more than this many records.
pub const BOOKING_LIST_LIMIT: i64 = 200;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique key already exists; carries the wire name of the field.
    #[error("duplicate value for {0}")]
    Duplicate(&'static str),
    /// The store cannot be reached. Recoverable by operator action only.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// Any other backend failure.
    #[error("store failure: {0}")]
    Backend(String),
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Inserts a new user. Fails with `Duplicate("email")` when an account
    /// with the same (normalized) email already exists.
    async fn insert_user(&self, user: User) -> Result<User, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Login lookup: a user matches only on both email and account kind.
    async fn find_user_for_login(
        &self,
        email: &str,
        user_type: UserType,
    ) -> Result<Option<User>, StoreError>;

    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    async fn count_users(&self, user_type: Option<UserType>) -> Result<i64, StoreError>;

    /// Inserts a booking. Fails with `Duplicate("bookingId")` when the
    /// booking identifier is already taken.
    async fn insert_booking(&self, booking: LodgeBooking) -> Result<LodgeBooking, StoreError>;

    /// Newest-first listing, optionally filtered by owner, capped at `limit`.
    async fn list_bookings(
        &self,
        user_id: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<LodgeBooking>, StoreError>;

    /// Connectivity probe for the status endpoint.
    async fn ping(&self) -> Result<(), StoreError>;

    fn backend_name(&self) -> &'static str;
}

pub type SharedStore = Arc<dyn Store>;
