//! Process-local store for running without a database. Same uniqueness and
//! query contract as the Postgres store; everything is lost on restart.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::model::{LodgeBooking, User, UserType};

use super::{Store, StoreError};

#[derive(Default)]
struct Inner {
    /// Keyed by normalized email; the map key is the uniqueness guarantee.
    users: BTreeMap<String, User>,
    /// Keyed by booking identifier, tagged with an insertion sequence so
    /// "newest first" is stable even when timestamps collide.
    bookings: BTreeMap<String, (u64, LodgeBooking)>,
    next_seq: u64,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // Every mutation is a single map insert under the guard, so the data
        // stays consistent even if a panic poisoned the lock.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, user: User) -> Result<User, StoreError> {
        let mut inner = self.lock();
        if inner.users.contains_key(&user.email) {
            return Err(StoreError::Duplicate("email"));
        }
        inner.users.insert(user.email.clone(), user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.lock().users.get(email).cloned())
    }

    async fn find_user_for_login(
        &self,
        email: &str,
        user_type: UserType,
    ) -> Result<Option<User>, StoreError> {
        Ok(self
            .lock()
            .users
            .get(email)
            .filter(|u| u.user_type == user_type)
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.lock().users.values().cloned().collect())
    }

    async fn count_users(&self, user_type: Option<UserType>) -> Result<i64, StoreError> {
        let inner = self.lock();
        let count = match user_type {
            Some(kind) => inner.users.values().filter(|u| u.user_type == kind).count(),
            None => inner.users.len(),
        };
        Ok(count as i64)
    }

    async fn insert_booking(&self, booking: LodgeBooking) -> Result<LodgeBooking, StoreError> {
        let mut inner = self.lock();
        if inner.bookings.contains_key(&booking.booking_id) {
            return Err(StoreError::Duplicate("bookingId"));
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner
            .bookings
            .insert(booking.booking_id.clone(), (seq, booking.clone()));
        Ok(booking)
    }

    async fn list_bookings(
        &self,
        user_id: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<LodgeBooking>, StoreError> {
        let inner = self.lock();
        let mut matches: Vec<&(u64, LodgeBooking)> = inner
            .bookings
            .values()
            .filter(|(_, b)| match user_id {
                Some(owner) => b.user_id == Some(owner),
                None => true,
            })
            .collect();
        matches.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(matches
            .into_iter()
            .take(limit.max(0) as usize)
            .map(|(_, b)| b.clone())
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
