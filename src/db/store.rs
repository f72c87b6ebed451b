use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::Connection;

use super::queries;
use crate::models::{Booking, BookingStatus};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate booking id: {0}")]
    DuplicateId(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

/// Persistence collaborator for bookings.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Non-cancelled bookings on one property.
    async fn active_bookings_for_property(
        &self,
        property_id: &str,
    ) -> Result<Vec<Booking>, StoreError>;

    async fn insert_booking(&self, booking: &Booking) -> Result<(), StoreError>;

    /// Bookings created by `owner_id`, ordered by start date.
    async fn bookings_for_owner(
        &self,
        owner_id: &str,
        property_id: Option<&str>,
    ) -> Result<Vec<Booking>, StoreError>;

    async fn get_booking(&self, booking_id: &str) -> Result<Option<Booking>, StoreError>;

    /// Returns false when no booking has that id.
    async fn set_booking_status(
        &self,
        booking_id: &str,
        status: BookingStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;
}

pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("database connection poisoned".to_string()))
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T, StoreError> {
        let conn = self.lock()?;
        Ok(f(&conn)?)
    }
}

#[async_trait]
impl BookingStore for SqliteStore {
    async fn active_bookings_for_property(
        &self,
        property_id: &str,
    ) -> Result<Vec<Booking>, StoreError> {
        self.with_conn(|conn| queries::get_active_bookings_for_property(conn, property_id))
    }

    async fn insert_booking(&self, booking: &Booking) -> Result<(), StoreError> {
        let conn = self.lock()?;
        queries::insert_booking(&conn, booking).map_err(|e| match &e {
            rusqlite::Error::SqliteFailure(err, _)
                if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                StoreError::DuplicateId(booking.booking_id.clone())
            }
            _ => e.into(),
        })
    }

    async fn bookings_for_owner(
        &self,
        owner_id: &str,
        property_id: Option<&str>,
    ) -> Result<Vec<Booking>, StoreError> {
        self.with_conn(|conn| queries::get_bookings_for_owner(conn, owner_id, property_id))
    }

    async fn get_booking(&self, booking_id: &str) -> Result<Option<Booking>, StoreError> {
        self.with_conn(|conn| queries::get_booking_by_id(conn, booking_id))
    }

    async fn set_booking_status(
        &self,
        booking_id: &str,
        status: BookingStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        self.with_conn(|conn| queries::update_booking_status(conn, booking_id, status, &updated_at))
    }
}
