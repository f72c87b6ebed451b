//! Booking admission: decides whether a requested date range on a property
//! may become a confirmed booking, and persists the result.
//!
//! Admission for one property is serialized through [`PropertyLocks`], so the
//! overlap check and the insert behave as a single step even when requests
//! for the same property race.

use std::sync::Arc;

use chrono::{SubsecRound, Utc};
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::auth::Principal;
use crate::db::{BookingStore, StoreError};
use crate::ids::{entity_id, EntityKind};
use crate::models::{Booking, BookingStatus, CreateBookingRequest};
use crate::services::scheduling::{find_conflict, DateRange};

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Unauthorized access - invalid token")]
    Unauthorized,

    #[error("End date must be after start date")]
    InvalidRange,

    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    #[error("Slot already booked for this property.")]
    SlotConflict { conflicting_id: String },

    #[error("booking not found")]
    NotFound,

    #[error("booking id collision, please retry")]
    DuplicateId(String),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl From<StoreError> for BookingError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateId(id) => BookingError::DuplicateId(id),
            StoreError::Unavailable(msg) => BookingError::StorageUnavailable(msg),
        }
    }
}

/// One async mutex per property id. An entry is removed when its last lease
/// is released, so the map only holds properties with admissions in flight.
#[derive(Default)]
pub struct PropertyLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

/// Exclusive hold on one property; releasing it prunes the map entry.
struct PropertyLease<'a> {
    locks: &'a PropertyLocks,
    property_id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl PropertyLocks {
    async fn lock(&self, property_id: &str) -> PropertyLease<'_> {
        let mutex = self
            .locks
            .entry(property_id.to_string())
            .or_default()
            .clone();
        let mut lease = PropertyLease {
            locks: self,
            property_id: property_id.to_string(),
            guard: None,
        };
        lease.guard = Some(mutex.lock_owned().await);
        lease
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.len()
    }
}

impl Drop for PropertyLease<'_> {
    fn drop(&mut self) {
        self.guard.take();
        // Only the map's own handle left: nobody holds or awaits this mutex.
        self.locks
            .locks
            .remove_if(self.property_id.as_str(), |_, m| Arc::strong_count(m) == 1);
    }
}

pub struct BookingService {
    store: Arc<dyn BookingStore>,
    locks: PropertyLocks,
}

/// Validated form of [`CreateBookingRequest`].
struct NewBooking {
    property_id: String,
    customer_name: String,
    customer_email: String,
    customer_phone: String,
    range: DateRange,
    total_amount: Option<f64>,
    notes: Option<String>,
}

impl BookingService {
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self {
            store,
            locks: PropertyLocks::default(),
        }
    }

    pub async fn create_booking(
        &self,
        actor: Option<&Principal>,
        request: CreateBookingRequest,
    ) -> Result<Booking, BookingError> {
        let actor = authenticated(actor)?;
        let new = validate(request)?;

        let _lease = self.locks.lock(&new.property_id).await;

        let existing = self
            .store
            .active_bookings_for_property(&new.property_id)
            .await?;

        if let Some(conflict) = find_conflict(&existing, &new.range) {
            tracing::info!(
                property_id = %new.property_id,
                conflicting_id = %conflict.booking_id,
                owner_id = %actor.id,
                "booking rejected: slot conflict"
            );
            return Err(BookingError::SlotConflict {
                conflicting_id: conflict.booking_id.clone(),
            });
        }

        let now = Utc::now().trunc_subsecs(3);
        let booking = Booking {
            booking_id: entity_id(EntityKind::Booking),
            property_id: new.property_id,
            owner_id: actor.id.clone(),
            customer_name: new.customer_name,
            customer_email: new.customer_email,
            customer_phone: new.customer_phone,
            start_date: new.range.start(),
            end_date: new.range.end(),
            status: BookingStatus::Confirmed,
            total_amount: new.total_amount,
            notes: new.notes,
            created_at: now,
            updated_at: now,
        };

        self.store.insert_booking(&booking).await?;

        tracing::info!(
            booking_id = %booking.booking_id,
            property_id = %booking.property_id,
            owner_id = %booking.owner_id,
            "booking created"
        );
        Ok(booking)
    }

    /// Snapshot of the actor's bookings, ordered by start date ascending.
    pub async fn list_bookings(
        &self,
        actor: Option<&Principal>,
        property_id: Option<&str>,
    ) -> Result<Vec<Booking>, BookingError> {
        let actor = authenticated(actor)?;
        let property_id = property_id.map(str::trim).filter(|p| !p.is_empty());
        Ok(self.store.bookings_for_owner(&actor.id, property_id).await?)
    }

    pub async fn get_booking(
        &self,
        actor: Option<&Principal>,
        booking_id: &str,
    ) -> Result<Booking, BookingError> {
        let actor = authenticated(actor)?;
        self.owned_booking(actor, booking_id).await
    }

    /// Frees the booking's slot. Cancelling twice is a no-op.
    pub async fn cancel_booking(
        &self,
        actor: Option<&Principal>,
        booking_id: &str,
    ) -> Result<Booking, BookingError> {
        let actor = authenticated(actor)?;
        let mut booking = self.owned_booking(actor, booking_id).await?;
        if booking.status == BookingStatus::Cancelled {
            return Ok(booking);
        }

        let _lease = self.locks.lock(&booking.property_id).await;

        let now = Utc::now().trunc_subsecs(3);
        let updated = self
            .store
            .set_booking_status(booking_id, BookingStatus::Cancelled, now)
            .await?;
        if !updated {
            return Err(BookingError::NotFound);
        }

        booking.status = BookingStatus::Cancelled;
        booking.updated_at = now;
        tracing::info!(booking_id = %booking.booking_id, owner_id = %actor.id, "booking cancelled");
        Ok(booking)
    }

    async fn owned_booking(
        &self,
        actor: &Principal,
        booking_id: &str,
    ) -> Result<Booking, BookingError> {
        match self.store.get_booking(booking_id).await? {
            Some(b) if b.owner_id == actor.id => Ok(b),
            _ => Err(BookingError::NotFound),
        }
    }
}

fn authenticated(actor: Option<&Principal>) -> Result<&Principal, BookingError> {
    match actor {
        Some(p) if !p.id.trim().is_empty() => Ok(p),
        _ => Err(BookingError::Unauthorized),
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, BookingError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(BookingError::InvalidInput(field))
}

fn validate(request: CreateBookingRequest) -> Result<NewBooking, BookingError> {
    let range = match (request.start_date.as_deref(), request.end_date.as_deref()) {
        (Some(start), Some(end)) => DateRange::parse(start, end).ok_or(BookingError::InvalidRange)?,
        _ => return Err(BookingError::InvalidRange),
    };

    Ok(NewBooking {
        property_id: required(request.property_id, "propertyId is required")?,
        customer_name: required(request.customer_name, "customerName is required")?,
        customer_email: required(request.customer_email, "customerEmail is required")?,
        customer_phone: required(request.customer_phone, "customerPhone is required")?,
        range,
        total_amount: request.total_amount,
        notes: request.notes,
    })
}
