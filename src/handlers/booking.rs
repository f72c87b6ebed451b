use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::Principal;
use crate::errors::AppError;
use crate::models::{Booking, CreateBookingRequest};
use crate::services::booking::BookingError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct BookingMessageResponse {
    message: &'static str,
    booking: Booking,
}

// POST /booking/add
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    principal: Option<Principal>,
    body: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BookingMessageResponse>), AppError> {
    // Authentication is reported ahead of a malformed body.
    if principal.is_none() {
        return Err(BookingError::Unauthorized.into());
    }
    let Json(body) = body?;

    let booking = state
        .bookings
        .create_booking(principal.as_ref(), body)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(BookingMessageResponse {
            message: "Booking created successfully",
            booking,
        }),
    ))
}

// GET /booking/all
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingsQuery {
    pub property_id: Option<String>,
}

#[derive(Serialize)]
pub struct BookingsResponse {
    bookings: Vec<Booking>,
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    principal: Option<Principal>,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<BookingsResponse>, AppError> {
    let bookings = state
        .bookings
        .list_bookings(principal.as_ref(), query.property_id.as_deref())
        .await?;

    Ok(Json(BookingsResponse { bookings }))
}

// GET /booking/:booking_id
#[derive(Serialize)]
pub struct BookingResponse {
    booking: Booking,
}

pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    principal: Option<Principal>,
    Path(booking_id): Path<String>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = state
        .bookings
        .get_booking(principal.as_ref(), &booking_id)
        .await?;

    Ok(Json(BookingResponse { booking }))
}

// POST /booking/:booking_id/cancel
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    principal: Option<Principal>,
    Path(booking_id): Path<String>,
) -> Result<Json<BookingMessageResponse>, AppError> {
    let booking = state
        .bookings
        .cancel_booking(principal.as_ref(), &booking_id)
        .await?;

    Ok(Json(BookingMessageResponse {
        message: "Booking cancelled successfully",
        booking,
    }))
}
