use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::auth::Principal;
use crate::errors::AppError;
use crate::services::calendar::generate_ics;
use crate::state::AppState;

// GET /booking/:booking_id/calendar.ics
pub async fn download_ics(
    State(state): State<Arc<AppState>>,
    principal: Option<Principal>,
    Path(booking_id): Path<String>,
) -> Result<Response, AppError> {
    let booking = state
        .bookings
        .get_booking(principal.as_ref(), &booking_id)
        .await?;

    let ics = generate_ics(&booking);
    let disposition = format!("attachment; filename=\"booking-{}.ics\"", booking.booking_id);

    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        ics,
    )
        .into_response())
}
