use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{Booking, BookingStatus};

const BOOKING_COLUMNS: &str = "booking_id, property_id, owner_id, customer_name, customer_email, customer_phone, \
     start_date, end_date, status, total_amount, notes, created_at, updated_at";

// ── Bookings ──

pub fn insert_booking(conn: &Connection, booking: &Booking) -> rusqlite::Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO bookings ({BOOKING_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
        ),
        params![
            booking.booking_id,
            booking.property_id,
            booking.owner_id,
            booking.customer_name,
            booking.customer_email,
            booking.customer_phone,
            format_ts(&booking.start_date),
            format_ts(&booking.end_date),
            booking.status.as_str(),
            booking.total_amount,
            booking.notes,
            format_ts(&booking.created_at),
            format_ts(&booking.updated_at),
        ],
    )?;
    Ok(())
}

/// Every booking on the property that still holds its slot.
pub fn get_active_bookings_for_property(
    conn: &Connection,
    property_id: &str,
) -> rusqlite::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings
         WHERE property_id = ?1 AND status != 'cancelled'
         ORDER BY start_date ASC"
    ))?;

    let rows = stmt.query_map(params![property_id], parse_booking_row)?;
    rows.collect()
}

pub fn get_bookings_for_owner(
    conn: &Connection,
    owner_id: &str,
    property_id: Option<&str>,
) -> rusqlite::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings
         WHERE owner_id = ?1 AND (?2 IS NULL OR property_id = ?2)
         ORDER BY start_date ASC, created_at ASC, booking_id ASC"
    ))?;

    let rows = stmt.query_map(params![owner_id, property_id], parse_booking_row)?;
    rows.collect()
}

pub fn get_booking_by_id(conn: &Connection, booking_id: &str) -> rusqlite::Result<Option<Booking>> {
    conn.query_row(
        &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE booking_id = ?1"),
        params![booking_id],
        parse_booking_row,
    )
    .optional()
}

pub fn update_booking_status(
    conn: &Connection,
    booking_id: &str,
    status: BookingStatus,
    updated_at: &DateTime<Utc>,
) -> rusqlite::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET status = ?1, updated_at = ?2 WHERE booking_id = ?3",
        params![status.as_str(), format_ts(updated_at), booking_id],
    )?;
    Ok(count > 0)
}

/// Fixed-width UTC form, so lexical order in SQL matches chronological order.
fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_ts(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_booking_row(row: &rusqlite::Row) -> rusqlite::Result<Booking> {
    let status_str: String = row.get(8)?;
    let status = BookingStatus::parse(&status_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            8,
            Type::Text,
            format!("unknown booking status: {status_str}").into(),
        )
    })?;

    Ok(Booking {
        booking_id: row.get(0)?,
        property_id: row.get(1)?,
        owner_id: row.get(2)?,
        customer_name: row.get(3)?,
        customer_email: row.get(4)?,
        customer_phone: row.get(5)?,
        start_date: parse_ts(row, 6)?,
        end_date: parse_ts(row, 7)?,
        status,
        total_amount: row.get(9)?,
        notes: row.get(10)?,
        created_at: parse_ts(row, 11)?,
        updated_at: parse_ts(row, 12)?,
    })
}
