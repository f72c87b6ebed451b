use crate::models::Booking;

const ICS_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Single-event iCalendar document for one booking.
pub fn generate_ics(booking: &Booking) -> String {
    let dtstart = booking.start_date.format(ICS_FORMAT).to_string();
    let dtend = booking.end_date.format(ICS_FORMAT).to_string();
    let dtstamp = booking.updated_at.format(ICS_FORMAT).to_string();
    let uid = format!("{}@nestiq", booking.booking_id);
    let status = booking.status.as_str().to_uppercase();

    let summary = escape_text(&format!(
        "Booking {} - {}",
        booking.property_id, booking.customer_name
    ));
    let description = escape_text(booking.notes.as_deref().unwrap_or("No additional notes"));

    let lines = [
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        "PRODID:-//Nest-IQ//Bookings//EN".to_string(),
        "BEGIN:VEVENT".to_string(),
        format!("UID:{uid}"),
        format!("DTSTAMP:{dtstamp}"),
        format!("DTSTART:{dtstart}"),
        format!("DTEND:{dtend}"),
        format!("STATUS:{status}"),
        format!("SUMMARY:{summary}"),
        format!("DESCRIPTION:{description}"),
        "END:VEVENT".to_string(),
        "END:VCALENDAR".to_string(),
    ];

    let mut ics = String::new();
    for line in &lines {
        ics.push_str(&fold_line(line));
        ics.push_str("\r\n");
    }
    ics
}

/// Content lines longer than 75 octets are continued on the next line,
/// which starts with a single space (RFC 5545 section 3.1.1). Splits never
/// fall inside a UTF-8 sequence.
fn fold_line(line: &str) -> String {
    const MAX_LINE_OCTETS: usize = 75;

    let mut folded = String::with_capacity(line.len() + line.len() / MAX_LINE_OCTETS * 3);
    let mut width = 0;
    for ch in line.chars() {
        let len = ch.len_utf8();
        if width + len > MAX_LINE_OCTETS {
            folded.push_str("\r\n ");
            width = 1;
        }
        folded.push(ch);
        width += len;
    }
    folded
}

// RFC 5545 TEXT escaping.
fn escape_text(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace("\r\n", "\\n")
        .replace('\n', "\\n")
        .replace('\r', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use crate::models::BookingStatus;

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn booking(notes: Option<&str>, status: BookingStatus) -> Booking {
        Booking {
            booking_id: "BK48210042".to_string(),
            property_id: "PR11110001".to_string(),
            owner_id: "U1".to_string(),
            customer_name: "Alice".to_string(),
            customer_email: "alice@example.com".to_string(),
            customer_phone: "+15551110000".to_string(),
            start_date: ts("2025-03-15T14:00:00Z"),
            end_date: ts("2025-03-18T10:00:00Z"),
            status,
            total_amount: None,
            notes: notes.map(str::to_string),
            created_at: ts("2025-03-10T10:00:00Z"),
            updated_at: ts("2025-03-10T10:00:00Z"),
        }
    }

    #[test]
    fn test_generate_ics() {
        let ics = generate_ics(&booking(Some("Late check-in, gate code 42"), BookingStatus::Confirmed));
        assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(ics.contains("BEGIN:VEVENT"));
        assert!(ics.contains("UID:BK48210042@nestiq"));
        assert!(ics.contains("DTSTART:20250315T140000Z"));
        assert!(ics.contains("DTEND:20250318T100000Z"));
        assert!(ics.contains("DTSTAMP:20250310T100000Z"));
        assert!(ics.contains("STATUS:CONFIRMED"));
        assert!(ics.contains("SUMMARY:Booking PR11110001 - Alice"));
        assert!(ics.contains("DESCRIPTION:Late check-in\\, gate code 42"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
    }

    #[test]
    fn test_generate_ics_no_notes() {
        let ics = generate_ics(&booking(None, BookingStatus::Cancelled));
        assert!(ics.contains("DESCRIPTION:No additional notes"));
        assert!(ics.contains("STATUS:CANCELLED"));
    }

    #[test]
    fn test_long_lines_folded_at_75_octets() {
        let notes = "Guests arriving from Zürich around midnight, please leave the key with the concierge. Crème brûlée in the fridge. 🎉".repeat(3);
        let ics = generate_ics(&booking(Some(&notes), BookingStatus::Confirmed));

        for line in ics.split("\r\n") {
            assert!(line.len() <= 75, "line of {} octets: {line:?}", line.len());
        }
        let unfolded = ics.replace("\r\n ", "");
        assert!(unfolded.contains(&format!("DESCRIPTION:{}", escape_text(&notes))));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
    }

    #[test]
    fn test_short_line_not_folded() {
        assert_eq!(fold_line("STATUS:CONFIRMED"), "STATUS:CONFIRMED");
        let exact = "X".repeat(75);
        assert_eq!(fold_line(&exact), exact);
        assert_eq!(fold_line(&"X".repeat(76)), format!("{}\r\n X", "X".repeat(75)));
    }

    #[test]
    fn test_bare_carriage_return_escaped() {
        let ics = generate_ics(&booking(Some("line one\rline two"), BookingStatus::Confirmed));
        assert!(ics.contains("DESCRIPTION:line one\\nline two"));
    }
}
