use chrono::Utc;
use rand::Rng;

/// Entity families sharing the external id scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Booking,
    Property,
    SubscriptionPlan,
    User,
}

impl EntityKind {
    pub fn tag(&self) -> &'static str {
        match self {
            EntityKind::Booking => "BK",
            EntityKind::Property => "PRO",
            EntityKind::SubscriptionPlan => "SUB",
            EntityKind::User => "USR",
        }
    }
}

/// Short, human-scannable id: two-letter prefix, four random digits and the
/// last four digits of the current millisecond timestamp. Uniqueness is only
/// probable; storage rejects collisions.
pub fn entity_id(kind: EntityKind) -> String {
    compose_id(kind.tag(), Utc::now().timestamp_millis())
}

fn compose_id(tag: &str, now_ms: i64) -> String {
    let prefix: String = tag.chars().take(2).collect::<String>().to_uppercase();
    let random_digits: u16 = rand::rng().random_range(1000..=9999);
    let time_suffix = now_ms.rem_euclid(10_000);
    format!("{prefix}{random_digits}{time_suffix:04}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_id_shape() {
        let id = entity_id(EntityKind::Booking);
        assert_eq!(id.len(), 10);
        assert!(id.starts_with("BK"));
        assert!(id[2..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_prefix_uses_first_two_chars() {
        assert!(entity_id(EntityKind::Property).starts_with("PR"));
        assert!(entity_id(EntityKind::SubscriptionPlan).starts_with("SU"));
        assert!(entity_id(EntityKind::User).starts_with("US"));
        assert!(compose_id("user", 0).starts_with("US"));
    }

    #[test]
    fn test_time_suffix_is_zero_padded() {
        let id = compose_id("BK", 1_700_000_000_042);
        assert!(id.ends_with("0042"));
        let random: u16 = id[2..6].parse().unwrap();
        assert!((1000..=9999).contains(&random));
    }
}
