//! Expiry policy for cached credentials.

use chrono::Utc;

use super::Credential;
use crate::error::{remote_error, Error, RemoteErrorKind};

/// Seconds deducted from the platform-reported lifetime before computing the
/// local absolute expiry.
pub const SAFETY_MARGIN_SECONDS: i64 = 300;

/// Current wall-clock time in milliseconds since the unix epoch.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Whether the record carries a non-empty value and a non-zero expiry.
pub fn has_required_fields<C: Credential>(record: &C) -> bool {
    !record.value().is_empty() && record.expires_at_millis() != 0
}

/// Whether the record can be used right now.
pub fn is_valid<C: Credential>(record: &C) -> bool {
    is_valid_at(record, now_millis())
}

/// Whether the record can be used at `now_millis`.
pub fn is_valid_at<C: Credential>(record: &C, now_millis: i64) -> bool {
    has_required_fields(record) && record.expires_at_millis() > now_millis
}

/// Absolute expiry for a credential the platform says lives `relative_seconds`.
///
/// A lifetime too large to represent is rejected as an invalid response.
pub fn expires_at_from_relative(relative_seconds: i64, now_millis: i64) -> Result<i64, Error> {
    relative_seconds
        .checked_sub(SAFETY_MARGIN_SECONDS)
        .and_then(|secs| secs.checked_mul(1000))
        .and_then(|millis| now_millis.checked_add(millis))
        .ok_or_else(|| {
            remote_error(
                RemoteErrorKind::InvalidResponse,
                &format!("expires_in of {relative_seconds} seconds is out of range"),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::token::{AccessTokenRecord, TicketRecord};

    #[test]
    fn test_future_expiry_is_valid() {
        let now = 1_000_000;
        let record = AccessTokenRecord::new("T", now + 1);
        assert!(is_valid_at(&record, now));
    }

    #[test]
    fn test_expiry_at_or_before_now_is_invalid() {
        let now = 1_000_000;
        assert!(!is_valid_at(&AccessTokenRecord::new("T", now), now));
        assert!(!is_valid_at(&AccessTokenRecord::new("T", now - 1), now));
    }

    #[test]
    fn test_missing_fields_are_invalid() {
        assert!(!is_valid(&AccessTokenRecord::default()));
        assert!(!is_valid(&TicketRecord::new("", now_millis() + 60_000)));
        // Zero expiry is treated as absent even against a clock before the epoch.
        assert!(!is_valid_at(&TicketRecord::new("ticket", 0), -1));
    }

    #[test]
    fn test_is_valid_uses_wall_clock() {
        assert!(is_valid(&TicketRecord::new("ticket", now_millis() + 60_000)));
        assert!(!is_valid(&TicketRecord::new("ticket", now_millis() - 60_000)));
    }

    #[test]
    fn test_expires_at_applies_safety_margin() {
        let now = 1_700_000_000_000;
        assert_eq!(expires_at_from_relative(1000, now).unwrap(), now + 700_000);
        assert_eq!(expires_at_from_relative(7200, now).unwrap(), now + 6_900_000);
    }

    #[test]
    fn test_out_of_range_lifetime_is_invalid_response() {
        let now = 1_700_000_000_000;
        for relative in [i64::MAX, i64::MIN, i64::MAX / 1000] {
            let err = expires_at_from_relative(relative, now).unwrap_err();
            assert_eq!(
                err.error_kind,
                ErrorKind::Remote(RemoteErrorKind::InvalidResponse)
            );
        }
    }
}
