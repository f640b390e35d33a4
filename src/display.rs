//! Pure formatting helpers shared by the command renderers.

use chrono::{DateTime, SecondsFormat, Utc};

/// Epoch milliseconds to `YYYY-MM-DDTHH:MM:SS.sssZ`. Missing, NaN, or out-of-range input gives `None`.
pub fn format_epoch_ms(value: Option<f64>) -> Option<String> {
    let ms = value?;
    if !ms.is_finite() {
        return None;
    }
    if ms < i64::MIN as f64 || ms > i64::MAX as f64 {
        return None;
    }
    DateTime::<Utc>::from_timestamp_millis(ms.trunc() as i64)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Normalize an RFC 3339 string to the same form as [`format_epoch_ms`].
pub fn normalize_iso(value: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Hide all but the last four characters of an identifier.
pub fn mask_id(id: &str) -> String {
    let count = id.chars().count();
    if count <= 4 {
        return id.to_string();
    }
    let tail: String = id.chars().skip(count - 4).collect();
    format!("••••{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_zero_is_unix_epoch() {
        assert_eq!(
            format_epoch_ms(Some(0.0)).as_deref(),
            Some("1970-01-01T00:00:00.000Z")
        );
    }

    #[test]
    fn epoch_ms_converts_to_iso() {
        assert_eq!(
            format_epoch_ms(Some(1_768_435_200_000.0)).as_deref(),
            Some("2026-01-15T00:00:00.000Z")
        );
    }

    #[test]
    fn missing_or_nan_is_none() {
        assert_eq!(format_epoch_ms(None), None);
        assert_eq!(format_epoch_ms(Some(f64::NAN)), None);
        assert_eq!(format_epoch_ms(Some(f64::INFINITY)), None);
        assert_eq!(format_epoch_ms(Some(1e300)), None);
    }

    #[test]
    fn iso_strings_normalize_to_utc_millis() {
        assert_eq!(
            normalize_iso("2026-01-15T01:00:00+01:00").as_deref(),
            Some("2026-01-15T00:00:00.000Z")
        );
        assert_eq!(normalize_iso("last tuesday"), None);
    }

    #[test]
    fn mask_keeps_last_four() {
        assert_eq!(mask_id("abcdef123456"), "••••3456");
        assert_eq!(mask_id("abcd"), "abcd");
        assert_eq!(mask_id(""), "");
    }
}
