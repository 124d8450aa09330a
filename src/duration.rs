//! Duration normalization.
//!
//! Turns either a trigger/completion timestamp pair or a free-text duration
//! such as `"3 Hours"` into a [`NormalizedDuration`].

use crate::model::{NormalizedDuration, ScreeningRecord, UnknownReason};

/// What a matched rule produces.
#[derive(Debug, Clone, Copy)]
enum Extract {
    Pending,
    /// A fixed number of hours, no count needed.
    Fixed(f64),
    /// The integer before the keyword, multiplied by this many hours.
    PerUnit(f64),
}

struct Rule {
    keyword: &'static str,
    extract: Extract,
}

/// Free-text grammar, evaluated top to bottom; the first keyword found wins.
///
/// | Keyword            | Result                  |
/// |--------------------|-------------------------|
/// | `pending`          | `Pending`               |
/// | `less than minute` | `Hours(1/60)`           |
/// | `minute`           | `Hours(n / 60)`         |
/// | `hour`             | `Hours(n)`              |
/// | `day`              | `Hours(n * 24)`         |
static RULES: &[Rule] = &[
    Rule {
        keyword: "pending",
        extract: Extract::Pending,
    },
    Rule {
        keyword: "less than minute",
        extract: Extract::Fixed(1.0 / 60.0),
    },
    Rule {
        keyword: "minute",
        extract: Extract::PerUnit(1.0 / 60.0),
    },
    Rule {
        keyword: "hour",
        extract: Extract::PerUnit(1.0),
    },
    Rule {
        keyword: "day",
        extract: Extract::PerUnit(24.0),
    },
];

/// Normalizes a single record.
///
/// A complete timestamp pair takes precedence over duration text.
pub fn normalize(record: &ScreeningRecord) -> NormalizedDuration {
    match (record.screening_triggered_on, record.screening_completed_at) {
        (Some(triggered), Some(completed)) => {
            let seconds = (completed - triggered).num_milliseconds() as f64 / 1000.0;
            if seconds < 0.0 {
                NormalizedDuration::Unknown(UnknownReason::NegativeElapsed)
            } else {
                NormalizedDuration::Hours(seconds / 3600.0)
            }
        }
        _ => match record.raw_duration_text.as_deref() {
            Some(text) => parse_duration_text(text),
            None => NormalizedDuration::Unknown(UnknownReason::MissingInput),
        },
    }
}

/// Parses a free-text duration, ignoring case and repeated whitespace.
pub fn parse_duration_text(text: &str) -> NormalizedDuration {
    let cleaned = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    if cleaned.is_empty() {
        return NormalizedDuration::Unknown(UnknownReason::MissingInput);
    }

    for rule in RULES {
        let Some(at) = cleaned.find(rule.keyword) else {
            continue;
        };

        return match rule.extract {
            Extract::Pending => NormalizedDuration::Pending,
            Extract::Fixed(hours) => NormalizedDuration::Hours(hours),
            Extract::PerUnit(hours) => match count_before(&cleaned[..at]) {
                Some(n) => NormalizedDuration::Hours(n as f64 * hours),
                None => NormalizedDuration::Unknown(UnknownReason::Unparseable),
            },
        };
    }

    NormalizedDuration::Unknown(UnknownReason::Unparseable)
}

/// Returns the leading integer of `prefix`: its first digit run.
///
/// A decimal count such as `1.5` is not an integer and yields `None`.
fn count_before(prefix: &str) -> Option<u64> {
    let start = prefix.find(|c: char| c.is_ascii_digit())?;
    let digits = &prefix[start..];
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    let fraction_follows = digits[end..]
        .strip_prefix('.')
        .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_digit()));
    if fraction_follows || prefix[..start].ends_with('.') {
        return None;
    }

    digits[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn hours(d: NormalizedDuration) -> f64 {
        match d {
            NormalizedDuration::Hours(h) => h,
            other => panic!("expected hours, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_keywords() {
        assert_eq!(
            parse_duration_text("Less Than Minute"),
            NormalizedDuration::Hours(1.0 / 60.0)
        );
        assert_eq!(
            parse_duration_text("Pending Review"),
            NormalizedDuration::Pending
        );
        assert_eq!(parse_duration_text("3 Hours"), NormalizedDuration::Hours(3.0));
        assert_eq!(parse_duration_text("2 Days"), NormalizedDuration::Hours(48.0));
        assert!((hours(parse_duration_text("45 Minutes")) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_parse_is_case_and_whitespace_tolerant() {
        assert_eq!(
            parse_duration_text("  less   THAN\tminute "),
            NormalizedDuration::Hours(1.0 / 60.0)
        );
        assert_eq!(parse_duration_text("1 hour"), NormalizedDuration::Hours(1.0));
        assert_eq!(parse_duration_text("10DAYS"), NormalizedDuration::Hours(240.0));
    }

    #[test]
    fn test_parse_unknown_inputs() {
        assert_eq!(
            parse_duration_text("garbage"),
            NormalizedDuration::Unknown(UnknownReason::Unparseable)
        );
        assert_eq!(
            parse_duration_text("   "),
            NormalizedDuration::Unknown(UnknownReason::MissingInput)
        );
        // keyword matched but no count: no fallthrough to later rules
        assert_eq!(
            parse_duration_text("Minutes"),
            NormalizedDuration::Unknown(UnknownReason::Unparseable)
        );
    }

    #[test]
    fn test_parse_precedence() {
        // "pending" beats every numeric rule
        assert_eq!(
            parse_duration_text("Pending for 3 Hours"),
            NormalizedDuration::Pending
        );
        // "minute" is tried before "hour", and the count is the leading integer
        assert_eq!(
            parse_duration_text("1 Hour 30 Minutes"),
            NormalizedDuration::Hours(1.0 / 60.0)
        );
        assert_eq!(
            parse_duration_text("about 2 or 3 Hours"),
            NormalizedDuration::Hours(2.0)
        );
    }

    #[test]
    fn test_parse_decimal_count_is_unparseable() {
        for text in ["1.5 Hours", "2.5 Days", ".5 Hours", "0.75 Minutes"] {
            assert_eq!(
                parse_duration_text(text),
                NormalizedDuration::Unknown(UnknownReason::Unparseable),
                "{text}"
            );
        }
        assert_eq!(parse_duration_text("3. Hours"), NormalizedDuration::Hours(3.0));
    }

    #[test]
    fn test_normalize_timestamp_pair() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let record = ScreeningRecord {
            screening_triggered_on: Some(start),
            screening_completed_at: Some(start + Duration::minutes(90)),
            ..Default::default()
        };
        assert_eq!(normalize(&record), NormalizedDuration::Hours(1.5));
    }

    #[test]
    fn test_normalize_negative_elapsed_is_unknown() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let record = ScreeningRecord {
            screening_triggered_on: Some(start),
            screening_completed_at: Some(start - Duration::seconds(1)),
            ..Default::default()
        };
        assert_eq!(
            normalize(&record),
            NormalizedDuration::Unknown(UnknownReason::NegativeElapsed)
        );
    }

    #[test]
    fn test_normalize_half_pair_falls_back_to_text() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let half = ScreeningRecord {
            screening_triggered_on: Some(start),
            ..Default::default()
        };
        assert_eq!(
            normalize(&half),
            NormalizedDuration::Unknown(UnknownReason::MissingInput)
        );

        let with_text = ScreeningRecord {
            screening_triggered_on: Some(start),
            raw_duration_text: Some("2 Hours".to_string()),
            ..Default::default()
        };
        assert_eq!(normalize(&with_text), NormalizedDuration::Hours(2.0));
    }
}
