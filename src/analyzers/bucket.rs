use crate::model::{NormalizedDuration, TimeBucket};

/// Maps elapsed hours to the range that contains them.
///
/// Ranges are closed below and open above:
///
/// | Hours        | Bucket      |
/// |--------------|-------------|
/// | [0, 2)       | 0-2 hrs     |
/// | [2, 4)       | 2-4 hrs     |
/// | [4, 8)       | 4-8 hrs     |
/// | [8, 12)      | 8-12 hrs    |
/// | [12, 24)     | 12-24 hrs   |
/// | [24, 48)     | 24-48 hrs   |
/// | >= 48        | >48 hrs     |
pub fn classify(hours: f64) -> TimeBucket {
    match hours {
        h if h < 2.0 => TimeBucket::ZeroToTwo,
        h if h < 4.0 => TimeBucket::TwoToFour,
        h if h < 8.0 => TimeBucket::FourToEight,
        h if h < 12.0 => TimeBucket::EightToTwelve,
        h if h < 24.0 => TimeBucket::TwelveToTwentyFour,
        h if h < 48.0 => TimeBucket::TwentyFourToFortyEight,
        _ => TimeBucket::OverFortyEight,
    }
}

/// Bucket of a normalized duration; `Unknown` has none.
pub fn bucket_of(duration: NormalizedDuration) -> Option<TimeBucket> {
    match duration {
        NormalizedDuration::Hours(h) => Some(classify(h)),
        NormalizedDuration::Pending => Some(TimeBucket::ScreenPending),
        NormalizedDuration::Unknown(_) => None,
    }
}

/// True when a duration counts towards "Under 5 Minutes".
pub fn is_under_five_minutes(hours: f64) -> bool {
    hours < 5.0 / 60.0
}
