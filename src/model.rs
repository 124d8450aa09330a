//! Data types shared by the normalizer, the aggregators and the writers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A single screening record as produced by a record source.
///
/// Document exports fill the timestamp pair; sheet exports fill
/// `raw_duration_text` instead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreeningRecord {
    pub job_id: Option<String>,
    pub screening_triggered_on: Option<DateTime<Utc>>,
    pub screening_completed_at: Option<DateTime<Utc>>,
    pub raw_duration_text: Option<String>,
    pub qualifying_question_label: Option<String>,
    pub candidate_status_label: Option<String>,
}

/// Why a record could not be turned into a duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownReason {
    /// Neither a full timestamp pair nor any duration text.
    MissingInput,
    /// `completed_at` lies before `triggered_on`.
    NegativeElapsed,
    /// Duration text that matches no rule of the grammar.
    Unparseable,
}

/// Canonical elapsed time of a screening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NormalizedDuration {
    /// Elapsed hours, never negative.
    Hours(f64),
    /// Screening still in progress.
    Pending,
    Unknown(UnknownReason),
}

/// Fixed, ordered set of elapsed-time ranges.
///
/// The derived `Ord` follows declaration order, which is also the column
/// order of every report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum TimeBucket {
    #[serde(rename = "0-2 hrs")]
    ZeroToTwo,
    #[serde(rename = "2-4 hrs")]
    TwoToFour,
    #[serde(rename = "4-8 hrs")]
    FourToEight,
    #[serde(rename = "8-12 hrs")]
    EightToTwelve,
    #[serde(rename = "12-24 hrs")]
    TwelveToTwentyFour,
    #[serde(rename = "24-48 hrs")]
    TwentyFourToFortyEight,
    #[serde(rename = ">48 hrs")]
    OverFortyEight,
    #[serde(rename = "Screen Pending")]
    ScreenPending,
}

impl TimeBucket {
    pub const ALL: [TimeBucket; 8] = [
        TimeBucket::ZeroToTwo,
        TimeBucket::TwoToFour,
        TimeBucket::FourToEight,
        TimeBucket::EightToTwelve,
        TimeBucket::TwelveToTwentyFour,
        TimeBucket::TwentyFourToFortyEight,
        TimeBucket::OverFortyEight,
        TimeBucket::ScreenPending,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TimeBucket::ZeroToTwo => "0-2 hrs",
            TimeBucket::TwoToFour => "2-4 hrs",
            TimeBucket::FourToEight => "4-8 hrs",
            TimeBucket::EightToTwelve => "8-12 hrs",
            TimeBucket::TwelveToTwentyFour => "12-24 hrs",
            TimeBucket::TwentyFourToFortyEight => "24-48 hrs",
            TimeBucket::OverFortyEight => ">48 hrs",
            TimeBucket::ScreenPending => "Screen Pending",
        }
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-group bucket breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationRow {
    pub group_key: String,
    /// Only buckets with at least one record are present; values sum to 100.
    pub bucket_percentages: BTreeMap<TimeBucket, f64>,
    pub under_5_min_percent: f64,
    /// Records of this group that normalized to `Unknown`.
    pub unclassified: usize,
}

/// One line of the ungrouped breakdown: either a bucket or the
/// "Under 5 Minutes" summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalBucketRow {
    #[serde(rename = "Time Class")]
    pub time_class: String,
    #[serde(rename = "Percentage")]
    pub percentage: f64,
}

/// Answer rates for one job/question pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerAggregationRow {
    #[serde(rename = "Job ID")]
    pub job_id: String,
    #[serde(rename = "Question")]
    pub question: String,
    #[serde(rename = "% Correct")]
    pub percent_correct: f64,
    #[serde(rename = "% Wrong")]
    pub percent_wrong: f64,
    #[serde(rename = "% NA")]
    pub percent_not_applicable: f64,
}
