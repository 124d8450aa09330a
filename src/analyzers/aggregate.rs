use crate::analyzers::bucket::{bucket_of, is_under_five_minutes};
use crate::analyzers::utility::pct;
use crate::model::{AggregationRow, GlobalBucketRow, NormalizedDuration, TimeBucket};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

/// Label of the summary row appended by [`aggregate_global`].
pub const UNDER_FIVE_MINUTES_LABEL: &str = "Under 5 Minutes";

/// Denominator used for the "Under 5 Minutes" share.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Under5Basis {
    /// Only completed screenings (`Hours`) count.
    #[default]
    Classified,
    /// Every bucketed record counts, pending screenings included.
    AllRecords,
}

impl FromStr for Under5Basis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classified" => Ok(Under5Basis::Classified),
            "all" | "all-records" => Ok(Under5Basis::AllRecords),
            other => Err(format!(
                "invalid under-5 basis '{other}', expected 'classified' or 'all'"
            )),
        }
    }
}

/// Running counts for one group.
#[derive(Debug, Default)]
struct Tally {
    buckets: BTreeMap<TimeBucket, usize>,
    /// Records with a bucket (`Hours` or `Pending`).
    classified: usize,
    /// Records with `Hours`.
    timed: usize,
    under_five: usize,
    unclassified: usize,
}

impl Tally {
    fn add(&mut self, duration: NormalizedDuration) {
        let Some(bucket) = bucket_of(duration) else {
            self.unclassified += 1;
            return;
        };

        *self.buckets.entry(bucket).or_default() += 1;
        self.classified += 1;

        if let NormalizedDuration::Hours(h) = duration {
            self.timed += 1;
            if is_under_five_minutes(h) {
                self.under_five += 1;
            }
        }
    }

    fn under_five_percent(&self, basis: Under5Basis) -> f64 {
        let denominator = match basis {
            Under5Basis::Classified => self.timed,
            Under5Basis::AllRecords => self.classified,
        };
        pct(self.under_five, denominator)
    }

    fn bucket_percentages(&self) -> BTreeMap<TimeBucket, f64> {
        self.buckets
            .iter()
            .map(|(bucket, count)| (*bucket, pct(*count, self.classified)))
            .collect()
    }
}

/// Computes per-group bucket percentages.
///
/// Groups with no bucketed record are left out, so no row ever carries a
/// zero denominator. Rows come back ordered by group key.
pub fn aggregate_by_group<'a, I>(pairs: I, basis: Under5Basis) -> Vec<AggregationRow>
where
    I: IntoIterator<Item = (&'a str, NormalizedDuration)>,
{
    let mut groups: BTreeMap<&'a str, Tally> = BTreeMap::new();

    for (key, duration) in pairs {
        groups.entry(key).or_default().add(duration);
    }

    groups
        .into_iter()
        .filter(|(_, tally)| tally.classified > 0)
        .map(|(key, tally)| AggregationRow {
            group_key: key.to_string(),
            bucket_percentages: tally.bucket_percentages(),
            under_5_min_percent: tally.under_five_percent(basis),
            unclassified: tally.unclassified,
        })
        .collect()
}

/// Computes bucket percentages over the whole input as a single group.
///
/// Emits one row per bucket present, in bucket order, followed by the
/// "Under 5 Minutes" row. Empty when nothing could be bucketed.
pub fn aggregate_global<I>(durations: I, basis: Under5Basis) -> Vec<GlobalBucketRow>
where
    I: IntoIterator<Item = NormalizedDuration>,
{
    let mut tally = Tally::default();
    for duration in durations {
        tally.add(duration);
    }

    if tally.classified == 0 {
        return Vec::new();
    }

    let mut rows: Vec<GlobalBucketRow> = tally
        .bucket_percentages()
        .into_iter()
        .map(|(bucket, percentage)| GlobalBucketRow {
            time_class: bucket.label().to_string(),
            percentage,
        })
        .collect();

    rows.push(GlobalBucketRow {
        time_class: UNDER_FIVE_MINUTES_LABEL.to_string(),
        percentage: tally.under_five_percent(basis),
    });

    rows
}

/// Buckets that appear in at least one row, in bucket order.
pub fn bucket_columns(rows: &[AggregationRow]) -> Vec<TimeBucket> {
    rows.iter()
        .flat_map(|row| row.bucket_percentages.keys().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UnknownReason;

    const UNKNOWN: NormalizedDuration = NormalizedDuration::Unknown(UnknownReason::Unparseable);

    fn hours(h: f64) -> NormalizedDuration {
        NormalizedDuration::Hours(h)
    }

    #[test]
    fn test_group_percentages_sum_to_100() {
        let pairs = vec![
            ("job-b", hours(0.01)),
            ("job-a", hours(1.0)),
            ("job-a", hours(3.0)),
            ("job-a", hours(50.0)),
            ("job-a", NormalizedDuration::Pending),
            ("job-b", hours(30.0)),
            ("job-b", hours(2.0)),
        ];

        let rows = aggregate_by_group(pairs, Under5Basis::Classified);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].group_key, "job-a");
        assert_eq!(rows[1].group_key, "job-b");

        for row in &rows {
            let total: f64 = row.bucket_percentages.values().sum();
            assert!((total - 100.0).abs() < 1e-9, "{}: {}", row.group_key, total);
        }

        assert_eq!(rows[0].bucket_percentages[&TimeBucket::ScreenPending], 25.0);
        assert_eq!(rows[0].bucket_percentages[&TimeBucket::OverFortyEight], 25.0);
        assert!(!rows[0].bucket_percentages.contains_key(&TimeBucket::FourToEight));
    }

    #[test]
    fn test_unknown_excluded_from_denominator() {
        let pairs = vec![
            ("job", hours(1.0)),
            ("job", UNKNOWN),
            ("job", NormalizedDuration::Unknown(UnknownReason::NegativeElapsed)),
        ];

        let rows = aggregate_by_group(pairs, Under5Basis::Classified);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].bucket_percentages[&TimeBucket::ZeroToTwo], 100.0);
        assert_eq!(rows[0].unclassified, 2);
    }

    #[test]
    fn test_group_without_classified_records_is_omitted() {
        let pairs = vec![("only-unknown", UNKNOWN), ("ok", hours(5.0))];
        let rows = aggregate_by_group(pairs, Under5Basis::Classified);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].group_key, "ok");
    }

    #[test]
    fn test_under_five_basis() {
        let pairs = vec![
            ("job", hours(0.05)),
            ("job", hours(1.0)),
            ("job", NormalizedDuration::Pending),
            ("job", NormalizedDuration::Pending),
        ];

        let classified = aggregate_by_group(pairs.clone(), Under5Basis::Classified);
        assert_eq!(classified[0].under_5_min_percent, 50.0);

        let all = aggregate_by_group(pairs, Under5Basis::AllRecords);
        assert_eq!(all[0].under_5_min_percent, 25.0);
    }

    #[test]
    fn test_under_five_with_only_pending_is_zero() {
        let pairs = vec![("job", NormalizedDuration::Pending)];
        let rows = aggregate_by_group(pairs, Under5Basis::Classified);
        assert_eq!(rows[0].under_5_min_percent, 0.0);
        assert!(!rows[0].under_5_min_percent.is_nan());
    }

    #[test]
    fn test_global_rows() {
        let durations = vec![hours(0.01), hours(0.5), hours(3.0), hours(100.0), UNKNOWN];
        let rows = aggregate_global(durations, Under5Basis::Classified);

        let labels: Vec<_> = rows.iter().map(|r| r.time_class.as_str()).collect();
        assert_eq!(labels, vec!["0-2 hrs", "2-4 hrs", ">48 hrs", "Under 5 Minutes"]);
        assert_eq!(rows[0].percentage, 50.0);
        assert_eq!(rows[1].percentage, 25.0);
        assert_eq!(rows[3].percentage, 25.0);

        let bucket_total: f64 = rows[..3].iter().map(|r| r.percentage).sum();
        assert!((bucket_total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_global_empty() {
        assert!(aggregate_global(vec![UNKNOWN], Under5Basis::Classified).is_empty());
        assert!(aggregate_global(Vec::new(), Under5Basis::AllRecords).is_empty());
    }

    #[test]
    fn test_bucket_columns_union_in_order() {
        let pairs = vec![
            ("a", hours(50.0)),
            ("b", NormalizedDuration::Pending),
            ("b", hours(0.5)),
        ];
        let rows = aggregate_by_group(pairs, Under5Basis::Classified);
        assert_eq!(
            bucket_columns(&rows),
            vec![
                TimeBucket::ZeroToTwo,
                TimeBucket::OverFortyEight,
                TimeBucket::ScreenPending
            ]
        );
    }

    #[test]
    fn test_parse_under_five_basis() {
        assert_eq!(
            "classified".parse::<Under5Basis>(),
            Ok(Under5Basis::Classified)
        );
        assert_eq!(" ALL ".parse::<Under5Basis>(), Ok(Under5Basis::AllRecords));
        assert!("sometimes".parse::<Under5Basis>().is_err());
    }
}
