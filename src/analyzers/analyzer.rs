use crate::analyzers::aggregate::{Under5Basis, aggregate_by_group, aggregate_global};
use crate::analyzers::answers::{SchemeChoice, aggregate_answers};
use crate::duration::normalize;
use crate::model::{
    AggregationRow, AnswerAggregationRow, GlobalBucketRow, NormalizedDuration, ScreeningRecord,
    UnknownReason,
};
use tracing::debug;

/// Counts of records that did not make it into a percentage.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DataQuality {
    pub dropped_missing_key: usize,
    pub missing_input: usize,
    pub negative_elapsed: usize,
    pub unparseable: usize,
}

impl DataQuality {
    fn record(&mut self, duration: NormalizedDuration) {
        match duration {
            NormalizedDuration::Unknown(UnknownReason::MissingInput) => self.missing_input += 1,
            NormalizedDuration::Unknown(UnknownReason::NegativeElapsed) => {
                self.negative_elapsed += 1
            }
            NormalizedDuration::Unknown(UnknownReason::Unparseable) => self.unparseable += 1,
            NormalizedDuration::Hours(_) | NormalizedDuration::Pending => {}
        }
    }

    /// Total records left out of bucket percentages.
    pub fn excluded(&self) -> usize {
        self.dropped_missing_key + self.missing_input + self.negative_elapsed + self.unparseable
    }
}

/// Per-job bucket breakdown.
#[derive(Debug, Clone)]
pub struct TimeReport {
    pub rows: Vec<AggregationRow>,
    pub quality: DataQuality,
}

/// Returns the job id when it is present and not blank.
fn job_key(record: &ScreeningRecord) -> Option<&str> {
    record
        .job_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
}

/// Normalizes every record and breaks the durations down per job.
///
/// Records without a job id are dropped and counted.
#[tracing::instrument(skip(records), fields(records = records.len()))]
pub fn time_analysis(records: &[ScreeningRecord], basis: Under5Basis) -> TimeReport {
    let mut quality = DataQuality::default();
    let mut pairs = Vec::with_capacity(records.len());

    for record in records {
        let Some(key) = job_key(record) else {
            quality.dropped_missing_key += 1;
            continue;
        };
        let duration = normalize(record);
        quality.record(duration);
        pairs.push((key, duration));
    }

    let rows = aggregate_by_group(pairs, basis);
    debug!(groups = rows.len(), excluded = quality.excluded(), "Time analysis done");

    TimeReport { rows, quality }
}

/// Normalizes every record and breaks the durations down over the whole set.
///
/// Records without a job id are dropped and counted, as in the per-job report.
#[tracing::instrument(skip(records), fields(records = records.len()))]
pub fn average_time_analysis(
    records: &[ScreeningRecord],
    basis: Under5Basis,
) -> (Vec<GlobalBucketRow>, DataQuality) {
    let mut quality = DataQuality::default();
    let mut durations = Vec::with_capacity(records.len());

    for record in records {
        if job_key(record).is_none() {
            quality.dropped_missing_key += 1;
            continue;
        }
        let duration = normalize(record);
        quality.record(duration);
        durations.push(duration);
    }

    (aggregate_global(durations, basis), quality)
}

/// Answer rates per job and question.
///
/// Records lacking a job id, a question or an answer label are skipped.
#[tracing::instrument(skip(records), fields(records = records.len()))]
pub fn answer_analysis(
    records: &[ScreeningRecord],
    choice: SchemeChoice,
) -> Vec<AnswerAggregationRow> {
    let triples: Vec<_> = records
        .iter()
        .filter_map(|record| {
            Some((
                job_key(record)?,
                record.qualifying_question_label.as_deref()?,
                record.candidate_status_label.as_deref()?,
            ))
        })
        .collect();

    debug!(
        usable = triples.len(),
        skipped = records.len() - triples.len(),
        "Answer triples collected"
    );

    aggregate_answers(&triples, choice)
}
