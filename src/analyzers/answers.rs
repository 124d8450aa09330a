use crate::analyzers::utility::pct;
use crate::model::AnswerAggregationRow;
use std::collections::BTreeMap;
use std::str::FromStr;

/// A set of answer labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerScheme {
    /// `Correct Answer` / `Wrong Answer` / `Not Applicable`
    Long,
    /// `Correct` / `Wrong` / `NA`
    Short,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Answer {
    Correct,
    Wrong,
    NotApplicable,
}

impl AnswerScheme {
    fn labels(self) -> [(&'static str, Answer); 3] {
        match self {
            AnswerScheme::Long => [
                ("correct answer", Answer::Correct),
                ("wrong answer", Answer::Wrong),
                ("not applicable", Answer::NotApplicable),
            ],
            AnswerScheme::Short => [
                ("correct", Answer::Correct),
                ("wrong", Answer::Wrong),
                ("na", Answer::NotApplicable),
            ],
        }
    }

    fn classify(self, label: &str) -> Option<Answer> {
        let label = label.trim().to_lowercase();
        self.labels()
            .into_iter()
            .find(|(name, _)| *name == label)
            .map(|(_, answer)| answer)
    }
}

/// How the label scheme is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SchemeChoice {
    /// Long scheme if any of its labels occurs, else short if any of its
    /// labels occurs.
    #[default]
    Auto,
    Fixed(AnswerScheme),
}

impl FromStr for SchemeChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(SchemeChoice::Auto),
            "long" => Ok(SchemeChoice::Fixed(AnswerScheme::Long)),
            "short" => Ok(SchemeChoice::Fixed(AnswerScheme::Short)),
            other => Err(format!(
                "invalid answer scheme '{other}', expected 'auto', 'long' or 'short'"
            )),
        }
    }
}

/// Picks the scheme whose labels occur in `labels`.
pub fn detect_scheme<'a, I>(labels: I) -> Option<AnswerScheme>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut short_seen = false;
    for label in labels {
        if AnswerScheme::Long.classify(label).is_some() {
            return Some(AnswerScheme::Long);
        }
        short_seen |= AnswerScheme::Short.classify(label).is_some();
    }
    short_seen.then_some(AnswerScheme::Short)
}

#[derive(Debug, Default)]
struct AnswerCounts {
    correct: usize,
    wrong: usize,
    not_applicable: usize,
}

impl AnswerCounts {
    fn total(&self) -> usize {
        self.correct + self.wrong + self.not_applicable
    }
}

/// Computes answer rates per `(job_id, question)`.
///
/// Labels outside the active scheme are ignored; pairs left with no
/// recognized answer produce no row.
pub fn aggregate_answers<'a>(
    triples: &[(&'a str, &'a str, &'a str)],
    choice: SchemeChoice,
) -> Vec<AnswerAggregationRow> {
    let scheme = match choice {
        SchemeChoice::Fixed(scheme) => scheme,
        SchemeChoice::Auto => match detect_scheme(triples.iter().map(|(_, _, label)| *label)) {
            Some(scheme) => scheme,
            None => return Vec::new(),
        },
    };

    let mut counts: BTreeMap<(&'a str, &'a str), AnswerCounts> = BTreeMap::new();

    for &(job_id, question, label) in triples {
        let Some(answer) = scheme.classify(label) else {
            continue;
        };
        let entry = counts.entry((job_id, question)).or_default();
        match answer {
            Answer::Correct => entry.correct += 1,
            Answer::Wrong => entry.wrong += 1,
            Answer::NotApplicable => entry.not_applicable += 1,
        }
    }

    counts
        .into_iter()
        .filter(|(_, c)| c.total() > 0)
        .map(|((job_id, question), c)| AnswerAggregationRow {
            job_id: job_id.to_string(),
            question: question.to_string(),
            percent_correct: pct(c.correct, c.total()),
            percent_wrong: pct(c.wrong, c.total()),
            percent_not_applicable: pct(c.not_applicable, c.total()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_correct_one_wrong() {
        let triples = vec![
            ("job", "q1", "Correct Answer"),
            ("job", "q1", "Correct Answer"),
            ("job", "q1", "Correct Answer"),
            ("job", "q1", "Wrong Answer"),
        ];
        let rows = aggregate_answers(&triples, SchemeChoice::Auto);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].percent_correct, 75.0);
        assert_eq!(rows[0].percent_wrong, 25.0);
        assert_eq!(rows[0].percent_not_applicable, 0.0);
    }

    #[test]
    fn test_short_scheme_detected() {
        let triples = vec![
            ("job", "q1", "Correct"),
            ("job", "q1", "NA"),
            ("job", "q2", "wrong"),
        ];
        let rows = aggregate_answers(&triples, SchemeChoice::Auto);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].question, "q1");
        assert_eq!(rows[0].percent_correct, 50.0);
        assert_eq!(rows[0].percent_not_applicable, 50.0);
        assert_eq!(rows[1].percent_wrong, 100.0);
    }

    #[test]
    fn test_long_scheme_wins_and_short_labels_ignored() {
        let triples = vec![
            ("job", "q1", "Correct"),
            ("job", "q1", "Not Applicable"),
            ("job", "q1", "Correct Answer"),
        ];
        let rows = aggregate_answers(&triples, SchemeChoice::Auto);
        assert_eq!(rows[0].percent_correct, 50.0);
        assert_eq!(rows[0].percent_not_applicable, 50.0);
    }

    #[test]
    fn test_unrecognized_labels_do_not_fail() {
        let triples = vec![("job", "q1", "Maybe"), ("job", "q2", "Skipped")];
        assert!(aggregate_answers(&triples, SchemeChoice::Auto).is_empty());

        let forced = aggregate_answers(&triples, SchemeChoice::Fixed(AnswerScheme::Short));
        assert!(forced.is_empty());
    }

    #[test]
    fn test_rows_sum_to_100_and_are_ordered() {
        let triples = vec![
            ("b", "q", "Correct Answer"),
            ("a", "q2", "Wrong Answer"),
            ("a", "q1", "Not Applicable"),
            ("a", "q1", "Correct Answer"),
            ("a", "q1", "Wrong Answer"),
        ];
        let rows = aggregate_answers(&triples, SchemeChoice::Fixed(AnswerScheme::Long));
        let keys: Vec<_> = rows
            .iter()
            .map(|r| (r.job_id.as_str(), r.question.as_str()))
            .collect();
        assert_eq!(keys, vec![("a", "q1"), ("a", "q2"), ("b", "q")]);

        for row in &rows {
            let total = row.percent_correct + row.percent_wrong + row.percent_not_applicable;
            assert!((total - 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_parse_scheme_choice() {
        assert_eq!("auto".parse::<SchemeChoice>(), Ok(SchemeChoice::Auto));
        assert_eq!(
            "Long".parse::<SchemeChoice>(),
            Ok(SchemeChoice::Fixed(AnswerScheme::Long))
        );
        assert!("medium".parse::<SchemeChoice>().is_err());
    }
}
