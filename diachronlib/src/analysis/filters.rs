use serde::{Serialize, Deserialize};

use crate::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Word filter over the complete result rows.
pub enum WordFilter {
    /// Raw count must be at least the threshold in every year of both corpora.
    MinCount(u64),

    /// Frequency must be at least the threshold in every year of both corpora.
    MinFrequency(f64),

    /// Average frequency over all years of both corpora
    /// must be strictly greater than the threshold.
    MinAverageFrequency(f64)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// First value which made the word fail the filter.
pub struct Violation {
    pub corpus: Corpus,
    pub year: i32,
    pub value: f64
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterDecision {
    pub passed: bool,
    pub first_violation: Option<Violation>,

    /// Average value for the average-based filters.
    pub average: Option<f64>
}

#[derive(Default, Debug, Clone, PartialEq)]
/// Outcome of a filter applied to the whole results table.
pub struct FilterReport {
    /// Words which passed the filter, sorted.
    pub passed: Vec<String>,

    /// Words which failed the filter with their decisions.
    pub rejected: Vec<(String, FilterDecision)>,

    /// Words skipped because their results are incomplete.
    pub incomplete: Vec<String>
}

impl WordFilter {
    /// Evaluate filter on the word's values stored under the given keys.
    ///
    /// Keys are scanned in their sorted order, so the
    /// first violation is always the same. Values stored
    /// under other keys are ignored.
    pub fn evaluate(&self, result: &WordResult, keys: &[ResultKey]) -> FilterDecision {
        let mut keys = keys.to_vec();

        keys.sort();
        keys.dedup();

        match self {
            Self::MinCount(threshold) => Self::evaluate_min(result, &keys, Metric::Count, *threshold as f64),
            Self::MinFrequency(threshold) => Self::evaluate_min(result, &keys, Metric::Frequency, *threshold),

            Self::MinAverageFrequency(threshold) => {
                let frequencies = keys.iter()
                    .filter(|key| key.metric == Metric::Frequency)
                    .filter_map(|key| result.get(*key))
                    .collect::<Vec<_>>();

                let average = if frequencies.is_empty() {
                    None
                } else {
                    Some(frequencies.iter().sum::<f64>() / frequencies.len() as f64)
                };

                FilterDecision {
                    passed: average.map(|average| average > *threshold).unwrap_or(false),
                    first_violation: None,
                    average
                }
            }
        }
    }

    fn evaluate_min(result: &WordResult, keys: &[ResultKey], metric: Metric, threshold: f64) -> FilterDecision {
        let first_violation = keys.iter()
            .filter(|key| key.metric == metric)
            .filter_map(|key| Some((key, result.get(*key)?)))
            .find(|(_, value)| *value < threshold)
            .map(|(key, value)| Violation {
                corpus: key.corpus,
                year: key.year,
                value
            });

        FilterDecision {
            passed: first_violation.is_none(),
            first_violation,
            average: None
        }
    }
}

impl ResultTable {
    /// Apply filter to every complete word result.
    ///
    /// Only the values of the chain years are considered.
    pub fn filter(&self, filter: WordFilter) -> FilterReport {
        let mut report = FilterReport::default();

        let keys = self.expected_keys();

        for (word, result) in self.words() {
            if !self.is_complete(result) {
                report.incomplete.push(word.to_string());

                continue;
            }

            let decision = filter.evaluate(result, &keys);

            if decision.passed {
                report.passed.push(word.to_string());
            } else {
                report.rejected.push((word.to_string(), decision));
            }
        }

        report
    }
}

#[cfg(test)]
fn keys_of(result: &WordResult) -> Vec<ResultKey> {
    result.iter()
        .map(|(key, _)| key)
        .collect()
}

#[cfg(test)]
fn result_with(metric: Metric, values: &[(Corpus, i32, f64)]) -> WordResult {
    let mut result = WordResult::default();

    for (corpus, year, value) in values {
        result.insert(ResultKey::new(metric, *corpus, *year), *value);
    }

    result
}

#[test]
fn test_min_count_filter() {
    let result = result_with(Metric::Count, &[
        (Corpus::Trouw, 1994, 50.0),
        (Corpus::Trouw, 1995, 20.0),
        (Corpus::Trouw, 1996, 80.0)
    ]);

    let decision = WordFilter::MinCount(30).evaluate(&result, &keys_of(&result));

    assert!(!decision.passed);
    assert_eq!(decision.first_violation, Some(Violation { corpus: Corpus::Trouw, year: 1995, value: 20.0 }));

    // Same decision every time.
    assert_eq!(WordFilter::MinCount(30).evaluate(&result, &keys_of(&result)), decision);

    assert!(WordFilter::MinCount(20).evaluate(&result, &keys_of(&result)).passed);

    // Corpora are scanned in their canonical order.
    let result = result_with(Metric::Count, &[
        (Corpus::Trouw, 1994, 10.0),
        (Corpus::Volkskrant, 1996, 5.0)
    ]);

    let decision = WordFilter::MinCount(30).evaluate(&result, &keys_of(&result));

    assert_eq!(decision.first_violation, Some(Violation { corpus: Corpus::Volkskrant, year: 1996, value: 5.0 }));
}

#[test]
fn test_frequency_filters() {
    let result = result_with(Metric::Frequency, &[
        (Corpus::Volkskrant, 1994, 1.0),
        (Corpus::Volkskrant, 1995, 2.0),
        (Corpus::Trouw, 1994, 3.0)
    ]);

    let decision = WordFilter::MinAverageFrequency(1.5).evaluate(&result, &keys_of(&result));

    assert!(decision.passed);
    assert_eq!(decision.average, Some(2.0));

    assert!(!WordFilter::MinAverageFrequency(2.5).evaluate(&result, &keys_of(&result)).passed);
    assert!(!WordFilter::MinAverageFrequency(2.0).evaluate(&result, &keys_of(&result)).passed);

    let decision = WordFilter::MinFrequency(1.5).evaluate(&result, &keys_of(&result));

    assert_eq!(decision.first_violation, Some(Violation { corpus: Corpus::Volkskrant, year: 1994, value: 1.0 }));

    assert!(WordFilter::MinFrequency(1.0).evaluate(&result, &keys_of(&result)).passed);

    assert!(!WordFilter::MinAverageFrequency(0.0).evaluate(&WordResult::default(), &[]).passed);
}

#[test]
fn test_table_filter() {
    let table = crate::analysis::table::test_table();

    let report = table.filter(WordFilter::MinCount(45));

    assert!(report.passed.is_empty());
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].0, "kat");
    assert_eq!(report.incomplete, ["hond"]);

    let report = table.filter(WordFilter::MinFrequency(2.0));

    assert_eq!(report.passed, ["kat"]);
}

#[test]
fn test_filter_ignores_foreign_years() {
    let mut table = crate::analysis::table::test_table();

    // Year outside of the chain layout.
    table.insert("kat", ResultKey::new(Metric::Count, Corpus::Trouw, 1990), 1.0);
    table.insert("kat", ResultKey::new(Metric::Frequency, Corpus::Trouw, 1990), 100.0);

    let report = table.filter(WordFilter::MinCount(30));

    assert_eq!(report.passed, ["kat"]);

    let report = table.filter(WordFilter::MinAverageFrequency(2.5));

    assert!(report.passed.is_empty());
    assert_eq!(report.rejected[0].1.average, Some(2.5));
}
