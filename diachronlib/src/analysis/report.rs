use std::collections::BTreeMap;

use serde::{Serialize, Deserialize};

use crate::prelude::*;

#[derive(Default, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    pub spearman: Option<f64>,
    pub pearson: Option<f64>
}

impl Correlation {
    #[inline]
    pub fn between(a: &[f64], b: &[f64]) -> Self {
        Self {
            spearman: spearman(a, b),
            pearson: pearson(a, b)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Values of the word within one corpus, ordered by year.
pub struct CorpusSeries {
    pub corpus: Corpus,
    pub years: Vec<i32>,
    pub counts: Vec<f64>,
    pub frequencies: Vec<f64>,
    pub similarities: Vec<f64>,

    /// `1 - similarity`
    pub distances: Vec<f64>,

    /// Distances discounted by the log frequency, see [`normalized_distance`].
    pub normalized_distances: Option<Vec<f64>>,

    pub average_frequency: f64,
    pub average_similarity: f64,

    /// Average self-similarity of the whole word list, if known.
    pub list_average: Option<Vec<(i32, f64)>>
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Deep-dive analysis of a single word.
pub struct WordReport {
    pub word: String,
    pub corpora: Vec<CorpusSeries>,

    /// Similarity series of the two corpora.
    pub similarity: Correlation,

    /// Frequency series of the two corpora.
    pub frequency: Correlation,

    /// Similarity and frequency series of each corpus.
    pub similarity_frequency: BTreeMap<Corpus, Correlation>
}

/// Self-distance normalized by the word frequency:
///
/// ```text
/// (1 - similarity[i]) / ((log10(frequency[i]) + 1) / min(log10(frequency) + 1))
/// ```
///
/// Return `None` if any frequency is not positive or the
/// minimal log term is not positive.
pub fn normalized_distance(similarities: &[f64], frequencies: &[f64]) -> Option<Vec<f64>> {
    if similarities.len() != frequencies.len() || frequencies.iter().any(|frequency| *frequency <= 0.0) {
        return None;
    }

    let log_terms = frequencies.iter()
        .map(|frequency| frequency.log10() + 1.0)
        .collect::<Vec<_>>();

    let min = log_terms.iter().copied().reduce(f64::min)?;

    if min <= 0.0 {
        return None;
    }

    let distances = similarities.iter()
        .zip(log_terms)
        .map(|(similarity, log_term)| (1.0 - similarity) / (log_term / min))
        .collect();

    Some(distances)
}

#[inline]
fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

impl CorpusSeries {
    fn new(corpus: Corpus, result: &WordResult, averages: Option<&AverageSimilarity>) -> Self {
        let values = |metric: Metric| {
            result.series(metric, corpus)
                .into_iter()
                .map(|(_, value)| value)
                .collect::<Vec<_>>()
        };

        let years = result.series(Metric::Similarity, corpus)
            .into_iter()
            .map(|(year, _)| year)
            .collect();

        let counts = values(Metric::Count);
        let frequencies = values(Metric::Frequency);
        let similarities = values(Metric::Similarity);

        let distances = similarities.iter()
            .map(|similarity| 1.0 - similarity)
            .collect();

        let list_average = averages.and_then(|averages| averages.get(corpus))
            .map(|average| {
                average.similarity.iter()
                    .map(|(year, similarity)| (*year, *similarity))
                    .collect()
            });

        Self {
            corpus,
            years,
            normalized_distances: normalized_distance(&similarities, &frequencies),
            average_frequency: mean(&frequencies),
            average_similarity: mean(&similarities),
            counts,
            frequencies,
            similarities,
            distances,
            list_average
        }
    }
}

impl WordReport {
    /// Build report of the word from the complete results.
    pub fn build(table: &ResultTable, word: &str, averages: Option<&AverageSimilarity>) -> anyhow::Result<Self> {
        if table.layout().pairs().is_empty() {
            anyhow::bail!("Results don't have any years pairs");
        }

        let Some(result) = table.get(word) else {
            anyhow::bail!("Word '{word}' not found");
        };

        if !table.is_complete(result) {
            anyhow::bail!("Word '{word}' doesn't have complete results");
        }

        let corpora = Corpus::ALL.into_iter()
            .map(|corpus| CorpusSeries::new(corpus, result, averages))
            .collect::<Vec<_>>();

        let (first, second) = (&corpora[0], &corpora[1]);

        let similarity_frequency = corpora.iter()
            .map(|series| (series.corpus, Correlation::between(&series.similarities, &series.frequencies)))
            .collect();

        Ok(Self {
            word: word.to_string(),
            similarity: Correlation::between(&first.similarities, &second.similarities),
            frequency: Correlation::between(&first.frequencies, &second.frequencies),
            similarity_frequency,
            corpora
        })
    }

    #[inline]
    pub fn corpus(&self, corpus: Corpus) -> Option<&CorpusSeries> {
        self.corpora.iter().find(|series| series.corpus == corpus)
    }
}

#[test]
fn test_normalized_distance() {
    // Log terms are [1, 2, 3].
    let Some(distances) = normalized_distance(&[0.5, 0.5, 0.7], &[1.0, 10.0, 100.0]) else {
        panic!("distance must be defined");
    };

    for (distance, expected) in distances.iter().zip([0.5, 0.25, 0.1]) {
        assert!((distance - expected).abs() < 1e-9);
    }

    assert_eq!(normalized_distance(&[0.5, 0.5], &[1.0, 0.0]), None);

    // log10(0.01) + 1 < 0
    assert_eq!(normalized_distance(&[0.5, 0.5], &[0.01, 10.0]), None);
}

#[test]
fn test_word_report() -> anyhow::Result<()> {
    let table = crate::analysis::table::test_table();

    let report = WordReport::build(&table, "kat", None)?;

    assert_eq!(report.corpora.len(), 2);

    let Some(trouw) = report.corpus(Corpus::Trouw) else {
        anyhow::bail!("Trouw series is missing");
    };

    assert_eq!(trouw.years, [1995, 1996]);
    assert_eq!(trouw.counts, [40.0, 50.0]);
    assert_eq!(trouw.similarities, [0.75, 0.875]);
    assert_eq!(trouw.distances, [0.25, 0.125]);
    assert_eq!(trouw.average_frequency, 2.5);
    assert!(trouw.normalized_distances.is_some());
    assert!(trouw.list_average.is_none());

    assert_eq!(report.similarity.spearman, Some(1.0));
    assert_eq!(report.similarity_frequency[&Corpus::Volkskrant].spearman, Some(1.0));

    assert!(WordReport::build(&table, "hond", None).is_err());
    assert!(WordReport::build(&table, "vis", None).is_err());

    Ok(())
}
