use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use serde::{Serialize, Deserialize};

use crate::prelude::*;

/// Delimiter of the exported table columns.
pub const CSV_DELIMITER: char = ';';

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Self-similarity of the pair reported under the year.
    Similarity,

    /// Raw count of the word in the year slice.
    Count,

    /// Count per million tokens of the year slice.
    Frequency
}

impl Metric {
    pub const ALL: [Self; 3] = [Self::Similarity, Self::Count, Self::Frequency];

    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Similarity => "similarity",
            Self::Count => "count",
            Self::Frequency => "frequency"
        }
    }
}

impl std::fmt::Display for Metric {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
/// Address of a single value of the word result.
///
/// Keys are ordered by metric, then corpus, then year.
pub struct ResultKey {
    pub metric: Metric,
    pub corpus: Corpus,
    pub year: i32
}

impl ResultKey {
    #[inline]
    pub fn new(metric: Metric, corpus: Corpus, year: i32) -> Self {
        Self {
            metric,
            corpus,
            year
        }
    }
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
/// All the values known for a single word.
pub struct WordResult {
    values: BTreeMap<Metric, BTreeMap<Corpus, BTreeMap<i32, f64>>>
}

impl WordResult {
    #[inline]
    pub fn insert(&mut self, key: ResultKey, value: f64) {
        self.values.entry(key.metric)
            .or_default()
            .entry(key.corpus)
            .or_default()
            .insert(key.year, value);
    }

    #[inline]
    pub fn get(&self, key: ResultKey) -> Option<f64> {
        self.values.get(&key.metric)?
            .get(&key.corpus)?
            .get(&key.year)
            .copied()
    }

    #[inline]
    pub fn contains(&self, key: ResultKey) -> bool {
        self.get(key).is_some()
    }

    /// Amount of stored values.
    pub fn len(&self) -> usize {
        self.values.values()
            .flat_map(|corpora| corpora.values())
            .map(BTreeMap::len)
            .sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over all the values in the keys order.
    pub fn iter(&self) -> impl Iterator<Item = (ResultKey, f64)> + '_ {
        self.values.iter().flat_map(|(metric, corpora)| {
            corpora.iter().flat_map(move |(corpus, years)| {
                years.iter().map(move |(year, value)| (ResultKey::new(*metric, *corpus, *year), *value))
            })
        })
    }

    /// Values of the metric in the corpus ordered by year.
    pub fn series(&self, metric: Metric, corpus: Corpus) -> Vec<(i32, f64)> {
        self.values.get(&metric)
            .and_then(|corpora| corpora.get(&corpus))
            .map(|years| years.iter().map(|(year, value)| (*year, *value)).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Results of a word list queried against both corpora chains.
pub struct ResultTable {
    layout: ChainLayout,
    words: BTreeMap<String, WordResult>
}

#[derive(Default, Debug, Clone, PartialEq, Eq)]
/// Outcome of the table export.
pub struct ExportReport {
    pub rows: usize,

    /// Words omitted because their results are incomplete.
    pub omitted: Vec<String>
}

/// Quote the CSV field if needed.
fn escape_field(field: &str) -> String {
    if field.contains([CSV_DELIMITER, '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

impl ResultTable {
    #[inline]
    pub fn new(layout: ChainLayout) -> Self {
        Self {
            layout,
            words: BTreeMap::new()
        }
    }

    #[inline]
    pub fn layout(&self) -> &ChainLayout {
        &self.layout
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    #[inline]
    /// Register the word without any values.
    pub fn add_word(&mut self, word: impl Into<String>) -> &mut WordResult {
        self.words.entry(word.into()).or_default()
    }

    #[inline]
    pub fn insert(&mut self, word: impl Into<String>, key: ResultKey, value: f64) {
        self.add_word(word).insert(key, value);
    }

    #[inline]
    pub fn get(&self, word: &str) -> Option<&WordResult> {
        self.words.get(word)
    }

    #[inline]
    pub fn words(&self) -> impl Iterator<Item = (&str, &WordResult)> + '_ {
        self.words.iter().map(|(word, result)| (word.as_str(), result))
    }

    /// Keys which every complete word result must have.
    pub fn expected_keys(&self) -> Vec<ResultKey> {
        let years = self.layout.pair_years();

        let mut keys = Vec::with_capacity(Metric::ALL.len() * Corpus::ALL.len() * years.len());

        for metric in Metric::ALL {
            for corpus in Corpus::ALL {
                for year in &years {
                    keys.push(ResultKey::new(metric, corpus, *year));
                }
            }
        }

        keys
    }

    /// Check that the result has a value for every expected key.
    pub fn is_complete(&self, result: &WordResult) -> bool {
        self.expected_keys()
            .into_iter()
            .all(|key| result.contains(key))
    }

    /// Iterate over the words with complete results.
    pub fn complete_words(&self) -> impl Iterator<Item = (&str, &WordResult)> + '_ {
        let expected = self.expected_keys();

        self.words().filter(move |(_, result)| {
            expected.iter().all(|key| result.contains(*key))
        })
    }

    /// Words with incomplete results.
    pub fn incomplete_words(&self) -> Vec<&str> {
        self.words()
            .filter(|(_, result)| !self.is_complete(result))
            .map(|(word, _)| word)
            .collect()
    }

    /// Header of the exported table.
    ///
    /// ```text
    /// word;similarity_<corpus>_<from>_<to>;count_<corpus>_<year>;frequency_<corpus>_<year>;...
    /// ```
    pub fn columns(&self) -> Vec<String> {
        let pairs = self.layout.pairs();

        let mut columns = Vec::with_capacity(1 + Corpus::ALL.len() * pairs.len() * Metric::ALL.len());

        columns.push(String::from("word"));

        for corpus in Corpus::ALL {
            for pair in &pairs {
                columns.push(format!("similarity_{corpus}_{}_{}", pair.from, pair.to));
                columns.push(format!("count_{corpus}_{}", pair.year));
                columns.push(format!("frequency_{corpus}_{}", pair.year));
            }
        }

        columns
    }

    /// Write complete word results as a delimited table.
    pub fn write_csv(&self, mut writer: impl Write) -> anyhow::Result<ExportReport> {
        let pairs = self.layout.pairs();
        let delimiter = CSV_DELIMITER.to_string();

        writeln!(writer, "{}", self.columns().join(&delimiter))?;

        let mut report = ExportReport::default();

        for (word, result) in self.words() {
            if !self.is_complete(result) {
                tracing::warn!(word, "no complete results, row omitted");

                report.omitted.push(word.to_string());

                continue;
            }

            let mut row = vec![escape_field(word)];

            for corpus in Corpus::ALL {
                for pair in &pairs {
                    for metric in Metric::ALL {
                        if let Some(value) = result.get(ResultKey::new(metric, corpus, pair.year)) {
                            row.push(value.to_string());
                        }
                    }
                }
            }

            writeln!(writer, "{}", row.join(&delimiter))?;

            report.rows += 1;
        }

        writer.flush()?;

        Ok(report)
    }

    pub fn save_csv(&self, path: impl AsRef<Path>) -> anyhow::Result<ExportReport> {
        let path = path.as_ref();

        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create results table {path:?}"))?;

        self.write_csv(std::io::BufWriter::new(file))
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();

        std::fs::write(path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("Failed to write results file {path:?}"))?;

        Ok(())
    }

    pub fn load_json(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();

        let document = std::fs::read(path)
            .with_context(|| format!("Results file {path:?} doesn't exist or can't be read"))?;

        serde_json::from_slice(&document)
            .with_context(|| format!("Invalid results file {path:?}"))
    }
}

#[cfg(test)]
/// Table with complete results for "kat" and a single value for "hond".
pub(crate) fn test_table() -> ResultTable {
    let mut table = ResultTable::new(ChainLayout::new(Direction::Forward, vec![1994, 1995, 1996], false));

    for corpus in Corpus::ALL {
        for (i, year) in [1995, 1996].into_iter().enumerate() {
            table.insert("kat", ResultKey::new(Metric::Similarity, corpus, year), 0.75 + i as f64 * 0.125);
            table.insert("kat", ResultKey::new(Metric::Count, corpus, year), 40.0 + i as f64 * 10.0);
            table.insert("kat", ResultKey::new(Metric::Frequency, corpus, year), 2.0 + i as f64);
        }
    }

    table.insert("hond", ResultKey::new(Metric::Count, Corpus::Trouw, 1995), 12.0);

    table
}

#[test]
fn test_word_result() {
    let mut result = WordResult::default();

    result.insert(ResultKey::new(Metric::Frequency, Corpus::Trouw, 1996), 3.5);
    result.insert(ResultKey::new(Metric::Count, Corpus::Trouw, 1995), 20.0);
    result.insert(ResultKey::new(Metric::Count, Corpus::Volkskrant, 1996), 30.0);
    result.insert(ResultKey::new(Metric::Count, Corpus::Trouw, 1994), 10.0);

    assert_eq!(result.len(), 4);
    assert_eq!(result.get(ResultKey::new(Metric::Count, Corpus::Trouw, 1995)), Some(20.0));
    assert_eq!(result.get(ResultKey::new(Metric::Similarity, Corpus::Trouw, 1995)), None);

    let keys = result.iter().map(|(key, _)| key).collect::<Vec<_>>();

    assert_eq!(keys, [
        ResultKey::new(Metric::Count, Corpus::Volkskrant, 1996),
        ResultKey::new(Metric::Count, Corpus::Trouw, 1994),
        ResultKey::new(Metric::Count, Corpus::Trouw, 1995),
        ResultKey::new(Metric::Frequency, Corpus::Trouw, 1996)
    ]);

    assert_eq!(result.series(Metric::Count, Corpus::Trouw), [(1994, 10.0), (1995, 20.0)]);
}

#[test]
fn test_result_table() -> anyhow::Result<()> {
    let table = test_table();

    assert_eq!(table.expected_keys().len(), 12);
    assert_eq!(table.incomplete_words(), ["hond"]);
    assert_eq!(table.complete_words().map(|(word, _)| word).collect::<Vec<_>>(), ["kat"]);

    let columns = table.columns();

    assert_eq!(columns.len(), 13);
    assert_eq!(columns[1], "similarity_volkskrant_1994_1995");
    assert_eq!(columns[2], "count_volkskrant_1995");
    assert_eq!(columns[3], "frequency_volkskrant_1995");
    assert_eq!(columns[7], "similarity_trouw_1994_1995");

    let mut csv = Vec::new();

    let report = table.write_csv(&mut csv)?;

    assert_eq!(report.rows, 1);
    assert_eq!(report.omitted, ["hond"]);

    let csv = String::from_utf8(csv)?;
    let lines = csv.lines().collect::<Vec<_>>();

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], columns.join(";"));
    assert_eq!(lines[1], "kat;0.75;40;2;0.875;50;3;0.75;40;2;0.875;50;3");

    let dir = tempfile::tempdir()?;

    table.save_json(dir.path().join("results.json"))?;

    assert_eq!(ResultTable::load_json(dir.path().join("results.json"))?, table);

    Ok(())
}
