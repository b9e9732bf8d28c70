use std::path::Path;

use anyhow::Context;

use crate::prelude::*;

/// Read list of words, one per line.
///
/// Blank lines are ignored, lines with more than one word are skipped.
pub fn read_word_list(path: impl AsRef<Path>) -> anyhow::Result<Vec<String>> {
    let path = path.as_ref();

    let list = std::fs::read_to_string(path)
        .with_context(|| format!("Word list {path:?} doesn't exist or can't be read"))?;

    let mut words = Vec::new();

    for line in list.lines() {
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        if line.contains(char::is_whitespace) {
            tracing::warn!(line, "more than one word on the line, skipping");

            continue;
        }

        words.push(line.to_string());
    }

    Ok(words)
}

#[derive(Debug)]
/// Collects similarities, counts and frequencies of a word list
/// from the persisted chain models and the slice statistics.
pub struct ResultBuilder<'a> {
    workspace: &'a Workspace,
    stats: &'a StatsDatabase,
    layout: ChainLayout,
    count_mode: CountMode
}

impl<'a> ResultBuilder<'a> {
    #[inline]
    pub fn new(workspace: &'a Workspace, stats: &'a StatsDatabase, layout: ChainLayout) -> Self {
        Self {
            workspace,
            stats,
            layout,
            count_mode: CountMode::default()
        }
    }

    #[inline]
    pub fn with_count_mode(mut self, count_mode: CountMode) -> Self {
        self.count_mode = count_mode;

        self
    }

    /// Load chains of all the corpora and query the words.
    pub fn build(&self, words: &[String]) -> anyhow::Result<ResultTable> {
        let mut table = ResultTable::new(self.layout.clone());

        for word in words {
            table.add_word(word.as_str());
        }

        for corpus in Corpus::ALL {
            let chain = ModelChain::load(self.workspace, corpus, self.layout.clone())?;

            self.insert_chain(&mut table, &chain, words)?;
        }

        Ok(table)
    }

    /// Query the words against a loaded chain.
    ///
    /// Similarity is stored only for the pairs where the word was found.
    /// Counts and frequencies are stored for every pair year.
    pub fn insert_chain(&self, table: &mut ResultTable, chain: &ModelChain, words: &[String]) -> anyhow::Result<()> {
        if chain.layout() != table.layout() {
            anyhow::bail!("Chain of {} has different layout than the results table", chain.corpus());
        }

        let corpus = chain.corpus();

        let mut totals = Vec::new();

        for year in table.layout().pair_years() {
            let slice = self.workspace.slice(corpus, year)?;
            let summary = self.stats.ensure_indexed(&slice)?;

            totals.push((year, summary.tokens));
        }

        for word in words {
            let series = chain.query(&SimilarityQuery::new(word));

            for (pair, similarity) in series.found() {
                table.insert(word.as_str(), ResultKey::new(Metric::Similarity, corpus, pair.year), similarity);
            }

            if !series.is_complete() {
                tracing::warn!(%corpus, word = word.as_str(), "word not found in some of the models");
            }

            for (year, tokens) in &totals {
                let count = self.stats.query_count(corpus, *year, word)?
                    .get(self.count_mode);

                let frequency = if *tokens > 0 {
                    count as f64 / *tokens as f64 * 1_000_000.0
                } else {
                    0.0
                };

                table.insert(word.as_str(), ResultKey::new(Metric::Count, corpus, *year), count as f64);
                table.insert(word.as_str(), ResultKey::new(Metric::Frequency, corpus, *year), frequency);
            }
        }

        Ok(())
    }
}

#[test]
fn test_read_word_list() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("words.txt");

    std::fs::write(&path, "kat\n\nde hond\n  vis \n")?;

    assert_eq!(read_word_list(&path)?, ["kat", "vis"]);
    assert!(read_word_list(dir.path().join("missing.txt")).is_err());

    Ok(())
}

#[test]
fn test_result_builder() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let workspace = Workspace::new(dir.path());

    let layout = ChainLayout::new(Direction::Forward, vec![1994, 1995], false);

    std::fs::write(workspace.slice_path(Corpus::Trouw, 1995), "de kat de kat\nde hond\n")?;

    let mut model_1994 = EmbeddingModel::new(2);
    let mut model_1995 = EmbeddingModel::new(2);

    model_1994.insert("kat", &[1.0, 0.0])?;
    model_1995.insert("kat", &[1.0, 0.0])?;
    model_1995.insert("hond", &[0.0, 1.0])?;

    let chain = ModelChain::from_models(Corpus::Trouw, layout.clone(), vec![model_1994, model_1995])?;

    let stats = StatsDatabase::open(workspace.stats_path(), -4096)?;
    let builder = ResultBuilder::new(&workspace, &stats, layout.clone());

    let words = [String::from("kat"), String::from("hond")];

    let mut table = ResultTable::new(layout);

    builder.insert_chain(&mut table, &chain, &words)?;

    let Some(kat) = table.get("kat") else {
        anyhow::bail!("Results of kat are missing");
    };

    assert_eq!(kat.get(ResultKey::new(Metric::Similarity, Corpus::Trouw, 1995)), Some(1.0));
    assert_eq!(kat.get(ResultKey::new(Metric::Count, Corpus::Trouw, 1995)), Some(2.0));
    assert_eq!(kat.get(ResultKey::new(Metric::Frequency, Corpus::Trouw, 1995)), Some(2.0 / 6.0 * 1_000_000.0));

    let Some(hond) = table.get("hond") else {
        anyhow::bail!("Results of hond are missing");
    };

    assert_eq!(hond.get(ResultKey::new(Metric::Similarity, Corpus::Trouw, 1995)), None);
    assert_eq!(hond.get(ResultKey::new(Metric::Count, Corpus::Trouw, 1995)), Some(1.0));

    // Documents mode counts lines.
    let builder = ResultBuilder::new(&workspace, &stats, table.layout().clone())
        .with_count_mode(CountMode::Documents);

    builder.insert_chain(&mut table, &chain, &words)?;

    assert_eq!(table.get("kat").and_then(|kat| kat.get(ResultKey::new(Metric::Count, Corpus::Trouw, 1995))), Some(1.0));

    Ok(())
}
