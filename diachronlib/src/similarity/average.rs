use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use serde::{Serialize, Deserialize};

use crate::prelude::*;

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Average self-similarity of a word list within one corpus chain.
pub struct CorpusAverage {
    /// Amount of queried words.
    pub queried: usize,

    /// Amount of words found in every pair of the chain.
    /// Only these words contribute to the averages.
    pub found: usize,

    /// Average self-similarity per pair year.
    pub similarity: BTreeMap<i32, f64>
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Average self-similarity document of both corpora.
pub struct AverageSimilarity {
    pub layout: ChainLayout,
    pub corpora: BTreeMap<Corpus, CorpusAverage>
}

impl CorpusAverage {
    /// Average self-similarity of the words over the chain pairs.
    pub fn compute(chain: &ModelChain, words: &[String]) -> Self {
        let mut sums = BTreeMap::new();
        let mut found = 0;

        for word in words {
            let series = chain.query(&SimilarityQuery::new(word));

            if !series.is_complete() {
                tracing::debug!(corpus = %chain.corpus(), word, "word is missing in some of the models");

                continue;
            }

            for (pair, similarity) in series.found() {
                *sums.entry(pair.year).or_insert(0.0) += similarity;
            }

            found += 1;
        }

        let similarity = sums.into_iter()
            .map(|(year, sum)| (year, sum / found as f64))
            .collect();

        Self {
            queried: words.len(),
            found,
            similarity
        }
    }
}

impl AverageSimilarity {
    #[inline]
    pub fn new(layout: ChainLayout) -> Self {
        Self {
            layout,
            corpora: BTreeMap::new()
        }
    }

    /// Compute averages of the words for the chain's corpus.
    pub fn insert_chain(&mut self, chain: &ModelChain, words: &[String]) -> anyhow::Result<&CorpusAverage> {
        if chain.layout() != &self.layout {
            anyhow::bail!("Chain of {} has different layout", chain.corpus());
        }

        let average = CorpusAverage::compute(chain, words);

        tracing::info!(corpus = %chain.corpus(), found = average.found, queried = average.queried, "averaged self-similarity");

        self.corpora.insert(chain.corpus(), average);

        Ok(&self.corpora[&chain.corpus()])
    }

    #[inline]
    pub fn get(&self, corpus: Corpus) -> Option<&CorpusAverage> {
        self.corpora.get(&corpus)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();

        std::fs::write(path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("Failed to write average similarity file {path:?}"))?;

        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();

        let document = std::fs::read(path)
            .with_context(|| format!("Average similarity file {path:?} doesn't exist or can't be read"))?;

        serde_json::from_slice(&document)
            .with_context(|| format!("Invalid average similarity file {path:?}"))
    }
}

#[test]
fn test_average_similarity() -> anyhow::Result<()> {
    let layout = ChainLayout::new(Direction::Forward, vec![1994, 1995, 1996], false);

    let mut models = vec![EmbeddingModel::new(2), EmbeddingModel::new(2), EmbeddingModel::new(2)];

    for model in &mut models {
        model.insert("kat", &[1.0, 0.0])?;
    }

    models[0].insert("hond", &[1.0, 0.0])?;
    models[1].insert("hond", &[0.0, 1.0])?;
    models[2].insert("hond", &[0.0, 1.0])?;

    // Missing in 1995 and ignored.
    models[0].insert("vis", &[1.0, 0.0])?;
    models[2].insert("vis", &[-1.0, 0.0])?;

    let chain = ModelChain::from_models(Corpus::Trouw, layout.clone(), models)?;

    let words = ["kat", "hond", "vis"].map(String::from);

    let mut average = AverageSimilarity::new(layout);

    let trouw = average.insert_chain(&chain, &words)?.clone();

    assert_eq!(trouw.queried, 3);
    assert_eq!(trouw.found, 2);
    assert_eq!(trouw.similarity[&1995], 0.5);
    assert_eq!(trouw.similarity[&1996], 1.0);

    let dir = tempfile::tempdir()?;

    average.save(dir.path().join("average.json"))?;

    assert_eq!(AverageSimilarity::load(dir.path().join("average.json"))?, average);

    let other = ChainLayout::new(Direction::Reverse, vec![1994, 1995, 1996], false);

    assert!(AverageSimilarity::new(other).insert_chain(&chain, &words).is_err());

    Ok(())
}
