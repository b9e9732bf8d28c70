use serde::{Serialize, Deserialize};

use crate::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Request for the self-similarity series of a word.
pub struct SimilarityQuery {
    pub word: String
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Parsed line of the user input.
pub enum QueryCommand {
    Query(SimilarityQuery),

    /// Nothing to query after normalization.
    Skip,

    /// End of the queries stream.
    Exit
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "value")]
pub enum Similarity {
    Found(f64),

    /// Any of the pair's models doesn't have the word.
    NotFound
}

impl Similarity {
    #[inline]
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Found(value) => Some(*value),
            Self::NotFound => None
        }
    }

    #[inline]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityPoint {
    pub pair: ChainPair,
    pub similarity: Similarity
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Self-similarity of a word over all the pairs of a corpus chain.
pub struct SimilaritySeries {
    pub word: String,
    pub corpus: Corpus,
    pub points: Vec<SimilarityPoint>
}

impl SimilaritySeries {
    #[inline]
    /// Check if the word was found in every pair.
    pub fn is_complete(&self) -> bool {
        self.points.iter().all(|point| point.similarity.is_found())
    }

    #[inline]
    /// Iterate over the pairs where the word was found.
    pub fn found(&self) -> impl Iterator<Item = (&ChainPair, f64)> + '_ {
        self.points.iter()
            .filter_map(|point| Some((&point.pair, point.similarity.value()?)))
    }
}

/// Remove non-word characters from the user input.
pub fn normalize_query(input: &str) -> String {
    input.chars()
        .filter(|symbol| symbol.is_alphanumeric() || *symbol == '_')
        .collect()
}

impl QueryCommand {
    pub fn parse(input: &str) -> Self {
        let word = normalize_query(input);

        match word.as_str() {
            "" => Self::Skip,
            "quit" | "exit" => Self::Exit,

            _ => Self::Query(SimilarityQuery { word })
        }
    }
}

impl SimilarityQuery {
    #[inline]
    pub fn new(word: impl AsRef<str>) -> Self {
        Self {
            word: normalize_query(word.as_ref())
        }
    }
}

impl ModelChain {
    /// Compute self-similarity of the queried word for every pair.
    ///
    /// Missing word is never an error: its pairs are `NotFound`.
    pub fn query(&self, query: &SimilarityQuery) -> SimilaritySeries {
        let points = self.layout()
            .pairs()
            .into_iter()
            .map(|pair| {
                let similarity = match self.similarity(pair.index, &query.word) {
                    Some(similarity) => Similarity::Found(similarity),
                    None => Similarity::NotFound
                };

                SimilarityPoint {
                    pair,
                    similarity
                }
            })
            .collect();

        SimilaritySeries {
            word: query.word.clone(),
            corpus: self.corpus(),
            points
        }
    }
}

#[test]
fn test_query_command() {
    assert_eq!(normalize_query("  kat!?\n"), "kat");
    assert_eq!(normalize_query("zee_man's"), "zee_mans");

    assert_eq!(QueryCommand::parse("quit\n"), QueryCommand::Exit);
    assert_eq!(QueryCommand::parse("exit"), QueryCommand::Exit);
    assert_eq!(QueryCommand::parse("..."), QueryCommand::Skip);
    assert_eq!(QueryCommand::parse("Ève"), QueryCommand::Query(SimilarityQuery { word: String::from("Ève") }));
}

#[test]
fn test_similarity_series() -> anyhow::Result<()> {
    let layout = ChainLayout::new(Direction::Forward, vec![1994, 1995, 1996], false);

    let mut models = vec![EmbeddingModel::new(2), EmbeddingModel::new(2), EmbeddingModel::new(2)];

    models[0].insert("kat", &[1.0, 2.0])?;
    models[1].insert("kat", &[1.0, 2.0])?;
    models[2].insert("hond", &[1.0, 2.0])?;

    let chain = ModelChain::from_models(Corpus::Volkskrant, layout, models)?;

    let series = chain.query(&SimilarityQuery::new("kat"));

    assert_eq!(series.corpus, Corpus::Volkskrant);
    assert_eq!(series.points.len(), 2);
    assert_eq!(series.points[0].similarity, Similarity::Found(1.0));
    assert_eq!(series.points[0].pair.year, 1995);
    assert_eq!(series.points[1].similarity, Similarity::NotFound);

    assert!(!series.is_complete());
    assert_eq!(series.found().count(), 1);

    let series = chain.query(&SimilarityQuery::new("vis"));

    assert!(series.points.iter().all(|point| point.similarity == Similarity::NotFound));

    Ok(())
}
