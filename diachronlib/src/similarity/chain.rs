use serde::{Serialize, Deserialize};

use crate::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Ordered list of models produced by a training chain.
///
/// With the anchor the chain is `initial, years...`, otherwise
/// just `years...`. Every two adjacent models form a pair.
pub struct ChainLayout {
    direction: Direction,
    years: Vec<i32>,
    anchor: bool
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Two adjacent models of the chain.
pub struct ChainPair {
    /// Index of the pair, `0..pairs`.
    pub index: usize,

    pub from: SliceLabel,
    pub to: SliceLabel,

    /// Year the pair's values are reported under.
    pub year: i32
}

impl ChainLayout {
    #[inline]
    pub fn new(direction: Direction, years: Vec<i32>, anchor: bool) -> Self {
        Self {
            years: direction.order(years),
            direction,
            anchor
        }
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[inline]
    /// Years of the chain in the training order.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    #[inline]
    pub fn has_anchor(&self) -> bool {
        self.anchor
    }

    /// Labels of all the chain models in order.
    pub fn labels(&self) -> Vec<SliceLabel> {
        let mut labels = Vec::with_capacity(self.years.len() + 1);

        if self.anchor {
            labels.push(SliceLabel::Initial);
        }

        labels.extend(self.years.iter().copied().map(SliceLabel::Year));

        labels
    }

    /// Adjacent pairs of the chain models.
    ///
    /// The pair is reported under the year of its later model:
    /// with the anchor `years[i - 1]`, otherwise `years[i]`.
    pub fn pairs(&self) -> Vec<ChainPair> {
        let labels = self.labels();

        labels.windows(2)
            .enumerate()
            .filter_map(|(index, labels)| {
                Some(ChainPair {
                    index,
                    from: labels[0],
                    to: labels[1],
                    year: labels[1].year()?
                })
            })
            .collect()
    }

    #[inline]
    /// Years of the chain pairs in order.
    pub fn pair_years(&self) -> Vec<i32> {
        self.pairs()
            .into_iter()
            .map(|pair| pair.year)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Loaded models of a single corpus chain.
pub struct ModelChain {
    corpus: Corpus,
    layout: ChainLayout,
    models: Vec<EmbeddingModel>
}

impl ModelChain {
    /// Load all the chain models from the workspace.
    ///
    /// Missing model file is a fatal error.
    pub fn load(workspace: &Workspace, corpus: Corpus, layout: ChainLayout) -> anyhow::Result<Self> {
        let labels = layout.labels();

        let mut models = Vec::with_capacity(labels.len());

        for label in labels {
            let path = workspace.model_path(corpus, label, layout.direction());

            tracing::info!(%corpus, %label, ?path, "loading model");

            models.push(EmbeddingModel::load(&path)?);
        }

        Self::from_models(corpus, layout, models)
    }

    /// Build chain from already loaded models, one per layout label.
    pub fn from_models(corpus: Corpus, layout: ChainLayout, models: Vec<EmbeddingModel>) -> anyhow::Result<Self> {
        let expected = layout.labels().len();

        if models.len() != expected {
            anyhow::bail!("Chain of {corpus} needs {expected} models, got {}", models.len());
        }

        Ok(Self {
            corpus,
            layout,
            models
        })
    }

    #[inline]
    pub fn corpus(&self) -> Corpus {
        self.corpus
    }

    #[inline]
    pub fn layout(&self) -> &ChainLayout {
        &self.layout
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    #[inline]
    pub fn model(&self, index: usize) -> Option<&EmbeddingModel> {
        self.models.get(index)
    }

    #[inline]
    /// Get earlier and later models of the pair.
    pub fn pair(&self, index: usize) -> Option<(&EmbeddingModel, &EmbeddingModel)> {
        Some((self.models.get(index)?, self.models.get(index + 1)?))
    }

    #[inline]
    /// Self-similarity of the word within the pair.
    ///
    /// Return `None` if the pair doesn't exist or any
    /// of its models doesn't have the word.
    pub fn similarity(&self, pair: usize, word: &str) -> Option<f64> {
        let (from, to) = self.pair(pair)?;

        to.self_similarity(from, word)
    }
}

#[test]
fn test_chain_layout() {
    let layout = ChainLayout::new(Direction::Reverse, vec![1994, 1996, 1995], false);

    assert_eq!(layout.years(), &[1996, 1995, 1994]);
    assert_eq!(layout.labels(), [SliceLabel::Year(1996), SliceLabel::Year(1995), SliceLabel::Year(1994)]);

    let pairs = layout.pairs();

    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs[0], ChainPair { index: 0, from: SliceLabel::Year(1996), to: SliceLabel::Year(1995), year: 1995 });
    assert_eq!(layout.pair_years(), [1995, 1994]);

    let layout = ChainLayout::new(Direction::Forward, vec![1994, 1995, 1996], true);

    assert_eq!(layout.labels()[0], SliceLabel::Initial);
    assert_eq!(layout.pairs()[0], ChainPair { index: 0, from: SliceLabel::Initial, to: SliceLabel::Year(1994), year: 1994 });
    assert_eq!(layout.pair_years(), [1994, 1995, 1996]);

    assert!(ChainLayout::new(Direction::Forward, vec![1994], false).pairs().is_empty());
}

#[test]
fn test_model_chain() -> anyhow::Result<()> {
    let layout = ChainLayout::new(Direction::Forward, vec![1994, 1995], false);

    let mut model_1994 = EmbeddingModel::new(2);
    let mut model_1995 = EmbeddingModel::new(2);

    model_1994.insert("kat", &[1.0, 0.0])?;
    model_1995.insert("kat", &[0.0, 1.0])?;
    model_1995.insert("hond", &[1.0, 1.0])?;

    assert!(ModelChain::from_models(Corpus::Trouw, layout.clone(), vec![model_1994.clone()]).is_err());

    let chain = ModelChain::from_models(Corpus::Trouw, layout, vec![model_1994, model_1995])?;

    assert_eq!(chain.len(), 2);
    assert_eq!(chain.similarity(0, "kat"), Some(0.0));
    assert_eq!(chain.similarity(0, "hond"), None);
    assert_eq!(chain.similarity(1, "kat"), None);
    assert!(chain.pair(1).is_none());

    Ok(())
}
