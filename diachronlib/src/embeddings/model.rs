use std::collections::HashMap;

use crate::prelude::*;

#[derive(Default, Debug, Clone, PartialEq)]
/// Word vectors of a single slice model.
///
/// Models are immutable once persisted: querying runs
/// only load and read them.
pub struct EmbeddingModel {
    dimension: usize,
    words: Vec<String>,
    index: HashMap<String, usize>,
    vectors: Vec<f32>
}

impl EmbeddingModel {
    #[inline]
    /// Create empty model with given vectors dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            words: Vec::new(),
            index: HashMap::new(),
            vectors: Vec::new()
        }
    }

    #[inline]
    pub fn with_capacity(dimension: usize, words: usize) -> Self {
        Self {
            dimension,
            words: Vec::with_capacity(words),
            index: HashMap::with_capacity(words),
            vectors: Vec::with_capacity(words * dimension)
        }
    }

    /// Insert vector of the word, replacing the previous one.
    pub fn insert(&mut self, word: impl Into<String>, vector: &[f32]) -> anyhow::Result<()> {
        let word = word.into();

        if vector.len() != self.dimension {
            anyhow::bail!("Vector of word '{word}' has {} dimensions, expected {}", vector.len(), self.dimension);
        }

        match self.index.get(&word) {
            Some(i) => {
                self.vectors[i * self.dimension..(i + 1) * self.dimension].copy_from_slice(vector);
            }

            None => {
                self.index.insert(word.clone(), self.words.len());
                self.words.push(word);
                self.vectors.extend_from_slice(vector);
            }
        }

        Ok(())
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
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
    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    #[inline]
    /// Get vector of the word.
    ///
    /// Guaranteed to return `None` if the word isn't stored.
    pub fn get(&self, word: &str) -> Option<&[f32]> {
        self.index.get(word)
            .map(|i| &self.vectors[i * self.dimension..(i + 1) * self.dimension])
    }

    #[inline]
    /// Iterate over words and their vectors in the insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f32])> + '_ {
        self.words.iter()
            .map(String::as_str)
            .zip(self.vectors.chunks_exact(self.dimension.max(1)))
    }

    /// Cosine similarity between the word's vectors in this and the other model.
    ///
    /// Return `None` if any of the models doesn't have the word.
    pub fn self_similarity(&self, other: &Self, word: &str) -> Option<f64> {
        let current = self.get(word)?;
        let other = other.get(word)?;

        Some(cosine_similarity(current, other))
    }
}

#[test]
fn test_embedding_model() -> anyhow::Result<()> {
    let mut model = EmbeddingModel::new(3);

    model.insert("kat", &[1.0, 0.0, 0.0])?;
    model.insert("hond", &[0.0, 1.0, 0.0])?;

    assert!(model.insert("vis", &[1.0]).is_err());

    assert_eq!(model.len(), 2);
    assert_eq!(model.get("hond"), Some([0.0, 1.0, 0.0].as_slice()));
    assert_eq!(model.get("vis"), None);

    model.insert("kat", &[0.0, 0.0, 2.0])?;

    assert_eq!(model.len(), 2);
    assert_eq!(model.get("kat"), Some([0.0, 0.0, 2.0].as_slice()));

    assert_eq!(model.iter().map(|(word, _)| word).collect::<Vec<_>>(), ["kat", "hond"]);

    let mut other = EmbeddingModel::new(3);

    other.insert("kat", &[0.0, 0.0, 5.0])?;

    assert_eq!(model.self_similarity(&other, "kat"), Some(1.0));
    assert_eq!(model.self_similarity(&other, "hond"), None);

    Ok(())
}
