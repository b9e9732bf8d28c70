use std::collections::HashMap;
use std::path::Path;

use crate::prelude::*;
use crate::corpus::slice::{resolve_text_file, for_each_line};

#[derive(Default, Debug, Clone, PartialEq, Eq)]
/// Frozen set of words which can get vectors in the slice models.
///
/// Words are ordered by descending count, equal counts are
/// ordered lexicographically, so indices are reproducible
/// for the same source text.
pub struct Vocabulary {
    words: Vec<String>,
    counts: Vec<u64>,
    index: HashMap<String, u32>,
    total: u64
}

impl Vocabulary {
    /// Build vocabulary from the words counts table, discarding
    /// words occurring less than `min_count` times.
    pub fn from_counts(counts: HashMap<String, u64>, min_count: u64) -> Self {
        let mut entries = counts.into_iter()
            .filter(|(_, count)| *count >= min_count && *count > 0)
            .collect::<Vec<_>>();

        entries.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let mut vocabulary = Self {
            words: Vec::with_capacity(entries.len()),
            counts: Vec::with_capacity(entries.len()),
            index: HashMap::with_capacity(entries.len()),
            total: 0
        };

        for (i, (word, count)) in entries.into_iter().enumerate() {
            vocabulary.index.insert(word.clone(), i as u32);
            vocabulary.words.push(word);
            vocabulary.counts.push(count);
            vocabulary.total += count;
        }

        vocabulary
    }

    /// Build vocabulary from in-memory documents.
    pub fn from_documents<'a>(documents: impl IntoIterator<Item = &'a str>, min_count: u64) -> Self {
        let mut counts = HashMap::<String, u64>::new();

        for document in documents {
            for token in document.split_whitespace() {
                *counts.entry(token.to_string()).or_default() += 1;
            }
        }

        Self::from_counts(counts, min_count)
    }

    /// Build vocabulary from a tokenized text file.
    ///
    /// Missing file is a fatal error.
    pub fn from_file(path: impl AsRef<Path>, min_count: u64) -> anyhow::Result<Self> {
        let path = path.as_ref();

        let Some((path, compressed)) = resolve_text_file(path) else {
            anyhow::bail!("Vocabulary source {path:?} doesn't exist");
        };

        let mut counts = HashMap::<String, u64>::new();

        let summary = for_each_line(&path, compressed, |tokens| {
            for token in tokens {
                // Avoid allocating for already known tokens.
                match counts.get_mut(token) {
                    Some(count) => *count += 1,
                    None => {
                        counts.insert(token.to_string(), 1);
                    }
                }
            }

            Ok(())
        })?;

        let vocabulary = Self::from_counts(counts, min_count);

        tracing::info!(?path, tokens = summary.tokens, words = vocabulary.len(), min_count, "built vocabulary");

        Ok(vocabulary)
    }

    /// Build vocabulary for the training chain described by the options.
    pub fn for_chain(workspace: &Workspace, options: &ChainOptions, min_count: u64) -> anyhow::Result<Self> {
        match options.vocabulary {
            VocabularySource::WholeCorpus => Self::from_file(workspace.aggregate_path(options.corpus), min_count),

            VocabularySource::FirstSlice => {
                let years = options.direction.order(options.years.clone());

                let Some(year) = years.first() else {
                    anyhow::bail!("Training chain has no years");
                };

                Self::from_file(workspace.slice_path(options.corpus, *year), min_count)
            }
        }
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
    pub fn index_of(&self, word: &str) -> Option<u32> {
        self.index.get(word).copied()
    }

    #[inline]
    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    #[inline]
    pub fn word(&self, index: u32) -> Option<&str> {
        self.words.get(index as usize).map(String::as_str)
    }

    #[inline]
    pub fn count(&self, index: u32) -> Option<u64> {
        self.counts.get(index as usize).copied()
    }

    #[inline]
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    #[inline]
    /// Sum of counts of all the retained words.
    pub fn total_count(&self) -> u64 {
        self.total
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.words.iter()
            .map(String::as_str)
            .zip(self.counts.iter().copied())
    }
}

#[test]
fn test_vocabulary_min_count() {
    let vocabulary = Vocabulary::from_documents([
        "de kat zat op de mat",
        "de hond zat op de bank"
    ], 2);

    assert_eq!(vocabulary.len(), 3);
    assert_eq!(vocabulary.total_count(), 8);

    assert_eq!(vocabulary.iter().collect::<Vec<_>>(), [("de", 4), ("op", 2), ("zat", 2)]);

    assert_eq!(vocabulary.index_of("de"), Some(0));
    assert_eq!(vocabulary.index_of("kat"), None);
    assert!(!vocabulary.contains("hond"));
}

#[test]
fn test_vocabulary_sources() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let workspace = Workspace::new(dir.path());

    std::fs::write(workspace.slice_path(Corpus::Trouw, 1996), "recent recent woord\n")?;
    std::fs::write(workspace.aggregate_path(Corpus::Trouw), "oud oud oud recent recent woord\n")?;

    let options = ChainOptions::new(Corpus::Trouw)
        .with_years(1994..=1996)
        .with_direction(Direction::Reverse);

    // Reverse chain starts from the most recent slice.
    let vocabulary = Vocabulary::for_chain(&workspace, &options, 2)?;

    assert_eq!(vocabulary.iter().collect::<Vec<_>>(), [("recent", 2)]);

    let vocabulary = Vocabulary::for_chain(&workspace, &options.clone().with_vocabulary(VocabularySource::WholeCorpus), 1)?;

    assert_eq!(vocabulary.word(0), Some("oud"));
    assert_eq!(vocabulary.len(), 3);

    // Forward chain needs 1994 slice which doesn't exist.
    assert!(Vocabulary::for_chain(&workspace, &options.with_direction(Direction::Forward), 1).is_err());

    Ok(())
}
