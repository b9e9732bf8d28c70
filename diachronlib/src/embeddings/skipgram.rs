use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::prelude::*;

/// Documents longer than this are split into several sentences.
pub const MAX_SENTENCE_LENGTH: usize = 10000;

/// Inner products beyond this value saturate the sigmoid
/// and produce no useful gradient.
const MAX_EXP: f32 = 6.0;

/// Amount of trained words after which workers refresh the learn rate.
const LEARN_RATE_UPDATE_INTERVAL: u64 = 10000;

#[derive(Debug)]
/// Row-major matrix of `f32` cells which can be updated
/// from several threads at once without locking.
///
/// Concurrent updates of the same row may overwrite each
/// other, which is tolerated by the stochastic optimizer.
struct Weights {
    cells: Vec<AtomicU32>,
    dimension: usize
}

impl Weights {
    fn zeroed(rows: usize, dimension: usize) -> Self {
        Self {
            cells: (0..rows * dimension).map(|_| AtomicU32::new(0)).collect(),
            dimension
        }
    }

    #[inline]
    fn read(&self, row: usize, output: &mut [f32]) {
        let offset = row * self.dimension;

        for (i, value) in output.iter_mut().enumerate() {
            *value = f32::from_bits(self.cells[offset + i].load(Ordering::Relaxed));
        }
    }

    #[inline]
    fn write(&self, row: usize, values: &[f32]) {
        let offset = row * self.dimension;

        for (i, value) in values.iter().enumerate() {
            self.cells[offset + i].store(value.to_bits(), Ordering::Relaxed);
        }
    }

    #[inline]
    /// `row += scale * delta`
    fn add(&self, row: usize, delta: &[f32], scale: f32) {
        let offset = row * self.dimension;

        for (i, delta) in delta.iter().enumerate() {
            let cell = &self.cells[offset + i];
            let value = f32::from_bits(cell.load(Ordering::Relaxed)) + scale * delta;

            cell.store(value.to_bits(), Ordering::Relaxed);
        }
    }

    fn row(&self, row: usize) -> Vec<f32> {
        let mut values = vec![0.0; self.dimension];

        self.read(row, &mut values);

        values
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq)]
/// Statistics of training on a single slice.
pub struct SliceTrainingReport {
    pub documents: u64,

    /// Amount of tokens in the slice.
    pub raw_tokens: u64,

    /// Amount of tokens known to the vocabulary.
    pub retained_tokens: u64,

    /// Amount of vocabulary words occurring in the slice.
    pub slice_words: usize,

    pub elapsed: Duration
}

#[inline]
fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// FNV-1a hash, stable between runs and toolchains.
fn word_hash(word: &str) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;

    for byte in word.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }

    hash
}

#[derive(Debug)]
/// Skip-gram word2vec model trained with hierarchical softmax.
///
/// The model is trained sequentially on several slices. Its state
/// (word vectors and inner nodes weights) is kept between the
/// slices unless it's explicitly reset.
pub struct SkipGram {
    params: TrainingParams,
    vocabulary: Vocabulary,
    tree: HuffmanTree,

    /// Word vectors, `words * dimension`.
    vectors: Weights,

    /// Hierarchical softmax weights, `inner nodes * dimension`.
    nodes: Weights,

    /// Multiplier of the word vector updates.
    locks: Vec<f32>,

    /// Probability of keeping each word during down-sampling.
    keep: Vec<f32>,

    /// Words which were trained or adopted since the last reset.
    observed: Vec<bool>
}

impl SkipGram {
    /// Create new model with randomly initialized vectors.
    pub fn new(vocabulary: Vocabulary, params: TrainingParams) -> anyhow::Result<Self> {
        params.validate()?;

        let tree = HuffmanTree::new(vocabulary.counts());

        let keep = if params.sample > 0.0 {
            let threshold = params.sample * vocabulary.total_count() as f64;

            vocabulary.counts()
                .iter()
                .map(|count| {
                    let count = *count as f64;

                    (((count / threshold).sqrt() + 1.0) * (threshold / count)).min(1.0) as f32
                })
                .collect()
        } else {
            vec![1.0; vocabulary.len()]
        };

        let mut model = Self {
            vectors: Weights::zeroed(vocabulary.len(), params.dimension),
            nodes: Weights::zeroed(tree.inner_nodes(), params.dimension),
            locks: vec![1.0; vocabulary.len()],
            observed: vec![false; vocabulary.len()],
            keep,
            tree,
            vocabulary,
            params
        };

        model.reset();

        Ok(model)
    }

    /// Return the model to its initial state.
    ///
    /// Word vectors get seeded random values which depend only
    /// on the word and the seed, inner nodes are zeroed.
    pub fn reset(&mut self) {
        let dimension = self.params.dimension;
        let mut vector = vec![0.0; dimension];

        for (i, (word, _)) in self.vocabulary.iter().enumerate() {
            let mut rng = fastrand::Rng::with_seed(self.params.seed ^ word_hash(word));

            for value in vector.iter_mut() {
                *value = (rng.f32() - 0.5) / dimension as f32;
            }

            self.vectors.write(i, &vector);
        }

        let zeros = vec![0.0; dimension];

        for node in 0..self.tree.inner_nodes() {
            self.nodes.write(node, &zeros);
        }

        self.locks.fill(1.0);
        self.observed.fill(false);
    }

    #[inline]
    pub fn params(&self) -> &TrainingParams {
        &self.params
    }

    #[inline]
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Get current vector of the word.
    pub fn vector(&self, word: &str) -> Option<Vec<f32>> {
        self.vocabulary.index_of(word)
            .map(|i| self.vectors.row(i as usize))
    }

    #[inline]
    /// Check if the word was trained or adopted since the last reset.
    pub fn is_observed(&self, word: &str) -> bool {
        self.vocabulary.index_of(word)
            .map(|i| self.observed[i as usize])
            .unwrap_or(false)
    }

    /// Adopt vectors of the words shared with the given model.
    ///
    /// Words outside of the vocabulary are ignored, so the vocabulary
    /// never grows. Adopted vectors are updated with the lock factor
    /// multiplier afterwards.
    ///
    /// Return amount of adopted vectors.
    pub fn intersect(&mut self, model: &EmbeddingModel) -> anyhow::Result<usize> {
        if model.dimension() != self.params.dimension {
            anyhow::bail!("Can't intersect model with {} dimensions with model of {} dimensions", model.dimension(), self.params.dimension);
        }

        let mut adopted = 0;

        for (word, vector) in model.iter() {
            if let Some(i) = self.vocabulary.index_of(word) {
                let i = i as usize;

                self.vectors.write(i, vector);

                self.locks[i] = self.params.lock_factor;
                self.observed[i] = true;

                adopted += 1;
            }
        }

        Ok(adopted)
    }

    /// Export vectors of the observed words.
    ///
    /// Words which were neither trained nor adopted since the
    /// last reset have meaningless random vectors and are skipped.
    pub fn to_model(&self) -> anyhow::Result<EmbeddingModel> {
        let observed = self.observed.iter().filter(|observed| **observed).count();

        let mut model = EmbeddingModel::with_capacity(self.params.dimension, observed);
        let mut vector = vec![0.0; self.params.dimension];

        for (i, (word, _)) in self.vocabulary.iter().enumerate() {
            if self.observed[i] {
                self.vectors.read(i, &mut vector);

                model.insert(word, &vector)?;
            }
        }

        Ok(model)
    }

    /// Convert tokenized documents into sentences of vocabulary indices,
    /// marking the occurring words as observed.
    fn encode<'a>(&mut self, documents: impl IntoIterator<Item = Vec<&'a str>>, report: &mut SliceTrainingReport) -> Vec<Vec<u32>> {
        let mut sentences = Vec::new();

        for tokens in documents {
            report.documents += 1;
            report.raw_tokens += tokens.len() as u64;

            self.encode_document(tokens, &mut sentences, report);
        }

        sentences
    }

    fn encode_document(&mut self, tokens: Vec<&str>, sentences: &mut Vec<Vec<u32>>, report: &mut SliceTrainingReport) {
        let mut sentence = Vec::new();

        for token in tokens {
            let Some(word) = self.vocabulary.index_of(token) else {
                continue;
            };

            if !self.observed[word as usize] {
                self.observed[word as usize] = true;

                report.slice_words += 1;
            }

            sentence.push(word);

            report.retained_tokens += 1;

            if sentence.len() == MAX_SENTENCE_LENGTH {
                sentences.push(std::mem::take(&mut sentence));
            }
        }

        if !sentence.is_empty() {
            sentences.push(sentence);
        }
    }

    /// Train the model on all documents of the slice.
    pub fn train_slice(&mut self, slice: &YearSlice) -> anyhow::Result<SliceTrainingReport> {
        let started = Instant::now();

        let mut report = SliceTrainingReport::default();
        let mut sentences = Vec::new();

        slice.for_each_document(|tokens| {
            report.documents += 1;
            report.raw_tokens += tokens.len() as u64;

            self.encode_document(tokens, &mut sentences, &mut report);

            Ok(())
        })?;

        self.train_sentences(&sentences);

        report.elapsed = started.elapsed();

        Ok(report)
    }

    /// Train the model on in-memory documents with whitespace separated tokens.
    pub fn train_documents<'a>(&mut self, documents: impl IntoIterator<Item = &'a str>) -> SliceTrainingReport {
        let started = Instant::now();

        let mut report = SliceTrainingReport::default();

        let sentences = self.encode(
            documents.into_iter().map(|document| document.split_whitespace().collect::<Vec<_>>()),
            &mut report
        );

        self.train_sentences(&sentences);

        report.elapsed = started.elapsed();

        report
    }

    /// Run all the training epochs over the encoded sentences.
    fn train_sentences(&self, sentences: &[Vec<u32>]) {
        let words_per_epoch = sentences.iter().map(Vec::len).sum::<usize>() as u64;

        if words_per_epoch == 0 || self.tree.inner_nodes() == 0 {
            return;
        }

        let total_words = words_per_epoch * self.params.epochs as u64;
        let processed = AtomicU64::new(0);

        let workers = self.params.workers.max(1).min(sentences.len());
        let chunk_size = sentences.len().div_ceil(workers);

        for epoch in 0..self.params.epochs {
            if workers == 1 {
                let mut rng = self.worker_rng(epoch, 0);

                self.train_chunk(sentences, &mut rng, &processed, total_words);
            }

            else {
                std::thread::scope(|scope| {
                    for (worker, chunk) in sentences.chunks(chunk_size).enumerate() {
                        let processed = &processed;

                        scope.spawn(move || {
                            let mut rng = self.worker_rng(epoch, worker);

                            self.train_chunk(chunk, &mut rng, processed, total_words);
                        });
                    }
                });
            }
        }
    }

    #[inline]
    fn worker_rng(&self, epoch: usize, worker: usize) -> fastrand::Rng {
        let stream = (epoch * self.params.workers.max(1) + worker) as u64 + 1;

        fastrand::Rng::with_seed(self.params.seed.wrapping_add(stream.wrapping_mul(0x9E3779B97F4A7C15)))
    }

    #[inline]
    fn learn_rate(&self, processed: u64, total_words: u64) -> f32 {
        let progress = processed as f32 / total_words as f32;
        let rate = self.params.learn_rate - (self.params.learn_rate - self.params.min_learn_rate) * progress;

        rate.max(self.params.min_learn_rate)
    }

    fn train_chunk(&self, sentences: &[Vec<u32>], rng: &mut fastrand::Rng, processed: &AtomicU64, total_words: u64) {
        let dimension = self.params.dimension;
        let window = self.params.window;

        let mut context = vec![0.0; dimension];
        let mut node = vec![0.0; dimension];
        let mut gradient = vec![0.0; dimension];

        let mut sampled = Vec::new();
        let mut pending = 0;

        let mut learn_rate = self.learn_rate(processed.load(Ordering::Relaxed), total_words);

        for sentence in sentences {
            sampled.clear();

            sampled.extend(sentence.iter().copied().filter(|word| {
                let keep = self.keep[*word as usize];

                keep >= 1.0 || rng.f32() < keep
            }));

            for (position, word) in sampled.iter().enumerate() {
                // Randomly shrinked window.
                let reduced = rng.usize(..window);

                let start = position.saturating_sub(window - reduced);
                let end = (position + window - reduced + 1).min(sampled.len());

                for (context_position, context_word) in sampled[start..end].iter().enumerate() {
                    if start + context_position == position {
                        continue;
                    }

                    let context_word = *context_word as usize;

                    self.vectors.read(context_word, &mut context);

                    gradient.fill(0.0);

                    let codes = self.tree.codes(*word);
                    let points = self.tree.points(*word);

                    for (code, point) in codes.iter().zip(points) {
                        let point = *point as usize;

                        self.nodes.read(point, &mut node);

                        let dot = context.iter()
                            .zip(node.iter())
                            .map(|(a, b)| a * b)
                            .sum::<f32>();

                        if dot <= -MAX_EXP || dot >= MAX_EXP {
                            continue;
                        }

                        let g = (1.0 - *code as f32 - sigmoid(dot)) * learn_rate;

                        for (gradient, node) in gradient.iter_mut().zip(node.iter()) {
                            *gradient += g * node;
                        }

                        self.nodes.add(point, &context, g);
                    }

                    self.vectors.add(context_word, &gradient, self.locks[context_word]);
                }
            }

            pending += sentence.len() as u64;

            if pending >= LEARN_RATE_UPDATE_INTERVAL {
                let total = processed.fetch_add(pending, Ordering::Relaxed) + pending;

                learn_rate = self.learn_rate(total, total_words);
                pending = 0;
            }
        }

        processed.fetch_add(pending, Ordering::Relaxed);
    }
}

#[cfg(test)]
fn test_corpus() -> Vec<String> {
    let mut documents = Vec::new();

    for i in 0..200 {
        documents.push(match i % 4 {
            0 => String::from("de kat zat op de mat"),
            1 => String::from("de hond lag op de bank"),
            2 => String::from("een kat en een hond spelen"),
            _ => String::from("de mat en de bank zijn oud")
        });
    }

    documents
}

#[test]
fn test_skipgram_reproducible() -> anyhow::Result<()> {
    let documents = test_corpus();

    let vocabulary = Vocabulary::from_documents(documents.iter().map(String::as_str), 1);

    let params = TrainingParams::default()
        .with_dimension(16)
        .with_epochs(3)
        .with_workers(1);

    let mut model_1 = SkipGram::new(vocabulary.clone(), params)?;
    let mut model_2 = SkipGram::new(vocabulary, params)?;

    let initial = model_1.vector("kat");

    let report = model_1.train_documents(documents.iter().map(String::as_str));

    model_2.train_documents(documents.iter().map(String::as_str));

    assert_eq!(report.documents, 200);
    assert_eq!(report.raw_tokens, report.retained_tokens);

    assert_ne!(model_1.vector("kat"), initial);
    assert_eq!(model_1.to_model()?, model_2.to_model()?);

    Ok(())
}

#[test]
fn test_skipgram_observed_words() -> anyhow::Result<()> {
    let vocabulary = Vocabulary::from_documents(["kat hond vis", "kat hond"], 1);

    let params = TrainingParams::default()
        .with_dimension(8)
        .with_epochs(2)
        .with_workers(2);

    let mut model = SkipGram::new(vocabulary, params)?;

    let report = model.train_documents(["kat hond onbekend", "hond kat"]);

    assert_eq!(report.raw_tokens, 5);
    assert_eq!(report.retained_tokens, 4);
    assert_eq!(report.slice_words, 2);

    let exported = model.to_model()?;

    assert_eq!(exported.len(), 2);
    assert!(exported.contains("kat"));
    assert!(!exported.contains("vis"));
    assert!(!exported.contains("onbekend"));

    // Vis was never trained, its vector must stay untouched.
    let vis = model.vector("vis");

    model.train_documents(["kat hond kat hond"]);

    assert_eq!(model.vector("vis"), vis);

    model.reset();

    assert!(model.to_model()?.is_empty());

    Ok(())
}

#[test]
fn test_skipgram_intersect() -> anyhow::Result<()> {
    let vocabulary = Vocabulary::from_documents(["kat hond vis"], 1);

    let mut model = SkipGram::new(vocabulary, TrainingParams::default().with_dimension(2).with_workers(1))?;

    let mut previous = EmbeddingModel::new(2);

    previous.insert("vis", &[0.25, -0.75])?;
    previous.insert("walvis", &[1.0, 1.0])?;

    assert_eq!(model.intersect(&previous)?, 1);
    assert_eq!(model.vector("vis"), Some(vec![0.25, -0.75]));
    assert!(model.is_observed("vis"));
    assert!(model.vector("walvis").is_none());

    // Vis is absent from the slice and keeps the adopted vector.
    model.train_documents(["kat hond kat hond kat"]);

    assert_eq!(model.to_model()?.get("vis"), Some([0.25, -0.75].as_slice()));

    assert!(model.intersect(&EmbeddingModel::new(3)).is_err());

    Ok(())
}

#[test]
fn test_skipgram_lock_factor() -> anyhow::Result<()> {
    let documents = vec!["kat hond kat hond vis kat"; 50];

    let vocabulary = Vocabulary::from_documents(documents.iter().copied(), 1);

    let mut previous = EmbeddingModel::new(2);

    previous.insert("kat", &[0.25, -0.75])?;

    let params = TrainingParams::default()
        .with_dimension(2)
        .with_sample(0.0)
        .with_workers(1);

    // Frozen vectors keep the adopted values.
    let mut frozen = SkipGram::new(vocabulary.clone(), params.with_lock_factor(0.0))?;

    frozen.intersect(&previous)?;

    let hond = frozen.vector("hond");

    frozen.train_documents(documents.iter().copied());

    assert_eq!(frozen.vector("kat"), Some(vec![0.25, -0.75]));
    assert_ne!(frozen.vector("hond"), hond);

    // Default factor lets the adopted vectors train further.
    let mut free = SkipGram::new(vocabulary, params.with_lock_factor(1.0))?;

    free.intersect(&previous)?;
    free.train_documents(documents.iter().copied());

    assert_ne!(free.vector("kat"), Some(vec![0.25, -0.75]));

    Ok(())
}
