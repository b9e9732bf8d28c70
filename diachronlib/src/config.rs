use serde::{Serialize, Deserialize};

use crate::prelude::*;

pub const DEFAULT_DIMENSION: usize = 200;
pub const DEFAULT_WINDOW: usize = 5;
pub const DEFAULT_LEARN_RATE: f32 = 0.01;
pub const DEFAULT_MIN_LEARN_RATE: f32 = 0.0001;
pub const DEFAULT_EPOCHS: usize = 20;
pub const DEFAULT_MIN_COUNT: u64 = 30;
pub const DEFAULT_SAMPLE: f64 = 0.001;
pub const DEFAULT_WORKERS: usize = 4;
pub const DEFAULT_SEED: u64 = 1;

/// First year of the newspaper corpora.
pub const FIRST_YEAR: i32 = 1994;

/// Last year of the newspaper corpora.
pub const LAST_YEAR: i32 = 2016;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Hyperparameters of the skip-gram embeddings optimizer.
///
/// They are fixed for the whole training chain so that
/// all the slice models stay comparable.
pub struct TrainingParams {
    /// Amount of dimensions of the word vectors.
    pub dimension: usize,

    /// Maximal distance between the predicted word and its context word.
    /// Actual window is randomly shrinked for every word.
    pub window: usize,

    /// Learn rate at the beginning of each slice training.
    pub learn_rate: f32,

    /// Learn rate at the end of each slice training.
    /// The rate decays linearly between these two values.
    pub min_learn_rate: f32,

    /// Amount of passes over each slice.
    pub epochs: usize,

    /// Words occurring less times in the vocabulary source are discarded.
    pub min_count: u64,

    /// Threshold for down-sampling of frequent words.
    ///
    /// If set to 0 then no down-sampling is applied.
    pub sample: f64,

    /// Maximal amount of threads used by the optimizer.
    ///
    /// Training is reproducible only with a single worker.
    pub workers: usize,

    /// Seed of vectors initialization and of all the optimizer's
    /// random decisions.
    pub seed: u64,

    /// Multiplier of updates applied to the vectors adopted
    /// from the previous slice model. Set to 0 to freeze them.
    pub lock_factor: f32
}

impl Default for TrainingParams {
    #[inline]
    fn default() -> Self {
        Self {
            dimension: DEFAULT_DIMENSION,
            window: DEFAULT_WINDOW,
            learn_rate: DEFAULT_LEARN_RATE,
            min_learn_rate: DEFAULT_MIN_LEARN_RATE,
            epochs: DEFAULT_EPOCHS,
            min_count: DEFAULT_MIN_COUNT,
            sample: DEFAULT_SAMPLE,
            workers: DEFAULT_WORKERS,
            seed: DEFAULT_SEED,
            lock_factor: 1.0
        }
    }
}

impl TrainingParams {
    #[inline]
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;

        self
    }

    #[inline]
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;

        self
    }

    #[inline]
    pub fn with_learn_rate(mut self, learn_rate: f32) -> Self {
        self.learn_rate = learn_rate;

        self
    }

    #[inline]
    pub fn with_min_learn_rate(mut self, min_learn_rate: f32) -> Self {
        self.min_learn_rate = min_learn_rate;

        self
    }

    #[inline]
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;

        self
    }

    #[inline]
    pub fn with_min_count(mut self, min_count: u64) -> Self {
        self.min_count = min_count;

        self
    }

    #[inline]
    pub fn with_sample(mut self, sample: f64) -> Self {
        self.sample = sample;

        self
    }

    #[inline]
    /// Change maximal amount of optimizer threads. Zero is treated as one.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);

        self
    }

    #[inline]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;

        self
    }

    #[inline]
    pub fn with_lock_factor(mut self, lock_factor: f32) -> Self {
        self.lock_factor = lock_factor;

        self
    }

    /// Check that the parameters describe a trainable model.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.dimension == 0 {
            anyhow::bail!("Vector dimension must be positive");
        }

        if self.window == 0 {
            anyhow::bail!("Context window must be positive");
        }

        if self.learn_rate.is_nan() || self.learn_rate <= 0.0 || self.min_learn_rate < 0.0 || self.min_learn_rate > self.learn_rate {
            anyhow::bail!("Learn rate must be positive and not lower than the minimal learn rate");
        }

        if self.sample < 0.0 {
            anyhow::bail!("Down-sampling threshold can't be negative");
        }

        Ok(())
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Text used to build the vocabulary of the training chain.
pub enum VocabularySource {
    #[default]
    /// The first slice in the chain order.
    FirstSlice,

    /// The aggregated corpus with all the years.
    WholeCorpus
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Options of a single training chain run.
pub struct ChainOptions {
    pub corpus: Corpus,

    /// Years of the chain. Will be ordered according to the direction.
    pub years: Vec<i32>,

    pub direction: Direction,
    pub vocabulary: VocabularySource,

    /// Train an anchor model on the first slice before the main chain.
    pub initialize: bool,

    /// Merge vectors of the previous slice model before training each slice.
    pub intersect: bool,

    /// Skip slices whose models were already persisted.
    pub resume: bool
}

impl ChainOptions {
    #[inline]
    pub fn new(corpus: Corpus) -> Self {
        Self {
            corpus,
            years: (FIRST_YEAR..=LAST_YEAR).collect(),
            direction: Direction::default(),
            vocabulary: VocabularySource::default(),
            initialize: false,
            intersect: false,
            resume: false
        }
    }

    #[inline]
    pub fn with_years(mut self, years: impl IntoIterator<Item = i32>) -> Self {
        self.years = years.into_iter().collect();

        self
    }

    #[inline]
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;

        self
    }

    #[inline]
    pub fn with_vocabulary(mut self, vocabulary: VocabularySource) -> Self {
        self.vocabulary = vocabulary;

        self
    }

    #[inline]
    pub fn with_initialize(mut self, initialize: bool) -> Self {
        self.initialize = initialize;

        self
    }

    #[inline]
    pub fn with_intersect(mut self, intersect: bool) -> Self {
        self.intersect = intersect;

        self
    }

    #[inline]
    pub fn with_resume(mut self, resume: bool) -> Self {
        self.resume = resume;

        self
    }

    #[inline]
    /// Layout of the models produced by this run.
    pub fn layout(&self) -> ChainLayout {
        ChainLayout::new(self.direction, self.years.clone(), self.initialize)
    }
}

#[test]
fn test_training_params() {
    let params = TrainingParams::default();

    assert_eq!(params.dimension, 200);
    assert_eq!(params.window, 5);
    assert_eq!(params.epochs, 20);
    assert_eq!(params.min_count, 30);
    assert!(params.validate().is_ok());

    assert_eq!(TrainingParams::default().with_workers(0).workers, 1);

    assert!(TrainingParams::default().with_dimension(0).validate().is_err());
    assert!(TrainingParams::default().with_learn_rate(0.0).validate().is_err());
    assert!(TrainingParams::default().with_min_learn_rate(0.5).validate().is_err());
}

#[test]
fn test_chain_options() {
    let options = ChainOptions::new(Corpus::Trouw);

    assert_eq!(options.years.len(), 23);
    assert_eq!(options.years.first(), Some(&1994));

    let layout = options.with_direction(Direction::Reverse)
        .with_years(1994..=1996)
        .layout();

    assert_eq!(layout.years(), &[1996, 1995, 1994]);
}
