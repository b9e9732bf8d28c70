use clap::Args;
use colorful::Colorful;

use diachronlib::prelude::*;

use super::{LayoutArgs, failed};

#[derive(Args)]
pub struct TrainCli {
    #[arg(long, short)]
    /// Corpus to train on (volkskrant or trouw).
    corpus: Corpus,

    #[command(flatten)]
    layout: LayoutArgs,

    #[arg(long)]
    /// Build vocabulary from the whole corpus instead of the first slice.
    whole_corpus: bool,

    #[arg(long)]
    /// Merge vectors of the previous slice model before training each slice.
    intersect: bool,

    #[arg(long)]
    /// Skip slices whose models already exist.
    resume: bool,

    #[arg(long, default_value_t = DEFAULT_DIMENSION)]
    /// Amount of dimensions of the word vectors.
    dimension: usize,

    #[arg(long, default_value_t = DEFAULT_WINDOW)]
    /// Maximal distance between the predicted and the context words.
    window: usize,

    #[arg(long, default_value_t = DEFAULT_LEARN_RATE)]
    /// Learn rate at the beginning of each slice.
    learn_rate: f32,

    #[arg(long, default_value_t = DEFAULT_MIN_LEARN_RATE)]
    /// Learn rate at the end of each slice.
    min_learn_rate: f32,

    #[arg(long, default_value_t = DEFAULT_EPOCHS)]
    /// Amount of passes over each slice.
    epochs: usize,

    #[arg(long, default_value_t = DEFAULT_MIN_COUNT)]
    /// Words occurring less times in the vocabulary source are discarded.
    min_count: u64,

    #[arg(long, default_value_t = DEFAULT_SAMPLE)]
    /// Down-sampling threshold of frequent words.
    ///
    /// If set to 0 then no down-sampling will be applied.
    sample: f64,

    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    /// Maximal amount of optimizer threads.
    ///
    /// Training is reproducible only with a single worker.
    workers: usize,

    #[arg(long, default_value_t = DEFAULT_SEED)]
    /// Seed of the vectors initialization and the optimizer.
    seed: u64,

    #[arg(long, default_value_t = 1.0)]
    /// Multiplier of updates applied to the merged vectors.
    ///
    /// If set to 0 then merged vectors are frozen.
    lock_factor: f32
}

impl TrainCli {
    pub fn execute(self, workspace: &Workspace) -> anyhow::Result<()> {
        let params = TrainingParams::default()
            .with_dimension(self.dimension)
            .with_window(self.window)
            .with_learn_rate(self.learn_rate)
            .with_min_learn_rate(self.min_learn_rate)
            .with_epochs(self.epochs)
            .with_min_count(self.min_count)
            .with_sample(self.sample)
            .with_workers(self.workers)
            .with_seed(self.seed)
            .with_lock_factor(self.lock_factor);

        let vocabulary = if self.whole_corpus {
            VocabularySource::WholeCorpus
        } else {
            VocabularySource::FirstSlice
        };

        let options = ChainOptions::new(self.corpus)
            .with_years(self.layout.years())
            .with_direction(self.layout.direction())
            .with_vocabulary(vocabulary)
            .with_initialize(self.layout.initialize)
            .with_intersect(self.intersect)
            .with_resume(self.resume);

        println!("⏳ Building vocabulary of {}...", self.corpus.name().yellow());

        let mut trainer = SliceTrainer::new(workspace, options, params)
            .map_err(|err| failed("build vocabulary", err))?;

        println!("{}", "✅ Vocabulary built".green());
        println!("       Words: {}", format!("{}", trainer.model().vocabulary().len()).yellow());
        println!("      Tokens: {}", format!("{}", trainer.model().vocabulary().total_count()).yellow());

        if self.workers > 1 {
            println!("{} training with {} workers is not reproducible", "📖 Note:".blue(), self.workers);
        }

        let training_start = std::time::Instant::now();

        let reports = trainer.run_with(|report| {
            if report.skipped {
                println!("{} model {} already exists, skipping", "📖 Note:".blue(), format!("{:?}", report.path).yellow());

                return;
            }

            println!("{}", format!("✅ Slice {} trained after {:.1} seconds", report.label, report.elapsed().as_secs_f32()).green());
            println!("      Tokens: {}", format!("{}", report.training.raw_tokens).yellow());
            println!("    Retained: {}", format!("{}", report.training.retained_tokens).yellow());
            println!("      Merged: {}", format!("{}", report.merged).yellow());
            println!("   Persisted: {}", format!("{}", report.persisted).yellow());
        }).map_err(|err| failed("train the chain", err))?;

        println!("{}", format!("🚀 Trained {} models in {:.1} minutes", reports.len(), training_start.elapsed().as_secs_f32() / 60.0).green());

        Ok(())
    }
}
