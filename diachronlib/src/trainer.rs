use std::path::PathBuf;
use std::time::Duration;

use crate::prelude::*;

#[derive(Debug, Clone, PartialEq)]
/// Outcome of a single step of the training chain.
pub struct StepReport {
    pub label: SliceLabel,
    pub path: PathBuf,

    /// Model file already existed and the step was skipped.
    pub skipped: bool,

    /// Amount of vectors adopted from the previous slice model.
    pub merged: usize,

    /// Amount of vectors written to the model file.
    pub persisted: usize,

    pub training: SliceTrainingReport
}

impl StepReport {
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.training.elapsed
    }
}

#[derive(Debug)]
/// Sequential trainer of the per-slice embedding models.
///
/// Each step trains the model on a single year slice and persists
/// it before moving to the next one, so an interrupted chain can
/// be resumed from the last persisted slice.
pub struct SliceTrainer<'a> {
    workspace: &'a Workspace,
    options: ChainOptions,
    model: SkipGram
}

impl<'a> SliceTrainer<'a> {
    /// Build the chain vocabulary and prepare the trainer.
    pub fn new(workspace: &'a Workspace, options: ChainOptions, params: TrainingParams) -> anyhow::Result<Self> {
        let vocabulary = Vocabulary::for_chain(workspace, &options, params.min_count)?;

        Self::with_vocabulary(workspace, options, vocabulary, params)
    }

    /// Prepare the trainer with an already built vocabulary.
    pub fn with_vocabulary(workspace: &'a Workspace, options: ChainOptions, vocabulary: Vocabulary, params: TrainingParams) -> anyhow::Result<Self> {
        if options.years.is_empty() {
            anyhow::bail!("Training chain of {} has no years", options.corpus);
        }

        if vocabulary.is_empty() {
            anyhow::bail!("Vocabulary of {} is empty, consider lowering the minimal count", options.corpus);
        }

        Ok(Self {
            workspace,
            options,
            model: SkipGram::new(vocabulary, params)?
        })
    }

    #[inline]
    pub fn options(&self) -> &ChainOptions {
        &self.options
    }

    #[inline]
    pub fn model(&self) -> &SkipGram {
        &self.model
    }

    #[inline]
    /// Train the whole chain.
    pub fn run(&mut self) -> anyhow::Result<Vec<StepReport>> {
        self.run_with(|_| {})
    }

    /// Train the whole chain, calling `progress` after each step.
    ///
    /// Missing slice aborts the chain. Models of the already
    /// finished steps stay on disk.
    pub fn run_with(&mut self, mut progress: impl FnMut(&StepReport)) -> anyhow::Result<Vec<StepReport>> {
        let layout = self.options.layout();

        let mut reports = Vec::with_capacity(layout.labels().len());
        let mut previous = None;

        for label in layout.labels() {
            // Anchor is trained on the first slice of the chain.
            let year = match label {
                SliceLabel::Year(year) => year,
                SliceLabel::Initial => layout.years()[0]
            };

            let report = self.step(label, year, previous.take())?;

            progress(&report);

            previous = Some(report.path.clone());

            reports.push(report);
        }

        Ok(reports)
    }

    fn step(&mut self, label: SliceLabel, year: i32, previous: Option<PathBuf>) -> anyhow::Result<StepReport> {
        let corpus = self.options.corpus;
        let path = self.workspace.model_path(corpus, label, self.options.direction);

        if self.options.resume && path.is_file() {
            tracing::info!(%corpus, %label, ?path, "model exists, skipping slice");

            // State of the skipped step is restored from its file
            // when the next step merges it.
            self.model.reset();

            return Ok(StepReport {
                label,
                path,
                skipped: true,
                merged: 0,
                persisted: 0,
                training: SliceTrainingReport::default()
            });
        }

        let slice = self.workspace.slice(corpus, year)?;

        let mut merged = 0;

        match previous {
            Some(previous) if self.options.intersect => {
                let model = EmbeddingModel::load(&previous)?;

                merged = self.model.intersect(&model)?;

                tracing::debug!(%corpus, %label, ?previous, merged, "merged previous slice model");
            }

            _ => self.model.reset()
        }

        tracing::info!(%corpus, %label, path = ?slice.path(), "training slice");

        let training = self.model.train_slice(&slice)?;

        let model = self.model.to_model()?;

        model.save(&path)?;

        tracing::info!(
            %corpus,
            %label,
            raw_tokens = training.raw_tokens,
            retained_tokens = training.retained_tokens,
            persisted = model.len(),
            merged,
            elapsed = ?training.elapsed,
            "persisted slice model"
        );

        Ok(StepReport {
            label,
            path,
            skipped: false,
            merged,
            persisted: model.len(),
            training
        })
    }
}

#[cfg(test)]
fn write_slices(workspace: &Workspace, corpus: Corpus, slices: &[(i32, &str)]) -> anyhow::Result<()> {
    for (year, text) in slices {
        std::fs::write(workspace.slice_path(corpus, *year), text)?;
    }

    Ok(())
}

#[test]
fn test_slice_trainer_chain() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let workspace = Workspace::new(dir.path());

    write_slices(&workspace, Corpus::Trouw, &[
        (1994, "de kat zat op de mat\nde hond lag op de bank\n"),
        (1995, "de kat lag op de bank\n"),
        (1996, "de hond zat op de mat\n")
    ])?;

    let options = ChainOptions::new(Corpus::Trouw)
        .with_years(1994..=1996)
        .with_initialize(true);

    let params = TrainingParams::default()
        .with_dimension(4)
        .with_epochs(2)
        .with_min_count(1)
        .with_workers(1);

    let reports = SliceTrainer::new(&workspace, options, params)?.run()?;

    let labels = reports.iter().map(|report| report.label).collect::<Vec<_>>();

    assert_eq!(labels, [SliceLabel::Initial, SliceLabel::Year(1994), SliceLabel::Year(1995), SliceLabel::Year(1996)]);

    for report in &reports {
        assert!(report.path.is_file());
        assert!(!report.skipped);
        assert_eq!(report.merged, 0);
    }

    // Cold start: every model holds only words of its own slice.
    let model = EmbeddingModel::load(workspace.model_path(Corpus::Trouw, SliceLabel::Year(1995), Direction::Forward))?;

    assert_eq!(model.dimension(), 4);
    assert!(model.contains("kat"));
    assert!(!model.contains("hond"));
    assert!(!model.contains("mat"));

    Ok(())
}

#[test]
fn test_slice_trainer_intersect_resume() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let workspace = Workspace::new(dir.path());

    write_slices(&workspace, Corpus::Volkskrant, &[
        (1994, "de kat zat op de mat\nde hond lag op de bank\n"),
        (1995, "de kat lag op de bank\n"),
        (1996, "de kat zat op de bank\n")
    ])?;

    let options = ChainOptions::new(Corpus::Volkskrant)
        .with_years(1994..=1996)
        .with_direction(Direction::Reverse)
        .with_vocabulary(VocabularySource::FirstSlice)
        .with_intersect(true);

    let params = TrainingParams::default()
        .with_dimension(4)
        .with_epochs(2)
        .with_min_count(1)
        .with_workers(1);

    // Reverse chain builds vocabulary from 1996, so "hond" is unknown.
    let reports = SliceTrainer::new(&workspace, options.clone(), params)?.run()?;

    assert_eq!(reports[0].label, SliceLabel::Year(1996));
    assert_eq!(reports[0].merged, 0);
    assert!(reports[1].merged > 0);

    let model_1995 = EmbeddingModel::load(workspace.model_path(Corpus::Volkskrant, SliceLabel::Year(1995), Direction::Reverse))?;
    let model_1994 = EmbeddingModel::load(workspace.model_path(Corpus::Volkskrant, SliceLabel::Year(1994), Direction::Reverse))?;

    assert!(!model_1994.contains("hond"));

    // "zat" is absent from 1995 and keeps its 1996 vector.
    let model_1996 = EmbeddingModel::load(workspace.model_path(Corpus::Volkskrant, SliceLabel::Year(1996), Direction::Reverse))?;

    assert_eq!(model_1995.get("zat"), model_1996.get("zat"));

    // Resumed chain skips everything which was persisted.
    std::fs::remove_file(workspace.model_path(Corpus::Volkskrant, SliceLabel::Year(1994), Direction::Reverse))?;

    let reports = SliceTrainer::new(&workspace, options.with_resume(true), params)?.run()?;

    assert!(reports[0].skipped);
    assert!(reports[1].skipped);
    assert!(!reports[2].skipped);
    assert!(reports[2].merged > 0);

    Ok(())
}

#[test]
fn test_slice_trainer_missing_slice() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let workspace = Workspace::new(dir.path());

    write_slices(&workspace, Corpus::Trouw, &[
        (1994, "de kat zat op de mat\n")
    ])?;

    let options = ChainOptions::new(Corpus::Trouw)
        .with_years(1994..=1995);

    let params = TrainingParams::default()
        .with_dimension(4)
        .with_epochs(1)
        .with_min_count(1)
        .with_workers(1);

    let mut trainer = SliceTrainer::new(&workspace, options, params)?;

    let mut finished = Vec::new();

    assert!(trainer.run_with(|report| finished.push(report.label)).is_err());

    // First slice was persisted before the chain failed.
    assert_eq!(finished, [SliceLabel::Year(1994)]);
    assert!(workspace.model_path(Corpus::Trouw, SliceLabel::Year(1994), Direction::Forward).is_file());

    Ok(())
}
