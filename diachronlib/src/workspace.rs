use std::path::{Path, PathBuf};

use crate::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Files layout of the working directory.
///
/// ```text
/// <corpus>_all_tokenized                aggregated corpus
/// <corpus>_<year>_tokenized[.lz4]       year slice
/// <corpus>_<year|initial>[_reverse].w2v slice model
/// slice_stats.db                        slice statistics cache
/// ```
pub struct Workspace {
    root: PathBuf
}

impl Workspace {
    pub const STATS_DATABASE: &'static str = "slice_stats.db";

    #[inline]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into()
        }
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[inline]
    pub fn slice_path(&self, corpus: Corpus, year: i32) -> PathBuf {
        self.root.join(format!("{corpus}_{year}_tokenized"))
    }

    #[inline]
    pub fn aggregate_path(&self, corpus: Corpus) -> PathBuf {
        self.root.join(format!("{corpus}_all_tokenized"))
    }

    #[inline]
    pub fn model_path(&self, corpus: Corpus, label: SliceLabel, direction: Direction) -> PathBuf {
        self.root.join(format!("{corpus}_{label}{}.w2v", direction.suffix()))
    }

    #[inline]
    pub fn stats_path(&self) -> PathBuf {
        self.root.join(Self::STATS_DATABASE)
    }

    #[inline]
    /// Locate the slice file of given corpus and year.
    pub fn slice(&self, corpus: Corpus, year: i32) -> anyhow::Result<YearSlice> {
        YearSlice::locate(corpus, year, self.slice_path(corpus, year))
    }

    /// Path of a result file derived from the word list file name.
    ///
    /// `lists/emotions.txt` with suffix `results.json` becomes
    /// `<root>/emotions_results.json`.
    pub fn result_path(&self, word_list: &Path, suffix: &str) -> PathBuf {
        let stem = word_list.file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| String::from("words"));

        self.root.join(format!("{stem}_{suffix}"))
    }
}

#[test]
fn test_workspace_paths() {
    let workspace = Workspace::new("working");

    assert_eq!(workspace.slice_path(Corpus::Trouw, 1994), Path::new("working/trouw_1994_tokenized"));
    assert_eq!(workspace.aggregate_path(Corpus::Volkskrant), Path::new("working/volkskrant_all_tokenized"));

    assert_eq!(workspace.model_path(Corpus::Trouw, SliceLabel::Year(2016), Direction::Reverse), Path::new("working/trouw_2016_reverse.w2v"));
    assert_eq!(workspace.model_path(Corpus::Trouw, SliceLabel::Initial, Direction::Forward), Path::new("working/trouw_initial.w2v"));

    assert_eq!(workspace.result_path(Path::new("lists/emotions.txt"), "results.json"), Path::new("working/emotions_results.json"));
}
