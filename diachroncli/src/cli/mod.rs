use std::path::PathBuf;

use clap::{Parser, Subcommand, Args};
use colorful::Colorful;

use diachronlib::prelude::*;

pub mod train;
pub mod compare;
pub mod query;
pub mod average;
pub mod analyze;
pub mod stats;

#[derive(Parser)]
#[command(name = "diachron", version, about)]
pub struct CLI {
    #[arg(long, short, default_value = ".")]
    /// Directory with the tokenized slices, models and results.
    working_dir: PathBuf,

    #[arg(long, default_value_t = -4096)]
    /// SQLite database cache size.
    ///
    /// Positive value sets cache size in bytes, negative - in sqlite pages.
    cache_size: i64,

    #[command(subcommand)]
    command: Command
}

#[derive(Subcommand)]
pub enum Command {
    /// Train the chain of per-year embedding models of a corpus.
    Train(train::TrainCli),

    /// Print self-similarity of words from arguments or stdin.
    Compare(compare::CompareCli),

    /// Query a word list against both corpora and save results tables.
    Query(query::QueryCli),

    /// Compute average self-similarity of a word list.
    Average(average::AverageCli),

    /// Filter words or analyze a single word from the saved results.
    Analyze(analyze::AnalyzeCli),

    /// Manage cached slice statistics.
    #[command(subcommand)]
    Stats(stats::StatsCli)
}

#[derive(Args, Clone)]
/// Models layout shared by the commands reading the chains.
pub struct LayoutArgs {
    #[arg(long, default_value_t = FIRST_YEAR)]
    /// First year of the chain.
    pub from_year: i32,

    #[arg(long, default_value_t = LAST_YEAR)]
    /// Last year of the chain.
    pub to_year: i32,

    #[arg(long)]
    /// Process the most recent year first.
    pub reverse: bool,

    #[arg(long)]
    /// Chain starts with the initial anchor model.
    pub initialize: bool
}

impl LayoutArgs {
    #[inline]
    pub fn direction(&self) -> Direction {
        if self.reverse {
            Direction::Reverse
        } else {
            Direction::Forward
        }
    }

    #[inline]
    pub fn years(&self) -> Vec<i32> {
        (self.from_year..=self.to_year).collect()
    }

    #[inline]
    pub fn layout(&self) -> ChainLayout {
        ChainLayout::new(self.direction(), self.years(), self.initialize)
    }
}

/// Print failed action as a status line and pass the error further.
pub fn failed(action: &str, err: anyhow::Error) -> anyhow::Error {
    eprintln!("{}", format!("🧯 Failed to {action}: {err:#}").red());

    err
}

impl CLI {
    #[inline]
    pub fn execute(self) -> anyhow::Result<()> {
        let working_dir = self.working_dir.canonicalize().unwrap_or(self.working_dir);

        tracing::debug!(?working_dir, "opening workspace");

        let workspace = Workspace::new(working_dir);

        match self.command {
            Command::Train(command) => command.execute(&workspace),
            Command::Compare(command) => command.execute(&workspace),
            Command::Query(command) => command.execute(&workspace, self.cache_size),
            Command::Average(command) => command.execute(&workspace),
            Command::Analyze(command) => command.execute(),
            Command::Stats(command) => command.execute(&workspace, self.cache_size)
        }
    }
}
