use clap::Parser;
use colorful::Colorful;

use diachronlib::prelude::*;

use super::{LayoutArgs, failed};

#[derive(Parser)]
pub enum StatsCli {
    /// Count tokens and words of the slices and cache them.
    Index {
        #[arg(long, short)]
        /// Index only slices of this corpus.
        corpus: Option<Corpus>,

        #[command(flatten)]
        layout: LayoutArgs,

        #[arg(long)]
        /// Recount slices which were already indexed.
        force: bool
    },

    /// Print cached slice totals.
    Show
}

impl StatsCli {
    pub fn execute(self, workspace: &Workspace, cache_size: i64) -> anyhow::Result<()> {
        let path = workspace.stats_path();

        println!("⏳ Opening slice statistics in {path:?}...");

        let stats = StatsDatabase::open(&path, cache_size)
            .map_err(|err| failed("open slice statistics", err))?;

        match self {
            Self::Index { corpus, layout, force } => {
                let corpora = match corpus {
                    Some(corpus) => vec![corpus],
                    None => Corpus::ALL.to_vec()
                };

                for corpus in corpora {
                    for year in layout.years() {
                        let slice = workspace.slice(corpus, year)
                            .map_err(|err| failed("locate slice", err))?;

                        println!("⏳ Indexing {} {year}...", corpus.name().yellow());

                        let summary = if force {
                            stats.index_slice(&slice)
                        } else {
                            stats.ensure_indexed(&slice)
                        };

                        let summary = summary.map_err(|err| failed("index slice", err))?;

                        println!("{}", format!("✅ {} documents, {} tokens", summary.documents, summary.tokens).green());
                    }
                }
            }

            Self::Show => {
                let slices = stats.slices()
                    .map_err(|err| failed("read slice statistics", err))?;

                if slices.is_empty() {
                    println!("{} no slices indexed yet, see {}", "📖 Note:".blue(), "`stats index`".yellow());
                }

                for (corpus, year, summary) in slices {
                    println!("  {corpus} {year}: {} documents, {} tokens",
                        format!("{}", summary.documents).yellow(),
                        format!("{}", summary.tokens).yellow()
                    );
                }
            }
        }

        Ok(())
    }
}
