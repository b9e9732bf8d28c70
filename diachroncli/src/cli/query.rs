use std::path::PathBuf;

use clap::Args;
use colorful::Colorful;

use diachronlib::prelude::*;

use super::{LayoutArgs, failed};

#[derive(Args)]
pub struct QueryCli {
    /// File with the words to query, one per line.
    word_list: PathBuf,

    #[command(flatten)]
    layout: LayoutArgs,

    #[arg(long)]
    /// Count documents containing the word instead of its occurrences.
    documents: bool
}

impl QueryCli {
    pub fn execute(self, workspace: &Workspace, cache_size: i64) -> anyhow::Result<()> {
        let words = read_word_list(&self.word_list)
            .map_err(|err| failed("read word list", err))?;

        println!("{}", format!("✅ Read list of {} words", words.len()).green());

        let stats_path = workspace.stats_path();

        println!("⏳ Opening slice statistics in {stats_path:?}...");

        let stats = StatsDatabase::open(&stats_path, cache_size)
            .map_err(|err| failed("open slice statistics", err))?;

        let count_mode = if self.documents {
            CountMode::Documents
        } else {
            CountMode::Occurrences
        };

        println!("⏳ Querying words against the models, should take a while...");

        let now = std::time::Instant::now();

        let table = ResultBuilder::new(workspace, &stats, self.layout.layout())
            .with_count_mode(count_mode)
            .build(&words)
            .map_err(|err| failed("query words", err))?;

        println!("{}", format!("✅ Words queried after {:.1} seconds", now.elapsed().as_secs_f32()).green());

        let json_path = workspace.result_path(&self.word_list, "results.json");
        let csv_path = workspace.result_path(&self.word_list, "results.csv");

        table.save_json(&json_path)
            .map_err(|err| failed("save results", err))?;

        let export = table.save_csv(&csv_path)
            .map_err(|err| failed("save results table", err))?;

        for word in &export.omitted {
            println!("{} no results for {}", "📖 Note:".blue(), word.as_str().yellow());
        }

        println!("{}", format!("🚀 Saved {} rows", export.rows).green());
        println!("    Results: {}", format!("{json_path:?}").yellow());
        println!("      Table: {}", format!("{csv_path:?}").yellow());

        Ok(())
    }
}
