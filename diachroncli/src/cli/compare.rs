use std::io::BufRead;

use clap::Args;
use colorful::Colorful;

use diachronlib::prelude::*;

use super::{LayoutArgs, failed};

#[derive(Args)]
pub struct CompareCli {
    #[arg(long, short)]
    /// Compare words only within this corpus.
    corpus: Option<Corpus>,

    #[command(flatten)]
    layout: LayoutArgs,

    #[arg(long)]
    /// Print every series as a JSON line.
    json: bool,

    /// Words to compare. If none given, words are read from stdin
    /// until `quit` or `exit`.
    words: Vec<String>
}

fn print_series(series: &SimilaritySeries) {
    println!("📖 {} in {}", series.word.as_str().yellow(), series.corpus.name().blue());

    for point in &series.points {
        match point.similarity {
            Similarity::Found(similarity) => {
                println!("    {} → {} ({}): {}", point.pair.from, point.pair.to, point.pair.year, format!("{similarity:.5}").yellow());
            }

            Similarity::NotFound => {
                println!("    {} → {} ({}): {}", point.pair.from, point.pair.to, point.pair.year, "word not found".red());
            }
        }
    }
}

impl CompareCli {
    pub fn execute(self, workspace: &Workspace) -> anyhow::Result<()> {
        let corpora = match self.corpus {
            Some(corpus) => vec![corpus],
            None => Corpus::ALL.to_vec()
        };

        let mut chains = Vec::with_capacity(corpora.len());

        for corpus in corpora {
            println!("⏳ Loading models of {}, should take a while...", corpus.name().yellow());

            let now = std::time::Instant::now();

            let chain = ModelChain::load(workspace, corpus, self.layout.layout())
                .map_err(|err| failed("load models", err))?;

            println!("{}", format!("✅ Loaded {} models after {:.1} seconds", chain.len(), now.elapsed().as_secs_f32()).green());

            chains.push(chain);
        }

        let json = self.json;

        let compare = |query: &SimilarityQuery| {
            for chain in &chains {
                let series = chain.query(query);

                if !json {
                    print_series(&series);

                    continue;
                }

                match serde_json::to_string(&series) {
                    Ok(series) => println!("{series}"),
                    Err(err) => eprintln!("{}", format!("🧯 Failed to serialize series: {err}").red())
                }
            }
        };

        if !self.words.is_empty() {
            for word in &self.words {
                if let QueryCommand::Query(query) = QueryCommand::parse(word) {
                    compare(&query);
                }
            }

            return Ok(());
        }

        println!("{} type a word to compare, {} or {} to stop", "📖 Note:".blue(), "quit".yellow(), "exit".yellow());

        for line in std::io::stdin().lock().lines() {
            let line = line.map_err(|err| failed("read query", err.into()))?;

            match QueryCommand::parse(&line) {
                QueryCommand::Query(query) => compare(&query),
                QueryCommand::Skip => continue,
                QueryCommand::Exit => break
            }
        }

        Ok(())
    }
}
