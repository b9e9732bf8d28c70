use std::path::PathBuf;

use clap::Args;
use colorful::Colorful;

use diachronlib::prelude::*;

use super::{LayoutArgs, failed};

#[derive(Args)]
pub struct AverageCli {
    /// File with the words to average, one per line.
    word_list: PathBuf,

    #[command(flatten)]
    layout: LayoutArgs
}

impl AverageCli {
    pub fn execute(self, workspace: &Workspace) -> anyhow::Result<()> {
        let words = read_word_list(&self.word_list)
            .map_err(|err| failed("read word list", err))?;

        println!("{}", format!("✅ Read list of {} words", words.len()).green());

        let layout = self.layout.layout();

        let mut average = AverageSimilarity::new(layout.clone());

        for corpus in Corpus::ALL {
            println!("⏳ Loading models of {}, should take a while...", corpus.name().yellow());

            let chain = ModelChain::load(workspace, corpus, layout.clone())
                .map_err(|err| failed("load models", err))?;

            let corpus_average = average.insert_chain(&chain, &words)
                .map_err(|err| failed("average similarity", err))?;

            println!("{}", format!("✅ Got similarities for {} of {} words", corpus_average.found, corpus_average.queried).green());

            for (year, similarity) in &corpus_average.similarity {
                println!("    {year}: {}", format!("{similarity:.5}").yellow());
            }
        }

        let path = workspace.result_path(&self.word_list, "average_similarity.json");

        average.save(&path)
            .map_err(|err| failed("save average similarity", err))?;

        println!("{}", format!("🚀 Saved average similarity to {path:?}").green());

        Ok(())
    }
}
