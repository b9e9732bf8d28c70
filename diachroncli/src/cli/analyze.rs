use std::path::PathBuf;

use clap::Args;
use colorful::Colorful;

use diachronlib::prelude::*;

use super::failed;

#[derive(Args)]
pub struct AnalyzeCli {
    /// Results file saved by the `query` command.
    results: PathBuf,

    #[arg(long, short)]
    /// Average similarity file saved by the `average` command.
    avg: Option<PathBuf>,

    #[arg(long, short)]
    /// Print detailed analysis of the word.
    word: Option<String>,

    #[arg(long)]
    /// Keep words with count not lower than this in every year of both corpora.
    min_count: Option<u64>,

    #[arg(long)]
    /// Keep words with frequency not lower than this in every year of both corpora.
    min_freq: Option<f64>,

    #[arg(long)]
    /// Keep words with average frequency greater than this.
    min_avg_freq: Option<f64>
}

#[inline]
fn format_value(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{value:.5}"),
        None => String::from("undefined")
    }
}

fn format_series(values: &[f64]) -> String {
    values.iter()
        .map(|value| format!("{value:.3}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_correlation(name: &str, correlation: &Correlation) {
    println!("    {name}: spearman {}, pearson {}",
        format_value(correlation.spearman).yellow(),
        format_value(correlation.pearson).yellow()
    );
}

fn print_report(report: &WordReport) {
    println!("📖 Analysis of {}", report.word.as_str().yellow());

    for series in &report.corpora {
        println!();
        println!("  {}", series.corpus.name().blue());

        println!("                   Years: {}", series.years.iter().map(i32::to_string).collect::<Vec<_>>().join(", "));
        println!("                  Counts: {}", format_series(&series.counts));
        println!("             Frequencies: {}", format_series(&series.frequencies));
        println!("            Similarities: {}", format_series(&series.similarities));
        println!("               Distances: {}", format_series(&series.distances));

        match &series.normalized_distances {
            Some(distances) => println!("    Normalized distances: {}", format_series(distances)),
            None => println!("    Normalized distances: {}", "undefined".red())
        }

        if let Some(average) = &series.list_average {
            let values = average.iter()
                .map(|(_, similarity)| *similarity)
                .collect::<Vec<_>>();

            println!("    List avg. similarity: {}", format_series(&values));
        }

        println!("       Average frequency: {}", format!("{:.5}", series.average_frequency).yellow());
        println!("      Average similarity: {}", format!("{:.5}", series.average_similarity).yellow());
    }

    println!();
    println!("  {}", "Correlations".blue());

    print_correlation("similarity (volkskrant vs trouw)", &report.similarity);
    print_correlation("frequency (volkskrant vs trouw)", &report.frequency);

    for (corpus, correlation) in &report.similarity_frequency {
        print_correlation(&format!("similarity vs frequency ({corpus})"), correlation);
    }
}

fn print_filter(name: &str, table: &ResultTable, filter: WordFilter) {
    let report = table.filter(filter);

    println!();
    println!("📖 {name}");

    for (word, decision) in &report.rejected {
        match (decision.first_violation, decision.average) {
            (Some(violation), _) => {
                println!("    {} rejected: {} in {} {}", word.as_str().yellow(), violation.value, violation.corpus, violation.year);
            }

            (None, Some(average)) => {
                println!("    {} rejected: average {}", word.as_str().yellow(), format!("{average:.5}").yellow());
            }

            (None, None) => println!("    {} rejected", word.as_str().yellow())
        }
    }

    println!("{}", format!("✅ Remaining words ({}): {}", report.passed.len(), report.passed.join(", ")).green());
}

impl AnalyzeCli {
    pub fn execute(self) -> anyhow::Result<()> {
        println!("⏳ Reading results from {:?}...", self.results);

        let table = ResultTable::load_json(&self.results)
            .map_err(|err| failed("read results", err))?;

        let incomplete = table.incomplete_words();

        if !incomplete.is_empty() {
            println!("{} {} words without complete results are ignored", "📖 Note:".blue(), incomplete.len());
        }

        if let Some(word) = &self.word {
            let averages = match &self.avg {
                Some(path) => Some(AverageSimilarity::load(path).map_err(|err| failed("read average similarity", err))?),
                None => None
            };

            let report = WordReport::build(&table, word, averages.as_ref())
                .map_err(|err| failed("analyze word", err))?;

            print_report(&report);
        }

        if let Some(min_count) = self.min_count {
            print_filter(&format!("Words with count of at least {min_count}"), &table, WordFilter::MinCount(min_count));
        }

        if let Some(min_freq) = self.min_freq {
            print_filter(&format!("Words with frequency of at least {min_freq}"), &table, WordFilter::MinFrequency(min_freq));
        }

        if let Some(min_avg_freq) = self.min_avg_freq {
            print_filter(&format!("Words with average frequency above {min_avg_freq}"), &table, WordFilter::MinAverageFrequency(min_avg_freq));
        }

        Ok(())
    }
}
