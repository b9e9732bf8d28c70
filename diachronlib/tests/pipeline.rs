use diachronlib::prelude::*;

const STABLE: &str = "de kat zat op de mat\nde hond lag op de bank\neen kat en een hond\n";
const VANISHING: &str = "de dodo liep op het strand\n";

fn write_corpus(workspace: &Workspace, corpus: Corpus) -> anyhow::Result<()> {
    for year in 1994..=1996 {
        let mut text = STABLE.repeat(5);

        if year < 1996 {
            text.push_str(VANISHING);
        }

        std::fs::write(workspace.slice_path(corpus, year), text)?;
    }

    Ok(())
}

#[test]
fn test_pipeline() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let workspace = Workspace::new(dir.path());

    let params = TrainingParams::default()
        .with_dimension(8)
        .with_learn_rate(0.001)
        .with_epochs(2)
        .with_min_count(1)
        .with_workers(1);

    for corpus in Corpus::ALL {
        write_corpus(&workspace, corpus)?;

        let options = ChainOptions::new(corpus)
            .with_years(1994..=1996);

        let reports = SliceTrainer::new(&workspace, options, params)?.run()?;

        assert_eq!(reports.len(), 3);
        assert_eq!(reports[2].training.documents, 15);
    }

    let layout = ChainLayout::new(Direction::Forward, vec![1994, 1995, 1996], false);

    for corpus in Corpus::ALL {
        let chain = ModelChain::load(&workspace, corpus, layout.clone())?;

        let stable = chain.query(&SimilarityQuery::new("kat"));

        assert!(stable.is_complete());

        for (_, similarity) in stable.found() {
            assert!(similarity > 0.95 && similarity <= 1.0, "similarity of kat is {similarity}");
        }

        let vanishing = chain.query(&SimilarityQuery::new("dodo"));

        assert_eq!(vanishing.points[0].pair.year, 1995);
        assert!(vanishing.points[0].similarity.is_found());

        assert_eq!(vanishing.points[1].pair.year, 1996);
        assert_eq!(vanishing.points[1].similarity, Similarity::NotFound);
    }

    let stats = StatsDatabase::open(workspace.stats_path(), -4096)?;

    let words = [String::from("kat"), String::from("dodo")];

    let table = ResultBuilder::new(&workspace, &stats, layout).build(&words)?;

    assert_eq!(table.len(), 2);
    assert_eq!(table.incomplete_words(), ["dodo"]);

    let mut csv = Vec::new();

    let export = table.write_csv(&mut csv)?;

    assert_eq!(export.rows, 1);
    assert_eq!(export.omitted, ["dodo"]);

    // Two occurrences in each of the five repeats.
    let Some(kat) = table.get("kat") else {
        anyhow::bail!("Results of kat are missing");
    };

    assert_eq!(kat.get(ResultKey::new(Metric::Count, Corpus::Trouw, 1996)), Some(10.0));
    assert_eq!(kat.get(ResultKey::new(Metric::Count, Corpus::Volkskrant, 1995)), Some(10.0));

    let report = table.filter(WordFilter::MinCount(10));

    assert_eq!(report.passed, ["kat"]);
    assert_eq!(report.incomplete, ["dodo"]);

    let report = WordReport::build(&table, "kat", None)?;

    assert_eq!(report.corpora.len(), 2);

    Ok(())
}
