use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use tempfile::NamedTempFile;

use crate::prelude::*;

impl EmbeddingModel {
    /// Save model in the word2vec text format:
    ///
    /// ```text
    /// <words> <dimension>
    /// <word> <value> <value> ...
    /// ```
    ///
    /// The file is written to a temporary file first and then moved
    /// to its place, so an existing model file is always complete.
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();

        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new(".")
        };

        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {parent:?}"))?;

        let file = NamedTempFile::new_in(parent)
            .with_context(|| format!("Failed to create temporary model file in {parent:?}"))?;

        {
            let mut writer = BufWriter::new(file.as_file());

            writeln!(writer, "{} {}", self.len(), self.dimension())?;

            for (word, vector) in self.iter() {
                if word.is_empty() || word.contains(char::is_whitespace) {
                    anyhow::bail!("Word {word:?} can't be stored in the vectors file");
                }

                writer.write_all(word.as_bytes())?;

                for value in vector {
                    // Shortest representation which parses back to the same float.
                    write!(writer, " {value}")?;
                }

                writer.write_all(b"\n")?;
            }

            writer.flush()?;
        }

        file.persist(path)
            .with_context(|| format!("Failed to save model file {path:?}"))?;

        Ok(())
    }

    /// Load model saved in the word2vec text format.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();

        let file = File::open(path)
            .with_context(|| format!("Model file {path:?} doesn't exist or can't be opened"))?;

        let mut lines = BufReader::new(file).lines();

        let Some(header) = lines.next() else {
            anyhow::bail!("Model file {path:?} is empty");
        };

        let header = header?;
        let mut header = header.split_whitespace();

        let (Some(words), Some(dimension), None) = (header.next(), header.next(), header.next()) else {
            anyhow::bail!("Model file {path:?} has invalid header");
        };

        let words = words.parse::<usize>()
            .with_context(|| format!("Invalid words amount in the header of {path:?}"))?;

        let dimension = dimension.parse::<usize>()
            .with_context(|| format!("Invalid dimension in the header of {path:?}"))?;

        let mut model = Self::with_capacity(dimension, words);
        let mut vector = Vec::with_capacity(dimension);

        for (i, line) in lines.enumerate() {
            let line = line?;

            // Header is the first line.
            let line_number = i + 2;

            let mut values = line.split_whitespace();

            let Some(word) = values.next() else {
                continue;
            };

            vector.clear();

            for value in values {
                let value = value.parse::<f32>()
                    .with_context(|| format!("Invalid vector value {value:?} at line {line_number} of {path:?}"))?;

                vector.push(value);
            }

            if vector.len() != dimension {
                anyhow::bail!("Word '{word}' at line {line_number} of {path:?} has {} values, expected {dimension}", vector.len());
            }

            model.insert(word, &vector)?;
        }

        if model.len() != words {
            anyhow::bail!("Model file {path:?} declares {words} words but contains {}", model.len());
        }

        Ok(model)
    }
}

#[test]
fn test_model_store() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("models").join("trouw_1994.w2v");

    let mut model = EmbeddingModel::new(4);

    model.insert("kat", &[0.1, -0.000_001_5, 12345.678, 1.0e-12])?;
    model.insert("hond", &[f32::MIN_POSITIVE, 0.333_333_34, -0.5, 0.0])?;

    model.save(&path)?;

    let loaded = EmbeddingModel::load(&path)?;

    assert_eq!(loaded.dimension(), 4);
    assert_eq!(loaded.len(), 2);

    for (word, vector) in model.iter() {
        let Some(loaded) = loaded.get(word) else {
            anyhow::bail!("Word {word} was lost");
        };

        for (a, b) in vector.iter().zip(loaded) {
            assert!((a - b).abs() <= 1e-6);
        }
    }

    Ok(())
}

#[test]
fn test_model_store_errors() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;

    assert!(EmbeddingModel::load(dir.path().join("missing.w2v")).is_err());

    std::fs::write(dir.path().join("short.w2v"), "1 3\nkat 0.1 0.2\n")?;
    std::fs::write(dir.path().join("count.w2v"), "2 2\nkat 0.1 0.2\n")?;
    std::fs::write(dir.path().join("float.w2v"), "1 2\nkat 0.1 abc\n")?;
    std::fs::write(dir.path().join("header.w2v"), "kat 0.1 0.2\n")?;

    assert!(EmbeddingModel::load(dir.path().join("short.w2v")).is_err());
    assert!(EmbeddingModel::load(dir.path().join("count.w2v")).is_err());
    assert!(EmbeddingModel::load(dir.path().join("float.w2v")).is_err());
    assert!(EmbeddingModel::load(dir.path().join("header.w2v")).is_err());

    let mut model = EmbeddingModel::new(1);

    model.insert("two words", &[1.0])?;

    assert!(model.save(dir.path().join("spaces.w2v")).is_err());

    Ok(())
}
