use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::prelude::*;

/// Extension of the LZ4 frame compressed slice files.
pub const LZ4_EXTENSION: &str = "lz4";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Tokenized text of a single corpus restricted to one year.
///
/// Slice file contains one document per line, tokens are
/// separated by whitespaces. If the plain file doesn't exist
/// the same file name with `.lz4` extension is tried.
pub struct YearSlice {
    pub corpus: Corpus,
    pub year: i32,
    path: PathBuf,
    compressed: bool
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Amount of documents and tokens stored in a text file.
pub struct SliceSummary {
    pub documents: u64,
    pub tokens: u64
}

/// Resolve plain or compressed variant of the given text file.
///
/// Return `None` if neither of them exists.
pub fn resolve_text_file(path: &Path) -> Option<(PathBuf, bool)> {
    if path.is_file() {
        return Some((path.to_path_buf(), false));
    }

    let mut compressed = path.as_os_str().to_os_string();

    compressed.push(".");
    compressed.push(LZ4_EXTENSION);

    let compressed = PathBuf::from(compressed);

    if compressed.is_file() {
        return Some((compressed, true));
    }

    None
}

/// Open buffered reader over a plain or LZ4 frame compressed file.
pub fn open_text_file(path: &Path, compressed: bool) -> anyhow::Result<Box<dyn BufRead>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open text file {path:?}"))?;

    if compressed {
        Ok(Box::new(BufReader::new(lz4_flex::frame::FrameDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Call `callback` for each line of the text file, split by whitespaces.
///
/// Return summary of the read file.
pub fn for_each_line(
    path: &Path,
    compressed: bool,
    mut callback: impl FnMut(Vec<&str>) -> anyhow::Result<()>
) -> anyhow::Result<SliceSummary> {
    let mut reader = open_text_file(path, compressed)?;
    let mut summary = SliceSummary::default();
    let mut line = String::new();

    loop {
        line.clear();

        let read = reader.read_line(&mut line)
            .with_context(|| format!("Failed to read line {} of {path:?}", summary.documents + 1))?;

        if read == 0 {
            break;
        }

        let tokens = line.split_whitespace().collect::<Vec<_>>();

        summary.documents += 1;
        summary.tokens += tokens.len() as u64;

        callback(tokens)?;
    }

    Ok(summary)
}

impl YearSlice {
    /// Locate slice file for given corpus and year.
    ///
    /// Missing slice is a fatal error: there's no way to train
    /// or count anything without the slice's text.
    pub fn locate(corpus: Corpus, year: i32, path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();

        let Some((path, compressed)) = resolve_text_file(path) else {
            anyhow::bail!("Slice file {path:?} for {corpus} {year} doesn't exist");
        };

        Ok(Self {
            corpus,
            year,
            path,
            compressed
        })
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    #[inline]
    /// Iterate over the slice documents as lists of tokens.
    pub fn for_each_document(&self, callback: impl FnMut(Vec<&str>) -> anyhow::Result<()>) -> anyhow::Result<SliceSummary> {
        for_each_line(&self.path, self.compressed, callback)
    }

    #[inline]
    /// Count documents and tokens of the slice (`wc -l`, `wc -w`).
    pub fn summary(&self) -> anyhow::Result<SliceSummary> {
        self.for_each_document(|_| Ok(()))
    }
}

#[test]
fn test_year_slice() -> anyhow::Result<()> {
    use std::io::Write;

    let dir = tempfile::tempdir()?;

    std::fs::write(dir.path().join("trouw_1994_tokenized"), "de kat zat\nop de  mat\n\n")?;

    let slice = YearSlice::locate(Corpus::Trouw, 1994, dir.path().join("trouw_1994_tokenized"))?;

    assert!(!slice.is_compressed());
    assert_eq!(slice.summary()?, SliceSummary { documents: 3, tokens: 6 });

    // Compressed slice is picked when the plain one is absent.
    let mut encoder = lz4_flex::frame::FrameEncoder::new(File::create(dir.path().join("trouw_1995_tokenized.lz4"))?);

    encoder.write_all(b"de hond\nblaft\n")?;
    encoder.finish()?;

    let slice = YearSlice::locate(Corpus::Trouw, 1995, dir.path().join("trouw_1995_tokenized"))?;

    assert!(slice.is_compressed());

    let mut documents = Vec::new();

    slice.for_each_document(|tokens| {
        documents.push(tokens.join(" "));

        Ok(())
    })?;

    assert_eq!(documents, ["de hond", "blaft"]);

    assert!(YearSlice::locate(Corpus::Trouw, 1996, dir.path().join("trouw_1996_tokenized")).is_err());

    Ok(())
}
