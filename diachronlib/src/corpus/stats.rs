use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::UNIX_EPOCH;

use anyhow::Context;
use rusqlite::Connection;
use serde::{Serialize, Deserialize};

use crate::prelude::*;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Which number is used as the raw count of a word in a slice.
pub enum CountMode {
    #[default]
    /// Total amount of the word's occurrences.
    Occurrences,

    /// Amount of documents (lines) containing the word at least once.
    Documents
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WordCount {
    pub occurrences: u64,
    pub documents: u64
}

impl WordCount {
    #[inline]
    pub const fn get(&self, mode: CountMode) -> u64 {
        match mode {
            CountMode::Occurrences => self.occurrences,
            CountMode::Documents => self.documents
        }
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Size and modification time of the slice file when it was indexed.
pub struct SliceFingerprint {
    pub size: u64,

    /// Nanoseconds since the unix epoch.
    pub modified: i64
}

impl SliceFingerprint {
    pub fn of(slice: &YearSlice) -> anyhow::Result<Self> {
        let metadata = std::fs::metadata(slice.path())
            .with_context(|| format!("Failed to read metadata of {:?}", slice.path()))?;

        let modified = metadata.modified()?
            .duration_since(UNIX_EPOCH)
            .map(|time| time.as_nanos() as i64)
            .unwrap_or_default();

        Ok(Self {
            size: metadata.len(),
            modified
        })
    }
}

#[derive(Debug)]
/// SQLite database caching slice totals and per-word counts.
///
/// Counting words requires a full scan of the slice file,
/// so every slice is scanned once and reused by later runs.
pub struct Database {
    connection: Connection
}

impl Database {
    /// Open database with given cache size.
    /// Negative number means sqlite pages (1024 bytes), positive - bytes.
    pub fn open(path: impl AsRef<Path>, cache_size: i64) -> anyhow::Result<Self> {
        let connection = Connection::open(path)?;

        connection.execute_batch(&format!("PRAGMA cache_size = {cache_size};"))?;

        connection.execute_batch("
            CREATE TABLE IF NOT EXISTS slices (
                corpus    TEXT    NOT NULL,
                year      INTEGER NOT NULL,
                documents INTEGER NOT NULL,
                tokens    INTEGER NOT NULL,
                file_size INTEGER NOT NULL,
                modified  INTEGER NOT NULL,

                PRIMARY KEY (corpus, year)
            );

            CREATE TABLE IF NOT EXISTS word_counts (
                corpus      TEXT    NOT NULL,
                year        INTEGER NOT NULL,
                word        TEXT    NOT NULL,
                occurrences INTEGER NOT NULL,
                documents   INTEGER NOT NULL,

                PRIMARY KEY (corpus, year, word)
            );
        ")?;

        Ok(Self {
            connection
        })
    }

    /// Query cached summary of the slice.
    ///
    /// Guaranteed to return `Ok(None)` if the slice wasn't indexed yet.
    pub fn query_summary(&self, corpus: Corpus, year: i32) -> anyhow::Result<Option<SliceSummary>> {
        let summary = self.connection.prepare_cached("SELECT documents, tokens FROM slices WHERE corpus = ?1 AND year = ?2")?
            .query_row((corpus.name(), year), |row| {
                Ok(SliceSummary {
                    documents: row.get::<_, i64>(0)? as u64,
                    tokens: row.get::<_, i64>(1)? as u64
                })
            });

        match summary {
            Ok(summary) => Ok(Some(summary)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(err) => anyhow::bail!(err)
        }
    }

    /// Query fingerprint of the slice file stored when it was indexed.
    pub fn query_fingerprint(&self, corpus: Corpus, year: i32) -> anyhow::Result<Option<SliceFingerprint>> {
        let fingerprint = self.connection.prepare_cached("SELECT file_size, modified FROM slices WHERE corpus = ?1 AND year = ?2")?
            .query_row((corpus.name(), year), |row| {
                Ok(SliceFingerprint {
                    size: row.get::<_, i64>(0)? as u64,
                    modified: row.get(1)?
                })
            });

        match fingerprint {
            Ok(fingerprint) => Ok(Some(fingerprint)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(err) => anyhow::bail!(err)
        }
    }

    /// Scan the slice file and store its totals and word counts,
    /// replacing previously stored values.
    pub fn index_slice(&self, slice: &YearSlice) -> anyhow::Result<SliceSummary> {
        let fingerprint = SliceFingerprint::of(slice)?;

        let mut counts = HashMap::<String, WordCount>::new();

        let summary = slice.for_each_document(|tokens| {
            let mut seen = HashSet::with_capacity(tokens.len());

            for token in tokens {
                let count = counts.entry(token.to_string()).or_default();

                count.occurrences += 1;

                if seen.insert(token) {
                    count.documents += 1;
                }
            }

            Ok(())
        })?;

        let transaction = self.connection.unchecked_transaction()?;

        transaction.prepare_cached("DELETE FROM word_counts WHERE corpus = ?1 AND year = ?2")?
            .execute((slice.corpus.name(), slice.year))?;

        {
            let mut insert = transaction.prepare_cached("INSERT INTO word_counts (corpus, year, word, occurrences, documents) VALUES (?1, ?2, ?3, ?4, ?5)")?;

            for (word, count) in &counts {
                insert.execute((slice.corpus.name(), slice.year, word, count.occurrences as i64, count.documents as i64))?;
            }
        }

        transaction.prepare_cached("INSERT OR REPLACE INTO slices (corpus, year, documents, tokens, file_size, modified) VALUES (?1, ?2, ?3, ?4, ?5, ?6)")?
            .execute((
                slice.corpus.name(),
                slice.year,
                summary.documents as i64,
                summary.tokens as i64,
                fingerprint.size as i64,
                fingerprint.modified
            ))?;

        transaction.commit()?;

        tracing::debug!(corpus = %slice.corpus, year = slice.year, words = counts.len(), tokens = summary.tokens, "indexed slice");

        Ok(summary)
    }

    /// Return cached summary of the slice, indexing it first if it
    /// wasn't indexed yet or the file changed since then.
    pub fn ensure_indexed(&self, slice: &YearSlice) -> anyhow::Result<SliceSummary> {
        let Some(summary) = self.query_summary(slice.corpus, slice.year)? else {
            return self.index_slice(slice);
        };

        let stored = self.query_fingerprint(slice.corpus, slice.year)?;

        if stored != Some(SliceFingerprint::of(slice)?) {
            tracing::warn!(corpus = %slice.corpus, year = slice.year, path = ?slice.path(), "slice file changed, indexing it again");

            return self.index_slice(slice);
        }

        Ok(summary)
    }

    /// Query count of the word in an indexed slice.
    ///
    /// Words which never occur in the slice have zero count.
    pub fn query_count(&self, corpus: Corpus, year: i32, word: impl AsRef<str>) -> anyhow::Result<WordCount> {
        let count = self.connection.prepare_cached("SELECT occurrences, documents FROM word_counts WHERE corpus = ?1 AND year = ?2 AND word = ?3")?
            .query_row((corpus.name(), year, word.as_ref()), |row| {
                Ok(WordCount {
                    occurrences: row.get::<_, i64>(0)? as u64,
                    documents: row.get::<_, i64>(1)? as u64
                })
            });

        match count {
            Ok(count) => Ok(count),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(WordCount::default()),
            Err(err) => anyhow::bail!(err)
        }
    }

    /// List all indexed slices ordered by corpus and year.
    pub fn slices(&self) -> anyhow::Result<Vec<(String, i32, SliceSummary)>> {
        let slices = self.connection.prepare_cached("SELECT corpus, year, documents, tokens FROM slices ORDER BY corpus ASC, year ASC")?
            .query_map((), |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i32>(1)?, SliceSummary {
                    documents: row.get::<_, i64>(2)? as u64,
                    tokens: row.get::<_, i64>(3)? as u64
                }))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(slices)
    }
}

#[test]
fn test_stats_database() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;

    std::fs::write(dir.path().join("volkskrant_1994_tokenized"), "de kat de kat\nde hond\n")?;

    let slice = YearSlice::locate(Corpus::Volkskrant, 1994, dir.path().join("volkskrant_1994_tokenized"))?;
    let db = Database::open(dir.path().join("stats.db"), 4096)?;

    assert_eq!(db.query_summary(Corpus::Volkskrant, 1994)?, None);

    let summary = db.ensure_indexed(&slice)?;

    assert_eq!(summary, SliceSummary { documents: 2, tokens: 6 });
    assert_eq!(db.query_summary(Corpus::Volkskrant, 1994)?, Some(summary));

    assert_eq!(db.query_count(Corpus::Volkskrant, 1994, "de")?, WordCount { occurrences: 3, documents: 2 });
    assert_eq!(db.query_count(Corpus::Volkskrant, 1994, "kat")?.get(CountMode::Occurrences), 2);
    assert_eq!(db.query_count(Corpus::Volkskrant, 1994, "kat")?.get(CountMode::Documents), 1);
    assert_eq!(db.query_count(Corpus::Volkskrant, 1994, "vis")?, WordCount::default());
    assert_eq!(db.query_count(Corpus::Trouw, 1994, "de")?, WordCount::default());

    // Re-indexing replaces stored counts.
    std::fs::write(dir.path().join("volkskrant_1994_tokenized"), "vis\n")?;

    db.index_slice(&slice)?;

    assert_eq!(db.query_count(Corpus::Volkskrant, 1994, "de")?, WordCount::default());
    assert_eq!(db.slices()?.len(), 1);

    Ok(())
}

#[test]
fn test_stats_changed_slice() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("trouw_1995_tokenized");

    std::fs::write(&path, "kat kat kat kat\n")?;

    let slice = YearSlice::locate(Corpus::Trouw, 1995, &path)?;
    let db = Database::open(dir.path().join("stats.db"), 4096)?;

    assert_eq!(db.ensure_indexed(&slice)?, SliceSummary { documents: 1, tokens: 4 });
    assert_eq!(db.query_fingerprint(Corpus::Trouw, 1995)?, Some(SliceFingerprint::of(&slice)?));

    std::fs::write(&path, "hond hond\n")?;

    assert_eq!(db.ensure_indexed(&slice)?, SliceSummary { documents: 1, tokens: 2 });
    assert_eq!(db.query_summary(Corpus::Trouw, 1995)?, Some(SliceSummary { documents: 1, tokens: 2 }));

    assert_eq!(db.query_count(Corpus::Trouw, 1995, "kat")?, WordCount::default());
    assert_eq!(db.query_count(Corpus::Trouw, 1995, "hond")?, WordCount { occurrences: 2, documents: 1 });

    // Unchanged file is served from the cache.
    assert_eq!(db.ensure_indexed(&slice)?, SliceSummary { documents: 1, tokens: 2 });

    Ok(())
}
