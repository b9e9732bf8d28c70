use std::str::FromStr;

use serde::{Serialize, Deserialize};

pub mod slice;
pub mod stats;

pub mod prelude {
    pub use super::{Corpus, Direction, SliceLabel};

    pub use super::slice::{YearSlice, SliceSummary};
    pub use super::stats::{Database as StatsDatabase, WordCount, CountMode, SliceFingerprint};
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Newspaper corpora known to the toolkit.
///
/// Variants order is the canonical order of the corpora
/// in all the exported tables.
pub enum Corpus {
    Volkskrant,
    Trouw
}

impl Corpus {
    pub const ALL: [Self; 2] = [Self::Volkskrant, Self::Trouw];

    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Volkskrant => "volkskrant",
            Self::Trouw => "trouw"
        }
    }
}

impl std::fmt::Display for Corpus {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Corpus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "volkskrant" => Ok(Self::Volkskrant),
            "trouw" => Ok(Self::Trouw),

            _ => Err(format!("unknown corpus '{value}', expected one of: volkskrant, trouw"))
        }
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Order in which year slices are processed.
pub enum Direction {
    #[default]
    /// Oldest year first.
    Forward,

    /// Most recent year first.
    Reverse
}

impl Direction {
    /// Order given years according to the direction.
    pub fn order(&self, mut years: Vec<i32>) -> Vec<i32> {
        years.sort_unstable();
        years.dedup();

        if *self == Self::Reverse {
            years.reverse();
        }

        years
    }

    #[inline]
    /// Suffix appended to the names of the model files.
    pub const fn suffix(&self) -> &'static str {
        match self {
            Self::Forward => "",
            Self::Reverse => "_reverse"
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Identifier of a single model in the training chain.
pub enum SliceLabel {
    /// Anchor model trained on the first slice before the main chain.
    Initial,

    Year(i32)
}

impl SliceLabel {
    #[inline]
    pub const fn year(&self) -> Option<i32> {
        match self {
            Self::Initial => None,
            Self::Year(year) => Some(*year)
        }
    }
}

impl std::fmt::Display for SliceLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initial => f.write_str("initial"),
            Self::Year(year) => write!(f, "{year}")
        }
    }
}

#[test]
fn test_corpus_names() {
    assert_eq!("Trouw".parse::<Corpus>(), Ok(Corpus::Trouw));
    assert_eq!("volkskrant".parse::<Corpus>(), Ok(Corpus::Volkskrant));
    assert!("nrc".parse::<Corpus>().is_err());

    assert!(Corpus::Volkskrant < Corpus::Trouw);
    assert_eq!(Corpus::Trouw.to_string(), "trouw");
}

#[test]
fn test_direction_order() {
    assert_eq!(Direction::Forward.order(vec![1996, 1994, 1995]), [1994, 1995, 1996]);
    assert_eq!(Direction::Reverse.order(vec![1994, 1996, 1995, 1995]), [1996, 1995, 1994]);

    assert_eq!(SliceLabel::Initial.to_string(), "initial");
    assert_eq!(SliceLabel::Year(2001).to_string(), "2001");
}
