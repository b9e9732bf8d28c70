pub mod chain;
pub mod query;
pub mod average;

pub mod prelude {
    pub use super::chain::{ChainLayout, ChainPair, ModelChain};

    pub use super::query::{
        SimilarityQuery,
        QueryCommand,
        Similarity,
        SimilarityPoint,
        SimilaritySeries,
        normalize_query
    };

    pub use super::average::{AverageSimilarity, CorpusAverage};
}
