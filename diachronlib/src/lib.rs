pub mod config;
pub mod workspace;

pub mod corpus;
pub mod vocabulary;
pub mod embeddings;
pub mod trainer;
pub mod similarity;
pub mod analysis;

pub mod prelude {
    pub use super::config::*;
    pub use super::workspace::Workspace;

    pub use super::corpus::prelude::*;
    pub use super::vocabulary::Vocabulary;
    pub use super::embeddings::prelude::*;
    pub use super::trainer::*;
    pub use super::similarity::prelude::*;
    pub use super::analysis::prelude::*;
}
