pub mod table;
pub mod filters;
pub mod correlation;
pub mod report;
pub mod builder;

pub mod prelude {
    pub use super::table::{
        CSV_DELIMITER,
        Metric,
        ResultKey,
        WordResult,
        ResultTable,
        ExportReport
    };

    pub use super::filters::{
        WordFilter,
        Violation,
        FilterDecision,
        FilterReport
    };

    pub use super::correlation::{ranks, pearson, spearman};

    pub use super::report::{
        Correlation,
        CorpusSeries,
        WordReport,
        normalized_distance
    };

    pub use super::builder::{read_word_list, ResultBuilder};
}
