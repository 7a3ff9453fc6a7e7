//! Pipeline orchestration
//!
//! - [`artifacts`]: typed results of an evaluation run
//! - [`runner`]: the [`KeywordExtractor`] and standalone graph ranking

pub mod artifacts;
pub mod runner;

pub use artifacts::{Evaluation, EvaluationStats};
pub use runner::{rank_graph, KeywordExtractor};
