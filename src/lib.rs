//! # rapid_keywords
//!
//! TextRank keyword and keyphrase extraction over annotated documents.
//!
//! The input is a document that an NLP pipeline has already tokenized,
//! lemmatized and tagged (parts of speech, named entities, optionally
//! dependencies). Extraction runs four stages:
//!
//! - **Graph Builder**: a co-occurrence graph over the document's terms,
//!   from a skip-window or from dependency relations
//! - **Rank Engine**: a damped random-walk score per term
//! - **Phrase Assembler**: adjacent, linked, top-ranked terms fused into
//!   keyphrases with tf-idf statistics
//! - **Result Cleaner**: single words covered by longer phrases removed
//!
//! ```no_run
//! use rapid_keywords::{Document, KeywordConfig, KeywordExtractor, Sentence, TokenOccurrence};
//!
//! let document = Document::new(vec![Sentence::new(
//!     0,
//!     vec![
//!         TokenOccurrence::new(1, "machine", 0, 7).with_pos("NN"),
//!         TokenOccurrence::new(2, "learning", 8, 16).with_pos("NN"),
//!     ],
//! )]);
//!
//! let extractor = KeywordExtractor::new(KeywordConfig::default())?;
//! for keyword in extractor.evaluate(&document).ranked() {
//!     println!("{} {:.4}", keyword.normalized_text, keyword.relevance);
//! }
//! # Ok::<(), rapid_keywords::KeywordError>(())
//! ```

pub mod errors;
pub mod graph;
pub mod json;
pub mod nlp;
pub mod pagerank;
pub mod phrase;
pub mod pipeline;
pub mod types;

// Re-export commonly used types
pub use errors::{KeywordError, Result};
pub use types::{
    Dependency, Document, Keyword, KeywordConfig, KeywordMap, Sentence, StopwordTier, TokenId,
    TokenOccurrence,
};

// Re-export main functionality
pub use graph::{
    builder::{DocumentGraph, GraphBuilder, GraphOptions},
    cooccurrence::{CoOccurrenceEdge, CoOccurrenceGraph},
};
pub use nlp::{
    idf::{CorpusIdf, IdfSource, UniformIdf},
    stopwords::StopwordFilter,
    tokenizer::{Retokenizer, SimpleRetokenizer},
};
pub use pagerank::{standard::RankEngine, RankMap, RankOptions, RankResult, WeightedGraph};
pub use phrase::{assembler::PhraseAssembler, cleaner::ResultCleaner};
pub use pipeline::{rank_graph, Evaluation, EvaluationStats, KeywordExtractor};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
