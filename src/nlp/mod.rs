//! NLP helpers around the external annotator
//!
//! Stopword tiers, the re-tokenization seam used by named-entity expansion,
//! and inverse document frequency sources.

pub mod idf;
pub mod stopwords;
pub mod tokenizer;
