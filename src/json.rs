//! JSON interface
//!
//! Pre-annotated documents come in as JSON and keyword results go out as
//! JSON, one record per keyword carrying the upsert payload (`normalized_text`
//! plus `exact_match_count`, `total_count` and `relevance`).

use crate::errors::Result;
use crate::pipeline::{EvaluationStats, KeywordExtractor};
use crate::types::{ranked_keywords, Document, Keyword, KeywordConfig, KeywordMap};
use serde::Serialize;

/// Output of [`evaluate_json`]
#[derive(Debug, Serialize)]
pub struct JsonEvaluation<'a> {
    pub keywords: Vec<&'a Keyword>,
    pub stats: EvaluationStats,
}

/// Parse an annotated document
pub fn document_from_json(json: &str) -> Result<Document> {
    Ok(serde_json::from_str(json)?)
}

/// Serialize keywords as a JSON array, best first
pub fn keywords_to_json(keywords: &KeywordMap) -> Result<String> {
    Ok(serde_json::to_string(&ranked_keywords(keywords))?)
}

/// Evaluate a JSON document with a (possibly partial or empty) JSON config
pub fn evaluate_json(document_json: &str, config_json: &str) -> Result<String> {
    let config = if config_json.trim().is_empty() {
        KeywordConfig::default()
    } else {
        KeywordConfig::from_json(config_json)?
    };
    let document = document_from_json(document_json)?;

    let extractor = KeywordExtractor::new(config)?;
    let evaluation = extractor.evaluate(&document);

    let output = JsonEvaluation {
        keywords: evaluation.ranked(),
        stats: evaluation.stats,
    };
    Ok(serde_json::to_string(&output)?)
}
