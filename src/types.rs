//! Core types for rapid_keywords
//!
//! This module defines the annotated-document input model, the keyword
//! result model, and the extraction configuration.

use crate::errors::{KeywordError, Result};
use crate::graph::builder::GraphOptions;
use crate::pagerank::RankOptions;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ============================================================================
// Token identity
// ============================================================================

/// Opaque identifier of a distinct term (tag) in a document.
///
/// Ids handed out by the annotator are non-negative ([`Document::validate`]
/// rejects others). Negative ids are synthetic and only ever created by
/// named-entity expansion for sub-tokens that could not be matched to a real
/// term.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TokenId(pub i64);

impl TokenId {
    /// Create a new token id
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Whether this id was minted by named-entity expansion
    pub fn is_synthetic(&self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Annotated input
// ============================================================================

/// One occurrence of a term in a sentence, as produced by the annotator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenOccurrence {
    /// The term this occurrence belongs to
    pub token_id: TokenId,
    /// Lemmatized value of the term
    pub value: String,
    /// Character offset (start) in the document
    pub start: usize,
    /// Character offset (end, exclusive) in the document
    pub end: usize,
    /// Part-of-speech tags assigned by the annotator
    #[serde(default)]
    pub parts_of_speech: BTreeSet<String>,
    /// Named-entity labels assigned by the annotator
    #[serde(default)]
    pub named_entities: BTreeSet<String>,
}

impl TokenOccurrence {
    /// Create an occurrence without POS or named-entity annotations
    pub fn new(token_id: impl Into<TokenId>, value: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            token_id: token_id.into(),
            value: value.into(),
            start,
            end,
            parts_of_speech: BTreeSet::new(),
            named_entities: BTreeSet::new(),
        }
    }

    /// Builder method: add a part-of-speech tag
    pub fn with_pos(mut self, pos: impl Into<String>) -> Self {
        self.parts_of_speech.insert(pos.into());
        self
    }

    /// Builder method: add a named-entity label
    pub fn with_named_entity(mut self, label: impl Into<String>) -> Self {
        self.named_entities.insert(label.into());
        self
    }

    /// Whether the annotator recognised this occurrence as a named entity
    pub fn is_named_entity(&self) -> bool {
        !self.named_entities.is_empty()
    }

    /// Whether the value spans more than one word
    pub fn is_multi_word(&self) -> bool {
        self.value.split_whitespace().nth(1).is_some()
    }
}

impl From<i64> for TokenId {
    fn from(id: i64) -> Self {
        TokenId(id)
    }
}

impl From<i32> for TokenId {
    fn from(id: i32) -> Self {
        TokenId(i64::from(id))
    }
}

/// A syntactic dependency between two terms of the same sentence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Head of the relation
    pub governor: TokenId,
    /// Dependent of the relation
    pub dependent: TokenId,
    /// Relation type (e.g. "compound", "amod")
    #[serde(default)]
    pub kind: String,
}

impl Dependency {
    pub fn new(governor: impl Into<TokenId>, dependent: impl Into<TokenId>, kind: impl Into<String>) -> Self {
        Self {
            governor: governor.into(),
            dependent: dependent.into(),
            kind: kind.into(),
        }
    }
}

/// A sentence: its token occurrences in document order plus dependencies
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    /// Sentence index within the document
    #[serde(default)]
    pub index: usize,
    /// Token occurrences ordered by start offset
    pub tokens: Vec<TokenOccurrence>,
    /// Dependency relations over `tokens`
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl Sentence {
    /// Create a sentence without dependencies
    pub fn new(index: usize, tokens: Vec<TokenOccurrence>) -> Self {
        Self {
            index,
            tokens,
            dependencies: Vec::new(),
        }
    }

    /// Builder method: attach dependency relations
    pub fn with_dependencies(mut self, dependencies: Vec<Dependency>) -> Self {
        self.dependencies = dependencies;
        self
    }
}

/// An annotated document ready for keyword extraction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Caller-side identifier (opaque to the library)
    #[serde(default)]
    pub id: Option<String>,
    /// Sentences in document order
    pub sentences: Vec<Sentence>,
}

impl Document {
    /// Create a document from sentences
    pub fn new(sentences: Vec<Sentence>) -> Self {
        Self { id: None, sentences }
    }

    /// Builder method: set the document id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Total number of token occurrences
    pub fn token_count(&self) -> usize {
        self.sentences.iter().map(|s| s.tokens.len()).sum()
    }

    /// Check if the document has no token occurrences at all
    pub fn is_empty(&self) -> bool {
        self.token_count() == 0
    }

    /// Reject documents without tokens, with inverted offsets or with
    /// negative (synthetic) token ids
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(KeywordError::invalid_document("document has no tokens"));
        }
        for (s, sentence) in self.sentences.iter().enumerate() {
            for (t, token) in sentence.tokens.iter().enumerate() {
                if token.end < token.start {
                    return Err(KeywordError::invalid_document(format!(
                        "token {t} of sentence {s} ends before it starts"
                    )));
                }
                if token.token_id.is_synthetic() {
                    return Err(KeywordError::invalid_document(format!(
                        "token {t} of sentence {s} has negative id {}",
                        token.token_id
                    )));
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Keyword results
// ============================================================================

/// A keyword or keyphrase extracted from one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    /// Lowercased phrase, the key of the result map
    pub normalized_text: String,
    /// Raw phrase text of the first registration
    pub original_text: String,
    /// Registrations whose raw text equals `original_text`
    pub exact_match_count: usize,
    /// All registrations of this normalized text
    pub total_count: usize,
    /// Summed rank of the phrase's constituent terms
    pub relevance: f64,
    /// Summed term frequency of the constituents
    pub tf: f64,
    /// Summed inverse document frequency of the constituents
    pub idf: f64,
    /// Constituents that were among the top-ranked terms
    pub top_rated_count: usize,
}

impl Keyword {
    /// Create a keyword from its first registration
    pub fn new(raw: &str, relevance: f64, tf: f64, idf: f64, top_rated_count: usize) -> Self {
        Self {
            normalized_text: normalize_keyword(raw),
            original_text: raw.to_string(),
            exact_match_count: 1,
            total_count: 1,
            relevance,
            tf,
            idf,
            top_rated_count,
        }
    }

    /// Record a further registration of the same normalized text
    pub fn record_occurrence(&mut self, raw: &str, relevance: f64, top_rated_count: usize) {
        self.total_count += 1;
        if raw == self.original_text {
            self.exact_match_count += 1;
        }
        self.relevance = self.relevance.max(relevance);
        self.top_rated_count = self.top_rated_count.max(top_rated_count);
    }

    /// Term-distinctiveness weight used by the result cleaner
    pub fn tf_idf(&self) -> f64 {
        self.tf * self.idf
    }

    /// Number of whitespace-separated words
    pub fn word_count(&self) -> usize {
        self.normalized_text.split_whitespace().count()
    }
}

/// Keywords of one evaluation run, keyed by normalized text
pub type KeywordMap = FxHashMap<String, Keyword>;

/// Keywords sorted by relevance descending, ties by text
pub fn ranked_keywords(keywords: &KeywordMap) -> Vec<&Keyword> {
    let mut ranked: Vec<&Keyword> = keywords.values().collect();
    ranked.sort_by(|a, b| {
        b.relevance
            .total_cmp(&a.relevance)
            .then_with(|| a.normalized_text.cmp(&b.normalized_text))
    });
    ranked
}

/// Normalize phrase text into a result-map key
pub fn normalize_keyword(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

// ============================================================================
// Stopword tiers
// ============================================================================

/// Built-in stopword list sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopwordTier {
    /// Classic short English list
    #[default]
    Small,
    /// Small plus auxiliaries, pronouns and frequent adverbs
    Medium,
    /// Medium plus the full English list of the `stop-words` crate
    Large,
}

impl std::str::FromStr for StopwordTier {
    type Err = KeywordError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "small" => Ok(StopwordTier::Small),
            "medium" => Ok(StopwordTier::Medium),
            "large" => Ok(StopwordTier::Large),
            other => Err(KeywordError::invalid_config(format!(
                "unknown stopword tier {other:?} (expected small, medium or large)"
            ))),
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

fn default_admitted_pos() -> Vec<String> {
    ["NN", "NNS", "NNP", "NNPS", "JJ", "JJR", "JJS"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_forbidden_pos() -> Vec<String> {
    [
        ",", ".", ":", "''", "``", "-LRB-", "-RRB-", "CC", "CD", "DT", "EX", "IN", "LS", "MD",
        "PDT", "POS", "PRP", "PRP$", "RP", "SYM", "TO", "UH", "WDT", "WP", "WP$", "WRB",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_forbidden_named_entities() -> Vec<String> {
    ["NUMBER", "ORDINAL", "PERCENT", "DATE", "DURATION", "TIME", "MONEY"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Configuration for keyword extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordConfig {
    /// Damping factor of the random walk, exclusive range (0, 1)
    pub damping: f64,
    /// Hard upper bound on rank iterations
    pub max_iterations: usize,
    /// Stop when the largest per-node change is at most this (0 = never)
    pub convergence_threshold: f64,
    /// Share of top-ranked terms treated as core vocabulary, range (0, 1]
    pub top_fraction: f64,
    /// Skip-window size for co-occurrence edges
    pub window_size: usize,
    /// Never link terms across sentence boundaries
    pub respect_sentences: bool,
    /// Keep edges one-directional as discovered
    pub directions_matter: bool,
    /// Source edges from dependency relations instead of the skip-window
    pub use_dependencies: bool,
    /// Split multi-word named entities into interconnected sub-terms
    pub expand_named_entities: bool,
    /// Run the result cleaner on the assembled keywords
    pub clean_keywords: bool,
    /// Built-in stopword list
    pub stopword_tier: StopwordTier,
    /// Additional stopwords (extend the tier)
    pub custom_stopwords: Vec<String>,
    /// When non-empty, a term must carry at least one of these POS tags
    pub admitted_pos: Vec<String>,
    /// A term carrying any of these POS tags is rejected
    pub forbidden_pos: Vec<String>,
    /// A term carrying any of these entity labels is rejected
    pub forbidden_named_entities: Vec<String>,
    /// Dependency relation types used for edges (empty = all)
    pub admitted_dependency_types: Vec<String>,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            max_iterations: 30,
            convergence_threshold: 0.0001,
            top_fraction: 1.0 / 3.0,
            window_size: 2,
            respect_sentences: false,
            directions_matter: false,
            use_dependencies: false,
            expand_named_entities: false,
            clean_keywords: true,
            stopword_tier: StopwordTier::Small,
            custom_stopwords: Vec::new(),
            admitted_pos: default_admitted_pos(),
            forbidden_pos: default_forbidden_pos(),
            forbidden_named_entities: default_forbidden_named_entities(),
            admitted_dependency_types: Vec::new(),
        }
    }
}

impl KeywordConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a (possibly partial) JSON config; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: KeywordConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.rank_options().validate()?;

        if self.window_size == 0 {
            return Err(KeywordError::invalid_config("window_size must be >= 1"));
        }

        if !(self.top_fraction > 0.0 && self.top_fraction <= 1.0) {
            return Err(KeywordError::invalid_config(format!(
                "top_fraction must be in (0, 1], got {}",
                self.top_fraction
            )));
        }

        Ok(())
    }

    /// Options consumed by the graph builder
    pub fn graph_options(&self) -> GraphOptions {
        GraphOptions {
            respect_sentences: self.respect_sentences,
            window_size: self.window_size,
            directions_matter: self.directions_matter,
            admitted_pos: self.admitted_pos.iter().cloned().collect(),
            forbidden_pos: self.forbidden_pos.iter().cloned().collect(),
            forbidden_named_entities: self.forbidden_named_entities.iter().cloned().collect(),
            use_dependencies: self.use_dependencies,
            admitted_dependency_types: self.admitted_dependency_types.iter().cloned().collect(),
            expand_named_entities: self.expand_named_entities,
        }
    }

    /// Options consumed by the rank engine
    pub fn rank_options(&self) -> RankOptions {
        RankOptions {
            damping: self.damping,
            max_iterations: self.max_iterations,
            threshold: self.convergence_threshold,
        }
    }

    /// Builder method: set damping factor
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    /// Builder method: set max iterations
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Builder method: set convergence threshold
    pub fn with_convergence_threshold(mut self, threshold: f64) -> Self {
        self.convergence_threshold = threshold;
        self
    }

    /// Builder method: set top fraction
    pub fn with_top_fraction(mut self, top_fraction: f64) -> Self {
        self.top_fraction = top_fraction;
        self
    }

    /// Builder method: set window size
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    pub fn with_respect_sentences(mut self, respect: bool) -> Self {
        self.respect_sentences = respect;
        self
    }

    pub fn with_directions_matter(mut self, directions_matter: bool) -> Self {
        self.directions_matter = directions_matter;
        self
    }

    pub fn with_dependencies(mut self, use_dependencies: bool) -> Self {
        self.use_dependencies = use_dependencies;
        self
    }

    pub fn with_named_entity_expansion(mut self, expand: bool) -> Self {
        self.expand_named_entities = expand;
        self
    }

    pub fn with_cleaning(mut self, clean: bool) -> Self {
        self.clean_keywords = clean;
        self
    }

    /// Builder method: set stopword tier
    pub fn with_stopword_tier(mut self, tier: StopwordTier) -> Self {
        self.stopword_tier = tier;
        self
    }

    /// Builder method: add custom stopwords
    pub fn with_custom_stopwords(mut self, words: &[&str]) -> Self {
        self.custom_stopwords
            .extend(words.iter().map(|w| w.to_string()));
        self
    }

    /// Builder method: replace the admitted POS list (empty admits all)
    pub fn with_admitted_pos(mut self, tags: &[&str]) -> Self {
        self.admitted_pos = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Builder method: replace the forbidden POS list
    pub fn with_forbidden_pos(mut self, tags: &[&str]) -> Self {
        self.forbidden_pos = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Builder method: replace the forbidden named-entity list
    pub fn with_forbidden_named_entities(mut self, labels: &[&str]) -> Self {
        self.forbidden_named_entities = labels.iter().map(|l| l.to_string()).collect();
        self
    }

    /// Builder method: restrict dependency relation types used for edges
    pub fn with_admitted_dependency_types(mut self, kinds: &[&str]) -> Self {
        self.admitted_dependency_types = kinds.iter().map(|k| k.to_string()).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = KeywordConfig::default();
        assert!((config.damping - 0.85).abs() < 1e-12);
        assert_eq!(config.max_iterations, 30);
        assert!((config.convergence_threshold - 0.0001).abs() < 1e-12);
        assert!((config.top_fraction - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(config.stopword_tier, StopwordTier::Small);
        assert!(config.clean_keywords);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        assert!(KeywordConfig::default().with_damping(1.0).validate().is_err());
        assert!(KeywordConfig::default().with_damping(0.0).validate().is_err());
        assert!(KeywordConfig::default().with_damping(1.5).validate().is_err());
        assert!(KeywordConfig::default().with_window_size(0).validate().is_err());
        assert!(KeywordConfig::default().with_top_fraction(0.0).validate().is_err());
        assert!(KeywordConfig::default().with_top_fraction(1.2).validate().is_err());
        assert!(KeywordConfig::default()
            .with_convergence_threshold(-1.0)
            .validate()
            .is_err());

        // Zero threshold only disables early stopping
        assert!(KeywordConfig::default()
            .with_convergence_threshold(0.0)
            .validate()
            .is_ok());
        assert!(KeywordConfig::default().with_top_fraction(1.0).validate().is_ok());
    }

    #[test]
    fn test_config_from_partial_json() {
        let config = KeywordConfig::from_json(
            r#"{"damping": 0.5, "stopword_tier": "large", "respect_sentences": true}"#,
        )
        .unwrap();
        assert!((config.damping - 0.5).abs() < 1e-12);
        assert_eq!(config.stopword_tier, StopwordTier::Large);
        assert!(config.respect_sentences);
        assert_eq!(config.max_iterations, 30);
    }

    #[test]
    fn test_config_from_json_rejects_invalid() {
        let err = KeywordConfig::from_json(r#"{"damping": 2.0}"#).unwrap_err();
        assert!(matches!(err, KeywordError::InvalidConfig { .. }));

        let err = KeywordConfig::from_json("not json").unwrap_err();
        assert!(matches!(err, KeywordError::Json { .. }));
    }

    #[test]
    fn test_stopword_tier_parse() {
        assert_eq!("Medium".parse::<StopwordTier>().unwrap(), StopwordTier::Medium);
        assert!("huge".parse::<StopwordTier>().is_err());
    }

    #[test]
    fn test_token_occurrence_helpers() {
        let entity = TokenOccurrence::new(7, "Bank of America", 0, 15).with_named_entity("ORGANIZATION");
        assert!(entity.is_named_entity());
        assert!(entity.is_multi_word());

        let word = TokenOccurrence::new(8, "bank", 0, 4).with_pos("NN");
        assert!(!word.is_named_entity());
        assert!(!word.is_multi_word());
        assert!(word.parts_of_speech.contains("NN"));
        assert!(TokenId(-3).is_synthetic());
        assert!(!word.token_id.is_synthetic());
    }

    #[test]
    fn test_keyword_record_occurrence() {
        let mut kw = Keyword::new("Machine Learning", 0.2, 2.0, 1.5, 1);
        assert_eq!(kw.normalized_text, "machine learning");
        assert_eq!(kw.word_count(), 2);
        assert!((kw.tf_idf() - 3.0).abs() < 1e-12);

        kw.record_occurrence("Machine Learning", 0.1, 1);
        kw.record_occurrence("machine learning", 0.4, 2);
        assert_eq!(kw.total_count, 3);
        assert_eq!(kw.exact_match_count, 2);
        assert!((kw.relevance - 0.4).abs() < 1e-12);
        assert_eq!(kw.top_rated_count, 2);
    }

    #[test]
    fn test_normalize_keyword() {
        assert_eq!(normalize_keyword("  General   Purpose Computer "), "general purpose computer");
    }

    #[test]
    fn test_document_token_count() {
        let doc = Document::new(vec![
            Sentence::new(0, vec![TokenOccurrence::new(1, "alpha", 0, 5)]),
            Sentence::new(1, vec![]),
        ]);
        assert_eq!(doc.token_count(), 1);
        assert!(!doc.is_empty());
        assert!(Document::default().is_empty());
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_document_validation() {
        let err = Document::default().validate().unwrap_err();
        assert!(matches!(err, KeywordError::InvalidDocument { .. }));
        assert!(err.is_recoverable());

        let inverted = Document::new(vec![Sentence::new(0, vec![TokenOccurrence::new(1, "alpha", 5, 0)])]);
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn test_negative_ids_rejected() {
        let doc = Document::new(vec![Sentence::new(
            0,
            vec![
                TokenOccurrence::new(-1, "river", 0, 5),
                TokenOccurrence::new(7, "Acme Holding", 6, 18).with_named_entity("ORGANIZATION"),
            ],
        )]);
        let err = doc.validate().unwrap_err();
        assert!(matches!(err, KeywordError::InvalidDocument { .. }));
        assert!(err.to_string().contains("negative id -1"));
    }
}
