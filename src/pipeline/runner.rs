//! Keyword extraction pipeline
//!
//! Graph Builder -> Rank Engine -> Phrase Assembler -> Result Cleaner, one
//! document at a time. Every run owns its graph, rank map and candidate
//! queue; only the configuration and the collaborators are shared, so
//! documents can be evaluated in parallel.

use super::artifacts::{Evaluation, EvaluationStats};
use crate::errors::Result;
use crate::graph::builder::GraphBuilder;
use crate::nlp::idf::{IdfSource, UniformIdf};
use crate::nlp::stopwords::StopwordFilter;
use crate::nlp::tokenizer::{Retokenizer, SimpleRetokenizer};
use crate::pagerank::standard::RankEngine;
use crate::pagerank::{RankOptions, RankResult, WeightedGraph};
use crate::phrase::assembler::PhraseAssembler;
use crate::phrase::cleaner::ResultCleaner;
use crate::types::{Document, KeywordConfig, KeywordMap, TokenId};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tracing::debug;

pub const STAGE_GRAPH: &str = "graph";
pub const STAGE_RANK: &str = "rank";
pub const STAGE_PHRASES: &str = "phrases";
pub const STAGE_CLEAN: &str = "clean";

/// Enter a tracing span for a pipeline stage until the end of the block
macro_rules! trace_stage {
    ($name:expr) => {
        let _span = tracing::info_span!("keyword_stage", stage = $name).entered();
    };
}

/// Extracts keywords from annotated documents
pub struct KeywordExtractor {
    config: KeywordConfig,
    stopwords: StopwordFilter,
    retokenizer: Box<dyn Retokenizer + Send + Sync>,
    idf: Box<dyn IdfSource + Send + Sync>,
    cleaner: ResultCleaner,
}

impl std::fmt::Debug for KeywordExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeywordExtractor")
            .field("config", &self.config)
            .field("stopwords", &self.stopwords.len())
            .finish_non_exhaustive()
    }
}

impl KeywordExtractor {
    /// Create an extractor; fails on an invalid configuration
    pub fn new(config: KeywordConfig) -> Result<Self> {
        config.validate()?;

        let mut stopwords = StopwordFilter::new(config.stopword_tier);
        stopwords.add_stopwords(&config.custom_stopwords);

        Ok(Self {
            config,
            stopwords,
            retokenizer: Box::new(SimpleRetokenizer::new()),
            idf: Box::new(UniformIdf),
            cleaner: ResultCleaner::new(),
        })
    }

    /// Builder method: set the re-tokenization collaborator
    pub fn with_retokenizer<R: Retokenizer + Send + Sync + 'static>(mut self, retokenizer: R) -> Self {
        self.retokenizer = Box::new(retokenizer);
        self
    }

    /// Builder method: set the idf source
    pub fn with_idf_source<I: IdfSource + Send + Sync + 'static>(mut self, idf: I) -> Self {
        self.idf = Box::new(idf);
        self
    }

    /// Builder method: set the result cleaner
    pub fn with_cleaner(mut self, cleaner: ResultCleaner) -> Self {
        self.cleaner = cleaner;
        self
    }

    pub fn config(&self) -> &KeywordConfig {
        &self.config
    }

    pub fn stopwords(&self) -> &StopwordFilter {
        &self.stopwords
    }

    /// Extract the keywords of one document
    ///
    /// Empty or malformed documents yield an empty evaluation.
    pub fn evaluate(&self, document: &Document) -> Evaluation {
        let mut keywords = KeywordMap::default();
        let stats = self.evaluate_into(document, &mut keywords);
        Evaluation { keywords, stats }
    }

    /// Extract keywords into a caller-owned map
    ///
    /// Registrations add to the counts already in `keywords`; the cleaner
    /// then runs over the whole map.
    pub fn evaluate_into(&self, document: &Document, keywords: &mut KeywordMap) -> EvaluationStats {
        if let Err(err) = document.validate() {
            debug!(document = ?document.id, error = %err, "document skipped");
            return EvaluationStats::default();
        }

        let doc_graph = {
            trace_stage!(STAGE_GRAPH);
            GraphBuilder::new(self.config.graph_options(), &self.stopwords)
                .with_retokenizer(self.retokenizer.as_ref())
                .build_document(document)
        };

        let ranked = {
            trace_stage!(STAGE_RANK);
            let result = RankEngine::new(self.config.rank_options()).rank(&doc_graph.graph, None);
            debug!(
                iterations = result.iterations,
                delta = result.delta,
                converged = result.converged,
                "ranking finished"
            );
            result
        };

        let registered = {
            trace_stage!(STAGE_PHRASES);
            PhraseAssembler::new(self.config.top_fraction, self.config.use_dependencies)
                .with_idf_source(self.idf.as_ref())
                .assemble_into(&ranked.ranks, &doc_graph, keywords)
        };

        let removed = if self.config.clean_keywords {
            trace_stage!(STAGE_CLEAN);
            // Sized before subsumption; the cleaner cuts what remains after it
            let keep = (keywords.len() as f64 * self.config.top_fraction).ceil() as usize;
            self.cleaner
                .clean(keywords, keep, self.config.use_dependencies)
        } else {
            0
        };

        let stats = EvaluationStats {
            node_count: doc_graph.graph.node_count(),
            edge_count: doc_graph.graph.edge_count(),
            iterations: ranked.iterations,
            converged: ranked.converged,
            registered,
            removed,
        };

        debug!(
            document = ?document.id,
            nodes = stats.node_count,
            edges = stats.edge_count,
            registered,
            removed,
            keywords = keywords.len(),
            "document evaluated"
        );

        stats
    }

    /// Evaluate many documents in parallel, results in input order
    pub fn evaluate_batch(&self, documents: &[Document]) -> Vec<Evaluation> {
        documents.par_iter().map(|doc| self.evaluate(doc)).collect()
    }
}

/// Rank a graph that was not built from a document
///
/// `node_weights` selects the participating nodes (all graph nodes when
/// `None`).
pub fn rank_graph<G: WeightedGraph + ?Sized>(
    graph: &G,
    node_weights: Option<&FxHashMap<TokenId, f64>>,
    options: &RankOptions,
) -> Result<RankResult> {
    options.validate()?;
    Ok(RankEngine::new(*options).rank(graph, node_weights))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::KeywordError;
    use crate::graph::cooccurrence::CoOccurrenceGraph;
    use crate::types::{Sentence, TokenOccurrence};

    fn tok(id: i64, value: &str, start: usize) -> TokenOccurrence {
        TokenOccurrence::new(id, value, start, start + value.len())
    }

    fn document() -> Document {
        Document::new(vec![
            Sentence::new(
                0,
                vec![
                    tok(1, "machine", 0),
                    tok(2, "learning", 8),
                    tok(3, "improves", 17),
                    tok(4, "search", 26),
                    tok(5, "ranking", 33),
                ],
            ),
            Sentence::new(
                1,
                vec![
                    tok(1, "machine", 42),
                    tok(2, "learning", 50),
                    tok(6, "needs", 59),
                    tok(7, "data", 65),
                ],
            ),
        ])
        .with_id("doc-1")
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = KeywordExtractor::new(KeywordConfig::default().with_damping(1.0)).unwrap_err();
        assert!(matches!(err, KeywordError::InvalidConfig { .. }));
    }

    #[test]
    fn test_evaluate_produces_keywords() {
        let extractor = KeywordExtractor::new(KeywordConfig::default()).unwrap();
        let evaluation = extractor.evaluate(&document());

        assert!(!evaluation.is_empty());
        assert_eq!(evaluation.stats.node_count, 7);
        assert!(evaluation.stats.iterations > 0);
        assert!(evaluation.stats.iterations <= 30);
        assert!(evaluation.stats.registered > 0);
    }

    #[test]
    fn test_empty_document() {
        let extractor = KeywordExtractor::new(KeywordConfig::default()).unwrap();
        let evaluation = extractor.evaluate(&Document::default());
        assert!(evaluation.is_empty());
        assert_eq!(evaluation.stats, EvaluationStats::default());
    }

    #[test]
    fn test_malformed_document_is_skipped() {
        let extractor = KeywordExtractor::new(KeywordConfig::default()).unwrap();
        let bad = Document::new(vec![Sentence::new(
            0,
            vec![tok(1, "machine", 0), TokenOccurrence::new(2, "learning", 20, 8)],
        )]);
        assert!(extractor.evaluate(&bad).is_empty());
    }

    #[test]
    fn test_custom_stopwords_applied() {
        let config = KeywordConfig::default().with_custom_stopwords(&["machine"]);
        let extractor = KeywordExtractor::new(config).unwrap();
        assert!(extractor.stopwords().is_stopword("Machine"));

        let evaluation = extractor.evaluate(&document());
        assert!(evaluation.keywords.keys().all(|k| !k.contains("machine")));
    }

    #[test]
    fn test_batch_matches_sequential() {
        let extractor = KeywordExtractor::new(KeywordConfig::default()).unwrap();
        let docs = vec![document(), Document::default(), document()];

        let batch = extractor.evaluate_batch(&docs);
        assert_eq!(batch.len(), 3);
        assert!(batch[1].is_empty());
        for (evaluation, doc) in batch.iter().zip(&docs) {
            assert_eq!(evaluation.keywords, extractor.evaluate(doc).keywords);
        }
    }

    #[test]
    fn test_rank_graph_validates_options() {
        let mut graph = CoOccurrenceGraph::new();
        graph.add_edge(TokenId(1), TokenId(2), 0, 1, 1.0);

        let bad = RankOptions {
            damping: 0.0,
            ..RankOptions::default()
        };
        assert!(rank_graph(&graph, None, &bad).is_err());

        let result = rank_graph(&graph, None, &RankOptions::default()).unwrap();
        assert!(result.ranks.score(TokenId(2)) > result.ranks.score(TokenId(1)));
    }
}
