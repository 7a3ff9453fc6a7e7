//! Co-occurrence graph construction
//!
//! Turns the annotated sentences of a document into a [`CoOccurrenceGraph`].
//! Two edge sources exist:
//!
//! - **Skip-window** (default): consecutive admissible terms are linked; up
//!   to `window_size - 1` inadmissible terms (stopwords, short words,
//!   forbidden POS or entity labels) may sit between them.
//! - **Dependencies**: edges come from the annotator's dependency relations,
//!   without filtering or windowing.
//!
//! Optionally, multi-word named entities are split into their words first
//! (see [`EntityExpander`]); those words are fully interconnected and take
//! the entity's place in the token stream.

use super::cooccurrence::CoOccurrenceGraph;
use super::expansion::{EntityExpander, ExpandedEntity};
use crate::nlp::stopwords::StopwordFilter;
use crate::nlp::tokenizer::Retokenizer;
use crate::types::{Document, TokenId, TokenOccurrence};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

/// Options consumed by the graph builder
#[derive(Debug, Clone, PartialEq)]
pub struct GraphOptions {
    /// Never link terms across sentence boundaries
    pub respect_sentences: bool,
    /// Skip-window size (>= 1)
    pub window_size: usize,
    /// Keep edges one-directional as discovered
    pub directions_matter: bool,
    /// When non-empty, a term must carry at least one of these POS tags
    pub admitted_pos: FxHashSet<String>,
    pub forbidden_pos: FxHashSet<String>,
    pub forbidden_named_entities: FxHashSet<String>,
    /// Source edges from dependency relations instead of the skip-window
    pub use_dependencies: bool,
    /// Dependency relation types that produce edges (empty = all)
    pub admitted_dependency_types: FxHashSet<String>,
    /// Split multi-word named entities into interconnected sub-terms
    pub expand_named_entities: bool,
}

impl Default for GraphOptions {
    fn default() -> Self {
        crate::types::KeywordConfig::default().graph_options()
    }
}

/// One token occurrence of the (expanded) document
#[derive(Debug, Clone)]
pub struct DocumentOccurrence {
    pub occurrence: TokenOccurrence,
    /// Index of the sentence it belongs to
    pub sentence: usize,
    /// Passed the admission filters (always true in dependency mode)
    pub admitted: bool,
    /// Terms sharing a dependency relation with this one
    pub related: FxHashSet<TokenId>,
    /// Index into [`DocumentGraph::expansions`] for entity sub-terms
    pub entity: Option<usize>,
}

/// Everything graph construction learned about a document
#[derive(Debug, Clone, Default)]
pub struct DocumentGraph {
    pub graph: CoOccurrenceGraph,
    /// All occurrences in document order, entities replaced by their words
    pub occurrences: Vec<DocumentOccurrence>,
    /// Distinct entities that were expanded
    pub expansions: Vec<ExpandedEntity>,
}

impl DocumentGraph {
    /// Number of occurrences per term, the term frequency used for tf-idf
    pub fn term_frequencies(&self) -> FxHashMap<TokenId, usize> {
        self.occurrences
            .iter()
            .fold(FxHashMap::default(), |mut counts, occ| {
                *counts.entry(occ.occurrence.token_id).or_insert(0) += 1;
                counts
            })
    }
}

/// Position of the skip-window scan within a token stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WindowState {
    /// No pending source term
    Seeking,
    /// `source` is the last admitted occurrence; `skipped` inadmissible
    /// occurrences followed it
    Extending { source: usize, skipped: usize },
    /// A sentence boundary closed the stream
    Closed,
}

impl WindowState {
    /// Advance past an inadmissible occurrence
    fn skip(self, window_size: usize) -> Self {
        match self {
            WindowState::Extending { source, skipped } if skipped + 1 < window_size => {
                WindowState::Extending {
                    source,
                    skipped: skipped + 1,
                }
            }
            WindowState::Extending { .. } => WindowState::Seeking,
            other => other,
        }
    }

    /// Pending source still within reach, if any
    fn source(self) -> Option<usize> {
        match self {
            WindowState::Extending { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Builds co-occurrence graphs for documents
pub struct GraphBuilder<'a> {
    options: GraphOptions,
    stopwords: &'a StopwordFilter,
    retokenizer: Option<&'a dyn Retokenizer>,
}

impl<'a> GraphBuilder<'a> {
    /// Create a builder; named-entity expansion needs [`Self::with_retokenizer`]
    pub fn new(options: GraphOptions, stopwords: &'a StopwordFilter) -> Self {
        Self {
            options,
            stopwords,
            retokenizer: None,
        }
    }

    /// Builder method: set the re-tokenization collaborator
    pub fn with_retokenizer(mut self, retokenizer: &'a dyn Retokenizer) -> Self {
        self.retokenizer = Some(retokenizer);
        self
    }

    /// Build the co-occurrence graph of a document
    ///
    /// An empty document yields an empty graph.
    pub fn build(&self, document: &Document) -> CoOccurrenceGraph {
        self.build_document(document).graph
    }

    /// Build the graph together with the expanded occurrence stream
    pub fn build_document(&self, document: &Document) -> DocumentGraph {
        if document.is_empty() {
            return DocumentGraph::default();
        }

        let mut doc_graph = self.expand_document(document);

        if self.options.use_dependencies {
            self.add_dependency_edges(document, &mut doc_graph);
        } else {
            self.add_window_edges(&mut doc_graph);
        }
        self.add_entity_edges(&mut doc_graph);

        debug!(
            nodes = doc_graph.graph.node_count(),
            edges = doc_graph.graph.edge_count(),
            occurrences = doc_graph.occurrences.len(),
            expansions = doc_graph.expansions.len(),
            "co-occurrence graph built"
        );

        doc_graph
    }

    /// Check a term against the length, stopword, POS and entity filters
    pub fn is_admissible(&self, token: &TokenOccurrence) -> bool {
        if token.value.chars().count() <= 2 {
            return false;
        }
        if self.stopwords.is_stopword(&token.value) {
            return false;
        }
        if !self.options.admitted_pos.is_empty()
            && !token.parts_of_speech.is_empty()
            && !token
                .parts_of_speech
                .iter()
                .any(|p| self.options.admitted_pos.contains(p))
        {
            return false;
        }
        if token
            .parts_of_speech
            .iter()
            .any(|p| self.options.forbidden_pos.contains(p))
        {
            return false;
        }
        !self.has_forbidden_entity(token)
    }

    fn has_forbidden_entity(&self, token: &TokenOccurrence) -> bool {
        token
            .named_entities
            .iter()
            .any(|ne| self.options.forbidden_named_entities.contains(ne))
    }

    fn admits_dependency(&self, kind: &str) -> bool {
        self.options.admitted_dependency_types.is_empty()
            || self.options.admitted_dependency_types.contains(kind)
    }

    fn should_expand(&self, token: &TokenOccurrence) -> bool {
        self.options.expand_named_entities
            && token.is_named_entity()
            && token.is_multi_word()
            && !self.has_forbidden_entity(token)
    }

    /// Flatten the document into occurrences, splicing in entity words
    fn expand_document(&self, document: &Document) -> DocumentGraph {
        let mut expander = self
            .retokenizer
            .filter(|_| self.options.expand_named_entities)
            .map(|r| EntityExpander::new(r, document));

        let mut occurrences = Vec::with_capacity(document.token_count());
        let mut expansions: Vec<ExpandedEntity> = Vec::new();
        let mut expansion_index: FxHashMap<TokenId, usize> = FxHashMap::default();

        for (sentence_idx, sentence) in document.sentences.iter().enumerate() {
            let sentence_start = occurrences.len();

            for token in &sentence.tokens {
                let words = match expander.as_mut() {
                    Some(expander) if self.should_expand(token) => expander.expand(token),
                    _ => None,
                };

                let Some(words) = words else {
                    occurrences.push(DocumentOccurrence {
                        admitted: self.options.use_dependencies || self.is_admissible(token),
                        occurrence: token.clone(),
                        sentence: sentence_idx,
                        related: FxHashSet::default(),
                        entity: None,
                    });
                    continue;
                };

                let entity_idx = *expansion_index.entry(token.token_id).or_insert_with(|| {
                    expansions.push(ExpandedEntity {
                        entity_id: token.token_id,
                        text: token.value.clone(),
                        sub_tokens: words.iter().map(|w| w.token_id).collect(),
                    });
                    expansions.len() - 1
                });

                for word in words {
                    occurrences.push(DocumentOccurrence {
                        admitted: self.options.use_dependencies || self.is_admissible(&word),
                        occurrence: word,
                        sentence: sentence_idx,
                        related: FxHashSet::default(),
                        entity: Some(entity_idx),
                    });
                }
            }

            self.assign_related(
                &sentence.dependencies,
                &mut occurrences[sentence_start..],
                &expansions,
                &expansion_index,
            );
        }

        DocumentGraph {
            graph: CoOccurrenceGraph::new(),
            occurrences,
            expansions,
        }
    }

    /// Fill `related` of one sentence's occurrences from its dependencies
    fn assign_related(
        &self,
        dependencies: &[crate::types::Dependency],
        sentence: &mut [DocumentOccurrence],
        expansions: &[ExpandedEntity],
        expansion_index: &FxHashMap<TokenId, usize>,
    ) {
        // An expanded entity stands for all of its words
        let resolve = |id: TokenId| -> Vec<TokenId> {
            match expansion_index.get(&id) {
                Some(&idx) => expansions[idx].sub_tokens.clone(),
                None => vec![id],
            }
        };

        let mut related: FxHashMap<TokenId, FxHashSet<TokenId>> = FxHashMap::default();
        for dep in dependencies.iter().filter(|d| self.admits_dependency(&d.kind)) {
            for governor in resolve(dep.governor) {
                for dependent in resolve(dep.dependent) {
                    if governor != dependent {
                        related.entry(governor).or_default().insert(dependent);
                        related.entry(dependent).or_default().insert(governor);
                    }
                }
            }
        }

        for occ in sentence.iter_mut() {
            if let Some(links) = related.get(&occ.occurrence.token_id) {
                occ.related.extend(links.iter().copied());
            }
            if let Some(entity) = occ.entity {
                let own = occ.occurrence.token_id;
                occ.related
                    .extend(expansions[entity].sub_tokens.iter().filter(|&&t| t != own));
            }
        }
    }

    fn insert_edge(&self, graph: &mut CoOccurrenceGraph, from: &TokenOccurrence, to: &TokenOccurrence) {
        if graph.add_edge(from.token_id, to.token_id, from.start, to.start, 1.0)
            && !self.options.directions_matter
        {
            graph.add_edge(to.token_id, from.token_id, to.start, from.start, 1.0);
        }
    }

    /// Skip-window pass over the occurrence stream
    fn add_window_edges(&self, doc_graph: &mut DocumentGraph) {
        let window_size = self.options.window_size.max(1);
        let occurrences = &doc_graph.occurrences;
        let graph = &mut doc_graph.graph;
        let mut state = WindowState::Seeking;

        for (idx, occ) in occurrences.iter().enumerate() {
            let sentence_changed = idx > 0 && occurrences[idx - 1].sentence != occ.sentence;
            if sentence_changed && self.options.respect_sentences {
                state = WindowState::Closed;
            }

            if !occ.admitted {
                state = state.skip(window_size);
                continue;
            }

            if let Some(source) = state.source() {
                let pending = &occurrences[source];
                let same_entity = pending.entity.is_some()
                    && pending.entity == occ.entity
                    && pending.sentence == occ.sentence;
                if !same_entity {
                    self.insert_edge(graph, &pending.occurrence, &occ.occurrence);
                }
            }

            state = WindowState::Extending {
                source: idx,
                skipped: 0,
            };
        }
    }

    /// Dependency pass: one edge per admitted relation, earlier -> later
    fn add_dependency_edges(&self, document: &Document, doc_graph: &mut DocumentGraph) {
        let occurrences = &doc_graph.occurrences;
        let graph = &mut doc_graph.graph;

        for (sentence_idx, sentence) in document.sentences.iter().enumerate() {
            // First occurrence of each term in this sentence; an expanded
            // entity is represented by its last word (the head of the phrase)
            let mut first: FxHashMap<TokenId, usize> = FxHashMap::default();
            for (idx, occ) in occurrences
                .iter()
                .enumerate()
                .filter(|(_, o)| o.sentence == sentence_idx)
            {
                first.entry(occ.occurrence.token_id).or_insert(idx);
                if let Some(entity) = occ.entity {
                    first.insert(doc_graph.expansions[entity].entity_id, idx);
                }
            }

            for dep in sentence
                .dependencies
                .iter()
                .filter(|d| self.admits_dependency(&d.kind))
            {
                let (Some(&g), Some(&d)) = (first.get(&dep.governor), first.get(&dep.dependent))
                else {
                    continue;
                };
                let (from, to) = if occurrences[g].occurrence.start <= occurrences[d].occurrence.start {
                    (g, d)
                } else {
                    (d, g)
                };
                self.insert_edge(graph, &occurrences[from].occurrence, &occurrences[to].occurrence);
            }
        }
    }

    /// All-pairs edges between the admitted words of each expanded entity
    /// occurrence
    fn add_entity_edges(&self, doc_graph: &mut DocumentGraph) {
        let occurrences = &doc_graph.occurrences;
        let graph = &mut doc_graph.graph;

        let mut idx = 0;
        while idx < occurrences.len() {
            let Some(entity) = occurrences[idx].entity else {
                idx += 1;
                continue;
            };

            let run_start = idx;
            while idx < occurrences.len()
                && occurrences[idx].entity == Some(entity)
                && occurrences[idx].sentence == occurrences[run_start].sentence
            {
                idx += 1;
            }

            let words: Vec<&TokenOccurrence> = occurrences[run_start..idx]
                .iter()
                .filter(|o| o.admitted)
                .map(|o| &o.occurrence)
                .collect();
            for (i, from) in words.iter().enumerate() {
                for to in &words[i + 1..] {
                    self.insert_edge(graph, from, to);
                }
            }
        }
    }
}
