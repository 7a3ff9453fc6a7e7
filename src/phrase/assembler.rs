//! Phrase assembly
//!
//! Walks the ranked occurrences in document order and greedily fuses runs
//! of linked occurrences into keyphrases:
//!
//! 1. The top `top_fraction` of ranked terms form the core vocabulary.
//! 2. A seed must be core (dependency mode), or core or related to a core
//!    term (otherwise).
//! 3. The next queued occurrence extends the phrase when it is the very
//!    next occurrence of the text (nothing filtered in between), the graph
//!    links the tail to it at exactly these two positions and it is eligible
//!    itself; dependency mode also needs a confirmed relation.
//! 4. Phrases containing at least one core term are registered.
//! 5. Expanded named entities with a core word are registered under their
//!    full text.

use super::candidate::KeywordCandidate;
use crate::graph::builder::DocumentGraph;
use crate::graph::cooccurrence::CoOccurrenceGraph;
use crate::nlp::idf::{IdfSource, UniformIdf};
use crate::pagerank::RankMap;
use crate::types::{normalize_keyword, Keyword, KeywordMap, TokenId, TokenOccurrence};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use tracing::trace;

/// Core vocabulary: the `floor(len * fraction)` best-ranked terms
///
/// Ties keep the rank map's node order.
pub fn top_rated(ranks: &RankMap, fraction: f64) -> FxHashSet<TokenId> {
    let count = (ranks.len() as f64 * fraction + 1e-9).floor() as usize;
    ranks.top_n(count).into_iter().map(|(id, _)| id).collect()
}

/// A phrase being grown from a seed
#[derive(Debug, Clone)]
struct PhraseBuilder {
    text: String,
    relevance: f64,
    tf: f64,
    idf: f64,
    top_rated_count: usize,
    related: FxHashSet<TokenId>,
    tail: KeywordCandidate,
}

impl PhraseBuilder {
    fn seed(candidate: KeywordCandidate, top: &FxHashSet<TokenId>) -> Self {
        Self {
            text: candidate.raw_value.clone(),
            relevance: candidate.relevance,
            tf: candidate.tf,
            idf: candidate.idf,
            top_rated_count: usize::from(candidate.is_top_rated(top)),
            related: candidate.related_tag_ids.clone(),
            tail: candidate,
        }
    }

    fn fuse(&mut self, candidate: KeywordCandidate, top: &FxHashSet<TokenId>) {
        self.text.push(' ');
        self.text.push_str(&candidate.raw_value);
        self.relevance += candidate.relevance;
        self.tf += candidate.tf;
        self.idf += candidate.idf;
        self.top_rated_count += usize::from(candidate.is_top_rated(top));
        self.related.extend(candidate.related_tag_ids.iter().copied());
        self.tail = candidate;
    }

    /// Whether dependencies tie `next` to the phrase
    fn confirms_relation(&self, next: &KeywordCandidate) -> bool {
        self.tail.related_tag_ids.contains(&next.tag_id)
            || next.related_tag_ids.contains(&self.tail.tag_id)
            || self
                .related
                .iter()
                .any(|t| next.related_tag_ids.contains(t))
    }
}

/// Greedy phrase assembler
pub struct PhraseAssembler<'a> {
    top_fraction: f64,
    use_dependency_mode: bool,
    idf: &'a dyn IdfSource,
}

impl<'a> PhraseAssembler<'a> {
    /// Create an assembler with uniform idf
    pub fn new(top_fraction: f64, use_dependency_mode: bool) -> Self {
        Self {
            top_fraction,
            use_dependency_mode,
            idf: &UniformIdf,
        }
    }

    /// Builder method: set the idf source
    pub fn with_idf_source(mut self, idf: &'a dyn IdfSource) -> Self {
        self.idf = idf;
        self
    }

    /// Assemble the keywords of one document into a fresh map
    pub fn assemble(&self, ranks: &RankMap, document: &DocumentGraph) -> KeywordMap {
        let mut keywords = KeywordMap::default();
        self.assemble_into(ranks, document, &mut keywords);
        keywords
    }

    /// Assemble into an existing map, adding to the counts already there
    ///
    /// Returns the number of registrations.
    pub fn assemble_into(
        &self,
        ranks: &RankMap,
        document: &DocumentGraph,
        keywords: &mut KeywordMap,
    ) -> usize {
        if ranks.is_empty() {
            return 0;
        }

        let top = top_rated(ranks, self.top_fraction);
        let mut queue = self.candidates(ranks, document);
        let mut registered = 0;

        while let Some(seed) = queue.pop_front() {
            let seeds = if self.use_dependency_mode {
                seed.is_top_rated(&top)
            } else {
                seed.is_eligible(&top)
            };
            if !seeds {
                continue;
            }

            let mut phrase = PhraseBuilder::seed(seed, &top);
            while let Some(next) = queue.front() {
                if !self.extends(&phrase, next, &document.graph, &top) {
                    break;
                }
                if let Some(next) = queue.pop_front() {
                    phrase.fuse(next, &top);
                }
            }

            if phrase.top_rated_count > 0 {
                trace!(phrase = %phrase.text, relevance = phrase.relevance, "phrase assembled");
                register(
                    keywords,
                    &phrase.text,
                    phrase.relevance,
                    phrase.tf,
                    phrase.idf,
                    phrase.top_rated_count,
                );
                registered += 1;
            }
        }

        registered + self.register_entities(ranks, document, &top, keywords)
    }

    /// Ranked, admitted occurrences in document order
    fn candidates(&self, ranks: &RankMap, document: &DocumentGraph) -> VecDeque<KeywordCandidate> {
        let frequencies = document.term_frequencies();

        document
            .occurrences
            .iter()
            .enumerate()
            .filter(|(_, occ)| occ.admitted)
            .filter_map(|(idx, occ)| {
                let id = occ.occurrence.token_id;
                let relevance = ranks.get(id)?;
                let tf = frequencies.get(&id).copied().unwrap_or(0) as f64;
                let idf = self.idf.idf(&occ.occurrence);
                Some(KeywordCandidate::from_occurrence(idx, occ, relevance, tf, idf))
            })
            .collect()
    }

    fn extends(
        &self,
        phrase: &PhraseBuilder,
        next: &KeywordCandidate,
        graph: &CoOccurrenceGraph,
        top: &FxHashSet<TokenId>,
    ) -> bool {
        let tail = &phrase.tail;
        if !tail.is_followed_by(next) {
            return false;
        }
        let linked = graph
            .edge(tail.tag_id, next.tag_id)
            .is_some_and(|edge| edge.has_position(tail.start_position, next.start_position));

        linked
            && next.is_eligible(top)
            && (!self.use_dependency_mode || phrase.confirms_relation(next))
    }

    /// Register each expanded entity once when one of its words is core
    fn register_entities(
        &self,
        ranks: &RankMap,
        document: &DocumentGraph,
        top: &FxHashSet<TokenId>,
        keywords: &mut KeywordMap,
    ) -> usize {
        let mut registered = 0;

        for (idx, entity) in document.expansions.iter().enumerate() {
            let top_words = entity.sub_tokens.iter().filter(|&t| top.contains(t)).count();
            if top_words == 0 {
                continue;
            }

            let relevance = entity
                .sub_tokens
                .iter()
                .map(|&t| ranks.score(t))
                .fold(0.0, f64::max);
            let words = document
                .occurrences
                .iter()
                .filter(|o| o.entity == Some(idx))
                .count();
            let tf = (words / entity.sub_tokens.len().max(1)) as f64;
            let idf = self.idf.idf(&TokenOccurrence::new(
                entity.entity_id,
                entity.text.as_str(),
                0,
                entity.text.len(),
            ));

            trace!(entity = %entity.text, relevance, "named entity registered");
            register(keywords, &entity.text, relevance, tf, idf, top_words);
            registered += 1;
        }

        registered
    }
}

/// Insert a new keyword or add to the one already stored under its key
fn register(
    keywords: &mut KeywordMap,
    text: &str,
    relevance: f64,
    tf: f64,
    idf: f64,
    top_rated_count: usize,
) {
    keywords
        .entry(normalize_keyword(text))
        .and_modify(|kw| kw.record_occurrence(text, relevance, top_rated_count))
        .or_insert_with(|| Keyword::new(text, relevance, tf, idf, top_rated_count));
}
