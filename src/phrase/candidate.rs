//! Phrase seeds
//!
//! One [`KeywordCandidate`] per ranked token occurrence, in document order.

use crate::graph::builder::DocumentOccurrence;
use crate::types::TokenId;
use rustc_hash::FxHashSet;

/// A token occurrence that may seed or extend a phrase
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordCandidate {
    pub tag_id: TokenId,
    /// Index of the occurrence in [`DocumentGraph::occurrences`]
    ///
    /// [`DocumentGraph::occurrences`]: crate::graph::builder::DocumentGraph::occurrences
    pub occurrence_index: usize,
    /// Start offset of the occurrence
    pub start_position: usize,
    /// End offset of the occurrence
    pub end_position: usize,
    pub raw_value: String,
    /// Rank of the term
    pub relevance: f64,
    /// Terms sharing a dependency relation with this occurrence
    pub related_tag_ids: FxHashSet<TokenId>,
    pub tf: f64,
    pub idf: f64,
}

impl KeywordCandidate {
    /// Build a candidate from a document occurrence and its statistics
    pub fn from_occurrence(
        occurrence_index: usize,
        occ: &DocumentOccurrence,
        relevance: f64,
        tf: f64,
        idf: f64,
    ) -> Self {
        Self {
            tag_id: occ.occurrence.token_id,
            occurrence_index,
            start_position: occ.occurrence.start,
            end_position: occ.occurrence.end,
            raw_value: occ.occurrence.value.clone(),
            relevance,
            related_tag_ids: occ.related.clone(),
            tf,
            idf,
        }
    }

    /// Merge further related terms into this candidate
    pub fn update<I: IntoIterator<Item = TokenId>>(&mut self, related: I) {
        self.related_tag_ids.extend(related);
    }

    /// In the top-rated set, or related to a term that is
    pub fn is_eligible(&self, top_rated: &FxHashSet<TokenId>) -> bool {
        top_rated.contains(&self.tag_id)
            || self.related_tag_ids.iter().any(|t| top_rated.contains(t))
    }

    pub fn is_top_rated(&self, top_rated: &FxHashSet<TokenId>) -> bool {
        top_rated.contains(&self.tag_id)
    }

    /// Whether `next` is the occurrence right after this one in the text
    pub fn is_followed_by(&self, next: &KeywordCandidate) -> bool {
        next.occurrence_index == self.occurrence_index + 1
    }
}
