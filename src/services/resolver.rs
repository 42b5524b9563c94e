//! Concept resolution service - ranked term search
//!
//! Matches a free-text term against concept ids, codes and names within one
//! domain, resolves each hit to its standard concept where a single-hop
//! "Maps to" edge exists, and ranks the results.

use crate::{
    db::VocabularyStore,
    models::{concept::rel, Anchor, Concept},
    services::{policy::DomainPolicy, with_fallback},
    Error, Result,
};
use serde::{Deserialize, Serialize};

/// Minimum length of a search term after trimming.
pub const MIN_TERM_LEN: usize = 2;

/// Candidate overscan factor: the store scan fetches more rows than the
/// output cap so ranking sees the full tie group before truncation.
const CANDIDATE_OVERSCAN: usize = 8;

/// How a matched concept resolved to its standard counterpart.
///
/// Discriminant order is ranking order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingKind {
    /// Resolved via a "Maps to" edge to a standard target.
    MappedStandard = 0,
    /// The matched concept is itself standard.
    AlreadyStandard = 1,
    /// No standard target exists (classification-only vocabularies).
    Unmapped = 2,
}

/// One search hit: the matched concept and its resolved standard concept as
/// parallel field groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub searched_concept_id: i64,
    pub searched_code: String,
    pub searched_name: String,
    pub searched_vocabulary_id: String,
    pub searched_concept_class_id: String,

    pub std_concept_id: i64,
    pub std_code: String,
    pub std_name: String,
    pub std_vocabulary_id: String,
    pub std_domain_id: String,
    pub std_concept_class_id: String,

    pub mapping: MappingKind,
}

impl SearchResult {
    /// Turn this hit into a build anchor, remembering the term it came from.
    pub fn to_anchor(&self, search_label: &str) -> Anchor {
        Anchor {
            concept_id: self.std_concept_id,
            concept_name: self.std_name.clone(),
            vocabulary_id: self.std_vocabulary_id.clone(),
            concept_class_id: self.std_concept_class_id.clone(),
            domain_id: self.std_domain_id.clone(),
            search_label: Some(search_label.to_string()),
        }
    }
}

#[derive(Clone)]
pub struct ResolverService<S: VocabularyStore> {
    store: S,
    search_cap: usize,
}

impl<S: VocabularyStore> ResolverService<S> {
    pub fn new(store: S, search_cap: usize) -> Self {
        Self { store, search_cap }
    }

    pub async fn resolve(&self, term: &str, domain_id: &str) -> Result<Vec<SearchResult>> {
        let term = term.trim();
        if term.chars().count() < MIN_TERM_LEN {
            return Err(Error::InvalidArgument(format!(
                "search term must be at least {MIN_TERM_LEN} characters"
            )));
        }

        if DomainPolicy::allowed_vocabularies(domain_id).is_empty() {
            return Err(Error::InvalidArgument(format!(
                "unknown domain '{domain_id}'"
            )));
        }

        let scan_limit = self.search_cap.saturating_mul(CANDIDATE_OVERSCAN);
        let candidates = with_fallback("search_concepts", || {
            self.store.search_concepts(term, domain_id, scan_limit)
        })
        .await?;

        let mut results = Vec::with_capacity(candidates.len());
        for concept in candidates
            .into_iter()
            .filter(|c| DomainPolicy::admits(domain_id, c))
        {
            let (standard, mapping) = self.resolve_standard(&concept).await?;
            results.push(to_search_result(&concept, &standard, mapping));
        }

        rank(term, &mut results);
        results.truncate(self.search_cap);

        tracing::debug!(term, domain_id, hits = results.len(), "resolved search term");
        Ok(results)
    }

    /// Best-effort standard mapping for one matched concept: single-hop
    /// "Maps to" target, the concept itself when already standard, else the
    /// raw concept.
    async fn resolve_standard(&self, concept: &Concept) -> Result<(Concept, MappingKind)> {
        let targets = self
            .store
            .related_concepts(concept.concept_id, rel::MAPS_TO)
            .await?;

        if let Some(target) = targets.into_iter().find(Concept::is_standard) {
            return Ok((target, MappingKind::MappedStandard));
        }

        if concept.is_standard() {
            Ok((concept.clone(), MappingKind::AlreadyStandard))
        } else {
            Ok((concept.clone(), MappingKind::Unmapped))
        }
    }
}

fn to_search_result(searched: &Concept, standard: &Concept, mapping: MappingKind) -> SearchResult {
    SearchResult {
        searched_concept_id: searched.concept_id,
        searched_code: searched.concept_code.clone(),
        searched_name: searched.concept_name.clone(),
        searched_vocabulary_id: searched.vocabulary_id.clone(),
        searched_concept_class_id: searched.concept_class_id.clone(),
        std_concept_id: standard.concept_id,
        std_code: standard.concept_code.clone(),
        std_name: standard.concept_name.clone(),
        std_vocabulary_id: standard.vocabulary_id.clone(),
        std_domain_id: standard.domain_id.clone(),
        std_concept_class_id: standard.concept_class_id.clone(),
        mapping,
    }
}

/// Strict-priority ranking; each tier breaks ties in the next:
/// exact id match, exact code match, mapping kind, name length closest to
/// the query length, alphabetical.
fn rank(term: &str, results: &mut [SearchResult]) {
    let term_len = term.chars().count() as i64;

    results.sort_by_key(|r| {
        let exact_id = r.searched_concept_id.to_string() == term;
        let exact_code = r.searched_code.eq_ignore_ascii_case(term);
        let name_distance = (r.searched_name.chars().count() as i64 - term_len).abs();
        (
            !exact_id,
            !exact_code,
            r.mapping as u8,
            name_distance,
            r.searched_name.to_lowercase(),
        )
    });
}
