//! Hierarchy expansion service
//!
//! Bidirectional transitive-closure traversal from one anchor. Internally a
//! row is a tagged placement (ancestor / self / descendant) plus an unsigned
//! distance; the signed `steps_away` convention (+ancestor, 0 self,
//! -descendant) is produced only when rows are flattened for output.

use crate::{
    db::VocabularyStore,
    models::Concept,
    services::{policy::DomainPolicy, with_fallback},
    Error, Result,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Ancestor(u32),
    SelfRef,
    Descendant(u32),
}

impl Placement {
    fn steps_away(self) -> i32 {
        match self {
            Placement::Ancestor(distance) => distance as i32,
            Placement::SelfRef => 0,
            Placement::Descendant(distance) => -(distance as i32),
        }
    }

    /// Farthest ancestor first, then self, then descendants nearest first.
    fn sort_key(self) -> (u8, i64) {
        match self {
            Placement::Ancestor(distance) => (0, -(distance as i64)),
            Placement::SelfRef => (1, 0),
            Placement::Descendant(distance) => (2, distance as i64),
        }
    }
}

/// One row of an expanded hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyRow {
    /// The anchor's name, constant across the expansion.
    pub root_term: String,
    pub concept_id: i64,
    pub concept_code: String,
    pub concept_name: String,
    pub vocabulary_id: String,
    pub domain_id: String,
    pub concept_class_id: String,
    /// Positive = ancestor, zero = the anchor itself, negative = descendant.
    pub steps_away: i32,
}

#[derive(Clone)]
pub struct HierarchyService<S: VocabularyStore> {
    store: S,
}

impl<S: VocabularyStore> HierarchyService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Expand the full hierarchy around one anchor concept.
    ///
    /// NotFound when the anchor is unknown; an anchor with zero in-policy
    /// relatives yields an empty result.
    pub async fn expand(&self, anchor_concept_id: i64) -> Result<Vec<HierarchyRow>> {
        let anchor = self
            .store
            .concept_by_id(anchor_concept_id)
            .await?
            .ok_or(Error::ConceptNotFound {
                concept_id: anchor_concept_id,
            })?;

        let ancestors = with_fallback("ancestors_of", || {
            self.store.ancestors_of(anchor_concept_id)
        })
        .await?;
        let descendants = with_fallback("descendants_of", || {
            self.store.descendants_of(anchor_concept_id)
        })
        .await?;

        // The self edge (separation 0) appears in both closure passes;
        // report it once.
        let mut self_seen = false;
        let mut placed: Vec<(Placement, Concept)> = Vec::new();

        for (concept, separation) in ancestors {
            if separation == 0 {
                if !self_seen {
                    placed.push((Placement::SelfRef, concept));
                    self_seen = true;
                }
                continue;
            }
            placed.push((Placement::Ancestor(separation), concept));
        }

        for (concept, separation) in descendants {
            if separation == 0 {
                if !self_seen {
                    placed.push((Placement::SelfRef, concept));
                    self_seen = true;
                }
                continue;
            }
            placed.push((Placement::Descendant(separation), concept));
        }

        // One filter for both passes, self row included.
        placed.retain(|(_, concept)| DomainPolicy::admits(&anchor.domain_id, concept));

        placed.sort_by(|(pa, ca), (pb, cb)| {
            pa.sort_key()
                .cmp(&pb.sort_key())
                .then_with(|| ca.concept_name.cmp(&cb.concept_name))
        });

        tracing::debug!(
            anchor = anchor_concept_id,
            domain = %anchor.domain_id,
            rows = placed.len(),
            "expanded hierarchy"
        );

        Ok(placed
            .into_iter()
            .map(|(placement, concept)| HierarchyRow {
                root_term: anchor.concept_name.clone(),
                concept_id: concept.concept_id,
                concept_code: concept.concept_code,
                concept_name: concept.concept_name,
                vocabulary_id: concept.vocabulary_id,
                domain_id: concept.domain_id,
                concept_class_id: concept.concept_class_id,
                steps_away: placement.steps_away(),
            })
            .collect())
    }
}
