//! In-memory storage backends
//!
//! Mirror the Postgres repositories for tests, demos and embedded use. The
//! vocabulary store is frozen at build time and shares one `Arc`, matching
//! the read-only contract; the code-set store takes a lock per call.

use crate::{
    db::traits::{CodeSetStore, RollupKind, VocabularyStore},
    models::{AncestorEdge, Concept, Relationship, SavedCodeSet},
    Result,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct VocabularyData {
    concepts: HashMap<i64, Concept>,
    relationships: Vec<Relationship>,
    ancestors: Vec<AncestorEdge>,
    rollups: Vec<(RollupKind, String, String)>,
}

#[derive(Clone, Default)]
pub struct MemoryVocabularyStore {
    data: Arc<VocabularyData>,
}

impl MemoryVocabularyStore {
    pub fn builder() -> MemoryVocabularyBuilder {
        MemoryVocabularyBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct MemoryVocabularyBuilder {
    data: VocabularyData,
}

impl MemoryVocabularyBuilder {
    pub fn concept(mut self, concept: Concept) -> Self {
        self.data.concepts.insert(concept.concept_id, concept);
        self
    }

    pub fn relationship(mut self, from: i64, relationship_id: &str, to: i64) -> Self {
        self.data.relationships.push(Relationship {
            concept_id_1: from,
            concept_id_2: to,
            relationship_id: relationship_id.to_string(),
            invalid_reason: None,
        });
        self
    }

    pub fn ancestor(mut self, ancestor: i64, descendant: i64, min_separation: u32) -> Self {
        self.data.ancestors.push(AncestorEdge {
            ancestor_concept_id: ancestor,
            descendant_concept_id: descendant,
            min_separation,
        });
        self
    }

    pub fn rollup(mut self, kind: RollupKind, raw: &str, canonical: &str) -> Self {
        self.data
            .rollups
            .push((kind, raw.to_string(), canonical.to_string()));
        self
    }

    pub fn build(mut self) -> MemoryVocabularyStore {
        // The closure carries a self edge for every concept.
        let ids: Vec<i64> = self.data.concepts.keys().copied().collect();
        for id in ids {
            let has_self = self
                .data
                .ancestors
                .iter()
                .any(|e| e.ancestor_concept_id == id && e.descendant_concept_id == id);
            if !has_self {
                self.data.ancestors.push(AncestorEdge {
                    ancestor_concept_id: id,
                    descendant_concept_id: id,
                    min_separation: 0,
                });
            }
        }

        MemoryVocabularyStore {
            data: Arc::new(self.data),
        }
    }
}

impl MemoryVocabularyStore {
    fn valid_concept(&self, concept_id: i64) -> Option<&Concept> {
        self.data
            .concepts
            .get(&concept_id)
            .filter(|c| c.is_valid())
    }
}

#[async_trait]
impl VocabularyStore for MemoryVocabularyStore {
    async fn concept_by_id(&self, concept_id: i64) -> Result<Option<Concept>> {
        Ok(self.valid_concept(concept_id).cloned())
    }

    async fn concepts_by_ids(&self, concept_ids: &[i64]) -> Result<Vec<Concept>> {
        Ok(concept_ids
            .iter()
            .filter_map(|id| self.valid_concept(*id).cloned())
            .collect())
    }

    async fn search_concepts(
        &self,
        term: &str,
        domain_id: &str,
        limit: usize,
    ) -> Result<Vec<Concept>> {
        let needle = term.to_lowercase();

        let mut hits: Vec<Concept> = self
            .data
            .concepts
            .values()
            .filter(|c| c.is_valid() && c.domain_id == domain_id)
            .filter(|c| {
                c.concept_id.to_string().contains(&needle)
                    || c.concept_code.to_lowercase().contains(&needle)
                    || c.concept_name.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();

        hits.sort_by_key(|c| c.concept_id);
        hits.truncate(limit);
        Ok(hits)
    }

    async fn related_concepts(
        &self,
        concept_id: i64,
        relationship_id: &str,
    ) -> Result<Vec<Concept>> {
        let mut targets: Vec<Concept> = self
            .data
            .relationships
            .iter()
            .filter(|r| {
                r.concept_id_1 == concept_id
                    && r.relationship_id == relationship_id
                    && r.is_valid()
            })
            .filter_map(|r| self.valid_concept(r.concept_id_2).cloned())
            .collect();

        targets.sort_by_key(|c| c.concept_id);
        Ok(targets)
    }

    async fn ancestors_of(&self, concept_id: i64) -> Result<Vec<(Concept, u32)>> {
        Ok(self
            .data
            .ancestors
            .iter()
            .filter(|e| e.descendant_concept_id == concept_id)
            .filter_map(|e| {
                self.valid_concept(e.ancestor_concept_id)
                    .map(|c| (c.clone(), e.min_separation))
            })
            .collect())
    }

    async fn descendants_of(&self, concept_id: i64) -> Result<Vec<(Concept, u32)>> {
        Ok(self
            .data
            .ancestors
            .iter()
            .filter(|e| e.ancestor_concept_id == concept_id)
            .filter_map(|e| {
                self.valid_concept(e.descendant_concept_id)
                    .map(|c| (c.clone(), e.min_separation))
            })
            .collect())
    }

    async fn rollup_rows(&self, kind: RollupKind) -> Result<Vec<(String, String)>> {
        Ok(self
            .data
            .rollups
            .iter()
            .filter(|(k, _, _)| *k == kind)
            .map(|(_, raw, canonical)| (raw.clone(), canonical.clone()))
            .collect())
    }
}

#[derive(Clone, Default)]
pub struct MemoryCodeSetStore {
    sets: Arc<RwLock<HashMap<Uuid, SavedCodeSet>>>,
}

#[async_trait]
impl CodeSetStore for MemoryCodeSetStore {
    async fn upsert(&self, set: &SavedCodeSet) -> Result<()> {
        self.sets.write().await.insert(set.id, set.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<SavedCodeSet>> {
        Ok(self.sets.read().await.get(&id).cloned())
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<SavedCodeSet>> {
        let mut sets: Vec<SavedCodeSet> = self
            .sets
            .read()
            .await
            .values()
            .filter(|s| s.owner_id == owner_id)
            .cloned()
            .collect();

        sets.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(sets)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool> {
        Ok(self.sets.write().await.remove(&id).is_some())
    }
}
