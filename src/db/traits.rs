//! Core traits for vocabulary and code-set storage backends

use crate::{
    models::{Concept, SavedCodeSet},
    Result,
};
use async_trait::async_trait;
use uuid::Uuid;

/// The three rollup lookup tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RollupKind {
    Scale,
    System,
    TimeAspect,
}

impl RollupKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RollupKind::Scale => "scale",
            RollupKind::System => "system",
            RollupKind::TimeAspect => "time_aspect",
        }
    }
}

/// Read-only access to the externally owned vocabulary graph.
///
/// Any backend (PostgreSQL, in-memory, HTTP proxy, ...) can implement this
/// trait; the engine never mutates vocabulary data. Tombstoned concepts and
/// relationships are excluded from every query.
#[async_trait]
pub trait VocabularyStore: Send + Sync + Clone {
    /// Current, non-tombstoned concept by id.
    async fn concept_by_id(&self, concept_id: i64) -> Result<Option<Concept>>;

    /// Batch lookup; ids absent from the store are simply missing from the
    /// result rather than an error.
    async fn concepts_by_ids(&self, concept_ids: &[i64]) -> Result<Vec<Concept>>;

    /// Case-insensitive containment scan over concept id, code and name,
    /// scoped to one domain.
    ///
    /// Returns raw candidates only; ranking is engine logic.
    async fn search_concepts(
        &self,
        term: &str,
        domain_id: &str,
        limit: usize,
    ) -> Result<Vec<Concept>>;

    /// Targets of `concept_id`'s active edges for one relationship id.
    async fn related_concepts(
        &self,
        concept_id: i64,
        relationship_id: &str,
    ) -> Result<Vec<Concept>>;

    /// Closure ancestors of `concept_id` with their minimum separation.
    ///
    /// Includes the self edge (separation 0) when the store carries one.
    async fn ancestors_of(&self, concept_id: i64) -> Result<Vec<(Concept, u32)>>;

    /// Closure descendants of `concept_id` with their minimum separation.
    ///
    /// Includes the self edge (separation 0) when the store carries one.
    async fn descendants_of(&self, concept_id: i64) -> Result<Vec<(Concept, u32)>>;

    /// Raw `(raw value, canonical label)` rows of one rollup table.
    async fn rollup_rows(&self, kind: RollupKind) -> Result<Vec<(String, String)>>;
}

/// Keyed storage for saved code sets.
///
/// Writes are single-record upserts keyed by the generated id; no
/// cross-record coordination is required. Owner-scoped authorization is
/// enforced by the service layer, not the store.
#[async_trait]
pub trait CodeSetStore: Send + Sync + Clone {
    async fn upsert(&self, set: &SavedCodeSet) -> Result<()>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<SavedCodeSet>>;

    /// All sets owned by `owner_id`, most recently updated first.
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<SavedCodeSet>>;

    /// Returns whether a record was removed.
    async fn delete_by_id(&self, id: Uuid) -> Result<bool>;
}
