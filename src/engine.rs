//! Engine facade
//!
//! Wires the services over shared store handles. Every operation is a pure,
//! stateless computation; the engine holds no mutable state beyond the
//! write-once rollup tables, so one instance serves concurrent callers.

use crate::{
    config::EngineConfig,
    db::{CodeSetStore, VocabularyStore},
    models::{BuildParams, BuildType, CodeSetRow, SavedCodeSet, SourceType},
    services::{
        builder::BuilderService,
        codesets::CodeSetService,
        hierarchy::{HierarchyRow, HierarchyService},
        resolver::{ResolverService, SearchResult},
        rollup::RollupTables,
    },
    Result,
};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct Engine<V: VocabularyStore, C: CodeSetStore> {
    resolver: ResolverService<V>,
    hierarchy: HierarchyService<V>,
    builder: BuilderService<V>,
    code_sets: CodeSetService<V, C>,
    rollups: Arc<RollupTables>,
}

impl<V: VocabularyStore, C: CodeSetStore> Engine<V, C> {
    /// Construct the engine, loading the rollup tables once up front.
    pub async fn new(vocabulary: V, code_sets: C, config: &EngineConfig) -> Self {
        let rollups = Arc::new(RollupTables::load(&vocabulary).await);
        let builder = BuilderService::new(vocabulary.clone());

        Self {
            resolver: ResolverService::new(vocabulary.clone(), config.search_cap),
            hierarchy: HierarchyService::new(vocabulary),
            code_sets: CodeSetService::new(
                builder.clone(),
                rollups.clone(),
                code_sets,
                config.materialization_threshold,
            ),
            builder,
            rollups,
        }
    }

    /// Ranked free-text/code/id search within one domain.
    pub async fn resolve(&self, term: &str, domain_id: &str) -> Result<Vec<SearchResult>> {
        self.resolver.resolve(term, domain_id).await
    }

    /// Bidirectional hierarchy expansion around one anchor.
    pub async fn expand_hierarchy(&self, anchor_concept_id: i64) -> Result<Vec<HierarchyRow>> {
        self.hierarchy.expand(anchor_concept_id).await
    }

    /// Build a deduplicated code set from a set of anchors. Lab-test rows
    /// additionally pass through the rollup normalizer.
    pub async fn build_code_set(
        &self,
        anchor_ids: &[i64],
        build_type: BuildType,
        params: &BuildParams,
    ) -> Result<Vec<CodeSetRow>> {
        let mut rows = self.builder.build(anchor_ids, build_type, params).await?;

        if build_type == BuildType::LabTest {
            self.rollups.apply(&mut rows);
        }

        Ok(rows)
    }

    pub async fn save_code_set(
        &self,
        owner_id: &str,
        name: &str,
        description: Option<&str>,
        source_type: SourceType,
        rows: Vec<CodeSetRow>,
        anchor_ids: Vec<i64>,
        build_type: BuildType,
        params: &BuildParams,
    ) -> Result<Uuid> {
        self.code_sets
            .save(
                owner_id,
                name,
                description,
                source_type,
                rows,
                anchor_ids,
                build_type,
                params,
            )
            .await
    }

    pub async fn load_code_set(&self, owner_id: &str, id: Uuid) -> Result<SavedCodeSet> {
        self.code_sets.load(owner_id, id).await
    }

    pub async fn list_code_sets(&self, owner_id: &str) -> Result<Vec<SavedCodeSet>> {
        self.code_sets.list(owner_id).await
    }

    /// Regenerate a saved set's rows; see `CodeSetService::rebuild`.
    pub async fn rebuild_code_set(&self, set: &SavedCodeSet) -> Result<Vec<CodeSetRow>> {
        self.code_sets.rebuild(set).await
    }

    pub async fn delete_code_set(&self, owner_id: &str, id: Uuid) -> Result<bool> {
        self.code_sets.delete(owner_id, id).await
    }
}
