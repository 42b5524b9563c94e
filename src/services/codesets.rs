//! Saved code-set service - materialization policy and lazy rebuild
//!
//! Small result sets persist their full row list; larger ones persist only
//! the build inputs and are regenerated on demand. Loading never rebuilds,
//! keeping read latency bounded.

use crate::{
    db::{CodeSetStore, VocabularyStore},
    models::{BuildParams, BuildType, CodeSetPayload, CodeSetRow, SavedCodeSet, SourceType},
    services::{builder::BuilderService, rollup::RollupTables},
    Error, Result,
};
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct CodeSetService<V: VocabularyStore, C: CodeSetStore> {
    builder: BuilderService<V>,
    rollups: Arc<RollupTables>,
    store: C,
    materialization_threshold: usize,
}

impl<V: VocabularyStore, C: CodeSetStore> CodeSetService<V, C> {
    pub fn new(
        builder: BuilderService<V>,
        rollups: Arc<RollupTables>,
        store: C,
        materialization_threshold: usize,
    ) -> Self {
        Self {
            builder,
            rollups,
            store,
            materialization_threshold,
        }
    }

    /// Persist a built code set, choosing materialized or anchor-only form
    /// by the threshold. Returns the generated set id.
    pub async fn save(
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
        let total_concepts = rows.len();
        let is_materialized = total_concepts < self.materialization_threshold;

        let payload = if is_materialized {
            CodeSetPayload::Materialized { rows }
        } else {
            CodeSetPayload::AnchorOnly {
                anchor_ids,
                build_parameters: params.clone(),
            }
        };

        let now = Utc::now();
        let set = SavedCodeSet {
            id: Uuid::new_v4(),
            owner_id: owner_id.to_string(),
            name: name.to_string(),
            description: description.map(str::to_string),
            source_type,
            build_type,
            total_concepts,
            is_materialized,
            parameters_hash: params_hash(build_type, params),
            payload,
            created_at: now,
            updated_at: now,
        };

        self.store.upsert(&set).await?;

        tracing::info!(
            id = %set.id,
            owner = owner_id,
            total_concepts,
            is_materialized,
            "saved code set"
        );
        Ok(set.id)
    }

    /// Load a saved set as stored. Anchor-only sets come back without rows;
    /// callers detect `is_materialized == false` and call `rebuild`.
    ///
    /// A set owned by someone else is indistinguishable from a missing one.
    pub async fn load(&self, owner_id: &str, id: Uuid) -> Result<SavedCodeSet> {
        let set = self
            .store
            .get_by_id(id)
            .await?
            .ok_or(Error::CodeSetNotFound { id })?;

        if set.owner_id != owner_id {
            return Err(Error::CodeSetNotFound { id });
        }

        Ok(set)
    }

    pub async fn list(&self, owner_id: &str) -> Result<Vec<SavedCodeSet>> {
        self.store.list_by_owner(owner_id).await
    }

    /// Regenerate a set's full row list.
    ///
    /// Materialized sets return their stored rows. Anchor-only sets re-run
    /// the builder with the stored inputs, which is only possible for
    /// sources that retain builder anchors.
    pub async fn rebuild(&self, set: &SavedCodeSet) -> Result<Vec<CodeSetRow>> {
        match &set.payload {
            CodeSetPayload::Materialized { rows } => Ok(rows.clone()),
            CodeSetPayload::AnchorOnly {
                anchor_ids,
                build_parameters,
            } => {
                if !set.source_type.retains_anchors() {
                    return Err(Error::InvalidArgument(format!(
                        "code set '{}' from source '{}' does not retain anchors and cannot be rebuilt",
                        set.id,
                        set.source_type.as_str()
                    )));
                }

                let mut rows = self
                    .builder
                    .build(anchor_ids, set.build_type, build_parameters)
                    .await?;

                if set.build_type == BuildType::LabTest {
                    self.rollups.apply(&mut rows);
                }

                Ok(rows)
            }
        }
    }

    /// Returns whether a record was removed. Unknown or unowned ids delete
    /// nothing.
    pub async fn delete(&self, owner_id: &str, id: Uuid) -> Result<bool> {
        match self.store.get_by_id(id).await? {
            Some(set) if set.owner_id == owner_id => self.store.delete_by_id(id).await,
            _ => Ok(false),
        }
    }
}

/// Fingerprint of (build type, build parameters) at save time.
fn params_hash(build_type: BuildType, params: &BuildParams) -> String {
    let mut hasher = Sha256::new();
    hasher.update(build_type.as_str().as_bytes());
    hasher.update(
        serde_json::to_string(params)
            .unwrap_or_default()
            .as_bytes(),
    );
    format!("{:x}", hasher.finalize())
}
