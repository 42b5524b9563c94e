//! Saved code-set repository
//!
//! Single-record upserts keyed by the generated set id; the payload (full
//! rows or anchor-only build inputs) is stored as JSONB.

use crate::{
    db::traits::CodeSetStore,
    models::{BuildType, CodeSetPayload, SavedCodeSet, SourceType},
    Error, Result,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Clone)]
pub struct PgCodeSetStore {
    pool: PgPool,
}

impl PgCodeSetStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CodeSetStore for PgCodeSetStore {
    async fn upsert(&self, set: &SavedCodeSet) -> Result<()> {
        let payload = serde_json::to_value(&set.payload)
            .map_err(|e| Error::Other(anyhow::anyhow!("serialize code set payload: {e}")))?;

        sqlx::query(
            "INSERT INTO saved_codesets (
                 id, owner_id, name, description, source_type, build_type,
                 total_concepts, is_materialized, parameters_hash, payload,
                 created_at, updated_at
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             ON CONFLICT (id) DO UPDATE SET
                 name = EXCLUDED.name,
                 description = EXCLUDED.description,
                 source_type = EXCLUDED.source_type,
                 build_type = EXCLUDED.build_type,
                 total_concepts = EXCLUDED.total_concepts,
                 is_materialized = EXCLUDED.is_materialized,
                 parameters_hash = EXCLUDED.parameters_hash,
                 payload = EXCLUDED.payload,
                 updated_at = EXCLUDED.updated_at",
        )
        .bind(set.id)
        .bind(&set.owner_id)
        .bind(&set.name)
        .bind(&set.description)
        .bind(set.source_type.as_str())
        .bind(set.build_type.as_str())
        .bind(set.total_concepts as i64)
        .bind(set.is_materialized)
        .bind(&set.parameters_hash)
        .bind(payload)
        .bind(set.created_at)
        .bind(set.updated_at)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<SavedCodeSet>> {
        let row = sqlx::query(
            "SELECT id, owner_id, name, description, source_type, build_type,
                    total_concepts, is_materialized, parameters_hash, payload,
                    created_at, updated_at
             FROM saved_codesets
             WHERE id = $1
             LIMIT 1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(|r| row_to_saved_set(&r)).transpose()
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<SavedCodeSet>> {
        let rows = sqlx::query(
            "SELECT id, owner_id, name, description, source_type, build_type,
                    total_concepts, is_materialized, parameters_hash, payload,
                    created_at, updated_at
             FROM saved_codesets
             WHERE owner_id = $1
             ORDER BY updated_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.iter().map(row_to_saved_set).collect()
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM saved_codesets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_saved_set(row: &sqlx::postgres::PgRow) -> Result<SavedCodeSet> {
    let source_type: String = row.get("source_type");
    let build_type: String = row.get("build_type");
    let total_concepts: i64 = row.get("total_concepts");
    let payload: serde_json::Value = row.get("payload");
    let created_at: DateTime<Utc> = row.get("created_at");
    let updated_at: DateTime<Utc> = row.get("updated_at");

    let payload: CodeSetPayload = serde_json::from_value(payload)
        .map_err(|e| Error::Upstream(format!("malformed code set payload: {e}")))?;

    Ok(SavedCodeSet {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        name: row.get("name"),
        description: row.get("description"),
        source_type: SourceType::from_str(&source_type)
            .map_err(|_| Error::Upstream(format!("unrecognized source type '{source_type}'")))?,
        build_type: BuildType::from_str(&build_type)
            .map_err(|_| Error::Upstream(format!("unrecognized build type '{build_type}'")))?,
        total_concepts: total_concepts.max(0) as usize,
        is_materialized: row.get("is_materialized"),
        parameters_hash: row.get("parameters_hash"),
        payload,
        created_at,
        updated_at,
    })
}
