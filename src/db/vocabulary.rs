//! Vocabulary repository - read-only access to the concept graph
//!
//! Queries the CDM-style `concept`, `concept_relationship` and
//! `concept_ancestor` tables plus the small `rollup_lookup` table. All
//! queries exclude tombstoned rows.

use crate::{
    config::DatabaseConfig,
    db::traits::{RollupKind, VocabularyStore},
    models::Concept,
    Error, Result,
};
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use std::time::Duration;

const CONCEPT_COLUMNS: &str = "concept_id, concept_code, concept_name, vocabulary_id, \
     domain_id, concept_class_id, standard_concept, invalid_reason";

#[derive(Clone)]
pub struct PgVocabularyStore {
    pool: PgPool,
}

impl PgVocabularyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .min_connections(config.pool_min_size)
            .max_connections(config.pool_max_size)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .connect(&config.url)
            .await
            .map_err(Error::Database)?;

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl VocabularyStore for PgVocabularyStore {
    async fn concept_by_id(&self, concept_id: i64) -> Result<Option<Concept>> {
        let row = sqlx::query(&format!(
            "SELECT {CONCEPT_COLUMNS}
             FROM concept
             WHERE concept_id = $1 AND invalid_reason IS NULL
             LIMIT 1"
        ))
        .bind(concept_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|r| row_to_concept(&r)))
    }

    async fn concepts_by_ids(&self, concept_ids: &[i64]) -> Result<Vec<Concept>> {
        if concept_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(&format!(
            "SELECT {CONCEPT_COLUMNS}
             FROM concept
             WHERE concept_id = ANY($1) AND invalid_reason IS NULL"
        ))
        .bind(concept_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(row_to_concept).collect())
    }

    async fn search_concepts(
        &self,
        term: &str,
        domain_id: &str,
        limit: usize,
    ) -> Result<Vec<Concept>> {
        let pattern = format!("%{}%", escape_like(term));

        let rows = sqlx::query(&format!(
            "SELECT {CONCEPT_COLUMNS}
             FROM concept
             WHERE domain_id = $2
               AND invalid_reason IS NULL
               AND (concept_id::text ILIKE $1
                    OR concept_code ILIKE $1
                    OR concept_name ILIKE $1)
             ORDER BY concept_id
             LIMIT $3"
        ))
        .bind(&pattern)
        .bind(domain_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(row_to_concept).collect())
    }

    async fn related_concepts(
        &self,
        concept_id: i64,
        relationship_id: &str,
    ) -> Result<Vec<Concept>> {
        let rows = sqlx::query(
            "SELECT c.concept_id, c.concept_code, c.concept_name, c.vocabulary_id,
                    c.domain_id, c.concept_class_id, c.standard_concept, c.invalid_reason
             FROM concept_relationship r
             JOIN concept c ON c.concept_id = r.concept_id_2
             WHERE r.concept_id_1 = $1
               AND r.relationship_id = $2
               AND r.invalid_reason IS NULL
               AND c.invalid_reason IS NULL
             ORDER BY c.concept_id",
        )
        .bind(concept_id)
        .bind(relationship_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(row_to_concept).collect())
    }

    async fn ancestors_of(&self, concept_id: i64) -> Result<Vec<(Concept, u32)>> {
        let rows = sqlx::query(
            "SELECT c.concept_id, c.concept_code, c.concept_name, c.vocabulary_id,
                    c.domain_id, c.concept_class_id, c.standard_concept, c.invalid_reason,
                    ca.min_separation
             FROM concept_ancestor ca
             JOIN concept c ON c.concept_id = ca.ancestor_concept_id
             WHERE ca.descendant_concept_id = $1
               AND c.invalid_reason IS NULL",
        )
        .bind(concept_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .iter()
            .map(|r| (row_to_concept(r), row_separation(r)))
            .collect())
    }

    async fn descendants_of(&self, concept_id: i64) -> Result<Vec<(Concept, u32)>> {
        let rows = sqlx::query(
            "SELECT c.concept_id, c.concept_code, c.concept_name, c.vocabulary_id,
                    c.domain_id, c.concept_class_id, c.standard_concept, c.invalid_reason,
                    ca.min_separation
             FROM concept_ancestor ca
             JOIN concept c ON c.concept_id = ca.descendant_concept_id
             WHERE ca.ancestor_concept_id = $1
               AND c.invalid_reason IS NULL",
        )
        .bind(concept_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .iter()
            .map(|r| (row_to_concept(r), row_separation(r)))
            .collect())
    }

    async fn rollup_rows(&self, kind: RollupKind) -> Result<Vec<(String, String)>> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT raw_value, canonical_label
             FROM rollup_lookup
             WHERE kind = $1",
        )
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows)
    }
}

fn row_to_concept(row: &sqlx::postgres::PgRow) -> Concept {
    Concept {
        concept_id: row.get("concept_id"),
        concept_code: row.get("concept_code"),
        concept_name: row.get("concept_name"),
        vocabulary_id: row.get("vocabulary_id"),
        domain_id: row.get("domain_id"),
        concept_class_id: row.get("concept_class_id"),
        standard_concept: row.get("standard_concept"),
        invalid_reason: row.get("invalid_reason"),
    }
}

fn row_separation(row: &sqlx::postgres::PgRow) -> u32 {
    let separation: i32 = row.get("min_separation");
    separation.max(0) as u32
}

/// Escape LIKE wildcards so user terms match literally.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn escape_like_neutralizes_wildcards() {
        assert_eq!(escape_like("a_b%c"), "a\\_b\\%c");
        assert_eq!(escape_like("plain"), "plain");
    }
}
