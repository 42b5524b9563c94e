//! Lab attribute rollup normalization
//!
//! Three independent lookup tables (scale, system, time aspect) keyed by
//! case-insensitive trimmed raw value. Loaded once at startup and passed by
//! reference; a missing source degrades to an empty table, never a request
//! failure.

use crate::{
    db::{RollupKind, VocabularyStore},
    models::CodeSetRow,
    services::builder::ATTRIBUTE_JOIN,
};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct RollupTables {
    scale: HashMap<String, String>,
    system: HashMap<String, String>,
    time_aspect: HashMap<String, String>,
}

impl RollupTables {
    /// Load all three tables through the store. Each table degrades to empty
    /// on failure so attribute values pass through unchanged.
    pub async fn load<S: VocabularyStore>(store: &S) -> Self {
        Self {
            scale: Self::load_kind(store, RollupKind::Scale).await,
            system: Self::load_kind(store, RollupKind::System).await,
            time_aspect: Self::load_kind(store, RollupKind::TimeAspect).await,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    async fn load_kind<S: VocabularyStore>(store: &S, kind: RollupKind) -> HashMap<String, String> {
        match store.rollup_rows(kind).await {
            Ok(rows) => {
                let table: HashMap<String, String> = rows
                    .into_iter()
                    .map(|(raw, canonical)| (normalize_key(&raw), canonical))
                    .collect();
                tracing::debug!(kind = kind.as_str(), entries = table.len(), "rollup table loaded");
                table
            }
            Err(err) => {
                tracing::warn!(
                    kind = kind.as_str(),
                    error = %err,
                    "rollup table unavailable, raw values will pass through"
                );
                HashMap::new()
            }
        }
    }

    /// Pure post-processing pass over lab-test rows: matched raw values are
    /// replaced by their canonical label, unmatched values pass through.
    pub fn apply(&self, rows: &mut [CodeSetRow]) {
        for row in rows {
            let Some(lab) = row.lab.as_mut() else {
                continue;
            };

            lab.scale = lab.scale.take().map(|v| normalize_joined(&self.scale, &v));
            lab.system = lab.system.take().map(|v| normalize_joined(&self.system, &v));
            lab.time_aspect = lab
                .time_aspect
                .take()
                .map(|v| normalize_joined(&self.time_aspect, &v));
        }
    }
}

/// Map each component of a joined attribute value independently, preserving
/// the join separator and any unmatched component.
fn normalize_joined(table: &HashMap<String, String>, value: &str) -> String {
    value
        .split(ATTRIBUTE_JOIN)
        .map(|part| {
            table
                .get(&normalize_key(part))
                .cloned()
                .unwrap_or_else(|| part.to_string())
        })
        .collect::<Vec<_>>()
        .join(ATTRIBUTE_JOIN)
}

fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}
