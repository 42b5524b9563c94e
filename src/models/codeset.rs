//! Code-set rows and saved code sets

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Build strategy selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildType {
    /// Full descendant closure per anchor.
    Hierarchical,
    /// The anchor concepts themselves, no traversal.
    Direct,
    /// Anchors enriched with lab attributes and panel memberships.
    LabTest,
}

impl BuildType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::Hierarchical => "hierarchical",
            BuildType::Direct => "direct",
            BuildType::LabTest => "labtest",
        }
    }
}

impl std::str::FromStr for BuildType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "hierarchical" => Ok(BuildType::Hierarchical),
            "direct" => Ok(BuildType::Direct),
            "labtest" => Ok(BuildType::LabTest),
            other => Err(Error::InvalidArgument(format!(
                "unknown build type '{}'",
                other
            ))),
        }
    }
}

/// Drug-combination filter for hierarchical builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComboFilter {
    #[default]
    All,
    /// Keep single-ingredient drugs only.
    Single,
    /// Keep combination drugs only.
    Combination,
}

/// Strategy parameters, serialized alongside anchor-only saved sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildParams {
    #[serde(default)]
    pub combo_filter: ComboFilter,
}

/// Whether a drug concept combines more than one ingredient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComboClass {
    Single,
    Combination,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugAttributes {
    pub dose_form: Option<String>,
    pub drug_family_group: Option<String>,
    pub combo_class: ComboClass,
}

/// Lab attribute values collected for one anchor.
///
/// Multiple values of one attribute are aggregated into a single joined
/// string rather than duplicated into extra rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabAttributes {
    pub property: Option<String>,
    pub scale: Option<String>,
    pub system: Option<String>,
    pub time_aspect: Option<String>,
    pub panels: Option<String>,
}

/// One code in a built code set. Recomputed on every build call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSetRow {
    pub root_name: String,
    pub child_vocabulary_id: String,
    pub child_code: String,
    pub child_name: String,
    pub child_concept_id: i64,
    pub concept_class_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drug: Option<DrugAttributes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lab: Option<LabAttributes>,
}

impl CodeSetRow {
    /// Deduplication identity. The same code can be reached via more than one
    /// anchor or relationship path; the first occurrence wins.
    pub fn dedup_key(&self) -> (String, String, String, i64, String) {
        (
            self.child_vocabulary_id.clone(),
            self.child_code.clone(),
            self.child_name.clone(),
            self.child_concept_id,
            self.concept_class_id.clone(),
        )
    }
}

/// Where a saved code set originally came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// Built from the engine's own hierarchical taxonomy.
    Hierarchy,
    /// Assembled from search results.
    Search,
    /// Imported from an external file or system.
    Import,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Hierarchy => "hierarchy",
            SourceType::Search => "search",
            SourceType::Import => "import",
        }
    }

    /// Only the hierarchy source retains anchors the builder can re-expand.
    pub fn retains_anchors(&self) -> bool {
        matches!(self, SourceType::Hierarchy)
    }
}

impl std::str::FromStr for SourceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "hierarchy" => Ok(SourceType::Hierarchy),
            "search" => Ok(SourceType::Search),
            "import" => Ok(SourceType::Import),
            other => Err(Error::InvalidArgument(format!(
                "unknown source type '{}'",
                other
            ))),
        }
    }
}

/// Stored payload of a saved code set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CodeSetPayload {
    /// Full row list, persisted for sets under the materialization threshold.
    Materialized { rows: Vec<CodeSetRow> },
    /// Build inputs only; the caller re-invokes the builder to rehydrate.
    AnchorOnly {
        anchor_ids: Vec<i64>,
        build_parameters: BuildParams,
    },
}

/// A persisted code set.
///
/// Invariant: `is_materialized == (total_concepts < threshold)` at save time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedCodeSet {
    pub id: Uuid,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    pub source_type: SourceType,
    pub build_type: BuildType,
    pub total_concepts: usize,
    pub is_materialized: bool,
    /// Fingerprint of (build_type, build parameters) at save time.
    pub parameters_hash: String,
    pub payload: CodeSetPayload,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SavedCodeSet {
    /// Whether the builder can regenerate this set's rows from its payload.
    pub fn is_rebuildable(&self) -> bool {
        match self.payload {
            CodeSetPayload::Materialized { .. } => true,
            CodeSetPayload::AnchorOnly { .. } => self.source_type.retains_anchors(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn build_type_round_trips_through_str() {
        for build_type in [BuildType::Hierarchical, BuildType::Direct, BuildType::LabTest] {
            assert_eq!(BuildType::from_str(build_type.as_str()).unwrap(), build_type);
        }
    }

    #[test]
    fn unknown_build_type_is_invalid_argument() {
        let err = BuildType::from_str("panel").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn only_hierarchy_source_retains_anchors() {
        assert!(SourceType::Hierarchy.retains_anchors());
        assert!(!SourceType::Search.retains_anchors());
        assert!(!SourceType::Import.retains_anchors());
    }
}
