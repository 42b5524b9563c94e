//! Vocabulary graph records
//!
//! The vocabulary store is an externally owned, read-only relational graph:
//! concepts, directed relationships, and a precomputed transitive-closure
//! table of ancestor edges.

use serde::{Deserialize, Serialize};

/// Relationship ids the engine navigates.
pub mod rel {
    /// Non-standard concept to its standard target.
    pub const MAPS_TO: &str = "Maps to";

    // Lab attribute relationships
    pub const HAS_PROPERTY: &str = "Has property";
    pub const HAS_SCALE: &str = "Has scale type";
    pub const HAS_SYSTEM: &str = "Has system";
    pub const HAS_TIME_ASPECT: &str = "Has time aspect";
    pub const CONTAINED_IN_PANEL: &str = "Contained in panel";

    // Drug attribute relationships
    pub const HAS_DOSE_FORM: &str = "RxNorm has dose form";
    pub const HAS_INGREDIENT: &str = "RxNorm has ing";
    pub const HAS_DRUG_CLASS: &str = "Drug has drug class";
}

/// Domain ids recognized by the scoping policy.
pub mod domain {
    pub const CONDITION: &str = "Condition";
    pub const DRUG: &str = "Drug";
    pub const MEASUREMENT: &str = "Measurement";
    pub const PROCEDURE: &str = "Procedure";
    pub const OBSERVATION: &str = "Observation";
    pub const DEVICE: &str = "Device";
}

/// One coded term in a standardized clinical vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    pub concept_id: i64,
    pub concept_code: String,
    pub concept_name: String,
    pub vocabulary_id: String,
    pub domain_id: String,
    pub concept_class_id: String,
    /// `Some("S")` marks a standard concept.
    pub standard_concept: Option<String>,
    /// Tombstone; set when the concept has been retired from its vocabulary.
    pub invalid_reason: Option<String>,
}

impl Concept {
    pub fn is_standard(&self) -> bool {
        self.standard_concept.as_deref() == Some("S")
    }

    pub fn is_valid(&self) -> bool {
        self.invalid_reason.is_none()
    }
}

/// Directed edge between two concepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub concept_id_1: i64,
    pub concept_id_2: i64,
    pub relationship_id: String,
    pub invalid_reason: Option<String>,
}

impl Relationship {
    pub fn is_valid(&self) -> bool {
        self.invalid_reason.is_none()
    }
}

/// Precomputed transitive-closure edge.
///
/// `min_separation` is the minimum hop count between the two concepts; every
/// concept carries a self edge with separation 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AncestorEdge {
    pub ancestor_concept_id: i64,
    pub descendant_concept_id: i64,
    pub min_separation: u32,
}

/// A concept chosen by a caller as a build or traversal input.
///
/// Carries denormalized display fields so callers can render a build session
/// without re-fetching. Ephemeral; never persisted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    pub concept_id: i64,
    pub concept_name: String,
    pub vocabulary_id: String,
    pub concept_class_id: String,
    pub domain_id: String,
    /// Search label the anchor originated from, when picked off a search hit.
    pub search_label: Option<String>,
}

impl Anchor {
    pub fn from_concept(concept: &Concept) -> Self {
        Self {
            concept_id: concept.concept_id,
            concept_name: concept.concept_name.clone(),
            vocabulary_id: concept.vocabulary_id.clone(),
            concept_class_id: concept.concept_class_id.clone(),
            domain_id: concept.domain_id.clone(),
            search_label: None,
        }
    }
}
