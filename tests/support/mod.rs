//! Shared fixtures for engine integration tests
//!
//! Small in-memory vocabulary graphs covering the condition, drug and lab
//! corners of the engine. Self edges are added by the store builder.

#![allow(dead_code)]

use lexis::config::EngineConfig;
use lexis::db::{MemoryCodeSetStore, MemoryVocabularyStore, RollupKind};
use lexis::models::concept::rel;
use lexis::models::Concept;
use lexis::Engine;

pub fn concept(
    concept_id: i64,
    code: &str,
    name: &str,
    vocabulary_id: &str,
    domain_id: &str,
    concept_class_id: &str,
    standard: bool,
) -> Concept {
    Concept {
        concept_id,
        concept_code: code.to_string(),
        concept_name: name.to_string(),
        vocabulary_id: vocabulary_id.to_string(),
        domain_id: domain_id.to_string(),
        concept_class_id: concept_class_id.to_string(),
        standard_concept: standard.then(|| "S".to_string()),
        invalid_reason: None,
    }
}

/// Condition graph around an "Asthma" anchor (id 300):
/// two ancestors, two descendants, an out-of-policy LOINC descendant, a
/// mapped ICD10CM code, an unmapped ICD9CM code, and an exact-id decoy pair.
pub fn condition_store() -> MemoryVocabularyStore {
    MemoryVocabularyStore::builder()
        .concept(concept(100, "GP100", "Respiratory disorder", "SNOMED", "Condition", "Clinical Finding", true))
        .concept(concept(200, "P200", "Lower respiratory disease", "SNOMED", "Condition", "Clinical Finding", true))
        .concept(concept(300, "195967001", "Asthma", "SNOMED", "Condition", "Clinical Finding", true))
        .concept(concept(400, "C400", "Allergic asthma", "SNOMED", "Condition", "Clinical Finding", true))
        .concept(concept(500, "C500", "Severe allergic asthma", "SNOMED", "Condition", "Clinical Finding", true))
        .concept(concept(666, "L666", "Asthma panel", "LOINC", "Condition", "Panel", false))
        .concept(concept(999, "J45", "Asthma ICD", "ICD10CM", "Condition", "3-char billing code", false))
        .concept(concept(777, "493", "Asthma old code", "ICD9CM", "Condition", "3-dig billing code", false))
        .concept(concept(1234, "C1234", "Chronic obstructive lung disease", "SNOMED", "Condition", "Clinical Finding", true))
        .concept(concept(50, "X50", "1234", "SNOMED", "Condition", "Clinical Finding", true))
        .relationship(999, rel::MAPS_TO, 300)
        .ancestor(100, 300, 2)
        .ancestor(200, 300, 1)
        .ancestor(300, 400, 1)
        .ancestor(300, 500, 2)
        .ancestor(300, 666, 1)
        .build()
}

/// Drug graph: an ATC anchor (id 1000) over ingredients, a combination drug,
/// a clinical drug with dose form and drug class edges, and a brand-name
/// descendant the refinement predicate rejects. Two further ATC anchors
/// (2000, 2100) share one combination descendant (2200).
pub fn drug_store() -> MemoryVocabularyStore {
    MemoryVocabularyStore::builder()
        .concept(concept(1000, "N02", "Analgesics", "ATC", "Drug", "ATC 3rd", false))
        .concept(concept(1100, "161", "Acetaminophen", "RxNorm", "Drug", "Ingredient", true))
        .concept(concept(1150, "2670", "Codeine", "RxNorm", "Drug", "Ingredient", true))
        .concept(concept(1200, "C1200", "Acetaminophen / Codeine", "RxNorm", "Drug", "Clinical Drug", true))
        .concept(concept(1400, "C1400", "Acetaminophen 325 MG Oral Tablet", "RxNorm", "Drug", "Clinical Drug", true))
        .concept(concept(1500, "C1500", "Oral Tablet", "RxNorm", "Drug", "Dose Form", false))
        .concept(concept(1700, "C1700", "Tylenol", "RxNorm", "Drug", "Brand Name", false))
        .concept(concept(1900, "C1900", "Isolated drug", "SPL", "Drug", "Prescription Drug", false))
        .concept(concept(2000, "N02A", "Opioid combinations", "ATC", "Drug", "ATC 4th", false))
        .concept(concept(2100, "R05F", "Cough preparations", "ATC", "Drug", "ATC 4th", false))
        .concept(concept(2200, "C2200", "Acetaminophen / Codeine Syrup", "RxNorm", "Drug", "Clinical Drug", true))
        .relationship(1200, rel::HAS_INGREDIENT, 1100)
        .relationship(1200, rel::HAS_INGREDIENT, 1150)
        .relationship(1400, rel::HAS_INGREDIENT, 1100)
        .relationship(1400, rel::HAS_DOSE_FORM, 1500)
        .relationship(1400, rel::HAS_DRUG_CLASS, 1000)
        .relationship(2200, rel::HAS_INGREDIENT, 1100)
        .relationship(2200, rel::HAS_INGREDIENT, 1150)
        .ancestor(1000, 1100, 1)
        .ancestor(1000, 1200, 1)
        .ancestor(1000, 1400, 2)
        .ancestor(1000, 1700, 1)
        .ancestor(2000, 2200, 1)
        .ancestor(2100, 2200, 1)
        .build()
}

/// Lab graph: a "Hemoglobin" anchor (id 3000) with two scale values, one
/// system, one time aspect, one property and one panel membership, plus the
/// three rollup tables.
pub fn lab_store() -> MemoryVocabularyStore {
    lab_store_builder()
        .rollup(RollupKind::Scale, "Ord", "Ordinal")
        .rollup(RollupKind::Scale, "Qn", "Quantitative")
        .rollup(RollupKind::System, "Bld", "Blood")
        .rollup(RollupKind::TimeAspect, "Pt", "Point in time")
        .build()
}

/// Same graph with no rollup source at all.
pub fn lab_store_without_rollups() -> MemoryVocabularyStore {
    lab_store_builder().build()
}

fn lab_store_builder() -> lexis::db::MemoryVocabularyBuilder {
    MemoryVocabularyStore::builder()
        .concept(concept(3000, "718-7", "Hemoglobin", "LOINC", "Measurement", "Lab Test", true))
        .concept(concept(3100, "LP-ORD", "Ord", "LOINC", "Meas Value", "Answer", false))
        .concept(concept(3200, "LP-QN", "Qn", "LOINC", "Meas Value", "Answer", false))
        .concept(concept(3300, "LP-BLD", "Bld", "LOINC", "Meas Value", "Answer", false))
        .concept(concept(3400, "LP-PT", "Pt", "LOINC", "Meas Value", "Answer", false))
        .concept(concept(3500, "LP-MASS", "Mass concentration", "LOINC", "Meas Value", "Answer", false))
        .concept(concept(3600, "57021-8", "CBC W Auto Differential panel", "LOINC", "Measurement", "Lab Test", true))
        .relationship(3000, rel::HAS_SCALE, 3100)
        .relationship(3000, rel::HAS_SCALE, 3200)
        .relationship(3000, rel::HAS_SYSTEM, 3300)
        .relationship(3000, rel::HAS_TIME_ASPECT, 3400)
        .relationship(3000, rel::HAS_PROPERTY, 3500)
        .relationship(3000, rel::CONTAINED_IN_PANEL, 3600)
}

pub async fn engine(
    store: MemoryVocabularyStore,
) -> Engine<MemoryVocabularyStore, MemoryCodeSetStore> {
    engine_with(store, EngineConfig::default()).await
}

pub async fn engine_with(
    store: MemoryVocabularyStore,
    config: EngineConfig,
) -> Engine<MemoryVocabularyStore, MemoryCodeSetStore> {
    Engine::new(store, MemoryCodeSetStore::default(), &config).await
}
