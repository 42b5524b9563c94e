//! Domain-vocabulary scoping policy
//!
//! One policy object answers both scoping questions: which vocabularies a
//! domain admits, and whether a drug concept's class is admitted. Every
//! scoping site (resolver, expander, builder) calls the same predicate so
//! the call sites cannot drift apart.

use crate::models::{concept::domain, Concept};

const CONDITION_VOCABULARIES: &[&str] = &["ICD10CM", "SNOMED", "ICD9CM"];
const DRUG_VOCABULARIES: &[&str] = &["RxNorm", "NDC", "CPT4", "CVX", "HCPCS", "ATC"];
const MEASUREMENT_VOCABULARIES: &[&str] = &["LOINC", "CPT4", "SNOMED", "HCPCS"];
const PROCEDURE_VOCABULARIES: &[&str] = &[
    "CPT4", "HCPCS", "SNOMED", "ICD9PCS", "LOINC", "ICD10PCS",
];
const OBSERVATION_VOCABULARIES: &[&str] = &["LOINC", "SNOMED", "CPT4", "HCPCS"];
const DEVICE_VOCABULARIES: &[&str] = &["SNOMED", "HCPCS", "CPT4"];

/// Drug concept classes admitted by the refinement predicate.
const DRUG_CLASSES: &[&str] = &[
    "Clinical Drug",
    "Branded Drug",
    "Ingredient",
    "Clinical Pack",
    "Branded Pack",
    "Quant Clinical Drug",
    "Quant Branded Drug",
    "11-digit NDC",
    "ATC 1st",
    "ATC 2nd",
    "ATC 3rd",
    "ATC 4th",
    "ATC 5th",
];

pub struct DomainPolicy;

impl DomainPolicy {
    /// Vocabularies admitted for a domain. Unknown domains admit nothing.
    pub fn allowed_vocabularies(domain_id: &str) -> &'static [&'static str] {
        match domain_id {
            domain::CONDITION => CONDITION_VOCABULARIES,
            domain::DRUG => DRUG_VOCABULARIES,
            domain::MEASUREMENT => MEASUREMENT_VOCABULARIES,
            domain::PROCEDURE => PROCEDURE_VOCABULARIES,
            domain::OBSERVATION => OBSERVATION_VOCABULARIES,
            domain::DEVICE => DEVICE_VOCABULARIES,
            _ => &[],
        }
    }

    /// The single scoping predicate: vocabulary membership for the domain,
    /// plus the drug class refinement when the domain is Drug.
    pub fn admits(domain_id: &str, concept: &Concept) -> bool {
        let vocabularies = Self::allowed_vocabularies(domain_id);
        if !vocabularies.contains(&concept.vocabulary_id.as_str()) {
            return false;
        }

        if domain_id == domain::DRUG {
            Self::admits_drug_class(concept)
        } else {
            true
        }
    }

    fn admits_drug_class(concept: &Concept) -> bool {
        concept.vocabulary_id == "ATC"
            || DRUG_CLASSES.contains(&concept.concept_class_id.as_str())
    }
}
