//! Data model - vocabulary graph records and code-set types

pub mod codeset;
pub mod concept;

pub use codeset::{
    BuildParams, BuildType, CodeSetPayload, CodeSetRow, ComboClass, ComboFilter, DrugAttributes,
    LabAttributes, SavedCodeSet, SourceType,
};
pub use concept::{Anchor, AncestorEdge, Concept, Relationship};
