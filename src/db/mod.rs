//! Storage layer - repositories and backend traits

pub mod codesets;
pub mod memory;
pub mod traits;
pub mod vocabulary;

pub use codesets::PgCodeSetStore;
pub use memory::{MemoryCodeSetStore, MemoryVocabularyBuilder, MemoryVocabularyStore};
pub use traits::{CodeSetStore, RollupKind, VocabularyStore};
pub use vocabulary::PgVocabularyStore;
