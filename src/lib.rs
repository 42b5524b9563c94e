//! Clinical vocabulary code-set engine
//!
//! A hierarchy-resolution and code-set build engine over a standardized
//! clinical vocabulary graph:
//! - Ranked concept search with standard-concept resolution
//! - Bidirectional transitive hierarchy expansion
//! - Hierarchical / direct / lab-test build strategies with deduplication
//! - Lab attribute rollup normalization
//! - Materialize-vs-anchor-only persistence for saved code sets

// Allow clippy lints that are acceptable for this domain-specific codebase
#![allow(
    clippy::too_many_arguments, // Functions with many args are acceptable for domain operations
    clippy::type_complexity     // Complex types are acceptable when they represent domain concepts
)]

pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;

pub use config::Config;
pub use engine::Engine;
pub use error::{Error, Result};
