//! Goal Template Graph
//!
//! This crate holds the static catalog that every personalized goal tree is
//! generated from. Templates form a four-level DAG:
//!
//! - **L0 Vision**: aspirational direction for a life area
//! - **L1 Big goal**: a concrete ambition under a vision
//! - **L2 Achievement**: a badge whose progress is a weighted rollup
//! - **L3 Leaf**: a trackable goal carrying target, curve and metric defaults
//!
//! Leaves may belong to several achievements; the catalog stores explicit
//! parent-id lists and a child adjacency index instead of nested objects.
//!
//! # Key Components
//!
//! - [`TemplateCatalog`]: validated, indexed graph (built-in or loaded from YAML)
//! - [`TemplateProvider`]: per-life-area template sets
//! - [`GoalTemplate`]: a single node with its instance defaults
//!
//! # Example
//!
//! ```ignore
//! use goal_catalog::TemplateCatalog;
//!
//! let catalog = TemplateCatalog::builtin()?;
//! for achievement in catalog.children("l1_girlfriend") {
//!     println!("{} -> {} leaves", achievement.id, catalog.children(&achievement.id).count());
//! }
//! ```

pub mod catalog;
pub mod templates;
pub mod types;

// Re-export main types
pub use catalog::{CatalogError, TemplateCatalog};
pub use templates::TemplateProvider;
pub use types::*;
