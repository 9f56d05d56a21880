//! Goal Engine - hierarchy, progress and pacing for coaching goals
//!
//! Turns the template catalog into per-user goal trees and computes
//! everything derived from them:
//!
//! - **Tree generation**: one pick expands into a parent-first batch of inserts
//! - **Milestone curves**: tension-shaped, pinnable pacing of cumulative goals
//! - **Progress rollups**: weighted achievement progress and badge tiers
//! - **Linked metrics**: goal values driven by tracked counters
//! - **Phase detection**: lifecycle transitions from snapshot history
//! - **Reviews**: weekly and monthly summaries
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          GoalEngine                          │
//! │                                                              │
//! │  TemplateCatalog ──▶ tree ──▶ GoalStore ──▶ progress/groups │
//! │                                   │             ▲           │
//! │                                   ▼             │           │
//! │                          analysis (phases) ◀── metrics      │
//! │                                   │                          │
//! │                                   ▼                          │
//! │                                review                        │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod analysis;
pub mod config;
pub mod curve;
pub mod engine;
pub mod metrics;
pub mod progress;
pub mod review;
pub mod store;
pub mod tree;
pub mod types;

// Re-export main types
pub use config::EngineConfig;
pub use engine::GoalEngine;
pub use store::{GoalStore, InMemoryGoalStore, StoreError};
pub use types::*;
