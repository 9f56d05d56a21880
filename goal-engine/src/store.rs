//! Persistence contract for goal rows and snapshots.
//!
//! The engine never talks to a database directly. Callers hand it a
//! [`GoalStore`]; [`InMemoryGoalStore`] backs tests and local tooling.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::tree::resolve_inserts;
use crate::types::{GoalInsert, GoalInstance, ProgressSnapshot};

/// Error types for persistence operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// Backend is not reachable
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Batch rejected before anything was written
    #[error("Invalid batch: {0}")]
    InvalidBatch(String),

    /// Referenced row does not exist
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Storage for one user's goals and their snapshot history.
#[async_trait]
pub trait GoalStore: Send + Sync {
    /// Persist a generated tree atomically.
    ///
    /// Assigns real ids, rewrites temp parent references and returns the
    /// stored rows in batch order. Nothing is written if any row fails.
    async fn insert_tree(
        &self,
        user_id: &str,
        inserts: &[GoalInsert],
    ) -> Result<Vec<GoalInstance>, StoreError>;

    /// All goals of a user, archived ones included.
    async fn list_goals(&self, user_id: &str) -> Result<Vec<GoalInstance>, StoreError>;

    /// Snapshots of the user's goals dated `since` or later.
    async fn snapshot_history(
        &self,
        user_id: &str,
        since: NaiveDate,
    ) -> Result<Vec<ProgressSnapshot>, StoreError>;
}

/// In-memory store.
#[derive(Clone, Default)]
pub struct InMemoryGoalStore {
    /// Goals keyed by user id
    goals: Arc<RwLock<HashMap<String, Vec<GoalInstance>>>>,
    snapshots: Arc<RwLock<Vec<ProgressSnapshot>>>,
}

impl InMemoryGoalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a single goal as-is (custom goals, fixtures).
    pub async fn insert_goal(&self, goal: GoalInstance) {
        let mut goals = self.goals.write().await;
        goals.entry(goal.user_id.clone()).or_default().push(goal);
    }

    /// Replace a stored goal with the same id.
    pub async fn update_goal(&self, goal: GoalInstance) -> Result<(), StoreError> {
        let mut goals = self.goals.write().await;
        let slot = goals
            .get_mut(&goal.user_id)
            .and_then(|rows| rows.iter_mut().find(|g| g.id == goal.id))
            .ok_or_else(|| StoreError::NotFound(goal.id.clone()))?;
        *slot = goal;
        Ok(())
    }

    /// Record a daily snapshot, replacing one for the same goal and day.
    pub async fn record_snapshot(&self, snapshot: ProgressSnapshot) {
        let mut snapshots = self.snapshots.write().await;
        snapshots.retain(|s| {
            !(s.goal_id == snapshot.goal_id && s.snapshot_date == snapshot.snapshot_date)
        });
        snapshots.push(snapshot);
    }

    fn check_batch(inserts: &[GoalInsert]) -> Result<(), StoreError> {
        let mut temp_ids = HashSet::new();
        for insert in inserts {
            if !temp_ids.insert(insert.temp_id.as_str()) {
                return Err(StoreError::InvalidBatch(format!(
                    "duplicate temp id {}",
                    insert.temp_id
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl GoalStore for InMemoryGoalStore {
    async fn insert_tree(
        &self,
        user_id: &str,
        inserts: &[GoalInsert],
    ) -> Result<Vec<GoalInstance>, StoreError> {
        Self::check_batch(inserts)?;

        let assigned: HashMap<String, String> = inserts
            .iter()
            .map(|i| (i.temp_id.clone(), Uuid::new_v4().to_string()))
            .collect();
        let rows = resolve_inserts(user_id, inserts, &assigned)
            .map_err(|e| StoreError::InvalidBatch(e.to_string()))?;

        let mut goals = self.goals.write().await;
        goals
            .entry(user_id.to_string())
            .or_default()
            .extend(rows.iter().cloned());

        debug!(user_id = %user_id, rows = rows.len(), "Inserted goal tree");
        Ok(rows)
    }

    async fn list_goals(&self, user_id: &str) -> Result<Vec<GoalInstance>, StoreError> {
        let goals = self.goals.read().await;
        Ok(goals.get(user_id).cloned().unwrap_or_default())
    }

    async fn snapshot_history(
        &self,
        user_id: &str,
        since: NaiveDate,
    ) -> Result<Vec<ProgressSnapshot>, StoreError> {
        let goals = self.goals.read().await;
        let owned: HashSet<&str> = goals
            .get(user_id)
            .map(|rows| rows.iter().map(|g| g.id.as_str()).collect())
            .unwrap_or_default();

        let snapshots = self.snapshots.read().await;
        let mut history: Vec<ProgressSnapshot> = snapshots
            .iter()
            .filter(|s| s.snapshot_date >= since && owned.contains(s.goal_id.as_str()))
            .cloned()
            .collect();
        history.sort_by(|a, b| {
            (a.snapshot_date, &a.goal_id).cmp(&(b.snapshot_date, &b.goal_id))
        });
        Ok(history)
    }
}
