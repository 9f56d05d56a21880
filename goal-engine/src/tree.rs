//! Goal tree generation.
//!
//! Expands one picked template into the ordered batch of goal inserts that
//! make up the user's tree. Rows reference each other through temporary ids
//! (`__temp_<template_id>`); every parent row is emitted before its children,
//! so the persistence layer can rewrite foreign keys in a single pass.

use std::collections::{HashMap, HashSet, VecDeque};

use chrono::Utc;
use tracing::debug;

use goal_catalog::{GoalTemplate, TemplateCatalog};

use crate::types::{EngineError, GoalInsert, GoalInstance, Result};

/// Expand a picked template into its full tree of inserts.
///
/// Breadth-first from the pick. A template reachable along several paths is
/// emitted once, under the first parent that reaches it. Unknown ids yield an
/// empty batch.
pub fn generate_tree(catalog: &TemplateCatalog, picked_template_id: &str) -> Vec<GoalInsert> {
    let Some(root) = catalog.get(picked_template_id) else {
        debug!(template_id = %picked_template_id, "Unknown template picked, nothing to generate");
        return Vec::new();
    };

    let mut inserts = Vec::new();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<(&GoalTemplate, Option<String>, i32)> = VecDeque::new();

    visited.insert(root.id.as_str());
    queue.push_back((root, None, 0));

    while let Some((template, temp_parent_id, position)) = queue.pop_front() {
        let insert = GoalInsert::from_template(template, temp_parent_id, position);

        let mut child_position = 0;
        for child in catalog.children(&template.id) {
            if visited.insert(child.id.as_str()) {
                queue.push_back((child, Some(insert.temp_id.clone()), child_position));
                child_position += 1;
            }
        }

        inserts.push(insert);
    }

    debug!(
        template_id = %picked_template_id,
        rows = inserts.len(),
        "Generated goal tree"
    );

    inserts
}

/// Rewrite a generated batch into goal rows with real ids.
///
/// `assigned_ids` maps each insert's temp id to the id persistence gave it.
/// Fails if an insert has no assigned id or references a parent that was not
/// emitted before it.
pub fn resolve_inserts(
    user_id: &str,
    inserts: &[GoalInsert],
    assigned_ids: &HashMap<String, String>,
) -> Result<Vec<GoalInstance>> {
    let created_at = Utc::now();
    let mut resolved: HashMap<&str, &str> = HashMap::with_capacity(inserts.len());
    let mut rows = Vec::with_capacity(inserts.len());

    for insert in inserts {
        let id = assigned_ids
            .get(&insert.temp_id)
            .ok_or_else(|| EngineError::MissingAssignedId(insert.temp_id.clone()))?;

        let parent_goal_id = match &insert.temp_parent_id {
            None => None,
            Some(temp_parent_id) => Some(
                resolved
                    .get(temp_parent_id.as_str())
                    .map(|real| real.to_string())
                    .ok_or_else(|| EngineError::UnresolvedParent {
                        temp_id: insert.temp_id.clone(),
                        temp_parent_id: temp_parent_id.clone(),
                    })?,
            ),
        };

        resolved.insert(insert.temp_id.as_str(), id.as_str());
        rows.push(GoalInstance::from_insert(
            insert,
            id.clone(),
            user_id,
            parent_goal_id,
            created_at,
        ));
    }

    Ok(rows)
}
