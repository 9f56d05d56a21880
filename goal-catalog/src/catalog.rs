//! Template catalog assembly and lookup.
//!
//! The catalog is the validated, indexed form of the template graph. It is
//! immutable once built and is meant to be shared (behind an `Arc`) by every
//! engine operation.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::templates::builtin_providers;
use crate::types::{GoalLevel, GoalTemplate};

/// Error types for catalog construction.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Two templates share an id
    #[error("Duplicate template id: {0}")]
    DuplicateTemplate(String),

    /// A parent id does not name any template
    #[error("Template {template} references unknown parent {parent}")]
    UnknownParent { template: String, parent: String },

    /// A parent is not exactly one level above its child
    #[error("Template {template} ({child_level}) cannot have parent {parent} ({parent_level})")]
    LevelMismatch {
        template: String,
        child_level: &'static str,
        parent: String,
        parent_level: &'static str,
    },

    /// A non-root template has no parent
    #[error("Template {0} is not reachable from a root")]
    Orphan(String),

    /// A root-level template lists parents
    #[error("Vision template {0} cannot have parents")]
    RootWithParent(String),

    /// Weight is negative or not finite
    #[error("Template {0} has an invalid weight")]
    InvalidWeight(String),

    /// Catalog file could not be parsed
    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// On-disk catalog layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogFile {
    templates: Vec<GoalTemplate>,
}

/// The validated template graph.
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    /// Templates in declaration order
    templates: Vec<GoalTemplate>,
    /// Template id -> position in `templates`
    index: HashMap<String, usize>,
    /// Parent id -> child positions, in declaration order
    children: HashMap<String, Vec<usize>>,
}

impl TemplateCatalog {
    /// Build and validate a catalog.
    pub fn new(templates: Vec<GoalTemplate>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(templates.len());
        for (position, template) in templates.iter().enumerate() {
            if index.insert(template.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateTemplate(template.id.clone()));
            }
        }

        let mut children: HashMap<String, Vec<usize>> = HashMap::new();
        for (position, template) in templates.iter().enumerate() {
            if !template.weight.is_finite() || template.weight < 0.0 {
                return Err(CatalogError::InvalidWeight(template.id.clone()));
            }

            match template.level.parent() {
                None if !template.parent_ids.is_empty() => {
                    return Err(CatalogError::RootWithParent(template.id.clone()));
                }
                None => continue,
                Some(_) if template.parent_ids.is_empty() => {
                    return Err(CatalogError::Orphan(template.id.clone()));
                }
                Some(expected) => {
                    // Duplicate parent entries collapse to one edge.
                    let mut seen = HashSet::new();
                    for parent_id in &template.parent_ids {
                        let parent = index
                            .get(parent_id)
                            .map(|&p| &templates[p])
                            .ok_or_else(|| CatalogError::UnknownParent {
                                template: template.id.clone(),
                                parent: parent_id.clone(),
                            })?;
                        if parent.level != expected {
                            return Err(CatalogError::LevelMismatch {
                                template: template.id.clone(),
                                child_level: template.level.as_str(),
                                parent: parent_id.clone(),
                                parent_level: parent.level.as_str(),
                            });
                        }
                        if seen.insert(parent_id.as_str()) {
                            children.entry(parent_id.clone()).or_default().push(position);
                        }
                    }
                }
            }
        }

        tracing::debug!(templates = templates.len(), "Template catalog assembled");

        Ok(Self {
            templates,
            index,
            children,
        })
    }

    /// The built-in catalog shipped with the engine.
    pub fn builtin() -> Result<Self, CatalogError> {
        let templates = builtin_providers()
            .into_iter()
            .flat_map(|provider| provider.templates())
            .collect();
        Self::new(templates)
    }

    /// Load a catalog from YAML (`templates: [...]`).
    pub fn from_yaml(yaml: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_yaml::from_str(yaml)?;
        Self::new(file.templates)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&CatalogFile {
            templates: self.templates.clone(),
        })
    }

    /// Look up a template by id.
    pub fn get(&self, id: &str) -> Option<&GoalTemplate> {
        self.index.get(id).map(|&position| &self.templates[position])
    }

    /// Whether a template id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Direct children of a template, in declaration order.
    pub fn children(&self, id: &str) -> impl Iterator<Item = &GoalTemplate> + '_ {
        self.children
            .get(id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(move |&position| &self.templates[position])
    }

    /// Root (vision) templates.
    pub fn roots(&self) -> impl Iterator<Item = &GoalTemplate> + '_ {
        self.templates.iter().filter(|t| t.is_root())
    }

    /// Templates at a given level.
    pub fn at_level(&self, level: GoalLevel) -> impl Iterator<Item = &GoalTemplate> + '_ {
        self.templates.iter().filter(move |t| t.level == level)
    }

    /// All templates in declaration order.
    pub fn templates(&self) -> &[GoalTemplate] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Total leaf weight an achievement can collect with every leaf active.
    pub fn achievement_capacity(&self, achievement_id: &str) -> f64 {
        self.children(achievement_id).map(|t| t.weight).sum()
    }

    /// SHA-256 of the catalog content, for audit and cache keys.
    pub fn fingerprint(&self) -> String {
        let json = serde_json::to_vec(&self.templates).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(&json);
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DisplayCategory, GoalNature, LifeArea};

    fn leaf(id: &str, parents: &[&str], weight: f64) -> GoalTemplate {
        GoalTemplate::leaf(
            id,
            id,
            LifeArea::Personal,
            parents,
            DisplayCategory::Other,
            GoalNature::Input,
            weight,
        )
    }

    fn small_graph() -> Vec<GoalTemplate> {
        vec![
            GoalTemplate::vision("l0", "Vision", LifeArea::Personal),
            GoalTemplate::big_goal("l1", "Big", LifeArea::Personal, &["l0"]),
            GoalTemplate::achievement("l2_a", "A", LifeArea::Personal, &["l1"]),
            GoalTemplate::achievement("l2_b", "B", LifeArea::Personal, &["l1"]),
            leaf("l3_x", &["l2_a", "l2_b"], 50.0),
            leaf("l3_y", &["l2_a"], 50.0),
        ]
    }

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = TemplateCatalog::builtin().unwrap();
        assert!(!catalog.is_empty());
        assert_eq!(catalog.roots().count(), 3);
        assert!(catalog.contains("l1_girlfriend"));

        for achievement in catalog.at_level(GoalLevel::Achievement) {
            let capacity = catalog.achievement_capacity(&achievement.id);
            assert!(
                (capacity - 100.0).abs() < 1e-9,
                "{} capacity {}",
                achievement.id,
                capacity
            );
        }
    }

    #[test]
    fn test_children_follow_declaration_order() {
        let catalog = TemplateCatalog::new(small_graph()).unwrap();
        let ids: Vec<_> = catalog.children("l2_a").map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["l3_x", "l3_y"]);
        let ids: Vec<_> = catalog.children("l2_b").map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["l3_x"]);
        assert_eq!(catalog.children("l3_x").count(), 0);
        assert_eq!(catalog.children("missing").count(), 0);
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let mut templates = small_graph();
        templates.push(leaf("l3_y", &["l2_b"], 10.0));
        assert!(matches!(
            TemplateCatalog::new(templates),
            Err(CatalogError::DuplicateTemplate(id)) if id == "l3_y"
        ));
    }

    #[test]
    fn test_rejects_unknown_parent_and_orphans() {
        let mut templates = small_graph();
        templates.push(leaf("l3_z", &["l2_missing"], 10.0));
        assert!(matches!(
            TemplateCatalog::new(templates),
            Err(CatalogError::UnknownParent { .. })
        ));

        let mut templates = small_graph();
        templates.push(leaf("l3_z", &[], 10.0));
        assert!(matches!(
            TemplateCatalog::new(templates),
            Err(CatalogError::Orphan(_))
        ));
    }

    #[test]
    fn test_rejects_level_skips() {
        let mut templates = small_graph();
        // A leaf hanging directly off a big goal skips the achievement level.
        templates.push(leaf("l3_z", &["l1"], 10.0));
        assert!(matches!(
            TemplateCatalog::new(templates),
            Err(CatalogError::LevelMismatch { .. })
        ));
    }

    #[test]
    fn test_yaml_roundtrip_keeps_fingerprint() {
        let catalog = TemplateCatalog::new(small_graph()).unwrap();
        let yaml = catalog.to_yaml().unwrap();
        let parsed = TemplateCatalog::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.len(), catalog.len());
        assert_eq!(parsed.fingerprint(), catalog.fingerprint());
        assert_eq!(catalog.fingerprint().len(), 64);
    }

    #[test]
    fn test_minimal_yaml() {
        let yaml = r#"
templates:
  - id: l0_v
    title: Vision
    level: 0
    life_area: personal
  - id: l1_b
    title: Big
    level: 1
    parent_ids: [l0_v]
    life_area: personal
"#;
        let catalog = TemplateCatalog::from_yaml(yaml).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("l1_b").unwrap().level, GoalLevel::BigGoal);
    }
}
