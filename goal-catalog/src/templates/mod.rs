//! Built-in goal templates.
//!
//! Each life area provides its own slice of the graph. Parent ids may point
//! into another provider's slice; they are resolved once the catalog is
//! assembled.

pub mod dating;
pub mod health;
pub mod social;

pub use dating::DatingTemplates;
pub use health::HealthTemplates;
pub use social::SocialTemplates;

use crate::types::{GoalTemplate, LifeArea};

/// Trait for life-area template sets.
pub trait TemplateProvider: Send + Sync {
    /// Life area the templates belong to
    fn life_area(&self) -> LifeArea;

    /// Templates in declaration order (children follow this order)
    fn templates(&self) -> Vec<GoalTemplate>;
}

/// All built-in providers in catalog order.
pub fn builtin_providers() -> Vec<Box<dyn TemplateProvider>> {
    vec![
        Box::new(DatingTemplates),
        Box::new(SocialTemplates),
        Box::new(HealthTemplates),
    ]
}
