//! URL template rendering
//!
//! URL templates use Jinja syntax. Two generations of templates are in use and
//! both are supported side by side:
//!
//! - **Wrapped**: the template refers to the record through a single `entity`
//!   variable, e.g. `http://svc/{{ entity._id }}`.
//! - **Direct**: the template refers to the record's fields directly,
//!   e.g. `http://svc/{{ _id }}`.
//!
//! The convention is picked by looking at the template's free variables: a
//! template whose only free variable is `entity` is rendered wrapped,
//! anything else direct. Detections are kept in a bounded cache keyed by
//! template text; templates carry caller-supplied paths and overrides, so the
//! key space is open-ended.

use crate::domain::{Entity, Result};
use minijinja::{context, Environment};
use moka::sync::Cache;

/// Name bound to the whole entity in wrapped templates
pub const ENTITY_VARIABLE: &str = "entity";

/// Maximum number of template texts whose convention is remembered
pub const CONVENTION_CACHE_CAPACITY: u64 = 1024;

/// How an entity is exposed to a template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convention {
    /// Entity bound to [`ENTITY_VARIABLE`]
    Wrapped,
    /// Entity fields are the template context
    Direct,
}

/// Renders URL templates against entities
///
/// # Example
///
/// ```
/// use transform_relay::adapters::template::UrlRenderer;
///
/// let renderer = UrlRenderer::new();
/// let entity = serde_json::json!({"_id": "42"}).as_object().unwrap().clone();
///
/// assert_eq!(renderer.render("http://svc/{{ entity._id }}", &entity).unwrap(), "http://svc/42");
/// assert_eq!(renderer.render("http://svc/{{ _id }}", &entity).unwrap(), "http://svc/42");
/// ```
pub struct UrlRenderer {
    env: Environment<'static>,
    conventions: Cache<String, Convention>,
}

impl UrlRenderer {
    pub fn new() -> Self {
        Self {
            env: Environment::new(),
            conventions: Cache::builder()
                .max_capacity(CONVENTION_CACHE_CAPACITY)
                .build(),
        }
    }

    /// Determines (and caches) the convention a template is written in
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Render` if the template does not parse
    pub fn convention(&self, template: &str) -> Result<Convention> {
        if let Some(convention) = self.conventions.get(template) {
            return Ok(convention);
        }

        let compiled = self.env.template_from_str(template)?;
        let variables = compiled.undeclared_variables(false);
        let convention = if variables.len() == 1 && variables.contains(ENTITY_VARIABLE) {
            Convention::Wrapped
        } else {
            Convention::Direct
        };

        tracing::debug!(template = %template, ?convention, "Detected URL template convention");

        self.conventions.insert(template.to_string(), convention);

        Ok(convention)
    }

    /// Renders a template against an entity using its detected convention
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Render` if the template is invalid or rendering fails
    pub fn render(&self, template: &str, entity: &Entity) -> Result<String> {
        let convention = self.convention(template)?;
        self.render_with(convention, template, entity)
    }

    /// Renders a template with an explicitly chosen convention
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Render` if the template is invalid or rendering fails
    pub fn render_with(
        &self,
        convention: Convention,
        template: &str,
        entity: &Entity,
    ) -> Result<String> {
        let compiled = self.env.template_from_str(template)?;
        let rendered = match convention {
            Convention::Wrapped => compiled.render(context! { entity => entity })?,
            Convention::Direct => compiled.render(entity)?,
        };
        Ok(rendered)
    }
}

impl Default for UrlRenderer {
    fn default() -> Self {
        Self::new()
    }
}
