//! Capabilities supplied by the host application.
//!
//! The notices can be shown inside two host flavours: the domain-hosting
//! panel, where the viewer's link target is one of their domains, and the
//! multi-server manager, where it is one of the managed servers. Both sit
//! behind [`HostContext`].

mod domains;
mod servers;

pub use domains::*;
pub use servers::*;

use crate::models::Role;

/// Placeholder in link templates replaced by the target entity id.
pub const ID_PLACEHOLDER: &str = "$ID";

pub trait HostContext {
    /// Role of the user viewing the notices, if known.
    fn current_viewer_role(&self) -> Option<Role>;

    /// Entity to link to when the caller supplied none. `manager_scope` is
    /// the descriptor's server-kind constraint, if any.
    fn default_target_entity(&self, manager_scope: Option<&str>) -> Option<String>;

    /// Expand a link template for `entity`. Returns `None` when the template
    /// needs an entity and none is available.
    fn resolve_link(&self, template: &str, entity: Option<&str>) -> Option<String>;
}

/// Prefix relative templates with the owning module's base path.
pub fn module_link(module: &str, template: &str) -> String {
    if template.starts_with('/') || template.contains("://") {
        template.to_string()
    } else {
        format!("/{}/{}", module, template)
    }
}

/// Replace each `(placeholder, value)` pair in `template`.
fn substitute(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter()
        .fold(template.to_string(), |acc, (key, value)| acc.replace(key, value))
}
