use serde::{Deserialize, Serialize};

use super::{substitute, HostContext, ID_PLACEHOLDER};
use crate::models::Role;

/// Placeholder replaced by the domain name.
pub const DOMAIN_PLACEHOLDER: &str = "$DOM";

/// A hosted domain the viewer can manage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HostedDomain {
    pub id: String,
    pub name: String,
}

/// Host flavour for the domain-hosting panel.
#[derive(Debug, Clone, Default)]
pub struct DomainHost {
    pub role: Option<Role>,
    /// Domains visible to the viewer, in the panel's listing order.
    pub domains: Vec<HostedDomain>,
}

impl DomainHost {
    pub fn new(role: Option<Role>, domains: Vec<HostedDomain>) -> Self {
        Self { role, domains }
    }
}

impl HostContext for DomainHost {
    fn current_viewer_role(&self) -> Option<Role> {
        self.role
    }

    // Manager scopes only exist on multi-server installs.
    fn default_target_entity(&self, _manager_scope: Option<&str>) -> Option<String> {
        self.domains.first().map(|d| d.id.clone())
    }

    fn resolve_link(&self, template: &str, entity: Option<&str>) -> Option<String> {
        let needs_entity =
            template.contains(ID_PLACEHOLDER) || template.contains(DOMAIN_PLACEHOLDER);
        let Some(id) = entity else {
            return (!needs_entity).then(|| template.to_string());
        };
        let name = self
            .domains
            .iter()
            .find(|d| d.id == id)
            .map(|d| d.name.as_str())
            .unwrap_or(id);
        Some(substitute(
            template,
            &[(ID_PLACEHOLDER, id), (DOMAIN_PLACEHOLDER, name)],
        ))
    }
}
