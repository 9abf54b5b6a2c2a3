//! Notices shown to a viewer: the resolver's descriptors, gated by the role
//! allowlist, with links resolved through the host flavour.

use crate::error::Result;
use crate::host::{module_link, HostContext};
use crate::ledger::AckStore;
use crate::models::*;
use crate::resolver::Resolver;
use crate::store::FeatureSource;

pub struct Notifier<F, S> {
    resolver: Resolver<F, S>,
    allowed_roles: Vec<Role>,
    host_version: Version,
}

impl<F: FeatureSource, S: AckStore> Notifier<F, S> {
    pub fn new(resolver: Resolver<F, S>, allowed_roles: Vec<Role>, host_version: Version) -> Self {
        Self {
            resolver,
            allowed_roles,
            host_version,
        }
    }

    pub fn resolver(&self) -> &Resolver<F, S> {
        &self.resolver
    }

    /// Whether viewers with this role may see notices at all.
    pub fn role_allowed(&self, role: Option<Role>) -> bool {
        role.is_some_and(|r| self.allowed_roles.contains(&r))
    }

    /// Notices for `user`, oldest release block first.
    ///
    /// Storage failures are logged and reported as "nothing new"; this is an
    /// informational feature and must never break the page showing it.
    pub fn notices(
        &self,
        user: &str,
        modules: &[ModuleVersionInfo],
        host: &dyn HostContext,
        target: Option<&str>,
    ) -> Vec<Notice> {
        match self.try_notices(user, modules, host, target) {
            Ok(notices) => notices,
            Err(e) => {
                tracing::warn!("Failed to load notices for {}: {}", user, e);
                Vec::new()
            }
        }
    }

    /// Like [`Self::notices`], but propagating failures.
    pub fn try_notices(
        &self,
        user: &str,
        modules: &[ModuleVersionInfo],
        host: &dyn HostContext,
        target: Option<&str>,
    ) -> Result<Vec<Notice>> {
        let role = host.current_viewer_role();
        if !self.role_allowed(role) {
            tracing::debug!("Role {:?} of {} may not see notices", role, user);
            return Ok(Vec::new());
        }

        let features =
            self.resolver
                .renderable_features(user, modules, role, self.host_version)?;

        Ok(features
            .into_iter()
            .map(|f| {
                let title = modules
                    .iter()
                    .find(|m| m.name == f.module)
                    .map(|m| m.display_title())
                    .unwrap_or(f.module.as_str());
                let heading = format!("{} {}", title, f.version);
                let link = resolve_link(host, &f, target);
                Notice {
                    id: f.id,
                    module: f.module,
                    version: f.version,
                    heading,
                    short_description: f.short_description,
                    long_description: f.long_description,
                    link,
                }
            })
            .collect())
    }
}

fn resolve_link(
    host: &dyn HostContext,
    feature: &FeatureDescriptor,
    target: Option<&str>,
) -> Option<String> {
    let template = feature.link_template.as_deref()?;
    let template = module_link(&feature.module, template);
    let entity = match target {
        Some(t) => Some(t.to_string()),
        None => host.default_target_entity(feature.manager_scope.as_deref()),
    };
    host.resolve_link(&template, entity.as_deref())
}
