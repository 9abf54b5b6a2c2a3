use serde::{Deserialize, Serialize};

use super::{substitute, HostContext, ID_PLACEHOLDER};
use crate::models::Role;

/// Placeholder replaced by the managed server's hostname.
pub const HOST_PLACEHOLDER: &str = "$HOST";

/// Liveness status of a managed server, declared in ranking order from best
/// to worst so the derived `Ord` is the ranking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ServerStatus {
    NoHost,
    Down,
    Paused,
    NoSsh,
    Alive,
    NoSshLogin,
    NoWebminLogin,
    NoWebmin,
    WebminDown,
    NoVirt,
    Virt,
}

/// A server in the multi-server directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManagedServer {
    pub id: String,
    pub host: String,
    /// Server kind, matched against a descriptor's manager scope.
    pub kind: String,
    pub status: ServerStatus,
}

/// Best-ranked server of the given kind. Ties keep directory order.
pub fn best_server<'a>(servers: &'a [ManagedServer], kind: &str) -> Option<&'a ManagedServer> {
    servers
        .iter()
        .filter(|s| s.kind == kind)
        .min_by_key(|s| s.status)
}

/// Host flavour for the multi-server manager.
#[derive(Debug, Clone, Default)]
pub struct ServerManagerHost {
    pub role: Option<Role>,
    pub servers: Vec<ManagedServer>,
}

impl ServerManagerHost {
    pub fn new(role: Option<Role>, servers: Vec<ManagedServer>) -> Self {
        Self { role, servers }
    }
}

impl HostContext for ServerManagerHost {
    fn current_viewer_role(&self) -> Option<Role> {
        self.role
    }

    /// Only manager-scoped descriptors get a default server.
    fn default_target_entity(&self, manager_scope: Option<&str>) -> Option<String> {
        let kind = manager_scope?;
        best_server(&self.servers, kind).map(|s| s.id.clone())
    }

    fn resolve_link(&self, template: &str, entity: Option<&str>) -> Option<String> {
        let needs_entity =
            template.contains(ID_PLACEHOLDER) || template.contains(HOST_PLACEHOLDER);
        let Some(id) = entity else {
            return (!needs_entity).then(|| template.to_string());
        };
        let host = self
            .servers
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.host.as_str())
            .unwrap_or(id);
        Some(substitute(
            template,
            &[(ID_PLACEHOLDER, id), (HOST_PLACEHOLDER, host)],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(id: &str, kind: &str, status: ServerStatus) -> ManagedServer {
        ManagedServer {
            id: id.to_string(),
            host: format!("{}.example.net", id),
            kind: kind.to_string(),
            status,
        }
    }

    #[test]
    fn test_status_ranking_order() {
        use ServerStatus::*;
        let ranked = [
            NoHost,
            Down,
            Paused,
            NoSsh,
            Alive,
            NoSshLogin,
            NoWebminLogin,
            NoWebmin,
            WebminDown,
            NoVirt,
            Virt,
        ];
        assert!(ranked.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(
            serde_json::to_string(&NoWebminLogin).unwrap(),
            "\"no-webmin-login\""
        );
    }

    #[test]
    fn test_best_server_filters_by_kind() {
        let servers = vec![
            server("a", "kvm", ServerStatus::Virt),
            server("b", "xen", ServerStatus::Down),
            server("c", "kvm", ServerStatus::Alive),
            server("d", "kvm", ServerStatus::Alive),
        ];
        assert_eq!(best_server(&servers, "kvm").map(|s| s.id.as_str()), Some("c"));
        assert_eq!(best_server(&servers, "xen").map(|s| s.id.as_str()), Some("b"));
        assert!(best_server(&servers, "lxc").is_none());
    }

    #[test]
    fn test_default_target_only_for_scoped_links() {
        let host = ServerManagerHost::new(
            Some(Role::Master),
            vec![server("a", "kvm", ServerStatus::Virt)],
        );
        assert_eq!(host.default_target_entity(None), None);
        assert_eq!(host.default_target_entity(Some("kvm")), Some("a".to_string()));
    }

    #[test]
    fn test_resolve_link_substitutes_host() {
        let host = ServerManagerHost::new(None, vec![server("a", "kvm", ServerStatus::Virt)]);
        assert_eq!(
            host.resolve_link("https://$HOST:10000/?id=$ID", Some("a")).as_deref(),
            Some("https://a.example.net:10000/?id=a")
        );
    }
}
