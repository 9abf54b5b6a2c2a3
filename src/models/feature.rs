use serde::{Deserialize, Serialize};

use super::Version;

/// The access tier of a viewer.
///
/// - `Master`: primary administrator of the whole system
/// - `Reseller`: reseller administrator managing a group of tenants
/// - `Owner`: tenant (domain) owner
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Master,
    Reseller,
    Owner,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Master, Role::Reseller, Role::Owner];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Master => "master",
            Self::Reseller => "reseller",
            Self::Owner => "owner",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "master" => Some(Self::Master),
            "reseller" => Some(Self::Reseller),
            "owner" | "domain" => Some(Self::Owner),
            _ => None,
        }
    }

    /// Parse a comma-separated role list, ignoring unknown names.
    pub fn parse_list(s: &str) -> Vec<Role> {
        s.split(',').filter_map(Role::from_str).collect()
    }
}

/// A single "what's new" entry for one module release.
///
/// Descriptors are read-only: they are published alongside a release and
/// never modified by this crate. `module` and `version` are not stored in
/// the entry itself; the store stamps them on from the location the entry
/// was read from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureDescriptor {
    /// Unique within one (module, version); its numeric value orders
    /// descriptors newest-first.
    pub id: String,
    pub module: String,
    pub version: Version,
    pub short_description: String,
    /// Pre-rendered markup for the long description.
    pub long_description: Option<String>,
    /// Roles this feature is relevant to.
    pub visibility: Vec<Role>,
    /// Hidden when the running host platform is older than this.
    pub min_host_version: Option<Version>,
    /// Link target, optionally containing the `$ID` placeholder. Relative
    /// templates resolve under the owning module's base path.
    pub link_template: Option<String>,
    /// Remote server kind the link applies to, for multi-server setups.
    pub manager_scope: Option<String>,
}

impl FeatureDescriptor {
    pub fn visible_to(&self, role: Role) -> bool {
        self.visibility.contains(&role)
    }

    /// Leading numeric value of `id`, or 0 when it has none.
    pub fn sort_key(&self) -> f64 {
        numeric_prefix(&self.id)
    }
}

/// Numeric value of the leading `digits[.digits]` portion of a string.
fn numeric_prefix(s: &str) -> f64 {
    let s = s.trim_start();
    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in s.char_indices() {
        if c.is_ascii_digit() {
            end = i + 1;
        } else if c == '.' && !seen_dot {
            seen_dot = true;
        } else {
            break;
        }
    }
    s[..end].parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_prefix() {
        assert_eq!(numeric_prefix("12"), 12.0);
        assert_eq!(numeric_prefix("3-backups"), 3.0);
        assert_eq!(numeric_prefix("1.5x"), 1.5);
        assert_eq!(numeric_prefix("10.2.3"), 10.2);
        assert_eq!(numeric_prefix("ssl"), 0.0);
        assert_eq!(numeric_prefix(""), 0.0);
    }

    #[test]
    fn test_role_list_parsing() {
        assert_eq!(
            Role::parse_list("master, owner,bogus"),
            vec![Role::Master, Role::Owner]
        );
        assert!(Role::parse_list("").is_empty());
    }
}
