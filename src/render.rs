//! Plain-text rendering of notices, grouped under release headings.

use crate::models::{Notice, Version};

/// Render notices as a tree, one heading per release.
///
/// Example output:
/// ```text
/// Virtualmin 7.2
/// ├── Let's Encrypt DNS validation
/// │   → /virtual-server/edit_newssl.cgi?dom=1001
/// └── Encrypted backups
/// Nginx 3.4
/// └── HTTP/3 support
/// ```
pub fn render_notices(notices: &[Notice]) -> String {
    let mut output = String::new();
    for group in group_by_release(notices) {
        output.push_str(&group[0].heading);
        output.push('\n');
        for (i, notice) in group.iter().enumerate() {
            let is_last = i == group.len() - 1;
            output.push_str(if is_last { "└── " } else { "├── " });
            output.push_str(&notice.short_description);
            output.push('\n');
            if let Some(link) = &notice.link {
                output.push_str(if is_last { "    → " } else { "│   → " });
                output.push_str(link);
                output.push('\n');
            }
        }
    }
    output
}

/// Split into runs of consecutive notices from the same release.
///
/// Each run is keyed by the notice's own module and version, so two modules
/// sharing a version number still get separate headings.
fn group_by_release(notices: &[Notice]) -> Vec<&[Notice]> {
    let mut groups = Vec::new();
    let mut start = 0;
    let mut current: Option<(&str, Version)> = None;
    for (i, notice) in notices.iter().enumerate() {
        let key = (notice.module.as_str(), notice.version);
        if current.is_some_and(|c| c != key) {
            groups.push(&notices[start..i]);
            start = i;
        }
        current = Some(key);
    }
    if start < notices.len() {
        groups.push(&notices[start..]);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notice(module: &str, version: &str, short: &str, link: Option<&str>) -> Notice {
        Notice {
            id: "1".to_string(),
            module: module.to_string(),
            version: version.parse().unwrap(),
            heading: format!("{} {}", module, version),
            short_description: short.to_string(),
            long_description: None,
            link: link.map(String::from),
        }
    }

    #[test]
    fn test_empty() {
        assert_eq!(render_notices(&[]), "");
    }

    #[test]
    fn test_groups_under_headings() {
        let notices = vec![
            notice("virtual-server", "7.2", "DNS validation", Some("/virtual-server/ssl.cgi")),
            notice("virtual-server", "7.2", "Encrypted backups", None),
            notice("virtualmin-nginx", "3.4", "HTTP/3", None),
        ];
        let expected = "virtual-server 7.2\n├── DNS validation\n│   → /virtual-server/ssl.cgi\n└── Encrypted backups\nvirtualmin-nginx 3.4\n└── HTTP/3\n";
        assert_eq!(render_notices(&notices), expected);
    }

    #[test]
    fn test_same_version_different_modules_get_own_headings() {
        let notices = vec![
            notice("virtualmin-nginx", "3.4", "A", None),
            notice("virtualmin-awstats", "3.4", "B", None),
        ];
        assert_eq!(group_by_release(&notices).len(), 2);
    }
}
