use serde::{Deserialize, Serialize};

use super::Version;

/// A feature descriptor prepared for display to one viewer.
///
/// Unlike [`super::FeatureDescriptor`], the link is already resolved against
/// the viewer's target entity and the module base path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notice {
    pub id: String,
    pub module: String,
    pub version: Version,
    /// Version description, e.g. "Virtualmin 7.2".
    pub heading: String,
    pub short_description: String,
    pub long_description: Option<String>,
    pub link: Option<String>,
}
