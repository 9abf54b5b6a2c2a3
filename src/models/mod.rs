//! Domain models for whatsnew.
//!
//! # Core Concepts
//!
//! - [`Version`]: fixed-point decimal module version.
//! - [`FeatureDescriptor`]: one announced feature of one module release, read
//!   from the feature store.
//! - [`ModuleVersionInfo`]: a module of interest and its installed version.
//! - [`PendingRelease`]: a (module, version) pair the viewer has not yet
//!   acknowledged.
//! - [`Notice`]: a descriptor with its link resolved, ready for display.
//! - [`Role`]: the viewer's access tier, used for visibility filtering.

mod feature;
mod module;
mod notice;
mod version;

pub use feature::*;
pub use module::*;
pub use notice::*;
pub use version::*;
