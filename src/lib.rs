//! What's-new announcements for control-panel modules.
//!
//! Tracks, per user, the newest release of each module whose feature
//! announcements they have acknowledged, and works out which announcements
//! are still new to them.
//!
//! - [`ladder`]: steps a module version back one publishable release.
//! - [`store`]: reads feature descriptors for one module release.
//! - [`ledger`]: per-user acknowledgement records.
//! - [`resolver`]: pending releases and the features to show.
//! - [`notices`]: role gate and link resolution on top of the resolver.

pub mod api;
pub mod config;
pub mod error;
pub mod host;
pub mod ladder;
pub mod ledger;
pub mod models;
pub mod notices;
pub mod registry;
pub mod render;
pub mod resolver;
pub mod store;

pub use error::{Result, WhatsNewError};
