//! Novelty resolution: which releases, and which of their features, a user
//! has not yet acknowledged.

use std::collections::HashSet;

use crate::error::Result;
use crate::ledger::{AckStore, Ledger};
use crate::models::*;
use crate::store::FeatureSource;

pub struct Resolver<F, S> {
    features: F,
    ledger: Ledger<S>,
}

impl<F: FeatureSource, S: AckStore> Resolver<F, S> {
    pub fn new(features: F, ledger: Ledger<S>) -> Self {
        Self { features, ledger }
    }

    pub fn ledger(&self) -> &Ledger<S> {
        &self.ledger
    }

    pub fn features(&self) -> &F {
        &self.features
    }

    /// Unacknowledged releases, newest first within each module, modules in
    /// the order given.
    ///
    /// Each module's ladder is walked down from its current version while the
    /// version is positive, newer than the acknowledged one, and not below the
    /// module's first version to show.
    pub fn pending_notifications(
        &self,
        user: &str,
        modules: &[ModuleVersionInfo],
    ) -> Result<Vec<PendingRelease>> {
        let acked = self.ledger.get_acknowledged(user)?;
        let ladder = self.ledger.ladder();
        let mut pending = Vec::new();

        for module in modules {
            let ack = acked.get(&module.name).copied().unwrap_or(Version::ZERO);
            let floor = module.first_version_to_show.unwrap_or(Version::ZERO);
            let mut cur = module.version;

            while cur.is_positive() && cur > ack && cur >= floor {
                pending.push(PendingRelease {
                    module: module.name.clone(),
                    version: cur,
                });
                cur = ladder.previous_version(cur, &module.name)?;
            }
            tracing::debug!(
                "{} {} acknowledged at {} (floor {})",
                module.name,
                module.version,
                ack,
                floor
            );
        }

        Ok(pending)
    }

    /// Descriptors of every pending release, filtered for the viewer.
    ///
    /// A release with no published features ends the walk for its module: no
    /// older release of that module is read in this pass. Releases are
    /// returned oldest block first; inside a block descriptors keep the
    /// store's newest-first order.
    pub fn renderable_features(
        &self,
        user: &str,
        modules: &[ModuleVersionInfo],
        role: Option<Role>,
        host_version: Version,
    ) -> Result<Vec<FeatureDescriptor>> {
        let pending = self.pending_notifications(user, modules)?;
        let mut exhausted: HashSet<&str> = HashSet::new();
        let mut blocks: Vec<Vec<FeatureDescriptor>> = Vec::new();

        for release in &pending {
            if exhausted.contains(release.module.as_str()) {
                continue;
            }
            let features = self
                .features
                .list_features(&release.module, release.version)?;
            if features.is_empty() {
                tracing::debug!(
                    "No features for {} {}, skipping older releases",
                    release.module,
                    release.version
                );
                exhausted.insert(&release.module);
                continue;
            }

            let block: Vec<_> = features
                .into_iter()
                .filter(|f| role.map_or(true, |r| f.visible_to(r)))
                .filter(|f| f.min_host_version.map_or(true, |min| host_version >= min))
                .collect();
            blocks.push(block);
        }

        Ok(blocks.into_iter().rev().flatten().collect())
    }
}
