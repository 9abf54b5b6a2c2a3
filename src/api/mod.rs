mod handlers;

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::{HostFlavor, WhatsNewConfig};
use crate::host::{DomainHost, HostContext, HostedDomain, ManagedServer, ServerManagerHost};
use crate::ledger::AckStore;
use crate::models::Role;
use crate::notices::Notifier;
use crate::registry::{ModuleRegistry, StaticRegistry};
use crate::store::FeatureStore;

pub type AppNotifier = Notifier<FeatureStore, Box<dyn AckStore + Send + Sync>>;

/// Shared state behind every request.
pub struct AppState {
    pub notifier: AppNotifier,
    pub registry: Box<dyn ModuleRegistry + Send + Sync>,
    pub flavor: HostFlavor,
    pub domains: BTreeMap<String, Vec<HostedDomain>>,
    pub servers: Vec<ManagedServer>,
}

impl AppState {
    pub fn from_config(config: &WhatsNewConfig) -> anyhow::Result<Self> {
        Ok(Self {
            notifier: config.notifier()?,
            registry: Box::new(config.registry()),
            flavor: config.flavor,
            domains: config.domains.clone(),
            servers: config.servers.clone(),
        })
    }

    pub fn new(notifier: AppNotifier, registry: StaticRegistry) -> Self {
        Self {
            notifier,
            registry: Box::new(registry),
            flavor: HostFlavor::Domains,
            domains: BTreeMap::new(),
            servers: Vec::new(),
        }
    }

    /// Host capabilities for one viewer.
    pub fn host_for(&self, user: &str, role: Option<Role>) -> Box<dyn HostContext + Send + Sync> {
        match self.flavor {
            HostFlavor::Domains => Box::new(DomainHost::new(
                role,
                self.domains.get(user).cloned().unwrap_or_default(),
            )),
            HostFlavor::Servers => Box::new(ServerManagerHost::new(role, self.servers.clone())),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/users/{user}/notices", get(handlers::list_notices))
        .route("/users/{user}/pending", get(handlers::list_pending))
        .route(
            "/users/{user}/acknowledgements",
            get(handlers::get_acknowledgements).post(handlers::acknowledge_all),
        )
        .route(
            "/users/{user}/acknowledgements/{module}",
            put(handlers::acknowledge).delete(handlers::unacknowledge),
        )
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}
