pub mod algorithms;
pub mod config;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use models::*;

use anyhow::Result;
use services::gateway::{FactGateway, SparqlGateway};
use services::profile::ProfileStore;
use services::recommendation::RecommendationService;
use services::report::{ConsoleReporter, Reporter};
use std::sync::Arc;

/// Per-run context: configuration, loaded profile data and the wired
/// recommendation service. Independent runs in one process get independent
/// states.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub profile_store: Arc<ProfileStore>,
    pub gateway: Arc<dyn FactGateway>,
    pub recommendation_service: Arc<RecommendationService>,
}

impl AppState {
    /// State wired against the configured SPARQL endpoint and the console
    /// reporting sink.
    pub fn new(config: Config, seed: Option<u64>) -> Result<Self> {
        let gateway = Arc::new(SparqlGateway::new(
            &config.sparql,
            config.selection.year_window,
        )?);
        Self::with_parts(config, gateway, Arc::new(ConsoleReporter), seed)
    }

    /// State with an injected gateway and reporter, for tests and embedders.
    pub fn with_parts(
        config: Config,
        gateway: Arc<dyn FactGateway>,
        reporter: Arc<dyn Reporter>,
        seed: Option<u64>,
    ) -> Result<Self> {
        let config = Arc::new(config);
        let profile_store = Arc::new(ProfileStore::load(&config.datasets, &config.profile));

        let recommendation_service = Arc::new(RecommendationService::new(
            profile_store.clone(),
            gateway.clone(),
            reporter,
            config.clone(),
            seed,
        ));

        Ok(Self {
            config,
            profile_store,
            gateway,
            recommendation_service,
        })
    }
}

pub async fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
