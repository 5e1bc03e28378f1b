pub mod query;

pub use query::SearchFilter;

use crate::config::SparqlConfig;
use crate::models::TitleFacts;
use crate::utils::{clean_entity_label, clean_for_lookup};
use anyhow::Result;
use dashmap::DashMap;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

/// Access to the knowledge graph. Both operations swallow transport and
/// query failures: a failed call logs and yields an empty result, never an
/// error the caller has to handle.
#[async_trait::async_trait]
pub trait FactGateway: Send + Sync {
    /// Actor and director labels for one title. Results are cached per raw
    /// title argument for the lifetime of the gateway, empty results
    /// included, so each distinct title reaches the wire at most once.
    async fn title_facts(&self, title: &str) -> TitleFacts;

    /// Raw title strings matching the filter, deduplicated by the query.
    async fn search_titles(&self, filter: &SearchFilter) -> HashSet<String>;
}

#[derive(Debug, Deserialize)]
struct SparqlResponse {
    results: SparqlResults,
}

#[derive(Debug, Deserialize)]
struct SparqlResults {
    bindings: Vec<HashMap<String, SparqlTerm>>,
}

#[derive(Debug, Deserialize)]
struct SparqlTerm {
    value: String,
    #[serde(rename = "xml:lang")]
    lang: Option<String>,
}

impl SparqlTerm {
    /// Literal text with its language marker reattached, matching the raw
    /// label form the rest of the pipeline normalizes away.
    fn literal(&self) -> String {
        match &self.lang {
            Some(lang) => format!("{}@{}", self.value, lang),
            None => self.value.clone(),
        }
    }
}

/// SPARQL-over-HTTP gateway with a per-title lookup cache.
pub struct SparqlGateway {
    http: reqwest::Client,
    endpoint: String,
    search_limit: usize,
    lookup_limit: usize,
    year_window: i32,
    // Concurrent lookups for one key share the cell's single in-flight
    // query; the completed value stays for the rest of the run.
    cache: DashMap<String, Arc<OnceCell<TitleFacts>>>,
}

impl SparqlGateway {
    pub fn new(config: &SparqlConfig, year_window: i32) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            search_limit: config.search_limit,
            lookup_limit: config.lookup_limit,
            year_window,
            cache: DashMap::new(),
        })
    }

    async fn select(&self, sparql: &str) -> Result<Vec<HashMap<String, SparqlTerm>>> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("query", sparql), ("format", "json")])
            .send()
            .await?
            .error_for_status()?;

        let body: SparqlResponse = response.json().await?;
        Ok(body.results.bindings)
    }

    async fn fetch_facts(&self, title: &str) -> TitleFacts {
        let clean = clean_for_lookup(title);
        debug!(title, %clean, "property lookup");

        let sparql = query::properties_query(&clean, self.lookup_limit);
        let mut facts = TitleFacts::default();
        match self.select(&sparql).await {
            Ok(bindings) => {
                for row in bindings {
                    if let Some(actor) = row.get("actorLabel") {
                        facts.actors.push(clean_entity_label(&actor.literal()));
                    }
                    if let Some(director) = row.get("directorLabel") {
                        facts.directors.push(clean_entity_label(&director.literal()));
                    }
                }
            }
            Err(e) => warn!(title, "property lookup failed: {e}"),
        }
        facts
    }
}

#[async_trait::async_trait]
impl FactGateway for SparqlGateway {
    async fn title_facts(&self, title: &str) -> TitleFacts {
        let cell = self
            .cache
            .entry(title.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        cell.get_or_init(|| self.fetch_facts(title)).await.clone()
    }

    async fn search_titles(&self, filter: &SearchFilter) -> HashSet<String> {
        let sparql = query::unified_query(filter, self.year_window, self.search_limit);
        match self.select(&sparql).await {
            Ok(bindings) => bindings
                .into_iter()
                .filter_map(|mut row| row.remove("filmTitle"))
                .map(|term| term.literal())
                .collect(),
            Err(e) => {
                warn!(filter = %filter.label(), "unified search failed: {e}");
                HashSet::new()
            }
        }
    }
}
