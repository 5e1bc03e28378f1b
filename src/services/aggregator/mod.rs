use crate::models::{AspectKind, CandidateAspects, NormalizedTitle, TasteProfile};
use crate::services::gateway::{FactGateway, SearchFilter};
use crate::services::report::Reporter;
use std::collections::HashSet;
use tracing::{debug, info};

/// Everything the probe phase surfaced: the raw candidate pool and the
/// normalized title -> aspect set map.
#[derive(Default)]
pub struct CandidateSet {
    pub pool: HashSet<String>,
    pub aspects: CandidateAspects,
}

impl CandidateSet {
    /// Drops map entries with empty aspect sets and pool titles left
    /// without coverage. After this the map invariant holds: every key has
    /// at least one aspect.
    pub fn finalize(&mut self) -> usize {
        let dropped = self.aspects.finalize();
        let aspects = &self.aspects;
        self.pool.retain(|raw| aspects.covers(&NormalizedTitle::new(raw)));
        dropped
    }
}

/// Runs one unified search per preferred value of each aspect kind and
/// merges every surfaced title into a single candidate set.
pub struct AspectAggregator<'a> {
    gateway: &'a dyn FactGateway,
    reporter: &'a dyn Reporter,
}

impl<'a> AspectAggregator<'a> {
    pub fn new(gateway: &'a dyn FactGateway, reporter: &'a dyn Reporter) -> Self {
        Self { gateway, reporter }
    }

    pub async fn collect(&self, taste: &TasteProfile) -> CandidateSet {
        let mut set = CandidateSet::default();
        let mut totals = Vec::with_capacity(AspectKind::ALL.len());

        for kind in AspectKind::ALL {
            let filters = filters_for(kind, taste);
            let hits = self.probe(kind, &filters, &mut set).await;
            totals.push((kind, hits));
        }

        let dropped = set.finalize();
        if dropped > 0 {
            debug!(dropped, "purged aspect-less candidates");
        }

        self.reporter.probe_totals(&totals);
        info!(
            candidates = set.pool.len(),
            keys = set.aspects.len(),
            "candidate aggregation complete"
        );
        set
    }

    /// One probe per filter; every returned title gets this probe's aspect
    /// kind recorded under its normalized key.
    async fn probe(
        &self,
        kind: AspectKind,
        filters: &[SearchFilter],
        set: &mut CandidateSet,
    ) -> usize {
        let mut hits = 0;
        for filter in filters {
            let results = self.gateway.search_titles(filter).await;
            let label = filter.label();
            for raw in &results {
                let key = NormalizedTitle::new(raw);
                self.reporter.probe_hit(kind, &label, key.as_str());
                set.aspects.record(key, kind);
                hits += 1;
            }
            set.pool.extend(results);
        }
        hits
    }
}

/// One filter per preferred value, except years, which go out as a single
/// combined search over every preferred year's window.
fn filters_for(kind: AspectKind, taste: &TasteProfile) -> Vec<SearchFilter> {
    match kind {
        AspectKind::Genre => taste.genres.iter().map(|g| SearchFilter::for_genre(g)).collect(),
        AspectKind::Tag => taste.tags.iter().map(|t| SearchFilter::for_tag(t)).collect(),
        AspectKind::Actor => taste.actors.iter().map(|a| SearchFilter::for_actor(a)).collect(),
        AspectKind::Director => taste
            .directors
            .iter()
            .map(|d| SearchFilter::for_director(d))
            .collect(),
        AspectKind::Year => {
            if taste.years.is_empty() {
                Vec::new()
            } else {
                vec![SearchFilter::for_years(taste.years.clone())]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TitleFacts;
    use crate::services::report::NullReporter;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    /// Gateway stub returning canned titles per filter label.
    struct StubGateway {
        responses: HashMap<String, Vec<String>>,
        calls: Mutex<Vec<String>>,
    }

    impl StubGateway {
        fn new(responses: HashMap<String, Vec<String>>) -> Self {
            Self {
                responses,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl FactGateway for StubGateway {
        async fn title_facts(&self, _title: &str) -> TitleFacts {
            TitleFacts::default()
        }

        async fn search_titles(&self, filter: &SearchFilter) -> HashSet<String> {
            self.calls.lock().await.push(filter.label());
            self.responses
                .get(&filter.label())
                .map(|titles| titles.iter().cloned().collect())
                .unwrap_or_default()
        }
    }

    fn taste() -> TasteProfile {
        TasteProfile {
            genres: vec!["Action".to_string()],
            tags: vec!["heist".to_string()],
            actors: vec!["Al Pacino".to_string()],
            directors: Vec::new(),
            years: vec![1995],
        }
    }

    #[tokio::test]
    async fn test_aspects_merge_across_probes() {
        let mut responses = HashMap::new();
        responses.insert(
            "Action".to_string(),
            vec!["\"Heat (1995)\"@en".to_string(), "Speed".to_string()],
        );
        responses.insert("Al Pacino".to_string(), vec!["Heat".to_string()]);
        let gateway = StubGateway::new(responses);

        let set = AspectAggregator::new(&gateway, &NullReporter)
            .collect(&taste())
            .await;

        let heat = NormalizedTitle::new("Heat");
        assert_eq!(set.aspects.aspect_count(&heat), 2);
        assert_eq!(set.aspects.aspect_count(&NormalizedTitle::new("Speed")), 1);
        // Raw variants of the same film stay in the pool; the map holds one key.
        assert_eq!(set.aspects.len(), 2);
    }

    #[tokio::test]
    async fn test_one_search_per_preferred_value_plus_year_batch() {
        let gateway = StubGateway::new(HashMap::new());
        AspectAggregator::new(&gateway, &NullReporter)
            .collect(&taste())
            .await;

        let calls = gateway.calls.lock().await;
        // genre, tag, actor, and one combined year search; no director values.
        assert_eq!(calls.len(), 4);
        assert!(calls.contains(&"1995".to_string()));
    }

    #[tokio::test]
    async fn test_finalized_map_has_no_empty_sets() {
        let mut responses = HashMap::new();
        responses.insert("Action".to_string(), vec!["Ronin".to_string()]);
        let gateway = StubGateway::new(responses);

        let set = AspectAggregator::new(&gateway, &NullReporter)
            .collect(&taste())
            .await;

        assert!(set.aspects.iter().all(|(_, aspects)| !aspects.is_empty()));
    }
}
