use crate::algorithms::{EntityErrorScorer, FrequencyExtractor, SoftmaxSelector};
use crate::config::Config;
use crate::models::{AspectKind, RunSummary, TasteProfile};
use crate::services::aggregator::AspectAggregator;
use crate::services::gateway::FactGateway;
use crate::services::profile::ProfileStore;
use crate::services::report::Reporter;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::info;

/// One-shot recommendation engine: derives the taste profile, probes the
/// knowledge graph, draws a candidate and scores it. Built once per run;
/// the RNG is the only mutable state and is seedable for reproducibility.
pub struct RecommendationService {
    store: Arc<ProfileStore>,
    gateway: Arc<dyn FactGateway>,
    reporter: Arc<dyn Reporter>,
    config: Arc<Config>,
    rng: Mutex<StdRng>,
}

impl RecommendationService {
    pub fn new(
        store: Arc<ProfileStore>,
        gateway: Arc<dyn FactGateway>,
        reporter: Arc<dyn Reporter>,
        config: Arc<Config>,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            store,
            gateway,
            reporter,
            config,
            rng: Mutex::new(rng),
        }
    }

    pub async fn run(&self) -> RunSummary {
        let taste = self.build_taste_profile().await;
        self.reporter.taste_profile(&taste);

        let candidates = AspectAggregator::new(&*self.gateway, &*self.reporter)
            .collect(&taste)
            .await;
        self.reporter.candidates(&candidates.aspects);

        let pool: Vec<String> = candidates.pool.iter().cloned().collect();
        let selector = SoftmaxSelector::new(self.config.selection.alpha);
        let (distribution, recommendation) = {
            let mut rng = self.rng.lock();
            selector.select(&pool, &candidates.aspects, &mut *rng)
        };
        self.reporter.distribution(&distribution, &candidates.aspects);

        let entity_error = match &recommendation {
            Some(recommendation) => {
                self.reporter.recommendation(recommendation);
                let scorer = EntityErrorScorer::new(
                    &self.store,
                    &*self.gateway,
                    &taste,
                    self.config.selection.year_tolerance,
                );
                let error = scorer
                    .entity_error(&recommendation.title, &candidates.aspects)
                    .await;
                self.reporter.entity_error(error);
                info!(title = %recommendation.title, error, "recommendation scored");
                Some(error)
            }
            None => {
                self.reporter.no_candidates();
                info!("no candidate survived aggregation");
                None
            }
        };

        RunSummary {
            taste,
            distribution,
            recommendation,
            entity_error,
        }
    }

    async fn build_taste_profile(&self) -> TasteProfile {
        let extractor = FrequencyExtractor::new(&self.store);
        let profile = &self.config.profile;

        self.reporter.frequency_table(
            "Genre ranking",
            &crate::algorithms::frequency::cleaned_frequencies(&extractor.genre_counts()),
        );
        self.reporter.frequency_table(
            "Tag ranking",
            &crate::algorithms::frequency::cleaned_frequencies(&extractor.tag_counts()),
        );

        TasteProfile {
            genres: extractor.top_genres(profile.top_genres),
            tags: extractor.top_tags(profile.top_tags),
            actors: extractor
                .top_entities(&*self.gateway, AspectKind::Actor, profile.top_entities)
                .await,
            directors: extractor
                .top_entities(&*self.gateway, AspectKind::Director, profile.top_entities)
                .await,
            years: extractor.preferred_years(profile.top_years),
        }
    }
}
