use crate::models::{AspectKind, CandidateAspects, NormalizedTitle, TasteProfile};
use crate::services::gateway::FactGateway;
use crate::services::profile::ProfileStore;
use crate::utils::embedded_year;
use tracing::debug;

/// Scores how well the final recommendation matches the user profile on a
/// [0, 1] scale, 0 being a perfect match.
///
/// A recommendation that resolves to a liked, target-rated movie is scored
/// straight off that rating. Anything else falls back to coverage
/// counting: local genres and tags, gateway-fetched actors and directors,
/// and release-year proximity each contribute checks. A title known only
/// to the aspect map scores by its aspect count over the five kinds, and
/// with no signal at all the error is the worst case 1.0.
pub struct EntityErrorScorer<'a> {
    store: &'a ProfileStore,
    gateway: &'a dyn FactGateway,
    taste: &'a TasteProfile,
    year_tolerance: i32,
}

impl<'a> EntityErrorScorer<'a> {
    pub fn new(
        store: &'a ProfileStore,
        gateway: &'a dyn FactGateway,
        taste: &'a TasteProfile,
        year_tolerance: i32,
    ) -> Self {
        Self {
            store,
            gateway,
            taste,
            year_tolerance,
        }
    }

    pub async fn entity_error(
        &self,
        title: &NormalizedTitle,
        aspects: &CandidateAspects,
    ) -> f64 {
        let movie_id = self.store.resolve_title(title);
        debug!(title = %title, ?movie_id, "scoring recommendation");

        if let Some(id) = movie_id {
            if self.store.liked().contains(&id) {
                if let Some(rating) = self.store.target_rating(id) {
                    return 1.0 - rating / 5.0;
                }
            }
        }

        let mut matches = 0usize;
        let mut checks = 0usize;

        if let Some(id) = movie_id {
            if let Some(record) = self.store.movie(id) {
                for genre in record.genres.split('|') {
                    if genre.trim().is_empty() {
                        continue;
                    }
                    checks += 1;
                    if self.taste.genres.iter().any(|g| g == genre) {
                        matches += 1;
                    }
                }
            }
            if let Some(tags) = self.store.tags_for(id) {
                for tag in tags {
                    if tag.trim().is_empty() {
                        continue;
                    }
                    checks += 1;
                    if self.taste.tags.iter().any(|t| t == tag) {
                        matches += 1;
                    }
                }
            }
        }

        let facts = self.gateway.title_facts(title.as_str()).await;
        for actor in &facts.actors {
            checks += 1;
            if self.taste.actors.contains(actor) {
                matches += 1;
            }
        }
        for director in &facts.directors {
            checks += 1;
            if self.taste.directors.contains(director) {
                matches += 1;
            }
        }

        // The normalized title has its year stripped, so the stored title
        // of a resolved movie supplies it instead.
        let year = embedded_year(title.as_str()).or_else(|| {
            movie_id
                .and_then(|id| self.store.movie(id))
                .and_then(|record| embedded_year(&record.title))
        });
        if let Some(year) = year {
            checks += 1;
            if self
                .taste
                .years
                .iter()
                .any(|preferred| (preferred - year).abs() <= self.year_tolerance)
            {
                matches += 1;
            }
        }

        if movie_id.is_none() {
            if let Some(set) = aspects.aspects(title) {
                matches = set.len();
                checks = AspectKind::ALL.len();
            }
        }

        debug!(matches, checks, "coverage counted");
        if checks == 0 {
            return 1.0;
        }
        1.0 - matches as f64 / checks as f64
    }
}
