use crate::models::AspectKind;
use crate::services::gateway::FactGateway;
use crate::services::profile::ProfileStore;
use crate::utils::{
    clean_entity_label, clean_frequency_key, clean_liked_title, clean_tag, embedded_year,
    top_k_by_count,
};
use std::collections::{BTreeSet, HashMap};

/// Frequency statistics over the target user's liked movies: genre and tag
/// tallies from the local feeds, actor/director tallies from per-title
/// knowledge-graph lookups, release-year tallies from the titles themselves.
pub struct FrequencyExtractor<'a> {
    store: &'a ProfileStore,
}

impl<'a> FrequencyExtractor<'a> {
    pub fn new(store: &'a ProfileStore) -> Self {
        Self { store }
    }

    pub fn genre_counts(&self) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for id in self.store.liked() {
            let genres = self.store.movie(*id).map_or("", |m| m.genres.as_str());
            for genre in genres.split('|') {
                *counts.entry(genre.to_string()).or_insert(0) += 1;
            }
        }
        counts
    }

    pub fn tag_counts(&self) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for id in self.store.liked() {
            let Some(tags) = self.store.tags_for(*id) else {
                continue;
            };
            for tag in tags {
                *counts.entry(clean_tag(tag)).or_insert(0) += 1;
            }
        }
        counts
    }

    pub fn year_counts(&self) -> HashMap<i32, usize> {
        let mut counts = HashMap::new();
        for title in self.store.liked_titles() {
            if let Some(year) = embedded_year(title) {
                *counts.entry(year).or_insert(0) += 1;
            }
        }
        counts
    }

    pub fn top_genres(&self, n: usize) -> Vec<String> {
        keys(top_k_by_count(self.genre_counts(), n))
    }

    pub fn top_tags(&self, n: usize) -> Vec<String> {
        keys(top_k_by_count(self.tag_counts(), n))
    }

    pub fn preferred_years(&self, n: usize) -> Vec<i32> {
        top_k_by_count(self.year_counts(), n)
            .into_iter()
            .map(|(year, _)| year)
            .collect()
    }

    /// Most frequent actor or director labels across the liked movies, one
    /// gateway lookup per distinct cleaned title. Lookups fan out
    /// concurrently; the gateway cache guarantees one wire query per title.
    pub async fn top_entities(
        &self,
        gateway: &dyn FactGateway,
        kind: AspectKind,
        n: usize,
    ) -> Vec<String> {
        let titles: BTreeSet<String> = self
            .store
            .liked_titles()
            .into_iter()
            .map(clean_liked_title)
            .collect();

        let lookups = titles.iter().map(|title| gateway.title_facts(title));
        let results = futures::future::join_all(lookups).await;

        let mut counts: HashMap<String, usize> = HashMap::new();
        for facts in results {
            let labels = match kind {
                AspectKind::Actor => &facts.actors,
                AspectKind::Director => &facts.directors,
                _ => continue,
            };
            for label in labels {
                *counts.entry(clean_entity_label(label)).or_insert(0) += 1;
            }
        }
        keys(top_k_by_count(counts, n))
    }
}

/// Frequency table with display-cleaned keys, duplicates folded together.
pub fn cleaned_frequencies(counts: &HashMap<String, usize>) -> Vec<(String, usize)> {
    let mut cleaned: HashMap<String, usize> = HashMap::new();
    for (key, count) in counts {
        *cleaned.entry(clean_frequency_key(key)).or_insert(0) += count;
    }
    top_k_by_count(cleaned, usize::MAX)
}

fn keys(ranked: Vec<(String, usize)>) -> Vec<String> {
    ranked.into_iter().map(|(key, _)| key).collect()
}
