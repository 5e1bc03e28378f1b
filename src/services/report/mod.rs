use crate::models::{
    AspectKind, CandidateAspects, Recommendation, ScoreDistribution, TasteProfile,
};

/// Sink for the human-readable progress of one recommendation round.
/// The engine only ever talks to this trait, so alternative sinks (a test
/// capture, a silent run) drop in without touching the pipeline.
pub trait Reporter: Send + Sync {
    fn frequency_table(&self, label: &str, entries: &[(String, usize)]);
    fn taste_profile(&self, taste: &TasteProfile);
    fn probe_hit(&self, kind: AspectKind, filter: &str, title: &str);
    fn probe_totals(&self, totals: &[(AspectKind, usize)]);
    fn candidates(&self, aspects: &CandidateAspects);
    fn distribution(&self, distribution: &ScoreDistribution, aspects: &CandidateAspects);
    fn recommendation(&self, recommendation: &Recommendation);
    fn no_candidates(&self);
    fn entity_error(&self, error: f64);
}

/// Default sink: ranked lists and probability tables on stdout.
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn frequency_table(&self, label: &str, entries: &[(String, usize)]) {
        println!("{label}:");
        for (key, count) in entries {
            println!("  {key} -> {count}");
        }
    }

    fn taste_profile(&self, taste: &TasteProfile) {
        println!("Top genres: {:?}", taste.genres);
        println!("Top tags: {:?}", taste.tags);
        println!("Top actors: {:?}", taste.actors);
        println!("Top directors: {:?}", taste.directors);
        println!("Preferred years: {:?}", taste.years);
    }

    fn probe_hit(&self, kind: AspectKind, filter: &str, title: &str) {
        println!("   [{kind} -> {filter}] {title}");
    }

    fn probe_totals(&self, totals: &[(AspectKind, usize)]) {
        let summary: Vec<String> = totals
            .iter()
            .map(|(kind, count)| format!("{kind}: {count}"))
            .collect();
        println!("Candidates found per aspect -> {}", summary.join(" | "));
    }

    fn candidates(&self, aspects: &CandidateAspects) {
        println!("Candidate films (with satisfied aspects):");
        let mut entries: Vec<_> = aspects.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        for (title, set) in entries {
            println!("   -> {title} (aspects: {})", set.len());
        }
    }

    fn distribution(&self, distribution: &ScoreDistribution, aspects: &CandidateAspects) {
        println!("Recommendation probabilities:");
        for entry in distribution.ranked() {
            let set = aspects.aspects(&entry.title);
            let kinds: Vec<&str> = set
                .map(|s| s.iter().map(AspectKind::label).collect())
                .unwrap_or_default();
            println!(
                "   \"{}\" -> {:.4} (aspects: {} -> {:?})",
                entry.title, entry.probability, entry.score, kinds
            );
        }
    }

    fn recommendation(&self, recommendation: &Recommendation) {
        println!("Chosen film (softmax): {}", recommendation.title);
    }

    fn no_candidates(&self) {
        println!("No film found");
    }

    fn entity_error(&self, error: f64) {
        println!("Entity error of the recommended film: {error:.2}");
    }
}

/// Discards everything. Used by benches and tests that only care about the
/// returned summary.
pub struct NullReporter;

impl Reporter for NullReporter {
    fn frequency_table(&self, _label: &str, _entries: &[(String, usize)]) {}
    fn taste_profile(&self, _taste: &TasteProfile) {}
    fn probe_hit(&self, _kind: AspectKind, _filter: &str, _title: &str) {}
    fn probe_totals(&self, _totals: &[(AspectKind, usize)]) {}
    fn candidates(&self, _aspects: &CandidateAspects) {}
    fn distribution(&self, _distribution: &ScoreDistribution, _aspects: &CandidateAspects) {}
    fn recommendation(&self, _recommendation: &Recommendation) {}
    fn no_candidates(&self) {}
    fn entity_error(&self, _error: f64) {}
}
