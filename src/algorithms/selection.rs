use crate::models::{
    CandidateAspects, NormalizedTitle, Recommendation, ScoreDistribution, ScoredCandidate,
};
use rand::Rng;
use std::collections::BTreeSet;

/// Temperature-weighted stochastic pick over aspect-coverage scores.
///
/// Candidates are scored by aspect-set cardinality, turned into a softmax
/// distribution with inverse temperature `alpha`, and one is drawn with a
/// single uniform sample. The RNG comes from the caller, so runs seed
/// deterministically.
pub struct SoftmaxSelector {
    alpha: f64,
}

impl SoftmaxSelector {
    pub fn new(alpha: f64) -> Self {
        Self { alpha }
    }

    /// Builds the probability distribution over the deduplicated, covered
    /// candidates. Entries come back in draw order (lexicographic by
    /// normalized title), probabilities summing to 1 unless no candidate
    /// survives the filter.
    pub fn distribution(
        &self,
        candidates: &[String],
        aspects: &CandidateAspects,
    ) -> ScoreDistribution {
        let keys: BTreeSet<NormalizedTitle> = candidates
            .iter()
            .map(|raw| NormalizedTitle::new(raw))
            .collect();

        let mut entries: Vec<ScoredCandidate> = keys
            .into_iter()
            .filter(|title| aspects.covers(title))
            .map(|title| ScoredCandidate {
                score: aspects.aspect_count(&title),
                title,
                probability: 0.0,
            })
            .collect();

        if entries.is_empty() {
            return ScoreDistribution::default();
        }

        let denominator: f64 = entries
            .iter()
            .map(|e| (self.alpha * e.score as f64).exp())
            .sum();
        for entry in &mut entries {
            entry.probability = (self.alpha * entry.score as f64).exp() / denominator;
        }

        ScoreDistribution { entries }
    }

    /// One full selection: distribution, uniform draw, pick. `None` means
    /// no candidate survived filtering.
    pub fn select<R: Rng>(
        &self,
        candidates: &[String],
        aspects: &CandidateAspects,
        rng: &mut R,
    ) -> (ScoreDistribution, Option<Recommendation>) {
        let distribution = self.distribution(candidates, aspects);
        if distribution.entries.is_empty() {
            return (distribution, None);
        }

        let draw = rng.gen::<f64>();
        let pick = self
            .pick_with_draw(&distribution, draw)
            .map(|candidate| Recommendation {
                aspects: aspects
                    .aspects(&candidate.title)
                    .cloned()
                    .unwrap_or_default(),
                probability: candidate.probability,
                title: candidate.title.clone(),
            });
        (distribution, pick)
    }

    /// Walks the distribution in order, accumulating mass until it meets
    /// the draw. Rounding can leave the loop without a winner; the
    /// highest-probability candidate is the fallback.
    pub fn pick_with_draw<'a>(
        &self,
        distribution: &'a ScoreDistribution,
        draw: f64,
    ) -> Option<&'a ScoredCandidate> {
        let mut cumulative = 0.0;
        for entry in &distribution.entries {
            cumulative += entry.probability;
            if draw <= cumulative {
                return Some(entry);
            }
        }

        distribution.entries.iter().max_by(|a, b| {
            a.probability
                .partial_cmp(&b.probability)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AspectKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn heat_speed_aspects() -> CandidateAspects {
        let mut aspects = CandidateAspects::default();
        aspects.record(NormalizedTitle::new("Heat"), AspectKind::Genre);
        aspects.record(NormalizedTitle::new("Heat"), AspectKind::Actor);
        aspects.record(NormalizedTitle::new("Speed"), AspectKind::Genre);
        aspects
    }

    fn candidates() -> Vec<String> {
        vec!["Heat".to_string(), "Speed".to_string()]
    }

    #[test]
    fn test_softmax_probabilities_match_reference() {
        let selector = SoftmaxSelector::new(1.0);
        let dist = selector.distribution(&candidates(), &heat_speed_aspects());

        let heat = dist
            .entries
            .iter()
            .find(|e| e.title.as_str() == "Heat")
            .unwrap();
        let speed = dist
            .entries
            .iter()
            .find(|e| e.title.as_str() == "Speed")
            .unwrap();

        // e^2 / (e^2 + e^1) and its complement.
        assert!((heat.probability - 0.7311).abs() < 1e-4);
        assert!((speed.probability - 0.2689).abs() < 1e-4);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let selector = SoftmaxSelector::new(1.0);
        let dist = selector.distribution(&candidates(), &heat_speed_aspects());
        assert!((dist.total_mass() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_larger_aspect_set_gets_higher_probability() {
        for alpha in [0.5, 1.0, 2.0] {
            let selector = SoftmaxSelector::new(alpha);
            let dist = selector.distribution(&candidates(), &heat_speed_aspects());
            let heat = dist
                .entries
                .iter()
                .find(|e| e.title.as_str() == "Heat")
                .unwrap();
            let speed = dist
                .entries
                .iter()
                .find(|e| e.title.as_str() == "Speed")
                .unwrap();
            assert!(heat.probability > speed.probability);
        }
    }

    #[test]
    fn test_uncovered_candidates_are_filtered() {
        let selector = SoftmaxSelector::new(1.0);
        let mut pool = candidates();
        pool.push("Unknown Film".to_string());
        let dist = selector.distribution(&pool, &heat_speed_aspects());
        assert_eq!(dist.entries.len(), 2);
    }

    #[test]
    fn test_empty_candidate_set_yields_none() {
        let selector = SoftmaxSelector::new(1.0);
        let aspects = CandidateAspects::default();
        let mut rng = StdRng::seed_from_u64(7);
        let (dist, pick) = selector.select(&candidates(), &aspects, &mut rng);
        assert!(dist.entries.is_empty());
        assert!(pick.is_none());
    }

    #[test]
    fn test_fixed_draw_is_deterministic() {
        let selector = SoftmaxSelector::new(1.0);
        let dist = selector.distribution(&candidates(), &heat_speed_aspects());

        // Draw order is lexicographic: Heat (~0.731), then Speed.
        let low = selector.pick_with_draw(&dist, 0.5).unwrap();
        assert_eq!(low.title.as_str(), "Heat");
        let high = selector.pick_with_draw(&dist, 0.9).unwrap();
        assert_eq!(high.title.as_str(), "Speed");
    }

    #[test]
    fn test_rounding_fallthrough_picks_max_probability() {
        let selector = SoftmaxSelector::new(1.0);
        let dist = selector.distribution(&candidates(), &heat_speed_aspects());
        // A draw beyond the accumulated mass exercises the fallback.
        let pick = selector.pick_with_draw(&dist, 2.0).unwrap();
        assert_eq!(pick.title.as_str(), "Heat");
    }

    #[test]
    fn test_seeded_selection_reproducible() {
        let selector = SoftmaxSelector::new(1.0);
        let aspects = heat_speed_aspects();
        let pool = candidates();

        let mut first = StdRng::seed_from_u64(42);
        let mut second = StdRng::seed_from_u64(42);
        let (_, a) = selector.select(&pool, &aspects, &mut first);
        let (_, b) = selector.select(&pool, &aspects, &mut second);
        assert_eq!(a.unwrap().title, b.unwrap().title);
    }
}
