use crate::utils::normalize_title;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

pub type MovieId = u32;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieRecord {
    pub id: MovieId,
    pub title: String,
    /// Raw pipe-delimited genre string as loaded from the feed.
    pub genres: String,
}

/// One reason a candidate matches the user's derived preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AspectKind {
    Genre,
    Tag,
    Actor,
    Director,
    Year,
}

impl AspectKind {
    pub const ALL: [AspectKind; 5] = [
        AspectKind::Genre,
        AspectKind::Tag,
        AspectKind::Actor,
        AspectKind::Director,
        AspectKind::Year,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AspectKind::Genre => "genre",
            AspectKind::Tag => "tag",
            AspectKind::Actor => "actor",
            AspectKind::Director => "director",
            AspectKind::Year => "year",
        }
    }
}

impl fmt::Display for AspectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Canonical title key. Construction always runs the normalization
/// pipeline, so two values comparing equal means the raw titles name the
/// same candidate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NormalizedTitle(String);

impl NormalizedTitle {
    pub fn new(raw: &str) -> Self {
        Self(normalize_title(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Actor and director labels returned by a per-title property lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TitleFacts {
    pub actors: Vec<String>,
    pub directors: Vec<String>,
}

impl TitleFacts {
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty() && self.directors.is_empty()
    }
}

/// The user's derived preferences, one list per aspect kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TasteProfile {
    pub genres: Vec<String>,
    pub tags: Vec<String>,
    pub actors: Vec<String>,
    pub directors: Vec<String>,
    pub years: Vec<i32>,
}

/// Mapping from normalized candidate title to the set of aspect kinds it
/// satisfies. Grows monotonically while probes run; `finalize` drops any
/// entry left with an empty set, after which every key maps to a non-empty
/// set.
#[derive(Debug, Clone, Default)]
pub struct CandidateAspects {
    entries: HashMap<NormalizedTitle, BTreeSet<AspectKind>>,
}

impl CandidateAspects {
    pub fn record(&mut self, title: NormalizedTitle, kind: AspectKind) {
        self.entries.entry(title).or_default().insert(kind);
    }

    pub fn aspects(&self, title: &NormalizedTitle) -> Option<&BTreeSet<AspectKind>> {
        self.entries.get(title)
    }

    pub fn aspect_count(&self, title: &NormalizedTitle) -> usize {
        self.entries.get(title).map_or(0, BTreeSet::len)
    }

    /// True when the title is present with at least one aspect.
    pub fn covers(&self, title: &NormalizedTitle) -> bool {
        self.entries.get(title).is_some_and(|set| !set.is_empty())
    }

    /// Purges entries with empty aspect sets and returns how many were
    /// dropped. Should be a no-op given the insertion discipline.
    pub fn finalize(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, set| !set.is_empty());
        before - self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NormalizedTitle, &BTreeSet<AspectKind>)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One candidate's slot in the softmax distribution.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub title: NormalizedTitle,
    /// Aspect-set cardinality, in [1, 5] after filtering.
    pub score: usize,
    pub probability: f64,
}

/// The full softmax distribution in draw order (lexicographic by title).
#[derive(Debug, Clone, Default)]
pub struct ScoreDistribution {
    pub entries: Vec<ScoredCandidate>,
}

impl ScoreDistribution {
    pub fn total_mass(&self) -> f64 {
        self.entries.iter().map(|e| e.probability).sum()
    }

    /// Entries sorted most-probable first, for display.
    pub fn ranked(&self) -> Vec<&ScoredCandidate> {
        let mut ranked: Vec<&ScoredCandidate> = self.entries.iter().collect();
        ranked.sort_by(|a, b| {
            b.probability
                .partial_cmp(&a.probability)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }
}

#[derive(Debug, Clone)]
pub struct Recommendation {
    pub title: NormalizedTitle,
    pub probability: f64,
    pub aspects: BTreeSet<AspectKind>,
}

/// Everything one recommendation round produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub taste: TasteProfile,
    pub distribution: ScoreDistribution,
    pub recommendation: Option<Recommendation>,
    pub entity_error: Option<f64>,
}
