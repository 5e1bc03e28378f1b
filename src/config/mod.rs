use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub datasets: DatasetConfig,
    pub sparql: SparqlConfig,
    pub profile: ProfileConfig,
    pub selection: SelectionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub movies: PathBuf,
    pub tags: PathBuf,
    pub ratings: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SparqlConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
    /// Row cap on the unified candidate search.
    pub search_limit: usize,
    /// Row cap on a per-title property lookup.
    pub lookup_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub target_user_id: u32,
    /// Ratings at or above this mark a movie as liked (0-5 scale).
    pub like_threshold: f64,
    pub top_genres: usize,
    pub top_tags: usize,
    pub top_entities: usize,
    pub top_years: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Softmax inverse temperature.
    pub alpha: f64,
    /// Half-width of the inclusive release-year window in the unified search.
    pub year_window: i32,
    /// Year proximity tolerance in the entity-error check.
    pub year_tolerance: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            datasets: DatasetConfig {
                movies: PathBuf::from("dataset/movies.csv"),
                tags: PathBuf::from("dataset/tags.csv"),
                ratings: PathBuf::from("dataset/ratings.csv"),
            },
            sparql: SparqlConfig {
                endpoint: "https://dbpedia.org/sparql".to_string(),
                timeout_secs: 30,
                search_limit: 100,
                lookup_limit: 5,
            },
            profile: ProfileConfig {
                target_user_id: 1,
                like_threshold: 3.0,
                top_genres: 3,
                top_tags: 3,
                top_entities: 3,
                top_years: 5,
            },
            selection: SelectionConfig {
                alpha: 1.0,
                year_window: 5,
                year_tolerance: 2,
            },
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("KINOGRAPH"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
