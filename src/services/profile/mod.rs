use crate::config::{DatasetConfig, ProfileConfig};
use crate::models::{MovieId, MovieRecord, NormalizedTitle};
use crate::utils::strip_parenthetical;
use anyhow::Result;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
enum RowError {
    #[error("expected at least {0} fields")]
    MissingFields(usize),
    #[error("non-numeric id field")]
    BadId,
    #[error("non-numeric rating field")]
    BadRating,
}

/// In-memory view of the local rating/tag/genre feeds for one run.
///
/// Feeds are line-oriented with a header row; malformed rows are skipped
/// individually and a missing feed file skips that load step entirely.
/// Nothing is mutated after `load` returns.
pub struct ProfileStore {
    movies: HashMap<MovieId, MovieRecord>,
    tags: HashMap<MovieId, HashSet<String>>,
    ratings: HashMap<MovieId, Vec<f64>>,
    target_ratings: HashMap<MovieId, f64>,
    liked: HashSet<MovieId>,
    target_user_id: u32,
    like_threshold: f64,
}

impl ProfileStore {
    pub fn load(datasets: &DatasetConfig, profile: &ProfileConfig) -> Self {
        let mut store = Self {
            movies: HashMap::new(),
            tags: HashMap::new(),
            ratings: HashMap::new(),
            target_ratings: HashMap::new(),
            liked: HashSet::new(),
            target_user_id: profile.target_user_id,
            like_threshold: profile.like_threshold,
        };

        store.load_movies(&datasets.movies);
        store.load_tags(&datasets.tags);
        store.load_ratings(&datasets.ratings);

        info!(
            movies = store.movies.len(),
            tagged = store.tags.len(),
            rated = store.ratings.len(),
            rating_rows = store.rating_row_count(),
            liked = store.liked.len(),
            "profile store loaded"
        );
        store
    }

    pub fn load_movies(&mut self, path: &Path) {
        match self.read_movies(path) {
            Ok(rows) => info!(rows, path = %path.display(), "loaded movies feed"),
            Err(e) => warn!(path = %path.display(), "skipping movies feed: {e}"),
        }
    }

    pub fn load_tags(&mut self, path: &Path) {
        match self.read_tags(path) {
            Ok(rows) => info!(rows, path = %path.display(), "loaded tags feed"),
            Err(e) => warn!(path = %path.display(), "skipping tags feed: {e}"),
        }
    }

    pub fn load_ratings(&mut self, path: &Path) {
        match self.read_ratings(path) {
            Ok(rows) => info!(rows, path = %path.display(), "loaded ratings feed"),
            Err(e) => warn!(path = %path.display(), "skipping ratings feed: {e}"),
        }
    }

    fn read_movies(&mut self, path: &Path) -> Result<usize> {
        let mut rows = 0;
        for line in data_lines(path)? {
            match parse_movie_row(&line) {
                Ok(record) => {
                    self.movies.insert(record.id, record);
                    rows += 1;
                }
                Err(e) => debug!("skipping movies row: {e}"),
            }
        }
        Ok(rows)
    }

    fn read_tags(&mut self, path: &Path) -> Result<usize> {
        let mut rows = 0;
        for line in data_lines(path)? {
            match parse_tag_row(&line) {
                Ok((movie_id, tag)) => {
                    self.tags.entry(movie_id).or_default().insert(tag);
                    rows += 1;
                }
                Err(e) => debug!("skipping tags row: {e}"),
            }
        }
        Ok(rows)
    }

    fn read_ratings(&mut self, path: &Path) -> Result<usize> {
        let mut rows = 0;
        for line in data_lines(path)? {
            match parse_rating_row(&line) {
                Ok((user_id, movie_id, rating)) => {
                    self.ratings.entry(movie_id).or_default().push(rating);
                    if user_id == self.target_user_id {
                        self.target_ratings.entry(movie_id).or_insert(rating);
                        if rating >= self.like_threshold {
                            self.liked.insert(movie_id);
                        }
                    }
                    rows += 1;
                }
                Err(e) => debug!("skipping ratings row: {e}"),
            }
        }
        Ok(rows)
    }

    pub fn movie(&self, id: MovieId) -> Option<&MovieRecord> {
        self.movies.get(&id)
    }

    pub fn tags_for(&self, id: MovieId) -> Option<&HashSet<String>> {
        self.tags.get(&id)
    }

    pub fn liked(&self) -> &HashSet<MovieId> {
        &self.liked
    }

    /// Titles of the liked movies, skipping ids with no movie record.
    pub fn liked_titles(&self) -> Vec<&str> {
        self.liked
            .iter()
            .filter_map(|id| self.movies.get(id))
            .map(|record| record.title.as_str())
            .collect()
    }

    pub fn target_rating(&self, id: MovieId) -> Option<f64> {
        self.target_ratings.get(&id).copied()
    }

    pub fn rating_row_count(&self) -> usize {
        self.ratings.values().map(Vec::len).sum()
    }

    /// Resolves a normalized title back to a movie id by case-insensitive
    /// exact match against stored titles with parenthesized segments
    /// stripped. The smallest matching id wins when titles collide.
    pub fn resolve_title(&self, title: &NormalizedTitle) -> Option<MovieId> {
        let wanted = title.as_str().to_lowercase();
        self.movies
            .iter()
            .filter(|(_, record)| strip_parenthetical(&record.title).to_lowercase() == wanted)
            .map(|(id, _)| *id)
            .min()
    }
}

fn data_lines(path: &Path) -> Result<impl Iterator<Item = String>> {
    let reader = BufReader::new(File::open(path)?);
    // Header row is always skipped.
    Ok(reader.lines().map_while(|line| line.ok()).skip(1))
}

fn parse_movie_row(line: &str) -> Result<MovieRecord, RowError> {
    let parts: Vec<&str> = line.splitn(3, ',').collect();
    if parts.len() < 3 {
        return Err(RowError::MissingFields(3));
    }
    let id = parts[0].parse().map_err(|_| RowError::BadId)?;
    Ok(MovieRecord {
        id,
        title: parts[1].to_string(),
        genres: parts[2].to_string(),
    })
}

fn parse_tag_row(line: &str) -> Result<(MovieId, String), RowError> {
    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() < 3 {
        return Err(RowError::MissingFields(3));
    }
    let movie_id = parts[1].parse().map_err(|_| RowError::BadId)?;
    Ok((movie_id, parts[2].to_string()))
}

fn parse_rating_row(line: &str) -> Result<(u32, MovieId, f64), RowError> {
    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() < 4 {
        return Err(RowError::MissingFields(4));
    }
    let user_id = parts[0].parse().map_err(|_| RowError::BadId)?;
    let movie_id = parts[1].parse().map_err(|_| RowError::BadId)?;
    let rating = parts[2].parse().map_err(|_| RowError::BadRating)?;
    Ok((user_id, movie_id, rating))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_movie_row() {
        let record = parse_movie_row("1,Toy Story (1995),Adventure|Animation").unwrap();
        assert_eq!(record.id, 1);
        assert_eq!(record.title, "Toy Story (1995)");
        assert_eq!(record.genres, "Adventure|Animation");

        // Genre field may itself contain commas; only the first two splits count.
        let record = parse_movie_row("2,Jumanji (1995),Adventure,Children").unwrap();
        assert_eq!(record.genres, "Adventure,Children");

        assert!(parse_movie_row("3,missing genres").is_err());
        assert!(parse_movie_row("abc,Title,Drama").is_err());
    }

    #[test]
    fn test_parse_rating_row() {
        let (user, movie, rating) = parse_rating_row("1,31,2.5,1260759144").unwrap();
        assert_eq!((user, movie), (1, 31));
        assert!((rating - 2.5).abs() < f64::EPSILON);

        assert!(parse_rating_row("1,31,bad,1260759144").is_err());
        assert!(parse_rating_row("1,31,2.5").is_err());
    }

    #[test]
    fn test_parse_tag_row() {
        let (movie, tag) = parse_tag_row("15,339,sandra bullock,1138537770").unwrap();
        assert_eq!(movie, 339);
        assert_eq!(tag, "sandra bullock");
    }
}
