use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Catalog identifier as providers send it: numeric in TMDb payloads,
/// but external recommenders may hand back strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum MovieId {
    Num(i64),
    Text(String),
}

impl std::fmt::Display for MovieId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MovieId::Num(n) => write!(f, "{}", n),
            MovieId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for MovieId {
    fn from(n: i64) -> Self {
        MovieId::Num(n)
    }
}

/// Normalized movie record returned to clients.
///
/// The aliases cover the field spellings external recommenders use for the
/// same data (`name`, `poster_path`, `first_air_date`, `id`); TMDb payloads
/// go through [`TmdbMovie`] instead so poster fragments pick up the CDN base.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieRecord {
    #[serde(default, alias = "name")]
    pub title: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default, alias = "poster_path")]
    pub poster: Option<String>,
    #[serde(default, alias = "first_air_date")]
    pub release_date: Option<String>,
    #[serde(default, alias = "id")]
    pub tmdb_id: Option<MovieId>,
}

/// Raw movie object as TMDb returns it from both the search and the
/// fetch-by-id endpoints.
#[derive(Debug, Deserialize)]
pub struct TmdbMovie {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
}

impl TmdbMovie {
    /// Normalizes into the fixed record shape. An absent or empty poster
    /// fragment yields an absent poster URL, never a base-URL-only string.
    pub fn into_record(self, poster_base: &str) -> MovieRecord {
        let poster = self
            .poster_path
            .filter(|p| !p.is_empty())
            .map(|p| format!("{}{}", poster_base, p));

        MovieRecord {
            title: self.title,
            overview: self.overview,
            poster,
            release_date: self.release_date,
            tmdb_id: self.id.map(MovieId::Num),
        }
    }
}

/// Removes later records sharing a non-absent id with an earlier one,
/// preserving first-seen order. Records without an id are dropped.
pub fn dedup_by_id(records: Vec<MovieRecord>) -> Vec<MovieRecord> {
    let mut seen: HashSet<MovieId> = HashSet::new();
    records
        .into_iter()
        .filter(|record| match &record.tmdb_id {
            Some(id) => seen.insert(id.clone()),
            None => false,
        })
        .collect()
}
