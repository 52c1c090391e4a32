use rayon::prelude::*;
use serde::Serialize;

use crate::aggregates::RadarPoint;
use crate::dataset::{PlayerRecord, SKILL_COUNT, Skill};

pub const NEIGHBOURS: usize = 3;

const NORM_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("player name must not be empty")]
    EmptyQuery,
    #[error("no player matches \"{0}\"")]
    NotFound(String),
}

/// Skill columns min-max scaled to [0, 1]; row order follows the player table.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    names: Vec<String>,
    rows: Vec<[f64; SKILL_COUNT]>,
}

impl FeatureMatrix {
    pub fn from_players(players: &[PlayerRecord]) -> Self {
        let mut mins = [f64::INFINITY; SKILL_COUNT];
        let mut maxs = [f64::NEG_INFINITY; SKILL_COUNT];
        for p in players {
            for (col, &v) in p.skills.as_slice().iter().enumerate() {
                mins[col] = mins[col].min(v);
                maxs[col] = maxs[col].max(v);
            }
        }

        let rows = players
            .iter()
            .map(|p| {
                let mut row = [0.0; SKILL_COUNT];
                for (col, &v) in p.skills.as_slice().iter().enumerate() {
                    let range = maxs[col] - mins[col];
                    // A constant column carries no signal and scales to zero.
                    row[col] = if range > 0.0 { (v - mins[col]) / range } else { 0.0 };
                }
                row
            })
            .collect();

        Self {
            names: players.iter().map(|p| p.name.clone()).collect(),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&[f64; SKILL_COUNT]> {
        self.rows.get(index)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Similarity of `query` against every row, in row order.
    pub fn scores_against(&self, query: usize) -> Vec<f64> {
        let Some(target) = self.rows.get(query) else {
            return Vec::new();
        };
        self.rows
            .par_iter()
            .enumerate()
            .map(|(idx, row)| {
                if idx == query {
                    1.0
                } else {
                    cosine_similarity(target, row)
                }
            })
            .collect()
    }
}

pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a < NORM_EPSILON || norm_b < NORM_EPSILON {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryMatch {
    pub index: usize,
    /// Every row whose name contains the query, in table order.
    pub candidates: Vec<usize>,
    pub exact: bool,
}

/// Resolves a dropdown or typed name to a row.
///
/// An exact name match takes precedence even when an earlier row merely
/// contains the query; otherwise the first substring match in table order is
/// used. All substring matches are reported in `candidates`.
pub fn resolve_query(names: &[String], query: &str) -> Result<QueryMatch, LookupError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(LookupError::EmptyQuery);
    }
    let candidates: Vec<usize> = names
        .iter()
        .enumerate()
        .filter(|(_, name)| name.contains(query))
        .map(|(idx, _)| idx)
        .collect();
    let exact = candidates.iter().copied().find(|&idx| names[idx] == query);
    let index = exact
        .or_else(|| candidates.first().copied())
        .ok_or_else(|| LookupError::NotFound(query.to_string()))?;
    Ok(QueryMatch {
        index,
        candidates,
        exact: exact.is_some(),
    })
}

/// Indices of the `k` rows most similar to `query`, best first. Ties go to the
/// lower row index and the query row itself never appears.
pub fn rank_neighbours(scores: &[f64], query: usize, k: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).filter(|&idx| idx != query).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));
    order.truncate(k);
    order
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarEntry {
    pub row: usize,
    pub name: String,
    pub similarity: f64,
    pub is_query: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarPlayers {
    pub query: String,
    pub candidates: usize,
    /// Neighbours best first, then the query player.
    pub entries: Vec<SimilarEntry>,
    pub long: Vec<RadarPoint>,
}

impl SimilarPlayers {
    pub fn query_entry(&self) -> Option<&SimilarEntry> {
        self.entries.iter().find(|e| e.is_query)
    }
}

pub fn find_similar(players: &[PlayerRecord], query: &str) -> Result<SimilarPlayers, LookupError> {
    let matrix = FeatureMatrix::from_players(players);
    find_similar_in(&matrix, query)
}

pub fn find_similar_in(matrix: &FeatureMatrix, query: &str) -> Result<SimilarPlayers, LookupError> {
    let found = resolve_query(matrix.names(), query)?;
    let scores = matrix.scores_against(found.index);

    let mut entries: Vec<SimilarEntry> = rank_neighbours(&scores, found.index, NEIGHBOURS)
        .into_iter()
        .map(|row| SimilarEntry {
            row,
            name: matrix.names[row].clone(),
            similarity: scores[row],
            is_query: false,
        })
        .collect();
    entries.push(SimilarEntry {
        row: found.index,
        name: matrix.names[found.index].clone(),
        similarity: scores[found.index],
        is_query: true,
    });

    let long = entries
        .iter()
        .flat_map(|entry| {
            let row = &matrix.rows[entry.row];
            Skill::ALL.iter().map(move |skill| RadarPoint {
                series: entry.name.clone(),
                attribute: skill.label().to_string(),
                value: row[skill.index()],
            })
        })
        .collect();

    Ok(SimilarPlayers {
        query: query.trim().to_string(),
        candidates: found.candidates.len(),
        entries,
        long,
    })
}
