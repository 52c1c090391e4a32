use std::collections::BTreeMap;

use serde::Serialize;

use crate::dataset::{PlayerRecord, Skill};
use crate::units::{self, UnitParseError};

pub const TOP_CATEGORIES: usize = 20;
pub const NATION_MIN_PLAYERS: usize = 200;
pub const CLUB_MIN_PLAYERS: usize = 25;
pub const BEST_PLAYERS: usize = 100;
pub const PROSPECTS: usize = 50;
pub const PROSPECT_MAX_AGE: u32 = 25;
pub const DROPDOWN_NAMES: usize = 100;

/// Attributes compared per position in the radar view.
pub const RADAR_SKILLS: [Skill; 10] = [
    Skill::HeadingAccuracy,
    Skill::ShortPassing,
    Skill::Dribbling,
    Skill::Curve,
    Skill::FkAccuracy,
    Skill::LongPassing,
    Skill::BallControl,
    Skill::SprintSpeed,
    Skill::ShotPower,
    Skill::Jumping,
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub key: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupPerformance {
    pub key: String,
    pub avg_overall: f64,
    pub players: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodyProfile {
    pub name: String,
    pub nationality: String,
    pub club: String,
    pub height_cm: f64,
    pub weight_lbs: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayProfile {
    pub name: String,
    pub club: String,
    pub nationality: String,
    pub best_position: String,
    pub value_eur: f64,
    pub wage_eur: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatedPlayer {
    pub name: String,
    pub overall: u32,
    pub age: u32,
    pub club: String,
    pub best_position: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProspectPlayer {
    pub name: String,
    pub age: u32,
    pub nationality: String,
    pub club: String,
    pub potential: u32,
    pub best_position: String,
    pub overall: u32,
    pub value: String,
    pub release_clause: String,
}

/// Wide row: per-position mean of each `RADAR_SKILLS` attribute, same order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionProfile {
    pub position: String,
    pub averages: Vec<f64>,
}

/// Long-format row for radial charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarPoint {
    pub series: String,
    pub attribute: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    #[error("player \"{player}\": {source}")]
    Field {
        player: String,
        #[source]
        source: UnitParseError,
    },
}

fn count_by<'a, K, F>(players: &'a [PlayerRecord], key: F) -> BTreeMap<K, usize>
where
    K: Ord,
    F: Fn(&'a PlayerRecord) -> K,
{
    let mut counts = BTreeMap::new();
    for p in players {
        *counts.entry(key(p)).or_insert(0) += 1;
    }
    counts
}

/// Counts per key, largest first. Equal counts keep key order.
fn ranked_counts<K, F>(players: &[PlayerRecord], key: F, limit: Option<usize>) -> Vec<CategoryCount>
where
    K: Ord + ToString,
    F: Fn(&PlayerRecord) -> K,
{
    let mut rows: Vec<CategoryCount> = count_by(players, key)
        .into_iter()
        .map(|(k, count)| CategoryCount {
            key: k.to_string(),
            count,
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    if let Some(limit) = limit {
        rows.truncate(limit);
    }
    rows
}

pub fn nation_participation(players: &[PlayerRecord]) -> Vec<CategoryCount> {
    ranked_counts(players, |p| p.nationality.clone(), Some(TOP_CATEGORIES))
}

pub fn club_participation(players: &[PlayerRecord]) -> Vec<CategoryCount> {
    ranked_counts(players, |p| p.club.clone(), Some(TOP_CATEGORIES))
}

pub fn position_participation(players: &[PlayerRecord]) -> Vec<CategoryCount> {
    ranked_counts(players, |p| p.best_position.clone(), Some(TOP_CATEGORIES))
}

pub fn age_distribution(players: &[PlayerRecord]) -> Vec<CategoryCount> {
    ranked_counts(players, |p| p.age, None)
}

fn performance_by<'a, F>(
    players: &'a [PlayerRecord],
    key: F,
    min_players: usize,
) -> Vec<GroupPerformance>
where
    F: Fn(&'a PlayerRecord) -> &'a str,
{
    let mut sums: BTreeMap<&str, u64> = BTreeMap::new();
    for p in players {
        *sums.entry(key(p)).or_insert(0) += u64::from(p.overall);
    }
    let counts = count_by(players, &key);

    sums.into_iter()
        .filter_map(|(k, sum)| {
            let n = counts.get(k).copied().unwrap_or(0);
            if n < min_players {
                return None;
            }
            Some(GroupPerformance {
                key: k.to_string(),
                avg_overall: sum as f64 / n as f64,
                players: n,
            })
        })
        .collect()
}

pub fn nation_performance(players: &[PlayerRecord]) -> Vec<GroupPerformance> {
    performance_by(players, |p| p.nationality.as_str(), NATION_MIN_PLAYERS)
}

pub fn club_performance(players: &[PlayerRecord]) -> Vec<GroupPerformance> {
    performance_by(players, |p| p.club.as_str(), CLUB_MIN_PLAYERS)
}

pub fn body_profiles(players: &[PlayerRecord]) -> Result<Vec<BodyProfile>, PipelineError> {
    players
        .iter()
        .map(|p| -> Result<BodyProfile, PipelineError> {
            let field = |source| PipelineError::Field {
                player: p.name.clone(),
                source,
            };
            Ok(BodyProfile {
                name: p.name.clone(),
                nationality: p.nationality.clone(),
                club: p.club.clone(),
                height_cm: units::parse_height_cm(&p.height).map_err(field)?,
                weight_lbs: units::parse_weight_lbs(&p.weight).map_err(field)?,
            })
        })
        .collect()
}

pub fn pay_profiles(players: &[PlayerRecord]) -> Result<Vec<PayProfile>, PipelineError> {
    players
        .iter()
        .map(|p| -> Result<PayProfile, PipelineError> {
            let field = |source| PipelineError::Field {
                player: p.name.clone(),
                source,
            };
            Ok(PayProfile {
                name: p.name.clone(),
                club: p.club.clone(),
                nationality: p.nationality.clone(),
                best_position: p.best_position.clone(),
                value_eur: units::parse_euros(&p.value).map_err(field)?,
                wage_eur: units::parse_euros(&p.wage).map_err(field)?,
            })
        })
        .collect()
}

/// Highest overall first; `sort_by` is stable so equal ratings keep table order.
fn by_overall_desc(players: &[PlayerRecord]) -> Vec<&PlayerRecord> {
    let mut sorted: Vec<&PlayerRecord> = players.iter().collect();
    sorted.sort_by(|a, b| b.overall.cmp(&a.overall));
    sorted
}

pub fn best_players(players: &[PlayerRecord]) -> Vec<RatedPlayer> {
    by_overall_desc(players)
        .into_iter()
        .take(BEST_PLAYERS)
        .map(|p| RatedPlayer {
            name: p.name.clone(),
            overall: p.overall,
            age: p.age,
            club: p.club.clone(),
            best_position: p.best_position.clone(),
        })
        .collect()
}

pub fn dropdown_names(players: &[PlayerRecord]) -> Vec<String> {
    by_overall_desc(players)
        .into_iter()
        .take(DROPDOWN_NAMES)
        .map(|p| p.name.clone())
        .collect()
}

/// Young players who have not reached their potential yet.
pub fn highest_potential(players: &[PlayerRecord]) -> Vec<ProspectPlayer> {
    let mut young: Vec<&PlayerRecord> = players
        .iter()
        .filter(|p| p.age < PROSPECT_MAX_AGE && p.potential > p.overall)
        .collect();
    young.sort_by(|a, b| b.potential.cmp(&a.potential));
    young
        .into_iter()
        .take(PROSPECTS)
        .map(|p| ProspectPlayer {
            name: p.name.clone(),
            age: p.age,
            nationality: p.nationality.clone(),
            club: p.club.clone(),
            potential: p.potential,
            best_position: p.best_position.clone(),
            overall: p.overall,
            value: p.value.clone(),
            release_clause: p.release_clause.clone(),
        })
        .collect()
}

pub fn position_attribute_profiles(players: &[PlayerRecord]) -> Vec<PositionProfile> {
    let mut sums: BTreeMap<&str, (Vec<f64>, usize)> = BTreeMap::new();
    for p in players {
        let entry = sums
            .entry(p.best_position.as_str())
            .or_insert_with(|| (vec![0.0; RADAR_SKILLS.len()], 0));
        for (slot, skill) in entry.0.iter_mut().zip(RADAR_SKILLS) {
            *slot += p.skills.get(skill);
        }
        entry.1 += 1;
    }

    sums.into_iter()
        .map(|(position, (totals, n))| PositionProfile {
            position: position.to_string(),
            averages: totals.into_iter().map(|t| t / n as f64).collect(),
        })
        .collect()
}

/// Melts the wide table: every position for the first attribute, then the next.
/// A profile with fewer averages than `RADAR_SKILLS` contributes only the
/// attributes it has.
pub fn radar_long(profiles: &[PositionProfile]) -> Vec<RadarPoint> {
    let mut out = Vec::with_capacity(profiles.len() * RADAR_SKILLS.len());
    for (idx, skill) in RADAR_SKILLS.iter().enumerate() {
        for profile in profiles {
            let Some(&value) = profile.averages.get(idx) else {
                continue;
            };
            out.push(RadarPoint {
                series: profile.position.clone(),
                attribute: skill.label().to_string(),
                value,
            });
        }
    }
    out
}
