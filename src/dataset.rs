use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

pub const SKILL_COUNT: usize = 34;

/// Continuous skill ratings (0-100) compared by the similarity finder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Skill {
    Attacking,
    Crossing,
    Finishing,
    HeadingAccuracy,
    ShortPassing,
    Volleys,
    Skill,
    Dribbling,
    Curve,
    FkAccuracy,
    LongPassing,
    BallControl,
    Movement,
    Acceleration,
    SprintSpeed,
    Agility,
    Reactions,
    Balance,
    Power,
    ShotPower,
    Jumping,
    Stamina,
    Strength,
    LongShots,
    Mentality,
    Aggression,
    Interceptions,
    Positioning,
    Penalties,
    Composure,
    Defending,
    Marking,
    StandingTackle,
    SlidingTackle,
}

impl Skill {
    pub const ALL: [Skill; SKILL_COUNT] = [
        Skill::Attacking,
        Skill::Crossing,
        Skill::Finishing,
        Skill::HeadingAccuracy,
        Skill::ShortPassing,
        Skill::Volleys,
        Skill::Skill,
        Skill::Dribbling,
        Skill::Curve,
        Skill::FkAccuracy,
        Skill::LongPassing,
        Skill::BallControl,
        Skill::Movement,
        Skill::Acceleration,
        Skill::SprintSpeed,
        Skill::Agility,
        Skill::Reactions,
        Skill::Balance,
        Skill::Power,
        Skill::ShotPower,
        Skill::Jumping,
        Skill::Stamina,
        Skill::Strength,
        Skill::LongShots,
        Skill::Mentality,
        Skill::Aggression,
        Skill::Interceptions,
        Skill::Positioning,
        Skill::Penalties,
        Skill::Composure,
        Skill::Defending,
        Skill::Marking,
        Skill::StandingTackle,
        Skill::SlidingTackle,
    ];

    /// Column header in the FIFA 21 CSV.
    pub fn label(self) -> &'static str {
        match self {
            Skill::Attacking => "Attacking",
            Skill::Crossing => "Crossing",
            Skill::Finishing => "Finishing",
            Skill::HeadingAccuracy => "Heading Accuracy",
            Skill::ShortPassing => "Short Passing",
            Skill::Volleys => "Volleys",
            Skill::Skill => "Skill",
            Skill::Dribbling => "Dribbling",
            Skill::Curve => "Curve",
            Skill::FkAccuracy => "FK Accuracy",
            Skill::LongPassing => "Long Passing",
            Skill::BallControl => "Ball Control",
            Skill::Movement => "Movement",
            Skill::Acceleration => "Acceleration",
            Skill::SprintSpeed => "Sprint Speed",
            Skill::Agility => "Agility",
            Skill::Reactions => "Reactions",
            Skill::Balance => "Balance",
            Skill::Power => "Power",
            Skill::ShotPower => "Shot Power",
            Skill::Jumping => "Jumping",
            Skill::Stamina => "Stamina",
            Skill::Strength => "Strength",
            Skill::LongShots => "Long Shots",
            Skill::Mentality => "Mentality",
            Skill::Aggression => "Aggression",
            Skill::Interceptions => "Interceptions",
            Skill::Positioning => "Positioning",
            Skill::Penalties => "Penalties",
            Skill::Composure => "Composure",
            Skill::Defending => "Defending",
            Skill::Marking => "Marking",
            Skill::StandingTackle => "Standing Tackle",
            Skill::SlidingTackle => "Sliding Tackle",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkillRatings([f64; SKILL_COUNT]);

impl Default for SkillRatings {
    fn default() -> Self {
        Self([0.0; SKILL_COUNT])
    }
}

impl SkillRatings {
    pub fn uniform(value: f64) -> Self {
        Self([value; SKILL_COUNT])
    }

    pub fn get(&self, skill: Skill) -> f64 {
        self.0[skill.index()]
    }

    pub fn set(&mut self, skill: Skill, value: f64) {
        self.0[skill.index()] = value;
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// One row of the player table. Display fields (height, weight, money) keep
/// their CSV encoding; `units` turns them into numbers on demand.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerRecord {
    pub id: u32,
    pub name: String,
    pub age: u32,
    pub overall: u32,
    pub potential: u32,
    pub nationality: String,
    pub club: String,
    pub best_position: String,
    pub height: String,
    pub weight: String,
    pub value: String,
    pub wage: String,
    pub release_clause: String,
    pub photo_url: String,
    pub skills: SkillRatings,
}

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to open dataset {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("dataset is missing required column \"{0}\"")]
    MissingColumn(String),

    #[error("row {row}: column \"{column}\" has value \"{raw}\", expected a rating in 0..=100")]
    BadNumber {
        row: usize,
        column: &'static str,
        raw: String,
    },

    #[error("dataset contains no players")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct RawIdentity {
    #[serde(rename = "ID")]
    id: u32,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Age")]
    age: u32,
    #[serde(rename = "OVA")]
    overall: u32,
    #[serde(rename = "POT")]
    potential: u32,
    #[serde(rename = "Nationality", default)]
    nationality: String,
    #[serde(rename = "Club", default)]
    club: String,
    #[serde(rename = "BP", default)]
    best_position: String,
    #[serde(rename = "Height", default)]
    height: String,
    #[serde(rename = "Weight", default)]
    weight: String,
    #[serde(rename = "Value", default)]
    value: String,
    #[serde(rename = "Wage", default)]
    wage: String,
    #[serde(rename = "Release Clause", default)]
    release_clause: String,
    #[serde(rename = "Player Photo", default)]
    photo_url: String,
}

const IDENTITY_COLUMNS: [&str; 5] = ["ID", "Name", "Age", "OVA", "POT"];

const RATING_RANGE: std::ops::RangeInclusive<f64> = 0.0..=100.0;

/// Finite rating within 0..=100. `NaN`, `inf` and negatives are rejected.
fn parse_rating(cell: &str) -> Option<f64> {
    cell.parse::<f64>().ok().filter(|v| RATING_RANGE.contains(v))
}

pub fn load_players(path: &Path) -> Result<Vec<PlayerRecord>, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_players_from_reader(file)
}

pub fn load_players_from_reader<R: Read>(rdr: R) -> Result<Vec<PlayerRecord>, DatasetError> {
    let mut reader = csv::Reader::from_reader(rdr);
    let headers = reader.headers()?.clone();

    for column in IDENTITY_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(DatasetError::MissingColumn(column.to_string()));
        }
    }
    let skill_columns = Skill::ALL
        .iter()
        .map(|skill| {
            headers
                .iter()
                .position(|h| h == skill.label())
                .ok_or_else(|| DatasetError::MissingColumn(skill.label().to_string()))
        })
        .collect::<Result<Vec<usize>, DatasetError>>()?;

    let mut players = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        // Header is line 1, so data rows start at 2.
        let row = idx + 2;
        let raw: RawIdentity = record.deserialize(Some(&headers))?;

        let mut skills = SkillRatings::default();
        for (skill, &col) in Skill::ALL.iter().zip(&skill_columns) {
            let cell = record.get(col).unwrap_or("").trim();
            let value = parse_rating(cell).ok_or_else(|| DatasetError::BadNumber {
                row,
                column: skill.label(),
                raw: cell.to_string(),
            })?;
            skills.set(*skill, value);
        }

        players.push(PlayerRecord {
            id: raw.id,
            name: raw.name,
            age: raw.age,
            overall: raw.overall,
            potential: raw.potential,
            nationality: raw.nationality,
            club: raw.club.trim().to_string(),
            best_position: raw.best_position,
            height: raw.height,
            weight: raw.weight,
            value: raw.value,
            wage: raw.wage,
            release_clause: raw.release_clause,
            photo_url: raw.photo_url,
            skills,
        });
    }

    if players.is_empty() {
        return Err(DatasetError::Empty);
    }
    Ok(players)
}
