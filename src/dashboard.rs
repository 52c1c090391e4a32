use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::aggregates::{self, PipelineError};
use crate::charts;
use crate::dataset::PlayerRecord;
use crate::portraits::{self, PortraitSource};
use crate::similarity::{self, FeatureMatrix, LookupError, SimilarPlayers};

pub const SIMILAR_SLOT_ID: &str = "similar_players";

#[derive(Debug, Clone, Copy)]
struct SlotSpec {
    id: &'static str,
    heading: &'static str,
    anchor: &'static str,
    width: u8,
}

const NATIONS: SlotSpec = SlotSpec {
    id: "nation_wise_participation",
    heading: "Nation-wise Participation",
    anchor: "barPlot_nationWiseParticipation",
    width: 6,
};
const NATION_PERFORMANCE: SlotSpec = SlotSpec {
    id: "over_performing_players",
    heading: "Nation-wise Over-performing Players",
    anchor: "scatterPlot_nationWiseOverPerformers",
    width: 6,
};
const CLUBS: SlotSpec = SlotSpec {
    id: "club_wise_players",
    heading: "Club-wise Participation",
    anchor: "scatterPlot_clubWisePlayers",
    width: 6,
};
const CLUB_PERFORMANCE: SlotSpec = SlotSpec {
    id: "club_wise_over_performing_players",
    heading: "Club-wise Over-performing Players",
    anchor: "scatterPlot_clubWiseOverPerformers",
    width: 6,
};
const BODY: SlotSpec = SlotSpec {
    id: "height_weight_variation",
    heading: "Height vs Weight Variation",
    anchor: "scatterPlot_heightVsWeightVariation",
    width: 12,
};
const POSITIONS: SlotSpec = SlotSpec {
    id: "player_position",
    heading: "Player Position",
    anchor: "barPlot_playerPosition",
    width: 6,
};
const AGES: SlotSpec = SlotSpec {
    id: "player_age_distribution",
    heading: "Player Age Distribution",
    anchor: "histogramPlot_playerAgeDistribution",
    width: 6,
};
const PAY: SlotSpec = SlotSpec {
    id: "market_value_and_wage",
    heading: "Market Value vs Wage Distribution",
    anchor: "scatterPlot_marketValueAndWage",
    width: 12,
};
const BEST: SlotSpec = SlotSpec {
    id: "best_players",
    heading: "Best Players",
    anchor: "scatterPlot_bestPlayers",
    width: 6,
};
const PROSPECTS: SlotSpec = SlotSpec {
    id: "highest_potential",
    heading: "Players with Highest Potential",
    anchor: "scatterPlot_highestPotential",
    width: 6,
};
const RADAR: SlotSpec = SlotSpec {
    id: "overall_attributes",
    heading: "Overall Attributes",
    anchor: "radarPlot_overallAttributes",
    width: 5,
};
const SIMILAR: SlotSpec = SlotSpec {
    id: SIMILAR_SLOT_ID,
    heading: "Similar Player Finders",
    anchor: "plot_FindSimilarPlayers",
    width: 12,
};

/// Page rows, top to bottom, as slot ids.
pub const LAYOUT_ROWS: [&[&str]; 8] = [
    &[NATIONS.id, NATION_PERFORMANCE.id],
    &[CLUBS.id, CLUB_PERFORMANCE.id],
    &[BODY.id],
    &[POSITIONS.id, AGES.id],
    &[PAY.id],
    &[BEST.id, PROSPECTS.id],
    &[RADAR.id],
    &[SIMILAR.id],
];

/// One card on the page: a finished figure, or the reason it could not be built.
#[derive(Debug, Clone, Serialize)]
pub struct ChartSlot {
    pub id: &'static str,
    pub heading: &'static str,
    pub anchor: &'static str,
    pub width: u8,
    pub figure: Option<Value>,
    pub error: Option<String>,
}

impl ChartSlot {
    fn new(spec: SlotSpec, figure: Result<Value, String>) -> Self {
        let (figure, error) = match figure {
            Ok(fig) => (Some(fig), None),
            Err(err) => {
                tracing::error!(slot = spec.id, error = %err, "chart unavailable");
                (None, Some(err))
            }
        };
        Self {
            id: spec.id,
            heading: spec.heading,
            anchor: spec.anchor,
            width: spec.width,
            figure,
            error,
        }
    }

    fn pending(spec: SlotSpec) -> Self {
        Self {
            id: spec.id,
            heading: spec.heading,
            anchor: spec.anchor,
            width: spec.width,
            figure: None,
            error: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.figure.is_some()
    }
}

fn pipeline(result: Result<Value, PipelineError>) -> Result<Value, String> {
    result.map_err(|err| format!("could not build chart: {err}"))
}

/// Immutable snapshot of every chart, built once at startup. Only the
/// similarity view is recomputed afterwards.
pub struct Dashboard {
    slots: Vec<ChartSlot>,
    similar: ChartSlot,
    dropdown: Vec<String>,
    photo_urls: Vec<String>,
    matrix: FeatureMatrix,
    portrait_host: String,
    players: usize,
    built_at: DateTime<Utc>,
}

impl Dashboard {
    pub fn build(players: &[PlayerRecord], portrait_host: &str, source: &dyn PortraitSource) -> Self {
        let slots = vec![
            ChartSlot::new(
                NATIONS,
                Ok(charts::category_bar(
                    &aggregates::nation_participation(players),
                    "Nationality",
                    "Nation-wise Distribution of Players in FIFA for Top 20 Nations",
                )),
            ),
            ChartSlot::new(
                NATION_PERFORMANCE,
                Ok(charts::performance_scatter(
                    &aggregates::nation_performance(players),
                    "Nationality",
                    "Overall Nationwise Player counts and Average Potential",
                )),
            ),
            ChartSlot::new(
                CLUBS,
                Ok(charts::category_bar(
                    &aggregates::club_participation(players),
                    "Club",
                    "Club-wise Distribution of Players in FIFA for Top 20 Clubs",
                )),
            ),
            ChartSlot::new(
                CLUB_PERFORMANCE,
                Ok(charts::performance_scatter(
                    &aggregates::club_performance(players),
                    "Club",
                    "Overall Clubwise player counts and Average Potential",
                )),
            ),
            ChartSlot::new(
                BODY,
                pipeline(aggregates::body_profiles(players).map(|rows| {
                    charts::body_scatter(
                        &rows,
                        "Overall Height vs Weight Variation of the players in FIFA 21",
                    )
                })),
            ),
            ChartSlot::new(
                POSITIONS,
                Ok(charts::category_bar(
                    &aggregates::position_participation(players),
                    "BP",
                    "Top 20 Position-wise Player counts in FIFA",
                )),
            ),
            ChartSlot::new(
                AGES,
                Ok(charts::age_bar(
                    &aggregates::age_distribution(players),
                    "Agewise Player distribution in FIFA",
                )),
            ),
            ChartSlot::new(
                PAY,
                pipeline(aggregates::pay_profiles(players).map(|rows| {
                    charts::pay_scatter(&rows, "Value vs Wage Presentation of all the Players")
                })),
            ),
            ChartSlot::new(
                BEST,
                Ok(charts::best_players_scatter(
                    &aggregates::best_players(players),
                    "Top Football Players in the FIFA 21",
                )),
            ),
            ChartSlot::new(
                PROSPECTS,
                Ok(charts::prospects_scatter(
                    &aggregates::highest_potential(players),
                    "Age vs Maximum Potential Distribution of the young Players",
                )),
            ),
            ChartSlot::new(
                RADAR,
                Ok(charts::position_radar(
                    &aggregates::position_attribute_profiles(players),
                    "Overall Attributes of the Players in FIFA 21",
                )),
            ),
        ];

        let mut dashboard = Self {
            slots,
            similar: ChartSlot::pending(SIMILAR),
            dropdown: aggregates::dropdown_names(players),
            photo_urls: players.iter().map(|p| p.photo_url.clone()).collect(),
            matrix: FeatureMatrix::from_players(players),
            portrait_host: portrait_host.to_string(),
            players: players.len(),
            built_at: Utc::now(),
        };

        let figure = match dashboard.dropdown.first() {
            Some(first) => dashboard
                .similar_figure(first, source)
                .map_err(|err| err.to_string()),
            None => Err("no players loaded".to_string()),
        };
        dashboard.similar = ChartSlot::new(SIMILAR, figure);

        let failed = dashboard.slots.iter().filter(|s| !s.is_ok()).count();
        tracing::info!(
            players = dashboard.players,
            charts = dashboard.slots.len(),
            failed,
            "dashboard snapshot built"
        );
        dashboard
    }

    /// The static charts in page order; the similarity slot is separate.
    pub fn slots(&self) -> &[ChartSlot] {
        &self.slots
    }

    pub fn slot(&self, id: &str) -> Option<&ChartSlot> {
        if id == SIMILAR_SLOT_ID {
            return Some(&self.similar);
        }
        self.slots.iter().find(|s| s.id == id)
    }

    pub fn initial_similar(&self) -> &ChartSlot {
        &self.similar
    }

    pub fn dropdown_names(&self) -> &[String] {
        &self.dropdown
    }

    pub fn player_count(&self) -> usize {
        self.players
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn similar(&self, name: &str) -> Result<SimilarPlayers, LookupError> {
        similarity::find_similar_in(&self.matrix, name)
    }

    /// Recomputes the similarity chart for a new dropdown value.
    pub fn similar_figure(&self, name: &str, source: &dyn PortraitSource) -> Result<Value, LookupError> {
        let result = self.similar(name)?;
        let urls: Vec<&str> = result
            .entries
            .iter()
            .map(|e| self.photo_urls.get(e.row).map(String::as_str).unwrap_or(""))
            .collect();
        let portraits = portraits::load_portraits(&urls, &self.portrait_host, source);
        Ok(charts::similar_players_radar(&result, &portraits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::SkillRatings;
    use crate::portraits::NoPortraits;

    fn player(name: &str, overall: u32, skill: f64) -> PlayerRecord {
        PlayerRecord {
            name: name.to_string(),
            overall,
            potential: overall + 5,
            age: 21,
            nationality: "Wales".to_string(),
            club: "Cardiff".to_string(),
            best_position: "CM".to_string(),
            height: "5'10\"".to_string(),
            weight: "150lbs".to_string(),
            value: "€2M".to_string(),
            wage: "€8K".to_string(),
            photo_url: "https://cdn.sofifa.com/players/1.png".to_string(),
            skills: SkillRatings::uniform(skill),
            ..Default::default()
        }
    }

    #[test]
    fn layout_covers_every_slot_once() {
        let players = vec![player("A", 70, 40.0), player("B", 80, 60.0)];
        let dash = Dashboard::build(&players, "img.example", &NoPortraits);
        let ids: Vec<&str> = LAYOUT_ROWS.iter().flat_map(|row| row.iter().copied()).collect();
        assert_eq!(ids.len(), dash.slots().len() + 1);
        for id in ids {
            assert!(dash.slot(id).is_some(), "missing slot {id}");
        }
    }

    #[test]
    fn bad_cells_only_break_their_chart() {
        let mut broken = player("Broken", 60, 50.0);
        broken.height = "tall".to_string();
        let players = vec![player("A", 70, 40.0), broken];
        let dash = Dashboard::build(&players, "img.example", &NoPortraits);

        let body = dash.slot("height_weight_variation").unwrap();
        assert!(!body.is_ok());
        assert!(body.error.as_deref().unwrap().contains("Broken"));
        assert_eq!(dash.slots().iter().filter(|s| s.is_ok()).count(), 10);
        assert!(dash.initial_similar().is_ok());
    }

    #[test]
    fn overflowing_height_is_one_error_card() {
        let mut huge = player("Huge", 60, 50.0);
        huge.height = "400000000'0\"".to_string();
        let players = vec![player("A", 70, 40.0), huge];
        let dash = Dashboard::build(&players, "img.example", &NoPortraits);

        let body = dash.slot("height_weight_variation").unwrap();
        assert!(body.error.as_deref().unwrap().contains("Huge"));
        assert_eq!(dash.slots().iter().filter(|s| s.is_ok()).count(), 10);
    }

    #[test]
    fn dropdown_starts_with_best_player() {
        let players = vec![player("A", 70, 40.0), player("B", 80, 60.0)];
        let dash = Dashboard::build(&players, "img.example", &NoPortraits);
        assert_eq!(dash.dropdown_names(), ["B", "A"]);
        let fig = dash.initial_similar().figure.as_ref().unwrap();
        assert_eq!(fig["layout"]["title"]["text"], "Players similar to B");
    }
}
