use std::path::PathBuf;

use anyhow::anyhow;
use fifa_dashboard::dashboard::{Dashboard, LAYOUT_ROWS, SIMILAR_SLOT_ID};
use fifa_dashboard::dataset;
use fifa_dashboard::portraits::{FetchedImage, NoPortraits, PortraitSource};
use fifa_dashboard::similarity::LookupError;

fn fixture_players() -> Vec<dataset::PlayerRecord> {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("players_small.csv");
    dataset::load_players(&path).expect("fixture should load")
}

/// Serves a tiny PNG for every url except the ones for row 60.
struct FlakyPortraits;

impl PortraitSource for FlakyPortraits {
    fn fetch(&self, url: &str) -> anyhow::Result<FetchedImage> {
        if url.contains("/players/060/") {
            return Err(anyhow!("http 404 Not Found"));
        }
        Ok(FetchedImage {
            content_type: "image/png".to_string(),
            bytes: vec![0x89, b'P', b'N', b'G'],
        })
    }
}

#[test]
fn every_chart_builds_from_fixture() {
    let dash = Dashboard::build(&fixture_players(), "img.example", &NoPortraits);
    assert_eq!(dash.player_count(), 240);
    assert_eq!(dash.slots().len(), 11);
    for slot in dash.slots() {
        assert!(slot.is_ok(), "slot {} failed: {:?}", slot.id, slot.error);
    }
    for id in LAYOUT_ROWS.iter().flat_map(|row| row.iter()) {
        assert!(dash.slot(id).is_some(), "layout names unknown slot {id}");
    }
    assert!(dash.initial_similar().is_ok());
    assert_eq!(dash.dropdown_names()[0], "L. Messi");
}

#[test]
fn initial_similarity_is_for_top_rated_player() {
    let dash = Dashboard::build(&fixture_players(), "img.example", &NoPortraits);
    let figure = dash
        .slot(SIMILAR_SLOT_ID)
        .and_then(|slot| slot.figure.as_ref())
        .expect("initial similarity figure");
    assert_eq!(figure["layout"]["title"]["text"], "Players similar to L. Messi");
    assert_eq!(figure["data"].as_array().map(Vec::len), Some(4));
    assert_eq!(figure["data"][3]["name"], "L. Messi");
}

#[test]
fn portrait_failures_only_replace_their_slot() {
    let dash = Dashboard::build(&fixture_players(), "img.example", &NoPortraits);
    let figure = dash
        .similar_figure("L. Messi", &FlakyPortraits)
        .expect("known player");
    let images = figure["layout"]["images"].as_array().expect("images");
    assert_eq!(images.len(), 4);

    // Neighbours are rows 5, 60 and 120, then the query.
    let sources: Vec<&str> = images.iter().filter_map(|img| img["source"].as_str()).collect();
    assert!(sources[0].starts_with("data:image/png;base64,"));
    assert!(sources[1].starts_with("data:image/svg+xml;base64,"));
    assert!(sources[2].starts_with("data:image/png;base64,"));
    assert!(sources[3].starts_with("data:image/png;base64,"));
}

#[test]
fn unknown_and_blank_names_are_lookup_errors() {
    let dash = Dashboard::build(&fixture_players(), "img.example", &NoPortraits);
    assert_eq!(
        dash.similar_figure("Nobody", &NoPortraits).unwrap_err(),
        LookupError::NotFound("Nobody".to_string())
    );
    assert_eq!(dash.similar("   ").unwrap_err(), LookupError::EmptyQuery);
}

#[test]
fn substring_query_reports_all_candidates() {
    let dash = Dashboard::build(&fixture_players(), "img.example", &NoPortraits);
    let result = dash.similar("Messi").expect("substring resolves");
    assert_eq!(result.candidates, 2);
    assert_eq!(result.query_entry().map(|e| e.row), Some(0));
}
