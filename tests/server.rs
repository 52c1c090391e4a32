use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use fifa_dashboard::dashboard::Dashboard;
use fifa_dashboard::dataset::{PlayerRecord, SkillRatings};
use fifa_dashboard::portraits::NoPortraits;
use fifa_dashboard::server::{AppState, router};

fn players() -> Vec<PlayerRecord> {
    ["L. Messi", "Cristiano Ronaldo", "J. Oblak", "K. De Bruyne", "Neymar Jr"]
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let mut skills = SkillRatings::uniform(40.0 + idx as f64);
            skills.set(fifa_dashboard::dataset::Skill::Finishing, 90.0 - 10.0 * idx as f64);
            PlayerRecord {
                id: idx as u32,
                name: name.to_string(),
                overall: 93 - idx as u32,
                potential: 93,
                age: 24,
                nationality: "Argentina".to_string(),
                club: "Club".to_string(),
                best_position: "ST".to_string(),
                height: "5'7\"".to_string(),
                weight: "159lbs".to_string(),
                value: "€67.5M".to_string(),
                wage: "€560K".to_string(),
                photo_url: format!("https://cdn.sofifa.com/players/{idx}/21_120.png"),
                skills,
                ..Default::default()
            }
        })
        .collect()
}

fn app() -> axum::Router {
    let dashboard = Dashboard::build(&players(), "img.example", &NoPortraits);
    router(AppState {
        dashboard: Arc::new(dashboard),
        portraits: Arc::new(NoPortraits),
    })
}

async fn get(uri: &str) -> (StatusCode, Vec<u8>) {
    let resp = app()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

#[tokio::test]
async fn index_serves_the_page() {
    let (status, body) = get("/").await;
    assert_eq!(status, StatusCode::OK);
    let page = String::from_utf8(body).unwrap();
    assert!(page.contains("Visualizing the FIFA Dataset"));
    assert!(page.contains("<select id=\"name\""));
}

#[tokio::test]
async fn healthz_is_ok() {
    let (status, body) = get("/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}

#[tokio::test]
async fn players_are_in_dropdown_order() {
    let (status, body) = get("/api/players").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<String> = serde_json::from_slice(&body).unwrap();
    assert_eq!(names[0], "L. Messi");
    assert_eq!(names.len(), 5);
}

#[tokio::test]
async fn figures_lists_static_charts() {
    let (status, body) = get("/api/figures").await;
    assert_eq!(status, StatusCode::OK);
    let slots: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(slots.as_array().map(Vec::len), Some(11));
}

#[tokio::test]
async fn similar_returns_a_figure() {
    let (status, body) = get("/api/similar?name=Neymar%20Jr").await;
    assert_eq!(status, StatusCode::OK);
    let figure: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(figure["layout"]["title"]["text"], "Players similar to Neymar Jr");
    assert_eq!(figure["data"].as_array().map(Vec::len), Some(4));
}

#[tokio::test]
async fn unknown_player_is_not_found() {
    let (status, body) = get("/api/similar?name=Nobody").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let err: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(err["error"], "no player matches \"Nobody\"");
}

#[tokio::test]
async fn missing_or_blank_name_is_a_bad_request() {
    let (status, body) = get("/api/similar").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let err: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(err["error"], "player name must not be empty");

    let (status, _) = get("/api/similar?name=%20%20").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
