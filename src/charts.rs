//! Plotly figure descriptions (`{"data": [...], "layout": {...}}`) built from
//! pipeline tables. The browser only draws them.

use serde_json::{Value, json};

use crate::aggregates::{
    BodyProfile, CategoryCount, GroupPerformance, PayProfile, PositionProfile, ProspectPlayer,
    RADAR_SKILLS, RatedPlayer,
};
use crate::portraits::{PORTRAIT_SLOTS, Portrait};
use crate::similarity::SimilarPlayers;

const COLOR_SCALE: &str = "Viridis";
const RADAR_RANGE: [f64; 2] = [13.0, 80.0];

fn layout(title: &str) -> Value {
    json!({
        "title": { "text": title },
        "margin": { "t": 60, "l": 50, "r": 20, "b": 50 },
        "template": "plotly_white",
    })
}

/// Scales a value into a marker diameter between 4 and 24 px.
fn marker_sizes(values: &[f64]) -> Vec<f64> {
    let max = values.iter().copied().fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return vec![4.0; values.len()];
    }
    values.iter().map(|v| 4.0 + 20.0 * (v / max).max(0.0)).collect()
}

fn color_marker(color: &[f64], size: Option<&[f64]>, label: &str) -> Value {
    let mut marker = json!({
        "color": color,
        "colorscale": COLOR_SCALE,
        "showscale": true,
        "colorbar": { "title": { "text": label } },
    });
    if let Some(size) = size {
        marker["size"] = json!(marker_sizes(size));
        marker["sizemode"] = json!("diameter");
    }
    marker
}

pub fn category_bar(rows: &[CategoryCount], axis: &str, title: &str) -> Value {
    let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
    let counts: Vec<f64> = rows.iter().map(|r| r.count as f64).collect();
    let mut layout = layout(title);
    layout["xaxis"] = json!({ "title": { "text": axis }, "type": "category" });
    layout["yaxis"] = json!({ "title": { "text": "Counts" } });
    json!({
        "data": [{
            "type": "bar",
            "x": keys,
            "y": counts,
            "marker": color_marker(&counts, None, "Counts"),
        }],
        "layout": layout,
    })
}

/// Age keys are numeric, so the axis stays linear regardless of row order.
pub fn age_bar(rows: &[CategoryCount], title: &str) -> Value {
    let mut fig = category_bar(rows, "Age", title);
    fig["layout"]["xaxis"]["type"] = json!("linear");
    fig
}

pub fn performance_scatter(rows: &[GroupPerformance], group: &str, title: &str) -> Value {
    let avg: Vec<f64> = rows.iter().map(|r| r.avg_overall).collect();
    let counts: Vec<f64> = rows.iter().map(|r| r.players as f64).collect();
    let labels: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
    let mut layout = layout(title);
    layout["xaxis"] = json!({ "title": { "text": "Overall Ratings" } });
    layout["yaxis"] = json!({ "title": { "text": "Player Counts" } });
    json!({
        "data": [{
            "type": "scatter",
            "mode": "markers",
            "x": avg,
            "y": counts,
            "text": labels,
            "hovertemplate": format!("{group}: %{{text}}<br>Overall: %{{x:.2f}}<br>Players: %{{y}}<extra></extra>"),
            "marker": color_marker(&counts, Some(&avg), "Player Counts"),
        }],
        "layout": layout,
    })
}

pub fn body_scatter(rows: &[BodyProfile], title: &str) -> Value {
    let weight: Vec<f64> = rows.iter().map(|r| r.weight_lbs).collect();
    let height: Vec<f64> = rows.iter().map(|r| r.height_cm).collect();
    let hover: Vec<String> = rows
        .iter()
        .map(|r| format!("{}<br>{}<br>{}", r.name, r.nationality, r.club))
        .collect();
    let mut layout = layout(title);
    layout["xaxis"] = json!({ "title": { "text": "Weight in lb" } });
    layout["yaxis"] = json!({ "title": { "text": "Ht in cm" } });
    json!({
        "data": [{
            "type": "scattergl",
            "mode": "markers",
            "x": weight,
            "y": height,
            "text": hover,
            "marker": color_marker(&height, Some(&weight), "Ht in cm"),
        }],
        "layout": layout,
    })
}

pub fn pay_scatter(rows: &[PayProfile], title: &str) -> Value {
    let value: Vec<f64> = rows.iter().map(|r| r.value_eur).collect();
    let wage: Vec<f64> = rows.iter().map(|r| r.wage_eur).collect();
    let hover: Vec<String> = rows
        .iter()
        .map(|r| format!("{}<br>{}<br>{}<br>{}", r.name, r.club, r.nationality, r.best_position))
        .collect();
    let mut layout = layout(title);
    layout["xaxis"] = json!({ "title": { "text": "Value in €" } });
    layout["yaxis"] = json!({ "title": { "text": "Wage in €" } });
    json!({
        "data": [{
            "type": "scattergl",
            "mode": "markers",
            "x": value,
            "y": wage,
            "text": hover,
            "marker": color_marker(&value, Some(&wage), "Value in €"),
        }],
        "layout": layout,
    })
}

pub fn best_players_scatter(rows: &[RatedPlayer], title: &str) -> Value {
    let age: Vec<f64> = rows.iter().map(|r| f64::from(r.age)).collect();
    let ova: Vec<f64> = rows.iter().map(|r| f64::from(r.overall)).collect();
    let hover: Vec<String> = rows
        .iter()
        .map(|r| format!("{}<br>{}<br>{}", r.name, r.club, r.best_position))
        .collect();
    let mut layout = layout(title);
    layout["xaxis"] = json!({ "title": { "text": "Age" } });
    layout["yaxis"] = json!({ "title": { "text": "OVA" } });
    json!({
        "data": [{
            "type": "scatter",
            "mode": "markers",
            "x": age,
            "y": ova,
            "text": hover,
            "marker": color_marker(&age, Some(&ova), "Age"),
        }],
        "layout": layout,
    })
}

pub fn prospects_scatter(rows: &[ProspectPlayer], title: &str) -> Value {
    let age: Vec<f64> = rows.iter().map(|r| f64::from(r.age)).collect();
    let pot: Vec<f64> = rows.iter().map(|r| f64::from(r.potential)).collect();
    let hover: Vec<String> = rows
        .iter()
        .map(|r| {
            format!(
                "{}<br>Age {}<br>{}<br>{}<br>OVA {}<br>Value {}<br>Release {}",
                r.name, r.age, r.nationality, r.best_position, r.overall, r.value, r.release_clause
            )
        })
        .collect();
    let mut layout = layout(title);
    layout["xaxis"] = json!({ "title": { "text": "Age" } });
    layout["yaxis"] = json!({ "title": { "text": "POT" } });
    json!({
        "data": [{
            "type": "scatter",
            "mode": "markers",
            "x": age,
            "y": pot,
            "text": hover,
            "marker": color_marker(&age, Some(&pot), "Age"),
        }],
        "layout": layout,
    })
}

fn closed(mut values: Vec<f64>, mut labels: Vec<String>) -> (Vec<f64>, Vec<String>) {
    if let (Some(v), Some(l)) = (values.first().copied(), labels.first().cloned()) {
        values.push(v);
        labels.push(l);
    }
    (values, labels)
}

/// One polar trace per position; a slider shows one position at a time.
pub fn position_radar(profiles: &[PositionProfile], title: &str) -> Value {
    let labels: Vec<String> = RADAR_SKILLS.iter().map(|s| s.label().to_string()).collect();
    let traces: Vec<Value> = profiles
        .iter()
        .enumerate()
        .map(|(idx, profile)| {
            let (r, theta) = closed(profile.averages.clone(), labels.clone());
            json!({
                "type": "scatterpolar",
                "name": profile.position,
                "r": r,
                "theta": theta,
                "fill": "toself",
                "visible": idx == 0,
            })
        })
        .collect();
    let steps: Vec<Value> = profiles
        .iter()
        .enumerate()
        .map(|(idx, profile)| {
            let visible: Vec<bool> = (0..profiles.len()).map(|i| i == idx).collect();
            json!({
                "label": profile.position,
                "method": "update",
                "args": [{ "visible": visible }],
            })
        })
        .collect();

    let mut layout = layout(title);
    layout["title"]["x"] = json!(0.5);
    layout["title"]["xanchor"] = json!("center");
    layout["polar"] = json!({ "radialaxis": { "range": RADAR_RANGE } });
    layout["showlegend"] = json!(false);
    layout["height"] = json!(600);
    layout["sliders"] = json!([{ "active": 0, "currentvalue": { "prefix": "BP: " }, "steps": steps }]);
    json!({ "data": traces, "layout": layout })
}

/// Filled polar trace per player plus a portrait (or placeholder) per slot.
pub fn similar_players_radar(result: &SimilarPlayers, portraits: &[Portrait]) -> Value {
    // `long` is player-major, so each entry owns one equal-sized chunk even
    // when two players share a name.
    let per_entry = result.long.len() / result.entries.len().max(1);
    let traces: Vec<Value> = result
        .entries
        .iter()
        .zip(result.long.chunks(per_entry.max(1)))
        .map(|(entry, points)| {
            let (r, theta): (Vec<f64>, Vec<String>) =
                points.iter().map(|p| (p.value, p.attribute.clone())).unzip();
            let (r, theta) = closed(r, theta);
            let name = if entry.is_query {
                entry.name.clone()
            } else {
                format!("{} ({:.3})", entry.name, entry.similarity)
            };
            json!({
                "type": "scatterpolar",
                "name": name,
                "r": r,
                "theta": theta,
                "fill": "toself",
                "opacity": 0.6,
            })
        })
        .collect();

    let images: Vec<Value> = portraits
        .iter()
        .zip(PORTRAIT_SLOTS)
        .map(|(portrait, (x, y))| {
            json!({
                "source": portrait.image_source(),
                "x": x,
                "y": y,
                "xref": "paper",
                "yref": "paper",
                "sizex": 0.3,
                "sizey": 0.3,
                "xanchor": "right",
                "yanchor": "bottom",
            })
        })
        .collect();

    let mut layout = layout(&format!("Players similar to {}", result.query));
    layout["polar"] = json!({ "radialaxis": { "range": [0.0, 1.0] } });
    layout["images"] = json!(images);
    layout["height"] = json!(650);
    json!({ "data": traces, "layout": layout })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregates::RadarPoint;
    use crate::similarity::SimilarEntry;

    #[test]
    fn bar_keeps_row_order() {
        let rows = vec![
            CategoryCount { key: "Brazil".into(), count: 220 },
            CategoryCount { key: "England".into(), count: 150 },
        ];
        let fig = category_bar(&rows, "Nationality", "Nations");
        assert_eq!(fig["data"][0]["x"], json!(["Brazil", "England"]));
        assert_eq!(fig["data"][0]["y"], json!([220.0, 150.0]));
        assert_eq!(fig["layout"]["title"]["text"], "Nations");
    }

    #[test]
    fn marker_sizes_are_bounded() {
        let sizes = marker_sizes(&[0.0, 50.0, 100.0]);
        assert_eq!(sizes, vec![4.0, 14.0, 24.0]);
        assert_eq!(marker_sizes(&[0.0, 0.0]), vec![4.0, 4.0]);
    }

    #[test]
    fn radar_shows_one_position_at_a_time() {
        let profiles = vec![
            PositionProfile { position: "CB".into(), averages: vec![60.0; RADAR_SKILLS.len()] },
            PositionProfile { position: "ST".into(), averages: vec![40.0; RADAR_SKILLS.len()] },
        ];
        let fig = position_radar(&profiles, "Overall Attributes");
        assert_eq!(fig["data"].as_array().map(Vec::len), Some(2));
        assert_eq!(fig["data"][0]["visible"], json!(true));
        assert_eq!(fig["data"][1]["visible"], json!(false));
        assert_eq!(fig["data"][0]["r"].as_array().map(Vec::len), Some(RADAR_SKILLS.len() + 1));
        assert_eq!(fig["layout"]["sliders"][0]["steps"][1]["args"][0]["visible"], json!([false, true]));
    }

    #[test]
    fn similarity_chart_attaches_portraits() {
        let entry = |name: &str, is_query: bool| SimilarEntry {
            row: 0,
            name: name.to_string(),
            similarity: 0.9,
            is_query,
        };
        let result = SimilarPlayers {
            query: "B".into(),
            candidates: 1,
            entries: vec![entry("A", false), entry("B", true)],
            long: vec![
                RadarPoint { series: "A".into(), attribute: "Curve".into(), value: 0.5 },
                RadarPoint { series: "B".into(), attribute: "Curve".into(), value: 0.7 },
            ],
        };
        let portraits = vec![
            Portrait::Fetched { url: "u".into(), data_uri: "data:image/png;base64,AA==".into() },
            Portrait::Missing { url: None, reason: "offline".into() },
        ];
        let fig = similar_players_radar(&result, &portraits);
        assert_eq!(fig["data"][0]["name"], "A (0.900)");
        assert_eq!(fig["data"][1]["name"], "B");
        assert_eq!(fig["data"][1]["r"], json!([0.7, 0.7]));
        let images = fig["layout"]["images"].as_array().unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0]["source"], "data:image/png;base64,AA==");
        assert_eq!(images[1]["x"], json!(0.1));
        assert_eq!(images[1]["y"], json!(0.8));
        assert!(images[1]["source"].as_str().unwrap().starts_with("data:image/svg+xml"));
    }
}
