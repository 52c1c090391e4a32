use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::aggregates::{self, RADAR_SKILLS};
use crate::dataset::PlayerRecord;

pub struct ExportReport {
    pub sheets: usize,
    pub rows: usize,
    pub errors: Vec<String>,
}

pub struct ExportProgress {
    pub current: usize,
    pub total: usize,
    pub message: String,
}

type Sheet = (&'static str, Vec<Vec<String>>);

fn header(cols: &[&str]) -> Vec<String> {
    cols.iter().map(|c| c.to_string()).collect()
}

fn count_sheet(name: &'static str, key: &str, rows: &[aggregates::CategoryCount]) -> Sheet {
    let mut out = vec![header(&[key, "Counts"])];
    out.extend(rows.iter().map(|r| vec![r.key.clone(), r.count.to_string()]));
    (name, out)
}

fn performance_sheet(name: &'static str, key: &str, rows: &[aggregates::GroupPerformance]) -> Sheet {
    let mut out = vec![header(&[key, "Overall Ratings", "Player Counts"])];
    out.extend(
        rows.iter()
            .map(|r| vec![r.key.clone(), format!("{:.2}", r.avg_overall), r.players.to_string()]),
    );
    (name, out)
}

fn collect_sheets(players: &[PlayerRecord], errors: &mut Vec<String>) -> Vec<Sheet> {
    let mut sheets = vec![
        count_sheet("Nations", "Nationality", &aggregates::nation_participation(players)),
        performance_sheet("Nation Performance", "Nationality", &aggregates::nation_performance(players)),
        count_sheet("Clubs", "Club", &aggregates::club_participation(players)),
        performance_sheet("Club Performance", "Club", &aggregates::club_performance(players)),
        count_sheet("Positions", "BP", &aggregates::position_participation(players)),
        count_sheet("Ages", "Age", &aggregates::age_distribution(players)),
    ];

    match aggregates::body_profiles(players) {
        Ok(rows) => {
            let mut out = vec![header(&["Name", "Nationality", "Club", "Ht in cm", "Weight in lb"])];
            out.extend(rows.iter().map(|r| {
                vec![
                    r.name.clone(),
                    r.nationality.clone(),
                    r.club.clone(),
                    format!("{:.2}", r.height_cm),
                    r.weight_lbs.to_string(),
                ]
            }));
            sheets.push(("Height vs Weight", out));
        }
        Err(err) => errors.push(format!("Height vs Weight: {err}")),
    }

    match aggregates::pay_profiles(players) {
        Ok(rows) => {
            let mut out = vec![header(&["Name", "Club", "Nationality", "BP", "Value in €", "Wage in €"])];
            out.extend(rows.iter().map(|r| {
                vec![
                    r.name.clone(),
                    r.club.clone(),
                    r.nationality.clone(),
                    r.best_position.clone(),
                    r.value_eur.to_string(),
                    r.wage_eur.to_string(),
                ]
            }));
            sheets.push(("Value vs Wage", out));
        }
        Err(err) => errors.push(format!("Value vs Wage: {err}")),
    }

    let mut best = vec![header(&["Name", "OVA", "Age", "Club", "BP"])];
    best.extend(aggregates::best_players(players).into_iter().map(|r| {
        vec![r.name, r.overall.to_string(), r.age.to_string(), r.club, r.best_position]
    }));
    sheets.push(("Best Players", best));

    let mut prospects = vec![header(&[
        "Name",
        "Age",
        "Nationality",
        "Club",
        "POT",
        "BP",
        "OVA",
        "Value",
        "Release Clause",
    ])];
    prospects.extend(aggregates::highest_potential(players).into_iter().map(|r| {
        vec![
            r.name,
            r.age.to_string(),
            r.nationality,
            r.club,
            r.potential.to_string(),
            r.best_position,
            r.overall.to_string(),
            r.value,
            r.release_clause,
        ]
    }));
    sheets.push(("Highest Potential", prospects));

    let mut radar = vec![{
        let mut cols = vec!["BP".to_string()];
        cols.extend(RADAR_SKILLS.iter().map(|s| s.label().to_string()));
        cols
    }];
    radar.extend(
        aggregates::position_attribute_profiles(players)
            .into_iter()
            .map(|p| {
                let mut row = vec![p.position];
                row.extend(p.averages.iter().map(|v| format!("{v:.2}")));
                row
            }),
    );
    sheets.push(("Position Attributes", radar));

    sheets
}

pub fn export_tables_with_progress(
    path: &Path,
    players: &[PlayerRecord],
    mut on_progress: impl FnMut(ExportProgress),
) -> Result<ExportReport> {
    let mut errors = Vec::new();
    let sheets = collect_sheets(players, &mut errors);
    let total = sheets.len();

    let mut workbook = Workbook::new();
    let mut rows = 0usize;
    for (idx, (name, data)) in sheets.iter().enumerate() {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(*name)
            .with_context(|| format!("name worksheet {name}"))?;
        write_rows(worksheet, data)?;
        rows += data.len().saturating_sub(1);
        on_progress(ExportProgress {
            current: idx + 1,
            total,
            message: format!("Wrote {name}"),
        });
    }

    workbook
        .save(path)
        .with_context(|| format!("save workbook {}", path.display()))?;

    Ok(ExportReport {
        sheets: total,
        rows,
        errors,
    })
}

pub fn export_tables(path: &Path, players: &[PlayerRecord]) -> Result<ExportReport> {
    export_tables_with_progress(path, players, |_| {})
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
