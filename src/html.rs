//! Single-page dashboard markup. Figures are embedded as JSON and drawn by
//! Plotly.js in the browser.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::dashboard::{ChartSlot, Dashboard, LAYOUT_ROWS, SIMILAR_SLOT_ID};

const PLOTLY_JS: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";
const BOOTSTRAP_CSS: &str = "https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css";

pub fn render_page(dashboard: &Dashboard) -> String {
    let rows: String = LAYOUT_ROWS
        .iter()
        .map(|ids| {
            let slots: Vec<&ChartSlot> = ids.iter().filter_map(|id| dashboard.slot(id)).collect();
            render_row(&slots, dashboard)
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Visualizing the FIFA Dataset</title>
    <link rel="stylesheet" href="{bootstrap}">
    <script src="{plotly}"></script>
    <style>{css}</style>
</head>
<body>
<div class="card"><div class="card-body" style="background-color:#fafafa">
    <div class="row"><div class="col center-flex mt-3">
        <div class="display-3 text-primary text-center">Visualizing the FIFA Dataset</div>
    </div></div>
    <br>
    <div class="row"><div class="col center-flex">
        <strong class="display-6 mb-3 text-danger text-center">FIFA 21 Men's Dataset from Kaggle</strong>
    </div></div>
    <br><br>
{rows}
    <footer class="text-muted text-center small mt-4">{players} players &middot; built {built}</footer>
</div></div>
<script id="figures" type="application/json">{figures}</script>
<script>{js}</script>
</body>
</html>"#,
        bootstrap = BOOTSTRAP_CSS,
        plotly = PLOTLY_JS,
        css = inline_css(),
        rows = rows,
        players = dashboard.player_count(),
        built = dashboard.built_at().format("%Y-%m-%d %H:%M UTC"),
        figures = embedded_figures(dashboard),
        js = inline_javascript(),
    )
}

fn row_class(slots: &[&ChartSlot]) -> &'static str {
    // Narrow single cards are centred.
    match slots {
        [only] if only.width < 12 => "row justify-content-center align-items-center",
        _ => "row align-items-center",
    }
}

fn render_row(slots: &[&ChartSlot], dashboard: &Dashboard) -> String {
    let class = row_class(slots);
    let headings: String = slots
        .iter()
        .map(|slot| {
            format!(
                r##"        <div class="col-{w}"><div class="card"><div class="card-body" style="background-color:#E8EAF6"><div style="text-align:center"><a class="list-group-item list-group-item-action" href="#{anchor}"><h3>{heading}</h3></a></div></div></div></div>
"##,
                w = slot.width,
                anchor = slot.anchor,
                heading = html_escape(slot.heading),
            )
        })
        .collect();
    let figures: String = slots
        .iter()
        .map(|slot| {
            let control = if slot.id == SIMILAR_SLOT_ID {
                render_dropdown(dashboard)
            } else {
                String::new()
            };
            format!(
                r#"        <div class="col-{w}" id="{anchor}">{control}<div class="card"><div class="card-body">{body}</div></div></div>
"#,
                w = slot.width,
                anchor = slot.anchor,
                control = control,
                body = render_figure_body(slot),
            )
        })
        .collect();
    format!(
        "    <div class=\"{class}\">\n{headings}    </div>\n    <br>\n    <div class=\"{class}\">\n{figures}    </div>\n    <br><br>\n"
    )
}

fn render_figure_body(slot: &ChartSlot) -> String {
    match &slot.error {
        Some(err) if slot.figure.is_none() => format!(
            r#"<div class="chart-error alert alert-warning" id="{id}">Chart unavailable: {msg}</div>"#,
            id = slot.id,
            msg = html_escape(err),
        ),
        _ => format!(r#"<div class="chart" id="{id}"></div>"#, id = slot.id),
    }
}

fn render_dropdown(dashboard: &Dashboard) -> String {
    let options: String = dashboard
        .dropdown_names()
        .iter()
        .map(|name| {
            let name = html_escape(name);
            format!(r#"<option value="{name}">{name}</option>"#)
        })
        .collect();
    format!(
        r#"<div class="col-3 mb-2"><select id="name" class="form-select">{options}</select><div id="name-error" class="text-danger small mt-1"></div></div>"#
    )
}

fn embedded_figures(dashboard: &Dashboard) -> String {
    let mut figures: BTreeMap<&str, &Value> = dashboard
        .slots()
        .iter()
        .filter_map(|slot| slot.figure.as_ref().map(|fig| (slot.id, fig)))
        .collect();
    if let Some(fig) = dashboard.initial_similar().figure.as_ref() {
        figures.insert(SIMILAR_SLOT_ID, fig);
    }
    let json = serde_json::to_string(&figures).unwrap_or_else(|_| "{}".to_string());
    // Keep the script block from being closed early by data.
    json.replace("</", "<\\/")
}

fn inline_css() -> &'static str {
    r#"
body { background-color: #fafafa; }
.center-flex { display: flex; justify-content: center; }
.chart { min-height: 450px; }
.chart-error { min-height: 120px; display: flex; align-items: center; justify-content: center; }
"#
}

fn inline_javascript() -> &'static str {
    r#"
(function () {
    const figures = JSON.parse(document.getElementById('figures').textContent);
    for (const [id, fig] of Object.entries(figures)) {
        const el = document.getElementById(id);
        if (el) { Plotly.newPlot(el, fig.data, fig.layout, { responsive: true }); }
    }
    const select = document.getElementById('name');
    const errorBox = document.getElementById('name-error');
    if (!select) { return; }
    select.addEventListener('change', async function () {
        errorBox.textContent = '';
        try {
            const resp = await fetch('/api/similar?name=' + encodeURIComponent(select.value));
            const body = await resp.json();
            if (!resp.ok) {
                errorBox.textContent = body.error || 'lookup failed';
                return;
            }
            Plotly.react('similar_players', body.data, body.layout, { responsive: true });
        } catch (err) {
            errorBox.textContent = 'request failed: ' + err;
        }
    });
})();
"#
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
