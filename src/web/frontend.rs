//! Server-rendered dashboard page.
//!
//! The page is rebuilt from the [`MemoryDocument`] on every `GET /`. Each
//! contract element is emitted with its current content, classes and inline
//! style. Navigation and action buttons are plain form posts, so the page
//! works without client-side script.

use crate::controller::DashboardState;
use crate::dom::{MemoryDocument, Tab, ids};
use crate::render::format::escape_html;

const STYLE: &str = r#"
:root {
  --bg: #f5f7fb;
  --surface: #ffffff;
  --border: #e2e8f0;
  --text: #1f2937;
  --text-muted: #6b7280;
  --accent: #2563eb;
  --green: #10b981;
  --red: #ef4444;
  --radius: 10px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body { background: var(--bg); color: var(--text); font-family: var(--font); font-size: 14px; line-height: 1.5; }

.app { max-width: 1200px; margin: 0 auto; padding: 24px; }

header { display: flex; align-items: center; justify-content: space-between; margin-bottom: 24px; }
header h1 { font-size: 24px; font-weight: 600; }
header .subtitle { color: var(--text-muted); font-size: 13px; }

nav { display: flex; gap: 4px; margin-bottom: 24px; background: var(--surface); border-radius: var(--radius); padding: 4px; border: 1px solid var(--border); }
nav form { flex: 1; }
.nav-tab { width: 100%; padding: 8px 16px; border: none; border-radius: 6px; background: transparent; color: var(--text-muted); font-size: 13px; font-weight: 500; cursor: pointer; }
.nav-tab:hover { color: var(--text); }
.nav-tab.active { background: var(--accent); color: #fff; }

.tab-content { display: none; }
.tab-content.active { display: block; }

.card { background: var(--surface); border: 1px solid var(--border); border-radius: var(--radius); padding: 20px; margin-bottom: 16px; }
.card h2 { font-size: 16px; font-weight: 600; margin-bottom: 16px; }

.stats-grid, .results-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(180px, 1fr)); gap: 16px; margin-bottom: 16px; }
.stat-card, .result-card { background: var(--surface); border: 1px solid var(--border); border-radius: var(--radius); padding: 20px; text-align: center; }
.stat-card .value, .result-value { font-size: 28px; font-weight: 700; color: var(--accent); }
.result-value.positive { color: var(--green); }
.stat-card .label, .result-card h3 { font-size: 12px; color: var(--text-muted); text-transform: uppercase; letter-spacing: 0.5px; }
.market-info { color: var(--text-muted); margin-bottom: 16px; }

.btn { padding: 10px 20px; border: none; border-radius: 6px; background: var(--accent); color: #fff; font-weight: 600; cursor: pointer; }
.loading { padding: 16px; color: var(--text-muted); font-style: italic; }

.alert { padding: 14px 18px; border-radius: 8px; margin-bottom: 16px; }
.alert-success { background: #ecfdf5; color: #065f46; border: 1px solid #6ee7b7; }
.alert-error { background: #fef2f2; color: #991b1b; border: 1px solid #fca5a5; }
.alert-info { background: #eff6ff; color: #1e40af; border: 1px solid #93c5fd; }

.summary-panel { margin-top: 24px; padding: 20px; background: #f0fdf4; border-radius: var(--radius); border: 2px solid #86efac; color: #166534; }
.summary-panel h3 { margin-bottom: 10px; }
.banner { margin: 20px 0; padding: 20px; background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); border-radius: var(--radius); color: #fff; }
.banner h3 { margin-bottom: 10px; }

.stock-grid { display: flex; flex-wrap: wrap; gap: 8px; margin-bottom: 20px; }
.stock-badge { padding: 6px 14px; border-radius: 16px; background: var(--accent); color: #fff; font-weight: 600; }

.stock-table { width: 100%; border-collapse: collapse; margin-top: 12px; }
.stock-table th, .stock-table td { padding: 10px 12px; border-bottom: 1px solid var(--border); text-align: left; }
.stock-table th { color: var(--text-muted); font-size: 12px; text-transform: uppercase; }
.ticker { color: var(--accent); }
.probability-cell { display: flex; align-items: center; gap: 10px; }
.probability-bar { flex: 1; height: 10px; background: var(--border); border-radius: 5px; overflow: hidden; }
.probability-bar.fixed { flex: none; width: 200px; }
.probability-fill { height: 100%; background: linear-gradient(90deg, #667eea, #764ba2); }
.feature-table { margin-top: 20px; }

footer { margin-top: 24px; color: var(--text-muted); font-size: 12px; text-align: center; }
"#;

/// Emit one contract element with its current state.
fn element(doc: &MemoryDocument, tag: &str, id: &str, extra_class: &str) -> String {
    let Some(el) = doc.element(id) else {
        return String::new();
    };

    let mut class = el.class_attr();
    if !extra_class.is_empty() {
        if !class.is_empty() {
            class.push(' ');
        }
        class.push_str(extra_class);
    }

    let mut attrs = format!(r#" id="{}""#, escape_html(id));
    if !class.is_empty() {
        attrs.push_str(&format!(r#" class="{}""#, escape_html(&class)));
    }
    let style = el.style_attr();
    if !style.is_empty() {
        attrs.push_str(&format!(r#" style="{}""#, escape_html(&style)));
    }

    format!("<{tag}{attrs}>{}</{tag}>", el.content.to_html())
}

fn nav(doc: &MemoryDocument) -> String {
    let mut html = String::from("<nav>");
    for tab in Tab::ALL {
        html.push_str(&format!(
            r#"<form method="post" action="/tabs/{}">{}</form>"#,
            tab.id(),
            element(doc, "button", tab.nav_id(), "").replacen("<button", r#"<button type="submit""#, 1),
        ));
    }
    html.push_str("</nav>");
    html
}

fn action_button(path: &str, label: &str) -> String {
    format!(
        r#"<form method="post" action="{path}"><button class="btn" type="submit">{label}</button></form>"#
    )
}

/// Wrap a tab's body in its panel element, keeping the panel's classes.
fn panel(doc: &MemoryDocument, tab: Tab, body: &str) -> String {
    let Some(el) = doc.element(tab.id()) else {
        return String::new();
    };
    format!(
        r#"<section id="{}" class="{}">{body}</section>"#,
        tab.id(),
        escape_html(&el.class_attr())
    )
}

fn stat_card(doc: &MemoryDocument, id: &str, label: &str) -> String {
    format!(
        r#"<div class="stat-card">{}<div class="label">{label}</div></div>"#,
        element(doc, "div", id, "value")
    )
}

/// Render the full page.
pub fn render_page(doc: &MemoryDocument, state: &DashboardState, backend_url: &str) -> String {
    let dashboard = format!(
        r#"<div class="card"><h2>Dataset Overview</h2>{market}<div class="stats-grid">{training}{forward}{features}{range}{status}</div>{reload}</div><div class="card"><h2>Model Performance</h2>{overview}</div>"#,
        market = element(doc, "p", ids::MARKET_INFO, "market-info"),
        training = stat_card(doc, ids::TRAINING_SAMPLES, "Training Samples"),
        forward = stat_card(doc, ids::FORWARD_SAMPLES, "Forward Samples"),
        features = stat_card(doc, ids::FEATURES_COUNT, "Features"),
        range = stat_card(doc, ids::DATE_RANGE, "Date Range"),
        status = stat_card(doc, ids::STATUS, "Model Status"),
        reload = action_button("/actions/dataset_info", "Reload Dataset Info"),
        overview = element(doc, "div", ids::OVERVIEW_MESSAGE, ""),
    );

    let backtest = format!(
        r#"<div class="card"><h2>Backtesting</h2><p>Train on 80% of the historical data and evaluate the strategy on the held-out 20%.</p><br>{button}{loading}{results}</div>"#,
        button = action_button("/actions/backtest", "Run Backtest"),
        loading = element(doc, "div", ids::BACKTEST_LOADING, "loading"),
        results = element(doc, "div", ids::BACKTEST_RESULTS, ""),
    );

    let predictions = format!(
        r#"<div class="card"><h2>Stock Predictions</h2><p>Classify the forward sample and list the stocks expected to beat the benchmark.</p><br>{button}{loading}{results}</div>"#,
        button = action_button("/actions/predict", "Generate Predictions"),
        loading = element(doc, "div", ids::PREDICTIONS_LOADING, "loading"),
        results = element(doc, "div", ids::PREDICTIONS_RESULTS, ""),
    );

    let analysis = format!(
        r#"<div class="card"><h2>Feature Importance</h2><p>Show which fundamentals drive the model's decisions.</p><br>{button}{loading}{message}{chart}</div>"#,
        button = action_button("/actions/feature_importance", "Analyze Features"),
        loading = element(doc, "div", ids::ANALYSIS_LOADING, "loading"),
        message = element(doc, "div", ids::ANALYSIS_MESSAGE, ""),
        chart = element(doc, "div", ids::FEATURE_CHART, ""),
    );

    let refreshed = state
        .last_refreshed()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Machine Learning Stocks</title>
<style>{STYLE}</style>
</head>
<body>
<div class="app">
<header><div><h1>📈 Machine Learning Stocks</h1><div class="subtitle">Service: {backend}</div></div></header>
{nav}
{dashboard}
{backtest}
{predictions}
{analysis}
<footer>Dataset info refreshed: {refreshed}</footer>
</div>
</body>
</html>"#,
        backend = escape_html(backend_url),
        nav = nav(doc),
        dashboard = panel(doc, Tab::Dashboard, &dashboard),
        backtest = panel(doc, Tab::Backtest, &backtest),
        predictions = panel(doc, Tab::Predictions, &predictions),
        analysis = panel(doc, Tab::Analysis, &analysis),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ACTIVE, Display, Document};

    #[test]
    fn page_contains_every_contract_id() {
        let doc = MemoryDocument::dashboard();
        let page = render_page(&doc, &DashboardState::new(), "http://127.0.0.1:5000");
        for id in ids::REQUIRED {
            assert!(page.contains(&format!(r#"id="{id}""#)), "page lacks {id}");
        }
        for tab in Tab::ALL {
            assert!(page.contains(&format!(r#"action="/tabs/{}""#, tab.id())));
        }
        assert!(page.contains("Dataset info refreshed: never"));
    }

    #[test]
    fn element_reflects_classes_and_style() {
        let mut doc = MemoryDocument::dashboard();
        doc.set_text(ids::STATUS, "Active").unwrap();
        doc.set_color(ids::STATUS, "#10b981").unwrap();
        let html = element(&doc, "div", ids::STATUS, "value");
        assert_eq!(
            html,
            r#"<div id="status" class="value" style="color: #10b981">Active</div>"#
        );

        let loading = element(&doc, "div", ids::BACKTEST_LOADING, "loading");
        assert!(loading.contains(r#"style="display: none""#));
        doc.set_display(ids::BACKTEST_LOADING, Display::Block).unwrap();
        assert!(element(&doc, "div", ids::BACKTEST_LOADING, "loading").contains("display: block"));
    }

    #[test]
    fn nav_buttons_submit_and_keep_active_class() {
        let mut doc = MemoryDocument::dashboard();
        doc.add_class("nav-analysis", ACTIVE).unwrap();
        let html = nav(&doc);
        assert!(html.contains(
            r#"<button type="submit" id="nav-analysis" class="active nav-tab">Feature Analysis</button>"#
        ));
    }

    #[test]
    fn missing_element_renders_nothing() {
        let mut doc = MemoryDocument::dashboard();
        doc.remove(ids::OVERVIEW_MESSAGE);
        assert_eq!(element(&doc, "div", ids::OVERVIEW_MESSAGE, ""), "");
    }
}
