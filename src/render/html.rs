//! HTML fragments for the dashboard panels.
//!
//! Every function here is pure: it takes a decoded payload and returns the
//! markup for one panel. The controller decides where the markup goes.
//! All service-provided strings are escaped.

use super::format::{
    Confidence, bar_width, escape_html, group_thousands, pct1, ratio_pct, signed_pct1, to_fixed,
};
use crate::api::{BacktestResult, DatasetInfo, FeatureImportanceReport, PredictionSet};
use crate::config::schema::DisplayConfig;

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Error,
    Info,
}

impl AlertKind {
    fn class(self) -> &'static str {
        match self {
            Self::Success => "alert alert-success fade-in",
            Self::Error => "alert alert-error",
            Self::Info => "alert alert-info",
        }
    }
}

/// One alert box. `body` is plain text and is escaped.
pub fn alert(kind: AlertKind, body: &str) -> String {
    format!(
        r#"<div class="{}">{}</div>"#,
        kind.class(),
        escape_html(body)
    )
}

/// Alert for an in-band `error` field: `Error: <message>`.
pub fn service_error(message: &str) -> String {
    alert(AlertKind::Error, &format!("Error: {message}"))
}

/// Alert for a rejected fetch, e.g. `Error running backtest: <message>`.
pub fn fetch_error(action: &str, message: &str) -> String {
    alert(AlertKind::Error, &format!("Error {action}: {message}"))
}

// ---------------------------------------------------------------------------
// Dataset info
// ---------------------------------------------------------------------------

/// Text values for the dataset-info cards, keyed by element id.
pub fn dataset_fields(info: &DatasetInfo) -> [(&'static str, String); 5] {
    [
        ("training-samples", group_thousands(info.training_samples)),
        ("forward-samples", group_thousands(info.forward_samples)),
        ("features-count", info.features_count.to_string()),
        (
            "date-range",
            format!("{} to {}", info.date_range.start, info.date_range.end),
        ),
        ("market-info", market_description(info)),
    ]
}

/// `"<market> Market | <index> | Currency: <currency>"`, with `Unknown`
/// standing in for fields the service did not send.
pub fn market_description(info: &DatasetInfo) -> String {
    let or_unknown = |v: &Option<String>| v.clone().unwrap_or_else(|| "Unknown".to_string());
    format!(
        "{} Market | {} | Currency: {}",
        or_unknown(&info.market),
        or_unknown(&info.index_name),
        or_unknown(&info.currency)
    )
}

// ---------------------------------------------------------------------------
// Backtest
// ---------------------------------------------------------------------------

fn result_card(title: &str, value: &str, positive: bool) -> String {
    let class = if positive {
        "result-value positive"
    } else {
        "result-value"
    };
    format!(
        r#"<div class="result-card"><h3>{title}</h3><div class="{class}">{value}</div></div>"#
    )
}

/// Success banner, six-metric grid and prose summary.
pub fn backtest_results(r: &BacktestResult) -> String {
    let accuracy = ratio_pct(r.accuracy, 1);
    let precision = ratio_pct(r.precision, 1);
    let stock = pct1(r.avg_stock_return);
    let market = pct1(r.avg_market_return);

    let mut html = alert(AlertKind::Success, "✅ Backtest completed successfully!");

    html.push_str(r#"<div class="results-grid fade-in">"#);
    html.push_str(&result_card("Accuracy Score", &accuracy, false));
    html.push_str(&result_card("Precision Score", &precision, false));
    html.push_str(&result_card("Total Trades", &r.total_trades.to_string(), false));
    html.push_str(&result_card("Avg Stock Return", &stock, false));
    html.push_str(&result_card("Avg Market Return", &market, false));
    html.push_str(&result_card(
        "Outperformance",
        &signed_pct1(r.outperformance),
        r.outperformance >= 0.0,
    ));
    html.push_str("</div>");

    html.push_str(&format!(
        r#"<div class="summary-panel"><h3>📊 Performance Summary</h3><p>The ML model achieved <strong>{accuracy}</strong> accuracy with <strong>{precision}</strong> precision. Based on <strong>{trades}</strong> trades, the strategy generated an average return of <strong>{stock}</strong> compared to the market's <strong>{market}</strong>, resulting in an outperformance of <strong>{points} percentage points</strong>.</p></div>"#,
        trades = r.total_trades,
        points = to_fixed(r.outperformance, 1),
    ));

    html
}

/// Condensed accuracy/outperformance pair for the overview tab.
pub fn backtest_overview(r: &BacktestResult) -> String {
    format!(
        r#"<div class="results-grid fade-in">{}{}</div>"#,
        result_card("Model Accuracy", &ratio_pct(r.accuracy, 1), false),
        result_card(
            "Strategy Outperformance",
            &signed_pct1(r.outperformance),
            r.outperformance >= 0.0
        ),
    )
}

// ---------------------------------------------------------------------------
// Predictions
// ---------------------------------------------------------------------------

/// Prediction panel: the "no stocks" notice when nothing qualified,
/// otherwise banner, ticker badges and the ranked table.
pub fn predictions(set: &PredictionSet, display: &DisplayConfig) -> String {
    let threshold = display.outperformance_threshold_pct;

    if set.total_stocks == 0 {
        return alert(
            AlertKind::Info,
            &format!(
                "No stocks predicted to outperform the market by more than {threshold}% at this time."
            ),
        );
    }

    let mut html = alert(
        AlertKind::Success,
        &format!("✅ Generated predictions for {} stocks!", set.total_stocks),
    );

    html.push_str(&format!(
        r#"<div class="banner"><h3>🎯 Predicted to Outperform {benchmark}</h3><p>The ML model identified <strong>{count} stocks</strong> predicted to outperform the {benchmark} index by more than {threshold}%.</p></div>"#,
        benchmark = escape_html(&display.benchmark_name),
        count = set.total_stocks,
    ));

    html.push_str(r#"<div class="stock-grid fade-in">"#);
    for ticker in &set.predicted_stocks {
        html.push_str(&format!(
            r#"<div class="stock-badge">{}</div>"#,
            escape_html(ticker)
        ));
    }
    html.push_str("</div>");

    html.push_str(
        r#"<div class="stock-details fade-in"><h3>Detailed Predictions (Top Picks by Probability)</h3><table class="stock-table"><thead><tr><th>Rank</th><th>Ticker</th><th>Confidence</th><th>Probability</th></tr></thead><tbody>"#,
    );
    for (index, pred) in set.detailed_predictions.iter().enumerate() {
        html.push_str(&format!(
            r#"<tr><td><strong>#{rank}</strong></td><td><strong class="ticker">{ticker}</strong></td><td>{confidence}</td><td><div class="probability-cell"><div class="probability-bar"><div class="probability-fill" style="width: {width}"></div></div><span>{pct}</span></div></td></tr>"#,
            rank = index + 1,
            ticker = escape_html(&pred.ticker),
            confidence = Confidence::from_probability(pred.probability),
            width = bar_width(pred.probability),
            pct = ratio_pct(pred.probability, 1),
        ));
    }
    html.push_str("</tbody></table></div>");

    html
}

// ---------------------------------------------------------------------------
// Feature importance
// ---------------------------------------------------------------------------

const FEATURE_NOTE: &str = r#"<div class="alert alert-info fade-in"><h4>📊 Feature Importance Analysis</h4><p>The table above shows the features that contribute most to the model's predictions. Higher importance scores indicate features that have more influence on determining whether a stock will outperform the market. The Random Forest model uses these features to make its predictions about stock performance.</p></div>"#;

/// Ranked importance table followed by the explanatory note.
///
/// The list is rendered as given; the service already limits and orders it.
pub fn feature_importance(report: &FeatureImportanceReport) -> String {
    let mut html = alert(AlertKind::Success, "✅ Feature analysis completed successfully!");

    html.push_str(&format!(
        r#"<div class="feature-table"><h3>Top {} Most Important Features</h3><table class="stock-table"><thead><tr><th>Rank</th><th>Feature</th><th>Importance Score</th><th>Visual</th></tr></thead><tbody>"#,
        report.features.len()
    ));
    for (index, score) in report.features.iter().enumerate() {
        let pct = ratio_pct(score.importance, 2);
        html.push_str(&format!(
            r#"<tr><td><strong>#{rank}</strong></td><td><strong class="ticker">{name}</strong></td><td>{pct}</td><td><div class="probability-bar fixed"><div class="probability-fill" style="width: {pct}"></div></div></td></tr>"#,
            rank = index + 1,
            name = escape_html(&score.feature),
        ));
    }
    html.push_str("</tbody></table></div>");
    html.push_str(FEATURE_NOTE);

    html
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
