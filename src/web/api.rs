//! JSON endpoints served by the dashboard itself (not the prediction
//! service's endpoints, which the dashboard consumes).

use anyhow::{Context, Result};
use serde::Serialize;

use super::Page;
use crate::controller::{Action, DashboardState, Phase};

/// `GET /health` response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub backend_url: String,
    pub backend_reachable: bool,
    pub active_tab: &'static str,
    pub phases: PhaseSummary,
}

/// Last known phase of each loader.
#[derive(Debug, Serialize)]
pub struct PhaseSummary {
    pub dataset_info: &'static str,
    pub backtest: &'static str,
    pub predictions: &'static str,
    pub feature_importance: &'static str,
}

fn phase_name(phase: Phase) -> &'static str {
    match phase {
        Phase::Idle => "idle",
        Phase::Loading => "loading",
        Phase::Success => "success",
        Phase::Error => "error",
    }
}

impl PhaseSummary {
    pub fn from_state(state: &DashboardState) -> Self {
        Self {
            dataset_info: phase_name(state.phase(Action::DatasetInfo)),
            backtest: phase_name(state.phase(Action::Backtest)),
            predictions: phase_name(state.phase(Action::Predictions)),
            feature_importance: phase_name(state.phase(Action::FeatureImportance)),
        }
    }
}

/// Build a JSON success response.
pub fn json_response<T: Serialize>(data: &T) -> Result<Page> {
    let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
    Ok(Page::json(200, body))
}

/// `GET /health`: service reachability and controller phases.
pub fn get_health(
    backend_url: &str,
    backend_reachable: bool,
    state: &DashboardState,
) -> Result<Page> {
    json_response(&HealthResponse {
        backend_url: backend_url.to_string(),
        backend_reachable,
        active_tab: state.active_tab().id(),
        phases: PhaseSummary::from_state(state),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Tab;

    #[test]
    fn health_response_serializes() {
        let mut state = DashboardState::new();
        state.set_active_tab(Tab::Backtest);
        let ticket = state.begin(Action::Backtest);
        state.finish(ticket, Phase::Error);

        let page = get_health("http://127.0.0.1:5000", false, &state).unwrap();
        assert_eq!(page.status, 200);
        assert!(page.body.contains(r#""backend_reachable":false"#));
        assert!(page.body.contains(r#""active_tab":"backtest""#));
        assert!(page.body.contains(r#""backtest":"error""#));
        assert!(page.body.contains(r#""predictions":"idle""#));
    }
}
