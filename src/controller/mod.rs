//! Dashboard controller: tab navigation and the four data loaders.
//!
//! Each loader is split into `begin_*` (show the loading indicator, clear
//! the panel, issue a [`Ticket`]) and `finish_*` (redeem the ticket with the
//! fetch outcome and render). The one-shot methods (`run_backtest`, ...)
//! chain both around a blocking fetch. Callers that overlap requests use the
//! split form; a superseded ticket renders nothing.
//!
//! Fetch failures and in-band `error` replies never escape as errors: they
//! are rendered into the panel and logged. Only document-contract
//! violations ([`DomError`]) are returned.

pub mod state;

use crate::api::{
    BacktestResult, DashboardApi, DatasetInfo, FeatureImportanceReport, FetchError,
    PredictionSet, Reply,
};
use crate::config::schema::DisplayConfig;
use crate::dom::{ACTIVE, Display, DomError, Document, NAV_TAB, TAB_CONTENT, Tab, ids};
use crate::render::html;

pub use state::{Action, DashboardState, Phase, Ticket};

/// Status indicator color after dataset info loads.
pub const STATUS_OK_COLOR: &str = "#10b981";
/// Status indicator color after dataset info fails.
pub const STATUS_ERROR_COLOR: &str = "#ef4444";

type Outcome<T> = Result<Reply<T>, FetchError>;

fn outcome_phase<T>(outcome: &Outcome<T>) -> Phase {
    match outcome {
        Ok(Reply::Data(_)) => Phase::Success,
        _ => Phase::Error,
    }
}

pub struct Dashboard<A, D> {
    api: A,
    doc: D,
    display: DisplayConfig,
    state: DashboardState,
}

impl<A: DashboardApi, D: Document> Dashboard<A, D> {
    pub fn new(api: A, doc: D, display: DisplayConfig) -> Self {
        Self {
            api,
            doc,
            display,
            state: DashboardState::new(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn document(&self) -> &D {
        &self.doc
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn display(&self) -> &DisplayConfig {
        &self.display
    }

    /// Document-ready hook: loads dataset info once.
    pub fn on_ready(&mut self) -> Result<(), DomError> {
        self.load_dataset_info()
    }

    // -----------------------------------------------------------------------
    // Tab navigation
    // -----------------------------------------------------------------------

    /// Deactivate every tab panel and nav control, then activate `tab` and
    /// its control. Fails without mutating if either element is missing.
    pub fn show_tab(&mut self, tab: Tab) -> Result<(), DomError> {
        for id in [tab.id(), tab.nav_id()] {
            if !self.doc.contains(id) {
                return Err(DomError::MissingElement(id.to_string()));
            }
        }

        for class in [TAB_CONTENT, NAV_TAB] {
            for id in self.doc.ids_with_class(class) {
                self.doc.remove_class(&id, ACTIVE)?;
            }
        }

        self.doc.add_class(tab.id(), ACTIVE)?;
        self.doc.add_class(tab.nav_id(), ACTIVE)?;
        self.state.set_active_tab(tab);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Dataset info
    // -----------------------------------------------------------------------

    pub fn load_dataset_info(&mut self) -> Result<(), DomError> {
        let ticket = self.begin_dataset_info();
        let outcome = self.api.dataset_info();
        self.finish_dataset_info(ticket, outcome)
    }

    /// Dataset info has no loading indicator; this only issues the ticket.
    pub fn begin_dataset_info(&mut self) -> Ticket {
        self.state.begin(Action::DatasetInfo)
    }

    pub fn finish_dataset_info(
        &mut self,
        ticket: Ticket,
        outcome: Outcome<DatasetInfo>,
    ) -> Result<(), DomError> {
        if !self.redeem(ticket, outcome_phase(&outcome)) {
            return Ok(());
        }

        match outcome {
            Ok(Reply::Data(info)) => {
                for (id, value) in html::dataset_fields(&info) {
                    self.doc.set_text(id, &value)?;
                }
                self.doc.set_text(ids::STATUS, "Active")?;
                self.doc.set_color(ids::STATUS, STATUS_OK_COLOR)?;
                self.state.mark_refreshed();
            }
            Ok(Reply::Failed(message)) => {
                tracing::error!(%message, "error loading dataset info");
                self.set_status_error()?;
            }
            Err(e) => {
                tracing::error!(error = %e, "error loading dataset info");
                self.set_status_error()?;
            }
        }
        Ok(())
    }

    fn set_status_error(&mut self) -> Result<(), DomError> {
        self.doc.set_text(ids::STATUS, "Error")?;
        self.doc.set_color(ids::STATUS, STATUS_ERROR_COLOR)
    }

    // -----------------------------------------------------------------------
    // Backtest
    // -----------------------------------------------------------------------

    pub fn run_backtest(&mut self) -> Result<(), DomError> {
        let ticket = self.begin_backtest()?;
        let outcome = self.api.backtest();
        self.finish_backtest(ticket, outcome)
    }

    pub fn begin_backtest(&mut self) -> Result<Ticket, DomError> {
        self.doc.set_display(ids::BACKTEST_LOADING, Display::Block)?;
        self.doc.set_html(ids::BACKTEST_RESULTS, "")?;
        Ok(self.state.begin(Action::Backtest))
    }

    pub fn finish_backtest(
        &mut self,
        ticket: Ticket,
        outcome: Outcome<BacktestResult>,
    ) -> Result<(), DomError> {
        if !self.redeem(ticket, outcome_phase(&outcome)) {
            return Ok(());
        }
        self.doc.set_display(ids::BACKTEST_LOADING, Display::None)?;

        match outcome {
            Ok(Reply::Data(result)) => {
                self.doc
                    .set_html(ids::BACKTEST_RESULTS, &html::backtest_results(&result))?;
                if self.doc.contains(ids::OVERVIEW_MESSAGE) {
                    self.doc
                        .set_html(ids::OVERVIEW_MESSAGE, &html::backtest_overview(&result))?;
                }
            }
            Ok(Reply::Failed(message)) => {
                tracing::warn!(%message, "backtest reported an error");
                self.doc
                    .set_html(ids::BACKTEST_RESULTS, &html::service_error(&message))?;
            }
            Err(e) => {
                tracing::error!(error = %e, "error running backtest");
                self.doc.set_html(
                    ids::BACKTEST_RESULTS,
                    &html::fetch_error("running backtest", &e.to_string()),
                )?;
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Predictions
    // -----------------------------------------------------------------------

    pub fn generate_predictions(&mut self) -> Result<(), DomError> {
        let ticket = self.begin_predictions()?;
        let outcome = self.api.predict();
        self.finish_predictions(ticket, outcome)
    }

    pub fn begin_predictions(&mut self) -> Result<Ticket, DomError> {
        self.doc.set_display(ids::PREDICTIONS_LOADING, Display::Block)?;
        self.doc.set_html(ids::PREDICTIONS_RESULTS, "")?;
        Ok(self.state.begin(Action::Predictions))
    }

    pub fn finish_predictions(
        &mut self,
        ticket: Ticket,
        outcome: Outcome<PredictionSet>,
    ) -> Result<(), DomError> {
        if !self.redeem(ticket, outcome_phase(&outcome)) {
            return Ok(());
        }
        self.doc.set_display(ids::PREDICTIONS_LOADING, Display::None)?;

        let markup = match outcome {
            Ok(Reply::Data(set)) => html::predictions(&set, &self.display),
            Ok(Reply::Failed(message)) => {
                tracing::warn!(%message, "prediction reported an error");
                html::service_error(&message)
            }
            Err(e) => {
                tracing::error!(error = %e, "error generating predictions");
                html::fetch_error("generating predictions", &e.to_string())
            }
        };
        self.doc.set_html(ids::PREDICTIONS_RESULTS, &markup)
    }

    // -----------------------------------------------------------------------
    // Feature importance
    // -----------------------------------------------------------------------

    pub fn load_feature_importance(&mut self) -> Result<(), DomError> {
        let ticket = self.begin_feature_importance()?;
        let outcome = self.api.feature_importance();
        self.finish_feature_importance(ticket, outcome)
    }

    pub fn begin_feature_importance(&mut self) -> Result<Ticket, DomError> {
        self.doc.set_display(ids::ANALYSIS_LOADING, Display::Block)?;
        self.doc.set_display(ids::ANALYSIS_MESSAGE, Display::None)?;
        self.doc.set_html(ids::FEATURE_CHART, "")?;
        Ok(self.state.begin(Action::FeatureImportance))
    }

    /// Errors go to the message area, never the chart area.
    pub fn finish_feature_importance(
        &mut self,
        ticket: Ticket,
        outcome: Outcome<FeatureImportanceReport>,
    ) -> Result<(), DomError> {
        if !self.redeem(ticket, outcome_phase(&outcome)) {
            return Ok(());
        }
        self.doc.set_display(ids::ANALYSIS_LOADING, Display::None)?;

        let message = match outcome {
            Ok(Reply::Data(report)) => {
                return self
                    .doc
                    .set_html(ids::FEATURE_CHART, &html::feature_importance(&report));
            }
            Ok(Reply::Failed(message)) => {
                tracing::warn!(%message, "feature importance reported an error");
                html::service_error(&message)
            }
            Err(e) => {
                tracing::error!(error = %e, "error loading feature importance");
                html::fetch_error("loading feature importance", &e.to_string())
            }
        };
        self.doc.set_html(ids::ANALYSIS_MESSAGE, &message)?;
        self.doc.set_display(ids::ANALYSIS_MESSAGE, Display::Block)
    }

    // -----------------------------------------------------------------------

    fn redeem(&mut self, ticket: Ticket, phase: Phase) -> bool {
        let current = self.state.finish(ticket, phase);
        if !current {
            tracing::debug!(
                action = ?ticket.action(),
                generation = ticket.generation(),
                "dropping superseded response"
            );
        }
        current
    }
}
