/// Explicit UI state for the dashboard controller.
///
/// Tracks the active tab and, per action, the load phase and a generation
/// counter. Starting an action hands out a [`Ticket`]; only the newest
/// ticket for that action may complete it. Older tickets are superseded and
/// their responses are dropped, so the last request issued wins rather than
/// the last response to arrive.
use std::collections::HashMap;

use chrono::{DateTime, Local};

use crate::dom::Tab;

/// A user- or page-triggered load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    DatasetInfo,
    Backtest,
    Predictions,
    FeatureImportance,
}

/// `Idle → Loading → {Success, Error}`. A finished action keeps its outcome
/// phase until the next start; the loading indicator is shown only while
/// `Loading`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// Proof of having started an action, redeemed when its response arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    action: Action,
    generation: u64,
}

impl Ticket {
    pub fn action(&self) -> Action {
        self.action
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ActionState {
    phase: Phase,
    generation: u64,
}

#[derive(Debug, Clone)]
pub struct DashboardState {
    active_tab: Tab,
    actions: HashMap<Action, ActionState>,
    last_refreshed: Option<DateTime<Local>>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            active_tab: Tab::Dashboard,
            actions: HashMap::new(),
            last_refreshed: None,
        }
    }
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub(crate) fn set_active_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
    }

    /// When dataset info last loaded successfully.
    pub fn last_refreshed(&self) -> Option<DateTime<Local>> {
        self.last_refreshed
    }

    pub(crate) fn mark_refreshed(&mut self) {
        self.last_refreshed = Some(Local::now());
    }

    pub fn phase(&self, action: Action) -> Phase {
        self.actions.get(&action).map(|s| s.phase).unwrap_or_default()
    }

    /// Start `action`, superseding any ticket already issued for it.
    pub fn begin(&mut self, action: Action) -> Ticket {
        let state = self.actions.entry(action).or_default();
        state.generation += 1;
        state.phase = Phase::Loading;
        Ticket {
            action,
            generation: state.generation,
        }
    }

    /// Whether `ticket` is the newest one issued for its action.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.actions
            .get(&ticket.action)
            .is_some_and(|s| s.generation == ticket.generation)
    }

    /// Record the outcome of `ticket`. Returns `false`, changing nothing,
    /// when the ticket has been superseded.
    pub fn finish(&mut self, ticket: Ticket, outcome: Phase) -> bool {
        match self.actions.get_mut(&ticket.action) {
            Some(state) if state.generation == ticket.generation => {
                state.phase = outcome;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_start_idle() {
        let state = DashboardState::new();
        assert_eq!(state.phase(Action::Backtest), Phase::Idle);
        assert_eq!(state.active_tab(), Tab::Dashboard);
        assert!(state.last_refreshed().is_none());
    }

    #[test]
    fn newer_ticket_supersedes_older() {
        let mut state = DashboardState::new();
        let first = state.begin(Action::Predictions);
        let second = state.begin(Action::Predictions);

        assert!(!state.is_current(first));
        assert!(state.is_current(second));

        assert!(!state.finish(first, Phase::Success));
        assert_eq!(state.phase(Action::Predictions), Phase::Loading);

        assert!(state.finish(second, Phase::Error));
        assert_eq!(state.phase(Action::Predictions), Phase::Error);
    }

    #[test]
    fn actions_are_tracked_independently() {
        let mut state = DashboardState::new();
        let backtest = state.begin(Action::Backtest);
        let _features = state.begin(Action::FeatureImportance);
        assert!(state.is_current(backtest));
        assert_eq!(backtest.action(), Action::Backtest);
        assert_eq!(backtest.generation(), 1);
    }
}
