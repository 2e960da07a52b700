//! Document adapter.
//!
//! The controller never builds markup into a live page directly; it issues
//! id-addressed mutations through [`Document`]. [`MemoryDocument`] is the
//! in-process implementation used by the embedded server and by tests.

pub mod ids;

use std::collections::{BTreeMap, BTreeSet};

use crate::render::format::escape_html;

/// CSS class marking the visible tab panel and the selected nav control.
pub const ACTIVE: &str = "active";
/// CSS class shared by all tab panels.
pub const TAB_CONTENT: &str = "tab-content";
/// CSS class shared by all tab navigation controls.
pub const NAV_TAB: &str = "nav-tab";

/// Document-contract violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("no element with id '{0}'")]
    MissingElement(String),
    #[error("unknown tab '{0}'")]
    UnknownTab(String),
}

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

/// The dashboard's tab panels. The panel's element id is [`Tab::id`] and its
/// navigation control is [`Tab::nav_id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    Dashboard,
    Backtest,
    Predictions,
    Analysis,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Dashboard, Tab::Backtest, Tab::Predictions, Tab::Analysis];

    pub const fn id(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Backtest => "backtest",
            Self::Predictions => "predictions",
            Self::Analysis => "analysis",
        }
    }

    pub const fn nav_id(self) -> &'static str {
        match self {
            Self::Dashboard => "nav-dashboard",
            Self::Backtest => "nav-backtest",
            Self::Predictions => "nav-predictions",
            Self::Analysis => "nav-analysis",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Backtest => "Backtesting",
            Self::Predictions => "Predictions",
            Self::Analysis => "Feature Analysis",
        }
    }
}

impl std::str::FromStr for Tab {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tab::ALL
            .into_iter()
            .find(|tab| tab.id() == s)
            .ok_or_else(|| DomError::UnknownTab(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Document trait
// ---------------------------------------------------------------------------

/// CSS `display` values the dashboard toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    Block,
    None,
}

/// Id-addressed mutation of a rendered page.
///
/// Every mutator fails with [`DomError::MissingElement`] when the id does
/// not exist.
pub trait Document {
    fn contains(&self, id: &str) -> bool;

    /// Replace the element's content with plain text.
    fn set_text(&mut self, id: &str, text: &str) -> Result<(), DomError>;

    /// Replace the element's content with markup.
    fn set_html(&mut self, id: &str, html: &str) -> Result<(), DomError>;

    fn set_display(&mut self, id: &str, display: Display) -> Result<(), DomError>;

    fn set_color(&mut self, id: &str, color: &str) -> Result<(), DomError>;

    fn add_class(&mut self, id: &str, class: &str) -> Result<(), DomError>;

    fn remove_class(&mut self, id: &str, class: &str) -> Result<(), DomError>;

    /// Ids of every element carrying `class`, in document order.
    fn ids_with_class(&self, class: &str) -> Vec<String>;
}

// ---------------------------------------------------------------------------
// In-memory document
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Html(String),
}

impl Default for Content {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl Content {
    /// Content as markup: text is escaped, HTML passes through.
    pub fn to_html(&self) -> String {
        match self {
            Self::Text(t) => escape_html(t),
            Self::Html(h) => h.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub content: Content,
    pub classes: BTreeSet<String>,
    pub display: Option<Display>,
    pub color: Option<String>,
}

impl Element {
    pub fn text(text: &str) -> Self {
        Self {
            content: Content::Text(text.to_string()),
            ..Self::default()
        }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.insert(class.to_string());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.display = Some(Display::None);
        self
    }

    pub fn is_visible(&self) -> bool {
        self.display != Some(Display::None)
    }

    /// Space-separated class attribute value.
    pub fn class_attr(&self) -> String {
        self.classes.iter().map(String::as_str).collect::<Vec<_>>().join(" ")
    }

    /// Inline `style` attribute value, empty when nothing is set.
    pub fn style_attr(&self) -> String {
        let mut parts = Vec::new();
        match self.display {
            Some(Display::Block) => parts.push("display: block".to_string()),
            Some(Display::None) => parts.push("display: none".to_string()),
            None => {}
        }
        if let Some(color) = &self.color {
            parts.push(format!("color: {color}"));
        }
        parts.join("; ")
    }
}

/// Element store keyed by id.
///
/// Document order is insertion order, tracked separately from the map.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    elements: BTreeMap<String, Element>,
    order: Vec<String>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// A document carrying the full dashboard contract, in its initial state:
    /// the dashboard tab active, loading indicators and the analysis message
    /// hidden, counts showing `--`.
    pub fn dashboard() -> Self {
        let mut doc = Self::new();

        for tab in Tab::ALL {
            let mut panel = Element::default().with_class(TAB_CONTENT);
            let mut nav = Element::text(tab.title()).with_class(NAV_TAB);
            if tab == Tab::Dashboard {
                panel = panel.with_class(ACTIVE);
                nav = nav.with_class(ACTIVE);
            }
            doc.insert(tab.id(), panel);
            doc.insert(tab.nav_id(), nav);
        }

        for id in [
            ids::TRAINING_SAMPLES,
            ids::FORWARD_SAMPLES,
            ids::FEATURES_COUNT,
            ids::DATE_RANGE,
        ] {
            doc.insert(id, Element::text("--"));
        }
        doc.insert(ids::STATUS, Element::text("Loading..."));
        doc.insert(ids::MARKET_INFO, Element::text(""));

        doc.insert(
            ids::OVERVIEW_MESSAGE,
            Element::text("Run a backtest to see model performance here."),
        );
        for id in [ids::BACKTEST_RESULTS, ids::PREDICTIONS_RESULTS, ids::FEATURE_CHART] {
            doc.insert(id, Element::default());
        }
        doc.insert(ids::BACKTEST_LOADING, Element::text("Running backtest...").hidden());
        doc.insert(
            ids::PREDICTIONS_LOADING,
            Element::text("Generating predictions...").hidden(),
        );
        doc.insert(
            ids::ANALYSIS_LOADING,
            Element::text("Analyzing feature importance...").hidden(),
        );
        doc.insert(ids::ANALYSIS_MESSAGE, Element::default().hidden());

        doc
    }

    /// Insert or replace an element. A new id is appended to document order.
    pub fn insert(&mut self, id: &str, element: Element) {
        if self.elements.insert(id.to_string(), element).is_none() {
            self.order.push(id.to_string());
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Element> {
        self.order.retain(|existing| existing != id);
        self.elements.remove(id)
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    /// The element's content as markup, or an empty string if absent.
    pub fn inner_html(&self, id: &str) -> String {
        self.element(id)
            .map(|e| e.content.to_html())
            .unwrap_or_default()
    }

    /// The element's plain text, if its content was set as text.
    pub fn text(&self, id: &str) -> Option<&str> {
        match &self.element(id)?.content {
            Content::Text(t) => Some(t.as_str()),
            Content::Html(_) => None,
        }
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.element(id).is_some_and(Element::is_visible)
    }

    pub fn has_class(&self, id: &str, class: &str) -> bool {
        self.element(id).is_some_and(|e| e.classes.contains(class))
    }

    pub fn color(&self, id: &str) -> Option<&str> {
        self.element(id)?.color.as_deref()
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Element, DomError> {
        self.elements
            .get_mut(id)
            .ok_or_else(|| DomError::MissingElement(id.to_string()))
    }
}

impl Document for MemoryDocument {
    fn contains(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    fn set_text(&mut self, id: &str, text: &str) -> Result<(), DomError> {
        self.get_mut(id)?.content = Content::Text(text.to_string());
        Ok(())
    }

    fn set_html(&mut self, id: &str, html: &str) -> Result<(), DomError> {
        self.get_mut(id)?.content = Content::Html(html.to_string());
        Ok(())
    }

    fn set_display(&mut self, id: &str, display: Display) -> Result<(), DomError> {
        self.get_mut(id)?.display = Some(display);
        Ok(())
    }

    fn set_color(&mut self, id: &str, color: &str) -> Result<(), DomError> {
        self.get_mut(id)?.color = Some(color.to_string());
        Ok(())
    }

    fn add_class(&mut self, id: &str, class: &str) -> Result<(), DomError> {
        self.get_mut(id)?.classes.insert(class.to_string());
        Ok(())
    }

    fn remove_class(&mut self, id: &str, class: &str) -> Result<(), DomError> {
        self.get_mut(id)?.classes.remove(class);
        Ok(())
    }

    fn ids_with_class(&self, class: &str) -> Vec<String> {
        self.order
            .iter()
            .filter(|id| self.has_class(id, class))
            .cloned()
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashboard_carries_the_full_contract() {
        let doc = MemoryDocument::dashboard();
        for id in ids::REQUIRED {
            assert!(doc.contains(id), "missing {id}");
        }
        assert_eq!(doc.ids_with_class(TAB_CONTENT).len(), 4);
        assert_eq!(doc.ids_with_class(NAV_TAB).len(), 4);
        assert_eq!(doc.ids_with_class(ACTIVE), vec!["dashboard", "nav-dashboard"]);
        assert!(!doc.is_visible(ids::BACKTEST_LOADING));
        assert!(!doc.is_visible(ids::ANALYSIS_MESSAGE));
    }

    #[test]
    fn mutating_missing_element_fails() {
        let mut doc = MemoryDocument::new();
        assert_eq!(
            doc.set_text("status", "Active"),
            Err(DomError::MissingElement("status".to_string()))
        );
    }

    #[test]
    fn text_content_is_escaped_when_rendered() {
        let mut doc = MemoryDocument::dashboard();
        doc.set_text(ids::MARKET_INFO, "A & B").unwrap();
        assert_eq!(doc.text(ids::MARKET_INFO), Some("A & B"));
        assert_eq!(doc.inner_html(ids::MARKET_INFO), "A &amp; B");

        doc.set_html(ids::MARKET_INFO, "<b>x</b>").unwrap();
        assert_eq!(doc.text(ids::MARKET_INFO), None);
        assert_eq!(doc.inner_html(ids::MARKET_INFO), "<b>x</b>");
    }

    #[test]
    fn style_attr_reflects_display_and_color() {
        let mut doc = MemoryDocument::dashboard();
        doc.set_color(ids::STATUS, "#10b981").unwrap();
        doc.set_display(ids::STATUS, Display::Block).unwrap();
        let style = doc.element(ids::STATUS).unwrap().style_attr();
        assert_eq!(style, "display: block; color: #10b981");
    }

    #[test]
    fn tab_parses_from_id() {
        assert_eq!("analysis".parse::<Tab>(), Ok(Tab::Analysis));
        assert_eq!(
            "settings".parse::<Tab>(),
            Err(DomError::UnknownTab("settings".to_string()))
        );
    }

    #[test]
    fn remove_drops_from_class_lookup() {
        let mut doc = MemoryDocument::dashboard();
        doc.remove("nav-analysis");
        assert_eq!(doc.ids_with_class(NAV_TAB).len(), 3);
        assert!(!doc.contains("nav-analysis"));
    }
}
