//! Typed view-model of the address checker widget
//!
//! [`ViewState`] holds everything the page shows: the input text, the
//! suggestion panel, the check button, the result panels and transient
//! alerts. Visibility follows the page's `hidden` class convention; nothing is
//! ever removed. A renderer turns the state into [`DomPatch`]es through the
//! validated [`PageBindings`].

pub mod bindings;

pub use bindings::PageBindings;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::geocoder::AddressSuggestion;

pub const CHECK_LABEL: &str = "Check Now";
pub const CHECKING_LABEL: &str = "Checking...";
pub const NO_SUGGESTIONS_TEXT: &str = "No suggestions found";

/// Contents of the suggestion panel
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub enum PanelContent {
    #[default]
    Empty,
    Items(Vec<AddressSuggestion>),
    NoResults,
}

/// Suggestion dropdown under the address input
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SuggestionPanel {
    pub visible: bool,
    pub content: PanelContent,
}

impl SuggestionPanel {
    /// The selectable items, empty for the placeholder
    pub fn items(&self) -> &[AddressSuggestion] {
        match &self.content {
            PanelContent::Items(items) => items,
            PanelContent::Empty | PanelContent::NoResults => &[],
        }
    }
}

/// Submit button of the address form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckButton {
    pub disabled: bool,
    pub busy: bool,
    pub label: String,
}

impl Default for CheckButton {
    fn default() -> Self {
        Self {
            disabled: false,
            busy: false,
            label: CHECK_LABEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AlertKind {
    Error,
    Success,
}

/// Transient toast message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub id: u64,
    pub kind: AlertKind,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

/// Everything the widget currently shows
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ViewState {
    pub input: String,
    pub suggestions: SuggestionPanel,
    pub button: CheckButton,
    pub spinner_visible: bool,
    pub lead_form_visible: bool,
    pub not_covered_visible: bool,
    pub map_visible: bool,
    pub alerts: Vec<Alert>,
    /// Coverage checks currently holding the loading state
    pub checks_in_flight: u32,
}

impl ViewState {
    /// Whether a coverage check is in flight
    pub fn is_loading(&self) -> bool {
        self.button.busy
    }

    pub fn enter_loading(&mut self) {
        self.checks_in_flight += 1;
        self.button.disabled = true;
        self.button.busy = true;
        self.button.label = CHECKING_LABEL.to_string();
        self.spinner_visible = true;
    }

    /// Return to idle once the last in-flight check has settled
    pub fn leave_loading(&mut self) {
        self.checks_in_flight = self.checks_in_flight.saturating_sub(1);
        if self.checks_in_flight > 0 {
            return;
        }
        self.button.disabled = false;
        self.button.busy = false;
        self.button.label = CHECK_LABEL.to_string();
        self.spinner_visible = false;
    }

    /// Hide the outcome panels of a previous check
    pub fn clear_results(&mut self) {
        self.lead_form_visible = false;
        self.not_covered_visible = false;
        self.map_visible = false;
    }

    /// Patches that bring a page in line with this state
    pub fn dom_patches(&self, bindings: &PageBindings) -> Vec<DomPatch> {
        let hidden = |id: &str, hidden: bool| DomPatch::SetHidden {
            id: id.to_string(),
            hidden,
        };

        let items = match &self.suggestions.content {
            PanelContent::Empty => Vec::new(),
            PanelContent::Items(items) => items.iter().map(|s| s.display_name.clone()).collect(),
            PanelContent::NoResults => vec![NO_SUGGESTIONS_TEXT.to_string()],
        };

        let mut patches = vec![
            DomPatch::SetValue {
                id: bindings.address_input.clone(),
                value: self.input.clone(),
            },
            DomPatch::ReplaceChildren {
                id: bindings.suggestions.clone(),
                items,
            },
            hidden(&bindings.suggestions, !self.suggestions.visible),
            DomPatch::SetText {
                id: bindings.button_text.clone(),
                text: self.button.label.clone(),
            },
            DomPatch::SetAttribute {
                id: bindings.check_button.clone(),
                name: "aria-busy",
                value: self.button.busy.to_string(),
            },
        ];

        patches.push(if self.button.disabled {
            DomPatch::SetAttribute {
                id: bindings.check_button.clone(),
                name: "disabled",
                value: String::new(),
            }
        } else {
            DomPatch::RemoveAttribute {
                id: bindings.check_button.clone(),
                name: "disabled",
            }
        });

        patches.extend([
            hidden(&bindings.spinner, !self.spinner_visible),
            hidden(&bindings.lead_form, !self.lead_form_visible),
            hidden(&bindings.not_covered, !self.not_covered_visible),
            hidden(&bindings.map_container, !self.map_visible),
        ]);

        patches
    }
}

/// A single change a page renderer applies
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DomPatch {
    /// Add (`hidden: true`) or remove the `hidden` class
    SetHidden { id: String, hidden: bool },
    SetAttribute {
        id: String,
        name: &'static str,
        value: String,
    },
    RemoveAttribute { id: String, name: &'static str },
    SetText { id: String, text: String },
    SetValue { id: String, value: String },
    ReplaceChildren { id: String, items: Vec<String> },
}

/// View state shared between the workflow's tasks
///
/// The lock is only held for the duration of a closure and never across an
/// await point.
#[derive(Debug, Clone, Default)]
pub struct SharedView {
    state: Arc<Mutex<ViewState>>,
    next_alert_id: Arc<AtomicU64>,
}

impl SharedView {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mutate the state
    pub fn update<R>(&self, f: impl FnOnce(&mut ViewState) -> R) -> R {
        f(&mut self.lock())
    }

    /// Read the state
    pub fn read<R>(&self, f: impl FnOnce(&ViewState) -> R) -> R {
        f(&self.lock())
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> ViewState {
        self.lock().clone()
    }

    /// Show an alert that dismisses itself after `ttl`
    ///
    /// Must be called from within a tokio runtime.
    pub fn raise_alert(&self, kind: AlertKind, message: impl Into<String>, ttl: Duration) -> u64 {
        let id = self.next_alert_id.fetch_add(1, Ordering::Relaxed);
        self.update(|view| {
            view.alerts.push(Alert {
                id,
                kind,
                message: message.into(),
                raised_at: Utc::now(),
            })
        });

        let view = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            view.dismiss_alert(id);
        });

        id
    }

    /// Remove an alert; returns whether it was still shown
    pub fn dismiss_alert(&self, id: u64) -> bool {
        self.update(|view| {
            let before = view.alerts.len();
            view.alerts.retain(|alert| alert.id != id);
            view.alerts.len() != before
        })
    }
}

/// Keeps the check button in its loading state while alive
///
/// Dropping the guard restores the idle state on every exit path, including
/// early returns, errors and cancellation of the owning task.
#[must_use = "the loading state ends as soon as the guard is dropped"]
pub struct LoadingGuard {
    view: SharedView,
}

impl LoadingGuard {
    pub fn acquire(view: &SharedView) -> Self {
        view.update(ViewState::enter_loading);
        Self { view: view.clone() }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.view.update(ViewState::leave_loading);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_guard_releases_on_drop() {
        let view = SharedView::new();
        {
            let _guard = LoadingGuard::acquire(&view);
            let state = view.snapshot();
            assert!(state.is_loading());
            assert!(state.button.disabled);
            assert!(state.spinner_visible);
            assert_eq!(state.button.label, CHECKING_LABEL);
        }
        let state = view.snapshot();
        assert!(!state.is_loading());
        assert!(!state.spinner_visible);
        assert_eq!(state.button.label, CHECK_LABEL);
    }

    #[test]
    fn test_overlapping_guards_release_with_the_last() {
        let view = SharedView::new();
        let first = LoadingGuard::acquire(&view);
        let second = LoadingGuard::acquire(&view);

        drop(first);
        assert!(view.snapshot().is_loading());

        drop(second);
        let state = view.snapshot();
        assert!(!state.is_loading());
        assert_eq!(state.checks_in_flight, 0);
    }

    #[test]
    fn test_loading_guard_releases_on_panic() {
        let view = SharedView::new();
        let cloned = view.clone();
        let result = std::panic::catch_unwind(move || {
            let _guard = LoadingGuard::acquire(&cloned);
            panic!("backend exploded");
        });
        assert!(result.is_err());
        assert!(!view.snapshot().is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_alert_expires() {
        let view = SharedView::new();
        let id = view.raise_alert(AlertKind::Error, "Please enter an address", Duration::from_secs(5));
        assert_eq!(view.snapshot().alerts.len(), 1);

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(view.snapshot().alerts.is_empty());
        assert!(!view.dismiss_alert(id));
    }

    #[test]
    fn test_dom_patches_follow_hidden_convention() {
        let bindings = PageBindings::default();
        let mut state = ViewState::default();
        state.suggestions = SuggestionPanel {
            visible: true,
            content: PanelContent::NoResults,
        };
        state.lead_form_visible = true;

        let patches = state.dom_patches(&bindings);
        assert!(patches.contains(&DomPatch::SetHidden {
            id: "address-suggestions".into(),
            hidden: false
        }));
        assert!(patches.contains(&DomPatch::ReplaceChildren {
            id: "address-suggestions".into(),
            items: vec![NO_SUGGESTIONS_TEXT.to_string()],
        }));
        assert!(patches.contains(&DomPatch::SetHidden {
            id: "lead-form".into(),
            hidden: false
        }));
        assert!(patches.contains(&DomPatch::SetHidden {
            id: "map-container".into(),
            hidden: true
        }));
        assert!(patches.contains(&DomPatch::RemoveAttribute {
            id: "check-availability-btn".into(),
            name: "disabled"
        }));
    }
}
