//! Address suggestion lookup
//!
//! Turns the current input into a short list of candidate addresses. Queries
//! shorter than the configured minimum never reach the geocoder.

use std::sync::Arc;
use tracing::debug;

use crate::geocoder::{AddressSuggestion, Geocoder};
use crate::utils::error::GeocodeError;
use crate::view::{PanelContent, SuggestionPanel};

/// Result of one suggestion lookup
#[derive(Debug, Clone, PartialEq)]
pub enum SuggestionOutcome {
    /// Query too short; the panel must be hidden
    TooShort,
    /// Candidates in ranking order (possibly none)
    Found(Vec<AddressSuggestion>),
}

impl SuggestionOutcome {
    /// Panel the outcome renders to
    pub fn into_panel(self) -> SuggestionPanel {
        match self {
            Self::TooShort => SuggestionPanel {
                visible: false,
                content: PanelContent::Empty,
            },
            Self::Found(items) if items.is_empty() => SuggestionPanel {
                visible: true,
                content: PanelContent::NoResults,
            },
            Self::Found(items) => SuggestionPanel {
                visible: true,
                content: PanelContent::Items(items),
            },
        }
    }
}

/// Queries the geocoder for address candidates
#[derive(Clone)]
pub struct SuggestionFetcher {
    geocoder: Arc<dyn Geocoder>,
    min_query_chars: usize,
    limit: usize,
}

impl SuggestionFetcher {
    pub fn new(geocoder: Arc<dyn Geocoder>, min_query_chars: usize, limit: usize) -> Self {
        Self {
            geocoder,
            min_query_chars,
            limit,
        }
    }

    /// Whether `query` is long enough to be looked up
    pub fn accepts(&self, query: &str) -> bool {
        query.trim().chars().count() >= self.min_query_chars
    }

    /// Look up candidates for `query`
    ///
    /// # Errors
    ///
    /// Propagates the geocoder failure; the caller decides how to surface it.
    pub async fn fetch(&self, query: &str) -> Result<SuggestionOutcome, GeocodeError> {
        let query = query.trim();
        if !self.accepts(query) {
            debug!(query = %query, "Query too short for suggestions");
            return Ok(SuggestionOutcome::TooShort);
        }

        let items = self.geocoder.search(query, self.limit).await?;
        debug!(query = %query, count = items.len(), "Suggestions received");
        Ok(SuggestionOutcome::Found(items))
    }
}
