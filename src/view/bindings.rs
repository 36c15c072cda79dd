//! Element bindings between view roles and page markup
//!
//! Every role the workflow renders into is bound to an element id once, at
//! startup. [`PageBindings::validate`] checks the page actually contains all
//! of them, so a missing element is reported immediately instead of on first
//! use.

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use crate::utils::error::BindingError;

/// Element ids for each view role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageBindings {
    pub address_form: String,
    pub address_input: String,
    pub suggestions: String,
    pub check_button: String,
    pub button_text: String,
    pub spinner: String,
    pub map_container: String,
    pub map: String,
    pub lead_form: String,
    pub not_covered: String,
}

impl Default for PageBindings {
    fn default() -> Self {
        Self {
            address_form: "address-form".to_string(),
            address_input: "address".to_string(),
            suggestions: "address-suggestions".to_string(),
            check_button: "check-availability-btn".to_string(),
            button_text: "btn-text".to_string(),
            spinner: "loading-spinner".to_string(),
            map_container: "map-container".to_string(),
            map: "map".to_string(),
            lead_form: "lead-form".to_string(),
            not_covered: "not-covered-message".to_string(),
        }
    }
}

impl PageBindings {
    /// Validate the default bindings against `html`
    pub fn from_html(html: &str) -> Result<Self, BindingError> {
        Self::default().validate(html)
    }

    /// Role name and bound id of every element
    pub fn roles(&self) -> [(&'static str, &str); 10] {
        [
            ("address form", self.address_form.as_str()),
            ("address input", self.address_input.as_str()),
            ("suggestion panel", self.suggestions.as_str()),
            ("check button", self.check_button.as_str()),
            ("button label", self.button_text.as_str()),
            ("loading spinner", self.spinner.as_str()),
            ("map container", self.map_container.as_str()),
            ("map", self.map.as_str()),
            ("lead form", self.lead_form.as_str()),
            ("not-covered message", self.not_covered.as_str()),
        ]
    }

    /// Check that every bound id exists in `html`
    ///
    /// # Errors
    ///
    /// Returns the first missing or malformed id, in role order.
    pub fn validate(self, html: &str) -> Result<Self, BindingError> {
        let document = Html::parse_document(html);

        for (role, id) in self.roles() {
            let selector = id_selector(id)?;
            if document.select(&selector).next().is_none() {
                return Err(BindingError::MissingElement {
                    role,
                    id: id.to_string(),
                });
            }
        }

        Ok(self)
    }
}

fn id_selector(id: &str) -> Result<Selector, BindingError> {
    let valid = !id.is_empty()
        && !id.starts_with(|c: char| c.is_ascii_digit())
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(BindingError::InvalidId(id.to_string()));
    }

    Selector::parse(&format!("#{id}")).map_err(|_| BindingError::InvalidId(id.to_string()))
}
