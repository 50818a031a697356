//! Configuration page controller
//!
//! Models the webview side of the hand-off: the page loads with the watch's
//! options in its query string, shows them in a dropdown, and on close
//! navigates to `<close-scheme>://close#<encoded-json>`.
//!
//! `ConfigPage` owns the options for the lifetime of one page instance and
//! is consumed by `close`, so a page cannot be closed twice.

use crate::codec;
use crate::config::DEFAULT_CLOSE_SCHEME;
use crate::error::{ConfigError, Result};
use crate::types::Options;

/// Dropdown value that marks the reversed orientation
pub const REVERSED_VALUE: &str = "reversed";

/// Dropdown value for the normal orientation
pub const NORMAL_VALUE: &str = "normal";

/// A single-select form control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dropdown {
    choices: Vec<(String, String)>,
    selected_index: usize,
}

impl Dropdown {
    /// Build a dropdown from `(value, label)` pairs; the first is selected
    pub fn new<V, L>(choices: impl IntoIterator<Item = (V, L)>) -> Self
    where
        V: Into<String>,
        L: Into<String>,
    {
        Self {
            choices: choices
                .into_iter()
                .map(|(v, l)| (v.into(), l.into()))
                .collect(),
            selected_index: 0,
        }
    }

    /// The orientation chooser: index 0 normal, index 1 reversed
    pub fn reversed_chooser() -> Self {
        Self::new([(NORMAL_VALUE, "Normal"), (REVERSED_VALUE, "Reversed")])
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn select_index(&mut self, index: usize) -> Result<()> {
        if index >= self.choices.len() {
            return Err(ConfigError::InvalidSelection {
                index,
                len: self.choices.len(),
            });
        }
        self.selected_index = index;
        Ok(())
    }

    /// Select the choice whose value is `value`
    pub fn select_value(&mut self, value: &str) -> Result<()> {
        let index = self
            .choices
            .iter()
            .position(|(v, _)| v == value)
            .ok_or(ConfigError::InvalidSelection {
                index: self.choices.len(),
                len: self.choices.len(),
            })?;
        self.selected_index = index;
        Ok(())
    }

    pub fn selected_value(&self) -> Option<&str> {
        self.choices
            .get(self.selected_index)
            .map(|(v, _)| v.as_str())
    }

    pub fn selected_label(&self) -> Option<&str> {
        self.choices
            .get(self.selected_index)
            .map(|(_, l)| l.as_str())
    }
}

/// Settings a page is served with
#[derive(Debug, Clone, PartialEq)]
pub struct PageSettings {
    pub close_scheme: String,
    /// Options assumed when the page URL carries none
    pub defaults: Options,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            close_scheme: DEFAULT_CLOSE_SCHEME.to_string(),
            defaults: Options::with_defaults(),
        }
    }
}

/// State of one configuration page instance
#[derive(Debug)]
pub struct ConfigPage {
    options: Options,
    chooser: Dropdown,
    settings: PageSettings,
}

impl ConfigPage {
    /// Load the page from its own URL
    ///
    /// A missing or malformed payload is logged and replaced by the
    /// declared defaults; loading never fails.
    pub fn load(url: &str, settings: PageSettings) -> Self {
        let options = match Self::options_from_url(url) {
            Ok(mut options) => {
                options.merge_defaults(&settings.defaults);
                options
            }
            Err(ConfigError::MissingQueryString) => {
                tracing::debug!(url = %url, "Page loaded without options, using defaults");
                settings.defaults.clone()
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Ignoring malformed page options");
                settings.defaults.clone()
            }
        };

        let mut chooser = Dropdown::reversed_chooser();
        chooser.selected_index = options.reversed().clamp(0, chooser.len() as i64 - 1) as usize;

        tracing::debug!(reversed = options.reversed(), "Config page loaded");
        Self {
            options,
            chooser,
            settings,
        }
    }

    fn options_from_url(url: &str) -> Result<Options> {
        let payload = codec::query_payload(url).ok_or(ConfigError::MissingQueryString)?;
        codec::decode_options(payload)
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn chooser(&self) -> &Dropdown {
        &self.chooser
    }

    pub fn chooser_mut(&mut self) -> &mut Dropdown {
        &mut self.chooser
    }

    /// Apply the form state and produce the close URL
    ///
    /// Selecting "reversed" sets `reversed = 1`. Selecting "normal" leaves
    /// the loaded value untouched, so a page loaded with `reversed = 1`
    /// still closes with 1.
    pub fn close(mut self) -> Result<String> {
        if self.chooser.selected_value() == Some(REVERSED_VALUE) {
            self.options.set_reversed(true);
        }

        let url = codec::close_url(&self.settings.close_scheme, &self.options)?;
        tracing::debug!(url = %url, "Closing config page");
        Ok(url)
    }
}
