//! Attribution of base map tile providers.

use serde::{Deserialize, Serialize};

/// Credit for the data a base map shows, with an optional link to its source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribution {
    text: String,
    #[serde(default)]
    url: Option<String>,
}

impl Attribution {
    /// Creates a new `Attribution` with the given text and optional URL.
    pub fn new(text: impl Into<String>, url: Option<String>) -> Self {
        Self {
            text: text.into(),
            url,
        }
    }

    /// Text of the attribution.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// URL associated with the attribution, if any.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}
