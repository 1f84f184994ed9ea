//! Client identity and delivery contact

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reference to the client a report is being assembled for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRef {
    /// Stable client identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Monitored site, when the client has more than one
    pub site: Option<String>,
}

impl ClientRef {
    /// Create a client reference with a fresh identifier
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            site: None,
        }
    }

    /// Attach a site label
    #[must_use]
    pub fn with_site(mut self, site: impl Into<String>) -> Self {
        self.site = Some(site.into());
        self
    }

    /// Filesystem-safe slug of the client name, used for export naming
    #[must_use]
    pub fn slug(&self) -> String {
        let mut out = String::with_capacity(self.name.len());
        for c in self.name.chars() {
            if c.is_ascii_alphanumeric() {
                out.push(c.to_ascii_lowercase());
            } else if (c == ' ' || c == '-' || c == '_') && !out.ends_with('-') {
                out.push('-');
            }
        }
        out.trim_matches('-').to_string()
    }
}

/// How the finished report is delivered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContactChannel {
    /// Emailed as an attachment
    Email {
        /// Destination address
        address: String,
    },
    /// Texted as a download link
    Phone {
        /// Destination number
        number: String,
    },
    /// Published to the client portal
    Portal,
}

impl Default for ContactChannel {
    fn default() -> Self {
        Self::Portal
    }
}
