use serde::{Deserialize, Serialize};
use std::fmt;

use crate::digest::Sha256Hex;

/// One template archive: where to get it and what it must hash to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateEntry {
    pub(crate) label: String,
    pub(crate) url: String,
    pub(crate) sha256: Sha256Hex,
}

impl TemplateEntry {
    pub fn new(label: impl Into<String>, url: impl Into<String>, sha256: Sha256Hex) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
            sha256,
        }
    }

    /// TemplateFlow identifier
    /// eg. MNI152NLin2009cAsym
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn sha256(&self) -> &Sha256Hex {
        &self.sha256
    }
}

impl fmt::Display for TemplateEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.url)
    }
}
