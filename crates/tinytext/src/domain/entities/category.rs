//! Category - One templated section of a summary

use serde::{Deserialize, Serialize};

/// A normalized category. `key` always belongs to the active domain template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub key: String,
    pub title: String,
    /// Bullet text, one `- ` line per fact
    pub summary: String,
}

impl Category {
    pub fn new(key: impl Into<String>, title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            summary: summary.into(),
        }
    }
}
