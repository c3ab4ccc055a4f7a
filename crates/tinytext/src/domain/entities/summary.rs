//! SummaryPayload - Normalized result of one pipeline run

use serde::{Deserialize, Serialize};

use super::Category;
use crate::domain::value_objects::DocumentDomain;

/// Structurally complete summary: `categories` realizes the domain template exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryPayload {
    pub domain: DocumentDomain,
    pub categories: Vec<Category>,
    pub core_summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupang_query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guess_summary: Option<String>,
}

impl SummaryPayload {
    pub fn keys(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.key.as_str()).collect()
    }
}
