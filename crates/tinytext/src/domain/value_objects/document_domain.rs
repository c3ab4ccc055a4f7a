//! DocumentDomain - Classification of the photographed document
//!
//! Each domain owns a fixed, ordered category template. Model output can
//! pick a domain but never change its template.

use serde::{Deserialize, Serialize};

/// Document classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DocumentDomain {
    Medicine,
    Manual,
    Receipt,
    FoodLabel,
    ProductPage,
    Contract,
    #[default]
    General,
}

impl DocumentDomain {
    /// Every domain, in the order offered to the model
    pub const ALL: [DocumentDomain; 7] = [
        DocumentDomain::Medicine,
        DocumentDomain::Manual,
        DocumentDomain::Receipt,
        DocumentDomain::FoodLabel,
        DocumentDomain::ProductPage,
        DocumentDomain::Contract,
        DocumentDomain::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentDomain::Medicine => "medicine",
            DocumentDomain::Manual => "manual",
            DocumentDomain::Receipt => "receipt",
            DocumentDomain::FoodLabel => "food_label",
            DocumentDomain::ProductPage => "product_page",
            DocumentDomain::Contract => "contract",
            DocumentDomain::General => "general",
        }
    }

    /// Ordered category keys for this domain
    pub fn template(&self) -> &'static [&'static str] {
        match self {
            DocumentDomain::Medicine => &["dose", "warnings", "ingredients"],
            DocumentDomain::Manual => &["howto", "warnings", "spec"],
            DocumentDomain::Receipt => &["total", "items", "payment"],
            DocumentDomain::FoodLabel => &["intake", "allergen", "nutrition"],
            DocumentDomain::ProductPage => &["features", "price", "warnings"],
            DocumentDomain::Contract => &["parties", "terms", "obligations"],
            DocumentDomain::General => &["summary", "warnings", "details"],
        }
    }

    /// Resolve a model-reported domain. Missing or unknown values become `General`.
    pub fn resolve(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse().ok()).unwrap_or_default()
    }
}

impl std::fmt::Display for DocumentDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DocumentDomain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "medicine" => Ok(DocumentDomain::Medicine),
            "manual" => Ok(DocumentDomain::Manual),
            "receipt" => Ok(DocumentDomain::Receipt),
            "food_label" => Ok(DocumentDomain::FoodLabel),
            "product_page" => Ok(DocumentDomain::ProductPage),
            "contract" => Ok(DocumentDomain::Contract),
            "general" => Ok(DocumentDomain::General),
            _ => Err(format!("Unknown domain: {}", s)),
        }
    }
}
