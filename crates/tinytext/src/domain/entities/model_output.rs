//! ModelOutput - Validated view of an untrusted model response
//!
//! The model is asked for a JSON object but may return prose, fenced code,
//! missing fields, arrays where strings were expected, and so on. Parsing
//! never fails hard: it yields either [`ParsedOutput::Valid`] or
//! [`ParsedOutput::ParseFailure`], and downstream code only sees
//! [`ModelOutput`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A category exactly as the model reported it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCategory {
    pub key: String,
    pub title: Option<String>,
    pub summary: String,
}

impl RawCategory {
    pub fn new(key: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: None,
            summary: summary.into(),
        }
    }
}

/// Model response after shape validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOutput {
    pub domain: Option<String>,
    pub categories: Vec<RawCategory>,
    pub core_summary: Option<String>,
    pub coupang_query: Option<String>,
    pub guess_summary: Option<String>,
}

/// Result of parsing raw model content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedOutput {
    Valid(ModelOutput),
    ParseFailure(String),
}

impl ParsedOutput {
    pub fn parse(raw: &str) -> Self {
        let body = strip_code_fence(raw);
        if body.is_empty() {
            return ParsedOutput::ParseFailure("empty content".to_string());
        }

        match serde_json::from_str::<Value>(body) {
            Ok(value) => match ModelOutput::from_value(&value) {
                Some(output) => ParsedOutput::Valid(output),
                None => ParsedOutput::ParseFailure("expected a JSON object".to_string()),
            },
            Err(e) => ParsedOutput::ParseFailure(e.to_string()),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ParsedOutput::Valid(_))
    }

    /// Validated output, or `None` on parse failure
    pub fn ok(self) -> Option<ModelOutput> {
        match self {
            ParsedOutput::Valid(output) => Some(output),
            ParsedOutput::ParseFailure(reason) => {
                tracing::debug!("Discarding unparseable model output: {}", reason);
                None
            }
        }
    }

    /// Validated output, treating a parse failure as an empty response
    pub fn into_output(self) -> ModelOutput {
        self.ok().unwrap_or_default()
    }
}

impl ModelOutput {
    /// Extract the expected fields from a JSON value. Returns `None` for non-objects.
    pub fn from_value(root: &Value) -> Option<Self> {
        let obj = root.as_object()?;

        let categories = obj
            .get("categories")
            .and_then(|v| v.as_array())
            .map(|items| items.iter().filter_map(raw_category).collect())
            .unwrap_or_default();

        Some(Self {
            domain: field_text(root, &["domain"]),
            categories,
            core_summary: field_text(root, &["core_summary", "coreSummary"]),
            coupang_query: field_text(root, &["coupang_query", "coupangQuery"]),
            guess_summary: field_text(root, &["guess_summary", "guessSummary"]),
        })
    }
}

fn raw_category(item: &Value) -> Option<RawCategory> {
    let key = item.get("key").and_then(|k| k.as_str())?.trim();
    if key.is_empty() {
        return None;
    }

    Some(RawCategory {
        key: key.to_string(),
        title: field_text(item, &["title"]),
        summary: item.get("summary").map(text_of).unwrap_or_default(),
    })
}

/// First non-blank text found under any of `names`
fn field_text(obj: &Value, names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| obj.get(*name))
        .map(text_of)
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
}

/// Lenient string view: arrays become newline-joined lines.
fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .map(text_of)
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Null | Value::Object(_) => String::new(),
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_shape() {
        let raw = r#"{
            "domain": "receipt",
            "categories": [
                {"key": "total", "title": "Total", "summary": "- 12,000 KRW"},
                {"key": "items", "summary": ["Coffee", "Bagel"]}
            ],
            "core_summary": "- Paid by card",
            "coupang_query": "bagel"
        }"#;

        let output = ParsedOutput::parse(raw).ok().unwrap();
        assert_eq!(output.domain.as_deref(), Some("receipt"));
        assert_eq!(output.categories.len(), 2);
        assert_eq!(output.categories[0].title.as_deref(), Some("Total"));
        assert_eq!(output.categories[1].summary, "Coffee\nBagel");
        assert_eq!(output.core_summary.as_deref(), Some("- Paid by card"));
        assert_eq!(output.coupang_query.as_deref(), Some("bagel"));
        assert_eq!(output.guess_summary, None);
    }

    #[test]
    fn test_non_json_is_parse_failure() {
        let parsed = ParsedOutput::parse("Sorry, I cannot read this image.");
        assert!(!parsed.is_valid());
        assert_eq!(parsed.into_output(), ModelOutput::default());
    }

    #[test]
    fn test_non_object_is_parse_failure() {
        assert!(!ParsedOutput::parse("[1, 2, 3]").is_valid());
        assert!(!ParsedOutput::parse("   ").is_valid());
    }

    #[test]
    fn test_fenced_json_is_accepted() {
        let raw = "```json\n{\"domain\": \"manual\", \"categories\": []}\n```";
        let output = ParsedOutput::parse(raw).ok().unwrap();
        assert_eq!(output.domain.as_deref(), Some("manual"));
    }

    #[test]
    fn test_categories_without_key_are_dropped() {
        let raw = r#"{"categories": [{"title": "x", "summary": "y"}, {"key": " ", "summary": "z"}, "junk", {"key": "dose", "summary": null}]}"#;
        let output = ParsedOutput::parse(raw).ok().unwrap();
        assert_eq!(output.categories, vec![RawCategory::new("dose", "")]);
    }

    #[test]
    fn test_blank_fields_are_none() {
        let raw = r#"{"domain": "  ", "core_summary": "", "coreSummary": "- camel"}"#;
        let output = ParsedOutput::parse(raw).ok().unwrap();
        assert_eq!(output.domain, None);
        assert_eq!(output.core_summary.as_deref(), Some("- camel"));
    }
}
