//! Prompt Builder
//!
//! Builds the extraction, re-bucket and repair prompts sent alongside the
//! image. Prompts are configuration data; all titles come from the catalog.

use std::sync::Arc;

use crate::domain::catalog::Catalog;
use crate::domain::entities::Category;
use crate::domain::value_objects::{DocumentDomain, Language};

/// System instruction sent with every call
pub const SYSTEM_INSTRUCTION: &str =
    "You perform OCR-like reading and concise summarization with structured output.";

/// What belongs in each category key, per domain
fn category_definitions(domain: DocumentDomain) -> &'static [(&'static str, &'static str)] {
    match domain {
        DocumentDomain::Medicine => &[
            ("dose", "when/how much/how often/time/age/with food etc."),
            ("warnings", "contraindications, interactions, side effects, storage cautions, pregnancy/children."),
            ("ingredients", "ingredient names, vitamins/minerals/active amounts."),
        ],
        DocumentDomain::Manual => &[
            ("howto", "setup and operating steps in order."),
            ("warnings", "safety cautions, prohibited uses, hazards."),
            ("spec", "model, dimensions, power, capacity, ratings."),
        ],
        DocumentDomain::Receipt => &[
            ("total", "grand total, tax, discounts, currency."),
            ("items", "purchased items with quantities and prices."),
            ("payment", "payment method, card/approval info, store, date/time."),
        ],
        DocumentDomain::FoodLabel => &[
            ("intake", "serving size, how to eat/prepare, storage after opening."),
            ("allergen", "allergens and cross-contamination notices."),
            ("nutrition", "calories and nutrient amounts per serving."),
        ],
        DocumentDomain::ProductPage => &[
            ("features", "distinguishing features, materials, sizes, options."),
            ("price", "price, discounts, shipping and return conditions."),
            ("warnings", "usage cautions and exclusions."),
        ],
        DocumentDomain::Contract => &[
            ("parties", "who the parties are and their roles."),
            ("terms", "period, amounts, renewal and termination conditions."),
            ("obligations", "duties, penalties and deadlines for each party."),
        ],
        DocumentDomain::General => &[
            ("summary", "what the text is about."),
            ("warnings", "any cautions or restrictions."),
            ("details", "remaining concrete facts: numbers, names, dates."),
        ],
    }
}

/// Builds prompt text from the injected catalog
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    catalog: Arc<Catalog>,
}

impl PromptBuilder {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    fn titles(&self, domain: DocumentDomain, language: &Language) -> Vec<(&'static str, String)> {
        domain
            .template()
            .iter()
            .map(|key| {
                let title = self.catalog.title(language, key).unwrap_or(*key).to_string();
                (*key, title)
            })
            .collect()
    }

    /// First call: classify the domain and fill its categories
    pub fn extraction(&self, language: &Language) -> String {
        let lang = language.code();
        let domain_names = DocumentDomain::ALL
            .iter()
            .map(|d| format!("\"{}\"", d))
            .collect::<Vec<_>>()
            .join(",");
        let domain_alternatives = DocumentDomain::ALL
            .iter()
            .map(|d| d.as_str())
            .collect::<Vec<_>>()
            .join("|");

        let definitions = DocumentDomain::ALL
            .iter()
            .map(|domain| {
                let lines = category_definitions(*domain)
                    .iter()
                    .map(|(key, def)| format!("- {}: {}", key, def))
                    .collect::<Vec<_>>()
                    .join("\n");
                format!("CATEGORY DEFINITIONS ({}):\n{}", domain, lines)
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        let titles = DocumentDomain::ALL
            .iter()
            .map(|domain| {
                let entries = self
                    .titles(*domain, language)
                    .iter()
                    .map(|(key, title)| format!("{{\"key\":\"{}\",\"title\":\"{}\"}}", key, title))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("- {}: [{}]", domain, entries)
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"You read tiny printed labels and summarize them concisely.

{definitions}

GENERAL RULES:
- Choose one domain from [{domain_names}].
- Return ALL categories for the chosen domain (no extra/missing, keep order).
- Each category must contain ONLY relevant info; 3–6 bullets, '-' marker, no duplication.
- If info is scarce, keep it minimal; do NOT fabricate.
- Add an additional field "core_summary": 2–4 bullet TL;DR including brief advice or a note for the user.
- Add an additional field "coupang_query": one search keyword line (<=80 chars, in {lang}). Compose from brand/product/model/size; EXCLUDE price/discount words; avoid punctuation noise.
- If the text is unreadable, leave categories empty and put 1–2 bullets of your best guess about what the image shows into "guess_summary".
- All JSON values must be written in {lang}.
- Output JSON only.

OUTPUT JSON SHAPE:
{{
  "domain": "<{domain_alternatives}>",
  "categories": [
    {{ "key": "<category key>", "title": "<localized title>", "summary": "<bulleted text in {lang}>" }}
  ],
  "core_summary": "<2-4 bullets TL;DR in {lang}>",
  "coupang_query": "<string>",
  "guess_summary": "<optional, only when unreadable>"
}}

Localized titles per domain:
{titles}
"#
        )
    }

    /// Second call: move misplaced bullets into the right keys
    pub fn rebucket(
        &self,
        domain: DocumentDomain,
        language: &Language,
        previous: &[Category],
    ) -> String {
        let keys = domain.template().join(", ");
        let previous_json = serde_json::to_string_pretty(previous).unwrap_or_else(|_| "[]".to_string());

        format!(
            r#"Re-bucket the bullets strictly by definitions for domain "{domain}".
Keep EXACT category keys in this order: {keys}.
Move misplaced bullets to the correct category; remove generic filler. No duplication.
All values must be written in {lang}.
Output the same JSON shape (domain, categories[], core_summary, coupang_query).
Previous categories:
{previous_json}
"#,
            lang = language.code(),
        )
    }

    /// Third call: regenerate every summary for the fixed keys
    pub fn repair(&self, domain: DocumentDomain, language: &Language) -> String {
        let lang = language.code();
        let skeleton = self
            .titles(domain, language)
            .iter()
            .map(|(key, title)| {
                format!(
                    "{{ \"key\": \"{}\", \"title\": \"{}\", \"summary\": \"\" }}",
                    key, title
                )
            })
            .collect::<Vec<_>>()
            .join(",\n    ");

        format!(
            r#"Your previous output had empty/misplaced summaries. REPAIR NOW.

Return JSON ONLY:
{{
  "domain": "{domain}",
  "categories": [
    {skeleton}
  ],
  "core_summary": "",
  "coupang_query": ""
}}

Rules:
- Keep EXACTLY these category keys, in this order.
- Put ONLY relevant info into each category; 3–6 '-' bullets in {lang}; no duplication.
- "core_summary": 2–4 bullets TL;DR in {lang}.
- "coupang_query": one line keyword as defined."#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> PromptBuilder {
        PromptBuilder::new(Arc::new(Catalog::builtin()))
    }

    #[test]
    fn test_every_domain_has_definitions_for_its_template() {
        for domain in DocumentDomain::ALL {
            let keys: Vec<_> = category_definitions(domain).iter().map(|(k, _)| *k).collect();
            assert_eq!(keys, domain.template().to_vec());
        }
    }

    #[test]
    fn test_extraction_prompt_mentions_language_and_domains() {
        let prompt = builder().extraction(&Language::new("en"));
        assert!(prompt.contains("All JSON values must be written in en."));
        assert!(prompt.contains("\"contract\""));
        assert!(prompt.contains("{\"key\":\"total\",\"title\":\"💵 Total\"}"));
        assert!(prompt.contains("\"core_summary\""));
    }

    #[test]
    fn test_rebucket_prompt_lists_keys_in_order() {
        let previous = vec![Category::new("dose", "Dose", "- twice a day")];
        let prompt = builder().rebucket(DocumentDomain::Medicine, &Language::new("ko"), &previous);
        assert!(prompt.contains("Keep EXACT category keys in this order: dose, warnings, ingredients."));
        assert!(prompt.contains("\"summary\": \"- twice a day\""));
    }

    #[test]
    fn test_repair_prompt_has_skeleton() {
        let prompt = builder().repair(DocumentDomain::Receipt, &Language::new("ko"));
        assert!(prompt.contains("\"domain\": \"receipt\""));
        assert!(prompt.contains("{ \"key\": \"payment\", \"title\": \"💳 결제정보\", \"summary\": \"\" }"));
    }
}
