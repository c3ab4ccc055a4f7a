//! Catalog - Immutable configuration tables
//!
//! Label dictionaries per language, domain templates, and filler phrase
//! patterns. Built once at startup and shared behind an `Arc`; nothing in a
//! request can mutate it.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::errors::DomainError;
use crate::domain::value_objects::{DocumentDomain, Language};

/// Korean boilerplate the model emits when it has nothing concrete to say.
const KO_FILLER_PATTERNS: &[&str] = &[
    r"주의 필요",
    r"주의가 필요",
    r"주의 요함",
    r"일반적인 주의",
    r"안전상 주의",
    r"사용 전.*확인",
    r"상세.*참조",
    r"전문가.*상담",
];

static KO_FILLERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    KO_FILLER_PATTERNS
        .iter()
        .map(|p| Regex::new(p).expect("builtin filler pattern must compile"))
        .collect()
});

static KO_LABELS: Lazy<LabelSet> = Lazy::new(LabelSet::korean);

/// Localized labels for one language
#[derive(Debug, Clone)]
pub struct LabelSet {
    titles: HashMap<String, String>,
    /// Bulleted "not enough text" signal used for empty categories
    pub placeholder: String,
}

impl LabelSet {
    fn new(titles: &[(&str, &str)], placeholder: impl Into<String>) -> Self {
        Self {
            titles: titles
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            placeholder: placeholder.into(),
        }
    }

    pub fn title(&self, key: &str) -> Option<&str> {
        self.titles.get(key).map(String::as_str)
    }

    fn korean() -> Self {
        Self::new(
            &[
                ("summary", "🧾 핵심요약"),
                ("warnings", "⚠️ 주의"),
                ("details", "🔎 세부정보"),
                ("dose", "💊 복용법"),
                ("ingredients", "📑 성분표"),
                ("howto", "🛠️ 사용법"),
                ("spec", "📐 사양"),
                ("total", "💵 총액"),
                ("items", "🧾 항목요약"),
                ("payment", "💳 결제정보"),
                ("intake", "🍽️ 섭취법"),
                ("allergen", "🚫 알레르겐"),
                ("nutrition", "📊 영양성분"),
                ("features", "✨ 핵심특징"),
                ("price", "💰 가격·조건"),
                ("parties", "🤝 당사자"),
                ("terms", "📜 주요조건"),
                ("obligations", "📌 의무사항"),
            ],
            "- 인식된 텍스트가 적습니다.\n- 사진을 더 가까이/밝게 촬영해 보세요.\n- 포커스를 맞춘 후 다시 시도하세요.",
        )
    }

    fn english() -> Self {
        Self::new(
            &[
                ("summary", "🧾 Summary"),
                ("warnings", "⚠️ Warnings"),
                ("details", "🔎 Details"),
                ("dose", "💊 Dosage"),
                ("ingredients", "📑 Ingredients"),
                ("howto", "🛠️ How to use"),
                ("spec", "📐 Specs"),
                ("total", "💵 Total"),
                ("items", "🧾 Items"),
                ("payment", "💳 Payment"),
                ("intake", "🍽️ How to take"),
                ("allergen", "🚫 Allergens"),
                ("nutrition", "📊 Nutrition"),
                ("features", "✨ Key features"),
                ("price", "💰 Price & terms"),
                ("parties", "🤝 Parties"),
                ("terms", "📜 Key terms"),
                ("obligations", "📌 Obligations"),
            ],
            "- Not enough readable text.\n- Try a closer/brighter photo.\n- Ensure focus, then retry.",
        )
    }
}

/// Process-wide configuration tables
#[derive(Debug, Clone)]
pub struct Catalog {
    labels: HashMap<String, LabelSet>,
    fillers: HashMap<String, Vec<Regex>>,
    default_language: String,
}

impl Catalog {
    /// Built-in Korean and English dictionaries; Korean filler patterns only.
    pub fn builtin() -> Self {
        let mut labels = HashMap::new();
        labels.insert("ko".to_string(), LabelSet::korean());
        labels.insert("en".to_string(), LabelSet::english());

        let mut fillers = HashMap::new();
        fillers.insert("ko".to_string(), KO_FILLERS.clone());

        Self {
            labels,
            fillers,
            default_language: Language::DEFAULT_CODE.to_string(),
        }
    }

    /// Change the dictionary used for languages without their own labels
    pub fn with_default_language(mut self, code: &str) -> Result<Self, DomainError> {
        let code = Language::new(code);
        if !self.labels.contains_key(code.code()) {
            return Err(DomainError::Configuration(format!(
                "no label dictionary for default language '{}'",
                code
            )));
        }
        self.default_language = code.code().to_string();
        Ok(self)
    }

    /// Add filler patterns for a language
    pub fn with_filler_patterns<I, S>(mut self, code: &str, patterns: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let code = Language::new(code).code().to_string();
        let mut compiled = Vec::new();
        for pattern in patterns {
            let pattern = pattern.as_ref().trim();
            if pattern.is_empty() {
                continue;
            }
            let regex =
                Regex::new(pattern).map_err(|e| DomainError::invalid_pattern(&code, pattern, e))?;
            compiled.push(regex);
        }
        self.fillers.entry(code).or_default().extend(compiled);
        Ok(self)
    }

    pub fn has_labels(&self, code: &str) -> bool {
        self.labels.contains_key(Language::new(code).code())
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Labels for `language`, trying the primary subtag and then the default dictionary
    pub fn labels(&self, language: &Language) -> &LabelSet {
        self.labels
            .get(language.code())
            .or_else(|| self.labels.get(language.primary()))
            .or_else(|| self.labels.get(&self.default_language))
            .unwrap_or_else(|| &*KO_LABELS)
    }

    pub fn title(&self, language: &Language, key: &str) -> Option<&str> {
        self.labels(language).title(key)
    }

    pub fn placeholder(&self, language: &Language) -> &str {
        &self.labels(language).placeholder
    }

    pub fn template(&self, domain: DocumentDomain) -> &'static [&'static str] {
        domain.template()
    }

    /// Whether `text` matches a filler pattern of `language`. Languages without
    /// configured patterns filter nothing.
    pub fn is_filler(&self, language: &Language, text: &str) -> bool {
        self.fillers
            .get(language.code())
            .or_else(|| self.fillers.get(language.primary()))
            .is_some_and(|patterns| patterns.iter().any(|r| r.is_match(text)))
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
