//! Response Normalizer
//!
//! Coerces untrusted model output into the fixed category template of a
//! domain and keeps every summary either meaningful or an explicit
//! "not enough text" placeholder.

use std::sync::Arc;

use super::bullets;
use crate::domain::catalog::Catalog;
use crate::domain::entities::{Category, RawCategory};
use crate::domain::value_objects::{DocumentDomain, Language};

/// Most bullets harvested into a synthesized core summary
pub const CORE_MAX_BULLETS: usize = 5;

/// Summaries shorter than this (in chars) count as empty
const MIN_SUMMARY_CHARS: usize = 3;

const MAX_QUERY_CHARS: usize = 80;

/// Template enforcement and bullet sanitation over an injected [`Catalog`]
#[derive(Debug, Clone)]
pub struct ResponseNormalizer {
    catalog: Arc<Catalog>,
}

impl ResponseNormalizer {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn placeholder(&self, language: &Language) -> &str {
        self.catalog.placeholder(language)
    }

    /// Trim and make sure single-line text is bulleted. Blank text becomes the placeholder.
    pub fn normalize(&self, language: &Language, text: &str) -> String {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return self.placeholder(language).to_string();
        }
        if !trimmed.contains('\n') && !bullets::starts_with_marker(trimmed) {
            return format!("{} {}", bullets::MARKER, trimmed);
        }
        trimmed.to_string()
    }

    /// Rebuild the bullet list, dropping one-character lines and filler phrases
    pub fn sanitize(&self, language: &Language, text: &str) -> String {
        let kept: Vec<String> = bullets::split_bullets(text)
            .into_iter()
            .filter(|b| self.is_useful_bullet(language, b))
            .collect();

        if kept.is_empty() {
            self.placeholder(language).to_string()
        } else {
            bullets::join_bullets(&kept)
        }
    }

    /// `sanitize(normalize(text))`
    pub fn clean(&self, language: &Language, text: &str) -> String {
        self.sanitize(language, &self.normalize(language, text))
    }

    fn is_useful_bullet(&self, language: &Language, bullet: &str) -> bool {
        bullet.chars().count() > 1 && !self.catalog.is_filler(language, bullet)
    }

    /// Localized label, then the model's title, then the key itself
    pub fn resolve_title(&self, language: &Language, key: &str, model_title: Option<&str>) -> String {
        self.catalog
            .title(language, key)
            .or(model_title.map(str::trim).filter(|t| !t.is_empty()))
            .unwrap_or(key)
            .to_string()
    }

    /// Realize the domain template exactly, in order. Unknown keys are dropped,
    /// the last category wins for a duplicated key, and gaps get the placeholder.
    pub fn enforce_template(
        &self,
        domain: DocumentDomain,
        language: &Language,
        raw: &[RawCategory],
    ) -> Vec<Category> {
        let template = self.catalog.template(domain);

        for dropped in raw.iter().filter(|c| template_key(template, &c.key).is_none()) {
            tracing::debug!("Dropping category '{}' outside {} template", dropped.key, domain);
        }

        template
            .iter()
            .map(|key| {
                let found = raw
                    .iter()
                    .rev()
                    .find(|c| template_key(template, &c.key) == Some(*key));

                match found {
                    Some(c) => Category::new(
                        *key,
                        self.resolve_title(language, key, c.title.as_deref()),
                        self.clean(language, &c.summary),
                    ),
                    None => Category::new(
                        *key,
                        self.resolve_title(language, key, None),
                        self.placeholder(language),
                    ),
                }
            })
            .collect()
    }

    /// Whether any raw category carries a key of the domain template
    pub fn has_template_keys(&self, domain: DocumentDomain, raw: &[RawCategory]) -> bool {
        let template = self.catalog.template(domain);
        raw.iter().any(|c| template_key(template, &c.key).is_some())
    }

    pub fn is_placeholder(&self, language: &Language, text: &str) -> bool {
        text.trim() == self.placeholder(language).trim()
    }

    /// Blank, a bare marker, the placeholder, or too short to carry a fact
    pub fn is_empty_summary(&self, language: &Language, text: &str) -> bool {
        let t = text.trim();
        t.is_empty()
            || t.strip_prefix(bullets::MARKER) == Some("")
            || self.is_placeholder(language, t)
            || t.chars().count() < MIN_SUMMARY_CHARS
    }

    pub fn all_empty(&self, language: &Language, categories: &[Category]) -> bool {
        categories
            .iter()
            .all(|c| self.is_empty_summary(language, &c.summary))
    }

    /// Harvest up to [`CORE_MAX_BULLETS`] non-filler bullets across categories in order.
    ///
    /// Categories arrive sanitized, so one-character bullets are already gone;
    /// only blanks and filler are skipped here.
    pub fn build_core(&self, language: &Language, categories: &[Category]) -> String {
        let harvested: Vec<String> = categories
            .iter()
            .filter(|c| !self.is_placeholder(language, &c.summary))
            .flat_map(|c| bullets::split_bullets(&c.summary))
            .filter(|b| !b.is_empty() && !self.catalog.is_filler(language, b))
            .take(CORE_MAX_BULLETS)
            .collect();

        if harvested.is_empty() {
            return self.placeholder(language).to_string();
        }
        bullets::join_bullets(&harvested)
    }

    /// The model's own core summary when it survives sanitation, otherwise a synthesized one
    pub fn resolve_core(
        &self,
        language: &Language,
        model_core: Option<&str>,
        categories: &[Category],
    ) -> String {
        if let Some(core) = model_core {
            let cleaned = self.clean(language, core);
            if !self.is_placeholder(language, &cleaned) {
                return cleaned;
            }
        }
        self.build_core(language, categories)
    }

    /// One-line shopping keyword: first non-blank line, whitespace collapsed, capped length
    pub fn search_query(raw: Option<&str>) -> Option<String> {
        let line = raw?.lines().map(str::trim).find(|l| !l.is_empty())?;
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        Some(collapsed.chars().take(MAX_QUERY_CHARS).collect())
    }
}

fn template_key(template: &'static [&'static str], key: &str) -> Option<&'static str> {
    let key = key.trim();
    template
        .iter()
        .copied()
        .find(|k| k.eq_ignore_ascii_case(key))
}
