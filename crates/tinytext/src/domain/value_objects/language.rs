//! Language - Output language requested by the client

use serde::{Deserialize, Serialize};

/// Language code (e.g. "ko", "en").
///
/// The code is passed verbatim to the model. Label lookups go through
/// [`crate::Catalog`], which falls back to its default dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Language(String);

impl Language {
    pub const DEFAULT_CODE: &'static str = "ko";

    pub fn new(code: impl AsRef<str>) -> Self {
        let code = code.as_ref().trim();
        if code.is_empty() {
            Self::default()
        } else {
            Self(code.to_lowercase())
        }
    }

    /// Language from an optional request field, using `default` when absent or blank
    pub fn or_default(code: Option<&str>, default: &str) -> Self {
        match code.map(str::trim) {
            Some(c) if !c.is_empty() => Self::new(c),
            _ => Self::new(default),
        }
    }

    pub fn code(&self) -> &str {
        &self.0
    }

    /// Primary subtag ("ko" for "ko-kr")
    pub fn primary(&self) -> &str {
        self.0.split(['-', '_']).next().unwrap_or(&self.0)
    }
}

impl Default for Language {
    fn default() -> Self {
        Self(Self::DEFAULT_CODE.to_string())
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Language {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}
