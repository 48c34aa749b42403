use crate::i18n::{ValidationStrings, ENGLISH_STRINGS, FRENCH_STRINGS};

/// A validated locale.
///
/// Only the locales the site ships can be constructed; anything else
/// falls back to the configured default when resolving a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    /// ISO 639-1 language code ("en", "fr")
    code: &'static str,
}

impl Language {
    pub const ENGLISH: Language = Language { code: "en" };
    pub const FRENCH: Language = Language { code: "fr" };

    const ALL: &'static [Language] = &[Language::ENGLISH, Language::FRENCH];

    /// Create a Language from a locale code, if it is one we support.
    pub fn from_code(code: &str) -> Option<Language> {
        Self::ALL.iter().copied().find(|l| l.code == code)
    }

    /// Resolve the locale for a request: the submitted code when valid,
    /// otherwise the configured default, otherwise English.
    pub fn resolve(code: Option<&str>, default_code: &str) -> Language {
        code.and_then(Self::from_code)
            .or_else(|| Self::from_code(default_code))
            .unwrap_or(Language::ENGLISH)
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Localized strings for this locale.
    pub fn strings(&self) -> &'static ValidationStrings {
        match self.code {
            "fr" => &FRENCH_STRINGS,
            _ => &ENGLISH_STRINGS,
        }
    }
}
