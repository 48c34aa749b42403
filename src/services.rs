//! Service catalog: the offerings a submission can reference, with
//! per-locale display titles. The submitted key is looked up here to
//! render a human-readable label; unknown keys pass through unchanged
//! so a stale form still delivers.

use crate::i18n::Language;

#[derive(Debug, Clone, Copy)]
pub struct Service {
    pub key: &'static str,
    pub title_en: &'static str,
    pub title_fr: &'static str,
}

pub const SERVICES: &[Service] = &[
    Service {
        key: "web",
        title_en: "Web Development",
        title_fr: "Développement web",
    },
    Service {
        key: "mobile",
        title_en: "Mobile Apps",
        title_fr: "Applications mobiles",
    },
    Service {
        key: "audit",
        title_en: "Code Audit & Rescue",
        title_fr: "Audit et sauvetage de code",
    },
    Service {
        key: "consulting",
        title_en: "Technical Consulting",
        title_fr: "Conseil technique",
    },
];

impl Service {
    pub fn title(&self, locale: Language) -> &'static str {
        match locale.code() {
            "fr" => self.title_fr,
            _ => self.title_en,
        }
    }
}

/// Localized label for a service key, or the raw key when unknown.
pub fn label(key: &str, locale: Language) -> String {
    SERVICES
        .iter()
        .find(|s| s.key == key)
        .map(|s| s.title(locale).to_string())
        .unwrap_or_else(|| key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_resolves_known_key() {
        assert_eq!(label("web", Language::ENGLISH), "Web Development");
        assert_eq!(label("web", Language::FRENCH), "Développement web");
    }

    #[test]
    fn test_label_falls_back_to_raw_key() {
        assert_eq!(label("blockchain", Language::ENGLISH), "blockchain");
    }

    #[test]
    fn test_catalog_keys_are_unique() {
        let mut keys: Vec<_> = SERVICES.iter().map(|s| s.key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), SERVICES.len());
    }
}
