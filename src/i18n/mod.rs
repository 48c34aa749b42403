//! Internationalization (i18n) module for multi-language support.
//!
//! The gateway serves the same locales as the site it backs (`en` and
//! `fr`). Validation messages returned to the form and the status
//! strings the client prints all come from here, so the server and the
//! client binary localize identically.
//!
//! - `language`: validated `Language` type with locale fallback
//! - `strings`: localized validation and form status strings

mod language;
mod strings;

pub use language::Language;
pub use strings::{ValidationStrings, ENGLISH_STRINGS, FRENCH_STRINGS};
