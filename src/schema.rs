//! Contact form schema: field rules shared by the server (authoritative)
//! and the client binary (advisory). Both run the same checks so the
//! inline errors a user sees match what the server would reject.

use std::collections::BTreeMap;

use email_address::EmailAddress;

use crate::i18n::ValidationStrings;

pub const MAX_MESSAGE_LENGTH: usize = 600;
pub const MIN_MESSAGE_LENGTH: usize = 12;
pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// A single uploaded attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Raw field set as it arrives from the form, before any rule has run.
#[derive(Debug, Clone, Default)]
pub struct RawSubmission {
    pub name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub message: Option<String>,
    pub service: Option<String>,
    pub token: Option<String>,
    pub honeypot: Option<String>,
    pub file: Option<Attachment>,
}

/// A submission that passed every rule.
#[derive(Debug, Clone)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub message: String,
    pub service: String,
    pub token: Option<String>,
    pub file: Option<Attachment>,
}

/// Field name to first failing rule's localized message.
pub type FieldErrors = BTreeMap<&'static str, String>;

/// Validate a raw field set against the contact schema.
///
/// Per field, the first failing rule wins. The honeypot check runs
/// after the per-field rules and tags its error to the hidden field;
/// a submission that trips it never reaches the network (the caller
/// sees an ordinary validation failure).
pub fn parse_submission(
    raw: RawSubmission,
    strings: &ValidationStrings,
) -> Result<Submission, FieldErrors> {
    let mut errors = FieldErrors::new();

    let name = raw.name.unwrap_or_default();
    let name_len = name.chars().count();
    if name_len < 2 {
        errors.insert("name", strings.name_min.to_string());
    } else if name_len > 80 {
        errors.insert("name", strings.name_max.to_string());
    }

    let email = raw.email.unwrap_or_default();
    if email.parse::<EmailAddress>().is_err() {
        errors.insert("email", strings.email.to_string());
    }

    // Optional, trimmed; empty collapses to absent.
    let company = raw
        .company
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());
    if let Some(company) = &company {
        if company.chars().count() > 120 {
            errors.insert("company", strings.company_max.to_string());
        }
    }

    let message = raw.message.unwrap_or_default();
    let message_len = message.chars().count();
    if message_len < MIN_MESSAGE_LENGTH {
        errors.insert("message", strings.message_min.to_string());
    } else if message_len > MAX_MESSAGE_LENGTH {
        errors.insert("message", strings.message_max.to_string());
    }

    let service = raw.service.unwrap_or_default();
    if service.is_empty() {
        errors.insert("service", strings.service_required.to_string());
    }

    let token = raw.token.filter(|t| !t.is_empty());
    let honeypot = raw.honeypot.filter(|h| !h.is_empty());

    // Zero-byte uploads are what browsers send for an untouched file
    // input; treat them as no attachment.
    let file = raw.file.filter(|f| !f.bytes.is_empty());
    if let Some(file) = &file {
        if file.bytes.len() > MAX_FILE_SIZE {
            errors.insert("file", strings.file_too_large.to_string());
        }
    }

    // Cross-field check: a filled honeypot marks the submission as bot
    // traffic regardless of the other fields.
    if honeypot.is_some() {
        errors.insert("honeypot", strings.bot_detected.to_string());
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(Submission {
        name,
        email,
        company,
        message,
        service,
        token,
        file,
    })
}
