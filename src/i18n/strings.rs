/// All localized user-facing strings for a locale.
///
/// Field messages mirror the schema rules one to one; the form status
/// strings are what the client shows around a submission.
#[derive(Debug, Clone)]
pub struct ValidationStrings {
    // ==================== Field Messages ====================
    /// Name shorter than 2 characters
    pub name_min: &'static str,

    /// Name longer than 80 characters
    pub name_max: &'static str,

    /// Malformed email address
    pub email: &'static str,

    /// Company longer than 120 characters
    pub company_max: &'static str,

    /// Message shorter than 12 characters
    pub message_min: &'static str,

    /// Message longer than 600 characters
    pub message_max: &'static str,

    /// No service selected
    pub service_required: &'static str,

    /// Attachment above the 5 MiB cap
    pub file_too_large: &'static str,

    /// Honeypot field was filled in. Deliberately reads like an
    /// ordinary validation message so automated senders get no signal.
    pub bot_detected: &'static str,

    // ==================== Form Status ====================
    pub validating: &'static str,
    pub sending: &'static str,
    pub success: &'static str,
    pub error: &'static str,
}

// ==================== English Strings ====================

pub const ENGLISH_STRINGS: ValidationStrings = ValidationStrings {
    name_min: "Please enter at least 2 characters.",
    name_max: "Name must be 80 characters or fewer.",
    email: "Please enter a valid email address.",
    company_max: "Company must be 120 characters or fewer.",
    message_min: "Please tell us a bit more (12 characters minimum).",
    message_max: "Message must be 600 characters or fewer.",
    service_required: "Please choose a service.",
    file_too_large: "Attachment must be 5 MB or smaller.",
    bot_detected: "Your submission could not be processed.",

    validating: "Validating…",
    sending: "Sending…",
    success: "Thanks! We'll get back to you shortly.",
    error: "Something went wrong. Please try again.",
};

// ==================== French Strings ====================

pub const FRENCH_STRINGS: ValidationStrings = ValidationStrings {
    name_min: "Veuillez saisir au moins 2 caractères.",
    name_max: "Le nom ne doit pas dépasser 80 caractères.",
    email: "Veuillez saisir une adresse e-mail valide.",
    company_max: "Le nom de société ne doit pas dépasser 120 caractères.",
    message_min: "Dites-nous en un peu plus (12 caractères minimum).",
    message_max: "Le message ne doit pas dépasser 600 caractères.",
    service_required: "Veuillez choisir un service.",
    file_too_large: "La pièce jointe ne doit pas dépasser 5 Mo.",
    bot_detected: "Votre demande n'a pas pu être traitée.",

    validating: "Validation…",
    sending: "Envoi…",
    success: "Merci ! Nous revenons vers vous rapidement.",
    error: "Une erreur est survenue. Veuillez réessayer.",
};
