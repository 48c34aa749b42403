use std::time::Duration;

/// Runtime configuration, read from the environment once at startup.
///
/// Every provider key is optional: missing captcha keys disable
/// verification, a missing webhook URL disables side-logging. Delivery
/// is the exception and fails per-request when neither transport is
/// configured.
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,
    pub brand_name: String,
    pub default_locale: String,

    // Delivery
    pub contact_to_email: Option<String>,
    pub contact_from_email: Option<String>,
    pub resend_api_key: Option<String>,
    pub resend_from_email: Option<String>,
    pub resend_api_base: String,
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_secure: bool,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from_email: Option<String>,

    // Captcha providers (a provider is active only when both of its
    // keys are present)
    pub turnstile_secret: Option<String>,
    pub turnstile_site_key: Option<String>,
    pub hcaptcha_secret: Option<String>,
    pub hcaptcha_site_key: Option<String>,
    pub turnstile_verify_url: String,
    pub hcaptcha_verify_url: String,

    // Side-logging
    pub sheet_webhook_url: Option<String>,

    // Outbound calls
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
            brand_name: std::env::var("SITE_NAME").unwrap_or_else(|_| "NomaSoft".to_string()),
            default_locale: std::env::var("DEFAULT_LOCALE").unwrap_or_else(|_| "en".to_string()),

            contact_to_email: optional("CONTACT_TO_EMAIL"),
            contact_from_email: optional("CONTACT_FROM_EMAIL"),
            resend_api_key: optional("RESEND_API_KEY"),
            resend_from_email: optional("RESEND_FROM_EMAIL"),
            resend_api_base: std::env::var("RESEND_API_BASE")
                .unwrap_or_else(|_| "https://api.resend.com".to_string()),
            smtp_host: optional("SMTP_HOST"),
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(587),
            smtp_secure: std::env::var("SMTP_SECURE")
                .map(|v| v == "true")
                .unwrap_or(false),
            smtp_user: optional("SMTP_USER"),
            smtp_password: optional("SMTP_PASSWORD"),
            smtp_from_email: optional("SMTP_FROM"),

            turnstile_secret: optional("TURNSTILE_SECRET"),
            turnstile_site_key: optional("TURNSTILE_SITE_KEY"),
            hcaptcha_secret: optional("HCAPTCHA_SECRET"),
            hcaptcha_site_key: optional("HCAPTCHA_SITE_KEY"),
            turnstile_verify_url: std::env::var("TURNSTILE_VERIFY_URL").unwrap_or_else(|_| {
                "https://challenges.cloudflare.com/turnstile/v0/siteverify".to_string()
            }),
            hcaptcha_verify_url: std::env::var("HCAPTCHA_VERIFY_URL")
                .unwrap_or_else(|_| "https://hcaptcha.com/siteverify".to_string()),

            sheet_webhook_url: optional("SHEET_WEBHOOK_URL"),

            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
        }
    }

    /// Timeout applied to every outbound call (captcha, email API,
    /// SMTP session, sheet webhook).
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for Config {
    /// The configuration an empty environment would produce. Mostly
    /// useful in tests, which override the handful of fields they need.
    fn default() -> Self {
        Self {
            port: 8080,
            brand_name: "NomaSoft".to_string(),
            default_locale: "en".to_string(),
            contact_to_email: None,
            contact_from_email: None,
            resend_api_key: None,
            resend_from_email: None,
            resend_api_base: "https://api.resend.com".to_string(),
            smtp_host: None,
            smtp_port: 587,
            smtp_secure: false,
            smtp_user: None,
            smtp_password: None,
            smtp_from_email: None,
            turnstile_secret: None,
            turnstile_site_key: None,
            hcaptcha_secret: None,
            hcaptcha_site_key: None,
            turnstile_verify_url: "https://challenges.cloudflare.com/turnstile/v0/siteverify"
                .to_string(),
            hcaptcha_verify_url: "https://hcaptcha.com/siteverify".to_string(),
            sheet_webhook_url: None,
            request_timeout_secs: 10,
        }
    }
}

/// Read an env var, treating empty or whitespace-only values as absent.
fn optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
