//! HTTP surface and the server half of the submission flow.
//!
//! One pass per request, no retries: multipart parse, authoritative
//! validation, captcha check, service label resolution, delivery, then
//! detached side-logging. Each failure class maps to a stable
//! machine-readable code; bodies never carry provider error text.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::captcha::{CaptchaClientConfig, CaptchaVerifier};
use crate::config::Config;
use crate::i18n::Language;
use crate::mailer::{DeliveryError, DeliveryPayload, Mailer};
use crate::schema::{self, Attachment, FieldErrors, RawSubmission, MAX_FILE_SIZE};
use crate::services;
use crate::sheet::{SheetEntry, SheetLogger};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub captcha: Arc<CaptchaVerifier>,
    pub mailer: Mailer,
    pub sheet: SheetLogger,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let timeout = config.request_timeout();
        Self {
            config: Arc::new(config),
            captcha: Arc::new(CaptchaVerifier::new(timeout)),
            mailer: Mailer::new(timeout),
            sheet: SheetLogger::new(timeout),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/captcha", get(captcha_config))
        .route("/api/contact", post(submit_contact))
        // Multipart bodies carry up to a 5 MiB attachment plus the
        // text fields; oversized-but-plausible uploads must still
        // reach validation to earn their field error.
        .layer(DefaultBodyLimit::max(2 * MAX_FILE_SIZE))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// Health Check
// =============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Captcha Widget Config
// =============================================================================

/// Client-safe captcha configuration for the form widget; `null` when
/// no provider is fully configured.
pub async fn captcha_config(State(state): State<AppState>) -> Json<Option<CaptchaClientConfig>> {
    Json(state.captcha.client_config(&state.config))
}

// =============================================================================
// Contact Submission
// =============================================================================

#[derive(Debug, Serialize)]
struct OkBody {
    ok: bool,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<FieldErrors>,
}

/// Everything that stops a submission, tagged for the response
/// contract.
#[derive(Debug)]
enum Rejection {
    Validation(FieldErrors),
    CaptchaFailed,
    Delivery(DeliveryError),
    Malformed,
}

impl Rejection {
    fn code(&self) -> &'static str {
        match self {
            Rejection::Validation(_) => "validation_error",
            Rejection::CaptchaFailed => "captcha_failed",
            Rejection::Delivery(DeliveryError::RecipientMissing) => "contact_recipient_missing",
            Rejection::Delivery(DeliveryError::NotConfigured) => "mail_provider_not_configured",
            Rejection::Delivery(DeliveryError::ApiRejected { .. }) => "email_failed",
            Rejection::Delivery(_) | Rejection::Malformed => "invalid_request",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Rejection::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Rejection::CaptchaFailed => StatusCode::BAD_REQUEST,
            Rejection::Delivery(DeliveryError::ApiRejected { .. }) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.code(),
            errors: match self {
                Rejection::Validation(errors) => Some(errors),
                _ => None,
            },
        };
        (status, Json(body)).into_response()
    }
}

pub async fn submit_contact(State(state): State<AppState>, multipart: Multipart) -> Response {
    match handle_submission(&state, multipart).await {
        Ok(()) => (StatusCode::OK, Json(OkBody { ok: true })).into_response(),
        Err(rejection) => rejection.into_response(),
    }
}

async fn handle_submission(state: &AppState, multipart: Multipart) -> Result<(), Rejection> {
    let (raw, locale_param) = read_form(multipart).await.map_err(|e| {
        warn!("Unreadable contact submission: {e:#}");
        Rejection::Malformed
    })?;

    let locale = Language::resolve(locale_param.as_deref(), &state.config.default_locale);
    let submission =
        schema::parse_submission(raw, locale.strings()).map_err(Rejection::Validation)?;

    // Field failures, honeypot hits included, are settled above without
    // any outbound traffic. The captcha round trip happens only for
    // submissions that already look legitimate.
    if !state
        .captcha
        .verify(&state.config, submission.token.as_deref())
        .await
    {
        info!("Contact submission rejected by captcha");
        return Err(Rejection::CaptchaFailed);
    }

    let service_label = services::label(&submission.service, locale);
    let payload = DeliveryPayload {
        name: submission.name,
        email: submission.email,
        company: submission.company,
        message: submission.message,
        service: submission.service,
        service_label,
        locale,
        attachment: submission.file,
    };

    state.mailer.send(&state.config, &payload).await.map_err(|e| {
        error!("Contact delivery failed: {e}");
        Rejection::Delivery(e)
    })?;

    // Delivered; side-logging is best-effort from here on.
    state.sheet.record(&state.config, SheetEntry::from_payload(&payload));

    info!(
        service = %payload.service,
        locale = %payload.locale.code(),
        "Contact submission delivered"
    );
    Ok(())
}

/// Collect the multipart fields into the raw submission shape. The
/// honeypot travels under the decoy name `company-website`.
async fn read_form(mut multipart: Multipart) -> anyhow::Result<(RawSubmission, Option<String>)> {
    let mut raw = RawSubmission::default();
    let mut locale = None;

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "file" {
            let filename = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await?;
            if let Some(filename) = filename {
                raw.file = Some(Attachment {
                    filename,
                    bytes: bytes.to_vec(),
                    content_type,
                });
            }
            continue;
        }

        let value = field.text().await?;
        match name.as_str() {
            "name" => raw.name = Some(value),
            "email" => raw.email = Some(value),
            "company" => raw.company = Some(value),
            "message" => raw.message = Some(value),
            "service" => raw.service = Some(value),
            "token" => raw.token = Some(value),
            "company-website" => raw.honeypot = Some(value),
            "locale" => locale = Some(value),
            _ => {}
        }
    }

    Ok((raw, locale))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Error Contract ====================

    #[test]
    fn test_rejection_codes_are_stable() {
        assert_eq!(Rejection::Validation(FieldErrors::new()).code(), "validation_error");
        assert_eq!(Rejection::CaptchaFailed.code(), "captcha_failed");
        assert_eq!(
            Rejection::Delivery(DeliveryError::RecipientMissing).code(),
            "contact_recipient_missing"
        );
        assert_eq!(
            Rejection::Delivery(DeliveryError::NotConfigured).code(),
            "mail_provider_not_configured"
        );
        assert_eq!(
            Rejection::Delivery(DeliveryError::ApiRejected { status: 422 }).code(),
            "email_failed"
        );
        assert_eq!(Rejection::Malformed.code(), "invalid_request");
    }

    #[test]
    fn test_rejection_status_mapping() {
        assert_eq!(
            Rejection::Validation(FieldErrors::new()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(Rejection::CaptchaFailed.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            Rejection::Delivery(DeliveryError::RecipientMissing).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            Rejection::Delivery(DeliveryError::NotConfigured).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            Rejection::Delivery(DeliveryError::ApiRejected { status: 500 }).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(Rejection::Malformed.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_body_carries_field_errors() {
        let mut errors = FieldErrors::new();
        errors.insert("name", "Please enter at least 2 characters.".to_string());
        let body = ErrorBody {
            error: "validation_error",
            errors: Some(errors),
        };
        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json["error"], "validation_error");
        assert_eq!(json["errors"]["name"], "Please enter at least 2 characters.");
    }

    #[test]
    fn test_non_validation_body_omits_errors_key() {
        let body = ErrorBody {
            error: "captcha_failed",
            errors: None,
        };
        let json = serde_json::to_value(&body).expect("serialize");
        assert!(json.get("errors").is_none());
    }
}
