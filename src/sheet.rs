//! Best-effort side-logging of accepted submissions to a spreadsheet
//! webhook. Strictly fire-and-forget: the POST runs on a detached task
//! and every failure ends in the operational log, never in the
//! response.

use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::mailer::DeliveryPayload;

/// The JSON record the webhook receives.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetEntry {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub message: String,
    /// Resolved human-readable service label.
    pub service: String,
    pub service_key: String,
    pub locale: &'static str,
    /// Server-assigned, RFC 3339 UTC.
    pub received_at: String,
}

impl SheetEntry {
    pub fn from_payload(payload: &DeliveryPayload) -> Self {
        Self {
            name: payload.name.clone(),
            email: payload.email.clone(),
            company: payload.company.clone(),
            message: payload.message.clone(),
            service: payload.service_label.clone(),
            service_key: payload.service.clone(),
            locale: payload.locale.code(),
            received_at: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SheetLogger {
    http: reqwest::Client,
}

impl SheetLogger {
    pub fn new(timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }

    /// Forward one record to the configured webhook.
    ///
    /// Returns immediately; the request runs on a spawned task whose
    /// outcome is only logged. No webhook configured is a no-op.
    pub fn record(&self, config: &Config, entry: SheetEntry) {
        let Some(webhook) = config.sheet_webhook_url.clone() else {
            return;
        };

        let http = self.http.clone();
        tokio::spawn(async move {
            match http.post(&webhook).json(&entry).send().await {
                Ok(response) if response.status().is_success() => {
                    debug!("Sheet webhook accepted submission");
                }
                Ok(response) => {
                    warn!("Sheet webhook returned status {}", response.status());
                }
                Err(e) => {
                    warn!("Sheet webhook error: {e}");
                }
            }
        });
    }
}
