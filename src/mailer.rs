//! Notification delivery: renders the inquiry email and sends it
//! through exactly one configured transport.
//!
//! Transport priority is fixed: the HTTP email API when its key is
//! configured, else SMTP when a host is configured, else a hard
//! configuration error. There is no fallback between transports; a
//! rejected send surfaces as a delivery failure.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use lettre::message::header::ContentType;
use lettre::message::{Attachment as MailAttachment, Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::config::Config;
use crate::i18n::Language;
use crate::schema::Attachment;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("no contact recipient configured")]
    RecipientMissing,

    #[error("no mail provider configured")]
    NotConfigured,

    #[error("email API rejected the message with status {status}")]
    ApiRejected { status: u16 },

    #[error("email API request failed: {0}")]
    ApiRequest(#[from] reqwest::Error),

    #[error("invalid mailbox address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("failed to assemble email message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("invalid attachment content type: {0}")]
    ContentType(#[from] lettre::message::header::ContentTypeErr),

    #[error("smtp transport error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Which transport a send will use, resolved once per call from the
/// configuration instead of re-checking optional fields inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    Api {
        key: String,
        from: String,
    },
    Smtp {
        host: String,
        port: u16,
        secure: bool,
        user: Option<String>,
        password: Option<String>,
        from: String,
    },
    NotConfigured,
}

impl Transport {
    pub fn resolve(config: &Config, default_from: &str) -> Transport {
        if let Some(key) = &config.resend_api_key {
            return Transport::Api {
                key: key.clone(),
                from: config
                    .resend_from_email
                    .clone()
                    .unwrap_or_else(|| default_from.to_string()),
            };
        }

        if let Some(host) = &config.smtp_host {
            return Transport::Smtp {
                host: host.clone(),
                port: config.smtp_port,
                secure: config.smtp_secure,
                user: config.smtp_user.clone(),
                password: config.smtp_password.clone(),
                from: config
                    .smtp_from_email
                    .clone()
                    .unwrap_or_else(|| default_from.to_string()),
            };
        }

        Transport::NotConfigured
    }
}

/// Everything the dispatcher needs about one submission. Request
/// scoped; built after validation and captcha checks pass.
#[derive(Debug, Clone)]
pub struct DeliveryPayload {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub message: String,
    pub service: String,
    pub service_label: String,
    pub locale: Language,
    pub attachment: Option<Attachment>,
}

#[derive(Debug, Serialize)]
struct ApiAttachment {
    filename: String,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_type: Option<String>,
}

#[derive(Debug, Serialize)]
struct ApiEmailRequest<'a> {
    from: String,
    to: Vec<&'a str>,
    reply_to: &'a str,
    subject: &'a str,
    text: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    attachments: Option<Vec<ApiAttachment>>,
}

/// `"<brand> <address>"`, the sender identity on both transports.
fn format_address(brand: &str, address: &str) -> String {
    format!("{brand} <{address}>")
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_subject(brand: &str, payload: &DeliveryPayload) -> String {
    format!("[{brand}] {} — {}", payload.name, payload.service_label)
}

fn render_text(payload: &DeliveryPayload) -> String {
    [
        format!("Name: {}", payload.name),
        format!("Email: {}", payload.email),
        format!("Company: {}", payload.company.as_deref().unwrap_or("N/A")),
        format!("Service: {} ({})", payload.service_label, payload.service),
        format!("Locale: {}", payload.locale.code()),
        String::new(),
        payload.message.clone(),
    ]
    .join("\n")
}

fn render_html(payload: &DeliveryPayload) -> String {
    let message_html: String = payload
        .message
        .split('\n')
        .map(|line| format!(r#"<p style="margin:0 0 12px;">{}</p>"#, escape_html(line)))
        .collect();

    format!(
        r#"<div style="font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',sans-serif;line-height:1.6;color:#0f172a;">
  <h2 style="font-size:18px;margin:0 0 16px;">New inquiry from {name}</h2>
  <table style="border-collapse:collapse;width:100%;max-width:560px;">
    <tbody>
      <tr>
        <td style="padding:4px 0;font-weight:600;width:120px;">Email</td>
        <td style="padding:4px 0;"><a href="mailto:{email}" style="color:#2563eb;">{email}</a></td>
      </tr>
      <tr>
        <td style="padding:4px 0;font-weight:600;">Company</td>
        <td style="padding:4px 0;">{company}</td>
      </tr>
      <tr>
        <td style="padding:4px 0;font-weight:600;">Service</td>
        <td style="padding:4px 0;">{service_label} <span style="color:#64748b;">({service_key})</span></td>
      </tr>
      <tr>
        <td style="padding:4px 0;font-weight:600;">Locale</td>
        <td style="padding:4px 0;">{locale}</td>
      </tr>
    </tbody>
  </table>
  <hr style="margin:24px 0;border:0;border-top:1px solid #e2e8f0;" />
  <div>{message}</div>
</div>"#,
        name = escape_html(&payload.name),
        email = escape_html(&payload.email),
        company = escape_html(payload.company.as_deref().unwrap_or("N/A")),
        service_label = escape_html(&payload.service_label),
        service_key = escape_html(&payload.service),
        locale = escape_html(payload.locale.code()),
        message = message_html,
    )
}

/// Sends the rendered inquiry through the resolved transport.
#[derive(Debug, Clone)]
pub struct Mailer {
    http: reqwest::Client,
    timeout: Duration,
}

impl Mailer {
    pub fn new(timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            timeout,
        }
    }

    /// Deliver one submission. The recipient is resolved before the
    /// transport so an unconfigured recipient is reported even when no
    /// transport exists either.
    pub async fn send(&self, config: &Config, payload: &DeliveryPayload) -> Result<(), DeliveryError> {
        let Some(to) = config.contact_to_email.clone() else {
            return Err(DeliveryError::RecipientMissing);
        };
        let default_from = config.contact_from_email.clone().unwrap_or_else(|| to.clone());

        let subject = render_subject(&config.brand_name, payload);
        let text = render_text(payload);
        let html = render_html(payload);

        match Transport::resolve(config, &default_from) {
            Transport::Api { key, from } => {
                self.send_api(config, &key, &from, &to, &subject, &text, &html, payload)
                    .await
            }
            Transport::Smtp {
                host,
                port,
                secure,
                user,
                password,
                from,
            } => {
                self.send_smtp(
                    config, &host, port, secure, user, password, &from, &to, &subject, &text,
                    &html, payload,
                )
                .await
            }
            Transport::NotConfigured => Err(DeliveryError::NotConfigured),
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn send_api(
        &self,
        config: &Config,
        key: &str,
        from: &str,
        to: &str,
        subject: &str,
        text: &str,
        html: &str,
        payload: &DeliveryPayload,
    ) -> Result<(), DeliveryError> {
        let attachments = payload.attachment.as_ref().map(|att| {
            vec![ApiAttachment {
                filename: att.filename.clone(),
                content: BASE64.encode(&att.bytes),
                content_type: att.content_type.clone(),
            }]
        });

        let request = ApiEmailRequest {
            from: format_address(&config.brand_name, from),
            to: vec![to],
            reply_to: &payload.email,
            subject,
            text,
            html,
            attachments,
        };

        let response = self
            .http
            .post(format!("{}/emails", config.resend_api_base))
            .bearer_auth(key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let details = response.text().await.unwrap_or_default();
            error!("Email API request failed ({status}): {details}");
            return Err(DeliveryError::ApiRejected { status });
        }

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn send_smtp(
        &self,
        config: &Config,
        host: &str,
        port: u16,
        secure: bool,
        user: Option<String>,
        password: Option<String>,
        from: &str,
        to: &str,
        subject: &str,
        text: &str,
        html: &str,
        payload: &DeliveryPayload,
    ) -> Result<(), DeliveryError> {
        let from_mailbox: Mailbox = format_address(&config.brand_name, from).parse()?;
        let to_mailbox: Mailbox = to.parse()?;
        let reply_to: Mailbox = payload.email.parse()?;

        let alternative = MultiPart::alternative_plain_html(text.to_string(), html.to_string());
        let builder = Message::builder()
            .from(from_mailbox)
            .reply_to(reply_to)
            .to(to_mailbox)
            .subject(subject);

        let message = match &payload.attachment {
            Some(att) => {
                // A client-supplied content type that does not parse
                // falls back to octet-stream rather than failing the send.
                let content_type = ContentType::parse(
                    att.content_type.as_deref().unwrap_or("application/octet-stream"),
                )
                .or_else(|_| ContentType::parse("application/octet-stream"))?;
                let part = MailAttachment::new(att.filename.clone())
                    .body(att.bytes.clone(), content_type);
                builder.multipart(MultiPart::mixed().multipart(alternative).singlepart(part))?
            }
            None => builder.multipart(alternative)?,
        };

        let mut transport = if secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
        };
        transport = transport.port(port).timeout(Some(self.timeout));
        if let Some(user) = user {
            transport = transport.credentials(Credentials::new(user, password.unwrap_or_default()));
        }

        transport.build().send(message).await?;
        Ok(())
    }
}
