//! Contact form gateway.
//!
//! Validates multipart contact submissions, checks the configured
//! bot-mitigation challenge, delivers a notification email through one
//! of two transports, and side-logs accepted submissions to a
//! spreadsheet webhook on a detached task.

pub mod captcha;
pub mod config;
pub mod flow;
pub mod i18n;
pub mod mailer;
pub mod schema;
pub mod server;
pub mod services;
pub mod sheet;
