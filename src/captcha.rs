//! Bot-mitigation challenge verification.
//!
//! Two providers are understood, Cloudflare Turnstile and hCaptcha,
//! resolved from configuration with Turnstile taking precedence. When
//! neither provider has a complete site-key/secret pair, verification
//! is open (always succeeds). A provider with only half of its pair
//! configured is reported once per process, then ignored.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptchaProvider {
    Turnstile,
    Hcaptcha,
}

/// The provider resolved for this process, secret included. Never
/// serialized; only the client config below leaves the server.
#[derive(Debug, Clone)]
struct ResolvedCaptcha {
    provider: CaptchaProvider,
    site_key: String,
    secret: String,
}

/// Client-safe subset for embedding the matching widget in the form:
/// provider kind and public site key, never the secret.
#[derive(Debug, Clone, Serialize)]
pub struct CaptchaClientConfig {
    #[serde(rename = "type")]
    pub provider: CaptchaProvider,
    #[serde(rename = "siteKey")]
    pub site_key: String,
}

#[derive(Debug, Serialize)]
struct SiteverifyRequest<'a> {
    secret: &'a str,
    response: &'a str,
}

#[derive(Debug, Deserialize)]
struct SiteverifyResponse {
    success: bool,
}

/// Checks submitted challenge tokens against the configured provider.
///
/// Owns the one piece of process-lifetime state in the gateway: the
/// "partial configuration already reported" flag. Tests construct a
/// fresh verifier per case to get fresh once-only semantics.
#[derive(Debug)]
pub struct CaptchaVerifier {
    http: reqwest::Client,
    warned_partial: AtomicBool,
}

impl CaptchaVerifier {
    pub fn new(timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            warned_partial: AtomicBool::new(false),
        }
    }

    /// Turnstile wins when fully configured, then hCaptcha, else none.
    fn resolve(&self, config: &Config) -> Option<ResolvedCaptcha> {
        if let (Some(secret), Some(site_key)) =
            (&config.turnstile_secret, &config.turnstile_site_key)
        {
            return Some(ResolvedCaptcha {
                provider: CaptchaProvider::Turnstile,
                site_key: site_key.clone(),
                secret: secret.clone(),
            });
        }

        if let (Some(secret), Some(site_key)) = (&config.hcaptcha_secret, &config.hcaptcha_site_key)
        {
            return Some(ResolvedCaptcha {
                provider: CaptchaProvider::Hcaptcha,
                site_key: site_key.clone(),
                secret: secret.clone(),
            });
        }

        self.note_partial_configuration(config);
        None
    }

    /// Report a half-configured provider once per process lifetime.
    fn note_partial_configuration(&self, config: &Config) {
        let turnstile_partial =
            config.turnstile_secret.is_some() != config.turnstile_site_key.is_some();
        let hcaptcha_partial =
            config.hcaptcha_secret.is_some() != config.hcaptcha_site_key.is_some();

        if (turnstile_partial || hcaptcha_partial)
            && !self.warned_partial.swap(true, Ordering::Relaxed)
        {
            warn!(
                "Captcha keys are partially configured; skipping verification \
                 until both the site key and secret are set"
            );
        }
    }

    /// Provider kind and site key for the form widget, if any provider
    /// is fully configured.
    pub fn client_config(&self, config: &Config) -> Option<CaptchaClientConfig> {
        self.resolve(config).map(|resolved| CaptchaClientConfig {
            provider: resolved.provider,
            site_key: resolved.site_key,
        })
    }

    /// Verify a submitted token.
    ///
    /// No provider configured: open posture, always true. Provider
    /// configured but no token submitted: fail closed without touching
    /// the network. Network or parse failures also fail closed.
    pub async fn verify(&self, config: &Config, token: Option<&str>) -> bool {
        let Some(resolved) = self.resolve(config) else {
            return true;
        };

        let Some(token) = token else {
            return false;
        };

        let result = match resolved.provider {
            CaptchaProvider::Turnstile => {
                self.siteverify_json(&config.turnstile_verify_url, &resolved.secret, token)
                    .await
            }
            CaptchaProvider::Hcaptcha => {
                self.siteverify_form(&config.hcaptcha_verify_url, &resolved.secret, token)
                    .await
            }
        };

        match result {
            Ok(success) => success,
            Err(e) => {
                warn!("Captcha verification request failed: {e:#}");
                false
            }
        }
    }

    /// Turnstile expects a JSON body.
    async fn siteverify_json(&self, url: &str, secret: &str, token: &str) -> Result<bool> {
        let response = self
            .http
            .post(url)
            .json(&SiteverifyRequest {
                secret,
                response: token,
            })
            .send()
            .await
            .context("Failed to reach captcha verification endpoint")?;

        let body: SiteverifyResponse = response
            .json()
            .await
            .context("Failed to parse captcha verification response")?;
        Ok(body.success)
    }

    /// hCaptcha expects form encoding.
    async fn siteverify_form(&self, url: &str, secret: &str, token: &str) -> Result<bool> {
        let response = self
            .http
            .post(url)
            .form(&[("secret", secret), ("response", token)])
            .send()
            .await
            .context("Failed to reach captcha verification endpoint")?;

        let body: SiteverifyResponse = response
            .json()
            .await
            .context("Failed to parse captcha verification response")?;
        Ok(body.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn verifier() -> CaptchaVerifier {
        CaptchaVerifier::new(Duration::from_secs(2))
    }

    fn turnstile_config(verify_url: &str) -> Config {
        Config {
            turnstile_secret: Some("ts-secret".to_string()),
            turnstile_site_key: Some("ts-site".to_string()),
            turnstile_verify_url: verify_url.to_string(),
            ..Config::default()
        }
    }

    fn hcaptcha_config(verify_url: &str) -> Config {
        Config {
            hcaptcha_secret: Some("hc-secret".to_string()),
            hcaptcha_site_key: Some("hc-site".to_string()),
            hcaptcha_verify_url: verify_url.to_string(),
            ..Config::default()
        }
    }

    // ==================== Resolution ====================

    #[tokio::test]
    async fn test_unconfigured_captcha_is_open() {
        let config = Config::default();
        assert!(verifier().verify(&config, None).await);
        assert!(verifier().verify(&config, Some("anything")).await);
    }

    #[test]
    fn test_turnstile_takes_precedence_over_hcaptcha() {
        let config = Config {
            turnstile_secret: Some("ts-secret".to_string()),
            turnstile_site_key: Some("ts-site".to_string()),
            hcaptcha_secret: Some("hc-secret".to_string()),
            hcaptcha_site_key: Some("hc-site".to_string()),
            ..Config::default()
        };
        let client = verifier().client_config(&config).expect("configured");
        assert_eq!(client.provider, CaptchaProvider::Turnstile);
        assert_eq!(client.site_key, "ts-site");
    }

    #[test]
    fn test_client_config_never_exposes_secret() {
        let config = hcaptcha_config("https://hcaptcha.com/siteverify");
        let client = verifier().client_config(&config).expect("configured");
        let json = serde_json::to_string(&client).expect("serialize");
        assert!(json.contains("hc-site"));
        assert!(!json.contains("hc-secret"));
        assert!(json.contains(r#""type":"hcaptcha""#));
    }

    #[test]
    fn test_client_config_absent_when_unconfigured() {
        assert!(verifier().client_config(&Config::default()).is_none());
    }

    // ==================== Partial Configuration ====================

    #[tokio::test]
    async fn test_partial_config_behaves_as_disabled() {
        let config = Config {
            turnstile_secret: Some("ts-secret".to_string()),
            ..Config::default()
        };
        let v = verifier();
        assert!(v.verify(&config, None).await);
        assert!(v.verify(&config, Some("token")).await);
    }

    #[tokio::test]
    async fn test_partial_config_warns_once() {
        let config = Config {
            hcaptcha_site_key: Some("hc-site".to_string()),
            ..Config::default()
        };
        let v = verifier();
        assert!(!v.warned_partial.load(Ordering::Relaxed));
        v.verify(&config, None).await;
        assert!(v.warned_partial.load(Ordering::Relaxed));
        // The flag stays set; the second resolve takes the
        // already-warned branch of the swap.
        v.verify(&config, None).await;
        assert!(v.warned_partial.load(Ordering::Relaxed));
    }

    #[test]
    fn test_complete_config_never_sets_partial_flag() {
        let v = verifier();
        v.client_config(&turnstile_config("https://example.com"));
        assert!(!v.warned_partial.load(Ordering::Relaxed));
    }

    // ==================== Verification ====================

    #[tokio::test]
    async fn test_missing_token_fails_closed_without_network_call() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true
            })))
            .expect(0)
            .mount(&mock_server)
            .await;

        let config = turnstile_config(&mock_server.uri());
        assert!(!verifier().verify(&config, None).await);
        // MockServer verifies the zero-call expectation on drop.
    }

    #[tokio::test]
    async fn test_turnstile_posts_json_and_reads_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/turnstile/v0/siteverify"))
            .and(body_string_contains(r#""secret":"ts-secret""#))
            .and(body_string_contains(r#""response":"the-token""#))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let config = turnstile_config(&format!("{}/turnstile/v0/siteverify", mock_server.uri()));
        assert!(verifier().verify(&config, Some("the-token")).await);
    }

    #[tokio::test]
    async fn test_hcaptcha_posts_form_and_reads_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/siteverify"))
            .and(body_string_contains("secret=hc-secret"))
            .and(body_string_contains("response=the-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": false
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let config = hcaptcha_config(&format!("{}/siteverify", mock_server.uri()));
        assert!(!verifier().verify(&config, Some("the-token")).await);
    }

    #[tokio::test]
    async fn test_provider_error_fails_closed() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream broken"))
            .mount(&mock_server)
            .await;

        let config = turnstile_config(&mock_server.uri());
        assert!(!verifier().verify(&config, Some("the-token")).await);
    }

    #[tokio::test]
    async fn test_unreachable_provider_fails_closed() {
        // Nothing listens on this port.
        let config = turnstile_config("http://127.0.0.1:9/siteverify");
        assert!(!verifier().verify(&config, Some("the-token")).await);
    }
}
