//! Submit binary - drives the client half of the contact flow against
//! a running gateway: advisory validation first, then the multipart
//! upload. Field errors are printed locally without touching the
//! network, exactly like the browser form behaves.
//!
//! Usage:
//!   cargo run --bin submit -- --name "Ada Lovelace" --email ada@example.com \
//!       --message "Looking to collaborate on a new project." --service web
//!
//! Optional:
//!   --gateway URL   (defaults to http://localhost:8080)
//!   --company NAME
//!   --file PATH     (attachment, 5 MiB max)
//!   --locale CODE   (en or fr, defaults to en)
//!   --token TOKEN   (captcha token, when the gateway has a provider)

use anyhow::{bail, Context, Result};
use serde_json::Value;

use contact_gateway::flow::{FormEvent, FormPhase};
use contact_gateway::i18n::Language;
use contact_gateway::schema::{self, Attachment, RawSubmission};

#[derive(Debug, Default)]
struct Args {
    gateway: Option<String>,
    name: Option<String>,
    email: Option<String>,
    company: Option<String>,
    message: Option<String>,
    service: Option<String>,
    locale: Option<String>,
    token: Option<String>,
    file: Option<String>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);

    while let Some(flag) = iter.next() {
        let mut take = |name: &str| {
            iter.next()
                .with_context(|| format!("{name} expects a value"))
        };
        match flag.as_str() {
            "--gateway" => args.gateway = Some(take("--gateway")?),
            "--name" => args.name = Some(take("--name")?),
            "--email" => args.email = Some(take("--email")?),
            "--company" => args.company = Some(take("--company")?),
            "--message" => args.message = Some(take("--message")?),
            "--service" => args.service = Some(take("--service")?),
            "--locale" => args.locale = Some(take("--locale")?),
            "--token" => args.token = Some(take("--token")?),
            "--file" => args.file = Some(take("--file")?),
            other => bail!("Unknown flag: {other}"),
        }
    }

    Ok(args)
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("contact_gateway=info".parse()?),
        )
        .init();

    let args = parse_args()?;
    let gateway = args
        .gateway
        .clone()
        .unwrap_or_else(|| "http://localhost:8080".to_string());
    let locale = Language::resolve(args.locale.as_deref(), "en");
    let strings = locale.strings();

    let attachment = match &args.file {
        Some(path) => {
            let bytes =
                std::fs::read(path).with_context(|| format!("Failed to read attachment {path}"))?;
            let filename = std::path::Path::new(path)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.clone());
            Some(Attachment {
                filename,
                bytes,
                content_type: None,
            })
        }
        None => None,
    };

    let raw = RawSubmission {
        name: args.name,
        email: args.email,
        company: args.company,
        message: args.message,
        service: args.service,
        token: args.token,
        honeypot: None,
        file: attachment,
    };

    // Advisory pass: same rules the server re-runs authoritatively.
    let phase = FormPhase::Idle.on(FormEvent::Submit);
    println!("{}", strings.validating);

    let (submission, phase) = match schema::parse_submission(raw, strings) {
        Ok(submission) => (submission, phase.on(FormEvent::Validated)),
        Err(errors) => {
            for (field, message) in &errors {
                eprintln!("  {field}: {message}");
            }
            bail!("Validation failed; nothing was sent");
        }
    };

    println!("{}", strings.sending);
    let mut form = reqwest::multipart::Form::new()
        .text("name", submission.name)
        .text("email", submission.email)
        .text("message", submission.message)
        .text("service", submission.service)
        .text("locale", locale.code());
    if let Some(company) = submission.company {
        form = form.text("company", company);
    }
    if let Some(token) = submission.token {
        form = form.text("token", token);
    }
    if let Some(file) = submission.file {
        form = form.part(
            "file",
            reqwest::multipart::Part::bytes(file.bytes).file_name(file.filename),
        );
    }

    let response = reqwest::Client::new()
        .post(format!("{gateway}/api/contact"))
        .multipart(form)
        .send()
        .await
        .context("Failed to reach the gateway")?;

    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);

    if !status.is_success() {
        let _ = phase.on(FormEvent::Failed);
        eprintln!("{}", strings.error);
        if let Some(code) = body.get("error").and_then(Value::as_str) {
            eprintln!("  error code: {code}");
        }
        if let Some(errors) = body.get("errors").and_then(Value::as_object) {
            for (field, message) in errors {
                eprintln!("  {field}: {}", message.as_str().unwrap_or_default());
            }
        }
        bail!("Gateway rejected the submission ({status})");
    }

    let phase = phase.on(FormEvent::Delivered);
    debug_assert_eq!(phase, FormPhase::Success);
    println!("{}", strings.success);
    Ok(())
}
