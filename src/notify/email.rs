//! Email notifier. HTML mail over SMTPS via lettre.

use async_trait::async_trait;
use chrono::NaiveDate;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, Message, SmtpTransport, Transport};
use secrecy::ExposeSecret;

use crate::config::MailConfig;
use crate::error::NotifyError;
use crate::notify::Notifier;

/// Display name on the From header.
pub const SENDER_DISPLAY_NAME: &str = "arXiv自动邮件";

/// Display name on each To mailbox.
pub const RECEIVER_DISPLAY_NAME: &str = "收件人";

/// Subject line for the digest sent on `date`.
pub fn subject_for(date: NaiveDate) -> String {
    format!("{}-每日arXiv论文", date.format("%Y-%m-%d"))
}

fn parse_address(address: &str) -> Result<Address, NotifyError> {
    address
        .parse::<Address>()
        .map_err(|e| NotifyError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })
}

/// Build the HTML digest email.
pub fn build_message(
    config: &MailConfig,
    content: &str,
    date: NaiveDate,
) -> Result<Message, NotifyError> {
    let from = Mailbox::new(
        Some(SENDER_DISPLAY_NAME.to_string()),
        parse_address(&config.sender)?,
    );

    let mut builder = Message::builder().from(from);
    for receiver in &config.receivers {
        builder = builder.to(Mailbox::new(
            Some(RECEIVER_DISPLAY_NAME.to_string()),
            parse_address(receiver)?,
        ));
    }

    builder
        .subject(subject_for(date))
        .header(ContentType::TEXT_HTML)
        .body(content.to_string())
        .map_err(|e| NotifyError::Build(e.to_string()))
}

/// Send via SMTPS (implicit TLS). Blocks until the relay answers.
fn send_blocking(config: &MailConfig, message: &Message) -> Result<(), NotifyError> {
    let creds = Credentials::new(
        config.sender.clone(),
        config.auth_code.expose_secret().to_string(),
    );

    let transport = SmtpTransport::relay(&config.smtp_host)
        .map_err(|e| NotifyError::Smtp(format!("SMTP relay error: {e}")))?
        .port(config.smtp_port)
        .credentials(creds)
        .build();

    transport
        .send(message)
        .map_err(|e| NotifyError::Smtp(e.to_string()))?;

    tracing::info!(
        receivers = config.receivers.len(),
        host = %config.smtp_host,
        "Email sent"
    );
    Ok(())
}

/// Sends the digest to every configured receiver.
pub struct EmailNotifier {
    config: MailConfig,
}

impl EmailNotifier {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &str {
        "email"
    }

    async fn deliver(&self, content: &str) -> Result<(), NotifyError> {
        let today = chrono::Local::now().date_naive();
        let message = build_message(&self.config, content, today)?;
        let config = self.config.clone();
        tokio::task::spawn_blocking(move || send_blocking(&config, &message))
            .await
            .map_err(|e| NotifyError::Smtp(format!("SMTP task failed: {e}")))?
    }
}
