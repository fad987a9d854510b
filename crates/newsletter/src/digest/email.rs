//! Email delivery over authenticated SMTP.

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::generator::RenderedDigest;
use crate::config::MailConfig;
use crate::error::MailError;

/// Something that can deliver a rendered digest.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Check configuration without sending anything.
    fn validate(&self) -> Result<(), MailError>;

    /// Deliver the digest to every recipient.
    async fn send(&self, digest: &RenderedDigest) -> Result<(), MailError>;
}

/// STARTTLS SMTP sender.
pub struct SmtpMailer {
    config: MailConfig,
}

impl SmtpMailer {
    #[must_use]
    pub const fn new(config: MailConfig) -> Self {
        Self { config }
    }

    fn build_message(&self, digest: &RenderedDigest) -> Result<Message, MailError> {
        let from = parse_mailbox(&self.config.sender_email)?;

        let mut builder = Message::builder().from(from).subject(digest.subject.as_str());
        for recipient in &self.config.recipients {
            builder = builder.to(parse_mailbox(recipient)?);
        }

        builder
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(digest.text.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(digest.html.clone()),
                    ),
            )
            .map_err(|e| MailError::Transport(format!("failed to build message: {e}")))
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    fn validate(&self) -> Result<(), MailError> {
        self.config.validate()?;
        parse_mailbox(&self.config.sender_email)?;
        for recipient in &self.config.recipients {
            parse_mailbox(recipient)?;
        }
        Ok(())
    }

    async fn send(&self, digest: &RenderedDigest) -> Result<(), MailError> {
        self.validate()?;
        let email = self.build_message(digest)?;

        let creds = Credentials::new(
            self.config.sender_email.clone(),
            self.config.sender_password.clone(),
        );

        let mailer: AsyncSmtpTransport<Tokio1Executor> =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)
                .map_err(|e| MailError::Transport(format!("failed to create SMTP transport: {e}")))?
                .port(self.config.smtp_port)
                .credentials(creds)
                .build();

        mailer
            .send(email)
            .await
            .map_err(|e| MailError::Transport(format!("SMTP delivery failed: {e}")))?;

        tracing::info!(
            recipients = self.config.recipients.len(),
            subject = %digest.subject,
            "Digest email sent"
        );

        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse().map_err(|e: lettre::address::AddressError| MailError::InvalidAddress {
        address: address.to_string(),
        reason: e.to_string(),
    })
}
