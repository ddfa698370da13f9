// src/services/notify.rs

//! Notification dispatch: digest email over SMTP.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{AuthConfig, DigestLocale, Listing, MailConfig};
use crate::services::digest::{DigestTemplate, LOGO_CID};
use crate::services::token::acquire_token;

/// Receiver of new-listing digests.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a digest of `listings` (never called with an empty slice).
    async fn notify(&self, listings: &[Listing]) -> Result<()>;
}

/// Sends the digest as an HTML email through an authenticated SMTP relay.
pub struct EmailNotifier {
    client: Client,
    auth: AuthConfig,
    mail: MailConfig,
    locale: DigestLocale,
    timeout: Duration,
}

impl EmailNotifier {
    pub fn new(
        client: Client,
        auth: AuthConfig,
        mail: MailConfig,
        locale: DigestLocale,
        timeout_secs: u64,
    ) -> Self {
        Self {
            client,
            auth,
            mail,
            locale,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Read the logo; a missing or unreadable file drops the logo only.
    async fn load_logo(&self) -> Option<(Vec<u8>, ContentType)> {
        let path = self.mail.logo_path.as_ref()?;
        match tokio::fs::read(path).await {
            Ok(bytes) => Some((bytes, image_content_type(path))),
            Err(e) => {
                log::warn!("Sending digest without logo, cannot read {}: {}", path.display(), e);
                None
            }
        }
    }

    async fn send(&self, message: Message) -> Result<()> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.mail.smtp_server)?
            .port(self.mail.smtp_port)
            .credentials(Credentials::new(
                self.mail.smtp_login.clone(),
                self.mail.smtp_password.clone(),
            ))
            .timeout(Some(self.timeout))
            .build();

        transport.send(message).await?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn notify(&self, listings: &[Listing]) -> Result<()> {
        self.mail.validate()?;

        let token = acquire_token(&self.client, &self.auth).await;
        let logo = self.load_logo().await;

        let html = DigestTemplate {
            locale: &self.locale,
            apply_url: &self.mail.apply_url,
            token: token.as_deref(),
            with_logo: logo.is_some(),
        }
        .render(listings)?;

        let message = build_message(&self.mail, html, logo)?;
        if let Err(e) = self.send(message).await {
            let relay = format!("{}:{}", self.mail.smtp_server, self.mail.smtp_port);
            log::error!("Digest delivery via {} failed: {}", relay, e);
            return Err(AppError::notify(relay, e));
        }

        log::info!(
            "Digest with {} listing(s) sent to {}",
            listings.len(),
            self.mail.receiver
        );
        Ok(())
    }
}

/// Assemble a `multipart/related` message: HTML body plus optional inline logo.
pub fn build_message(
    mail: &MailConfig,
    html: String,
    logo: Option<(Vec<u8>, ContentType)>,
) -> Result<Message> {
    let from: Mailbox = mail.sender.parse()?;
    let to: Mailbox = mail.receiver.parse()?;

    let related = MultiPart::related().singlepart(SinglePart::html(html));
    let related = match logo {
        Some((bytes, content_type)) => related
            .singlepart(Attachment::new_inline(LOGO_CID.to_string()).body(bytes, content_type)),
        None => related,
    };

    Ok(Message::builder()
        .from(from)
        .to(to)
        .subject(mail.subject.clone())
        .multipart(related)?)
}

fn image_content_type(path: &Path) -> ContentType {
    let mime = match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        _ => "image/png",
    };
    ContentType::parse(mime).unwrap_or(ContentType::TEXT_PLAIN)
}
