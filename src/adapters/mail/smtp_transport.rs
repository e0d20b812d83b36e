//! SMTP transport over lettre.
//!
//! Port 465 uses implicit TLS, any other port upgrades with STARTTLS.
//! A new `AsyncSmtpTransport` is built for every dispatch; no pooling.

use crate::domain::{DomainError, MailSettings, OutgoingMail};
use crate::ports::{MailTransport, MailTransportFactory};
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

/// Builds lettre SMTP sessions from `MailSettings`.
#[derive(Debug, Default)]
pub struct SmtpTransportFactory;

impl SmtpTransportFactory {
    pub fn new() -> Self {
        Self
    }
}

impl MailTransportFactory for SmtpTransportFactory {
    fn open(&self, settings: &MailSettings) -> Result<Box<dyn MailTransport>, DomainError> {
        let builder = if settings.secure() {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
        }
        .map_err(|e| DomainError::Transport(e.to_string()))?;

        let mut builder = builder.port(settings.port);
        if let (Some(user), Some(pass)) = (&settings.user, &settings.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        debug!(host = %settings.host, port = settings.port, secure = settings.secure(), "SMTP session built");
        Ok(Box::new(SmtpTransport {
            inner: builder.build(),
            domain: settings.host.clone(),
        }))
    }
}

struct SmtpTransport {
    inner: AsyncSmtpTransport<Tokio1Executor>,
    /// Right-hand side of generated Message-IDs.
    domain: String,
}

#[async_trait::async_trait]
impl MailTransport for SmtpTransport {
    async fn verify(&self) -> Result<(), DomainError> {
        match self.inner.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(DomainError::Transport(
                "SMTP server did not accept the connection".into(),
            )),
            Err(e) => Err(DomainError::Transport(e.to_string())),
        }
    }

    async fn send(&self, mail: &OutgoingMail) -> Result<String, DomainError> {
        let message_id = format!("<{}@{}>", uuid::Uuid::new_v4(), self.domain);
        let message = build_message(mail, &message_id)?;
        let response = self
            .inner
            .send(message)
            .await
            .map_err(|e| DomainError::Transport(e.to_string()))?;
        debug!(code = %response.code(), "SMTP relay accepted message");
        Ok(message_id)
    }
}

/// Map the composed mail onto a lettre multipart message (HTML body + one attachment).
fn build_message(mail: &OutgoingMail, message_id: &str) -> Result<Message, DomainError> {
    let from = Mailbox::new(
        Some(mail.from_name.clone()),
        mail.from
            .parse()
            .map_err(|e| DomainError::Compose(format!("sender address: {}", e)))?,
    );
    let to: Mailbox = mail
        .to
        .parse()
        .map_err(|e| DomainError::Compose(format!("recipient address: {}", e)))?;
    let content_type = ContentType::parse(&mail.attachment.content_type)
        .map_err(|e| DomainError::Compose(format!("content type: {}", e)))?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(mail.subject.clone())
        .message_id(Some(message_id.to_string()))
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::html(mail.html.clone()))
                .singlepart(
                    Attachment::new(mail.attachment.file_name.clone())
                        .body(mail.attachment.bytes.clone(), content_type),
                ),
        )
        .map_err(|e| DomainError::Compose(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MailAttachment;

    fn mail() -> OutgoingMail {
        OutgoingMail {
            from: "scanner@example.com".into(),
            from_name: "Document Scanner App".into(),
            to: "scans@example.com".into(),
            subject: "📄 Нов сканиран документ".into(),
            html: "<p>hi</p>".into(),
            attachment: MailAttachment {
                file_name: "scan.pdf".into(),
                content_type: "application/pdf".into(),
                bytes: b"%PDF".to_vec(),
            },
        }
    }

    #[test]
    fn test_build_message_has_attachment_and_id() {
        let message = build_message(&mail(), "<abc@example.com>").unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Message-ID: <abc@example.com>"));
        assert!(raw.contains("application/pdf"));
        assert!(raw.contains("scan.pdf"));
        assert!(raw.contains("Document Scanner App"));
    }

    #[test]
    fn test_build_message_rejects_bad_recipient() {
        let mut m = mail();
        m.to = "not an address".into();
        assert!(matches!(
            build_message(&m, "<x@y>"),
            Err(DomainError::Compose(_))
        ));
    }
}
