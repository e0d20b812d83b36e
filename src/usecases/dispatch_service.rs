//! Email dispatch: validate → settings → open transport → verify → decode → compose → send.
//!
//! - One transport session per call, dropped when the call returns
//! - Every fault after validation is classified; nothing propagates to the caller
//! - Attachment is always labelled `application/pdf`, whatever the bytes are

use crate::domain::classify::{classify_error, validation_failure};
use crate::domain::entities::FILE_NAME_PREFIX;
use crate::domain::{
    DomainError, EmailDispatchRequest, EmailDispatchResult, MailAttachment, OutgoingMail,
};
use crate::ports::{MailSettingsPort, MailTransportFactory};
use base64::Engine as _;
use chrono::{DateTime, Local};
use std::sync::Arc;
use tracing::{error, info};

pub const ATTACHMENT_CONTENT_TYPE: &str = "application/pdf";
const SENDER_NAME: &str = "Document Scanner App";

/// Dispatch service. Stateless between calls.
pub struct DispatchService {
    settings: Arc<dyn MailSettingsPort>,
    transports: Arc<dyn MailTransportFactory>,
}

impl DispatchService {
    pub fn new(
        settings: Arc<dyn MailSettingsPort>,
        transports: Arc<dyn MailTransportFactory>,
    ) -> Self {
        Self {
            settings,
            transports,
        }
    }

    /// Dispatch one capture. Never fails: faults come back as `EmailDispatchResult::Failed`.
    pub async fn dispatch(&self, request: &EmailDispatchRequest) -> EmailDispatchResult {
        let Some(encoded) = request.encoded_image.as_deref().filter(|s| !s.is_empty()) else {
            info!("dispatch rejected: no image data");
            return validation_failure();
        };

        match self.try_dispatch(encoded, request, Local::now()).await {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "email dispatch failed");
                classify_error(&e)
            }
        }
    }

    async fn try_dispatch(
        &self,
        encoded: &str,
        request: &EmailDispatchRequest,
        now: DateTime<Local>,
    ) -> Result<EmailDispatchResult, DomainError> {
        let settings = self.settings.mail_settings()?;
        let transport = self.transports.open(&settings)?;
        transport.verify().await?;

        let bytes = decode_attachment(encoded)?;
        let file_name = derive_file_name(request.file_name.as_deref(), now);
        let file_size_kb = format_kilobytes(bytes.len());
        let (date, time) = (local_date(now), local_time(now));

        let mail = OutgoingMail {
            from: settings.from.clone(),
            from_name: SENDER_NAME.to_string(),
            to: settings.to.clone(),
            subject: format!("📄 Нов сканиран документ - {} {}", date, time),
            html: compose_html(&MailDetails {
                date: &date,
                time: &time,
                file_name: &file_name,
                file_size_kb: &file_size_kb,
                metadata: request.metadata.as_deref(),
                sent_at: &format!("{}, {}", date, time),
            }),
            attachment: MailAttachment {
                file_name: file_name.clone(),
                content_type: ATTACHMENT_CONTENT_TYPE.to_string(),
                bytes,
            },
        };

        let message_id = transport.send(&mail).await?;
        info!(%message_id, file_name = %file_name, size_kb = %file_size_kb, "email sent");

        Ok(EmailDispatchResult::Sent {
            message_id,
            file_name,
            file_size_kb,
        })
    }
}

/// Split at the data-URI separator and decode the base64 tail.
pub fn decode_attachment(encoded: &str) -> Result<Vec<u8>, DomainError> {
    let payload = encoded
        .split(',')
        .nth(1)
        .ok_or_else(|| DomainError::Decode("missing data URI separator".into()))?;
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| DomainError::Decode(e.to_string()))
}

/// Caller's name when present, otherwise prefix + unix millis + `.pdf`.
pub fn derive_file_name(requested: Option<&str>, now: DateTime<Local>) -> String {
    match requested.filter(|s| !s.is_empty()) {
        Some(name) => name.to_string(),
        None => format!("{}{}.pdf", FILE_NAME_PREFIX, now.timestamp_millis()),
    }
}

/// `len / 1024` rounded half-up to two decimals, e.g. `"0.13"` for 128 bytes.
pub fn format_kilobytes(byte_len: usize) -> String {
    let hundredths = (byte_len as u128 * 100 + 512) / 1024;
    format!("{}.{:02}", hundredths / 100, hundredths % 100)
}

/// bg-BG short date, e.g. "18.10.2026 г.".
pub fn local_date(now: DateTime<Local>) -> String {
    now.format("%d.%m.%Y г.").to_string()
}

/// bg-BG time, e.g. "14:05:09 ч.".
pub fn local_time(now: DateTime<Local>) -> String {
    now.format("%H:%M:%S ч.").to_string()
}

struct MailDetails<'a> {
    date: &'a str,
    time: &'a str,
    file_name: &'a str,
    file_size_kb: &'a str,
    metadata: Option<&'a str>,
    sent_at: &'a str,
}

fn compose_html(d: &MailDetails<'_>) -> String {
    let metadata = d
        .metadata
        .filter(|m| !m.is_empty())
        .map(|m| {
            format!(
                "<p><strong>ℹ️ Допълнителна информация:</strong> {}</p>",
                escape_html(m)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <style>
    body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
    .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
    .header {{ background: #f8f9fa; padding: 20px; border-radius: 8px; margin-bottom: 20px; }}
    .content {{ background: white; padding: 20px; border: 1px solid #e9ecef; border-radius: 8px; }}
    .footer {{ margin-top: 20px; padding: 15px; background: #f8f9fa; border-radius: 8px; font-size: 12px; color: #666; }}
    .highlight {{ color: #007bff; font-weight: bold; }}
    .metadata {{ background: #f8f9fa; padding: 15px; border-radius: 5px; margin: 15px 0; }}
  </style>
</head>
<body>
  <div class="container">
    <div class="header">
      <h2>📄 Нов сканиран документ</h2>
      <p>Автоматично изпратен от Document Scanner App</p>
    </div>
    <div class="content">
      <h3>Детайли за документа:</h3>
      <div class="metadata">
        <p><strong>📅 Дата на сканиране:</strong> <span class="highlight">{date}</span></p>
        <p><strong>🕐 Час на сканиране:</strong> <span class="highlight">{time}</span></p>
        <p><strong>📎 Име на файла:</strong> <span class="highlight">{file_name}</span></p>
        <p><strong>📏 Размер на файла:</strong> <span class="highlight">{size} KB</span></p>
        {metadata}
      </div>
      <p>Моля, намерете прикачения PDF документ. Документът е автоматично обработен и оптимизиран за печат.</p>
      <p><strong>Забележка:</strong> Този имейл е изпратен автоматично от системата за сканиране на документи.</p>
    </div>
    <div class="footer">
      <p>🤖 Автоматично генериран имейл от Document Scanner App</p>
      <p>Дата и час на изпращане: {sent_at}</p>
    </div>
  </div>
</body>
</html>
"#,
        date = d.date,
        time = d.time,
        file_name = escape_html(d.file_name),
        size = d.file_size_kb,
        metadata = metadata,
        sent_at = d.sent_at,
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mail::{MockTransportFactory, StaticMailSettings};
    use crate::domain::classify::{AUTH_MESSAGE, CONNECTIVITY_MESSAGE, VALIDATION_MESSAGE};
    use crate::domain::{CapturedImage, DispatchErrorKind};
    use chrono::TimeZone;

    fn service(factory: &Arc<MockTransportFactory>) -> DispatchService {
        DispatchService::new(
            Arc::new(StaticMailSettings::example()),
            Arc::clone(factory) as Arc<dyn MailTransportFactory>,
        )
    }

    fn request_for(bytes: &[u8]) -> EmailDispatchRequest {
        EmailDispatchRequest {
            encoded_image: Some(CapturedImage::from_bytes("image/png", bytes).as_data_uri().into()),
            file_name: None,
            metadata: Some("Сканирани 1 документ".into()),
        }
    }

    #[test]
    fn test_format_kilobytes() {
        assert_eq!(format_kilobytes(0), "0.00");
        assert_eq!(format_kilobytes(1), "0.00");
        assert_eq!(format_kilobytes(128), "0.13");
        assert_eq!(format_kilobytes(1024), "1.00");
        assert_eq!(format_kilobytes(1536), "1.50");
        assert_eq!(format_kilobytes(12_345), "12.06");
        assert_eq!(format_kilobytes(10 * 1024 * 1024), "10240.00");
    }

    #[test]
    fn test_format_kilobytes_matches_rounded_division() {
        for len in (0..5000).step_by(37) {
            let expected = ((len as f64 / 1024.0) * 100.0).round() / 100.0;
            let got: f64 = format_kilobytes(len).parse().unwrap();
            assert!((got - expected).abs() < 1e-9, "len={len} got={got} expected={expected}");
            assert_eq!(format_kilobytes(len).split('.').nth(1).unwrap().len(), 2);
        }
    }

    #[test]
    fn test_derive_file_name() {
        let now = Local.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(derive_file_name(Some("scan.jpg"), now), "scan.jpg");
        assert_eq!(
            derive_file_name(None, now),
            "Сканиран_документ_1700000000123.pdf"
        );
        assert_eq!(
            derive_file_name(Some(""), now),
            "Сканиран_документ_1700000000123.pdf"
        );
    }

    #[test]
    fn test_decode_attachment() {
        assert_eq!(decode_attachment("data:image/png;base64,YWJj").unwrap(), b"abc");
        assert!(decode_attachment("data:image/png;base64,").unwrap().is_empty());
        assert!(decode_attachment("no-separator").is_err());
        assert!(decode_attachment("data:x;base64,@@@").is_err());
    }

    #[test]
    fn test_html_contains_details_and_escapes_metadata() {
        let html = compose_html(&MailDetails {
            date: "18.10.2026 г.",
            time: "14:05:09 ч.",
            file_name: "a.pdf",
            file_size_kb: "1.50",
            metadata: Some("<b>x</b>"),
            sent_at: "18.10.2026 г., 14:05:09 ч.",
        });
        assert!(html.contains("18.10.2026 г."));
        assert!(html.contains("a.pdf"));
        assert!(html.contains("1.50 KB"));
        assert!(html.contains("&lt;b&gt;x&lt;/b&gt;"));

        let bare = compose_html(&MailDetails {
            date: "d",
            time: "t",
            file_name: "f",
            file_size_kb: "0.00",
            metadata: None,
            sent_at: "s",
        });
        assert!(!bare.contains("Допълнителна информация"));
    }

    #[tokio::test]
    async fn test_missing_image_is_validation_error_without_transport() {
        let factory = Arc::new(MockTransportFactory::new());
        let svc = service(&factory);

        for req in [
            EmailDispatchRequest::default(),
            EmailDispatchRequest {
                encoded_image: Some(String::new()),
                ..Default::default()
            },
        ] {
            match svc.dispatch(&req).await {
                EmailDispatchResult::Failed {
                    kind,
                    human_message,
                    ..
                } => {
                    assert_eq!(kind, DispatchErrorKind::ValidationError);
                    assert_eq!(human_message, VALIDATION_MESSAGE);
                }
                other => panic!("unexpected: {:?}", other),
            }
        }
        assert_eq!(factory.open_calls(), 0);
    }

    #[tokio::test]
    async fn test_successful_dispatch() {
        let factory = Arc::new(MockTransportFactory::new());
        let svc = service(&factory);

        let result = svc.dispatch(&request_for(&[7u8; 2048])).await;
        match result {
            EmailDispatchResult::Sent {
                message_id,
                file_name,
                file_size_kb,
            } => {
                assert!(!message_id.is_empty());
                assert!(file_name.starts_with(FILE_NAME_PREFIX));
                assert!(file_name.ends_with(".pdf"));
                assert_eq!(file_size_kb, "2.00");
            }
            other => panic!("unexpected: {:?}", other),
        }

        assert_eq!(factory.open_calls(), 1);
        let sent = factory.sent();
        assert_eq!(sent.len(), 1);
        let mail = &sent[0];
        assert_eq!(mail.to, "scans@example.com");
        assert_eq!(mail.from, "scanner@example.com");
        assert_eq!(mail.attachment.content_type, "application/pdf");
        assert_eq!(mail.attachment.bytes, vec![7u8; 2048]);
        assert!(mail.html.contains("Сканирани 1 документ"));
        assert!(mail.subject.starts_with("📄 Нов сканиран документ - "));
    }

    #[tokio::test]
    async fn test_zero_length_payload() {
        let factory = Arc::new(MockTransportFactory::new());
        let svc = service(&factory);
        let req = EmailDispatchRequest {
            encoded_image: Some("data:image/png;base64,".into()),
            file_name: Some("empty.png".into()),
            metadata: None,
        };
        match svc.dispatch(&req).await {
            EmailDispatchResult::Sent {
                file_name,
                file_size_kb,
                ..
            } => {
                assert_eq!(file_name, "empty.png");
                assert_eq!(file_size_kb, "0.00");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_verify_invalid_login_is_auth_error_and_nothing_sent() {
        let factory = Arc::new(MockTransportFactory::failing_verify(
            "Invalid login: 535 Authentication failed",
        ));
        let svc = service(&factory);
        match svc.dispatch(&request_for(b"abc")).await {
            EmailDispatchResult::Failed {
                kind,
                human_message,
                raw_detail,
            } => {
                assert_eq!(kind, DispatchErrorKind::AuthenticationError);
                assert_eq!(human_message, AUTH_MESSAGE);
                assert!(raw_detail.contains("Invalid login"));
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(factory.open_calls(), 1);
        assert!(factory.sent().is_empty());
    }

    #[tokio::test]
    async fn test_send_refused_is_connectivity_error() {
        let factory = Arc::new(MockTransportFactory::failing_send(
            "connect ECONNREFUSED 127.0.0.1:587",
        ));
        let svc = service(&factory);
        match svc.dispatch(&request_for(b"abc")).await {
            EmailDispatchResult::Failed {
                kind, human_message, ..
            } => {
                assert_eq!(kind, DispatchErrorKind::ConnectivityError);
                assert_eq!(human_message, CONNECTIVITY_MESSAGE);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_payload_is_generic_error() {
        let factory = Arc::new(MockTransportFactory::new());
        let svc = service(&factory);
        let req = EmailDispatchRequest {
            encoded_image: Some("not a data uri".into()),
            ..Default::default()
        };
        match svc.dispatch(&req).await {
            EmailDispatchResult::Failed {
                kind, human_message, ..
            } => {
                assert_eq!(kind, DispatchErrorKind::GenericSendError);
                assert!(human_message.starts_with("Грешка: "));
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert!(factory.sent().is_empty());
    }

    #[tokio::test]
    async fn test_decode_fault_mentioning_535_stays_generic() {
        let factory = Arc::new(MockTransportFactory::new());
        let svc = service(&factory);
        let req = EmailDispatchRequest {
            encoded_image: Some(format!("data:image/png;base64,{}@AAA", "A".repeat(535))),
            ..Default::default()
        };
        match svc.dispatch(&req).await {
            EmailDispatchResult::Failed {
                kind, raw_detail, ..
            } => {
                assert_eq!(kind, DispatchErrorKind::GenericSendError);
                assert!(raw_detail.contains("535"));
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert!(factory.sent().is_empty());
    }

    #[tokio::test]
    async fn test_each_call_opens_fresh_session() {
        let factory = Arc::new(MockTransportFactory::new());
        let svc = service(&factory);
        svc.dispatch(&request_for(b"a")).await;
        svc.dispatch(&request_for(b"b")).await;
        assert_eq!(factory.open_calls(), 2);
        assert_eq!(factory.sent().len(), 2);
    }
}
