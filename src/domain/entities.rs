//! Domain entities. Pure data structures for the core business.
//!
//! No SMTP/HTTP types here — adapters map to and from these.

use crate::domain::DomainError;
use serde::{Deserialize, Serialize};

/// Prefix shared by every synthesized attachment name.
pub const FILE_NAME_PREFIX: &str = "Сканиран_документ_";

/// One captured page, held as a self-describing data URI (`data:<mime>;base64,<payload>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapturedImage(String);

impl CapturedImage {
    /// Wrap an existing data URI. Rejects strings without the `data:` scheme or the `,` separator.
    pub fn from_data_uri(data_uri: impl Into<String>) -> Result<Self, DomainError> {
        let data_uri = data_uri.into();
        if !data_uri.starts_with("data:") || !data_uri.contains(',') {
            return Err(DomainError::Capture(
                "image is not a data URI (expected data:<mime>;base64,<payload>)".into(),
            ));
        }
        Ok(Self(data_uri))
    }

    /// Encode raw bytes of the given mime type into a data URI.
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        use base64::Engine as _;
        let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
        Self(format!("data:{};base64,{}", mime_type, payload))
    }

    pub fn as_data_uri(&self) -> &str {
        &self.0
    }

    /// Mime type between `data:` and the first `;` or `,`.
    pub fn mime_type(&self) -> &str {
        let header = self.0.split(',').next().unwrap_or_default();
        let header = header.strip_prefix("data:").unwrap_or(header);
        header.split(';').next().unwrap_or_default()
    }

    /// Base64 payload after the separator.
    pub fn payload(&self) -> &str {
        self.0.split_once(',').map(|(_, p)| p).unwrap_or_default()
    }

    /// File extension matching the mime type; `bin` when unknown.
    pub fn extension(&self) -> &'static str {
        match self.mime_type() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/png" => "png",
            "image/webp" => "webp",
            "image/gif" => "gif",
            "image/svg+xml" => "svg",
            "application/pdf" => "pdf",
            _ => "bin",
        }
    }
}

/// Position in the linear capture pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Welcome,
    Capture,
    Process,
    Complete,
}

/// Images handed back by the processing strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessedImages(pub Vec<CapturedImage>);

/// Payload for one dispatch call. Wire names follow the public HTTP contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailDispatchRequest {
    #[serde(rename = "pdfData", default, deserialize_with = "falsy_as_none")]
    pub encoded_image: Option<String>,
    #[serde(rename = "fileName", default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
}

/// `null`, `false`, `0` and `""` all mean "no image"; any other non-string is rejected.
fn falsy_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error as _;
    use serde_json::Value;

    match Value::deserialize(deserializer)? {
        Value::Null | Value::Bool(false) => Ok(None),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) if n.as_f64() == Some(0.0) => Ok(None),
        other => Err(D::Error::custom(format!(
            "pdfData must be a data URI string, got {}",
            other
        ))),
    }
}

impl EmailDispatchRequest {
    /// Build the request the workflow sends: first image only, count as metadata text.
    pub fn for_images(images: &[CapturedImage], millis: i64) -> Option<Self> {
        let first = images.first()?;
        Some(Self {
            encoded_image: Some(first.as_data_uri().to_string()),
            file_name: Some(format!("{}{}.{}", FILE_NAME_PREFIX, millis, first.extension())),
            metadata: Some(capture_count_text(images.len())),
        })
    }
}

/// Human-readable capture count, e.g. "Сканирани 3 документа".
pub fn capture_count_text(count: usize) -> String {
    let suffix = if count > 1 { "а" } else { "" };
    format!("Сканирани {} документ{}", count, suffix)
}

/// Failure classes reported by the dispatch service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchErrorKind {
    ValidationError,
    AuthenticationError,
    ConnectivityError,
    GenericSendError,
}

/// Outcome of one dispatch call on the service side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailDispatchResult {
    Sent {
        message_id: String,
        file_name: String,
        /// Two-decimal kilobyte figure, e.g. "12.34".
        file_size_kb: String,
    },
    Failed {
        kind: DispatchErrorKind,
        human_message: String,
        raw_detail: String,
    },
}

/// What the client learns from a dispatch call. Error kind is not visible here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Sent {
        message_id: String,
        file_name: String,
        file_size: String,
    },
    Rejected { error: String },
}

/// Message surfaced to the user after an operation resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Failure(String),
}

/// SMTP relay settings, read fresh for every dispatch.
#[derive(Clone, PartialEq, Eq)]
pub struct MailSettings {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub from: String,
    pub to: String,
}

impl MailSettings {
    /// Port 465 means implicit TLS; everything else upgrades with STARTTLS.
    pub fn secure(&self) -> bool {
        self.port == 465
    }
}

impl std::fmt::Debug for MailSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("from", &self.from)
            .field("to", &self.to)
            .finish()
    }
}

/// The single attachment of an outgoing mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailAttachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Transport-neutral composed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: String,
    pub from_name: String,
    pub to: String,
    pub subject: String,
    pub html: String,
    pub attachment: MailAttachment,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri_parts() {
        let img = CapturedImage::from_data_uri("data:image/png;base64,AAEC").unwrap();
        assert_eq!(img.mime_type(), "image/png");
        assert_eq!(img.payload(), "AAEC");
        assert_eq!(img.extension(), "png");
    }

    #[test]
    fn test_rejects_non_data_uri() {
        assert!(CapturedImage::from_data_uri("hello").is_err());
        assert!(CapturedImage::from_data_uri("data:image/png;base64").is_err());
    }

    #[test]
    fn test_from_bytes_round_trip_header() {
        let img = CapturedImage::from_bytes("image/jpeg", b"abc");
        assert_eq!(img.as_data_uri(), "data:image/jpeg;base64,YWJj");
        assert_eq!(img.extension(), "jpg");
    }

    #[test]
    fn test_request_uses_first_image_only() {
        let images = vec![
            CapturedImage::from_bytes("image/png", b"first"),
            CapturedImage::from_bytes("image/png", b"second"),
            CapturedImage::from_bytes("image/png", b"third"),
        ];
        let req = EmailDispatchRequest::for_images(&images, 1700000000000).unwrap();
        assert_eq!(req.encoded_image.as_deref(), Some(images[0].as_data_uri()));
        assert_eq!(
            req.file_name.as_deref(),
            Some("Сканиран_документ_1700000000000.png")
        );
        assert_eq!(req.metadata.as_deref(), Some("Сканирани 3 документа"));
    }

    #[test]
    fn test_request_none_without_images() {
        assert!(EmailDispatchRequest::for_images(&[], 0).is_none());
    }

    #[test]
    fn test_count_text_singular() {
        assert_eq!(capture_count_text(1), "Сканирани 1 документ");
    }

    #[test]
    fn test_request_wire_names() {
        let req: EmailDispatchRequest =
            serde_json::from_str(r#"{"pdfData":"data:x;base64,AA","fileName":"a.pdf"}"#).unwrap();
        assert_eq!(req.encoded_image.as_deref(), Some("data:x;base64,AA"));
        assert_eq!(req.file_name.as_deref(), Some("a.pdf"));
        assert!(req.metadata.is_none());

        let missing: EmailDispatchRequest = serde_json::from_str("{}").unwrap();
        assert!(missing.encoded_image.is_none());
    }

    #[test]
    fn test_falsy_pdf_data_reads_as_missing() {
        for body in [
            r#"{"pdfData":null}"#,
            r#"{"pdfData":false}"#,
            r#"{"pdfData":0}"#,
            r#"{"pdfData":""}"#,
        ] {
            let req: EmailDispatchRequest = serde_json::from_str(body).unwrap();
            assert!(req.encoded_image.is_none(), "{}", body);
        }
        assert!(serde_json::from_str::<EmailDispatchRequest>(r#"{"pdfData":true}"#).is_err());
    }

    #[test]
    fn test_settings_debug_hides_password() {
        let s = MailSettings {
            host: "smtp.example.com".into(),
            port: 465,
            user: Some("u".into()),
            password: Some("secret".into()),
            from: "a@example.com".into(),
            to: "b@example.com".into(),
        };
        assert!(s.secure());
        assert!(!format!("{:?}", s).contains("secret"));
    }
}
