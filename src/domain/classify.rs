//! Map raw transport faults to a `DispatchErrorKind` and the message shown to the user.
//!
//! Only transport faults are matched, by substring on the fault text, so it works
//! the same whether the text came from lettre, a stub transport, or a relay
//! response line. Configuration, decoding and composition faults are always generic.

use crate::domain::{DispatchErrorKind, DomainError, EmailDispatchResult};

pub const VALIDATION_MESSAGE: &str = "PDF данните са задължителни";
pub const AUTH_MESSAGE: &str = "Грешка в SMTP автентикацията. Моля, проверете имейл данните.";
pub const CONNECTIVITY_MESSAGE: &str =
    "Не може да се свърже със SMTP сървъра. Проверете мрежовата връзка.";
pub const SENT_MESSAGE: &str = "Имейлът е изпратен успешно!";

/// Credential rejections: nodemailer-style text and lettre's wording.
const AUTH_MARKERS: &[&str] = &["Invalid login", "authentication failed"];

/// SMTP reply code for rejected credentials.
const AUTH_REPLY_CODE: &str = "535";

/// Refused connections: errno name and the OS message.
const CONNECTIVITY_MARKERS: &[&str] = &["ECONNREFUSED", "Connection refused"];

/// Classify an error raised while dispatching. Only `DomainError::Transport` is
/// inspected for credential or connectivity markers.
pub fn classify_error(error: &DomainError) -> EmailDispatchResult {
    match error {
        DomainError::Transport(raw) => classify_fault(raw),
        other => generic_fault(&other.to_string()),
    }
}

/// Classify a transport fault message raised during setup, verification, or send.
pub fn classify_fault(raw: &str) -> EmailDispatchResult {
    if contains_any(raw, AUTH_MARKERS) || has_auth_reply_code(raw) {
        failure(DispatchErrorKind::AuthenticationError, AUTH_MESSAGE.to_string(), raw)
    } else if contains_any(raw, CONNECTIVITY_MARKERS) {
        failure(
            DispatchErrorKind::ConnectivityError,
            CONNECTIVITY_MESSAGE.to_string(),
            raw,
        )
    } else {
        generic_fault(raw)
    }
}

/// Generic send-time failure with the raw text interpolated.
pub fn generic_fault(raw: &str) -> EmailDispatchResult {
    failure(
        DispatchErrorKind::GenericSendError,
        format!("Грешка: {}", raw),
        raw,
    )
}

fn failure(kind: DispatchErrorKind, human_message: String, raw: &str) -> EmailDispatchResult {
    EmailDispatchResult::Failed {
        kind,
        human_message,
        raw_detail: raw.to_string(),
    }
}

/// 535 in status position: lettre's `(535)` or a `535 `/`535-` reply line.
fn has_auth_reply_code(raw: &str) -> bool {
    raw.contains(&format!("({})", AUTH_REPLY_CODE))
        || raw.lines().any(|line| {
            line.trim_start()
                .strip_prefix(AUTH_REPLY_CODE)
                .is_some_and(|rest| rest.starts_with(' ') || rest.starts_with('-'))
        })
}

/// Result for a request without image data.
pub fn validation_failure() -> EmailDispatchResult {
    failure(
        DispatchErrorKind::ValidationError,
        VALIDATION_MESSAGE.to_string(),
        "pdfData is missing or empty",
    )
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    let lower = haystack.to_lowercase();
    needles.iter().any(|n| lower.contains(&n.to_lowercase()))
}
