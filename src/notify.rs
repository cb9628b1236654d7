use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Delivers an issued code to its subject (SMS gateway, mailer, ...).
///
/// Invoked by the request layer once `OtpManager::generate` has returned; the
/// outcome never affects the stored code.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, subject: &str, code: &str) -> Result<(), NotifyError>;
}

/// Development notifier that writes the code to the log instead of sending it.
#[derive(Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, subject: &str, code: &str) -> Result<(), NotifyError> {
        info!(
            target: "notifier",
            provider = "log",
            subject = %mask_subject(subject),
            %code,
            "mock sms sent"
        );
        Ok(())
    }
}

/// Mask all but the last four characters, keeping a leading `+`.
pub fn mask_subject(subject: &str) -> String {
    let chars: Vec<char> = subject.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    match chars[0] {
        '+' => format!("+{}{tail}", "*".repeat(chars.len() - 5)),
        _ => format!("{}{tail}", "*".repeat(chars.len() - 4)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_phone_numbers() {
        assert_eq!(mask_subject("+15550001"), "+****0001");
        assert_eq!(mask_subject("1234567890"), "******7890");
        assert_eq!(mask_subject("123"), "***");
        assert_eq!(mask_subject(""), "");
    }

    #[test]
    fn handles_multibyte_subjects() {
        assert_eq!(mask_subject("ünïcödé"), "***cödé");
    }

    #[actix_rt::test]
    async fn log_notifier_never_fails() {
        assert!(LogNotifier.notify("+15550001", "042317").await.is_ok());
    }
}
