//! Mail collaborator contract
//!
//! Confirmation codes leave the system through a `Mailer`. Delivery is
//! fire-and-forget from the caller's perspective: a failed send is an
//! operational concern surfaced through logs, never an error returned to
//! the requesting principal.

use crate::error::Result;

/// Explicit mail configuration, passed into the identity code at
/// construction rather than read from ambient globals.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// Sender identity placed on outgoing messages
    pub sender: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            sender: "noreply@yamdb.local".to_string(),
        }
    }
}

/// Outbound notification transport
pub trait Mailer: Send + Sync {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}

/// Development transport: writes the message to the log instead of
/// handing it to an SMTP relay.
#[derive(Debug, Clone)]
pub struct LogMailer {
    config: MailConfig,
}

impl LogMailer {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }
}

impl Mailer for LogMailer {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        tracing::info!(
            from = %self.config.sender,
            to = %to,
            subject = %subject,
            "Outgoing mail: {}",
            body
        );
        Ok(())
    }
}

/// Compose and dispatch a confirmation-code message. Errors from the
/// transport are logged and swallowed here.
pub fn send_confirmation_code(mailer: &dyn Mailer, username: &str, email: &str, code: &str) {
    let subject = "YaMDb confirmation code";
    let body = format!(
        "Hello, {}!\nYour confirmation code for obtaining a YaMDb token:\n{}",
        username, code
    );
    if let Err(e) = mailer.send(email, subject, &body) {
        tracing::error!("Failed to deliver confirmation code to {}: {}", email, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingMailer {
        sent: Mutex<Vec<(String, String, String)>>,
        fail: bool,
    }

    impl Mailer for RecordingMailer {
        fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
            if self.fail {
                return Err(crate::error::Error::Internal("smtp down".to_string()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), subject.to_string(), body.to_string()));
            Ok(())
        }
    }

    #[test]
    fn confirmation_mail_carries_code_and_recipient() {
        let mailer = RecordingMailer {
            sent: Mutex::new(Vec::new()),
            fail: false,
        };
        send_confirmation_code(&mailer, "reader", "reader@example.com", "123456");

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "reader@example.com");
        assert!(sent[0].2.contains("123456"));
        assert!(sent[0].2.contains("reader"));
    }

    #[test]
    fn transport_failure_does_not_panic_or_propagate() {
        let mailer = RecordingMailer {
            sent: Mutex::new(Vec::new()),
            fail: true,
        };
        // Must not return an error to the caller
        send_confirmation_code(&mailer, "reader", "reader@example.com", "123456");
    }
}
