use crate::models::config::EmailConfig;
use crate::models::config_validator::parse_mailbox;
use crate::models::error::{BackupError, Result};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use log::{debug, error, info};

/// Sends the end-of-run report.
pub trait Notifier {
    /// Submit one message, reporting exactly what went wrong.
    fn deliver(&self, subject: &str, body: &str) -> Result<()>;

    /// Submit one message. Failures are logged and turned into `false`; they never
    /// reach the caller.
    fn send(&self, subject: &str, body: &str) -> bool {
        match self.deliver(subject, body) {
            Ok(()) => {
                info!("Notification email sent: {}", subject);
                true
            }
            Err(e) => {
                error!("Failed to send notification email: {}", e);
                false
            }
        }
    }
}

/// Plain-text mail over implicit TLS (SMTPS) with LOGIN/PLAIN credentials.
pub struct SmtpNotifier {
    config: EmailConfig,
}

impl SmtpNotifier {
    pub fn new(config: EmailConfig) -> Self {
        SmtpNotifier { config }
    }

    fn build_message(&self, subject: &str, body: &str) -> Result<Message> {
        let from = parse_mailbox(&self.config.sender)?;
        let to = parse_mailbox(&self.config.receiver)?;

        Ok(Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?)
    }

    fn smtp_error(&self, cause: lettre::transport::smtp::Error) -> BackupError {
        BackupError::Smtp {
            host: format!("{}:{}", self.config.smtp_host, self.config.smtp_port),
            cause,
        }
    }
}

impl Notifier for SmtpNotifier {
    fn deliver(&self, subject: &str, body: &str) -> Result<()> {
        let message = self.build_message(subject, body)?;

        // Log in with the bare address even when the sender carries a display name
        let username = parse_mailbox(&self.config.sender)?.email.to_string();
        let password = self.config.password.expose().unwrap_or_default().to_string();

        let mailer = SmtpTransport::relay(&self.config.smtp_host)
            .map_err(|cause| self.smtp_error(cause))?
            .port(self.config.smtp_port)
            .credentials(Credentials::new(username, password))
            .build();

        debug!(
            "Submitting '{}' to {}:{}",
            subject, self.config.smtp_host, self.config.smtp_port
        );
        mailer.send(&message).map_err(|cause| self.smtp_error(cause))?;

        Ok(())
    }
}

#[cfg(test)]
pub mod test_support {
    use super::*;
    use std::cell::RefCell;

    /// Keeps every message instead of sending it.
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub sent: RefCell<Vec<(String, String)>>,
    }

    impl Notifier for RecordingNotifier {
        fn deliver(&self, subject: &str, body: &str) -> Result<()> {
            self.sent
                .borrow_mut()
                .push((subject.to_string(), body.to_string()));
            Ok(())
        }
    }

    /// Submits to a local port nobody listens on, so every attempt ends in a real
    /// SMTP transport error.
    #[derive(Default)]
    pub struct FailingNotifier {
        pub attempts: RefCell<usize>,
    }

    impl Notifier for FailingNotifier {
        fn deliver(&self, subject: &str, body: &str) -> Result<()> {
            *self.attempts.borrow_mut() += 1;

            let message = Message::builder()
                .from(parse_mailbox("backup@example.com")?)
                .to(parse_mailbox("admin@example.com")?)
                .subject(subject)
                .body(body.to_string())?;
            SmtpTransport::builder_dangerous("127.0.0.1")
                .port(1)
                .build()
                .send(&message)
                .map_err(|cause| BackupError::Smtp {
                    host: "127.0.0.1:1".to_string(),
                    cause,
                })?;
            Ok(())
        }
    }
}
