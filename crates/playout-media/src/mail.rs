// crates/playout-media/src/mail.rs
//
// SMTP notification sink, gated by the configured minimum severity. Uses
// lettre's blocking transport — this engine has no async runtime, so the
// synctv project's async `AsyncSmtpTransport` usage is adapted to the
// blocking `SmtpTransport` API instead.

use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use playout_core::messenger::{Severity, Sink};

pub struct SmtpMailSink {
    pub from: String,
    pub recipient: String,
    pub subject: String,
    pub min_severity: Severity,
    transport: SmtpTransport,
}

impl SmtpMailSink {
    pub fn new(
        smtp_server: &str,
        smtp_port: u16,
        smtp_user: &str,
        smtp_password: &str,
        recipient: &str,
        subject: &str,
        min_severity: Severity,
    ) -> Result<Self, lettre::transport::smtp::Error> {
        let creds = Credentials::new(smtp_user.to_string(), smtp_password.to_string());
        let transport = SmtpTransport::starttls_relay(smtp_server)?
            .port(smtp_port)
            .credentials(creds)
            .build();
        Ok(Self {
            from: smtp_user.to_string(),
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            min_severity,
            transport,
        })
    }
}

impl Sink for SmtpMailSink {
    fn send(&self, severity: Severity, msg: &str) {
        if severity < self.min_severity {
            return;
        }
        let Ok(email) = Message::builder()
            .from(self.from.parse().unwrap_or_else(|_| "playout@localhost".parse().unwrap()))
            .to(self.recipient.parse().unwrap_or_else(|_| "root@localhost".parse().unwrap()))
            .subject(&self.subject)
            .body(msg.to_string())
        else {
            return;
        };
        let _ = self.transport.send(&email);
    }
}
