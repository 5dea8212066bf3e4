//! Report delivery

use crate::{config::SmtpConfig, error::DeliveryError, report::Report};
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    Message, SmtpTransport, Transport,
};

/// Trait for report transports
#[async_trait]
pub trait ReportDelivery: Send + Sync {
    /// Transmits a rendered report
    ///
    /// A failure here means the report was not sent; callers should treat it
    /// as fatal for the run.
    async fn deliver(&self, report: &Report) -> Result<(), DeliveryError>;

    /// Returns the name of this transport
    fn delivery_name(&self) -> &'static str;
}

/// Sends reports as HTML email over an implicit-TLS SMTP relay
pub struct SmtpDelivery {
    config: SmtpConfig,
}

impl SmtpDelivery {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    /// Builds the MIME message for a report
    pub fn build_message(&self, report: &Report) -> Result<Message, DeliveryError> {
        let from = parse_mailbox(&self.config.sender)?;
        let to = parse_mailbox(&self.config.receiver)?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(report.subject.as_str())
            .header(ContentType::TEXT_HTML)
            .body(report.html.clone())
            .map_err(|e| DeliveryError::Message(e.to_string()))
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, DeliveryError> {
    address.parse().map_err(|e: lettre::address::AddressError| DeliveryError::Address {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

#[async_trait]
impl ReportDelivery for SmtpDelivery {
    async fn deliver(&self, report: &Report) -> Result<(), DeliveryError> {
        let message = self.build_message(report)?;
        let config = self.config.clone();

        tracing::info!(
            host = %config.host,
            port = config.port,
            receiver = %config.receiver,
            "Sending report"
        );

        // lettre's SmtpTransport is blocking
        tokio::task::spawn_blocking(move || {
            let transport = SmtpTransport::relay(&config.host)
                .map_err(|e| DeliveryError::Transport(e.to_string()))?
                .port(config.port)
                .credentials(Credentials::new(config.sender, config.password))
                .build();

            transport
                .send(&message)
                .map(|_| ())
                .map_err(|e| DeliveryError::Transport(e.to_string()))
        })
        .await
        .map_err(|e| DeliveryError::Transport(format!("delivery task failed: {}", e)))?
    }

    fn delivery_name(&self) -> &'static str {
        "smtp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(sender: &str) -> SmtpConfig {
        SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 465,
            sender: sender.to_string(),
            password: "secret".to_string(),
            receiver: "reader@example.com".to_string(),
        }
    }

    fn report() -> Report {
        Report {
            subject: "Daily market report".to_string(),
            html: "<html><body>ok</body></html>".to_string(),
        }
    }

    #[test]
    fn test_build_message_headers() {
        let delivery = SmtpDelivery::new(config("bot@example.com"));
        let message = delivery.build_message(&report()).unwrap();
        let raw = String::from_utf8_lossy(&message.formatted()).to_string();

        assert!(raw.contains("From: bot@example.com"));
        assert!(raw.contains("To: reader@example.com"));
        assert!(raw.contains("Subject: Daily market report"));
        assert!(raw.contains("Content-Type: text/html; charset=utf-8"));
    }

    #[test]
    fn test_invalid_sender_is_rejected() {
        let delivery = SmtpDelivery::new(config("not an address"));
        let err = delivery.build_message(&report()).unwrap_err();
        assert!(matches!(err, DeliveryError::Address { ref address, .. } if address == "not an address"));
    }
}
