// src/sinks/email.rs

//! Completion mail.

use chrono::NaiveDate;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::error::{AppError, Result};
use crate::models::{EmailConfig, Secrets};

const IMPLICIT_TLS_PORT: u16 = 465;

/// A plain-text mail with an optional file attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
    /// File name and bytes
    pub attachment: Option<(String, Vec<u8>)>,
}

impl Notification {
    /// CSV delivery: the export travels as an attachment.
    pub fn results(date: NaiveDate, file_name: impl Into<String>, csv: Vec<u8>) -> Self {
        Self {
            subject: format!("Job Scraper Results - {}", date.format("%Y-%m-%d")),
            body: "Attached is the latest list of job opportunities.".to_string(),
            attachment: Some((file_name.into(), csv)),
        }
    }

    /// Sheet delivery: only a count.
    pub fn summary(date: NaiveDate, count: usize, sheet_name: &str) -> Self {
        Self {
            subject: format!("Job Scraper Summary - {}", date.format("%Y-%m-%d")),
            body: format!("{count} new jobs have been added to your {sheet_name} sheet."),
            attachment: None,
        }
    }

    pub fn to_message(&self, from: Mailbox, to: Mailbox) -> Result<Message> {
        let builder = Message::builder().from(from).to(to).subject(&self.subject);

        let message = match &self.attachment {
            Some((file_name, bytes)) => {
                let content_type =
                    ContentType::parse("application/octet-stream").map_err(AppError::mail)?;
                let attachment = Attachment::new(file_name.clone()).body(bytes.clone(), content_type);
                builder.multipart(
                    MultiPart::mixed()
                        .singlepart(SinglePart::plain(self.body.clone()))
                        .singlepart(attachment),
                )?
            }
            None => builder
                .header(ContentType::TEXT_PLAIN)
                .body(self.body.clone())?,
        };

        Ok(message)
    }
}

/// Authenticated SMTP sender.
pub struct Notifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl Notifier {
    pub fn new(config: &EmailConfig, secrets: &Secrets) -> Result<Self> {
        let builder = if config.smtp_port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
        };

        let transport = builder
            .port(config.smtp_port)
            .credentials(Credentials::new(
                secrets.email_sender.clone(),
                secrets.email_password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from: secrets.email_sender.parse()?,
            to: secrets.email_receiver.parse()?,
        })
    }

    pub async fn send(&self, notification: &Notification) -> Result<()> {
        let message = notification.to_message(self.from.clone(), self.to.clone())?;
        self.transport.send(message).await?;
        log::info!("Notification sent to {}", self.to);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
    }

    fn mailboxes() -> (Mailbox, Mailbox) {
        (
            "scout@example.com".parse().unwrap(),
            "me@example.com".parse().unwrap(),
        )
    }

    #[test]
    fn test_results_mail_carries_attachment() {
        let note = Notification::results(date(), "job_listings.csv", b"Organization\r\n".to_vec());
        assert_eq!(note.subject, "Job Scraper Results - 2024-03-07");

        let (from, to) = mailboxes();
        let raw = String::from_utf8(note.to_message(from, to).unwrap().formatted()).unwrap();
        assert!(raw.contains("Subject: Job Scraper Results - 2024-03-07"));
        assert!(raw.contains("multipart/mixed"));
        assert!(raw.contains("job_listings.csv"));
        assert!(raw.contains("application/octet-stream"));
        assert!(raw.contains("Attached is the latest list of job opportunities."));
    }

    #[test]
    fn test_summary_mail_is_plain_text() {
        let note = Notification::summary(date(), 42, "Job Tracker");
        assert_eq!(note.subject, "Job Scraper Summary - 2024-03-07");
        assert_eq!(
            note.body,
            "42 new jobs have been added to your Job Tracker sheet."
        );

        let (from, to) = mailboxes();
        let raw = String::from_utf8(note.to_message(from, to).unwrap().formatted()).unwrap();
        assert!(raw.contains("To: me@example.com"));
        assert!(!raw.contains("multipart"));
    }

    #[test]
    fn test_bad_sender_address_is_mail_error() {
        let secrets = Secrets {
            email_sender: "not an address".to_string(),
            email_receiver: "me@example.com".to_string(),
            email_password: "pw".to_string(),
            google_credentials_json: None,
        };
        let result = Notifier::new(&EmailConfig::default(), &secrets);
        assert!(matches!(result, Err(AppError::Mail(_))));
    }
}
