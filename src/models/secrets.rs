// src/models/secrets.rs

//! Credentials read from the environment at startup.

use std::env;
use std::fmt;

use lettre::message::Mailbox;

use crate::error::{AppError, Result};
use crate::models::DeliveryMode;

/// Delivery credentials. Never logged.
#[derive(Clone)]
pub struct Secrets {
    /// Sender mailbox, also the SMTP login
    pub email_sender: String,

    /// Recipient mailbox (defaults to the sender)
    pub email_receiver: String,

    /// SMTP password or app password
    pub email_password: String,

    /// Service account key JSON, required for sheet delivery
    pub google_credentials_json: Option<String>,
}

impl Secrets {
    /// Load secrets from the process environment, reading `.env` first if present.
    pub fn from_env(mode: DeliveryMode) -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(mode, |key| env::var(key).ok())
    }

    /// Load secrets through an arbitrary key lookup.
    pub fn from_lookup<F>(mode: DeliveryMode, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AppError::config(format!("{key} must be set")))
        };

        let email_sender = required("EMAIL_SENDER")?;
        let email_password = required("EMAIL_PASSWORD")?;
        let email_receiver = lookup("EMAIL_RECEIVER")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| email_sender.clone());

        for (key, address) in [
            ("EMAIL_SENDER", &email_sender),
            ("EMAIL_RECEIVER", &email_receiver),
        ] {
            address.parse::<Mailbox>().map_err(|e| {
                AppError::config(format!("{key} is not a valid mail address: {e}"))
            })?;
        }

        let google_credentials_json = match mode {
            DeliveryMode::Sheet => Some(required("GOOGLE_CREDENTIALS_JSON")?),
            DeliveryMode::Csv => lookup("GOOGLE_CREDENTIALS_JSON"),
        };

        Ok(Self {
            email_sender,
            email_receiver,
            email_password,
            google_credentials_json,
        })
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("email_sender", &self.email_sender)
            .field("email_receiver", &self.email_receiver)
            .field("email_password", &"<redacted>")
            .field(
                "google_credentials_json",
                &self.google_credentials_json.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}
