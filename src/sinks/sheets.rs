// src/sinks/sheets.rs

//! Hosted spreadsheet sink (Google Sheets REST API).
//!
//! Delivery is destructive: the first worksheet is cleared, then the header
//! and every record are written in one update.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{COLUMNS, JobRecord, SheetConfig};
use crate::sinks::{DeliveryReceipt, RecordSink};

const SCOPES: &str =
    "https://www.googleapis.com/auth/spreadsheets https://www.googleapis.com/auth/drive.readonly";
const JWT_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";
const TOKEN_LIFETIME_SECS: i64 = 3600;

/// The fields of a service account key file this crate needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            AppError::config(format!(
                "GOOGLE_CREDENTIALS_JSON is not a service account key: {e}"
            ))
        })
    }
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

/// Supplies OAuth bearer tokens for API calls.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self, client: &Client) -> Result<String>;
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Two-legged OAuth with a signed service account assertion.
#[derive(Debug, Clone)]
pub struct ServiceAccount {
    key: ServiceAccountKey,
}

impl ServiceAccount {
    pub fn new(key: ServiceAccountKey) -> Self {
        Self { key }
    }

    fn claims(&self, now: DateTime<Utc>) -> Claims<'_> {
        let iat = now.timestamp();
        Claims {
            iss: &self.key.client_email,
            scope: SCOPES,
            aud: &self.key.token_uri,
            iat,
            exp: iat + TOKEN_LIFETIME_SECS,
        }
    }

    /// RS256-signed JWT assertion.
    pub fn assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())?;
        Ok(encode(&Header::new(Algorithm::RS256), &self.claims(now), &key)?)
    }
}

#[async_trait]
impl TokenSource for ServiceAccount {
    async fn access_token(&self, client: &Client) -> Result<String> {
        let assertion = self.assertion(Utc::now())?;
        let response = client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .await?;
        let token: TokenResponse = check(response).await?.json().await?;
        Ok(token.access_token)
    }
}

#[derive(Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<FileEntry>,
}

#[derive(Deserialize)]
struct FileEntry {
    id: String,
}

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Deserialize)]
struct SheetProperties {
    title: String,
}

/// Replaces the contents of a hosted spreadsheet with the scraped records.
pub struct SheetsSink {
    client: Client,
    config: SheetConfig,
    tokens: Box<dyn TokenSource>,
}

impl SheetsSink {
    pub fn new(client: Client, config: SheetConfig, tokens: impl TokenSource + 'static) -> Self {
        Self {
            client,
            config,
            tokens: Box::new(tokens),
        }
    }

    /// Header row followed by one row per record.
    pub fn rows(records: &[JobRecord]) -> Vec<Vec<String>> {
        let to_strings = |cells: &[&str]| cells.iter().map(|c| c.to_string()).collect::<Vec<_>>();

        std::iter::once(to_strings(&COLUMNS))
            .chain(records.iter().map(|r| to_strings(&r.to_row())))
            .collect()
    }

    async fn spreadsheet_id(&self, token: &str) -> Result<String> {
        if let Some(id) = &self.config.spreadsheet_id {
            return Ok(id.clone());
        }

        let query = drive_query(&self.config.name);
        let url = endpoint(&self.config.drive_api, &["drive", "v3", "files"])?;
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(&[("q", query.as_str()), ("fields", "files(id)")])
            .send()
            .await?;
        let list: FileList = check(response).await?.json().await?;

        list.files
            .into_iter()
            .next()
            .map(|f| f.id)
            .ok_or_else(|| AppError::sheets(format!("Spreadsheet '{}' not found", self.config.name)))
    }

    async fn first_sheet_title(&self, token: &str, id: &str) -> Result<String> {
        let url = endpoint(&self.config.sheets_api, &["v4", "spreadsheets", id])?;
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(&[("fields", "sheets.properties.title")])
            .send()
            .await?;
        let meta: SpreadsheetMeta = check(response).await?.json().await?;

        meta.sheets
            .into_iter()
            .next()
            .map(|s| s.properties.title)
            .ok_or_else(|| AppError::sheets(format!("Spreadsheet {id} has no worksheets")))
    }
}

#[async_trait]
impl RecordSink for SheetsSink {
    async fn deliver(&self, records: &[JobRecord]) -> Result<DeliveryReceipt> {
        let token = self.tokens.access_token(&self.client).await?;
        let id = self.spreadsheet_id(&token).await?;
        let range = quote_sheet(&self.first_sheet_title(&token, &id).await?);

        let clear_url = endpoint(
            &self.config.sheets_api,
            &["v4", "spreadsheets", &id, "values", &format!("{range}:clear")],
        )?;
        let response = self
            .client
            .post(clear_url)
            .bearer_auth(&token)
            .json(&json!({}))
            .send()
            .await?;
        check(response).await?;
        log::debug!("Cleared {} in spreadsheet {}", range, id);

        let update_url = endpoint(
            &self.config.sheets_api,
            &["v4", "spreadsheets", &id, "values", &range],
        )?;
        let response = self
            .client
            .put(update_url)
            .bearer_auth(&token)
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({
                "range": range,
                "majorDimension": "ROWS",
                "values": Self::rows(records),
            }))
            .send()
            .await?;
        check(response).await?;

        Ok(DeliveryReceipt::new(records.len(), id))
    }
}

/// Drive search for a live spreadsheet with exactly this title.
fn drive_query(name: &str) -> String {
    let literal = name.replace('\\', "\\\\").replace('\'', "\\'");
    format!("name = '{literal}' and mimeType = '{SPREADSHEET_MIME}' and trashed = false")
}

/// A1 notation for a whole worksheet.
fn quote_sheet(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

fn endpoint(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| AppError::config(format!("{base} cannot be used as an API base URL")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    Err(AppError::sheets(format!("{url} answered {status}: {body}")))
}
