//! Application configuration structures.

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::selectors::{BoardConfig, KEYWORD_SLOT};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and fetch behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Search keywords, in search order
    #[serde(default = "defaults::keywords")]
    pub keywords: Vec<String>,

    /// Boards to search, in search order
    #[serde(default = "BoardConfig::defaults")]
    pub boards: Vec<BoardConfig>,

    /// Local export settings
    #[serde(default)]
    pub output: OutputConfig,

    /// How results are delivered
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Hosted spreadsheet settings
    #[serde(default)]
    pub sheet: SheetConfig,

    /// SMTP settings
    #[serde(default)]
    pub email: EmailConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration, using the defaults only when the file does not exist.
    ///
    /// A file that exists but cannot be read or parsed is an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        match Self::load(&path) {
            Err(AppError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                log::warn!("No config at {:?}. Using defaults.", path.as_ref());
                Ok(Self::default())
            }
            result => result,
        }
    }

    /// Validate configuration values for basic sanity.
    ///
    /// Selector syntax is checked when the source registry is built.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == Some(0) {
            return Err(AppError::validation("crawler.timeout_secs must be > 0 when set"));
        }
        if self.keywords.is_empty() {
            return Err(AppError::validation("No keywords defined"));
        }
        if self.keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(AppError::validation("Keywords must not be blank"));
        }
        if self.boards.is_empty() {
            return Err(AppError::validation("No boards defined"));
        }

        let mut seen = HashSet::new();
        for board in &self.boards {
            if !seen.insert(board.id.as_str()) {
                return Err(AppError::validation(format!(
                    "Duplicate board id '{}'",
                    board.id
                )));
            }
            let slots = board.url.matches(KEYWORD_SLOT).count();
            if slots != 1 {
                return Err(AppError::config(format!(
                    "Board '{}' url must contain exactly one {} slot, found {}",
                    board.id, KEYWORD_SLOT, slots
                )));
            }
        }

        if self.delivery.mode == DeliveryMode::Sheet
            && self.sheet.name.trim().is_empty()
            && self.sheet.spreadsheet_id.is_none()
        {
            return Err(AppError::validation(
                "sheet.name or sheet.spreadsheet_id is required for sheet delivery",
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            keywords: defaults::keywords(),
            boards: BoardConfig::defaults(),
            output: OutputConfig::default(),
            delivery: DeliveryConfig::default(),
            sheet: SheetConfig::default(),
            email: EmailConfig::default(),
        }
    }
}

/// Which retrieval strategy fetches board pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    /// Plain HTTP GET
    #[default]
    Direct,
    /// Headless browser navigation
    Rendered,
}

/// What the pipeline does when a page cannot be retrieved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchFailurePolicy {
    /// Log the failure, record zero postings for that search, keep going
    #[default]
    Skip,
    /// Abort the whole run
    Abort,
}

/// HTTP client and fetch behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Optional per-request timeout in seconds; unset means requests never time out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Retrieval strategy
    #[serde(default)]
    pub fetch_mode: FetchMode,

    /// Wait after navigation before reading a rendered page, in milliseconds
    #[serde(default = "defaults::settle_ms")]
    pub settle_ms: u64,

    /// Fetch failure handling
    #[serde(default)]
    pub on_fetch_error: FetchFailurePolicy,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: None,
            fetch_mode: FetchMode::default(),
            settle_ms: defaults::settle_ms(),
            on_fetch_error: FetchFailurePolicy::default(),
        }
    }
}

/// Local export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// CSV file written by the tabular export
    #[serde(default = "defaults::csv_path")]
    pub csv_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: defaults::csv_path(),
        }
    }
}

/// Where scraped records end up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    /// Write the CSV export and mail it as an attachment
    #[default]
    Csv,
    /// Replace the hosted spreadsheet contents and mail a summary
    Sheet,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeliveryConfig {
    #[serde(default)]
    pub mode: DeliveryMode,
}

/// Hosted spreadsheet settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetConfig {
    /// Spreadsheet title, looked up through the Drive API
    #[serde(default = "defaults::sheet_name")]
    pub name: String,

    /// Spreadsheet id; skips the title lookup when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spreadsheet_id: Option<String>,

    #[serde(default = "defaults::sheets_api")]
    pub sheets_api: String,

    #[serde(default = "defaults::drive_api")]
    pub drive_api: String,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            name: defaults::sheet_name(),
            spreadsheet_id: None,
            sheets_api: defaults::sheets_api(),
            drive_api: defaults::drive_api(),
        }
    }
}

/// SMTP settings. Credentials come from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default = "defaults::smtp_host")]
    pub smtp_host: String,

    /// Implicit-TLS port
    #[serde(default = "defaults::smtp_port")]
    pub smtp_port: u16,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: defaults::smtp_host(),
            smtp_port: defaults::smtp_port(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/124.0 Safari/537.36"
            .into()
    }
    pub fn settle_ms() -> u64 {
        3000
    }

    // Search defaults
    pub fn keywords() -> Vec<String> {
        [
            "Multimedia Producer",
            "Producer",
            "Video Producer",
            "Content Creator",
            "Editor",
            "Graphic Designer",
            "Art Director",
            "Creative Director",
            "Video Editing",
            "Webinar Production",
            "Podcast Editing",
            "Event Planning",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    // Delivery defaults
    pub fn csv_path() -> PathBuf {
        PathBuf::from("job_listings.csv")
    }
    pub fn sheet_name() -> String {
        "Job Tracker".into()
    }
    pub fn sheets_api() -> String {
        "https://sheets.googleapis.com".into()
    }
    pub fn drive_api() -> String {
        "https://www.googleapis.com".into()
    }
    pub fn smtp_host() -> String {
        "smtp.gmail.com".into()
    }
    pub fn smtp_port() -> u16 {
        465
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.boards.len(), 3);
        assert_eq!(config.keywords.len(), 12);
    }

    #[test]
    fn malformed_board_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
            keywords = ["Editor"]

            [[boards]]
            id = "broken"
            name = "Broken"
            url = "https://broken.test/jobs?q={keyword}"
            "#,
        )
        .unwrap();

        assert!(matches!(
            Config::load_or_default(&path),
            Err(AppError::Toml(_))
        ));
    }

    #[test]
    fn timeout_unset_by_default() {
        let config = Config::default();
        assert_eq!(config.crawler.timeout_secs, None);

        let config: Config = toml::from_str("[crawler]\ntimeout_secs = 45").unwrap();
        assert_eq!(config.crawler.timeout_secs, Some(45));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.crawler.timeout_secs = Some(0);
        assert!(matches!(config.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.crawler.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_template_without_slot() {
        let mut config = Config::default();
        config.boards[0].url = "https://example.com/jobs".to_string();
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn validate_rejects_template_with_two_slots() {
        let mut config = Config::default();
        config.boards[0].url = "https://example.com/{keyword}/{keyword}".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_duplicate_board_ids() {
        let mut config = Config::default();
        let first = config.boards[0].clone();
        config.boards.push(first);
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_keywords() {
        let mut config = Config::default();
        config.keywords.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            keywords = ["Editor"]

            [crawler]
            fetch_mode = "rendered"
            on_fetch_error = "abort"

            [delivery]
            mode = "sheet"
            "#,
        )
        .unwrap();

        assert_eq!(config.keywords, vec!["Editor".to_string()]);
        assert_eq!(config.crawler.fetch_mode, FetchMode::Rendered);
        assert_eq!(config.crawler.on_fetch_error, FetchFailurePolicy::Abort);
        assert_eq!(config.crawler.settle_ms, 3000);
        assert_eq!(config.delivery.mode, DeliveryMode::Sheet);
        assert_eq!(config.boards.len(), 3);
        assert_eq!(config.output.csv_path, PathBuf::from("job_listings.csv"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn bundled_config_matches_defaults() {
        let config: Config = toml::from_str(include_str!("../../config.toml")).unwrap();
        let defaults = Config::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.keywords, defaults.keywords);
        assert_eq!(config.boards.len(), defaults.boards.len());
        for (ours, theirs) in config.boards.iter().zip(&defaults.boards) {
            assert_eq!(ours.id, theirs.id);
            assert_eq!(ours.url, theirs.url);
            assert_eq!(ours.layout, theirs.layout);
            assert_eq!(ours.fields.link, theirs.fields.link);
            assert_eq!(ours.location_default, theirs.location_default);
        }
    }
}
