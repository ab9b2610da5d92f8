// src/services/registry.rs

//! Source registry: the ordered set of boards and their parsers.
//!
//! Each board's parser is chosen from its configured layout once, when the
//! registry is built.

use std::collections::HashSet;
use std::fmt;

use scraper::Html;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{BoardConfig, BoardLayout, JobRecord, KEYWORD_SLOT};
use crate::services::extract::ListingFields;
use crate::services::fetch::RawDocument;
use crate::services::parsers::{BoardParser, CardListParser, SectionListParser, TableRowParser};
use crate::utils::url::fill_template;

/// A searchable board with its compiled parser.
pub struct Board {
    pub id: String,
    pub name: String,
    pub url_template: String,
    pub layout: BoardLayout,
    parser: Box<dyn BoardParser>,
}

impl Board {
    /// Compile a board from its configuration.
    pub fn from_config(config: &BoardConfig) -> Result<Self> {
        let slots = config.url.matches(KEYWORD_SLOT).count();
        if slots != 1 {
            return Err(AppError::config(format!(
                "Board '{}' url must contain exactly one {} slot, found {}",
                config.id, KEYWORD_SLOT, slots
            )));
        }

        let base_url = Url::parse(&config.url.replace(KEYWORD_SLOT, "")).ok();
        let fields = ListingFields::compile(&config.fields, &config.location_default, base_url)?;

        let parser: Box<dyn BoardParser> = match &config.layout {
            BoardLayout::CardList { card } => Box::new(CardListParser::new(card, fields)?),
            BoardLayout::SectionList { section, item } => {
                Box::new(SectionListParser::new(section, item, fields)?)
            }
            BoardLayout::TableRows { row } => Box::new(TableRowParser::new(row, fields)?),
        };

        Ok(Self {
            id: config.id.clone(),
            name: config.name.clone(),
            url_template: config.url.clone(),
            layout: config.layout.clone(),
            parser,
        })
    }

    /// Search URL for a keyword.
    pub fn search_url(&self, keyword: &str) -> Result<String> {
        fill_template(&self.url_template, keyword).ok_or_else(|| {
            AppError::config(format!("Board '{}' has a malformed url template", self.id))
        })
    }

    /// Parse a retrieved page into records attributed to this board.
    pub fn parse(&self, raw: &RawDocument, keyword: &str) -> Vec<JobRecord> {
        let document = raw.parse();
        self.parse_document(&document, keyword)
    }

    pub fn parse_document(&self, document: &Html, keyword: &str) -> Vec<JobRecord> {
        self.parser.parse(document, keyword, &self.id)
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("id", &self.id)
            .field("url_template", &self.url_template)
            .field("layout", &self.layout.kind())
            .finish()
    }
}

/// Ordered collection of boards.
#[derive(Debug, Default)]
pub struct SourceRegistry {
    boards: Vec<Board>,
}

impl SourceRegistry {
    /// Build the registry, failing on the first malformed or duplicate board.
    pub fn from_configs(configs: &[BoardConfig]) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut boards = Vec::with_capacity(configs.len());
        for config in configs {
            if !seen.insert(config.id.as_str()) {
                return Err(AppError::config(format!(
                    "Board id '{}' is defined more than once",
                    config.id
                )));
            }
            boards.push(Board::from_config(config)?);
        }
        Ok(Self { boards })
    }

    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    /// Board identifiers in registry order.
    pub fn ids(&self) -> Vec<&str> {
        self.boards.iter().map(|b| b.id.as_str()).collect()
    }

    pub fn get(&self, id: &str) -> Option<&Board> {
        self.boards.iter().find(|b| b.id == id)
    }

    pub fn len(&self) -> usize {
        self.boards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }
}
