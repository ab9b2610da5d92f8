// src/models/selectors.rs

//! Board definitions and the CSS selectors used to read them.

use serde::{Deserialize, Serialize};

use crate::models::record::UNKNOWN;

/// Slot in a board URL template that receives the escaped keyword.
pub const KEYWORD_SLOT: &str = "{keyword}";

/// A job board as configured: where to search and how to read the results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Board identifier, copied into every record it produces
    pub id: String,

    /// Board display name
    pub name: String,

    /// Search URL template containing exactly one `{keyword}` slot
    pub url: String,

    /// Page structure the listings are arranged in
    pub layout: BoardLayout,

    /// Per-listing field selectors
    #[serde(default)]
    pub fields: FieldSelectors,

    /// Location used when a listing has none (e.g. "Remote")
    #[serde(default = "default_location")]
    pub location_default: String,
}

/// How listings are arranged on a board's result page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoardLayout {
    /// Repeated card elements
    CardList { card: String },

    /// Sections, each holding repeated items
    SectionList { section: String, item: String },

    /// Table rows
    TableRows { row: String },
}

impl BoardLayout {
    pub fn kind(&self) -> &'static str {
        match self {
            BoardLayout::CardList { .. } => "card_list",
            BoardLayout::SectionList { .. } => "section_list",
            BoardLayout::TableRows { .. } => "table_rows",
        }
    }
}

/// CSS selectors for the fields of one listing, relative to the listing element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSelectors {
    /// Selector for the posting title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Selector for the hiring organization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,

    /// Selector for the location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Selector for an element whose text states remote/on-site
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_site: Option<String>,

    /// Selector for the link to the posting detail page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    /// HTML attribute holding the link (usually "href")
    #[serde(default = "default_attr_name")]
    pub attr_name: String,
}

fn default_attr_name() -> String {
    "href".to_string()
}

fn default_location() -> String {
    UNKNOWN.to_string()
}

impl Default for FieldSelectors {
    fn default() -> Self {
        Self {
            title: None,
            organization: None,
            location: None,
            on_site: None,
            link: None,
            attr_name: default_attr_name(),
        }
    }
}

impl FieldSelectors {
    /// Create selectors for the three core fields.
    pub fn new(
        title: impl Into<String>,
        organization: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            title: Some(title.into()),
            organization: Some(organization.into()),
            location: Some(location.into()),
            on_site: None,
            link: None,
            attr_name: default_attr_name(),
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn without_location(mut self) -> Self {
        self.location = None;
        self
    }
}

impl BoardConfig {
    /// Built-in boards, in search order.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self {
                id: "indeed".to_string(),
                name: "Indeed".to_string(),
                url: "https://www.indeed.com/jobs?q={keyword}&l=remote".to_string(),
                layout: BoardLayout::CardList {
                    card: "div.job_seen_beacon".to_string(),
                },
                fields: FieldSelectors::new(
                    "h2",
                    "span.companyName, [data-testid='company-name']",
                    "div.companyLocation, [data-testid='text-location']",
                ),
                location_default: default_location(),
            },
            Self {
                id: "weworkremotely".to_string(),
                name: "We Work Remotely".to_string(),
                url: "https://weworkremotely.com/remote-jobs/search?term={keyword}".to_string(),
                layout: BoardLayout::SectionList {
                    section: "section.jobs".to_string(),
                    item: "li:not(.view-all)".to_string(),
                },
                fields: FieldSelectors::new("span.title", "span.company", "span.region")
                    .with_link("a[href^='/remote-jobs/']"),
                location_default: "Remote".to_string(),
            },
            Self {
                id: "remoteok".to_string(),
                name: "Remote OK".to_string(),
                url: "https://remoteok.com/remote-jobs?search={keyword}".to_string(),
                layout: BoardLayout::TableRows {
                    row: "tr.job".to_string(),
                },
                fields: FieldSelectors::new("h2", "h3", "div.location")
                    .with_link("a.preventLink"),
                location_default: "Remote".to_string(),
            },
        ]
    }
}
