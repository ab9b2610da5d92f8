// src/services/parsers.rs

//! Board parsers, one per page layout.
//!
//! Parsers are pure: they read a parsed document and return records in
//! document order. Every listing container yields exactly one record, even
//! when none of its fields can be read.

use scraper::{Html, Selector};

use crate::error::Result;
use crate::models::JobRecord;
use crate::services::extract::{ListingFields, parse_selector};

/// Extracts job records from a board's result page.
pub trait BoardParser: Send + Sync {
    fn parse(&self, document: &Html, keyword: &str, board_id: &str) -> Vec<JobRecord>;
}

/// Listings are repeated card elements.
#[derive(Debug)]
pub struct CardListParser {
    card: Selector,
    fields: ListingFields,
}

impl CardListParser {
    pub fn new(card: &str, fields: ListingFields) -> Result<Self> {
        Ok(Self {
            card: parse_selector(card)?,
            fields,
        })
    }
}

impl BoardParser for CardListParser {
    fn parse(&self, document: &Html, keyword: &str, board_id: &str) -> Vec<JobRecord> {
        document
            .select(&self.card)
            .map(|card| self.fields.extract(&card, keyword, board_id))
            .collect()
    }
}

/// Listings are items grouped under section elements.
#[derive(Debug)]
pub struct SectionListParser {
    section: Selector,
    item: Selector,
    fields: ListingFields,
}

impl SectionListParser {
    pub fn new(section: &str, item: &str, fields: ListingFields) -> Result<Self> {
        Ok(Self {
            section: parse_selector(section)?,
            item: parse_selector(item)?,
            fields,
        })
    }
}

impl BoardParser for SectionListParser {
    fn parse(&self, document: &Html, keyword: &str, board_id: &str) -> Vec<JobRecord> {
        let mut records = Vec::new();
        for section in document.select(&self.section) {
            for item in section.select(&self.item) {
                records.push(self.fields.extract(&item, keyword, board_id));
            }
        }
        records
    }
}

/// Listings are table rows.
#[derive(Debug)]
pub struct TableRowParser {
    row: Selector,
    fields: ListingFields,
}

impl TableRowParser {
    pub fn new(row: &str, fields: ListingFields) -> Result<Self> {
        Ok(Self {
            row: parse_selector(row)?,
            fields,
        })
    }
}

impl BoardParser for TableRowParser {
    fn parse(&self, document: &Html, keyword: &str, board_id: &str) -> Vec<JobRecord> {
        document
            .select(&self.row)
            .map(|row| self.fields.extract(&row, keyword, board_id))
            .collect()
    }
}
