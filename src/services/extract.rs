// src/services/extract.rs

//! Per-field extraction with sentinel substitution.
//!
//! Every field a board parser reads goes through [`field_or`]: a missing
//! selector, a selector with no match, or a match with only whitespace all
//! resolve to the caller's sentinel. A miss never drops the listing.

use scraper::{ElementRef, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{FieldSelectors, JobRecord, OnSite, RESPONSIBILITIES_TBD, UNKNOWN};
use crate::utils::{normalize_whitespace, resolve_url};

/// Text of the first match of `selector` inside `scope`, or `sentinel` on a miss.
pub fn field_or(scope: &ElementRef<'_>, selector: Option<&Selector>, sentinel: &str) -> String {
    selector
        .and_then(|sel| scope.select(sel).next())
        .map(|el| normalize_whitespace(&el.text().collect::<String>()))
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| sentinel.to_string())
}

/// Attribute of the first match of `selector` inside `scope`, if any.
pub fn attr_of(scope: &ElementRef<'_>, selector: Option<&Selector>, attr: &str) -> Option<String> {
    selector
        .and_then(|sel| scope.select(sel).next())
        .and_then(|el| el.value().attr(attr))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(String::from)
}

/// Parse a CSS selector, mapping failures to a configuration error.
pub fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

fn parse_optional(s: Option<&String>) -> Result<Option<Selector>> {
    s.map(|s| parse_selector(s)).transpose()
}

/// Compiled field selectors for one board's listings.
#[derive(Debug)]
pub struct ListingFields {
    title: Option<Selector>,
    organization: Option<Selector>,
    location: Option<Selector>,
    on_site: Option<Selector>,
    link: Option<Selector>,
    attr_name: String,
    location_default: String,
    base_url: Option<Url>,
}

impl ListingFields {
    /// Compile the configured selectors. `base_url` resolves relative detail links.
    pub fn compile(
        fields: &FieldSelectors,
        location_default: &str,
        base_url: Option<Url>,
    ) -> Result<Self> {
        Ok(Self {
            title: parse_optional(fields.title.as_ref())?,
            organization: parse_optional(fields.organization.as_ref())?,
            location: parse_optional(fields.location.as_ref())?,
            on_site: parse_optional(fields.on_site.as_ref())?,
            link: parse_optional(fields.link.as_ref())?,
            attr_name: fields.attr_name.clone(),
            location_default: location_default.to_string(),
            base_url,
        })
    }

    /// Build a record from one listing element.
    pub fn extract(&self, listing: &ElementRef<'_>, keyword: &str, board_id: &str) -> JobRecord {
        let on_site = self
            .on_site
            .as_ref()
            .map(|sel| OnSite::classify(&field_or(listing, Some(sel), UNKNOWN)))
            .unwrap_or_default();

        let responsibilities = attr_of(listing, self.link.as_ref(), &self.attr_name)
            .map(|href| match &self.base_url {
                Some(base) => resolve_url(base, &href),
                None => href,
            })
            .unwrap_or_else(|| RESPONSIBILITIES_TBD.to_string());

        JobRecord {
            organization: field_or(listing, self.organization.as_ref(), UNKNOWN),
            title: field_or(listing, self.title.as_ref(), UNKNOWN),
            location: field_or(listing, self.location.as_ref(), &self.location_default),
            on_site,
            responsibilities,
            ..JobRecord::blank(keyword, board_id)
        }
    }
}
