//! Service layer for the job scraper.
//!
//! This module contains the extraction logic:
//! - Field extraction with sentinels (`extract`)
//! - Board parsers per page layout (`parsers`)
//! - Board registry (`SourceRegistry`)
//! - Page retrieval (`Fetcher`)

pub mod extract;
pub mod fetch;
pub mod parsers;
mod registry;

pub use fetch::{Fetcher, HttpFetcher, RawDocument, create_fetcher};
pub use parsers::BoardParser;
pub use registry::{Board, SourceRegistry};
