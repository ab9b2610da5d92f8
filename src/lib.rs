// src/lib.rs

//! Job Scout Library
//!
//! Searches job boards for a list of keywords, normalizes every posting into a
//! [`models::JobRecord`] and delivers the result as CSV or to a hosted
//! spreadsheet.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod sinks;
pub mod utils;
