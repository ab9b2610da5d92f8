//! Pipeline entry points.
//!
//! - `run_scrape`: Fetch and parse every keyword × board task
//! - `run_delivery`: Hand the records to the configured sink and notify
//! - `run_validate`: Check configuration before any fetch

pub mod deliver;
pub mod scrape;
pub mod validate;

pub use deliver::{completion_message, run_delivery};
pub use scrape::{Pipeline, RunOutcome, run_scrape, run_with_fetcher};
pub use validate::run_validate;
