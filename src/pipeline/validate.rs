// src/pipeline/validate.rs

use crate::error::Result;
use crate::models::Config;
use crate::services::SourceRegistry;
use crate::utils::log;

/// Validate the configuration and compile every board's selectors.
pub fn run_validate(config: &Config) -> Result<SourceRegistry> {
    log::header("Validating configuration");

    config.validate()?;
    log::success("Config OK");
    log::sub_item(&format!("User agent: {}", config.crawler.user_agent));
    match config.crawler.timeout_secs {
        Some(secs) => log::sub_item(&format!("Timeout: {secs}s")),
        None => log::sub_item("Timeout: none"),
    }
    log::sub_item(&format!("Fetch mode: {:?}", config.crawler.fetch_mode));
    log::sub_item(&format!("Keywords: {}", config.keywords.len()));
    log::sub_item(&format!("Delivery: {:?}", config.delivery.mode));

    let registry = SourceRegistry::from_configs(&config.boards)?;
    log::success(&format!("{} boards compiled", registry.len()));
    for board in registry.boards() {
        log::sub_item(&format!("{} ({})", board.id, board.layout.kind()));
    }

    Ok(registry)
}
