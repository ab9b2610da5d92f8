// src/utils/url.rs

//! URL manipulation utilities.

use url::form_urlencoded;

use crate::models::KEYWORD_SLOT;

/// Escape a search keyword for embedding in a query string.
///
/// # Examples
/// ```
/// use job_scout::utils::url::escape_keyword;
///
/// assert_eq!(escape_keyword("Video Producer"), "Video+Producer");
/// ```
pub fn escape_keyword(keyword: &str) -> String {
    form_urlencoded::byte_serialize(keyword.as_bytes()).collect()
}

/// Fill the keyword slot of a board URL template.
///
/// Returns `None` unless the template has exactly one slot.
pub fn fill_template(template: &str, keyword: &str) -> Option<String> {
    if template.matches(KEYWORD_SLOT).count() != 1 {
        return None;
    }
    Some(template.replacen(KEYWORD_SLOT, &escape_keyword(keyword), 1))
}
