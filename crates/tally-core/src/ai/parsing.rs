//! Response parsing for AI backends

use crate::models::same_category;

/// Match a provider reply against the available categories
///
/// The reply is trimmed and compared case-insensitively. Returns the
/// category as spelled in `categories`, or `None` if the reply names
/// anything else.
pub fn match_category(reply: &str, categories: &[String]) -> Option<String> {
    let reply = reply.trim();
    if reply.is_empty() {
        return None;
    }

    categories
        .iter()
        .find(|c| same_category(c, reply))
        .cloned()
}
