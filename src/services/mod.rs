//! Aggregation over already-fetched entity collections.
//!
//! Everything here is pure and synchronous except the dashboard
//! loader, which fans out the three fetches. Pages fetch through the
//! store clients, pass the collections in, and render what comes back.

pub mod dashboard;
pub mod pipeline;
pub mod timeline;

use crate::types::Contact;

/// Case-insensitive substring match. An empty query matches everything.
pub(crate) fn matches_query(haystack: &str, query: &str) -> bool {
    query.is_empty() || haystack.to_lowercase().contains(&query.to_lowercase())
}

/// Contact search over name, email, and company.
pub fn search_contacts(contacts: &[Contact], query: &str) -> Vec<Contact> {
    let query = query.trim();
    contacts
        .iter()
        .filter(|c| {
            matches_query(&c.name, query)
                || matches_query(&c.email, query)
                || matches_query(&c.company, query)
        })
        .cloned()
        .collect()
}
