//! Message header handling.

use std::collections::HashMap;

/// Collection of message headers as seen during the SMTP transaction.
///
/// Lookups are case-insensitive. Values for a given name keep the order in
/// which they were recorded; that per-name order is what the index argument
/// of header change/insert actions refers to.
#[derive(Debug, Clone, Default)]
pub struct HeaderMap {
    headers: HashMap<String, Vec<String>>,
}

impl HeaderMap {
    /// Creates a new empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a header value, appending to any existing values for the name.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into().to_lowercase();
        self.headers.entry(name).or_default().push(value.into());
    }

    /// Gets the first value for a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_lowercase())
            .and_then(|v| v.first().map(String::as_str))
    }

    /// Gets all values for a header, in recorded order.
    #[must_use]
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.headers
            .get(&name.to_lowercase())
            .map(|v| v.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Gets the value at the given per-name position.
    ///
    /// This is the same index space that header change/insert actions use:
    /// `nth("Received", 2)` is the third header literally named "Received",
    /// independent of where other header names sit in the message.
    #[must_use]
    pub fn nth(&self, name: &str, index: usize) -> Option<&str> {
        self.headers
            .get(&name.to_lowercase())
            .and_then(|v| v.get(index).map(String::as_str))
    }

    /// Returns how many values are recorded for a header name.
    #[must_use]
    pub fn count(&self, name: &str) -> usize {
        self.headers.get(&name.to_lowercase()).map_or(0, Vec::len)
    }

    /// Removes all values for a header.
    pub fn remove(&mut self, name: &str) {
        self.headers.remove(&name.to_lowercase());
    }

    /// Returns an iterator over all `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .flat_map(|(name, values)| values.iter().map(move |v| (name.as_str(), v.as_str())))
    }

    /// Returns the total number of header values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.headers.values().map(Vec::len).sum()
    }

    /// Returns `true` if no headers are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_get() {
        let mut headers = HeaderMap::new();
        headers.add("Subject", "Hello");
        assert_eq!(headers.get("subject"), Some("Hello"));
        assert_eq!(headers.get("SUBJECT"), Some("Hello"));
        assert_eq!(headers.get("From"), None);
    }

    #[test]
    fn test_multiple_values_keep_order() {
        let mut headers = HeaderMap::new();
        headers.add("Received", "from a");
        headers.add("Received", "from b");
        headers.add("Received", "from c");
        assert_eq!(headers.get_all("received"), vec!["from a", "from b", "from c"]);
        assert_eq!(headers.get("Received"), Some("from a"));
    }

    #[test]
    fn test_nth_is_per_name() {
        let mut headers = HeaderMap::new();
        headers.add("Received", "from a");
        headers.add("Subject", "Hello");
        headers.add("Received", "from b");
        headers.add("Received", "from c");
        // Index 2 targets the third "Received" regardless of other names.
        assert_eq!(headers.nth("Received", 2), Some("from c"));
        assert_eq!(headers.nth("Received", 3), None);
        assert_eq!(headers.count("received"), 3);
    }

    #[test]
    fn test_remove() {
        let mut headers = HeaderMap::new();
        headers.add("X-Spam", "yes");
        headers.remove("x-spam");
        assert!(headers.is_empty());
        assert_eq!(headers.count("X-Spam"), 0);
    }

    #[test]
    fn test_len_and_iter() {
        let mut headers = HeaderMap::new();
        headers.add("A", "1");
        headers.add("A", "2");
        headers.add("B", "3");
        assert_eq!(headers.len(), 3);
        assert_eq!(headers.iter().count(), 3);
    }
}
