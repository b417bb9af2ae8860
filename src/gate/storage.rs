//! Session-scoped key/value storage for the page load.

use std::collections::BTreeMap;

/// Marker written after a successful verification. It is a hint only: every
/// page load runs the full gate regardless of its presence.
pub const VERIFIED_MARKER_KEY: &str = "authVerified";
pub const VERIFIED_MARKER_VALUE: &str = "true";

pub trait SessionStore {
    fn set_item(&mut self, key: &str, value: &str);
    fn get_item(&self, key: &str) -> Option<String>;
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    items: BTreeMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> impl Iterator<Item = (&str, &str)> {
        self.items
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

impl SessionStore for MemoryStore {
    fn set_item(&mut self, key: &str, value: &str) {
        self.items.insert(key.to_string(), value.to_string());
    }

    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_overwrites() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get_item(VERIFIED_MARKER_KEY), None);

        store.set_item(VERIFIED_MARKER_KEY, "false");
        store.set_item(VERIFIED_MARKER_KEY, VERIFIED_MARKER_VALUE);

        assert_eq!(store.get_item(VERIFIED_MARKER_KEY), Some("true".to_string()));
        assert_eq!(store.items().count(), 1);
    }
}
