//! Stable node id derivation from display names.

use std::collections::HashMap;

const UNNAMED_PREFIX: &str = "node-unnamed-";

/// Longest slug kept from a name, before the `node-` prefix.
const MAX_SLUG_LEN: usize = 48;

/// Lowercases `name`, collapses every run of non-alphanumeric characters to a
/// single hyphen, trims hyphens, and truncates.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for ch in name.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        } else {
            pending_hyphen = true;
        }
    }
    if slug.len() > MAX_SLUG_LEN {
        slug.truncate(MAX_SLUG_LEN);
    }
    slug.trim_end_matches('-').to_string()
}

/// Session-scoped id allocator.
///
/// The same name always maps to the same id for the allocator's lifetime;
/// empty names draw `node-unnamed-N` from a monotonically increasing counter,
/// which no slug-derived id can produce.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    by_name: HashMap<String, String>,
    fallback: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id for `name`, deriving and caching it on first use.
    pub fn id_for_name(&mut self, name: &str) -> String {
        if let Some(id) = self.by_name.get(name) {
            return id.clone();
        }
        let slug = slugify(name);
        if slug.is_empty() {
            self.fallback += 1;
            return format!("{UNNAMED_PREFIX}{}", self.fallback);
        }
        let mut id = if slug.starts_with("node-") {
            slug
        } else {
            format!("node-{slug}")
        };
        if id.starts_with(UNNAMED_PREFIX) {
            id = format!("node-named-{}", &id["node-".len()..]);
        }
        self.by_name.insert(name.to_string(), id.clone());
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_collapses_runs() {
        assert_eq!(slugify("  Ridge Relay #2 (north)  "), "ridge-relay-2-north");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn slug_is_truncated_without_trailing_hyphen() {
        let name = format!("{}  tail", "a".repeat(MAX_SLUG_LEN - 1));
        let slug = slugify(&name);
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn same_name_same_id() {
        let mut ids = IdAllocator::new();
        let a = ids.id_for_name("Ridge Relay");
        let b = ids.id_for_name("Ridge Relay");
        assert_eq!(a, "node-ridge-relay");
        assert_eq!(a, b);
        assert_eq!(ids.id_for_name("node-7 alpha"), "node-7-alpha");
    }

    #[test]
    fn empty_names_get_increasing_fallbacks() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.id_for_name(""), "node-unnamed-1");
        assert_eq!(ids.id_for_name("!!!"), "node-unnamed-2");
        assert_eq!(ids.id_for_name(""), "node-unnamed-3");
    }

    #[test]
    fn fallback_ids_never_collide_with_names() {
        let mut ids = IdAllocator::new();
        let unnamed = ids.id_for_name("");
        assert_eq!(ids.id_for_name("1"), "node-1");
        assert_ne!(ids.id_for_name("1"), unnamed);
        assert_eq!(ids.id_for_name("Unnamed 1"), "node-named-unnamed-1");
    }
}
