//! Per-group bookkeeping: duplicate-row suppression and the shared opaque
//! group identifier.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Process-wide source of opaque group identifiers. Every raw group gets a
/// fresh id for the lifetime of the source, even across worker threads;
/// structurally identical groups never share one.
pub struct GroupIdSource {
    salt: u64,
    next: AtomicU64,
}

impl GroupIdSource {
    pub fn new() -> Self {
        let salt = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        GroupIdSource {
            salt,
            next: AtomicU64::new(0),
        }
    }

    pub fn next_id(&self) -> String {
        let seq = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{:x}-{:x}", self.salt, seq)
    }
}

impl Default for GroupIdSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Seen-set for one raw group. Two rows with the same section and class
/// number inside one group are the same section printed twice; the first
/// occurrence wins. The same composite key may recur in other groups.
#[derive(Default)]
pub struct GroupDedup {
    seen: HashSet<String>,
}

impl GroupDedup {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if this composite key has not been seen in the group yet.
    pub fn admit(&mut self, section_number: &str, class_number: &str) -> bool {
        let key = format!("{}|{}", section_number.trim(), class_number.trim());
        self.seen.insert(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_occurrence_wins() {
        let mut dedup = GroupDedup::new();
        assert!(dedup.admit("01", "12345"));
        assert!(!dedup.admit("01", "12345"));
    }

    #[test]
    fn distinct_keys_admitted() {
        let mut dedup = GroupDedup::new();
        assert!(dedup.admit("01", "12345"));
        assert!(dedup.admit("01", "12346"));
        assert!(dedup.admit("02", "12345"));
    }

    #[test]
    fn keys_compared_trimmed() {
        let mut dedup = GroupDedup::new();
        assert!(dedup.admit(" 01 ", "12345"));
        assert!(!dedup.admit("01", " 12345 "));
    }

    #[test]
    fn fresh_group_forgets_prior_keys() {
        let mut first = GroupDedup::new();
        assert!(first.admit("01", "12345"));
        let mut second = GroupDedup::new();
        assert!(second.admit("01", "12345"));
    }

    #[test]
    fn ids_never_repeat() {
        let ids = GroupIdSource::new();
        let a = ids.next_id();
        let b = ids.next_id();
        let c = ids.next_id();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }
}
