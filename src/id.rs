//! Feature ID Generation
//!
//! ID assignment is the one concurrency-sensitive primitive in the
//! system: construction-layer call sites on different threads must obtain
//! distinct IDs without contending on the model itself. The generator is
//! an injected service rather than a process singleton, so tests can
//! substitute a deterministic sequence.

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

/// Source of globally unique feature IDs.
pub trait IdGenerator: Send + Sync {
    /// Return the next ID; concurrent calls yield pairwise-distinct IDs.
    fn next_id(&self) -> String;
}

/// Lock-free sequential generator backed by an atomic counter.
///
/// Seeding the counter makes the sequence deterministic, which is what
/// tests want; the default starts at 1 with prefix `F`.
#[derive(Debug)]
pub struct CounterIdGenerator {
    prefix: String,
    counter: AtomicU64,
}

impl CounterIdGenerator {
    pub fn new() -> Self {
        Self::starting_at("F", 1)
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self::starting_at(prefix, 1)
    }

    /// Deterministic sequence beginning at `first`.
    pub fn starting_at(prefix: impl Into<String>, first: u64) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(first),
        }
    }
}

impl Default for CounterIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for CounterIdGenerator {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{}{}", self.prefix, n)
    }
}

/// Random v4 UUID generator for IDs that must stay unique across
/// sessions and machines, matching foreign systems that persist UUIDs.
#[derive(Debug, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_counter_sequence_is_deterministic() {
        let ids = CounterIdGenerator::starting_at("S", 10);
        assert_eq!(ids.next_id(), "S10");
        assert_eq!(ids.next_id(), "S11");
    }

    #[test]
    fn test_concurrent_ids_are_distinct() {
        let ids = Arc::new(CounterIdGenerator::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let ids = Arc::clone(&ids);
            handles.push(std::thread::spawn(move || {
                (0..100).map(|_| ids.next_id()).collect::<Vec<_>>()
            }));
        }
        let mut all = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(all.insert(id), "duplicate ID generated");
            }
        }
        assert_eq!(all.len(), 800);
    }

    #[test]
    fn test_uuid_ids_are_distinct() {
        let ids = UuidIdGenerator;
        assert_ne!(ids.next_id(), ids.next_id());
    }
}
