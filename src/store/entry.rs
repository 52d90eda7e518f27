use std::time::Instant;

/// A stored value plus the bookkeeping reported through [`Metadata`].
#[derive(Debug, Clone)]
pub(crate) struct Entry<V> {
    value: V,
    metadata: Metadata,
}

/// Observability data tracked for every entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata {
    pub created_at: Instant,
    pub last_accessed: Instant,
    pub last_updated: Instant,
    /// Number of reads served by this entry.
    pub hits: u64,
}

impl<V> Entry<V> {
    pub(crate) fn new(value: V) -> Entry<V> {
        let now = Instant::now();
        Entry {
            value,
            metadata: Metadata {
                created_at: now,
                last_accessed: now,
                last_updated: now,
                hits: 0,
            },
        }
    }

    pub(crate) fn value(&self) -> &V {
        &self.value
    }

    pub(crate) fn into_value(self) -> V {
        self.value
    }

    /// Returns the value, counting the read.
    pub(crate) fn read(&mut self) -> &V {
        self.metadata.last_accessed = Instant::now();
        self.metadata.hits += 1;
        &self.value
    }

    pub(crate) fn update(&mut self, value: V) {
        let now = Instant::now();
        self.value = value;
        self.metadata.last_updated = now;
        self.metadata.last_accessed = now;
    }

    pub(crate) fn metadata(&self) -> Metadata {
        self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_entry() {
        let entry = Entry::new("value");

        let metadata = entry.metadata();
        assert_eq!(metadata.hits, 0);
        assert_eq!(metadata.created_at, metadata.last_accessed);
        assert_eq!(metadata.created_at, metadata.last_updated);
    }

    #[test]
    fn reads_are_counted() {
        let mut entry = Entry::new("value");

        assert_eq!(*entry.read(), "value");
        assert_eq!(*entry.read(), "value");
        assert_eq!(*entry.value(), "value");

        assert_eq!(entry.metadata().hits, 2);
    }

    #[test]
    fn update_replaces_value_and_keeps_creation_time() {
        let mut entry = Entry::new("old");
        let created_at = entry.metadata().created_at;

        entry.update("new");

        assert_eq!(*entry.value(), "new");
        assert_eq!(entry.metadata().created_at, created_at);
        assert!(entry.metadata().last_updated >= created_at);
    }
}
