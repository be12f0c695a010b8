//! In-memory backend.
//!
//! Namespaces are `BTreeMap`s behind `Arc`. A read transaction clones the
//! `Arc` of its namespace and walks that snapshot without holding the lock.
//! Writers hold the write lock for the whole transaction and copy a tree
//! only when a reader still holds the old snapshot.

use std::{
    collections::BTreeMap,
    ops::Bound::{Excluded, Included, Unbounded},
    sync::Arc,
};

use parking_lot::RwLock;

use super::{Cursor, Entry, KeyLookup, OrderedStore, StoreCursor, check_batch};
use crate::error::{Error, Result};

type Tree = BTreeMap<Vec<u8>, Vec<u8>>;

/// Volatile ordered store with the same transaction semantics as LMDB.
#[derive(Default)]
pub struct MemoryStore {
    namespaces: RwLock<BTreeMap<String, Arc<Tree>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot(&self, namespace: &str) -> Result<Arc<Tree>> {
        self.namespaces
            .read()
            .get(namespace)
            .cloned()
            .ok_or_else(|| Error::NamespaceNotFound(namespace.to_owned()))
    }
}

impl OrderedStore for MemoryStore {
    fn create_namespace(&self, name: &str) -> Result<()> {
        self.namespaces
            .write()
            .entry(name.to_owned())
            .or_default();
        tracing::debug!("Ensured namespace {name}");
        Ok(())
    }

    fn has_namespace(&self, name: &str) -> Result<bool> {
        Ok(self.namespaces.read().contains_key(name))
    }

    fn put(&self, namespace: &str, key: &[u8], value: &[u8]) -> Result<()> {
        let mut namespaces = self.namespaces.write();
        let tree = namespaces
            .get_mut(namespace)
            .ok_or_else(|| Error::NamespaceNotFound(namespace.to_owned()))?;
        Arc::make_mut(tree).insert(key.to_vec(), value.to_vec());

        tracing::trace!("Put {} bytes into {namespace}", value.len());
        Ok(())
    }

    fn batch_put(&self, namespace: &str, keys: &[Vec<u8>], values: &[Vec<u8>]) -> Result<()> {
        check_batch(keys, values)?;

        let mut namespaces = self.namespaces.write();
        let tree = namespaces
            .get_mut(namespace)
            .ok_or_else(|| Error::NamespaceNotFound(namespace.to_owned()))?;
        let tree = Arc::make_mut(tree);
        for (key, value) in keys.iter().zip(values) {
            tree.insert(key.clone(), value.clone());
        }

        tracing::trace!("Batch put {} entries into {namespace}", keys.len());
        Ok(())
    }

    fn get(&self, namespace: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.snapshot(namespace)?.get(key).cloned())
    }

    fn with_cursor<R, F>(&self, namespace: &str, visit: F) -> Result<R>
    where
        F: FnOnce(&mut dyn StoreCursor) -> Result<R>,
    {
        let tree = self.snapshot(namespace)?;
        let mut cursor = Cursor::new(MemoryLookup { tree });
        visit(&mut cursor)
    }
}

struct MemoryLookup {
    tree: Arc<Tree>,
}

fn entry((key, value): (&Vec<u8>, &Vec<u8>)) -> Entry {
    Entry::new(key, value)
}

impl KeyLookup for MemoryLookup {
    fn first(&self) -> Result<Option<Entry>> {
        Ok(self.tree.iter().next().map(entry))
    }

    fn last(&self) -> Result<Option<Entry>> {
        Ok(self.tree.iter().next_back().map(entry))
    }

    fn at_or_after(&self, key: &[u8]) -> Result<Option<Entry>> {
        let range = (Included(key), Unbounded);
        Ok(self.tree.range::<[u8], _>(range).next().map(entry))
    }

    fn after(&self, key: &[u8]) -> Result<Option<Entry>> {
        let range = (Excluded(key), Unbounded);
        Ok(self.tree.range::<[u8], _>(range).next().map(entry))
    }

    fn before(&self, key: &[u8]) -> Result<Option<Entry>> {
        let range = (Unbounded, Excluded(key));
        Ok(self.tree.range::<[u8], _>(range).next_back().map(entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::conformance;

    #[test]
    fn test_conformance() {
        conformance::run_all(|| ((), MemoryStore::new()));
    }

    #[test]
    fn test_cursor_sees_snapshot() {
        let store = MemoryStore::new();
        store.create_namespace("a").unwrap();
        store.put("a", &[1], b"one").unwrap();

        store
            .with_cursor("a", |cursor| {
                // A write from inside the read transaction lands in a new tree.
                store.put("a", &[2], b"two").unwrap();
                assert_eq!(cursor.first()?.map(|e| e.key), Some(vec![1]));
                assert_eq!(cursor.next()?, None);
                Ok(())
            })
            .unwrap();

        assert_eq!(store.get("a", &[2]).unwrap(), Some(b"two".to_vec()));
    }

    #[test]
    fn test_concurrent_readers_and_writer() {
        let store = Arc::new(MemoryStore::new());
        store.create_namespace("a").unwrap();

        std::thread::scope(|s| {
            let writer = Arc::clone(&store);
            s.spawn(move || {
                for i in 0..=255u8 {
                    writer.put("a", &[i], &[i]).unwrap();
                }
            });

            for _ in 0..4 {
                let reader = Arc::clone(&store);
                s.spawn(move || {
                    let walked = reader
                        .with_cursor("a", |cursor| {
                            let mut keys = Vec::new();
                            let mut next = cursor.first()?;
                            while let Some(entry) = next {
                                keys.push(entry.key[0]);
                                next = cursor.next()?;
                            }
                            Ok(keys)
                        })
                        .unwrap();
                    // Each snapshot is a prefix of the writer's sequence.
                    let expected: Vec<u8> = (0..walked.len()).map(|i| i as u8).collect();
                    assert_eq!(walked, expected);
                });
            }
        });

        assert_eq!(store.get("a", &[255]).unwrap(), Some(vec![255]));
    }
}
