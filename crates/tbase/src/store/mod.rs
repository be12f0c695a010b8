//! Ordered key-value store abstraction.
//!
//! The engine only needs namespaces, single and batched writes, point reads,
//! and an ordered cursor. Each operation runs in its own transaction.
//!
//! # Cursor Lifetime
//!
//! A cursor borrows its read transaction, so it only exists inside the
//! closure passed to [`OrderedStore::with_cursor`]. Returning it is a
//! compile error.

pub mod lmdb;
pub mod memory;

pub use lmdb::LmdbStore;
pub use memory::MemoryStore;

use crate::error::Result;

/// A key/value pair read through a cursor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl Entry {
    pub(crate) fn new(key: &[u8], value: &[u8]) -> Self {
        Self {
            key: key.to_vec(),
            value: value.to_vec(),
        }
    }
}

/// Bidirectional traversal over one namespace within a read transaction.
///
/// Every move returns the entry at the new position, or `None` once the
/// cursor runs off either end. `next` on an unpositioned cursor behaves
/// like `first`, and `prev` like `last`.
pub trait StoreCursor {
    /// Position at the first key `>= key`.
    fn seek(&mut self, key: &[u8]) -> Result<Option<Entry>>;

    /// Position at the smallest key.
    fn first(&mut self) -> Result<Option<Entry>>;

    /// Position at the largest key.
    fn last(&mut self) -> Result<Option<Entry>>;

    /// Advance to the next larger key.
    fn next(&mut self) -> Result<Option<Entry>>;

    /// Step back to the next smaller key.
    fn prev(&mut self) -> Result<Option<Entry>>;
}

/// An embedded, transactional, ordered key-value store.
///
/// Implementations provide single-writer/multi-reader semantics: writes are
/// serialized and each read transaction sees a consistent snapshot.
pub trait OrderedStore: Send + Sync {
    /// Create a namespace if it does not exist.
    fn create_namespace(&self, name: &str) -> Result<()>;

    /// Whether a namespace exists.
    fn has_namespace(&self, name: &str) -> Result<bool>;

    /// Write one pair in its own transaction.
    ///
    /// # Errors
    /// [`Error::NamespaceNotFound`](crate::Error::NamespaceNotFound) if the
    /// namespace does not exist.
    fn put(&self, namespace: &str, key: &[u8], value: &[u8]) -> Result<()>;

    /// Write all pairs atomically in one transaction.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`](crate::Error::InvalidArgument) when the
    /// slices differ in length, checked before anything is written.
    fn batch_put(&self, namespace: &str, keys: &[Vec<u8>], values: &[Vec<u8>]) -> Result<()>;

    /// Read one value.
    fn get(&self, namespace: &str, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Run `visit` with a cursor over `namespace` inside a read transaction.
    fn with_cursor<R, F>(&self, namespace: &str, visit: F) -> Result<R>
    where
        F: FnOnce(&mut dyn StoreCursor) -> Result<R>;
}

impl<S: OrderedStore> OrderedStore for std::sync::Arc<S> {
    fn create_namespace(&self, name: &str) -> Result<()> {
        (**self).create_namespace(name)
    }

    fn has_namespace(&self, name: &str) -> Result<bool> {
        (**self).has_namespace(name)
    }

    fn put(&self, namespace: &str, key: &[u8], value: &[u8]) -> Result<()> {
        (**self).put(namespace, key, value)
    }

    fn batch_put(&self, namespace: &str, keys: &[Vec<u8>], values: &[Vec<u8>]) -> Result<()> {
        (**self).batch_put(namespace, keys, values)
    }

    fn get(&self, namespace: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        (**self).get(namespace, key)
    }

    fn with_cursor<R, F>(&self, namespace: &str, visit: F) -> Result<R>
    where
        F: FnOnce(&mut dyn StoreCursor) -> Result<R>,
    {
        (**self).with_cursor(namespace, visit)
    }
}

/// Positional lookups a backend answers within one read transaction.
///
/// [`Cursor`] turns these into stateful traversal, so backends only
/// implement stateless queries against their snapshot.
pub(crate) trait KeyLookup {
    fn first(&self) -> Result<Option<Entry>>;
    fn last(&self) -> Result<Option<Entry>>;
    /// Smallest entry with key `>= key`.
    fn at_or_after(&self, key: &[u8]) -> Result<Option<Entry>>;
    /// Smallest entry with key `> key`.
    fn after(&self, key: &[u8]) -> Result<Option<Entry>>;
    /// Largest entry with key `< key`.
    fn before(&self, key: &[u8]) -> Result<Option<Entry>>;
}

#[derive(Debug)]
enum Position {
    Unset,
    At(Vec<u8>),
    BeforeFirst,
    AfterLast,
}

/// Cursor state machine over a [`KeyLookup`].
pub(crate) struct Cursor<L> {
    lookup: L,
    position: Position,
}

impl<L: KeyLookup> Cursor<L> {
    pub(crate) fn new(lookup: L) -> Self {
        Self {
            lookup,
            position: Position::Unset,
        }
    }

    fn settle(&mut self, entry: Option<Entry>, off_end: Position) -> Option<Entry> {
        self.position = match &entry {
            Some(entry) => Position::At(entry.key.clone()),
            None => off_end,
        };
        entry
    }
}

impl<L: KeyLookup> StoreCursor for Cursor<L> {
    fn seek(&mut self, key: &[u8]) -> Result<Option<Entry>> {
        let entry = self.lookup.at_or_after(key)?;
        Ok(self.settle(entry, Position::AfterLast))
    }

    fn first(&mut self) -> Result<Option<Entry>> {
        let entry = self.lookup.first()?;
        Ok(self.settle(entry, Position::AfterLast))
    }

    fn last(&mut self) -> Result<Option<Entry>> {
        let entry = self.lookup.last()?;
        Ok(self.settle(entry, Position::BeforeFirst))
    }

    fn next(&mut self) -> Result<Option<Entry>> {
        let entry = match &self.position {
            Position::Unset | Position::BeforeFirst => self.lookup.first()?,
            Position::At(key) => self.lookup.after(key)?,
            Position::AfterLast => None,
        };
        Ok(self.settle(entry, Position::AfterLast))
    }

    fn prev(&mut self) -> Result<Option<Entry>> {
        let entry = match &self.position {
            Position::Unset | Position::AfterLast => self.lookup.last()?,
            Position::At(key) => self.lookup.before(key)?,
            Position::BeforeFirst => None,
        };
        Ok(self.settle(entry, Position::BeforeFirst))
    }
}

pub(crate) fn check_batch(keys: &[Vec<u8>], values: &[Vec<u8>]) -> Result<()> {
    if keys.len() != values.len() {
        return Err(crate::Error::invalid(format!(
            "batch has {} keys but {} values",
            keys.len(),
            values.len()
        )));
    }
    Ok(())
}
