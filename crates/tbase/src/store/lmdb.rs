//! LMDB backend via heed.
//!
//! Each namespace is a named LMDB database inside one environment. LMDB
//! serializes write transactions and gives every read transaction an MVCC
//! snapshot, which is exactly the model [`OrderedStore`] promises.

use std::path::Path;

use heed::{Database, Env, EnvOpenOptions, RoTxn, types::Bytes};

use super::{Cursor, Entry, KeyLookup, OrderedStore, StoreCursor, check_batch};
use crate::{
    config::StoreConfig,
    error::{Error, Result},
};

type RawDb = Database<Bytes, Bytes>;

/// Durable ordered store backed by an LMDB environment.
#[derive(Clone)]
pub struct LmdbStore {
    env: Env,
}

impl LmdbStore {
    /// Open or create a store at `path` with default settings.
    ///
    /// # Errors
    /// Returns an error if the directory or environment cannot be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, StoreConfig::default())
    }

    /// Open or create a store at `path`.
    ///
    /// # Errors
    /// Returns an error if the directory or environment cannot be created.
    ///
    /// # Safety
    /// Uses unsafe to call heed's open method, which requires that the same
    /// environment is not opened twice in one process with different
    /// options.
    #[allow(unsafe_code)]
    pub fn open_with(path: impl AsRef<Path>, config: StoreConfig) -> Result<Self> {
        let path = path.as_ref();
        std::fs::create_dir_all(path)?;

        // SAFETY: heed rejects a second open of the same path in-process.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(config.map_size)
                .max_dbs(config.max_namespaces)
                .open(path)?
        };

        tracing::debug!(
            "Opened LMDB store at {} (map_size={}, max_namespaces={})",
            path.display(),
            config.map_size,
            config.max_namespaces
        );
        Ok(Self { env })
    }

    fn database(&self, txn: &RoTxn<'_>, name: &str) -> Result<RawDb> {
        self.env
            .open_database::<Bytes, Bytes>(txn, Some(name))?
            .ok_or_else(|| Error::NamespaceNotFound(name.to_owned()))
    }
}

impl OrderedStore for LmdbStore {
    fn create_namespace(&self, name: &str) -> Result<()> {
        let mut wtxn = self.env.write_txn()?;
        self.env.create_database::<Bytes, Bytes>(&mut wtxn, Some(name))?;
        wtxn.commit()?;

        tracing::debug!("Ensured namespace {name}");
        Ok(())
    }

    fn has_namespace(&self, name: &str) -> Result<bool> {
        let rtxn = self.env.read_txn()?;
        let db = self.env.open_database::<Bytes, Bytes>(&rtxn, Some(name))?;
        Ok(db.is_some())
    }

    fn put(&self, namespace: &str, key: &[u8], value: &[u8]) -> Result<()> {
        let mut wtxn = self.env.write_txn()?;
        let db = self.database(&wtxn, namespace)?;
        db.put(&mut wtxn, key, value)?;
        wtxn.commit()?;

        tracing::trace!("Put {} bytes into {namespace}", value.len());
        Ok(())
    }

    fn batch_put(&self, namespace: &str, keys: &[Vec<u8>], values: &[Vec<u8>]) -> Result<()> {
        check_batch(keys, values)?;

        // Dropping the txn on any error aborts it, so nothing is visible.
        let mut wtxn = self.env.write_txn()?;
        let db = self.database(&wtxn, namespace)?;
        for (key, value) in keys.iter().zip(values) {
            db.put(&mut wtxn, key.as_slice(), value.as_slice())?;
        }
        wtxn.commit()?;

        tracing::trace!("Batch put {} entries into {namespace}", keys.len());
        Ok(())
    }

    fn get(&self, namespace: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let rtxn = self.env.read_txn()?;
        let db = self.database(&rtxn, namespace)?;
        Ok(db.get(&rtxn, key)?.map(<[u8]>::to_vec))
    }

    fn with_cursor<R, F>(&self, namespace: &str, visit: F) -> Result<R>
    where
        F: FnOnce(&mut dyn StoreCursor) -> Result<R>,
    {
        let rtxn = self.env.read_txn()?;
        let db = self.database(&rtxn, namespace)?;
        let mut cursor = Cursor::new(LmdbLookup { txn: &rtxn, db });
        visit(&mut cursor)
    }
}

struct LmdbLookup<'t, 'e> {
    txn: &'t RoTxn<'e>,
    db: RawDb,
}

fn entry(found: Option<(&[u8], &[u8])>) -> Option<Entry> {
    found.map(|(key, value)| Entry::new(key, value))
}

impl KeyLookup for LmdbLookup<'_, '_> {
    fn first(&self) -> Result<Option<Entry>> {
        Ok(entry(self.db.first(self.txn)?))
    }

    fn last(&self) -> Result<Option<Entry>> {
        Ok(entry(self.db.last(self.txn)?))
    }

    fn at_or_after(&self, key: &[u8]) -> Result<Option<Entry>> {
        Ok(entry(self.db.get_greater_than_or_equal_to(self.txn, key)?))
    }

    fn after(&self, key: &[u8]) -> Result<Option<Entry>> {
        Ok(entry(self.db.get_greater_than(self.txn, key)?))
    }

    fn before(&self, key: &[u8]) -> Result<Option<Entry>> {
        Ok(entry(self.db.get_lower_than(self.txn, key)?))
    }
}
