//! Collection catalog.
//!
//! A reserved namespace maps each collection name to its column schema, so
//! readers can validate projections without any out-of-band schema.

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    store::OrderedStore,
};

/// Namespace holding one [`CollectionMeta`] per collection.
pub const CATALOG_NAMESPACE: &str = "collections";

/// Durable record describing a collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionMeta {
    pub name: String,
    pub columns: Vec<String>,
}

impl CollectionMeta {
    #[must_use]
    pub fn new(name: impl Into<String>, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Position of a column.
    #[must_use]
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Resolve column names to positions, in the order given.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] naming the first unknown column.
    pub fn projection(&self, columns: &[&str]) -> Result<Vec<usize>> {
        columns
            .iter()
            .map(|&column| {
                self.column_index(column).ok_or_else(|| {
                    Error::invalid(format!(
                        "collection {} has no column {column:?}",
                        self.name
                    ))
                })
            })
            .collect()
    }

    fn encode(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| encode_failed(&self.name, &e))
    }

    fn decode(name: &str, bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes)
            .map_err(|e| Error::corrupt(format!("catalog entry {name}: {e}")))
    }
}

fn encode_failed(name: &str, e: &bincode::Error) -> Error {
    Error::corrupt(format!("cannot encode catalog entry {name}: {e}"))
}

/// Register a collection, overwriting any previous entry.
///
/// Column changes for an existing name are not detected.
pub fn create_collection(store: &impl OrderedStore, name: &str, columns: &[String]) -> Result<()> {
    store.create_namespace(CATALOG_NAMESPACE)?;

    let meta = CollectionMeta::new(name, columns.iter().cloned());
    store.put(CATALOG_NAMESPACE, name.as_bytes(), &meta.encode()?)?;

    tracing::debug!("Registered collection {name} with {} columns", columns.len());
    Ok(())
}

/// Look up a collection.
///
/// Returns `None` if the collection, or the catalog itself, does not exist.
/// An empty name can never be registered, so it is never looked up.
pub fn get_collection(store: &impl OrderedStore, name: &str) -> Result<Option<CollectionMeta>> {
    if name.is_empty() {
        return Ok(None);
    }

    let bytes = match store.get(CATALOG_NAMESPACE, name.as_bytes()) {
        Ok(bytes) => bytes,
        Err(Error::NamespaceNotFound(_)) => return Ok(None),
        Err(e) => return Err(e),
    };

    bytes.map(|bytes| CollectionMeta::decode(name, &bytes)).transpose()
}

/// All registered collections, ordered by name.
pub fn list_collections(store: &impl OrderedStore) -> Result<Vec<CollectionMeta>> {
    if !store.has_namespace(CATALOG_NAMESPACE)? {
        return Ok(Vec::new());
    }

    store.with_cursor(CATALOG_NAMESPACE, |cursor| {
        let mut out = Vec::new();
        let mut next = cursor.first()?;
        while let Some(entry) = next {
            let name = String::from_utf8_lossy(&entry.key);
            out.push(CollectionMeta::decode(&name, &entry.value)?);
            next = cursor.next()?;
        }
        Ok(out)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, store::MemoryStore};

    fn ohlc() -> Vec<String> {
        ["Open", "High", "Low", "Close"].map(String::from).to_vec()
    }

    #[test]
    fn test_create_and_get() {
        let store = MemoryStore::new();
        assert_eq!(get_collection(&store, "EBAY").unwrap(), None);

        create_collection(&store, "EBAY", &ohlc()).unwrap();
        let meta = get_collection(&store, "EBAY").unwrap().unwrap();
        assert_eq!(meta, CollectionMeta::new("EBAY", ohlc()));
        assert_eq!(get_collection(&store, "AAPL").unwrap(), None);
    }

    #[test]
    fn test_rewrite_is_last_write_wins() {
        let store = MemoryStore::new();
        create_collection(&store, "EBAY", &ohlc()).unwrap();
        create_collection(&store, "EBAY", &["Close".to_owned()]).unwrap();

        let meta = get_collection(&store, "EBAY").unwrap().unwrap();
        assert_eq!(meta.columns, vec!["Close"]);
    }

    #[test]
    fn test_list_in_name_order() {
        let store = MemoryStore::new();
        assert!(list_collections(&store).unwrap().is_empty());

        create_collection(&store, "MSFT", &ohlc()).unwrap();
        create_collection(&store, "EBAY", &ohlc()).unwrap();

        let names: Vec<_> = list_collections(&store)
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["EBAY", "MSFT"]);
    }

    #[test]
    fn test_projection() {
        let meta = CollectionMeta::new("EBAY", ohlc());
        assert_eq!(meta.projection(&["Close", "Open"]).unwrap(), vec![3, 0]);
        assert!(meta.projection(&[]).unwrap().is_empty());

        let err = meta.projection(&["Volume"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_empty_name_is_absent() {
        let store = MemoryStore::new();
        create_collection(&store, "EBAY", &ohlc()).unwrap();
        assert_eq!(get_collection(&store, "").unwrap(), None);
    }

    #[test]
    fn test_encode_failure_is_corruption() {
        let e: bincode::Error = Box::new(bincode::ErrorKind::SizeLimit);
        assert_eq!(encode_failed("EBAY", &e).kind(), ErrorKind::Corruption);
    }

    #[test]
    fn test_garbage_entry_is_corruption() {
        let store = MemoryStore::new();
        store.create_namespace(CATALOG_NAMESPACE).unwrap();
        store.put(CATALOG_NAMESPACE, b"EBAY", &[0xff]).unwrap();

        let err = get_collection(&store, "EBAY").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Corruption);
    }
}
