//! Backend configuration.

/// Default LMDB map size: 1 GiB.
pub const DEFAULT_MAP_SIZE: usize = 1024 * 1024 * 1024;

/// Default number of named databases (collections plus the catalog).
pub const DEFAULT_MAX_NAMESPACES: u32 = 128;

/// Configuration for opening an [`LmdbStore`](crate::store::lmdb::LmdbStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Maximum size of the memory map, which bounds the database file.
    ///
    /// Writes beyond this fail with `MDB_MAP_FULL`. Default: 1 GiB.
    pub map_size: usize,

    /// Maximum number of namespaces, counting the catalog.
    ///
    /// Each collection occupies one. Default: 128.
    pub max_namespaces: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            map_size: DEFAULT_MAP_SIZE,
            max_namespaces: DEFAULT_MAX_NAMESPACES,
        }
    }
}

impl StoreConfig {
    /// Sets the map size in bytes.
    pub fn with_map_size(mut self, bytes: usize) -> Self {
        self.map_size = bytes;
        self
    }

    /// Sets the namespace limit.
    pub fn with_max_namespaces(mut self, max: u32) -> Self {
        self.max_namespaces = max;
        self
    }
}
