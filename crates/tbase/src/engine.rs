//! Time-series engine.
//!
//! Maps a [`TimeSeries`] onto its namespace and back. The engine keeps no
//! state between calls beyond the store handle.
//!
//! # Persist Phases
//!
//! ```text
//! persist(series)
//!   1. catalog   "collections"[name] = {name, columns}     (txn A)
//!   2. data      create namespace `name`                   (txn B)
//!                batch_put(encode_ts(t) -> encode_row(v))  (txn C)
//! ```
//!
//! The phases are separate transactions. A crash after phase 1 leaves a
//! catalog entry with no data namespace, which queries treat as an empty
//! collection. Persisting again completes it.

use chrono::{DateTime, Utc};

use crate::{
    catalog::{self, CATALOG_NAMESPACE, CollectionMeta},
    codec,
    error::{Error, PersistPhase, Result},
    series::TimeSeries,
    store::{Cursor, Entry, KeyLookup, OrderedStore, StoreCursor},
};

/// Persists and queries time series on an [`OrderedStore`].
pub struct Engine<S> {
    store: S,
}

impl<S: OrderedStore> Engine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Write every observation of `series` to its collection.
    ///
    /// Rows overwrite existing rows with the same timestamp.
    ///
    /// # Errors
    /// - [`Error::InvalidArgument`] for an empty or reserved name.
    /// - [`Error::Persist`] wrapping the failure, tagged with the phase.
    pub fn persist(&self, series: &TimeSeries) -> Result<()> {
        let name = series.name();
        validate_name(name)?;

        catalog::create_collection(&self.store, name, series.column_names())
            .map_err(|e| persist_error(name, PersistPhase::Catalog, e))?;

        self.write_rows(series)
            .map_err(|e| persist_error(name, PersistPhase::Data, e))?;

        tracing::debug!("Persisted {} rows into {series}", series.len());
        Ok(())
    }

    fn write_rows(&self, series: &TimeSeries) -> Result<()> {
        let name = series.name();
        self.store.create_namespace(name)?;

        let (keys, values): (Vec<_>, Vec<_>) = series
            .iter()
            .map(|(time, row)| {
                (
                    codec::encode_timestamp(time).to_vec(),
                    codec::encode_float_vector(row),
                )
            })
            .unzip();

        self.store.batch_put(name, &keys, &values)
    }

    /// Fetch observations in `[start, end]`, both inclusive.
    ///
    /// `None` leaves that side open. An empty `columns` selects every
    /// column; otherwise rows hold only the named columns, in that order.
    ///
    /// # Errors
    /// - [`Error::CollectionNotFound`] if the collection was never persisted.
    /// - [`Error::InvalidArgument`] for an unknown column.
    /// - [`Error::Corruption`] if a stored key or row cannot be decoded.
    pub fn range_query(
        &self,
        collection: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        columns: &[&str],
    ) -> Result<TimeSeries> {
        let meta = self.collection(collection)?;

        let projection = if columns.is_empty() {
            None
        } else {
            Some(meta.projection(columns)?)
        };
        let result_columns: Vec<String> = match &projection {
            Some(positions) => positions.iter().map(|&i| meta.columns[i].clone()).collect(),
            None => meta.columns.clone(),
        };
        let mut result = TimeSeries::new(collection, result_columns);

        if !self.store.has_namespace(collection)? {
            tracing::warn!("Collection {collection} is registered but has no data namespace");
            return Ok(result);
        }

        let scan = Scan {
            meta: &meta,
            projection: projection.as_deref(),
            end,
        };
        self.store.with_cursor(collection, |cursor| {
            let mut next = match start {
                Some(start) => cursor.seek(&codec::encode_timestamp(start))?,
                None => cursor.first()?,
            };
            while let Some(entry) = next {
                let Some((time, row)) = scan.decode(&entry)? else {
                    break;
                };
                result.add_observation(time, row)?;
                next = cursor.next()?;
            }
            Ok(())
        })?;

        tracing::debug!(
            "Range query on {collection} returned {} rows ({} columns)",
            result.len(),
            result.column_names().len()
        );
        Ok(result)
    }

    /// Catalog entry for one collection.
    ///
    /// # Errors
    /// [`Error::CollectionNotFound`] if it was never persisted.
    pub fn collection(&self, name: &str) -> Result<CollectionMeta> {
        catalog::get_collection(&self.store, name)?
            .ok_or_else(|| Error::CollectionNotFound(name.to_owned()))
    }

    /// Every persisted collection, ordered by name.
    pub fn collections(&self) -> Result<Vec<CollectionMeta>> {
        catalog::list_collections(&self.store)
    }

    /// Run `visit` over the raw rows of a collection.
    ///
    /// Lower level than [`range_query`](Self::range_query), for callers that
    /// want to walk backwards or stop early without materializing a series.
    /// A registered collection without a data namespace yields a cursor
    /// with no entries, matching `range_query`.
    pub fn with_cursor<R, F>(&self, collection: &str, visit: F) -> Result<R>
    where
        F: FnOnce(&mut dyn StoreCursor) -> Result<R>,
    {
        self.collection(collection)?;
        if !self.store.has_namespace(collection)? {
            tracing::warn!("Collection {collection} is registered but has no data namespace");
            return visit(&mut Cursor::new(NoEntries));
        }
        self.store.with_cursor(collection, visit)
    }
}

/// Lookup over a namespace that does not exist yet.
struct NoEntries;

impl KeyLookup for NoEntries {
    fn first(&self) -> Result<Option<Entry>> {
        Ok(None)
    }

    fn last(&self) -> Result<Option<Entry>> {
        Ok(None)
    }

    fn at_or_after(&self, _: &[u8]) -> Result<Option<Entry>> {
        Ok(None)
    }

    fn after(&self, _: &[u8]) -> Result<Option<Entry>> {
        Ok(None)
    }

    fn before(&self, _: &[u8]) -> Result<Option<Entry>> {
        Ok(None)
    }
}

/// Per-query decode state.
struct Scan<'a> {
    meta: &'a CollectionMeta,
    projection: Option<&'a [usize]>,
    end: Option<DateTime<Utc>>,
}

impl Scan<'_> {
    /// Decode one entry, or `None` once past the end of the range.
    fn decode(&self, entry: &Entry) -> Result<Option<(DateTime<Utc>, Vec<f64>)>> {
        let time = codec::decode_timestamp(&entry.key)?;
        if self.end.is_some_and(|end| time > end) {
            return Ok(None);
        }

        let row = codec::decode_float_vector(&entry.value)?;
        if row.len() != self.meta.columns.len() {
            return Err(Error::corrupt(format!(
                "row at {time} in {} has {} values, catalog lists {} columns",
                self.meta.name,
                row.len(),
                self.meta.columns.len()
            )));
        }

        let row = match self.projection {
            Some(positions) => positions.iter().map(|&i| row[i]).collect(),
            None => row,
        };
        Ok(Some((time, row)))
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid("collection name must not be empty"));
    }
    if name == CATALOG_NAMESPACE {
        return Err(Error::invalid(format!(
            "{CATALOG_NAMESPACE:?} is reserved for the catalog"
        )));
    }
    Ok(())
}

fn persist_error(collection: &str, phase: PersistPhase, source: Error) -> Error {
    tracing::debug!("Persist of {collection} failed during {phase}: {source}");
    Error::Persist {
        collection: collection.to_owned(),
        phase,
        source: Box::new(source),
    }
}
