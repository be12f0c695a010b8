//! In-memory time series.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};

/// A named, multi-column numeric series.
///
/// Observations are kept in insertion order. Persisting sorts them by key,
/// so query results come back in time order regardless.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeSeries {
    name: String,
    column_names: Vec<String>,
    times: Vec<DateTime<Utc>>,
    values: Vec<Vec<f64>>,
}

impl TimeSeries {
    /// Create an empty series.
    #[must_use]
    pub fn new(name: impl Into<String>, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            column_names: columns.into_iter().map(Into::into).collect(),
            times: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Append one observation.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] if `values` does not have one entry per
    /// column. This is a caller bug, and the series is left unchanged.
    pub fn add_observation(&mut self, time: DateTime<Utc>, values: Vec<f64>) -> Result<()> {
        if values.len() != self.column_names.len() {
            return Err(Error::invalid(format!(
                "{self} expects {} values per observation, got {}",
                self.column_names.len(),
                values.len()
            )));
        }

        self.times.push(time);
        self.values.push(values);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn times(&self) -> &[DateTime<Utc>] {
        &self.times
    }

    pub fn values(&self) -> &[Vec<f64>] {
        &self.values
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Observations as `(time, row)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (DateTime<Utc>, &[f64])> + '_ {
        self.times
            .iter()
            .copied()
            .zip(self.values.iter().map(Vec::as_slice))
    }
}

impl fmt::Display for TimeSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.column_names.join(", "))
    }
}
