//! Time-indexed tables built from an axis and parallel value arrays.

use serde::Serialize;

use super::axis::{format_timestamp, AxisError, Granularity, TimeAxis};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReshapeError {
    #[error(transparent)]
    Axis(#[from] AxisError),

    #[error("'{variable}' has {actual} values but the time axis has {expected} timestamps")]
    LengthMismatch {
        variable: String,
        expected: usize,
        actual: usize,
    },

    #[error("variable '{0}' declared twice")]
    DuplicateVariable(String),
}

/// A named series aligned 1:1 with the table's timestamps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesVariable {
    pub name: String,
    pub values: Vec<f64>,
}

/// Timestamps plus variables in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeTable {
    pub granularity: Granularity,
    pub axis: TimeAxis,
    pub timestamps: Vec<i64>,
    pub variables: Vec<TimeSeriesVariable>,
}

impl TimeTable {
    /// Build a table on the axis for `granularity` (floored to days for
    /// daily tables). Every variable must have exactly one value per
    /// timestamp; nothing is truncated or padded.
    pub fn reshape(
        axis: TimeAxis,
        granularity: Granularity,
        variables: Vec<(String, Vec<f64>)>,
    ) -> Result<Self, ReshapeError> {
        let axis = axis.for_granularity(granularity)?;
        let timestamps = axis.timestamps();

        let mut columns: Vec<TimeSeriesVariable> = Vec::with_capacity(variables.len());
        for (name, values) in variables {
            if columns.iter().any(|c| c.name == name) {
                return Err(ReshapeError::DuplicateVariable(name));
            }
            if values.len() != timestamps.len() {
                return Err(ReshapeError::LengthMismatch {
                    variable: name,
                    expected: timestamps.len(),
                    actual: values.len(),
                });
            }
            columns.push(TimeSeriesVariable { name, values });
        }

        Ok(Self {
            granularity,
            axis,
            timestamps,
            variables: columns,
        })
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.variables.iter().map(|v| v.name.as_str()).collect()
    }

    pub fn variable(&self, name: &str) -> Option<&TimeSeriesVariable> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn label(&self, row: usize) -> Option<String> {
        self.timestamps
            .get(row)
            .map(|ts| format_timestamp(*ts, self.granularity))
    }

    /// `(x, y)` points of one variable; gaps (NaN) are left out.
    pub fn points(&self, variable: &TimeSeriesVariable) -> Vec<(f64, f64)> {
        self.timestamps
            .iter()
            .zip(&variable.values)
            .filter(|(_, v)| v.is_finite())
            .map(|(t, v)| (*t as f64, *v))
            .collect()
    }
}

/// Smallest and largest finite value over several series.
pub fn value_bounds<'a>(
    variables: impl IntoIterator<Item = &'a TimeSeriesVariable>,
) -> Option<(f64, f64)> {
    variables
        .into_iter()
        .flat_map(|v| v.values.iter().copied())
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
