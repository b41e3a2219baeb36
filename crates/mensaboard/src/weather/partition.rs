//! Split hourly variables into two separately scaled charts.
//!
//! Temperature and UV index live on very different scales from the
//! precipitation family, so they get their own chart.

use super::table::{TimeSeriesVariable, TimeTable};

/// Column name of the time axis; never a chart series.
pub const DATE_COLUMN: &str = "date";

/// Variables drawn on the dedicated chart by default.
pub const DEFAULT_FOCUS: &[&str] = &["temperature_2m", "uv_index"];

/// The two chart groups of a table, each in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartGroups<'a> {
    /// Everything not in the focus list
    pub shared: Vec<&'a TimeSeriesVariable>,
    /// Variables named in the focus list
    pub focus: Vec<&'a TimeSeriesVariable>,
}

/// Partition `table`'s variables by membership in `focus`.
pub fn partition<'a, S: AsRef<str>>(table: &'a TimeTable, focus: &[S]) -> ChartGroups<'a> {
    let (focus_vars, shared): (Vec<_>, Vec<_>) = table
        .variables
        .iter()
        .filter(|v| v.name != DATE_COLUMN)
        .partition(|v| focus.iter().any(|f| f.as_ref() == v.name));
    ChartGroups {
        shared,
        focus: focus_vars,
    }
}

/// Name-level partition: `(shared, focus)`.
pub fn partition_names<'a, S: AsRef<str>>(
    names: &[&'a str],
    focus: &[S],
) -> (Vec<&'a str>, Vec<&'a str>) {
    names
        .iter()
        .copied()
        .filter(|n| *n != DATE_COLUMN)
        .partition(|n| !focus.iter().any(|f| f.as_ref() == *n))
}
