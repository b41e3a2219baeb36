//! Positional view of a forecast response.
//!
//! Each granularity block becomes an axis descriptor plus a list of value
//! arrays addressed by index. The response label of every array is kept so a
//! declared name can be checked against what actually sits at its position.

use serde_json::{Map, Value};

use super::axis::{AxisError, Granularity, TimeAxis};
use super::request::VariableSet;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("missing field '{0}'")]
    MissingField(String),

    #[error("'{field}' is not {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },

    #[error("{block}.time is empty")]
    EmptyTime { block: Granularity },

    #[error("{block}.time is not increasing at position {position}")]
    UnorderedTime { block: Granularity, position: usize },

    #[error("{block}.{variable}[{position}] is not a number")]
    NonNumeric {
        block: Granularity,
        variable: String,
        position: usize,
    },

    #[error("{block}: requested '{declared}' at position {index}, response has '{actual}'")]
    NameMismatch {
        block: Granularity,
        index: usize,
        declared: String,
        actual: String,
    },

    #[error("{block}: requested '{declared}' at position {index}, response has only {available} variables")]
    MissingVariable {
        block: Granularity,
        index: usize,
        declared: String,
        available: usize,
    },

    #[error("{block}: {requested} variables requested, response has {available}")]
    VariableCount {
        block: Granularity,
        requested: usize,
        available: usize,
    },

    #[error(transparent)]
    Axis(#[from] AxisError),
}

/// One value array at a fixed position in a block.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionalVariable {
    /// Name the response gives this position
    pub label: String,
    pub values: Vec<f64>,
}

/// Time axis plus variables addressed by index.
#[derive(Debug, Clone, PartialEq)]
pub struct VariablesBlock {
    pub granularity: Granularity,
    pub axis: TimeAxis,
    variables: Vec<PositionalVariable>,
}

impl VariablesBlock {
    pub fn new(granularity: Granularity, axis: TimeAxis, variables: Vec<PositionalVariable>) -> Self {
        Self {
            granularity,
            axis,
            variables,
        }
    }

    pub fn variables_len(&self) -> usize {
        self.variables.len()
    }

    pub fn variable(&self, index: usize) -> Option<&PositionalVariable> {
        self.variables.get(index)
    }

    /// Take the arrays at the requested positions, in request order.
    ///
    /// Fails if a position is missing, if the response labels a position
    /// differently than it was requested, or if the response carries
    /// variables nobody asked for.
    pub fn decode(&self, requested: &VariableSet) -> Result<Vec<(String, Vec<f64>)>, DecodeError> {
        if self.variables.len() != requested.len() {
            if let Some(v) = requested.iter().find(|v| v.index >= self.variables.len()) {
                return Err(DecodeError::MissingVariable {
                    block: self.granularity,
                    index: v.index,
                    declared: v.name.clone(),
                    available: self.variables.len(),
                });
            }
            return Err(DecodeError::VariableCount {
                block: self.granularity,
                requested: requested.len(),
                available: self.variables.len(),
            });
        }

        requested
            .iter()
            .map(|v| {
                let found = self.variable(v.index).ok_or_else(|| DecodeError::MissingVariable {
                    block: self.granularity,
                    index: v.index,
                    declared: v.name.clone(),
                    available: self.variables.len(),
                })?;
                if found.label != v.name {
                    return Err(DecodeError::NameMismatch {
                        block: self.granularity,
                        index: v.index,
                        declared: v.name.clone(),
                        actual: found.label.clone(),
                    });
                }
                Ok((v.name.clone(), found.values.clone()))
            })
            .collect()
    }
}

/// Location metadata and the two blocks of a forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResponse {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: Option<f64>,
    pub timezone: String,
    pub timezone_abbreviation: String,
    pub utc_offset_seconds: i64,
    pub hourly: Option<VariablesBlock>,
    pub daily: Option<VariablesBlock>,
}

impl ForecastResponse {
    pub fn block(&self, granularity: Granularity) -> Option<&VariablesBlock> {
        match granularity {
            Granularity::Hourly => self.hourly.as_ref(),
            Granularity::Daily => self.daily.as_ref(),
        }
    }
}

/// Parse a JSON forecast body (requested with `timeformat=unixtime`).
///
/// Timestamps are shifted by `utc_offset_seconds` so that axis arithmetic
/// happens in the forecast's local wall-clock time.
pub fn parse_forecast(body: &Value) -> Result<ForecastResponse, DecodeError> {
    let root = body.as_object().ok_or_else(|| DecodeError::WrongType {
        field: "<root>".into(),
        expected: "an object",
    })?;

    let utc_offset_seconds = root
        .get("utc_offset_seconds")
        .and_then(Value::as_i64)
        .unwrap_or(0);

    let hourly = parse_block(root, Granularity::Hourly, utc_offset_seconds)?;
    let daily = parse_block(root, Granularity::Daily, utc_offset_seconds)?;

    Ok(ForecastResponse {
        latitude: number_field(root, "latitude")?,
        longitude: number_field(root, "longitude")?,
        elevation: root.get("elevation").and_then(Value::as_f64),
        timezone: string_field(root, "timezone"),
        timezone_abbreviation: string_field(root, "timezone_abbreviation"),
        utc_offset_seconds,
        hourly,
        daily,
    })
}

fn number_field(root: &Map<String, Value>, key: &str) -> Result<f64, DecodeError> {
    root.get(key)
        .ok_or_else(|| DecodeError::MissingField(key.to_string()))?
        .as_f64()
        .ok_or_else(|| DecodeError::WrongType {
            field: key.to_string(),
            expected: "a number",
        })
}

fn string_field(root: &Map<String, Value>, key: &str) -> String {
    root.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn parse_block(
    root: &Map<String, Value>,
    granularity: Granularity,
    utc_offset_seconds: i64,
) -> Result<Option<VariablesBlock>, DecodeError> {
    let key = granularity.key();
    let Some(block) = root.get(key) else {
        return Ok(None);
    };
    let block = block.as_object().ok_or_else(|| DecodeError::WrongType {
        field: key.to_string(),
        expected: "an object",
    })?;

    let time = block
        .get("time")
        .ok_or_else(|| DecodeError::MissingField(format!("{key}.time")))?
        .as_array()
        .ok_or_else(|| DecodeError::WrongType {
            field: format!("{key}.time"),
            expected: "an array",
        })?;

    let mut times = Vec::with_capacity(time.len());
    for (position, t) in time.iter().enumerate() {
        let t = t.as_i64().ok_or_else(|| DecodeError::WrongType {
            field: format!("{key}.time[{position}]"),
            expected: "an integer timestamp",
        })?;
        if times.last().is_some_and(|prev| *prev >= t) {
            return Err(DecodeError::UnorderedTime {
                block: granularity,
                position,
            });
        }
        times.push(t);
    }

    let Some(first) = times.first() else {
        return Err(DecodeError::EmptyTime { block: granularity });
    };

    // One step per sample from the first one. Deriving the end from the last
    // sample breaks across a DST change, where local midnights shift by an
    // hour against the single response-wide offset.
    let interval = granularity.interval_seconds();
    let start = first + utc_offset_seconds;
    let axis = TimeAxis::new(start, start + times.len() as i64 * interval, interval)?;

    let mut variables = Vec::new();
    for (label, values) in block.iter().filter(|(k, _)| k.as_str() != "time") {
        let values = values.as_array().ok_or_else(|| DecodeError::WrongType {
            field: format!("{key}.{label}"),
            expected: "an array",
        })?;
        let values = values
            .iter()
            .enumerate()
            .map(|(position, v)| match v {
                Value::Null => Ok(f64::NAN),
                v => v.as_f64().ok_or_else(|| DecodeError::NonNumeric {
                    block: granularity,
                    variable: label.clone(),
                    position,
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        variables.push(PositionalVariable {
            label: label.clone(),
            values,
        });
    }

    Ok(Some(VariablesBlock::new(granularity, axis, variables)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MIDNIGHT: i64 = 1_715_558_400;

    fn body() -> Value {
        json!({
            "latitude": 52.26,
            "longitude": 10.52,
            "elevation": 77.0,
            "timezone": "Europe/Berlin",
            "timezone_abbreviation": "CEST",
            "utc_offset_seconds": 7200,
            "hourly": {
                "time": [MIDNIGHT - 7200, MIDNIGHT - 3600, MIDNIGHT],
                "temperature_2m": [12.5, 12.1, null],
                "uv_index": [0.0, 0.0, 0.1]
            },
            "daily": {
                "time": [MIDNIGHT - 7200, MIDNIGHT + 86_400 - 7200],
                "temperature_2m_max": [20.0, 21.5]
            }
        })
    }

    #[test]
    fn parses_metadata_and_blocks() {
        let response = parse_forecast(&body()).unwrap();
        assert_eq!(response.timezone, "Europe/Berlin");
        assert_eq!(response.timezone_abbreviation, "CEST");
        assert_eq!(response.utc_offset_seconds, 7200);
        assert_eq!(response.elevation, Some(77.0));

        let hourly = response.block(Granularity::Hourly).unwrap();
        assert_eq!(hourly.axis.start, MIDNIGHT);
        assert_eq!(hourly.axis.len(), 3);
        assert_eq!(hourly.variables_len(), 2);
        assert_eq!(hourly.variable(0).unwrap().label, "temperature_2m");
        assert!(hourly.variable(0).unwrap().values[2].is_nan());

        let daily = response.block(Granularity::Daily).unwrap();
        assert_eq!(daily.axis.start, MIDNIGHT);
        assert_eq!(daily.axis.interval_seconds, 86_400);
    }

    #[test]
    fn decode_in_request_order() {
        let response = parse_forecast(&body()).unwrap();
        let requested = VariableSet::from_names(&["temperature_2m", "uv_index"]);
        let decoded = response.hourly.as_ref().unwrap().decode(&requested).unwrap();
        assert_eq!(decoded[0].0, "temperature_2m");
        assert_eq!(decoded[1].0, "uv_index");
        assert_eq!(decoded[1].1, vec![0.0, 0.0, 0.1]);
    }

    #[test]
    fn reordered_declaration_is_detected() {
        let response = parse_forecast(&body()).unwrap();
        let requested = VariableSet::from_names(&["uv_index", "temperature_2m"]);
        let err = response.hourly.as_ref().unwrap().decode(&requested).unwrap_err();
        match err {
            DecodeError::NameMismatch {
                index,
                declared,
                actual,
                ..
            } => {
                assert_eq!(index, 0);
                assert_eq!(declared, "uv_index");
                assert_eq!(actual, "temperature_2m");
            }
            other => panic!("expected NameMismatch, got {other:?}"),
        }
    }

    #[test]
    fn missing_and_extra_variables() {
        let response = parse_forecast(&body()).unwrap();
        let daily = response.daily.as_ref().unwrap();

        let err = daily
            .decode(&VariableSet::from_names(&["temperature_2m_max", "temperature_2m_min"]))
            .unwrap_err();
        assert!(matches!(err, DecodeError::MissingVariable { index: 1, .. }), "{err:?}");

        let hourly = response.hourly.as_ref().unwrap();
        let err = hourly
            .decode(&VariableSet::from_names(&["temperature_2m"]))
            .unwrap_err();
        assert!(matches!(err, DecodeError::VariableCount { requested: 1, available: 2, .. }));
    }

    #[test]
    fn absent_block_is_none() {
        let mut b = body();
        b.as_object_mut().unwrap().remove("daily");
        assert!(parse_forecast(&b).unwrap().daily.is_none());
    }

    #[test]
    fn rejects_malformed_blocks() {
        let mut b = body();
        b["hourly"]["time"] = json!([]);
        assert!(matches!(
            parse_forecast(&b),
            Err(DecodeError::EmptyTime { block: Granularity::Hourly })
        ));

        let mut b = body();
        b["hourly"]["time"] = json!([MIDNIGHT, MIDNIGHT - 3600, MIDNIGHT + 3600]);
        assert!(matches!(
            parse_forecast(&b),
            Err(DecodeError::UnorderedTime { position: 1, .. })
        ));

        let mut b = body();
        b["hourly"]["uv_index"] = json!([0.0, "high", 0.1]);
        assert!(matches!(
            parse_forecast(&b),
            Err(DecodeError::NonNumeric { position: 1, .. })
        ));

        let mut b = body();
        b.as_object_mut().unwrap().remove("latitude");
        assert!(matches!(parse_forecast(&b), Err(DecodeError::MissingField(_))));
    }

    #[test]
    fn axis_spans_one_step_per_sample() {
        // Daily samples at local midnights that move by an hour mid-week
        let mut b = body();
        b["daily"]["time"] = json!([
            MIDNIGHT - 7200,
            MIDNIGHT + 86_400 - 3600,
            MIDNIGHT + 2 * 86_400 - 3600
        ]);
        b["daily"]["temperature_2m_max"] = json!([20.0, 21.5, 19.0]);

        let daily = parse_forecast(&b).unwrap().daily.unwrap();
        assert_eq!(daily.axis.start, MIDNIGHT);
        assert_eq!(daily.axis.end, MIDNIGHT + 3 * 86_400);
        assert_eq!(daily.axis.len(), 3);
    }
}
