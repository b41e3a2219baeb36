//! Forecast request construction.
//!
//! The forecast response addresses variables by position, so the request
//! records each variable together with the index it will have in the
//! response. That list is handed to the decoder unchanged.

use serde::Serialize;

use super::axis::Granularity;
use super::WeatherError;
use crate::config::WeatherConfig;

/// A requested variable and its position in the response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestedVariable {
    pub name: String,
    pub index: usize,
}

/// Variables of one granularity, in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VariableSet(Vec<RequestedVariable>);

impl VariableSet {
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        Self(
            names
                .iter()
                .enumerate()
                .map(|(index, name)| RequestedVariable {
                    name: name.as_ref().to_string(),
                    index,
                })
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &RequestedVariable> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|v| v.name.as_str()).collect()
    }

    /// Comma-separated query parameter value.
    pub fn query_value(&self) -> String {
        self.names().join(",")
    }
}

/// One forecast call for a fixed point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    pub hourly: VariableSet,
    pub daily: VariableSet,
}

impl ForecastRequest {
    pub fn from_config(config: &WeatherConfig) -> Self {
        Self {
            latitude: config.latitude,
            longitude: config.longitude,
            timezone: config.timezone.clone(),
            hourly: VariableSet::from_names(&config.hourly),
            daily: VariableSet::from_names(&config.daily),
        }
    }

    pub fn variables(&self, granularity: Granularity) -> &VariableSet {
        match granularity {
            Granularity::Hourly => &self.hourly,
            Granularity::Daily => &self.daily,
        }
    }

    /// Full request URL. Times are requested as unix seconds.
    pub fn url(&self, base_url: &str) -> Result<String, WeatherError> {
        let mut url =
            reqwest::Url::parse(base_url).map_err(|e| WeatherError::InvalidUrl(e.to_string()))?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("latitude", &self.latitude.to_string())
                .append_pair("longitude", &self.longitude.to_string());
            if !self.hourly.is_empty() {
                query.append_pair("hourly", &self.hourly.query_value());
            }
            if !self.daily.is_empty() {
                query.append_pair("daily", &self.daily.query_value());
            }
            query
                .append_pair("timezone", &self.timezone)
                .append_pair("timeformat", "unixtime");
        }
        Ok(url.to_string())
    }
}
