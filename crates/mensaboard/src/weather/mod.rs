//! Weather forecast pipeline.
//!
//! One forecast call returns hourly and daily blocks. Each block is decoded
//! positionally against the variables it was requested with and reshaped
//! into a [`TimeTable`].

pub mod axis;
pub mod partition;
pub mod request;
pub mod response;
pub mod table;

use serde::Serialize;

pub use axis::{Granularity, TimeAxis};
pub use partition::{partition, ChartGroups};
pub use request::{ForecastRequest, RequestedVariable, VariableSet};
pub use response::{parse_forecast, DecodeError, ForecastResponse, VariablesBlock};
pub use table::{ReshapeError, TimeSeriesVariable, TimeTable};

use crate::config::WeatherConfig;
use crate::transport::{fetch_json, Fetch, FetchError};

#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("invalid forecast URL: {0}")]
    InvalidUrl(String),

    #[error("malformed forecast: {0}")]
    Decode(#[from] DecodeError),

    #[error("response has no {0} block")]
    MissingBlock(Granularity),

    #[error("{granularity} table: {source}")]
    Reshape {
        granularity: Granularity,
        #[source]
        source: ReshapeError,
    },
}

/// Hourly and daily tables for one point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: Option<f64>,
    pub timezone: String,
    pub timezone_abbreviation: String,
    pub utc_offset_seconds: i64,
    pub hourly: TimeTable,
    pub daily: TimeTable,
}

/// Fetch the forecast described by `config` and build both tables.
pub async fn fetch_forecast<F: Fetch + ?Sized>(
    fetcher: &F,
    config: &WeatherConfig,
) -> Result<Forecast, WeatherError> {
    let request = ForecastRequest::from_config(config);
    let url = request.url(&config.base_url)?;
    let body = fetch_json(fetcher, &url).await?;
    let response = parse_forecast(&body)?;

    log::info!(
        "forecast for ({:.4}, {:.4}) {} {}, utc offset {}s",
        response.latitude,
        response.longitude,
        response.timezone,
        response.timezone_abbreviation,
        response.utc_offset_seconds
    );
    build_forecast(&response, &request)
}

/// Decode both blocks of `response` against `request` and reshape them.
pub fn build_forecast(
    response: &ForecastResponse,
    request: &ForecastRequest,
) -> Result<Forecast, WeatherError> {
    Ok(Forecast {
        latitude: response.latitude,
        longitude: response.longitude,
        elevation: response.elevation,
        timezone: response.timezone.clone(),
        timezone_abbreviation: response.timezone_abbreviation.clone(),
        utc_offset_seconds: response.utc_offset_seconds,
        hourly: build_table(response, request, Granularity::Hourly)?,
        daily: build_table(response, request, Granularity::Daily)?,
    })
}

fn build_table(
    response: &ForecastResponse,
    request: &ForecastRequest,
    granularity: Granularity,
) -> Result<TimeTable, WeatherError> {
    let block = response
        .block(granularity)
        .ok_or(WeatherError::MissingBlock(granularity))?;
    let columns = block.decode(request.variables(granularity))?;
    TimeTable::reshape(block.axis, granularity, columns).map_err(|source| {
        WeatherError::Reshape {
            granularity,
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::StaticFetcher;
    use serde_json::json;

    const MIDNIGHT: i64 = 1_715_558_400;

    fn small_config() -> WeatherConfig {
        WeatherConfig {
            base_url: "http://weather.test/v1/forecast".into(),
            hourly: vec!["temperature_2m".into(), "precipitation".into()],
            daily: vec!["temperature_2m_max".into()],
            ..WeatherConfig::default()
        }
    }

    fn response_body(hourly_rain: Vec<f64>) -> serde_json::Value {
        json!({
            "latitude": 52.26,
            "longitude": 10.52,
            "timezone": "Europe/Berlin",
            "timezone_abbreviation": "CEST",
            "utc_offset_seconds": 7200,
            "hourly": {
                "time": [MIDNIGHT - 7200, MIDNIGHT - 3600],
                "temperature_2m": [11.0, 10.5],
                "precipitation": hourly_rain
            },
            "daily": {
                "time": [MIDNIGHT - 7200],
                "temperature_2m_max": [19.0]
            }
        })
    }

    fn fetcher_for(config: &WeatherConfig, body: serde_json::Value) -> StaticFetcher {
        let url = ForecastRequest::from_config(config)
            .url(&config.base_url)
            .unwrap();
        StaticFetcher::new().with(&url, &body.to_string())
    }

    #[tokio::test]
    async fn fetch_builds_both_tables() {
        let config = small_config();
        let fetcher = fetcher_for(&config, response_body(vec![0.0, 0.2]));
        let forecast = fetch_forecast(&fetcher, &config).await.unwrap();

        assert_eq!(forecast.hourly.names(), ["temperature_2m", "precipitation"]);
        assert_eq!(forecast.hourly.timestamps, vec![MIDNIGHT, MIDNIGHT + 3600]);
        assert_eq!(forecast.daily.names(), ["temperature_2m_max"]);
        assert_eq!(forecast.daily.timestamps, vec![MIDNIGHT]);
        assert_eq!(forecast.timezone_abbreviation, "CEST");
    }

    #[tokio::test]
    async fn misaligned_variable_fails_the_table() {
        let config = small_config();
        let fetcher = fetcher_for(&config, response_body(vec![0.0]));
        let err = fetch_forecast(&fetcher, &config).await.unwrap_err();
        assert!(
            matches!(
                err,
                WeatherError::Reshape {
                    granularity: Granularity::Hourly,
                    source: ReshapeError::LengthMismatch { .. }
                }
            ),
            "got {err:?}"
        );
    }

    #[test]
    fn missing_block_is_reported() {
        let config = small_config();
        let mut body = response_body(vec![0.0, 0.1]);
        body.as_object_mut().unwrap().remove("daily");
        let response = parse_forecast(&body).unwrap();
        let err = build_forecast(&response, &ForecastRequest::from_config(&config)).unwrap_err();
        assert!(matches!(err, WeatherError::MissingBlock(Granularity::Daily)));
    }

    #[test]
    fn daily_table_survives_spring_forward_week() {
        // Europe/Berlin local midnights 2025-03-28 ..= 2025-04-03; clocks go
        // forward on 03-30, the response offset is the CET one.
        const CET_MIDNIGHT: i64 = 1_743_116_400;
        const CEST_MIDNIGHT: i64 = 1_743_372_000;
        let body = json!({
            "latitude": 52.26,
            "longitude": 10.52,
            "timezone": "Europe/Berlin",
            "timezone_abbreviation": "CET",
            "utc_offset_seconds": 3600,
            "hourly": {
                "time": [CET_MIDNIGHT, CET_MIDNIGHT + 3600, CET_MIDNIGHT + 7200],
                "temperature_2m": [4.0, 3.5, 3.1],
                "precipitation": [0.0, 0.0, 0.1]
            },
            "daily": {
                "time": [
                    CET_MIDNIGHT,
                    CET_MIDNIGHT + 86_400,
                    CET_MIDNIGHT + 2 * 86_400,
                    CEST_MIDNIGHT,
                    CEST_MIDNIGHT + 86_400,
                    CEST_MIDNIGHT + 2 * 86_400,
                    CEST_MIDNIGHT + 3 * 86_400
                ],
                "temperature_2m_max": [11.0, 12.5, 9.0, 10.0, 13.5, 15.0, 14.0]
            }
        });

        let config = small_config();
        let response = parse_forecast(&body).unwrap();
        let forecast = build_forecast(&response, &ForecastRequest::from_config(&config)).unwrap();

        // 2025-03-28 00:00 local, expressed as naive epoch seconds
        let first_day = CET_MIDNIGHT + 3600;
        let expected: Vec<i64> = (0..7).map(|d| first_day + d * 86_400).collect();
        assert_eq!(forecast.daily.timestamps, expected);
        assert_eq!(forecast.daily.label(0).unwrap(), "Fri 28.03.");
        assert_eq!(forecast.daily.label(6).unwrap(), "Thu 03.04.");
        assert_eq!(
            forecast.daily.variable("temperature_2m_max").unwrap().values[6],
            14.0
        );
        assert_eq!(forecast.hourly.len(), 3);
    }
}
