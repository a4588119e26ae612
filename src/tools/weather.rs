//! Current-temperature lookup backed by Open-Meteo.

use crate::config::WeatherSettings;
use crate::error::{AgentDeskError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, instrument};

/// Temperature unit accepted by `get_weather`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TempUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TempUnit {
    /// Short code used in arguments and config (`c` / `f`).
    pub fn code(self) -> &'static str {
        match self {
            TempUnit::Celsius => "c",
            TempUnit::Fahrenheit => "f",
        }
    }

    /// Label reported back to the model.
    pub fn label(self) -> &'static str {
        match self {
            TempUnit::Celsius => "°C",
            TempUnit::Fahrenheit => "°F",
        }
    }

    /// Convert a Celsius reading into this unit.
    pub fn from_celsius(self, celsius: f64) -> f64 {
        match self {
            TempUnit::Celsius => celsius,
            TempUnit::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
        }
    }
}

impl FromStr for TempUnit {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "c" => Ok(TempUnit::Celsius),
            "f" => Ok(TempUnit::Fahrenheit),
            _ => Err(format!("unknown temperature unit '{}', expected c or f", s)),
        }
    }
}

impl TryFrom<String> for TempUnit {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TempUnit> for String {
    fn from(unit: TempUnit) -> Self {
        unit.code().to_string()
    }
}

impl fmt::Display for TempUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A temperature reading for a resolved place.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReading {
    pub celsius: f64,
    /// Canonical place name, e.g. "Miami, Florida, United States".
    pub resolved_name: String,
}

/// Source of current temperature readings.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Resolve `location` and fetch its current temperature in Celsius.
    async fn current_temperature(&self, location: &str) -> Result<WeatherReading>;
}

/// Build the `get_weather` result payload.
pub fn weather_payload(reading: &WeatherReading, unit: TempUnit) -> Value {
    json!({
        "location": reading.resolved_name,
        "temperature": round_one_decimal(unit.from_celsius(reading.celsius)),
        "unit": unit.label(),
        "source": "open-meteo"
    })
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Open-Meteo geocoding + forecast client.
pub struct OpenMeteoClient {
    http: reqwest::Client,
    geocoding_url: String,
    forecast_url: String,
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<Place>,
}

#[derive(Debug, Deserialize)]
struct Place {
    name: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    admin1: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

impl Place {
    fn display_name(&self) -> String {
        [Some(&self.name), self.admin1.as_ref(), self.country.as_ref()]
            .into_iter()
            .flatten()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current_weather: CurrentWeather,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temperature: f64,
}

impl OpenMeteoClient {
    /// Create a client from settings.
    pub fn new(settings: &WeatherSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            geocoding_url: settings.geocoding_url.clone(),
            forecast_url: settings.forecast_url.clone(),
        })
    }

    async fn geocode(&self, location: &str) -> Result<Place> {
        let response: GeocodingResponse = self
            .http
            .get(&self.geocoding_url)
            .query(&[("name", location), ("count", "1")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| AgentDeskError::Weather(format!("Location not found: {}", location)))
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoClient {
    #[instrument(skip(self))]
    async fn current_temperature(&self, location: &str) -> Result<WeatherReading> {
        let place = self.geocode(location).await?;
        debug!("Resolved {} to {}, {}", location, place.latitude, place.longitude);

        let latitude = place.latitude.to_string();
        let longitude = place.longitude.to_string();
        let forecast: ForecastResponse = self
            .http
            .get(&self.forecast_url)
            .query(&[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("current_weather", "true"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(WeatherReading {
            celsius: forecast.current_weather.temperature,
            resolved_name: place.display_name(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(celsius: f64) -> WeatherReading {
        WeatherReading {
            celsius,
            resolved_name: "Chennai, Tamil Nadu, India".to_string(),
        }
    }

    #[test]
    fn test_fahrenheit_conversion() {
        let payload = weather_payload(&reading(20.0), TempUnit::Fahrenheit);
        assert_eq!(payload["temperature"], 68.0);
        assert_eq!(payload["unit"], "°F");
    }

    #[test]
    fn test_celsius_rounds_to_one_decimal() {
        let payload = weather_payload(&reading(31.46), TempUnit::Celsius);
        assert_eq!(payload["temperature"], 31.5);
        assert_eq!(payload["unit"], "°C");
        assert_eq!(payload["location"], "Chennai, Tamil Nadu, India");
    }

    #[test]
    fn test_unit_parsing() {
        assert_eq!("F".parse::<TempUnit>().unwrap(), TempUnit::Fahrenheit);
        assert_eq!(" c ".parse::<TempUnit>().unwrap(), TempUnit::Celsius);
        assert!("kelvin".parse::<TempUnit>().is_err());
    }

    #[test]
    fn test_place_display_name_skips_blank_parts() {
        let place = Place {
            name: "Miami".to_string(),
            latitude: 25.77,
            longitude: -80.19,
            admin1: Some(" ".to_string()),
            country: Some("United States".to_string()),
        };
        assert_eq!(place.display_name(), "Miami, United States");
    }
}
