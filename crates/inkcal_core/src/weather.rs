//! Weather entity parsing and header formatting.

use crate::model::color::PaperColor;
use log::{debug, warn};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Weather Icons glyph used when a condition is unknown.
const EXCEPTIONAL_ICON: char = '\u{f03b}';

/// Forecast for one day, keyed by `YYYY-MM-DD` in `WeatherInfo::forecast`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayForecast {
    pub date: String,
    pub condition: String,
    pub temperature: f64,
    pub temperature_low: Option<f64>,
    pub wind_speed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherInfo {
    /// Hub condition, e.g. `partlycloudy`.
    pub condition: String,
    pub temperature: f64,
    pub temperature_unit: String,
    pub humidity: f64,
    pub wind_speed: f64,
    pub wind_speed_unit: String,
    /// Degrees clockwise from north.
    pub wind_bearing: Option<f64>,
    pub forecast: BTreeMap<String, DayForecast>,
}

impl WeatherInfo {
    /// Parses a weather entity state object (`{state, attributes}`).
    ///
    /// Returns `None` when the payload is not an object. Missing attributes
    /// fall back to zero / default units.
    pub fn from_state(value: &Value) -> Option<Self> {
        let Some(object) = value.as_object() else {
            warn!("event=weather_parse module=weather status=skipped reason=not_object");
            return None;
        };
        let condition = object
            .get("state")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        let empty = serde_json::Map::new();
        let attributes = object
            .get("attributes")
            .and_then(Value::as_object)
            .unwrap_or(&empty);

        let number = |key: &str| attributes.get(key).and_then(Value::as_f64);
        let text = |key: &str, default: &str| {
            attributes
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or(default)
                .to_string()
        };

        let wind_bearing = attributes
            .get("wind_bearing")
            .or_else(|| attributes.get("wind_direction"))
            .and_then(parse_bearing);

        let mut forecast = BTreeMap::new();
        let items = ["forecast", "forecasts", "daily_forecast"]
            .iter()
            .filter_map(|key| attributes.get(*key).and_then(Value::as_array))
            .find(|items| !items.is_empty());
        for item in items.into_iter().flatten() {
            if let Some(day) = parse_forecast_item(item) {
                forecast.insert(day.date.clone(), day);
            }
        }

        let info = Self {
            condition,
            temperature: number("temperature").unwrap_or(0.0),
            temperature_unit: text("temperature_unit", "°F"),
            humidity: number("humidity").unwrap_or(0.0),
            wind_speed: number("wind_speed").unwrap_or(0.0),
            wind_speed_unit: text("wind_speed_unit", "mph"),
            wind_bearing,
            forecast,
        };
        debug!(
            "event=weather_parse module=weather status=ok condition={} forecast_days={}",
            info.condition,
            info.forecast.len()
        );
        Some(info)
    }

    /// Header text: icon glyph, rounded temperature and unit.
    pub fn header_text(&self) -> String {
        format!(
            "{} {:.0}{}",
            condition_icon(&self.condition),
            self.temperature,
            self.temperature_unit
        )
    }
}

/// Weather Icons font glyph for a hub condition.
pub fn condition_icon(condition: &str) -> char {
    match condition.to_ascii_lowercase().as_str() {
        "clear-night" => '\u{f02e}',
        "cloudy" => '\u{f013}',
        "fog" => '\u{f014}',
        "hail" => '\u{f015}',
        "lightning" => '\u{f016}',
        "lightning-rainy" => '\u{f017}',
        "partlycloudy" => '\u{f002}',
        "pouring" => '\u{f018}',
        "rainy" => '\u{f019}',
        "snowy" => '\u{f01b}',
        "snowy-rainy" => '\u{f01c}',
        "sunny" => '\u{f00d}',
        "windy" | "windy-variant" => '\u{f021}',
        _ => EXCEPTIONAL_ICON,
    }
}

/// Panel color for a condition's icon.
pub fn condition_color(condition: &str) -> PaperColor {
    match condition.to_ascii_lowercase().as_str() {
        "sunny" | "partlycloudy" | "lightning" | "lightning-rainy" => PaperColor::Gold,
        "clear-night" | "rainy" | "pouring" | "snowy" | "snowy-rainy" | "hail" => PaperColor::Blue,
        "exceptional" => PaperColor::Red,
        _ => PaperColor::Black,
    }
}

fn parse_bearing(value: &Value) -> Option<f64> {
    if let Some(degrees) = value.as_f64() {
        return Some(degrees);
    }
    let raw = value.as_str()?.trim().to_ascii_uppercase();
    match raw.as_str() {
        "N" => Some(0.0),
        "NE" => Some(45.0),
        "E" => Some(90.0),
        "SE" => Some(135.0),
        "S" => Some(180.0),
        "SW" => Some(225.0),
        "W" => Some(270.0),
        "NW" => Some(315.0),
        other => other.parse().ok(),
    }
}

fn parse_forecast_item(item: &Value) -> Option<DayForecast> {
    let stamp = item
        .get("date")
        .or_else(|| item.get("datetime"))
        .and_then(Value::as_str)?;
    let date = stamp.split('T').next().unwrap_or(stamp).to_string();
    Some(DayForecast {
        date,
        condition: item
            .get("condition")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string(),
        temperature: item.get("temperature").and_then(Value::as_f64).unwrap_or(0.0),
        temperature_low: item.get("templow").and_then(Value::as_f64),
        wind_speed: item.get("wind_speed").and_then(Value::as_f64).unwrap_or(0.0),
    })
}
