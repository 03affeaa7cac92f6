//! Human-readable reports returned to the model.

use std::collections::HashSet;
use std::fmt::Write;

use chrono::NaiveDate;

use crate::provider::{Conditions, Forecast, Sky};

const MISSING: &str = "N/A";

/// Report for `get_current_weather`.
pub fn current_report(city: &str, data: &Conditions) -> String {
    let name = data.name.as_deref().unwrap_or(city);
    let main = &data.main;

    format!(
        "Current weather in {name}:\n\
         - Condition: {}\n\
         - Temperature: {}°C (feels like {}°C)\n\
         - Humidity: {}%\n\
         - Wind Speed: {} m/s\n\
         - Pressure: {} hPa",
        condition(&data.weather),
        value(main.temp),
        value(main.feels_like),
        value(main.humidity),
        value(data.wind.speed),
        value(main.pressure),
    )
}

/// Report for `get_weather_by_coordinates`.
pub fn coordinates_report(latitude: f64, longitude: f64, data: &Conditions) -> String {
    format!(
        "Weather at ({latitude}, {longitude}):\n\
         - Location: {}\n\
         - Condition: {}\n\
         - Temperature: {}°C\n\
         - Humidity: {}%",
        data.name.as_deref().unwrap_or("Unknown"),
        condition(&data.weather),
        value(data.main.temp),
        value(data.main.humidity),
    )
}

/// Report for `get_forecast`: the first entry of each calendar day.
pub fn forecast_report(city: &str, data: &Forecast) -> String {
    let name = data.city.name.as_deref().unwrap_or(city);
    let mut out = format!("5-day forecast for {name}:\n");
    let mut seen: HashSet<NaiveDate> = HashSet::new();

    for entry in &data.list {
        let Some(date) = entry.dt_txt.as_deref().and_then(parse_date) else {
            continue;
        };
        if !seen.insert(date) {
            continue;
        }

        // Writing into a String cannot fail.
        let _ = write!(
            out,
            "\n{}:\n  - {}\n  - Temp: {}°C\n  - Humidity: {}%\n",
            date.format("%Y-%m-%d"),
            condition(&entry.weather),
            value(entry.main.temp),
            value(entry.main.humidity),
        );
    }

    out
}

fn parse_date(dt_txt: &str) -> Option<NaiveDate> {
    let day = dt_txt.split_whitespace().next()?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn condition(sky: &[Sky]) -> String {
    sky.first()
        .and_then(|s| s.description.as_deref())
        .map(title_case)
        .unwrap_or_else(|| MISSING.to_string())
}

fn value(v: Option<f64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_else(|| MISSING.to_string())
}

/// `"light rain"` -> `"Light Rain"`.
fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{ForecastCity, ForecastEntry, Measurements, Wind};

    fn sky(description: &str) -> Vec<Sky> {
        vec![Sky {
            description: Some(description.to_string()),
        }]
    }

    #[test]
    fn current_report_layout() {
        let data = Conditions {
            name: Some("Tokyo".into()),
            weather: sky("scattered clouds"),
            main: Measurements {
                temp: Some(18.5),
                feels_like: Some(17.9),
                humidity: Some(60.0),
                pressure: Some(1012.0),
            },
            wind: Wind { speed: Some(4.1) },
        };

        assert_eq!(
            current_report("tokyo", &data),
            "Current weather in Tokyo:\n\
             - Condition: Scattered Clouds\n\
             - Temperature: 18.5°C (feels like 17.9°C)\n\
             - Humidity: 60%\n\
             - Wind Speed: 4.1 m/s\n\
             - Pressure: 1012 hPa"
        );
    }

    #[test]
    fn missing_fields_render_as_na() {
        let report = current_report("Nowhere", &Conditions::default());
        assert!(report.starts_with("Current weather in Nowhere:"));
        assert!(report.contains("- Condition: N/A"));
        assert!(report.contains("- Temperature: N/A°C (feels like N/A°C)"));

        let report = coordinates_report(1.0, 2.5, &Conditions::default());
        assert!(report.starts_with("Weather at (1, 2.5):"));
        assert!(report.contains("- Location: Unknown"));
    }

    #[test]
    fn forecast_keeps_first_entry_per_day() {
        let entry = |dt: &str, desc: &str, temp: f64| ForecastEntry {
            dt_txt: Some(dt.to_string()),
            weather: sky(desc),
            main: Measurements {
                temp: Some(temp),
                humidity: Some(50.0),
                ..Default::default()
            },
        };
        let data = Forecast {
            city: ForecastCity {
                name: Some("Tokyo".into()),
            },
            list: vec![
                entry("2024-05-01 09:00:00", "clear sky", 21.0),
                entry("2024-05-01 12:00:00", "light rain", 23.0),
                entry("2024-05-02 00:00:00", "light rain", 15.0),
                ForecastEntry::default(),
            ],
        };

        let report = forecast_report("tokyo", &data);
        assert!(report.starts_with("5-day forecast for Tokyo:\n"));
        assert_eq!(report.matches("2024-05-01:").count(), 1);
        assert!(report.contains("2024-05-02:\n  - Light Rain\n  - Temp: 15°C"));
        assert!(report.contains("Clear Sky"));
        assert!(!report.contains("Temp: 23°C"));
    }

    #[test]
    fn title_case_words() {
        assert_eq!(title_case("light RAIN"), "Light Rain");
        assert_eq!(title_case(""), "");
    }
}
