//! Site registry: the fixed list of locations to download.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Deserializer};

/// A location to extract time series for, read from the registry file.
#[derive(Debug, Clone, Deserialize)]
pub struct Site {
    pub name: String,
    pub lon: f64,
    pub lat: f64,
    pub start: NaiveDate,
    /// Omitted or `"today"` in the registry resolves to the current date.
    #[serde(default = "today", deserialize_with = "date_or_today")]
    pub end: NaiveDate,
}

/// Loads the registry from a JSON file, preserving file order.
pub fn load(path: &Path) -> Result<Vec<Site>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading site registry `{}`", path.display()))?;
    let sites: Vec<Site> = serde_json::from_str(&text)
        .with_context(|| format!("parsing site registry `{}`", path.display()))?;

    Ok(sites)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn date_or_today<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if raw == "today" {
        return Ok(today());
    }

    NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(serde::de::Error::custom)
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn should_parse_registry() {
        let json = r#"[
            { "name": "Alice", "lon": 130.0, "lat": -20.0, "start": "2016-01-01", "end": "2021-03-01" },
            { "name": "Bob", "lon": 140.0, "lat": -30.0, "start": "2017-06-15" }
        ]"#;
        let sites: Vec<Site> = serde_json::from_str(json).unwrap();

        assert_eq!(sites.len(), 2);
        assert_eq!(sites[0].name, "Alice");
        assert_eq!(sites[0].lon, 130.0);
        assert_eq!(sites[0].lat, -20.0);
        assert_eq!(sites[0].start, NaiveDate::from_ymd_opt(2016, 1, 1).unwrap());
        assert_eq!(sites[0].end, NaiveDate::from_ymd_opt(2021, 3, 1).unwrap());
    }

    #[test]
    fn should_default_missing_end_to_today() {
        let json = r#"[{ "name": "Bob", "lon": 140.0, "lat": -30.0, "start": "2017-06-15" }]"#;
        let sites: Vec<Site> = serde_json::from_str(json).unwrap();

        assert_eq!(sites[0].end, Local::now().date_naive());
    }

    #[test]
    fn should_accept_literal_today_as_end() {
        let json =
            r#"[{ "name": "Bob", "lon": 140.0, "lat": -30.0, "start": "2017-06-15", "end": "today" }]"#;
        let sites: Vec<Site> = serde_json::from_str(json).unwrap();

        assert_eq!(sites[0].end, Local::now().date_naive());
    }

    #[test]
    fn should_preserve_registry_order() {
        let json = r#"[
            { "name": "Charlie", "lon": 1.0, "lat": 1.0, "start": "2020-01-01" },
            { "name": "Alice", "lon": 2.0, "lat": 2.0, "start": "2020-01-01" },
            { "name": "Bob", "lon": 3.0, "lat": 3.0, "start": "2020-01-01" }
        ]"#;
        let sites: Vec<Site> = serde_json::from_str(json).unwrap();
        let names: Vec<&str> = sites.iter().map(|s| s.name.as_str()).collect();

        assert_eq!(names, vec!["Charlie", "Alice", "Bob"]);
    }

    #[test]
    fn should_reject_malformed_date() {
        let json = r#"[{ "name": "X", "lon": 1.0, "lat": 2.0, "start": "01/02/2016" }]"#;

        assert!(serde_json::from_str::<Vec<Site>>(json).is_err());
    }

    #[test]
    fn should_load_registry_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{ "name": "Alice", "lon": 130.0, "lat": -20.0, "start": "2016-01-01" }}]"#
        )
        .unwrap();

        let sites = load(file.path()).unwrap();

        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].name, "Alice");
    }

    #[test]
    fn should_report_missing_registry_file() {
        let err = load(Path::new("no-such-registry.json")).unwrap_err();

        assert!(err.to_string().contains("no-such-registry.json"));
    }
}
