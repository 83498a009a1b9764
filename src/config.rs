use std::path::PathBuf;

use chrono::NaiveDate;

use crate::model::Period;

/// Runtime settings, read once from `SLOTDESK_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_path: PathBuf,
    /// Day shown in the slot grid; `None` means today.
    pub date: Option<NaiveDate>,
    pub period: Period,
    pub metrics_port: Option<u16>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("./slotdesk.json"),
            date: None,
            period: Period::Week,
            metrics_port: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unparsable values fall back to defaults.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            data_path: get("SLOTDESK_DATA")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            date: get("SLOTDESK_DATE")
                .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()),
            period: get("SLOTDESK_PERIOD")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.period),
            metrics_port: get("SLOTDESK_METRICS_PORT").and_then(|s| s.parse().ok()),
        }
    }
}
