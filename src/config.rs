use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io;
use std::path::Path;

/// Settings for creating calendars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Leading segment of generated calendar ids.
    pub id_namespace: String,
    /// Name segment used when a calendar name sanitizes to nothing.
    pub fallback_name: String,
    /// Display name given to calendars created from scratch.
    pub custom_calendar_name: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            id_namespace: "calendar".to_string(),
            fallback_name: "calendar".to_string(),
            custom_calendar_name: "Custom calendar".to_string(),
        }
    }
}

impl CatalogConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        serde_json::from_reader(file).map_err(io::Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: CatalogConfig = serde_json::from_str(r#"{"id_namespace":"cal"}"#).unwrap();
        assert_eq!(config.id_namespace, "cal");
        assert_eq!(config.fallback_name, "calendar");
    }
}
