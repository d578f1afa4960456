//! `lightstudio_v1` share documents: a named event list exchanged between
//! app installs.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{event::Event, Result, ShowError};

pub const SHARE_FORMAT: &str = "lightstudio_v1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowFile {
    #[serde(rename = "_format", alias = "format")]
    pub format: String,
    #[serde(default)]
    pub name: String,
    pub events: Vec<Event>,
}

impl ShowFile {
    pub fn new(name: impl Into<String>, events: Vec<Event>) -> Self {
        Self {
            format: SHARE_FORMAT.to_string(),
            name: name.into(),
            events,
        }
    }

    /// Parses and validates a share document.
    pub fn from_json(raw: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(raw)?;
        let tag = value
            .get("_format")
            .or_else(|| value.get("format"))
            .and_then(serde_json::Value::as_str);
        if tag != Some(SHARE_FORMAT) {
            return Err(ShowError::InvalidShowFile(format!(
                "expected format `{SHARE_FORMAT}`"
            )));
        }
        if !value.get("events").is_some_and(serde_json::Value::is_array) {
            return Err(ShowError::InvalidShowFile("`events` must be an array".into()));
        }

        let show: ShowFile = serde_json::from_value(value)?;
        if show.events.is_empty() {
            return Err(ShowError::InvalidShowFile("show contains no events".into()));
        }
        Ok(show)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn read_from(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path.as_ref())?)
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        Ok(())
    }

    /// File name derived from the show name, safe on every platform.
    pub fn file_name(&self) -> String {
        if self.name.is_empty() {
            return "lightshow.json".to_string();
        }
        let stem: String = self
            .name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("{stem}.json")
    }
}

/// Accepts either a share document or a bare JSON array of events.
pub fn parse_event_list(raw: &str) -> Result<Vec<Event>> {
    if raw.trim_start().starts_with('[') {
        return Ok(serde_json::from_str(raw)?);
    }
    Ok(ShowFile::from_json(raw)?.events)
}
