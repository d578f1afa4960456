use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::Result;

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub export: ExportConfig,
}

impl AppConfig {
    /// Reads a JSON configuration file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Configuration specific to sequence export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportConfig {
    pub file_name: String,
    /// Value written into the header's unique id slot. When unset the current
    /// wall clock time in milliseconds is used.
    pub unique_id: Option<u64>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: "lightshow.fseq".to_string(),
            unique_id: None,
        }
    }
}

impl ExportConfig {
    /// Resolves the unique id to embed in the next exported sequence.
    pub fn resolve_unique_id(&self) -> u64 {
        self.unique_id.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|elapsed| elapsed.as_millis() as u64)
                .unwrap_or_default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"export":{"uniqueId":7}}"#).unwrap();
        assert_eq!(config.export.file_name, "lightshow.fseq");
        assert_eq!(config.export.unique_id, Some(7));
        assert_eq!(config.export.resolve_unique_id(), 7);
    }

    #[test]
    fn empty_document_is_default() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn load_reports_missing_files() {
        let err = AppConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, crate::ShowError::Io(_)));
    }
}
