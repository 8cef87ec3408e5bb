use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Environment variable holding the map SDK app key.
pub const API_KEY_ENV: &str = "KAKAO_MAP_APP_KEY";
pub const DEFAULT_SDK_BASE_URL: &str = "https://dapi.kakao.com/v2/maps/sdk.js";
pub const DEFAULT_DETAIL_BASE_URL: &str = "/detail";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub api_key: Option<String>,
    pub sdk_base_url: String,
    /// Prefix of the external detail view linked from info windows.
    pub detail_base_url: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            sdk_base_url: DEFAULT_SDK_BASE_URL.to_string(),
            detail_base_url: DEFAULT_DETAIL_BASE_URL.to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, EngineError> {
        serde_json::from_str(raw).map_err(|e| EngineError::Config(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self, EngineError> {
        let raw = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("read {path:?}: {e}")))?;
        Self::from_json_str(&raw)
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        Self::default().with_env(|k| std::env::var(k).ok())
    }

    /// Overrides the API key from `lookup(API_KEY_ENV)` when it is non-blank.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn credential(&self) -> Result<&str, EngineError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(EngineError::MissingCredential)
    }

    /// SDK script URL. Autoload is disabled so readiness is signalled
    /// explicitly by the SDK's load callback.
    pub fn sdk_script_url(&self) -> Result<String, EngineError> {
        let key = self.credential()?;
        Ok(format!("{}?appkey={key}&autoload=false", self.sdk_base_url))
    }
}
