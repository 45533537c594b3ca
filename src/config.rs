// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Application configuration management.
//!
//! Persistent TOML configuration via confy: simulation backend location,
//! request timeout, and UI preferences. Every field carries a serde default
//! so configs written by older versions keep loading.

use serde::{Deserialize, Serialize};

/// Default base URL of the simulation backend.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

const APP_NAME: &str = "seahawk-desktop";
const CONFIG_NAME: &str = "config";

/// Application configuration stored in TOML format.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    /// Simulation backend base URL
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Simulation request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Map zoom level at startup
    #[serde(default = "default_zoom")]
    pub default_zoom: f32,

    /// Show the uncertainty (sigma) plot window
    #[serde(default = "default_true")]
    pub show_uncertainty_window: bool,
}

// Default value functions for serde
fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_zoom() -> f32 {
    13.0
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            request_timeout_secs: default_request_timeout_secs(),
            default_zoom: default_zoom(),
            show_uncertainty_window: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from disk, creating defaults on first run.
    pub fn load() -> Result<Self, confy::ConfyError> {
        confy::load(APP_NAME, CONFIG_NAME)
    }

    /// Save configuration to disk.
    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store(APP_NAME, CONFIG_NAME, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config: AppConfig =
            serde_json::from_str(r#"{"backend_url": "http://sim.local:9000"}"#).unwrap();

        assert_eq!(config.backend_url, "http://sim.local:9000");
        assert_eq!(config.request_timeout_secs, 120);
        assert_eq!(config.default_zoom, 13.0);
        assert!(config.show_uncertainty_window);
    }
}
