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

//! Async HTTP client for the simulation service.
//!
//! Failures collapse into two categories, handled identically by callers:
//! [`DriftError::Network`] when the request could not complete (connect
//! failure, timeout, non-success status) and [`DriftError::MalformedResponse`]
//! when a 200 body cannot be parsed into the expected shape.

use std::time::Duration;

use log::debug;
use serde::Deserialize;
use thiserror::Error;

use crate::protocol::{DriftPrediction, SimulateRequest, SimulateResponse};

/// Default base URL of a locally run simulation service.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default request timeout. Simulation runs cover 90 minutes of drift at
/// 30-second steps and can take a while on a loaded backend.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Errors produced by [`DriftClient`] calls.
#[derive(Debug, Error)]
pub enum DriftError {
    #[error("network error: {0}")]
    Network(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Configuration for a [`DriftClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service base URL, e.g. `http://localhost:8000`.
    pub base_url: String,
    /// Timeout applied to every request; expiry surfaces as [`DriftError::Network`].
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

/// Client for the drift-prediction simulation service.
#[derive(Debug, Clone)]
pub struct DriftClient {
    http: reqwest::Client,
    base_url: String,
}

impl DriftClient {
    /// Build a client from `config`. Fails only if the underlying HTTP
    /// client cannot be constructed.
    pub fn new(config: ClientConfig) -> Result<Self, DriftError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DriftError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run a drift simulation for the given request.
    ///
    /// The call suspends until the service answers or the timeout expires.
    pub async fn simulate(&self, request: &SimulateRequest) -> Result<DriftPrediction, DriftError> {
        let url = format!("{}/api/simulate", self.base_url);
        debug!(
            "Requesting simulation for target ({}, {})",
            request.target_lat, request.target_lon
        );

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| DriftError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DriftError::Network(format!("HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| DriftError::Network(e.to_string()))?;

        let raw: SimulateResponse =
            serde_json::from_str(&body).map_err(|e| DriftError::MalformedResponse(e.to_string()))?;

        let prediction =
            DriftPrediction::try_from(raw).map_err(|e| DriftError::MalformedResponse(e.to_string()))?;

        debug!("Simulation returned {} steps", prediction.steps());
        Ok(prediction)
    }

    /// Probe `GET /api/health`. Used once at startup to report backend
    /// reachability; callers treat failure as advisory.
    pub async fn health(&self) -> Result<(), DriftError> {
        let url = format!("{}/api/health", self.base_url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| DriftError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DriftError::Network(format!("HTTP {status}")));
        }

        let health: HealthResponse = response
            .json()
            .await
            .map_err(|e| DriftError::MalformedResponse(e.to_string()))?;

        if health.status == "ok" {
            Ok(())
        } else {
            Err(DriftError::MalformedResponse(format!(
                "unexpected health status {:?}",
                health.status
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_normalized() {
        let client = DriftClient::new(ClientConfig {
            base_url: "http://localhost:8000/".to_string(),
            ..ClientConfig::default()
        })
        .unwrap();

        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        // Reserved TEST-NET-1 address, nothing listens there
        let client = DriftClient::new(ClientConfig {
            base_url: "http://192.0.2.1:9".to_string(),
            timeout: Duration::from_millis(250),
        })
        .unwrap();

        let seed = crate::geo::LatLon::new(47.0, -2.0);
        let result = client.simulate(&SimulateRequest::for_target(seed)).await;
        assert!(matches!(result, Err(DriftError::Network(_))));
    }
}
