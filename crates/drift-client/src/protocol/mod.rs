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

//! Wire protocol for the drift-prediction simulation service.
//!
//! A simulation run is seeded with the target's last-known position and
//! optionally with boat/drone start positions and time parameters. The
//! service answers with four parallel time-indexed sequences: the predicted
//! target drift track, the boat track, the drone track, and a per-step
//! positional uncertainty (sigma).
//!
//! Responses are validated into a [`DriftPrediction`] before they reach
//! callers; a body that parses as JSON but violates the shape contract
//! (coordinates out of range, negative or non-finite sigma) is rejected.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::LatLon;

/// Shape violations in an otherwise well-formed JSON response.
#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("sigma[{index}] is {value}, expected a non-negative finite value")]
    InvalidSigma { index: usize, value: f64 },
}

/// Request body for `POST /api/simulate`.
///
/// Only the target seed is required; the service fills in default boat and
/// drone start positions and time parameters when they are omitted.
#[derive(Debug, Clone, Serialize)]
pub struct SimulateRequest {
    pub target_lat: f64,
    pub target_lon: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub boat_lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boat_lon: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub drone_lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drone_lon: Option<f64>,

    /// Total simulated time in seconds (service default: 5400).
    #[serde(rename = "T", skip_serializing_if = "Option::is_none")]
    pub total_seconds: Option<u32>,

    /// Simulation step in seconds (service default: 30.0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dt: Option<f64>,
}

impl SimulateRequest {
    /// Request a simulation seeded only with the target's last-known position.
    #[must_use]
    pub fn for_target(seed: LatLon) -> Self {
        Self {
            target_lat: seed.lat,
            target_lon: seed.lon,
            boat_lat: None,
            boat_lon: None,
            drone_lat: None,
            drone_lon: None,
            total_seconds: None,
            dt: None,
        }
    }

    /// Builder method to override the boat start position.
    #[must_use]
    pub fn with_boat_start(mut self, start: LatLon) -> Self {
        self.boat_lat = Some(start.lat);
        self.boat_lon = Some(start.lon);
        self
    }

    /// Builder method to override the drone start position.
    #[must_use]
    pub fn with_drone_start(mut self, start: LatLon) -> Self {
        self.drone_lat = Some(start.lat);
        self.drone_lon = Some(start.lon);
        self
    }
}

/// Raw 200-response body, before shape validation.
#[derive(Debug, Deserialize)]
pub struct SimulateResponse {
    pub target_ll_history: Vec<LatLon>,
    pub boat_ll_history: Vec<LatLon>,
    pub drone_ll_history: Vec<LatLon>,
    pub sigma_history: Vec<f64>,
}

/// A validated simulation result.
///
/// Four parallel time-indexed sequences. A new prediction replaces any prior
/// one wholesale; predictions are never merged.
#[derive(Debug, Clone, PartialEq)]
pub struct DriftPrediction {
    pub target_track: Vec<LatLon>,
    pub boat_track: Vec<LatLon>,
    pub drone_track: Vec<LatLon>,
    pub sigma_history: Vec<f64>,
}

impl DriftPrediction {
    /// Number of simulated time steps (length of the sigma sequence).
    #[must_use]
    pub fn steps(&self) -> usize {
        self.sigma_history.len()
    }
}

impl TryFrom<SimulateResponse> for DriftPrediction {
    type Error = ShapeError;

    fn try_from(raw: SimulateResponse) -> Result<Self, Self::Error> {
        for (index, &value) in raw.sigma_history.iter().enumerate() {
            if !value.is_finite() || value < 0.0 {
                return Err(ShapeError::InvalidSigma { index, value });
            }
        }

        Ok(Self {
            target_track: raw.target_ll_history,
            boat_track: raw.boat_ll_history,
            drone_track: raw.drone_ll_history,
            sigma_history: raw.sigma_history,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Result<DriftPrediction, String> {
        let raw: SimulateResponse = serde_json::from_str(body).map_err(|e| e.to_string())?;
        DriftPrediction::try_from(raw).map_err(|e| e.to_string())
    }

    #[test]
    fn test_request_minimal_body() {
        let request = SimulateRequest::for_target(LatLon::new(47.2736, -2.2139));
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["target_lat"], 47.2736);
        assert_eq!(json["target_lon"], -2.2139);
        // Optional fields stay off the wire so the service applies defaults
        assert!(json.get("boat_lat").is_none());
        assert!(json.get("T").is_none());
        assert!(json.get("dt").is_none());
    }

    #[test]
    fn test_request_with_seed_overrides() {
        let request = SimulateRequest::for_target(LatLon::new(47.0, -2.0))
            .with_boat_start(LatLon::new(47.2886, -2.5367))
            .with_drone_start(LatLon::new(47.2925, -2.5421));
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["boat_lat"], 47.2886);
        assert_eq!(json["drone_lon"], -2.5421);
    }

    #[test]
    fn test_response_parses_into_prediction() {
        let prediction = parse(
            r#"{
                "target_ll_history": [[10.0, 20.0], [11.0, 21.0]],
                "boat_ll_history": [[9.0, 19.0]],
                "drone_ll_history": [],
                "sigma_history": [0.0, 12.5]
            }"#,
        )
        .unwrap();

        assert_eq!(prediction.target_track.len(), 2);
        assert_eq!(prediction.target_track[1], LatLon::new(11.0, 21.0));
        assert_eq!(prediction.boat_track.len(), 1);
        assert!(prediction.drone_track.is_empty());
        assert_eq!(prediction.steps(), 2);
    }

    #[test]
    fn test_response_rejects_missing_field() {
        let result = parse(r#"{"target_ll_history": [], "boat_ll_history": []}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_response_rejects_bad_pair() {
        // Three-element entry is not a [lat, lon] pair
        let result = parse(
            r#"{
                "target_ll_history": [[10.0, 20.0, 30.0]],
                "boat_ll_history": [],
                "drone_ll_history": [],
                "sigma_history": []
            }"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_response_rejects_out_of_range_coordinate() {
        let result = parse(
            r#"{
                "target_ll_history": [[95.0, 20.0]],
                "boat_ll_history": [],
                "drone_ll_history": [],
                "sigma_history": []
            }"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_response_rejects_negative_sigma() {
        let result = parse(
            r#"{
                "target_ll_history": [],
                "boat_ll_history": [],
                "drone_ll_history": [],
                "sigma_history": [1.0, -0.5]
            }"#,
        );
        assert!(result.unwrap_err().contains("sigma[1]"));
    }
}
