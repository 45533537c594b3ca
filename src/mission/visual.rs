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

//! Renderable model of a drift prediction.
//!
//! [`RenderSet::from_prediction`] is a pure derivation: same prediction in,
//! same render set out, no other inputs. The map painter consumes the set
//! without knowing anything about the wire format.

use drift_client::{DriftPrediction, LatLon};
use egui::Color32;

/// Which simulated entity a polyline or marker belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Target,
    Boat,
    Drone,
}

impl TrackKind {
    /// Fixed per-track display color.
    #[must_use]
    pub const fn color(self) -> Color32 {
        match self {
            Self::Target => Color32::from_rgb(0x32, 0xa8, 0xa8), // teal
            Self::Boat => Color32::from_rgb(0x00, 0x66, 0xff),   // blue
            Self::Drone => Color32::from_rgb(0x00, 0xff, 0x00),  // green
        }
    }

    /// Human-readable name for legends and logs.
    #[allow(dead_code)]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Target => "Target",
            Self::Boat => "Boat",
            Self::Drone => "Drone",
        }
    }
}

/// A time-ordered path for one track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackPolyline {
    pub kind: TrackKind,
    pub points: Vec<LatLon>,
}

/// "Current position" dot at the final point of a non-empty track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrentPositionMarker {
    pub kind: TrackKind,
    pub position: LatLon,
}

/// Everything the map painter draws for a prediction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderSet {
    pub polylines: Vec<TrackPolyline>,
    pub markers: Vec<CurrentPositionMarker>,
}

impl RenderSet {
    /// Derive the render set for `prediction`.
    ///
    /// With a prediction: one polyline per track (possibly empty) and a
    /// current-position marker at the last point of each track that has one.
    /// Without: an empty set.
    #[must_use]
    pub fn from_prediction(prediction: Option<&DriftPrediction>) -> Self {
        let Some(prediction) = prediction else {
            return Self::default();
        };

        let tracks = [
            (TrackKind::Target, &prediction.target_track),
            (TrackKind::Boat, &prediction.boat_track),
            (TrackKind::Drone, &prediction.drone_track),
        ];

        let mut set = Self::default();
        for (kind, track) in tracks {
            set.polylines.push(TrackPolyline {
                kind,
                points: track.clone(),
            });
            if let Some(&last) = track.last() {
                set.markers.push(CurrentPositionMarker {
                    kind,
                    position: last,
                });
            }
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction() -> DriftPrediction {
        DriftPrediction {
            target_track: vec![LatLon::new(10.0, 20.0), LatLon::new(11.0, 21.0)],
            boat_track: vec![LatLon::new(9.0, 19.0)],
            drone_track: vec![],
            sigma_history: vec![0.5, 1.0],
        }
    }

    #[test]
    fn test_no_prediction_yields_empty_set() {
        let set = RenderSet::from_prediction(None);
        assert!(set.polylines.is_empty());
        assert!(set.markers.is_empty());
    }

    #[test]
    fn test_marker_sits_at_last_track_point() {
        let set = RenderSet::from_prediction(Some(&prediction()));

        let target_marker = set
            .markers
            .iter()
            .find(|m| m.kind == TrackKind::Target)
            .unwrap();
        assert_eq!(target_marker.position, LatLon::new(11.0, 21.0));
    }

    #[test]
    fn test_empty_track_gets_polyline_but_no_marker() {
        let set = RenderSet::from_prediction(Some(&prediction()));

        assert_eq!(set.polylines.len(), 3);
        let drone_line = set
            .polylines
            .iter()
            .find(|p| p.kind == TrackKind::Drone)
            .unwrap();
        assert!(drone_line.points.is_empty());

        assert_eq!(set.markers.len(), 2);
        assert!(!set.markers.iter().any(|m| m.kind == TrackKind::Drone));
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let p = prediction();
        assert_eq!(
            RenderSet::from_prediction(Some(&p)),
            RenderSet::from_prediction(Some(&p))
        );
    }

    #[test]
    fn test_track_colors_are_fixed() {
        assert_eq!(TrackKind::Target.color(), Color32::from_rgb(50, 168, 168));
        assert_eq!(TrackKind::Boat.color(), Color32::from_rgb(0, 102, 255));
        assert_eq!(TrackKind::Drone.color(), Color32::from_rgb(0, 255, 0));
    }
}
