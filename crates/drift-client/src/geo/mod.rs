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

//! Geographic value types shared between the wire protocol and map code.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error produced when a wire coordinate is outside the valid degree ranges.
#[derive(Debug, Error)]
#[error("coordinate out of range: ({lat}, {lon})")]
pub struct InvalidCoordinate {
    pub lat: f64,
    pub lon: f64,
}

/// A WGS-84 coordinate in decimal degrees.
///
/// On the wire this is a two-element `[lat, lon]` array, matching the
/// simulation service's track histories. Deserialization rejects
/// non-finite values and values outside lat ∈ [-90, 90], lon ∈ [-180, 180].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "[f64; 2]", try_from = "[f64; 2]")]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Whether this coordinate lies inside the valid degree ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl From<LatLon> for [f64; 2] {
    fn from(ll: LatLon) -> Self {
        [ll.lat, ll.lon]
    }
}

impl TryFrom<[f64; 2]> for LatLon {
    type Error = InvalidCoordinate;

    fn try_from(pair: [f64; 2]) -> Result<Self, Self::Error> {
        let ll = Self::new(pair[0], pair[1]);
        if ll.is_valid() {
            Ok(ll)
        } else {
            Err(InvalidCoordinate {
                lat: pair[0],
                lon: pair[1],
            })
        }
    }
}

/// Axis-aligned bounding box over coordinates.
///
/// Built by accumulating points; degenerate (single-point) boxes are valid.
/// Longitude is treated as linear, which is fine for the regional extents
/// a rescue mission covers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl GeoBounds {
    /// Bounding box of a point set. Returns `None` for an empty set.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a LatLon>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self {
            south: first.lat,
            west: first.lon,
            north: first.lat,
            east: first.lon,
        };
        for point in iter {
            bounds.extend(*point);
        }
        Some(bounds)
    }

    /// Grow the box to include `point`.
    pub fn extend(&mut self, point: LatLon) {
        self.south = self.south.min(point.lat);
        self.west = self.west.min(point.lon);
        self.north = self.north.max(point.lat);
        self.east = self.east.max(point.lon);
    }

    /// Midpoint of the box.
    #[must_use]
    pub fn center(&self) -> LatLon {
        LatLon::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    /// Whether `point` lies inside the box (edges inclusive).
    #[must_use]
    pub fn contains(&self, point: LatLon) -> bool {
        (self.south..=self.north).contains(&point.lat)
            && (self.west..=self.east).contains(&point.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latlon_wire_format_is_pair() {
        let ll = LatLon::new(47.25, -2.21);
        let json = serde_json::to_string(&ll).unwrap();
        assert_eq!(json, "[47.25,-2.21]");

        let parsed: LatLon = serde_json::from_str("[10.0, 20.0]").unwrap();
        assert_eq!(parsed, LatLon::new(10.0, 20.0));
    }

    #[test]
    fn test_latlon_rejects_out_of_range() {
        assert!(serde_json::from_str::<LatLon>("[91.0, 0.0]").is_err());
        assert!(serde_json::from_str::<LatLon>("[0.0, 181.0]").is_err());
        assert!(serde_json::from_str::<LatLon>("[-90.5, 0.0]").is_err());
    }

    #[test]
    fn test_latlon_validity() {
        assert!(LatLon::new(90.0, 180.0).is_valid());
        assert!(LatLon::new(-90.0, -180.0).is_valid());
        assert!(!LatLon::new(f64::NAN, 0.0).is_valid());
        assert!(!LatLon::new(0.0, 200.0).is_valid());
    }

    #[test]
    fn test_bounds_from_points() {
        let points = [
            LatLon::new(47.0, -2.0),
            LatLon::new(48.0, -3.0),
            LatLon::new(47.5, -1.5),
        ];
        let bounds = GeoBounds::from_points(points.iter()).unwrap();
        assert_eq!(bounds.south, 47.0);
        assert_eq!(bounds.north, 48.0);
        assert_eq!(bounds.west, -3.0);
        assert_eq!(bounds.east, -1.5);
        assert_eq!(bounds.center(), LatLon::new(47.5, -2.25));
        assert!(bounds.contains(LatLon::new(47.2, -2.9)));
        assert!(!bounds.contains(LatLon::new(46.9, -2.0)));
    }

    #[test]
    fn test_bounds_empty_and_single() {
        let empty: [LatLon; 0] = [];
        assert!(GeoBounds::from_points(empty.iter()).is_none());

        let single = [LatLon::new(47.0, -2.0)];
        let bounds = GeoBounds::from_points(single.iter()).unwrap();
        assert_eq!(bounds.center(), LatLon::new(47.0, -2.0));
    }
}
