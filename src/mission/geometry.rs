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

//! Operator-placed mission geometry.
//!
//! The store owns two collections: last-known positions (the seeds for drift
//! simulations, labeled "LKP n" in placement order) and committed search-area
//! polygons. Positions are append-only and never mutated. Polygons enter the
//! store only through [`GeometryStore::commit_area`], which enforces the
//! minimum vertex count, so the store never holds a polygon with fewer than
//! three vertices.

use drift_client::{GeoBounds, LatLon};

/// Minimum vertex count for a committable search area.
pub const MIN_AREA_VERTICES: usize = 3;

/// A last-known position of the search target.
///
/// `index` is the zero-based placement ordinal; the display label is
/// one-based.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LastKnownPosition {
    pub index: usize,
    pub position: LatLon,
}

impl LastKnownPosition {
    /// Display label, e.g. `"LKP 1"` for the first placed position.
    #[must_use]
    pub fn label(&self) -> String {
        format!("LKP {}", self.index + 1)
    }
}

/// An operator-drawn focus polygon, immutable once committed.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchArea {
    vertices: Vec<LatLon>,
}

impl SearchArea {
    /// Polygon vertices in draw order. Always at least [`MIN_AREA_VERTICES`].
    #[must_use]
    pub fn vertices(&self) -> &[LatLon] {
        &self.vertices
    }
}

/// Store for all operator-placed geometry.
#[derive(Debug, Default)]
pub struct GeometryStore {
    positions: Vec<LastKnownPosition>,
    areas: Vec<SearchArea>,
}

impl GeometryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a last-known position with the next ordinal index.
    pub fn add_position(&mut self, position: LatLon) -> &LastKnownPosition {
        self.positions.push(LastKnownPosition {
            index: self.positions.len(),
            position,
        });
        self.positions
            .last()
            .expect("positions is non-empty after push")
    }

    /// Commit a drawing session's vertices as a search area.
    ///
    /// Returns the committed area, or `None` (leaving the store untouched)
    /// when fewer than [`MIN_AREA_VERTICES`] vertices were accumulated.
    pub fn commit_area(&mut self, vertices: Vec<LatLon>) -> Option<&SearchArea> {
        if vertices.len() < MIN_AREA_VERTICES {
            return None;
        }
        self.areas.push(SearchArea { vertices });
        self.areas.last()
    }

    /// All placed positions in placement order.
    #[must_use]
    pub fn positions(&self) -> &[LastKnownPosition] {
        &self.positions
    }

    /// All committed search areas in commit order.
    #[must_use]
    pub fn areas(&self) -> &[SearchArea] {
        &self.areas
    }

    /// Bounding box over all placed positions, used for the recenter
    /// computation. `None` when no position has been placed.
    #[must_use]
    pub fn bounds(&self) -> Option<GeoBounds> {
        GeoBounds::from_points(self.positions.iter().map(|p| &p.position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_get_ordinal_labels() {
        let mut store = GeometryStore::new();
        let first = *store.add_position(LatLon::new(47.0, -2.0));
        let second = *store.add_position(LatLon::new(47.1, -2.1));

        assert_eq!(first.label(), "LKP 1");
        assert_eq!(second.label(), "LKP 2");
        assert_eq!(store.positions().len(), 2);
        assert_eq!(store.positions()[1].position, LatLon::new(47.1, -2.1));
    }

    #[test]
    fn test_commit_rejects_degenerate_polygons() {
        let mut store = GeometryStore::new();

        assert!(store.commit_area(vec![]).is_none());
        assert!(store.commit_area(vec![LatLon::new(0.0, 0.0)]).is_none());
        assert!(store
            .commit_area(vec![LatLon::new(0.0, 0.0), LatLon::new(1.0, 1.0)])
            .is_none());
        assert!(store.areas().is_empty());
    }

    #[test]
    fn test_commit_keeps_vertex_order() {
        let mut store = GeometryStore::new();
        let vertices = vec![
            LatLon::new(47.0, -2.0),
            LatLon::new(47.2, -2.0),
            LatLon::new(47.1, -2.3),
        ];

        let area = store.commit_area(vertices.clone()).unwrap();
        assert_eq!(area.vertices(), vertices.as_slice());
        assert_eq!(store.areas().len(), 1);
    }

    #[test]
    fn test_bounds_cover_all_positions() {
        let mut store = GeometryStore::new();
        assert!(store.bounds().is_none());

        store.add_position(LatLon::new(47.0, -2.0));
        store.add_position(LatLon::new(48.0, -3.0));

        let bounds = store.bounds().unwrap();
        assert_eq!(bounds.south, 47.0);
        assert_eq!(bounds.north, 48.0);
        assert_eq!(bounds.west, -3.0);
        assert_eq!(bounds.east, -2.0);
    }
}
