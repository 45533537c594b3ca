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

//! Viewport camera over the map.
//!
//! Owns the center coordinate and zoom level, and converts between screen
//! pixels and geographic coordinates at the rounded tile zoom so markers,
//! clicks, and tiles all agree. The viewport is owned by the app and passed
//! into the painter explicitly; there is no ambient map instance.

use drift_client::{GeoBounds, LatLon};
use egui::{Pos2, Vec2};

use super::tiles::{WebMercator, TILE_SIZE};
use crate::mission::GeometryStore;

/// Default view when no position has been placed yet (Saint-Nazaire estuary).
pub const DEFAULT_CENTER: LatLon = LatLon::new(47.2736, -2.2139);
pub const DEFAULT_ZOOM: f32 = 13.0;

pub const MIN_ZOOM: f32 = 3.0;
pub const MAX_ZOOM: f32 = 17.0;

/// Ceiling for fit-bounds so a single position doesn't zoom to rooftop level.
const FIT_MAX_ZOOM: f32 = 16.0;

/// Symmetric pixel padding applied around fitted bounds.
pub const FIT_PADDING_PX: f32 = 50.0;

/// Camera state for the map painter.
#[derive(Debug, Clone, Copy)]
pub struct MapViewport {
    center: LatLon,
    zoom: f32,
}

impl MapViewport {
    #[must_use]
    pub fn new(center: LatLon, zoom: f32) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        }
    }

    #[must_use]
    pub fn center(&self) -> LatLon {
        self.center
    }

    #[must_use]
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Integer zoom used for tile fetching and projection.
    #[must_use]
    pub fn tile_zoom(&self) -> u8 {
        self.zoom.round().clamp(MIN_ZOOM, MAX_ZOOM) as u8
    }

    /// Apply a multiplicative zoom gesture (egui's `zoom_delta`).
    pub fn zoom_by(&mut self, zoom_delta: f32) {
        if (zoom_delta - 1.0).abs() > 0.001 {
            self.zoom = (self.zoom + zoom_delta.log2()).clamp(MIN_ZOOM, MAX_ZOOM);
        }
    }

    /// Pan by a drag delta in screen pixels; the content follows the pointer.
    pub fn pan_by(&mut self, delta: Vec2) {
        let zoom = self.tile_zoom();
        let n = 2_f64.powi(i32::from(zoom));

        let mut x = WebMercator::lon_to_x(self.center.lon, zoom) - f64::from(delta.x) / f64::from(TILE_SIZE);
        let mut y = WebMercator::lat_to_y(self.center.lat, zoom) - f64::from(delta.y) / f64::from(TILE_SIZE);

        // Longitude wraps, latitude clamps at the Mercator singularities
        x = x.rem_euclid(n);
        y = y.clamp(0.0, n);

        self.center = LatLon::new(
            WebMercator::tile_to_lat(y, zoom),
            WebMercator::tile_to_lon(x, zoom),
        );
    }

    /// Project a coordinate to screen space, given the viewport's screen
    /// center.
    #[must_use]
    pub fn project(&self, ll: LatLon, screen_center: Pos2) -> Pos2 {
        let zoom = self.tile_zoom();

        let dx = (WebMercator::lon_to_x(ll.lon, zoom) - WebMercator::lon_to_x(self.center.lon, zoom))
            * f64::from(TILE_SIZE);
        let dy = (WebMercator::lat_to_y(ll.lat, zoom) - WebMercator::lat_to_y(self.center.lat, zoom))
            * f64::from(TILE_SIZE);

        Pos2::new(screen_center.x + dx as f32, screen_center.y + dy as f32)
    }

    /// Invert [`Self::project`]: the coordinate under a screen position.
    #[must_use]
    pub fn unproject(&self, pos: Pos2, screen_center: Pos2) -> LatLon {
        let zoom = self.tile_zoom();
        let n = 2_f64.powi(i32::from(zoom));

        let x = WebMercator::lon_to_x(self.center.lon, zoom)
            + f64::from(pos.x - screen_center.x) / f64::from(TILE_SIZE);
        let y = WebMercator::lat_to_y(self.center.lat, zoom)
            + f64::from(pos.y - screen_center.y) / f64::from(TILE_SIZE);

        LatLon::new(
            WebMercator::tile_to_lat(y.clamp(0.0, n), zoom),
            WebMercator::tile_to_lon(x.rem_euclid(n), zoom),
        )
    }

    /// Center and zoom the camera so `bounds` fits the viewport with
    /// symmetric `padding` on every side. Zoom snaps down to the integer
    /// level actually rendered, so the fitted box never overflows.
    pub fn fit_bounds(&mut self, bounds: GeoBounds, viewport: Vec2, padding: f32) {
        self.center = bounds.center();

        let frac_x = WebMercator::lon_to_x(bounds.east, 0) - WebMercator::lon_to_x(bounds.west, 0);
        let frac_y = WebMercator::lat_to_y(bounds.south, 0) - WebMercator::lat_to_y(bounds.north, 0);

        let avail_x = f64::from((viewport.x - 2.0 * padding).max(1.0));
        let avail_y = f64::from((viewport.y - 2.0 * padding).max(1.0));

        let zoom_for = |avail: f64, frac: f64| -> f64 {
            if frac > 0.0 {
                (avail / (f64::from(TILE_SIZE) * frac)).log2()
            } else {
                f64::from(FIT_MAX_ZOOM)
            }
        };

        let zoom = zoom_for(avail_x, frac_x).min(zoom_for(avail_y, frac_y));
        self.zoom = (zoom.floor() as f32).clamp(MIN_ZOOM, FIT_MAX_ZOOM);
    }

    /// Recenter over the placed positions: the fixed default view when there
    /// are none, otherwise a fit of their bounding box.
    pub fn recenter(&mut self, store: &GeometryStore, viewport: Vec2) {
        match store.bounds() {
            None => {
                self.center = DEFAULT_CENTER;
                self.zoom = DEFAULT_ZOOM;
            }
            Some(bounds) => self.fit_bounds(bounds, viewport, FIT_PADDING_PX),
        }
    }
}

impl Default for MapViewport {
    fn default() -> Self {
        Self::new(DEFAULT_CENTER, DEFAULT_ZOOM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

    #[test]
    fn test_recenter_without_positions_gives_default_view() {
        let mut viewport = MapViewport::new(LatLon::new(0.0, 0.0), 5.0);
        viewport.recenter(&GeometryStore::new(), VIEWPORT);

        assert_eq!(viewport.center(), DEFAULT_CENTER);
        assert_eq!(viewport.zoom(), DEFAULT_ZOOM);
    }

    #[test]
    fn test_recenter_fits_positions_with_padding() {
        let mut store = GeometryStore::new();
        store.add_position(LatLon::new(47.0, -2.0));
        store.add_position(LatLon::new(48.0, -3.0));

        let mut viewport = MapViewport::default();
        viewport.recenter(&store, VIEWPORT);

        let bounds = store.bounds().unwrap();
        assert_eq!(viewport.center(), bounds.center());

        // Both extremes project inside the padded viewport
        let screen_center = Pos2::new(VIEWPORT.x / 2.0, VIEWPORT.y / 2.0);
        for ll in [LatLon::new(47.0, -2.0), LatLon::new(48.0, -3.0)] {
            let pos = viewport.project(ll, screen_center);
            assert!(pos.x >= FIT_PADDING_PX - 1.0 && pos.x <= VIEWPORT.x - FIT_PADDING_PX + 1.0);
            assert!(pos.y >= FIT_PADDING_PX - 1.0 && pos.y <= VIEWPORT.y - FIT_PADDING_PX + 1.0);
        }
    }

    #[test]
    fn test_recenter_single_position_caps_zoom() {
        let mut store = GeometryStore::new();
        store.add_position(LatLon::new(47.5, -2.5));

        let mut viewport = MapViewport::default();
        viewport.recenter(&store, VIEWPORT);

        assert_eq!(viewport.center(), LatLon::new(47.5, -2.5));
        assert_eq!(viewport.zoom(), FIT_MAX_ZOOM);
    }

    #[test]
    fn test_project_unproject_roundtrip() {
        let viewport = MapViewport::default();
        let screen_center = Pos2::new(400.0, 300.0);
        let ll = LatLon::new(47.3, -2.3);

        let projected = viewport.project(ll, screen_center);
        let back = viewport.unproject(projected, screen_center);

        assert!((back.lat - ll.lat).abs() < 1e-4);
        assert!((back.lon - ll.lon).abs() < 1e-4);
    }

    #[test]
    fn test_pan_moves_center_against_drag() {
        let mut viewport = MapViewport::default();
        let before = viewport.center();

        // Drag east (content right): the center moves west
        viewport.pan_by(Vec2::new(100.0, 0.0));
        assert!(viewport.center().lon < before.lon);
        assert!((viewport.center().lat - before.lat).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_clamped() {
        let mut viewport = MapViewport::default();
        for _ in 0..100 {
            viewport.zoom_by(2.0);
        }
        assert_eq!(viewport.zoom(), MAX_ZOOM);

        for _ in 0..100 {
            viewport.zoom_by(0.5);
        }
        assert_eq!(viewport.zoom(), MIN_ZOOM);
    }
}
