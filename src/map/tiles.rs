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

//! OpenStreetMap slippy-tile fetching and caching.
//!
//! Tiles are downloaded on background threads, cached on disk under the user
//! cache directory for a week, and uploaded as egui textures on demand.

use egui::{ColorImage, TextureHandle};
use log::{debug, error, warn};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

pub const TILE_SIZE: u32 = 256;
const CACHE_DURATION_DAYS: u64 = 7;

/// Web Mercator projection utilities.
///
/// Coordinates are expressed in tile units: at zoom `z` the world spans
/// `2^z` tiles in each axis, so zoom 0 maps the world onto `[0, 1]`.
pub struct WebMercator;

impl WebMercator {
    /// Convert latitude to a Web Mercator Y tile coordinate.
    pub fn lat_to_y(lat: f64, zoom: u8) -> f64 {
        let lat_rad = lat.to_radians();
        let n = 2_f64.powi(zoom as i32);
        let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / std::f64::consts::PI) / 2.0;
        y * n
    }

    /// Convert longitude to a Web Mercator X tile coordinate.
    pub fn lon_to_x(lon: f64, zoom: u8) -> f64 {
        let n = 2_f64.powi(zoom as i32);
        ((lon + 180.0) / 360.0) * n
    }

    /// Convert a Y tile coordinate back to latitude.
    pub fn tile_to_lat(y: f64, zoom: u8) -> f64 {
        let n = 2_f64.powi(zoom as i32);
        let lat_rad = ((std::f64::consts::PI * (1.0 - 2.0 * y / n)).sinh()).atan();
        lat_rad.to_degrees()
    }

    /// Convert an X tile coordinate back to longitude.
    pub fn tile_to_lon(x: f64, zoom: u8) -> f64 {
        let n = 2_f64.powi(zoom as i32);
        x / n * 360.0 - 180.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub zoom: u8,
}

impl TileCoord {
    pub fn new(x: u32, y: u32, zoom: u8) -> Self {
        Self { x, y, zoom }
    }

    /// Tile URL on the OSM tile server.
    pub fn url(&self) -> String {
        format!(
            "https://tile.openstreetmap.org/{}/{}/{}.png",
            self.zoom, self.x, self.y
        )
    }

    /// Cache filename derived from a hash of the URL.
    fn cache_filename(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.url().as_bytes());
        let hash = hasher.finalize();
        format!("{hash:x}")
    }
}

pub enum TileState {
    Loading,
    Loaded(TextureHandle),
    Failed,
}

pub struct TileManager {
    cache_dir: PathBuf,
    tiles: Arc<Mutex<HashMap<TileCoord, TileState>>>,
    download_queue: Arc<Mutex<Vec<TileCoord>>>,
}

impl Default for TileManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TileManager {
    pub fn new() -> Self {
        let cache_dir = Self::get_cache_dir();

        if let Err(e) = fs::create_dir_all(&cache_dir) {
            warn!("Failed to create tile cache directory: {e}");
        }

        Self::cleanup_old_tiles(&cache_dir);

        Self {
            cache_dir,
            tiles: Arc::new(Mutex::new(HashMap::new())),
            download_queue: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn get_cache_dir() -> PathBuf {
        let mut path = dirs::cache_dir().unwrap_or_else(|| PathBuf::from(".cache"));
        path.push("seahawk-desktop");
        path.push("tiles");
        path
    }

    fn cleanup_old_tiles(cache_dir: &Path) {
        let now = SystemTime::now();
        let max_age = Duration::from_secs(CACHE_DURATION_DAYS * 24 * 60 * 60);

        if let Ok(entries) = fs::read_dir(cache_dir) {
            for entry in entries.flatten() {
                if let Ok(metadata) = entry.metadata() {
                    if let Ok(modified) = metadata.modified() {
                        if let Ok(age) = now.duration_since(modified) {
                            if age > max_age {
                                let _ = fs::remove_file(entry.path());
                                debug!("Removed expired tile cache entry {:?}", entry.path());
                            }
                        }
                    }
                }
            }
        }
    }

    /// Get a tile texture, loading from disk cache or queueing a download.
    pub fn get_tile(&self, coord: TileCoord, ctx: &egui::Context) -> Option<TextureHandle> {
        let mut tiles = self
            .tiles
            .lock()
            .expect("Tile state lock poisoned - unrecoverable state");

        match tiles.get(&coord) {
            Some(TileState::Loaded(texture)) => Some(texture.clone()),
            Some(TileState::Loading | TileState::Failed) => None,
            None => {
                let cache_path = self.cache_dir.join(format!("{}.png", coord.cache_filename()));

                if cache_path.exists() {
                    match Self::load_tile_from_disk(&cache_path, ctx, coord) {
                        Ok(texture) => {
                            tiles.insert(coord, TileState::Loaded(texture.clone()));
                            Some(texture)
                        }
                        Err(e) => {
                            warn!("Failed to load cached tile: {e}");
                            tiles.insert(coord, TileState::Loading);
                            self.queue_download(coord, ctx.clone());
                            None
                        }
                    }
                } else {
                    tiles.insert(coord, TileState::Loading);
                    self.queue_download(coord, ctx.clone());
                    None
                }
            }
        }
    }

    fn load_tile_from_disk(
        path: &Path,
        ctx: &egui::Context,
        coord: TileCoord,
    ) -> Result<TextureHandle, String> {
        let img_data = fs::read(path).map_err(|e| e.to_string())?;
        let img = image::load_from_memory(&img_data).map_err(|e| e.to_string())?;
        let rgba = img.to_rgba8();

        let color_image = ColorImage::from_rgba_unmultiplied(
            [TILE_SIZE as usize, TILE_SIZE as usize],
            &rgba.into_raw(),
        );

        Ok(ctx.load_texture(
            format!("tile_{}_{}/{}", coord.zoom, coord.x, coord.y),
            color_image,
            Default::default(),
        ))
    }

    fn queue_download(&self, coord: TileCoord, ctx: egui::Context) {
        let mut queue = self
            .download_queue
            .lock()
            .expect("Tile download queue lock poisoned - unrecoverable state");
        if !queue.contains(&coord) {
            queue.push(coord);

            let tiles = self.tiles.clone();
            let cache_dir = self.cache_dir.clone();

            std::thread::spawn(move || {
                Self::download_tile(coord, &tiles, &cache_dir, &ctx);
            });
        }
    }

    fn download_tile(
        coord: TileCoord,
        tiles: &Arc<Mutex<HashMap<TileCoord, TileState>>>,
        cache_dir: &Path,
        ctx: &egui::Context,
    ) {
        let url = coord.url();
        debug!("Downloading tile {url}");

        let set_state = |state: TileState| {
            tiles
                .lock()
                .expect("Tile state lock poisoned - unrecoverable state")
                .insert(coord, state);
        };

        let response = match reqwest::blocking::get(&url) {
            Ok(response) => response,
            Err(e) => {
                error!("Failed to fetch tile: {e}");
                set_state(TileState::Failed);
                return;
            }
        };

        if !response.status().is_success() {
            error!("Failed to download tile: HTTP {}", response.status());
            set_state(TileState::Failed);
            return;
        }

        let bytes = match response.bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("Failed to read tile bytes: {e}");
                set_state(TileState::Failed);
                return;
            }
        };

        let cache_path = cache_dir.join(format!("{}.png", coord.cache_filename()));
        if let Err(e) = fs::write(&cache_path, &bytes) {
            warn!("Failed to save tile to cache: {e}");
        }

        match image::load_from_memory(&bytes) {
            Ok(img) => {
                let rgba = img.to_rgba8();
                let color_image = ColorImage::from_rgba_unmultiplied(
                    [TILE_SIZE as usize, TILE_SIZE as usize],
                    &rgba.into_raw(),
                );

                let texture = ctx.load_texture(
                    format!("tile_{}_{}/{}", coord.zoom, coord.x, coord.y),
                    color_image,
                    Default::default(),
                );

                set_state(TileState::Loaded(texture));
                ctx.request_repaint();
            }
            Err(e) => {
                error!("Failed to decode tile image: {e}");
                set_state(TileState::Failed);
            }
        }
    }

    /// All tiles needed to cover a viewport, with pixel offsets from the
    /// viewport center.
    pub fn get_visible_tiles(
        &self,
        center_lat: f64,
        center_lon: f64,
        zoom: u8,
        viewport_width: f32,
        viewport_height: f32,
    ) -> Vec<(TileCoord, f32, f32)> {
        let mut tiles = Vec::new();

        let center_tile_x = WebMercator::lon_to_x(center_lon, zoom);
        let center_tile_y = WebMercator::lat_to_y(center_lat, zoom);

        let tiles_wide = (viewport_width / TILE_SIZE as f32).ceil() as i32 + 2;
        let tiles_high = (viewport_height / TILE_SIZE as f32).ceil() as i32 + 2;

        let start_x = center_tile_x.floor() as i32 - tiles_wide / 2;
        let start_y = center_tile_y.floor() as i32 - tiles_high / 2;

        let max_tile = 2_i32.pow(zoom as u32);

        for dy in 0..tiles_high {
            for dx in 0..tiles_wide {
                let tile_x = start_x + dx;
                let tile_y = start_y + dy;

                // Longitude wraps, latitude does not
                let wrapped_x = ((tile_x % max_tile) + max_tile) % max_tile;

                if tile_y >= 0 && tile_y < max_tile {
                    let coord = TileCoord::new(wrapped_x as u32, tile_y as u32, zoom);

                    let offset_x = (tile_x as f64 - center_tile_x) * TILE_SIZE as f64;
                    let offset_y = (tile_y as f64 - center_tile_y) * TILE_SIZE as f64;

                    tiles.push((coord, offset_x as f32, offset_y as f32));
                }
            }
        }

        tiles
    }

    pub fn has_loading_tiles(&self) -> bool {
        let tiles = self
            .tiles
            .lock()
            .expect("Tile state lock poisoned - unrecoverable state");
        tiles.values().any(|state| matches!(state, TileState::Loading))
    }

    pub fn get_error_count(&self) -> usize {
        let tiles = self
            .tiles
            .lock()
            .expect("Tile state lock poisoned - unrecoverable state");
        tiles.values().filter(|state| matches!(state, TileState::Failed)).count()
    }
}
