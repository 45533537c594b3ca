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

//! Seahawk Console — search-and-rescue drift prediction desktop app.
//!
//! The operator marks the target's last-known position on the map, which
//! triggers a drift simulation on the backend; the predicted target, boat,
//! and drone tracks are drawn over OSM tiles together with the per-step
//! positional uncertainty. A focus search area can be annotated as a polygon.

mod config;
mod map;
mod messages;
mod mission;
mod simulation;

use std::time::Duration;

use clap::Parser;
use drift_client::{ClientConfig, DriftClient, DriftPrediction};
use eframe::egui;
use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Shape, Stroke};
use log::{info, warn};

use config::AppConfig;
use map::tiles::TILE_SIZE;
use map::{MapViewport, TileManager};
use messages::{MessageFeed, MessageKind, SIMULATION_FAILED_NOTICE};
use mission::{ClickOutcome, GeometryStore, InteractionStateMachine, RenderSet};
use simulation::SimulationRunner;

// Marker and overlay colors, shared with the mission console theme
const LKP_COLOR: Color32 = Color32::from_rgb(0xff, 0x47, 0x57);
const AREA_COLOR: Color32 = Color32::from_rgb(0xff, 0x9f, 0x43);
const PANEL_BG: Color32 = Color32::from_rgb(0x13, 0x23, 0x37);

#[derive(Parser, Debug)]
#[command(name = "seahawk-desktop", version, about = "Search-and-rescue drift console")]
struct Args {
    /// Simulation backend base URL (overrides the config file)
    #[arg(long)]
    backend_url: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), eframe::Error> {
    let args = Args::parse();

    let env = env_logger::Env::default()
        .default_filter_or(if args.verbose { "debug" } else { "info" });
    env_logger::Builder::from_env(env).init();

    info!("Starting Seahawk Console...");

    let config = AppConfig::load().unwrap_or_else(|e| {
        warn!("Failed to load config: {e}; using defaults");
        AppConfig::default()
    });

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_title("Seahawk Console"),
        ..Default::default()
    };

    eframe::run_native(
        "Seahawk Console",
        options,
        Box::new(move |_cc| Ok(Box::new(ConsoleApp::new(config, args.backend_url)?))),
    )
}

struct ConsoleApp {
    config: AppConfig,
    store: GeometryStore,
    interaction: InteractionStateMachine,
    viewport: MapViewport,
    tile_manager: TileManager,
    runner: SimulationRunner,
    feed: MessageFeed,
    prediction: Option<DriftPrediction>,
    tile_status: Option<String>,
}

impl ConsoleApp {
    fn new(
        config: AppConfig,
        backend_override: Option<String>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let base_url = backend_override.unwrap_or_else(|| config.backend_url.clone());
        info!("Using simulation backend at {base_url}");

        let client = DriftClient::new(ClientConfig {
            base_url,
            timeout: Duration::from_secs(config.request_timeout_secs),
        })?;

        let runner = SimulationRunner::new(client)?;
        runner.probe_health();

        let viewport = MapViewport::new(map::viewport::DEFAULT_CENTER, config.default_zoom);

        Ok(Self {
            config,
            store: GeometryStore::new(),
            interaction: InteractionStateMachine::new(),
            viewport,
            tile_manager: TileManager::new(),
            runner,
            feed: MessageFeed::new(),
            prediction: None,
            tile_status: None,
        })
    }

    /// Drain completed simulation requests into app state.
    fn poll_simulation(&mut self) {
        if let Some(result) = self.runner.poll() {
            apply_simulation_outcome(result, &mut self.prediction, &mut self.feed);
        }
    }

    fn draw_map(&mut self, ui: &mut egui::Ui) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());

        let rect = response.rect;
        let screen_center = rect.center();

        painter.rect_filled(rect, 0, Color32::from_rgb(0x0d, 0x1b, 0x2a));

        // Pinch-zoom gesture
        let zoom_delta = ui.ctx().input(|i| i.zoom_delta());
        self.viewport.zoom_by(zoom_delta);

        // Render map tiles
        let center = self.viewport.center();
        let zoom = self.viewport.tile_zoom();
        let visible_tiles = self.tile_manager.get_visible_tiles(
            center.lat,
            center.lon,
            zoom,
            rect.width(),
            rect.height(),
        );

        let mut tiles_rendered = 0;
        for (coord, offset_x, offset_y) in visible_tiles {
            if let Some(texture) = self.tile_manager.get_tile(coord, ui.ctx()) {
                let tile_pos = egui::pos2(screen_center.x + offset_x, screen_center.y + offset_y);
                let tile_rect =
                    Rect::from_min_size(tile_pos, egui::vec2(TILE_SIZE as f32, TILE_SIZE as f32));

                painter.image(
                    texture.id(),
                    tile_rect,
                    Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    Color32::WHITE,
                );
                tiles_rendered += 1;
            }
        }

        if self.tile_manager.get_error_count() > 0 {
            self.tile_status = Some(format!(
                "Failed to load {} tiles",
                self.tile_manager.get_error_count()
            ));
        } else if self.tile_manager.has_loading_tiles() {
            self.tile_status = Some("Loading map tiles...".to_string());
        } else if tiles_rendered > 0 {
            self.tile_status = None;
        }

        // Drag to pan
        if response.dragged() {
            self.viewport.pan_by(response.drag_delta());
        }

        // Pointer latch, meaningful only while drawing
        if response.is_pointer_button_down_on() {
            self.interaction.handle_pointer_down();
        } else {
            self.interaction.handle_pointer_up();
        }

        // Click dispatch (egui reports clicked() only for non-drag releases)
        if response.clicked() {
            if let Some(pointer) = response.interact_pointer_pos() {
                let ll = self.viewport.unproject(pointer, screen_center);
                match self.interaction.handle_click(ll, &mut self.store) {
                    ClickOutcome::PositionPlaced { position, .. } => {
                        self.runner.request(position, ui.ctx());
                    }
                    ClickOutcome::VertexAdded | ClickOutcome::Ignored => {}
                }
            }
        }

        if self.interaction.is_adding_position() || self.interaction.is_drawing() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::Crosshair);
        }

        self.draw_areas(&painter, screen_center);
        self.draw_drawing_session(&painter, screen_center);
        self.draw_tracks(&painter, screen_center);
        self.draw_positions(&painter, rect, screen_center);

        // Instruction overlay before the first placement
        if self.interaction.is_adding_position() && self.store.positions().is_empty() {
            draw_overlay_box(&painter, rect, "Click on map to set last known position");
        }

        // Blocking indicator while a request is in flight
        if self.runner.is_simulating() {
            draw_overlay_box(&painter, rect, "Running simulation...");
        }

        painter.text(
            rect.right_bottom() + egui::vec2(-10.0, -10.0),
            Align2::RIGHT_BOTTOM,
            "© OpenStreetMap contributors",
            FontId::proportional(10.0),
            Color32::from_black_alpha(180),
        );

        if let Some(status) = self.tile_status.clone() {
            draw_status_bubble(&painter, rect, &status);
        }
    }

    /// Committed search areas: translucent orange fill with a dashed outline.
    fn draw_areas(&self, painter: &egui::Painter, screen_center: Pos2) {
        for area in self.store.areas() {
            let points: Vec<Pos2> = area
                .vertices()
                .iter()
                .map(|v| self.viewport.project(*v, screen_center))
                .collect();

            painter.add(Shape::convex_polygon(
                points.clone(),
                Color32::from_rgba_unmultiplied(0xff, 0x9f, 0x43, 50),
                Stroke::NONE,
            ));

            let mut outline = points;
            outline.push(outline[0]);
            for dash in Shape::dashed_line(&outline, Stroke::new(1.5, AREA_COLOR), 8.0, 4.0) {
                painter.add(dash);
            }
        }
    }

    /// In-progress polygon: vertex dots, outline, fill once it closes.
    fn draw_drawing_session(&self, painter: &egui::Painter, screen_center: Pos2) {
        let Some(vertices) = self.interaction.drawing_vertices() else {
            return;
        };
        if vertices.is_empty() {
            return;
        }

        let points: Vec<Pos2> = vertices
            .iter()
            .map(|v| self.viewport.project(*v, screen_center))
            .collect();

        if points.len() > 2 {
            painter.add(Shape::convex_polygon(
                points.clone(),
                Color32::from_rgba_unmultiplied(0xff, 0x9f, 0x43, 38),
                Stroke::NONE,
            ));
        }
        painter.add(Shape::closed_line(points.clone(), Stroke::new(1.5, AREA_COLOR)));
        for point in points {
            painter.circle_filled(point, 3.0, AREA_COLOR);
        }
    }

    /// Drift prediction polylines and current-position dots.
    fn draw_tracks(&self, painter: &egui::Painter, screen_center: Pos2) {
        let render_set = RenderSet::from_prediction(self.prediction.as_ref());

        for polyline in &render_set.polylines {
            let points: Vec<Pos2> = polyline
                .points
                .iter()
                .map(|p| self.viewport.project(*p, screen_center))
                .collect();
            if points.len() >= 2 {
                painter.add(Shape::line(points, Stroke::new(3.0, polyline.kind.color())));
            }
        }

        for marker in &render_set.markers {
            let pos = self.viewport.project(marker.position, screen_center);
            painter.circle_filled(pos, 6.0, marker.kind.color());
            painter.circle_stroke(pos, 6.0, Stroke::new(2.0, Color32::WHITE));
        }
    }

    /// Last-known positions: red cross markers with "LKP n" labels.
    fn draw_positions(&self, painter: &egui::Painter, rect: Rect, screen_center: Pos2) {
        for lkp in self.store.positions() {
            let pos = self.viewport.project(lkp.position, screen_center);
            if !rect.contains(pos) {
                continue;
            }

            let arm = 8.0;
            painter.line_segment(
                [pos + egui::vec2(-arm, -arm), pos + egui::vec2(arm, arm)],
                Stroke::new(3.0, LKP_COLOR),
            );
            painter.line_segment(
                [pos + egui::vec2(arm, -arm), pos + egui::vec2(-arm, arm)],
                Stroke::new(3.0, LKP_COLOR),
            );

            let label = lkp.label();
            let galley = painter.layout_no_wrap(label.clone(), FontId::proportional(10.0), LKP_COLOR);
            let text_pos = pos + egui::vec2(0.0, arm + 14.0);
            let padding = egui::vec2(3.0, 2.0);
            let box_rect = Rect::from_center_size(text_pos, galley.size() + padding * 2.0);
            painter.rect_filled(box_rect, 2, PANEL_BG);
            painter.text(
                text_pos,
                Align2::CENTER_CENTER,
                label,
                FontId::proportional(10.0),
                LKP_COLOR,
            );
        }
    }

    fn draw_controls(&mut self, ctx: &egui::Context) {
        egui::Area::new(egui::Id::new("map_controls"))
            .anchor(Align2::CENTER_BOTTOM, egui::vec2(0.0, -24.0))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let adding = self.interaction.is_adding_position();
                    let add_fill = if adding {
                        Color32::from_rgba_unmultiplied(0xff, 0x47, 0x57, 60)
                    } else {
                        PANEL_BG
                    };
                    if ui.add(egui::Button::new("Add Position").fill(add_fill)).clicked() {
                        self.interaction.toggle_add_position();
                    }

                    let drawing = self.interaction.is_drawing();
                    let draw_label = if drawing { "Stop Focus Mode" } else { "Focus Search" };
                    let draw_fill = if drawing {
                        Color32::from_rgba_unmultiplied(0xff, 0x9f, 0x43, 60)
                    } else {
                        PANEL_BG
                    };
                    if ui.add(egui::Button::new(draw_label).fill(draw_fill)).clicked() {
                        self.interaction.toggle_focus_search(&mut self.store);
                    }

                    let sigma_fill = if self.config.show_uncertainty_window {
                        Color32::from_rgba_unmultiplied(0x32, 0xa8, 0xa8, 60)
                    } else {
                        PANEL_BG
                    };
                    if ui.add(egui::Button::new("Uncertainty").fill(sigma_fill)).clicked() {
                        self.config.show_uncertainty_window = !self.config.show_uncertainty_window;
                        if let Err(e) = self.config.save() {
                            warn!("Failed to save config: {e}");
                        }
                    }
                });
            });

        egui::Area::new(egui::Id::new("recenter"))
            .anchor(Align2::RIGHT_BOTTOM, egui::vec2(-24.0, -24.0))
            .show(ctx, |ui| {
                if ui.button("Recenter").clicked() {
                    self.viewport.recenter(&self.store, ctx.screen_rect().size());
                }
            });
    }

    fn draw_communications(&self, ctx: &egui::Context) {
        egui::Window::new("Communications")
            .anchor(Align2::RIGHT_TOP, egui::vec2(-10.0, 10.0))
            .default_width(300.0)
            .resizable(false)
            .collapsible(true)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .max_height(280.0)
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        for msg in self.feed.iter() {
                            let sender_color = match msg.kind {
                                MessageKind::Operator => Color32::from_rgb(0x00, 0xf2, 0xea),
                                MessageKind::Pilot => Color32::from_rgb(0x7b, 0xed, 0x9f),
                                MessageKind::System => Color32::from_rgb(0xfe, 0xca, 0x57),
                            };
                            ui.horizontal_wrapped(|ui| {
                                ui.label(
                                    egui::RichText::new(format!(
                                        "{} {}",
                                        msg.time_label(),
                                        msg.kind.sender()
                                    ))
                                    .color(sender_color)
                                    .monospace()
                                    .size(11.0),
                                );
                                ui.label(egui::RichText::new(msg.text.as_str()).size(12.0));
                            });
                        }
                    });
            });
    }

    fn draw_uncertainty(&self, ctx: &egui::Context) {
        if !self.config.show_uncertainty_window {
            return;
        }
        let Some(prediction) = &self.prediction else {
            return;
        };

        egui::Window::new("Uncertainty")
            .anchor(Align2::LEFT_BOTTOM, egui::vec2(10.0, -10.0))
            .default_width(320.0)
            .resizable(false)
            .collapsible(true)
            .show(ctx, |ui| {
                ui.label(format!(
                    "Position uncertainty over {} steps",
                    prediction.steps()
                ));

                let points: Vec<[f64; 2]> = prediction
                    .sigma_history
                    .iter()
                    .enumerate()
                    .map(|(i, &sigma)| [i as f64, sigma])
                    .collect();

                egui_plot::Plot::new("sigma_plot")
                    .height(140.0)
                    .allow_drag(false)
                    .allow_scroll(false)
                    .include_y(0.0)
                    .show(ui, |plot_ui| {
                        plot_ui.line(
                            egui_plot::Line::new("Sigma", egui_plot::PlotPoints::new(points))
                                .color(mission::TrackKind::Target.color())
                                .width(2.0),
                        );
                    });
            });
    }
}

impl eframe::App for ConsoleApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.request_repaint_after(Duration::from_millis(500));

        self.poll_simulation();

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.draw_map(ui);
            });

        self.draw_controls(ctx);
        self.draw_communications(ctx);
        self.draw_uncertainty(ctx);
    }
}

/// Install a completed simulation result.
///
/// A success replaces the prediction wholesale; a failure leaves any prior
/// prediction in place and appends a single notice to the feed.
fn apply_simulation_outcome(
    result: Result<DriftPrediction, drift_client::DriftError>,
    prediction: &mut Option<DriftPrediction>,
    feed: &mut MessageFeed,
) {
    match result {
        Ok(new_prediction) => {
            info!("Drift prediction installed ({} steps)", new_prediction.steps());
            *prediction = Some(new_prediction);
        }
        Err(e) => {
            warn!("Simulation failed: {e}");
            feed.push_system(SIMULATION_FAILED_NOTICE);
        }
    }
}

/// Centered instruction/progress box over the map.
fn draw_overlay_box(painter: &egui::Painter, rect: Rect, text: &str) {
    let galley = painter.layout_no_wrap(
        text.to_string(),
        FontId::proportional(16.0),
        Color32::from_rgb(0x7d, 0xd3, 0xfc),
    );

    let padding = egui::vec2(24.0, 16.0);
    let box_rect = Rect::from_center_size(rect.center(), galley.size() + padding * 2.0);

    painter.rect_filled(
        box_rect,
        12,
        Color32::from_rgba_unmultiplied(0x13, 0x23, 0x37, 238),
    );
    painter.text(
        rect.center(),
        Align2::CENTER_CENTER,
        text,
        FontId::proportional(16.0),
        Color32::from_rgb(0x7d, 0xd3, 0xfc),
    );
}

/// Tile loading/error bubble at the top of the map, like a toast.
fn draw_status_bubble(painter: &egui::Painter, rect: Rect, message: &str) {
    let is_error = message.contains("Failed");
    let bg_color = if is_error {
        Color32::from_rgb(220, 50, 50)
    } else {
        Color32::from_rgb(255, 200, 100)
    };

    let pos = rect.center_top() + egui::vec2(0.0, 20.0);
    let galley = painter.layout_no_wrap(
        message.to_string(),
        FontId::proportional(12.0),
        Color32::WHITE,
    );

    let padding = egui::vec2(12.0, 6.0);
    let bubble_rect = Rect::from_center_size(pos, galley.size() + padding * 2.0);

    painter.rect_filled(bubble_rect, 5, bg_color);
    painter.text(
        pos,
        Align2::CENTER_CENTER,
        message,
        FontId::proportional(12.0),
        Color32::WHITE,
    );
}
