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

//! Map interaction state machine.
//!
//! A click on the map is ambiguous: it may place a last-known position, add
//! a vertex to the polygon being drawn, or mean nothing. The machine resolves
//! that ambiguity with a single mode enum so every combination is an explicit
//! match arm:
//!
//! - [`InteractionMode::AddingPosition`] — the next click places an LKP and
//!   requests a drift simulation, then the mode drops back to `Idle`.
//! - [`InteractionMode::Drawing`] — clicks accumulate polygon vertices. The
//!   `resume_add_position` flag carries the add-position latch through a
//!   drawing session: while it is set, a click places an LKP instead of a
//!   vertex (position placement has strict priority), clears only the latch,
//!   and leaves the session untouched.
//! - [`InteractionMode::Idle`] — clicks are ignored.
//!
//! Pointer-down/up events latch a boolean on the drawing session and are
//! no-ops in every other mode. The latch feeds no behavior yet; it reserves
//! room for a freehand-drag drawing mode.

use drift_client::LatLon;
use log::{debug, info};

use super::geometry::GeometryStore;

/// Vertex accumulator for an in-progress search-area polygon.
///
/// Exists only while the operator is in drawing mode; dropped on commit or
/// cancel.
#[derive(Debug, Default)]
pub struct DrawingSession {
    vertices: Vec<LatLon>,
    pointer_down: bool,
}

impl DrawingSession {
    fn new() -> Self {
        Self::default()
    }

    /// Vertices accumulated so far, in click order.
    #[must_use]
    pub fn vertices(&self) -> &[LatLon] {
        &self.vertices
    }

    /// Whether the pointer is currently held down over the map.
    #[allow(dead_code)]
    #[must_use]
    pub fn pointer_down(&self) -> bool {
        self.pointer_down
    }
}

/// Current interaction mode. Exactly one is active at a time.
#[derive(Debug)]
pub enum InteractionMode {
    /// Map clicks are ignored.
    Idle,
    /// The next map click places a last-known position.
    AddingPosition,
    /// Map clicks accumulate polygon vertices, unless the add-position
    /// latch is still set (see module docs).
    Drawing {
        session: DrawingSession,
        resume_add_position: bool,
    },
}

/// What a map click did, and what the caller must do next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickOutcome {
    /// A last-known position was appended; the caller must request a drift
    /// simulation seeded with `position`.
    PositionPlaced { index: usize, position: LatLon },
    /// A vertex was appended to the drawing session.
    VertexAdded,
    /// The click meant nothing in the current mode.
    Ignored,
}

/// Routes raw map gestures to geometry mutations and simulation requests.
#[derive(Debug)]
pub struct InteractionStateMachine {
    mode: InteractionMode,
}

impl Default for InteractionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionStateMachine {
    /// The console starts expecting a position click.
    #[must_use]
    pub fn new() -> Self {
        Self {
            mode: InteractionMode::AddingPosition,
        }
    }

    #[allow(dead_code)]
    #[must_use]
    pub fn mode(&self) -> &InteractionMode {
        &self.mode
    }

    /// Whether the add-position latch is set (directly or carried through a
    /// drawing session). Drives the "Add Position" control highlight.
    #[must_use]
    pub fn is_adding_position(&self) -> bool {
        match &self.mode {
            InteractionMode::AddingPosition => true,
            InteractionMode::Drawing {
                resume_add_position,
                ..
            } => *resume_add_position,
            InteractionMode::Idle => false,
        }
    }

    /// Whether a drawing session is active.
    #[must_use]
    pub fn is_drawing(&self) -> bool {
        matches!(self.mode, InteractionMode::Drawing { .. })
    }

    /// In-progress polygon vertices, for rendering. `None` outside drawing
    /// mode.
    #[must_use]
    pub fn drawing_vertices(&self) -> Option<&[LatLon]> {
        match &self.mode {
            InteractionMode::Drawing { session, .. } => Some(session.vertices()),
            _ => None,
        }
    }

    /// Dispatch a map click according to the current mode.
    pub fn handle_click(&mut self, ll: LatLon, store: &mut GeometryStore) -> ClickOutcome {
        match &mut self.mode {
            InteractionMode::Idle => ClickOutcome::Ignored,

            InteractionMode::AddingPosition => {
                let placed = store.add_position(ll);
                info!("Placed {} at ({:.5}, {:.5})", placed.label(), ll.lat, ll.lon);
                let outcome = ClickOutcome::PositionPlaced {
                    index: placed.index,
                    position: placed.position,
                };
                // One placement per activation
                self.mode = InteractionMode::Idle;
                outcome
            }

            InteractionMode::Drawing {
                session,
                resume_add_position,
            } => {
                if *resume_add_position {
                    // Position placement outranks vertex accumulation while
                    // the latch is set; the session stays intact.
                    let placed = store.add_position(ll);
                    info!("Placed {} at ({:.5}, {:.5})", placed.label(), ll.lat, ll.lon);
                    let outcome = ClickOutcome::PositionPlaced {
                        index: placed.index,
                        position: placed.position,
                    };
                    *resume_add_position = false;
                    outcome
                } else {
                    session.vertices.push(ll);
                    debug!("Polygon vertex {} added", session.vertices.len());
                    ClickOutcome::VertexAdded
                }
            }
        }
    }

    /// Latch the pointer-down flag. No-op outside drawing mode.
    pub fn handle_pointer_down(&mut self) {
        if let InteractionMode::Drawing { session, .. } = &mut self.mode {
            session.pointer_down = true;
        }
    }

    /// Release the pointer-down flag if it was latched.
    pub fn handle_pointer_up(&mut self) {
        if let InteractionMode::Drawing { session, .. } = &mut self.mode {
            if session.pointer_down {
                session.pointer_down = false;
            }
        }
    }

    /// Toggle the "Add Position" control. Drawing state is unaffected; while
    /// drawing, only the carried latch flips.
    pub fn toggle_add_position(&mut self) {
        match &mut self.mode {
            InteractionMode::Idle => self.mode = InteractionMode::AddingPosition,
            InteractionMode::AddingPosition => self.mode = InteractionMode::Idle,
            InteractionMode::Drawing {
                resume_add_position,
                ..
            } => *resume_add_position = !*resume_add_position,
        }
    }

    /// Toggle the "Focus Search" control.
    ///
    /// Entering drawing mode starts a fresh session. Leaving it commits the
    /// session iff more than two vertices were accumulated (returning `true`
    /// on commit), drops the session regardless, and restores the
    /// add-position latch that was active when drawing began.
    pub fn toggle_focus_search(&mut self, store: &mut GeometryStore) -> bool {
        match std::mem::replace(&mut self.mode, InteractionMode::Idle) {
            InteractionMode::Drawing {
                session,
                resume_add_position,
            } => {
                let vertex_count = session.vertices.len();
                let committed = store.commit_area(session.vertices).is_some();
                if committed {
                    info!("Committed search area with {vertex_count} vertices");
                } else {
                    debug!("Discarded drawing session with {vertex_count} vertices");
                }
                self.mode = if resume_add_position {
                    InteractionMode::AddingPosition
                } else {
                    InteractionMode::Idle
                };
                committed
            }
            previous => {
                let resume = matches!(previous, InteractionMode::AddingPosition);
                self.mode = InteractionMode::Drawing {
                    session: DrawingSession::new(),
                    resume_add_position: resume,
                };
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drawing_machine() -> (InteractionStateMachine, GeometryStore) {
        let mut machine = InteractionStateMachine::new();
        let mut store = GeometryStore::new();
        machine.toggle_add_position(); // AddingPosition -> Idle
        machine.toggle_focus_search(&mut store); // Idle -> Drawing
        (machine, store)
    }

    #[test]
    fn test_starts_adding_position() {
        let machine = InteractionStateMachine::new();
        assert!(machine.is_adding_position());
        assert!(!machine.is_drawing());
    }

    #[test]
    fn test_click_places_position_once_and_requests_simulation() {
        let mut machine = InteractionStateMachine::new();
        let mut store = GeometryStore::new();
        let ll = LatLon::new(47.2736, -2.2139);

        let outcome = machine.handle_click(ll, &mut store);
        assert_eq!(
            outcome,
            ClickOutcome::PositionPlaced {
                index: 0,
                position: ll
            }
        );
        assert_eq!(store.positions().len(), 1);
        assert_eq!(store.positions()[0].position, ll);
        // Auto-deactivates after one placement
        assert!(!machine.is_adding_position());

        // Follow-up click is a no-op
        assert_eq!(machine.handle_click(ll, &mut store), ClickOutcome::Ignored);
        assert_eq!(store.positions().len(), 1);
    }

    #[test]
    fn test_short_drawing_session_commits_nothing() {
        let (mut machine, mut store) = drawing_machine();

        machine.handle_click(LatLon::new(47.0, -2.0), &mut store);
        machine.handle_click(LatLon::new(47.1, -2.1), &mut store);

        assert!(!machine.toggle_focus_search(&mut store));
        assert!(store.areas().is_empty());
        assert!(!machine.is_drawing());
    }

    #[test]
    fn test_three_vertex_session_commits_in_order() {
        let (mut machine, mut store) = drawing_machine();
        let vertices = [
            LatLon::new(47.0, -2.0),
            LatLon::new(47.2, -2.0),
            LatLon::new(47.1, -2.3),
        ];

        for v in vertices {
            assert_eq!(machine.handle_click(v, &mut store), ClickOutcome::VertexAdded);
        }

        assert!(machine.toggle_focus_search(&mut store));
        assert_eq!(store.areas().len(), 1);
        assert_eq!(store.areas()[0].vertices(), vertices.as_slice());
    }

    #[test]
    fn test_reentering_drawing_starts_fresh_session() {
        let (mut machine, mut store) = drawing_machine();
        machine.handle_click(LatLon::new(47.0, -2.0), &mut store);

        // Exit (discards the single vertex), re-enter
        machine.toggle_focus_search(&mut store);
        machine.toggle_focus_search(&mut store);

        assert_eq!(machine.drawing_vertices(), Some(&[][..]));
    }

    #[test]
    fn test_position_placement_outranks_vertex_accumulation() {
        // Enter drawing directly from AddingPosition: the latch is carried
        let mut machine = InteractionStateMachine::new();
        let mut store = GeometryStore::new();
        machine.toggle_focus_search(&mut store);
        assert!(machine.is_drawing());
        assert!(machine.is_adding_position());

        let ll = LatLon::new(47.5, -2.5);
        let outcome = machine.handle_click(ll, &mut store);

        assert_eq!(
            outcome,
            ClickOutcome::PositionPlaced {
                index: 0,
                position: ll
            }
        );
        // The latch clears, the session survives untouched
        assert!(!machine.is_adding_position());
        assert!(machine.is_drawing());
        assert_eq!(machine.drawing_vertices(), Some(&[][..]));

        // Subsequent clicks accumulate vertices again
        assert_eq!(
            machine.handle_click(ll, &mut store),
            ClickOutcome::VertexAdded
        );
        assert_eq!(store.positions().len(), 1);
    }

    #[test]
    fn test_leaving_drawing_restores_add_position_latch() {
        let mut machine = InteractionStateMachine::new();
        let mut store = GeometryStore::new();

        // Latch carried in and back out of an empty drawing session
        machine.toggle_focus_search(&mut store);
        machine.toggle_focus_search(&mut store);
        assert!(machine.is_adding_position());
        assert!(!machine.is_drawing());

        // Without the latch, leaving drawing lands in Idle
        machine.toggle_add_position();
        machine.toggle_focus_search(&mut store);
        machine.toggle_focus_search(&mut store);
        assert!(!machine.is_adding_position());
        assert!(!machine.is_drawing());
    }

    #[test]
    fn test_toggle_add_position_while_drawing_flips_latch_only() {
        let (mut machine, mut store) = drawing_machine();
        machine.handle_click(LatLon::new(47.0, -2.0), &mut store);

        machine.toggle_add_position();
        assert!(machine.is_drawing());
        assert!(machine.is_adding_position());
        assert_eq!(machine.drawing_vertices().map(<[LatLon]>::len), Some(1));

        machine.toggle_add_position();
        assert!(!machine.is_adding_position());
    }

    #[test]
    fn test_pointer_latch_scoped_to_drawing() {
        let mut machine = InteractionStateMachine::new();

        // Not drawing: events are no-ops
        machine.handle_pointer_down();
        assert!(matches!(machine.mode(), InteractionMode::AddingPosition));

        let (mut machine, _store) = drawing_machine();
        machine.handle_pointer_down();
        match machine.mode() {
            InteractionMode::Drawing { session, .. } => assert!(session.pointer_down()),
            other => panic!("expected drawing mode, got {other:?}"),
        }

        machine.handle_pointer_up();
        match machine.mode() {
            InteractionMode::Drawing { session, .. } => assert!(!session.pointer_down()),
            other => panic!("expected drawing mode, got {other:?}"),
        }
    }
}
