//! Mission-domain state: operator geometry, interaction modes, and the
//! visual model derived from a completed drift prediction.

pub mod geometry;
pub mod interaction;
pub mod visual;

pub use geometry::{GeometryStore, LastKnownPosition, SearchArea};
pub use interaction::{ClickOutcome, InteractionMode, InteractionStateMachine};
pub use visual::{RenderSet, TrackKind};
