//! facepad core
//!
//! Turns per-frame face landmarks into two normalized control signals
//! (eyebrow raise, mouth openness) and a debounced reset trigger for a game.
//! Nothing in here touches a camera or a window; those live in `facepad-cv`.

pub mod calibration;
pub mod controller;
pub mod game;
pub mod geometry;
pub mod landmarks;
pub mod overlay;
pub mod settings;
pub mod signal;
pub mod trigger;

// Re-export commonly used types
pub use calibration::{CalibrationStage, Calibrator};
pub use controller::{Controller, DetectedFace, LandmarkSource, TickOutcome};
pub use game::{Game, Scoreboard};
pub use geometry::{Bounds, Point};
pub use landmarks::{FaceLandmarks, LandmarkError};
pub use overlay::{Color, DrawCommand, Surface};
pub use settings::{JsonFileStore, MemoryStore, Settings, SettingsError, SettingsStore};
pub use signal::{ControlSignals, SignalExtractor, SignalRange};
pub use trigger::Debouncer;

// Error handling
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
pub(crate) mod fixtures;
