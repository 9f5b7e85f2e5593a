//! facepad computer vision collaborators
//!
//! OpenCV-backed implementations of the seams `facepad-core` defines:
//! camera capture, a cascade + LBF landmark detector and a window surface
//! for the overlay.

pub mod bbox;
pub mod capture;
pub mod detection;
pub mod error;
pub mod render;
pub mod utils;

// Re-export commonly used types
pub use bbox::{FaceBox, FaceBoxCollection};
pub use capture::Camera;
pub use detection::{DetectorConfig, LbfDetector};
pub use error::CvError;
pub use render::{Painter, WindowSurface};
pub use utils::FrameUtils;

// Error handling
pub type Result<T> = anyhow::Result<T>;
