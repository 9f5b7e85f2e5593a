//! Error types for the OpenCV collaborators

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CvError {
    #[error("camera {0} could not be opened")]
    CameraUnavailable(i32),

    #[error("camera {0} returned an empty frame")]
    EmptyFrame(i32),

    #[error("model file not found: {0:?}")]
    ModelMissing(PathBuf),

    #[error("cascade classifier at {0:?} is empty")]
    EmptyCascade(PathBuf),

    #[error("frame has unsupported layout: {0}")]
    UnsupportedFrame(String),
}
