//! Face landmark regions
//!
//! The detector hands over one flat point sequence per face. This module
//! slices it into the regions the signals are computed from and checks
//! that each region is usable.

pub mod layout;

use crate::geometry::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Named landmark region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Region {
    LeftEye,
    RightEye,
    LeftBrow,
    RightBrow,
    Mouth,
}

impl Region {
    pub fn is_eye(&self) -> bool {
        matches!(self, Region::LeftEye | Region::RightEye)
    }

    pub fn expected_len(&self) -> usize {
        match self {
            Region::LeftEye | Region::RightEye => layout::EYE_LEN,
            Region::LeftBrow | Region::RightBrow => layout::BROW_LEN,
            Region::Mouth => layout::MOUTH_LEN,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Region::LeftEye => "left eye",
            Region::RightEye => "right eye",
            Region::LeftBrow => "left eyebrow",
            Region::RightBrow => "right eyebrow",
            Region::Mouth => "mouth",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LandmarkError {
    #[error("expected {expected} landmark points, got {got}")]
    PointCount { expected: usize, got: usize },

    #[error("{region} has {got} points, expected {expected}")]
    Region {
        region: Region,
        expected: usize,
        got: usize,
    },

    #[error("{region} contains a non-finite coordinate")]
    NonFinite { region: Region },

    #[error("degenerate geometry: {what}")]
    Degenerate { what: &'static str },
}

impl LandmarkError {
    /// Whether the error concerns the eye regions
    pub fn is_eye_error(&self) -> bool {
        match self {
            LandmarkError::Region { region, .. } | LandmarkError::NonFinite { region } => {
                region.is_eye()
            }
            LandmarkError::Degenerate { what } => what.contains("eye"),
            LandmarkError::PointCount { .. } => false,
        }
    }
}

/// Landmark regions of a single face for a single tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceLandmarks {
    pub left_eye: Vec<Point>,
    pub right_eye: Vec<Point>,
    pub left_brow: Vec<Point>,
    pub right_brow: Vec<Point>,
    pub mouth: Vec<Point>,
}

impl FaceLandmarks {
    /// Slice a 68-point sequence into regions and validate them
    pub fn from_points(points: &[Point]) -> Result<Self, LandmarkError> {
        if points.len() != layout::POINT_COUNT {
            return Err(LandmarkError::PointCount {
                expected: layout::POINT_COUNT,
                got: points.len(),
            });
        }

        let landmarks = Self {
            left_eye: points[layout::LEFT_EYE].to_vec(),
            right_eye: points[layout::RIGHT_EYE].to_vec(),
            left_brow: points[layout::LEFT_BROW].to_vec(),
            right_brow: points[layout::RIGHT_BROW].to_vec(),
            mouth: points[layout::MOUTH].to_vec(),
        };
        landmarks.validate()?;

        Ok(landmarks)
    }

    /// Check region sizes and coordinates. Eyes are checked first.
    pub fn validate(&self) -> Result<(), LandmarkError> {
        for (region, points) in self.regions() {
            let expected = region.expected_len();
            if points.len() != expected {
                return Err(LandmarkError::Region {
                    region,
                    expected,
                    got: points.len(),
                });
            }
            if !points.iter().all(Point::is_finite) {
                return Err(LandmarkError::NonFinite { region });
            }
        }
        Ok(())
    }

    /// Regions paired with their points, eyes first
    pub fn regions(&self) -> [(Region, &[Point]); 5] {
        [
            (Region::LeftEye, self.left_eye.as_slice()),
            (Region::RightEye, self.right_eye.as_slice()),
            (Region::LeftBrow, self.left_brow.as_slice()),
            (Region::RightBrow, self.right_brow.as_slice()),
            (Region::Mouth, self.mouth.as_slice()),
        ]
    }

    /// All points, for drawing
    pub fn all_points(&self) -> Vec<Point> {
        self.regions()
            .iter()
            .flat_map(|(_, points)| points.iter().copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::face_points;

    #[test]
    fn test_from_points() {
        let landmarks = FaceLandmarks::from_points(&face_points(0.0, 3.0)).unwrap();
        assert_eq!(landmarks.left_eye.len(), 6);
        assert_eq!(landmarks.right_brow.len(), 5);
        assert_eq!(landmarks.mouth.len(), 20);
        assert_eq!(landmarks.all_points().len(), 6 + 6 + 5 + 5 + 20);
    }

    #[test]
    fn test_wrong_point_count() {
        let err = FaceLandmarks::from_points(&face_points(0.0, 3.0)[..60]).unwrap_err();
        assert_eq!(err, LandmarkError::PointCount { expected: 68, got: 60 });
        assert!(!err.is_eye_error());
    }

    #[test]
    fn test_malformed_eye() {
        let mut landmarks = FaceLandmarks::from_points(&face_points(0.0, 3.0)).unwrap();
        landmarks.right_eye.pop();

        let err = landmarks.validate().unwrap_err();
        assert!(err.is_eye_error());
        assert_eq!(
            err.to_string(),
            "right eye has 5 points, expected 6"
        );
    }

    #[test]
    fn test_non_finite() {
        let mut points = face_points(0.0, 3.0);
        points[layout::MOUTH.start].x = f32::NAN;

        let err = FaceLandmarks::from_points(&points).unwrap_err();
        assert_eq!(err, LandmarkError::NonFinite { region: Region::Mouth });
    }
}
