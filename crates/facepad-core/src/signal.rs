//! Control signal extraction
//!
//! Raw signals are scale-free ratios of landmark distances, so they do not
//! change when the face moves closer to or further from the camera. Each raw
//! value is then mapped through a calibrated [`SignalRange`] into `[0, 1]`
//! and optionally smoothed.

use crate::geometry::{centroid, Point};
use crate::landmarks::{layout, FaceLandmarks, LandmarkError, Region};
use crate::settings::Settings;
use serde::{Deserialize, Serialize};

const MIN_SPAN: f32 = 1e-3;

/// Eyebrow raise as (eye-to-brow gap) / (inter-ocular distance)
pub fn brow_raise_raw(face: &FaceLandmarks) -> Result<f32, LandmarkError> {
    let left_eye = center_of(&face.left_eye, "left eye is empty")?;
    let right_eye = center_of(&face.right_eye, "right eye is empty")?;
    let left_brow = center_of(&face.left_brow, "left eyebrow is empty")?;
    let right_brow = center_of(&face.right_brow, "right eyebrow is empty")?;

    let inter_ocular = left_eye.distance(&right_eye);
    if inter_ocular < MIN_SPAN {
        return Err(LandmarkError::Degenerate { what: "eye centers coincide" });
    }

    // Image y grows downwards, so a raised brow has a smaller y than the eye
    let left_gap = left_eye.y - left_brow.y;
    let right_gap = right_eye.y - right_brow.y;

    Ok((left_gap + right_gap) / 2.0 / inter_ocular)
}

fn center_of(points: &[Point], what: &'static str) -> Result<Point, LandmarkError> {
    centroid(points).ok_or(LandmarkError::Degenerate { what })
}

/// Mouth openness as (inner lip gap) / (mouth width)
pub fn mouth_open_raw(face: &FaceLandmarks) -> Result<f32, LandmarkError> {
    let point = |offset: usize| {
        face.mouth
            .get(offset)
            .copied()
            .ok_or(LandmarkError::Region {
                region: Region::Mouth,
                expected: layout::MOUTH_LEN,
                got: face.mouth.len(),
            })
    };

    let width = point(layout::MOUTH_LEFT_CORNER)?.distance(&point(layout::MOUTH_RIGHT_CORNER)?);
    if width < MIN_SPAN {
        return Err(LandmarkError::Degenerate { what: "mouth corners coincide" });
    }

    let gap = point(layout::INNER_LIP_TOP)?.distance(&point(layout::INNER_LIP_BOTTOM)?);
    Ok(gap / width)
}

/// Linear map from a raw interval onto `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalRange {
    pub min: f32,
    pub max: f32,
}

impl SignalRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn normalize(&self, raw: f32) -> f32 {
        let span = self.max - self.min;
        if span.abs() < f32::EPSILON || !raw.is_finite() {
            return 0.0;
        }
        ((raw - self.min) / span).clamp(0.0, 1.0)
    }
}

/// Exponential moving average
#[derive(Debug, Clone)]
pub struct Smoother {
    alpha: f32,
    value: Option<f32>,
}

impl Smoother {
    /// `alpha` is the weight kept from the previous value; 0 disables smoothing
    pub fn new(alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 0.99),
            value: None,
        }
    }

    pub fn update(&mut self, sample: f32) -> f32 {
        let next = match self.value {
            Some(prev) => self.alpha * prev + (1.0 - self.alpha) * sample,
            None => sample,
        };
        self.value = Some(next);
        next
    }

    pub fn reset(&mut self) {
        self.value = None;
    }
}

/// Signals produced for one face in one tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlSignals {
    /// Normalized eyebrow raise, always in `[0, 1]`
    pub brow: f32,
    /// Normalized mouth openness, always in `[0, 1]`
    pub mouth: f32,
    pub raw_brow: f32,
    pub raw_mouth: f32,
}

/// Raw extraction, normalization and smoothing for both signals
#[derive(Debug, Clone)]
pub struct SignalExtractor {
    brow_range: SignalRange,
    mouth_range: SignalRange,
    brow_smoother: Smoother,
    mouth_smoother: Smoother,
}

impl SignalExtractor {
    pub fn new(brow_range: SignalRange, mouth_range: SignalRange, smoothing: f32) -> Self {
        Self {
            brow_range,
            mouth_range,
            brow_smoother: Smoother::new(smoothing),
            mouth_smoother: Smoother::new(smoothing),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.brow_range(), settings.mouth_range(), settings.smoothing)
    }

    pub fn extract(&mut self, face: &FaceLandmarks) -> Result<ControlSignals, LandmarkError> {
        let raw_brow = brow_raise_raw(face)?;
        let raw_mouth = mouth_open_raw(face)?;

        // Smoothing runs on normalized values so the output stays in [0, 1]
        let brow = self.brow_smoother.update(self.brow_range.normalize(raw_brow));
        let mouth = self.mouth_smoother.update(self.mouth_range.normalize(raw_mouth));

        Ok(ControlSignals {
            brow,
            mouth,
            raw_brow,
            raw_mouth,
        })
    }

    /// Forget smoothing history, e.g. after the face was lost
    pub fn reset(&mut self) {
        self.brow_smoother.reset();
        self.mouth_smoother.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::face_points;

    fn face(brow_lift: f32, mouth_gap: f32) -> FaceLandmarks {
        FaceLandmarks::from_points(&face_points(brow_lift, mouth_gap)).unwrap()
    }

    #[test]
    fn test_brow_raise_grows_with_lift() {
        let low = brow_raise_raw(&face(0.0, 3.0)).unwrap();
        let high = brow_raise_raw(&face(12.0, 3.0)).unwrap();
        assert!(high > low);
        // gap of 18.4 px over an inter-ocular distance of 80 px
        assert!((low - 0.23).abs() < 1e-4);
    }

    #[test]
    fn test_mouth_open_grows_with_gap() {
        let closed = mouth_open_raw(&face(0.0, 0.0)).unwrap();
        let open = mouth_open_raw(&face(0.0, 30.0)).unwrap();
        assert_eq!(closed, 0.0);
        assert!((open - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_raw_signals_ignore_translation_and_scale() {
        let points = face_points(6.0, 12.0);
        let moved: Vec<Point> = points.iter().map(|p| p.transform(-35.0, 120.0, 2.5)).collect();

        let a = FaceLandmarks::from_points(&points).unwrap();
        let b = FaceLandmarks::from_points(&moved).unwrap();

        assert!((brow_raise_raw(&a).unwrap() - brow_raise_raw(&b).unwrap()).abs() < 1e-4);
        assert!((mouth_open_raw(&a).unwrap() - mouth_open_raw(&b).unwrap()).abs() < 1e-4);
    }

    #[test]
    fn test_degenerate_eyes() {
        let mut landmarks = face(0.0, 3.0);
        landmarks.left_eye = landmarks.right_eye.clone();

        let err = brow_raise_raw(&landmarks).unwrap_err();
        assert!(err.is_eye_error());
    }

    #[test]
    fn test_normalize_clamps() {
        let range = SignalRange::new(0.2, 0.4);
        assert_eq!(range.normalize(0.1), 0.0);
        assert_eq!(range.normalize(0.9), 1.0);
        assert!((range.normalize(0.3) - 0.5).abs() < 1e-6);
        assert_eq!(range.normalize(f32::NAN), 0.0);
        assert_eq!(SignalRange::new(0.3, 0.3).normalize(0.3), 0.0);
    }

    #[test]
    fn test_smoother() {
        let mut smoother = Smoother::new(0.5);
        assert_eq!(smoother.update(1.0), 1.0);
        assert_eq!(smoother.update(0.0), 0.5);
        smoother.reset();
        assert_eq!(smoother.update(0.2), 0.2);

        let mut passthrough = Smoother::new(0.0);
        passthrough.update(1.0);
        assert_eq!(passthrough.update(0.3), 0.3);
    }

    #[test]
    fn test_extractor_output_in_unit_range() {
        let mut extractor = SignalExtractor::from_settings(&Settings::default());
        for (lift, gap) in [(0.0, 0.0), (40.0, 80.0), (-30.0, 2.0), (12.0, 30.0)] {
            let signals = extractor.extract(&face(lift, gap)).unwrap();
            assert!((0.0..=1.0).contains(&signals.brow));
            assert!((0.0..=1.0).contains(&signals.mouth));
        }
    }
}
