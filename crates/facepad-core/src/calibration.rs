//! Guided calibration of the signal ranges
//!
//! Faces differ a lot in how far brows sit above the eyes, so the default
//! ranges rarely fit. The calibrator averages raw samples while the user
//! holds a neutral face, then raised brows, then a wide open mouth, and
//! derives `brow_min/brow_max/mouth_min/mouth_max` from those averages.

use crate::settings::Settings;
use crate::signal::ControlSignals;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Smallest accepted gap between a calibrated minimum and maximum
pub const MIN_SEPARATION: f32 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalibrationStage {
    Neutral,
    BrowsRaised,
    MouthOpen,
    Done,
}

impl CalibrationStage {
    pub fn prompt(&self) -> &'static str {
        match self {
            CalibrationStage::Neutral => "Relax your face",
            CalibrationStage::BrowsRaised => "Raise your eyebrows",
            CalibrationStage::MouthOpen => "Open your mouth wide",
            CalibrationStage::Done => "Calibration complete",
        }
    }

    fn next(&self) -> Self {
        match self {
            CalibrationStage::Neutral => CalibrationStage::BrowsRaised,
            CalibrationStage::BrowsRaised => CalibrationStage::MouthOpen,
            CalibrationStage::MouthOpen | CalibrationStage::Done => CalibrationStage::Done,
        }
    }
}

impl fmt::Display for CalibrationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prompt())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalibrationError {
    #[error("calibration is still at stage: {0}")]
    Unfinished(CalibrationStage),

    #[error("{signal} barely changed ({min:.3} -> {max:.3}); try a stronger expression")]
    FlatRange {
        signal: &'static str,
        min: f32,
        max: f32,
    },

    #[error(transparent)]
    Settings(#[from] crate::settings::SettingsError),
}

#[derive(Debug, Clone)]
pub struct Calibrator {
    samples_per_stage: usize,
    stage: CalibrationStage,
    brow_sum: f32,
    mouth_sum: f32,
    count: usize,
    neutral: Option<(f32, f32)>,
    raised_brow: Option<f32>,
    open_mouth: Option<f32>,
}

impl Calibrator {
    pub fn new(samples_per_stage: usize) -> Self {
        Self {
            samples_per_stage: samples_per_stage.max(1),
            stage: CalibrationStage::Neutral,
            brow_sum: 0.0,
            mouth_sum: 0.0,
            count: 0,
            neutral: None,
            raised_brow: None,
            open_mouth: None,
        }
    }

    pub fn stage(&self) -> CalibrationStage {
        self.stage
    }

    pub fn is_done(&self) -> bool {
        self.stage == CalibrationStage::Done
    }

    /// Samples collected in the current stage and samples needed
    pub fn progress(&self) -> (usize, usize) {
        (self.count, self.samples_per_stage)
    }

    /// Add the raw values of one tick. Returns the new stage when the
    /// current one completes.
    pub fn push(&mut self, signals: &ControlSignals) -> Option<CalibrationStage> {
        if self.is_done() {
            return None;
        }

        self.brow_sum += signals.raw_brow;
        self.mouth_sum += signals.raw_mouth;
        self.count += 1;

        if self.count < self.samples_per_stage {
            return None;
        }

        let n = self.count as f32;
        let (brow, mouth) = (self.brow_sum / n, self.mouth_sum / n);
        match self.stage {
            CalibrationStage::Neutral => self.neutral = Some((brow, mouth)),
            CalibrationStage::BrowsRaised => self.raised_brow = Some(brow),
            CalibrationStage::MouthOpen => self.open_mouth = Some(mouth),
            CalibrationStage::Done => {}
        }

        self.brow_sum = 0.0;
        self.mouth_sum = 0.0;
        self.count = 0;
        self.stage = self.stage.next();
        Some(self.stage)
    }

    /// Apply the calibrated ranges on top of `base`
    pub fn finish(&self, base: &Settings) -> Result<Settings, CalibrationError> {
        let (Some((brow_min, mouth_min)), Some(brow_max), Some(mouth_max)) =
            (self.neutral, self.raised_brow, self.open_mouth)
        else {
            return Err(CalibrationError::Unfinished(self.stage));
        };

        check_separation("eyebrow raise", brow_min, brow_max)?;
        check_separation("mouth openness", mouth_min, mouth_max)?;

        let settings = Settings {
            brow_min,
            brow_max,
            mouth_min,
            mouth_max,
            ..base.clone()
        };
        settings.validate()?;

        Ok(settings)
    }
}

fn check_separation(signal: &'static str, min: f32, max: f32) -> Result<(), CalibrationError> {
    if max - min < MIN_SEPARATION {
        return Err(CalibrationError::FlatRange { signal, min, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(brow: f32, mouth: f32) -> ControlSignals {
        ControlSignals {
            brow: 0.0,
            mouth: 0.0,
            raw_brow: brow,
            raw_mouth: mouth,
        }
    }

    #[test]
    fn test_full_run() {
        let mut calibrator = Calibrator::new(2);
        assert_eq!(calibrator.stage(), CalibrationStage::Neutral);

        assert_eq!(calibrator.push(&raw(0.20, 0.04)), None);
        assert_eq!(calibrator.progress(), (1, 2));
        assert_eq!(calibrator.push(&raw(0.24, 0.06)), Some(CalibrationStage::BrowsRaised));

        calibrator.push(&raw(0.40, 0.05));
        assert_eq!(calibrator.push(&raw(0.44, 0.05)), Some(CalibrationStage::MouthOpen));

        calibrator.push(&raw(0.22, 0.50));
        assert_eq!(calibrator.push(&raw(0.22, 0.70)), Some(CalibrationStage::Done));
        assert!(calibrator.is_done());
        assert_eq!(calibrator.push(&raw(0.0, 0.0)), None);

        let settings = calibrator.finish(&Settings::default()).unwrap();
        assert!((settings.brow_min - 0.22).abs() < 1e-6);
        assert!((settings.brow_max - 0.42).abs() < 1e-6);
        assert!((settings.mouth_min - 0.05).abs() < 1e-6);
        assert!((settings.mouth_max - 0.60).abs() < 1e-6);
        assert_eq!(settings.brow_threshold, Settings::default().brow_threshold);
    }

    #[test]
    fn test_unfinished() {
        let mut calibrator = Calibrator::new(1);
        calibrator.push(&raw(0.2, 0.1));

        assert_eq!(
            calibrator.finish(&Settings::default()),
            Err(CalibrationError::Unfinished(CalibrationStage::BrowsRaised))
        );
    }

    #[test]
    fn test_flat_brow_range() {
        let mut calibrator = Calibrator::new(1);
        calibrator.push(&raw(0.25, 0.05));
        calibrator.push(&raw(0.255, 0.05));
        calibrator.push(&raw(0.25, 0.5));

        let err = calibrator.finish(&Settings::default()).unwrap_err();
        assert!(matches!(err, CalibrationError::FlatRange { signal: "eyebrow raise", .. }));
    }
}
