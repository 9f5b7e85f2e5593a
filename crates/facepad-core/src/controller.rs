//! One detection-and-draw tick
//!
//! The controller owns the signal extractor, the debouncer and the game.
//! Each tick it takes the faces a [`LandmarkSource`] found, picks the most
//! prominent one, turns it into signals, steers the game with mouth
//! openness and resets it when the eyebrow trigger fires.

use crate::calibration::{CalibrationStage, Calibrator};
use crate::game::Game;
use crate::geometry::{Bounds, Point};
use crate::landmarks::FaceLandmarks;
use crate::overlay::{self, DrawCommand, OverlayInput};
use crate::settings::Settings;
use crate::signal::{ControlSignals, SignalExtractor};
use crate::trigger::Debouncer;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A face as reported by the detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedFace {
    pub bounds: Bounds,
    pub points: Vec<Point>,
}

impl DetectedFace {
    pub fn new(bounds: Bounds, points: Vec<Point>) -> Self {
        Self { bounds, points }
    }

    /// Bounds derived from the points themselves
    pub fn from_points(points: Vec<Point>) -> Self {
        let bounds = Bounds::of_points(&points).unwrap_or_default();
        Self { bounds, points }
    }
}

/// Face landmark detector collaborator
pub trait LandmarkSource {
    type Frame;

    /// Zero or more faces found in `frame`
    fn detect(&mut self, frame: &Self::Frame) -> crate::Result<Vec<DetectedFace>>;
}

/// Result of one tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub faces: usize,
    pub signals: Option<ControlSignals>,
    pub fired: bool,
    pub calibration: Option<CalibrationStage>,
    pub commands: Vec<DrawCommand>,
}

pub struct Controller<G: Game> {
    settings: Settings,
    extractor: SignalExtractor,
    debouncer: Debouncer,
    calibrator: Option<Calibrator>,
    game: G,
}

impl<G: Game> Controller<G> {
    pub fn new(settings: Settings, game: G) -> Self {
        Self {
            extractor: SignalExtractor::from_settings(&settings),
            debouncer: Debouncer::from_settings(&settings),
            settings,
            calibrator: None,
            game,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    /// Replace the settings, rebuilding signal state when ranges or trigger
    /// parameters changed. Display toggles apply without a rebuild.
    pub fn apply_settings(&mut self, settings: Settings) {
        let signal_changed = settings.brow_range() != self.settings.brow_range()
            || settings.mouth_range() != self.settings.mouth_range()
            || settings.smoothing != self.settings.smoothing;
        let trigger_changed = settings.brow_threshold != self.settings.brow_threshold
            || settings.brow_hysteresis != self.settings.brow_hysteresis
            || settings.hold_ticks != self.settings.hold_ticks
            || settings.cooldown_ms != self.settings.cooldown_ms;

        if signal_changed {
            debug!("Signal settings changed, rebuilding extractor");
            self.extractor = SignalExtractor::from_settings(&settings);
        }
        if trigger_changed {
            debug!("Trigger settings changed, rebuilding debouncer");
            self.debouncer = Debouncer::from_settings(&settings);
        }

        self.settings = settings;
    }

    /// Start a guided calibration; it runs over the following ticks
    pub fn start_calibration(&mut self, samples_per_stage: usize) {
        let calibrator = Calibrator::new(samples_per_stage);
        info!("Calibration started: {}", calibrator.stage());
        self.calibrator = Some(calibrator);
    }

    pub fn is_calibrating(&self) -> bool {
        self.calibrator.is_some()
    }

    /// Run one tick over the faces found in the current frame.
    /// `now` is the time since the loop started.
    pub fn tick(&mut self, faces: &[DetectedFace], now: Duration) -> TickOutcome {
        if self.settings.paused {
            let status = self.game.status();
            let commands = overlay::compose(
                &self.settings,
                &OverlayInput {
                    status: &status,
                    ..OverlayInput::default()
                },
            );
            return TickOutcome {
                faces: faces.len(),
                signals: None,
                fired: false,
                calibration: self.calibration_stage(),
                commands,
            };
        }

        let face = select_face(faces).and_then(|face| {
            match FaceLandmarks::from_points(&face.points) {
                Ok(landmarks) => Some(landmarks),
                Err(e) if e.is_eye_error() => {
                    warn!("Eye landmarks malformed: {e}");
                    None
                }
                Err(e) => {
                    warn!("Skipping face: {e}");
                    None
                }
            }
        });

        let signals = face.as_ref().and_then(|landmarks| match self.extractor.extract(landmarks) {
            Ok(signals) => Some(signals),
            Err(e) => {
                warn!("Signal extraction failed: {e}");
                None
            }
        });

        let mut fired = false;
        match &signals {
            Some(signals) => {
                if let Some(calibrator) = self.calibrator.as_mut() {
                    if let Some(stage) = calibrator.push(signals) {
                        info!("Calibration stage: {stage}");
                    }
                } else {
                    self.game.steer(signals.mouth);
                    fired = self.debouncer.update(signals.brow, now);
                    if fired {
                        info!("Eyebrow raise {:.2}, resetting game", signals.brow);
                        self.game.reset();
                    }
                }
            }
            None => {
                self.debouncer.miss();
                self.extractor.reset();
            }
        }

        let calibration = self.calibration_stage();
        let notice = self
            .calibrator
            .as_ref()
            .filter(|c| !c.is_done())
            .map(|c| c.stage().prompt());

        let status = self.game.status();
        let commands = overlay::compose(
            &self.settings,
            &OverlayInput {
                face: face.as_ref(),
                signals: signals.as_ref(),
                fired,
                status: &status,
                notice,
            },
        );

        TickOutcome {
            faces: faces.len(),
            signals,
            fired,
            calibration,
            commands,
        }
    }

    /// Take the finished calibrator, if any, leaving normal operation
    pub fn take_finished_calibration(&mut self) -> Option<Calibrator> {
        if self.calibrator.as_ref().is_some_and(Calibrator::is_done) {
            self.calibrator.take()
        } else {
            None
        }
    }

    pub fn cancel_calibration(&mut self) {
        if self.calibrator.take().is_some() {
            info!("Calibration cancelled");
        }
    }

    fn calibration_stage(&self) -> Option<CalibrationStage> {
        self.calibrator.as_ref().map(Calibrator::stage)
    }
}

/// The face with the largest bounds is the player
fn select_face(faces: &[DetectedFace]) -> Option<&DetectedFace> {
    faces
        .iter()
        .max_by(|a, b| a.bounds.area().total_cmp(&b.bounds.area()))
}
