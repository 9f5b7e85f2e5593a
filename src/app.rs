//! The periodic detection-and-draw loop

use crate::cli::Args;
use anyhow::Context;
use facepad_core::{
    Controller, DetectedFace, Game, JsonFileStore, LandmarkSource, Scoreboard, Settings, Surface, TickOutcome,
};
use facepad_cv::{Camera, DetectorConfig, FrameUtils, LbfDetector, WindowSurface};
use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::thread;
use std::time::Instant;

const WINDOW_NAME: &str = "facepad";
const MAX_FRAME_FAILURES: u32 = 50;
const KEY_ESC: i32 = 27;

/// What a key press asks the loop to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Quit,
    Calibrate,
    CancelCalibration,
    ToggleLandmarks,
    ToggleMeters,
    ToggleMirror,
    TogglePause,
    Snapshot,
}

fn action_for_key(key: i32) -> Option<Action> {
    if key == KEY_ESC {
        return Some(Action::Quit);
    }
    let action = match u8::try_from(key).ok()?.to_ascii_lowercase() {
        b'q' => Action::Quit,
        b'c' => Action::Calibrate,
        b'x' => Action::CancelCalibration,
        b'l' => Action::ToggleLandmarks,
        b'm' => Action::ToggleMeters,
        b'r' => Action::ToggleMirror,
        b'p' => Action::TogglePause,
        b's' => Action::Snapshot,
        _ => return None,
    };
    Some(action)
}

/// Detection errors cost one tick, not the session
fn detect_or_miss<S: LandmarkSource>(source: &mut S, frame: &S::Frame) -> Vec<DetectedFace> {
    source.detect(frame).unwrap_or_else(|e| {
        warn!("Detection failed, skipping tick: {e:#}");
        Vec::new()
    })
}

pub struct App {
    camera: Camera,
    detector: LbfDetector,
    window: Option<WindowSurface>,
    controller: Controller<Scoreboard>,
    store: JsonFileStore,
    snapshot_dir: PathBuf,
    calibration_samples: usize,
    started: Instant,
}

impl App {
    pub fn new(args: &Args, settings: Settings, store: JsonFileStore) -> anyhow::Result<Self> {
        let mut config = match &args.detector_config {
            Some(path) => DetectorConfig::from_file(path)?,
            None if args.low_power => DetectorConfig::for_low_power(),
            None => DetectorConfig::default(),
        };
        if let Some(cascade) = &args.cascade {
            config.cascade_path = cascade.clone();
        }
        if let Some(model) = &args.lbf_model {
            config.lbf_model_path = model.clone();
        }
        let detector = LbfDetector::new(config).context("Failed to set up landmark detector")?;

        let mut camera = Camera::open(args.camera, args.size)?;
        camera.set_mirror(settings.mirror);

        let window = if args.headless {
            None
        } else {
            Some(WindowSurface::open(WINDOW_NAME)?)
        };

        let mut controller = Controller::new(settings, Scoreboard::new());
        if args.calibrate {
            controller.start_calibration(args.calibration_samples);
        }

        Ok(Self {
            camera,
            detector,
            window,
            controller,
            store,
            snapshot_dir: args.snapshot_dir.clone(),
            calibration_samples: args.calibration_samples,
            started: Instant::now(),
        })
    }

    /// Run ticks until the user quits. Ticks never overlap: each one
    /// captures, detects, updates and draws before the next is scheduled.
    pub fn run(&mut self) -> anyhow::Result<()> {
        info!(
            "Running every {} ms (q quit, c calibrate, l landmarks, m meters, r mirror, p pause, s snapshot)",
            self.controller.settings().detection_interval_ms
        );

        let mut failures = 0;
        loop {
            let tick_start = Instant::now();

            let frame = match self.camera.next_frame() {
                Ok(frame) => {
                    failures = 0;
                    frame
                }
                Err(e) => {
                    failures += 1;
                    if failures >= MAX_FRAME_FAILURES {
                        return Err(e.context("Camera stopped delivering frames"));
                    }
                    warn!("Frame capture failed ({failures}/{MAX_FRAME_FAILURES}): {e:#}");
                    thread::sleep(self.controller.settings().interval());
                    continue;
                }
            };

            let faces = if self.controller.settings().paused {
                Vec::new()
            } else {
                detect_or_miss(&mut self.detector, &frame)
            };

            let outcome = self.controller.tick(&faces, self.started.elapsed());
            self.log_outcome(&outcome);
            self.finish_calibration()?;

            let remaining = self
                .controller
                .settings()
                .interval()
                .saturating_sub(tick_start.elapsed());

            let Some(window) = self.window.as_mut() else {
                thread::sleep(remaining);
                continue;
            };

            window.begin(&frame)?;
            window.draw(&outcome.commands)?;
            window.present()?;

            let wait_ms = i32::try_from(remaining.as_millis()).unwrap_or(i32::MAX);
            if let Some(action) = window.poll_key(wait_ms)?.and_then(action_for_key) {
                if action == Action::Quit {
                    info!("Exit requested by user");
                    break;
                }
                self.handle(action)?;
            }
        }

        info!("Final {}", self.controller.game().status());
        Ok(())
    }

    fn log_outcome(&self, outcome: &TickOutcome) {
        match &outcome.signals {
            Some(s) => debug!(
                "faces={} brow={:.2} ({:.3}) mouth={:.2} ({:.3}) fired={}",
                outcome.faces, s.brow, s.raw_brow, s.mouth, s.raw_mouth, outcome.fired
            ),
            None => debug!("faces={} no signals", outcome.faces),
        }
    }

    fn finish_calibration(&mut self) -> anyhow::Result<()> {
        let Some(calibrator) = self.controller.take_finished_calibration() else {
            return Ok(());
        };

        match calibrator.finish(self.controller.settings()) {
            Ok(settings) => {
                info!(
                    "Calibrated: brow {:.3}..{:.3}, mouth {:.3}..{:.3}",
                    settings.brow_min, settings.brow_max, settings.mouth_min, settings.mouth_max
                );
                settings.save(&mut self.store)?;
                self.controller.apply_settings(settings);
            }
            Err(e) => error!("Calibration failed: {e}"),
        }
        Ok(())
    }

    fn handle(&mut self, action: Action) -> anyhow::Result<()> {
        match action {
            Action::Quit => {}
            Action::Calibrate => self.controller.start_calibration(self.calibration_samples),
            Action::CancelCalibration => self.controller.cancel_calibration(),
            Action::ToggleLandmarks => {
                self.update_setting("show_landmarks", |s| s.show_landmarks = !s.show_landmarks)?
            }
            Action::ToggleMeters => {
                self.update_setting("show_meters", |s| s.show_meters = !s.show_meters)?
            }
            Action::ToggleMirror => {
                self.update_setting("mirror", |s| s.mirror = !s.mirror)?;
                self.camera.set_mirror(self.controller.settings().mirror);
            }
            Action::TogglePause => {
                self.update_setting("paused", |s| s.paused = !s.paused)?;
                info!("Paused: {}", self.controller.settings().paused);
            }
            Action::Snapshot => self.snapshot()?,
        }
        Ok(())
    }

    /// Change one field, apply it and persist it right away
    fn update_setting(&mut self, key: &str, change: impl FnOnce(&mut Settings)) -> anyhow::Result<()> {
        let mut settings = self.controller.settings().clone();
        change(&mut settings);
        settings.save_field(&mut self.store, key)?;
        self.controller.apply_settings(settings);
        Ok(())
    }

    fn snapshot(&self) -> anyhow::Result<()> {
        let Some(window) = &self.window else {
            return Ok(());
        };
        let name = format!("facepad-{}.png", self.started.elapsed().as_millis());
        let path = self.snapshot_dir.join(name);
        FrameUtils::save_snapshot(window.canvas(), &path)?;
        info!("Snapshot saved: {:?}", path);
        Ok(())
    }
}
