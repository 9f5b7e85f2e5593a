//! Visual feedback as backend-neutral draw commands

use crate::geometry::Point;
use crate::landmarks::FaceLandmarks;
use crate::settings::Settings;
use crate::signal::ControlSignals;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const GREEN: Color = Color::rgb(0, 220, 90);
    pub const CYAN: Color = Color::rgb(0, 200, 255);
    pub const ORANGE: Color = Color::rgb(255, 150, 0);
    pub const RED: Color = Color::rgb(235, 40, 40);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    /// Landmark dots
    Points {
        points: Vec<Point>,
        color: Color,
        radius: u32,
    },
    /// Horizontal bar filled to `value`, stacked by `slot`
    Meter {
        slot: usize,
        label: String,
        value: f32,
        threshold: Option<f32>,
        color: Color,
    },
    /// Text line, stacked by `line` from the bottom of the frame
    Label {
        line: usize,
        text: String,
        color: Color,
    },
    /// Frame-wide highlight for the tick a trigger fired
    Flash { color: Color },
}

/// Rendering surface the overlay is drawn on
pub trait Surface {
    fn draw(&mut self, commands: &[DrawCommand]) -> crate::Result<()>;
}

/// What to show for one tick
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlayInput<'a> {
    pub face: Option<&'a FaceLandmarks>,
    pub signals: Option<&'a ControlSignals>,
    pub fired: bool,
    pub status: &'a str,
    pub notice: Option<&'a str>,
}

/// Build the command list for a tick according to the display toggles
pub fn compose(settings: &Settings, input: &OverlayInput<'_>) -> Vec<DrawCommand> {
    let mut commands = Vec::new();

    if input.fired {
        commands.push(DrawCommand::Flash { color: Color::RED });
    }

    if settings.show_landmarks && !settings.paused {
        if let Some(face) = input.face {
            commands.push(DrawCommand::Points {
                points: face.all_points(),
                color: Color::GREEN,
                radius: 2,
            });
        }
    }

    // A paused tick shows labels only
    if settings.show_meters && !settings.paused {
        let (brow, mouth) = input.signals.map_or((0.0, 0.0), |s| (s.brow, s.mouth));
        commands.push(DrawCommand::Meter {
            slot: 0,
            label: "brow".into(),
            value: brow,
            threshold: Some(settings.brow_threshold),
            color: if brow >= settings.brow_threshold {
                Color::ORANGE
            } else {
                Color::CYAN
            },
        });
        commands.push(DrawCommand::Meter {
            slot: 1,
            label: "mouth".into(),
            value: mouth,
            threshold: None,
            color: Color::CYAN,
        });
    }

    let mut line = 0;
    if !input.status.is_empty() {
        commands.push(DrawCommand::Label {
            line,
            text: input.status.to_string(),
            color: Color::WHITE,
        });
        line += 1;
    }

    let notice = if settings.paused {
        Some("paused")
    } else if input.face.is_none() && input.notice.is_none() {
        Some("no face")
    } else {
        input.notice
    };
    if let Some(text) = notice {
        commands.push(DrawCommand::Label {
            line,
            text: text.to_string(),
            color: Color::ORANGE,
        });
    }

    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::face_points;

    fn count(commands: &[DrawCommand], pred: fn(&DrawCommand) -> bool) -> usize {
        commands.iter().filter(|c| pred(c)).count()
    }

    #[test]
    fn test_full_overlay() {
        let face = FaceLandmarks::from_points(&face_points(0.0, 3.0)).unwrap();
        let signals = ControlSignals {
            brow: 0.9,
            mouth: 0.1,
            raw_brow: 0.4,
            raw_mouth: 0.1,
        };
        let input = OverlayInput {
            face: Some(&face),
            signals: Some(&signals),
            fired: true,
            status: "score 0",
            notice: None,
        };

        let commands = compose(&Settings::default(), &input);
        assert_eq!(commands[0], DrawCommand::Flash { color: Color::RED });
        assert_eq!(count(&commands, |c| matches!(c, DrawCommand::Points { .. })), 1);
        assert_eq!(count(&commands, |c| matches!(c, DrawCommand::Meter { .. })), 2);
        assert!(commands.contains(&DrawCommand::Meter {
            slot: 0,
            label: "brow".into(),
            value: 0.9,
            threshold: Some(0.65),
            color: Color::ORANGE,
        }));
        assert_eq!(count(&commands, |c| matches!(c, DrawCommand::Label { .. })), 1);
    }

    #[test]
    fn test_toggles_and_no_face() {
        let settings = Settings {
            show_landmarks: false,
            show_meters: false,
            ..Settings::default()
        };
        let commands = compose(&settings, &OverlayInput::default());

        assert_eq!(
            commands,
            vec![DrawCommand::Label {
                line: 0,
                text: "no face".into(),
                color: Color::ORANGE,
            }]
        );
    }

    #[test]
    fn test_paused_notice() {
        let settings = Settings {
            paused: true,
            ..Settings::default()
        };
        let input = OverlayInput {
            status: "score 3",
            ..OverlayInput::default()
        };
        let commands = compose(&settings, &input);

        assert_eq!(commands.len(), 2);
        assert!(matches!(&commands[1], DrawCommand::Label { line: 1, text, .. } if text == "paused"));
    }
}
