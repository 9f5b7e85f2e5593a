//! Overlay rendering with OpenCV drawing primitives

use crate::Result;
use anyhow::Context;
use facepad_core::{Color, DrawCommand, Surface};
use opencv::{
    core::{Mat, Point, Rect, Scalar},
    highgui,
    imgproc::{self, FILLED, FONT_HERSHEY_SIMPLEX, LINE_8, LINE_AA},
    prelude::*,
};

const METER_X: i32 = 10;
const METER_Y: i32 = 12;
const METER_WIDTH: i32 = 200;
const METER_HEIGHT: i32 = 16;
const METER_SPACING: i32 = 28;
const LABEL_SPACING: i32 = 26;

/// OpenCV color scalar (BGR format)
fn bgr(color: Color) -> Scalar {
    Scalar::new(color.b as f64, color.g as f64, color.r as f64, 255.0)
}

/// Draws overlay commands onto a frame
#[derive(Default)]
pub struct Painter {
    canvas: Mat,
}

impl Painter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new frame; commands draw on a copy of `frame`
    pub fn begin(&mut self, frame: &Mat) -> Result<()> {
        frame.copy_to(&mut self.canvas).context("Failed to copy frame")?;
        Ok(())
    }

    pub fn canvas(&self) -> &Mat {
        &self.canvas
    }

    fn draw_one(&mut self, command: &DrawCommand) -> Result<()> {
        match command {
            DrawCommand::Points {
                points,
                color,
                radius,
            } => {
                for p in points {
                    imgproc::circle(
                        &mut self.canvas,
                        Point::new(p.x.round() as i32, p.y.round() as i32),
                        *radius as i32,
                        bgr(*color),
                        FILLED,
                        LINE_8,
                        0,
                    )?;
                }
            }
            DrawCommand::Meter {
                slot,
                label,
                value,
                threshold,
                color,
            } => {
                let y = METER_Y + *slot as i32 * METER_SPACING;
                let outline = Rect::new(METER_X, y, METER_WIDTH, METER_HEIGHT);
                let filled = (value.clamp(0.0, 1.0) * METER_WIDTH as f32).round() as i32;

                if filled > 0 {
                    imgproc::rectangle(
                        &mut self.canvas,
                        Rect::new(METER_X, y, filled, METER_HEIGHT),
                        bgr(*color),
                        FILLED,
                        LINE_8,
                        0,
                    )?;
                }
                imgproc::rectangle(&mut self.canvas, outline, bgr(Color::WHITE), 1, LINE_8, 0)?;

                if let Some(t) = threshold {
                    let x = METER_X + (t.clamp(0.0, 1.0) * METER_WIDTH as f32).round() as i32;
                    imgproc::line(
                        &mut self.canvas,
                        Point::new(x, y - 3),
                        Point::new(x, y + METER_HEIGHT + 3),
                        bgr(Color::RED),
                        2,
                        LINE_8,
                        0,
                    )?;
                }

                imgproc::put_text(
                    &mut self.canvas,
                    &format!("{label} {value:.2}"),
                    Point::new(METER_X + METER_WIDTH + 10, y + METER_HEIGHT - 3),
                    FONT_HERSHEY_SIMPLEX,
                    0.5,
                    bgr(Color::WHITE),
                    1,
                    LINE_AA,
                    false,
                )?;
            }
            DrawCommand::Label { line, text, color } => {
                let y = self.canvas.rows() - 12 - *line as i32 * LABEL_SPACING;
                imgproc::put_text(
                    &mut self.canvas,
                    text,
                    Point::new(METER_X, y),
                    FONT_HERSHEY_SIMPLEX,
                    0.6,
                    bgr(*color),
                    2,
                    LINE_AA,
                    false,
                )?;
            }
            DrawCommand::Flash { color } => {
                let frame = Rect::new(0, 0, self.canvas.cols(), self.canvas.rows());
                imgproc::rectangle(&mut self.canvas, frame, bgr(*color), 12, LINE_8, 0)?;
            }
        }
        Ok(())
    }
}

impl Surface for Painter {
    fn draw(&mut self, commands: &[DrawCommand]) -> facepad_core::Result<()> {
        if self.canvas.empty() {
            anyhow::bail!("draw called before begin");
        }
        for command in commands {
            self.draw_one(command)?;
        }
        Ok(())
    }
}

/// A highgui window showing the annotated camera frame
pub struct WindowSurface {
    name: String,
    painter: Painter,
}

impl WindowSurface {
    pub fn open(name: &str) -> Result<Self> {
        highgui::named_window(name, highgui::WINDOW_AUTOSIZE)
            .with_context(|| format!("Failed to open window: {}", name))?;
        Ok(Self {
            name: name.to_string(),
            painter: Painter::new(),
        })
    }

    pub fn begin(&mut self, frame: &Mat) -> Result<()> {
        self.painter.begin(frame)
    }

    pub fn canvas(&self) -> &Mat {
        self.painter.canvas()
    }

    pub fn present(&self) -> Result<()> {
        highgui::imshow(&self.name, self.painter.canvas()).context("Failed to show frame")?;
        Ok(())
    }

    /// Wait up to `delay_ms` for a key press
    pub fn poll_key(&self, delay_ms: i32) -> Result<Option<i32>> {
        let key = highgui::wait_key(delay_ms.max(1))?;
        Ok((key >= 0).then_some(key & 0xff))
    }
}

impl Surface for WindowSurface {
    fn draw(&mut self, commands: &[DrawCommand]) -> facepad_core::Result<()> {
        self.painter.draw(commands)
    }
}

impl Drop for WindowSurface {
    fn drop(&mut self) {
        let _ = highgui::destroy_window(&self.name);
    }
}
