//! Webcam capture

use crate::error::CvError;
use crate::utils::FrameUtils;
use crate::Result;
use anyhow::Context;
use log::{info, warn};
use opencv::{
    core::Mat,
    prelude::*,
    videoio::{self, VideoCapture},
};

pub struct Camera {
    index: i32,
    capture: VideoCapture,
    mirror: bool,
}

impl Camera {
    /// Open camera `index`, optionally requesting a frame size
    pub fn open(index: i32, size: Option<(u32, u32)>) -> Result<Self> {
        info!("Opening camera {}", index);
        let mut capture = VideoCapture::new(index, videoio::CAP_ANY)
            .with_context(|| format!("Failed to create capture for camera {}", index))?;

        if !capture.is_opened()? {
            return Err(CvError::CameraUnavailable(index).into());
        }

        if let Some((width, height)) = size {
            let ok_w = capture.set(videoio::CAP_PROP_FRAME_WIDTH, width as f64)?;
            let ok_h = capture.set(videoio::CAP_PROP_FRAME_HEIGHT, height as f64)?;
            if !(ok_w && ok_h) {
                warn!("Camera {} ignored requested size {}x{}", index, width, height);
            }
        }

        // Keep latency low: only the newest frame matters
        if !capture.set(videoio::CAP_PROP_BUFFERSIZE, 1.0)? {
            warn!("Camera {} does not support buffer size control", index);
        }

        Ok(Self {
            index,
            capture,
            mirror: false,
        })
    }

    pub fn set_mirror(&mut self, mirror: bool) {
        self.mirror = mirror;
    }

    pub fn index(&self) -> i32 {
        self.index
    }

    /// Grab the next frame, mirrored when enabled
    pub fn next_frame(&mut self) -> Result<Mat> {
        let mut frame = Mat::default();
        let grabbed = self
            .capture
            .read(&mut frame)
            .with_context(|| format!("Failed to read from camera {}", self.index))?;

        if !grabbed || frame.empty() {
            return Err(CvError::EmptyFrame(self.index).into());
        }

        if self.mirror {
            FrameUtils::mirror(&frame)
        } else {
            Ok(frame)
        }
    }
}
