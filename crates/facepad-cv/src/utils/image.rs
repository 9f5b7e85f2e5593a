//! Frame conversions using OpenCV and opencv-match

use crate::error::CvError;
use crate::Result;
use anyhow::Context;
use opencv::{
    core::{self, Mat},
    imgproc,
    prelude::*,
};
use opencv_match::prelude::*;
use std::path::Path;

/// Frame utility functions
pub struct FrameUtils;

impl FrameUtils {
    /// BGR (or already single channel) frame to grayscale
    pub fn to_grayscale(frame: &Mat) -> Result<Mat> {
        match frame.channels() {
            1 => Ok(frame.clone()),
            3 | 4 => {
                let code = if frame.channels() == 3 {
                    imgproc::COLOR_BGR2GRAY
                } else {
                    imgproc::COLOR_BGRA2GRAY
                };
                let mut gray = Mat::default();
                imgproc::cvt_color(frame, &mut gray, code, 0)
                    .context("Failed to convert frame to grayscale")?;
                Ok(gray)
            }
            n => Err(CvError::UnsupportedFrame(format!("{n} channels")).into()),
        }
    }

    /// Grayscale with histogram equalization, which steadies the cascade
    /// under uneven lighting
    pub fn to_equalized_gray(frame: &Mat) -> Result<Mat> {
        let gray = Self::to_grayscale(frame)?;
        let mut equalized = Mat::default();
        imgproc::equalize_hist(&gray, &mut equalized).context("Failed to equalize histogram")?;
        Ok(equalized)
    }

    /// Flip horizontally so the preview behaves like a mirror
    pub fn mirror(frame: &Mat) -> Result<Mat> {
        let mut flipped = Mat::default();
        core::flip(frame, &mut flipped, 1).context("Failed to mirror frame")?;
        Ok(flipped)
    }

    /// Convert a BGR frame to image::RgbImage
    pub fn bgr_to_rgb_image(frame: &Mat) -> Result<image::RgbImage> {
        if frame.channels() != 3 {
            return Err(CvError::UnsupportedFrame(format!("{} channels", frame.channels())).into());
        }

        let mut rgb = Mat::default();
        imgproc::cvt_color(frame, &mut rgb, imgproc::COLOR_BGR2RGB, 0)
            .context("Failed to convert BGR to RGB")?;

        rgb.try_into_cv()
            .context("Failed to convert OpenCV Mat to RGB image")
    }

    /// Save a BGR frame as an image file, format from the extension
    pub fn save_snapshot<P: AsRef<Path>>(frame: &Mat, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {:?}", parent))?;
            }
        }

        let rgb_image = Self::bgr_to_rgb_image(frame)?;
        rgb_image
            .save(path)
            .with_context(|| format!("Failed to save snapshot: {:?}", path))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Scalar, Vec3b, CV_8UC3};

    fn blank(rows: i32, cols: i32) -> Result<Mat> {
        Ok(Mat::new_rows_cols_with_default(rows, cols, CV_8UC3, Scalar::all(0.0))?)
    }

    #[test]
    fn test_grayscale() -> Result<()> {
        let frame = blank(40, 60)?;
        let gray = FrameUtils::to_equalized_gray(&frame)?;
        assert_eq!(gray.channels(), 1);
        assert_eq!(gray.size()?, frame.size()?);
        Ok(())
    }

    #[test]
    fn test_mirror() -> Result<()> {
        let mut frame = blank(2, 3)?;
        *frame.at_2d_mut::<Vec3b>(0, 0)? = Vec3b::from([255, 0, 0]);

        let mirrored = FrameUtils::mirror(&frame)?;
        assert_eq!(*mirrored.at_2d::<Vec3b>(0, 2)?, Vec3b::from([255, 0, 0]));
        assert_eq!(*mirrored.at_2d::<Vec3b>(0, 0)?, Vec3b::from([0, 0, 0]));
        Ok(())
    }

    #[test]
    fn test_bgr_to_rgb_image() -> Result<()> {
        let mut frame = blank(4, 8)?;
        *frame.at_2d_mut::<Vec3b>(2, 1)? = Vec3b::from([30, 10, 200]);

        let rgb = FrameUtils::bgr_to_rgb_image(&frame)?;
        assert_eq!(rgb.dimensions(), (8, 4));
        assert!(rgb.get_pixel(1, 2).0.contains(&200));
        assert_eq!(*rgb.get_pixel(0, 0), image::Rgb([0, 0, 0]));
        Ok(())
    }

    #[test]
    fn test_rejects_gray_snapshot() -> Result<()> {
        let gray = FrameUtils::to_grayscale(&blank(4, 4)?)?;
        assert!(FrameUtils::bgr_to_rgb_image(&gray).is_err());
        Ok(())
    }

    #[test]
    fn test_save_snapshot() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("shots").join("frame.png");

        FrameUtils::save_snapshot(&blank(10, 10)?, &path)?;
        assert!(path.exists());
        Ok(())
    }
}
