//! Cascade face boxes plus LBF landmark fitting

use super::config::DetectorConfig;
use crate::bbox::{FaceBox, FaceBoxCollection};
use crate::error::CvError;
use crate::utils::FrameUtils;
use crate::Result;
use anyhow::Context;
use facepad_core::{DetectedFace, LandmarkSource, Point};
use log::{debug, info};
use opencv::{
    core::{Mat, Point2f, Ptr, Rect, Size, Vector},
    face::{self, Facemark},
    objdetect::{self, CascadeClassifier},
    prelude::*,
};

/// 68-point landmark detector built on OpenCV's face module
pub struct LbfDetector {
    config: DetectorConfig,
    cascade: CascadeClassifier,
    facemark: Ptr<Facemark>,
}

impl LbfDetector {
    /// Load the cascade and LBF model named in `config`
    pub fn new(config: DetectorConfig) -> Result<Self> {
        for path in [&config.cascade_path, &config.lbf_model_path] {
            if !path.exists() {
                return Err(CvError::ModelMissing(path.clone()).into());
            }
        }

        let cascade_path = config.cascade_path.to_string_lossy();
        let cascade = CascadeClassifier::new(&cascade_path)
            .with_context(|| format!("Failed to load cascade: {}", cascade_path))?;
        if cascade.empty()? {
            return Err(CvError::EmptyCascade(config.cascade_path.clone()).into());
        }

        let model_path = config.lbf_model_path.to_string_lossy();
        let mut facemark = face::create_facemark_lbf().context("Failed to create LBF facemark")?;
        facemark
            .load_model(&model_path)
            .with_context(|| format!("Failed to load LBF model: {}", model_path))?;

        info!(
            "Landmark detector ready (cascade {:?}, model {:?})",
            config.cascade_path, config.lbf_model_path
        );

        Ok(Self {
            config,
            cascade,
            facemark,
        })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Face boxes in `gray`, merged and capped at `max_faces`
    pub fn detect_boxes(&mut self, gray: &Mat) -> Result<FaceBoxCollection> {
        let mut rects = Vector::<Rect>::new();
        let mut hits = Vector::<i32>::new();
        let min = self.config.min_face_size;

        self.cascade
            .detect_multi_scale2(
                gray,
                &mut rects,
                &mut hits,
                self.config.scale_factor,
                self.config.min_neighbors,
                objdetect::CASCADE_SCALE_IMAGE,
                Size::new(min, min),
                Size::default(),
            )
            .context("Cascade detection failed")?;

        let boxes: FaceBoxCollection = rects
            .iter()
            .zip(hits.iter().chain(std::iter::repeat(1)))
            .map(|(rect, n)| FaceBox::from_rect(rect, n as f64))
            .collect();

        Ok(boxes
            .filter_by_size(min)
            .apply_nms(self.config.nms_threshold)
            .truncate(self.config.max_faces))
    }
}

impl LandmarkSource for LbfDetector {
    type Frame = Mat;

    fn detect(&mut self, frame: &Mat) -> Result<Vec<DetectedFace>> {
        let gray = if self.config.equalize {
            FrameUtils::to_equalized_gray(frame)?
        } else {
            FrameUtils::to_grayscale(frame)?
        };

        let boxes = self.detect_boxes(&gray)?;
        if boxes.is_empty() {
            return Ok(Vec::new());
        }

        let rects: Vector<Rect> = boxes.iter().map(FaceBox::to_rect).collect();
        let mut landmarks = Vector::<Vector<Point2f>>::new();
        let fitted = self
            .facemark
            .fit(&gray, &rects, &mut landmarks)
            .context("Landmark fitting failed")?;

        if !fitted {
            debug!("LBF fit rejected {} face boxes", boxes.len());
            return Ok(Vec::new());
        }

        let faces = boxes
            .iter()
            .zip(landmarks.iter())
            .map(|(face_box, points)| {
                let points = points.iter().map(|p| Point::new(p.x, p.y)).collect();
                DetectedFace::new(face_box.to_bounds(), points)
            })
            .collect();

        Ok(faces)
    }
}
