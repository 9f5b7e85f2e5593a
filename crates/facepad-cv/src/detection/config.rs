//! Detector configuration

use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Haar cascade XML for face boxes
    pub cascade_path: PathBuf,
    /// LBF facemark model (68 points)
    pub lbf_model_path: PathBuf,
    pub scale_factor: f64,
    pub min_neighbors: i32,
    /// Smallest face side in pixels
    pub min_face_size: i32,
    pub nms_threshold: f64,
    pub max_faces: usize,
    pub equalize: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            cascade_path: "assets/haarcascade_frontalface_default.xml".into(),
            lbf_model_path: "assets/lbfmodel.yaml".into(),
            scale_factor: 1.1,
            min_neighbors: 5,
            min_face_size: 80,
            nms_threshold: 0.3,
            max_faces: 4,
            equalize: true,
        }
    }
}

impl DetectorConfig {
    /// Faster, less thorough scanning for slow machines
    pub fn for_low_power() -> Self {
        Self {
            scale_factor: 1.3,
            min_neighbors: 4,
            min_face_size: 120,
            max_faces: 1,
            ..Self::default()
        }
    }

    pub fn with_models<P: Into<PathBuf>, Q: Into<PathBuf>>(mut self, cascade: P, lbf: Q) -> Self {
        self.cascade_path = cascade.into();
        self.lbf_model_path = lbf.into();
        self
    }

    /// Load from a JSON file; missing fields take their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read detector config: {:?}", path))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse detector config: {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("detector.json");
        std::fs::write(&path, r#"{ "min_neighbors": 8, "lbf_model_path": "models/lbf.yaml" }"#)?;

        let config = DetectorConfig::from_file(&path)?;
        assert_eq!(config.min_neighbors, 8);
        assert_eq!(config.lbf_model_path, PathBuf::from("models/lbf.yaml"));
        assert_eq!(config.scale_factor, DetectorConfig::default().scale_factor);
        Ok(())
    }

    #[test]
    fn test_with_models() {
        let config = DetectorConfig::for_low_power().with_models("a.xml", "b.yaml");
        assert_eq!(config.cascade_path, PathBuf::from("a.xml"));
        assert_eq!(config.max_faces, 1);
    }
}
