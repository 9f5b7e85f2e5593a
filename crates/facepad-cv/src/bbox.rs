//! Face boxes and non-maximum suppression
//!
//! The cascade classifier often reports the same face several times at
//! neighbouring scales. Boxes are merged with IoU-based NMS before landmark
//! fitting so each face is fitted once.

use facepad_core::Bounds;
use opencv::core::Rect;
use serde::{Deserialize, Serialize};

/// A detected face region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    /// Number of raw cascade hits merged into this box
    pub confidence: f64,
}

impl FaceBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32, confidence: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            confidence,
        }
    }

    /// Create from OpenCV Rect
    pub fn from_rect(rect: Rect, confidence: f64) -> Self {
        Self::new(rect.x, rect.y, rect.width, rect.height, confidence)
    }

    /// Convert to OpenCV Rect
    pub fn to_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn to_bounds(&self) -> Bounds {
        Bounds::new(
            self.x as f32,
            self.y as f32,
            self.width as f32,
            self.height as f32,
        )
    }

    pub fn area(&self) -> f64 {
        (self.width * self.height) as f64
    }

    /// Intersection over union with another box
    pub fn iou(&self, other: &FaceBox) -> f64 {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = (self.x + self.width).min(other.x + other.width);
        let y2 = (self.y + self.height).min(other.y + other.height);

        if x2 <= x1 || y2 <= y1 {
            return 0.0;
        }

        let intersection = ((x2 - x1) * (y2 - y1)) as f64;
        let union = self.area() + other.area() - intersection;

        intersection / union
    }

    pub fn overlaps(&self, other: &FaceBox, threshold: f64) -> bool {
        self.iou(other) > threshold
    }
}

/// Collection of face boxes with batch operations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FaceBoxCollection {
    boxes: Vec<FaceBox>,
}

impl FaceBoxCollection {
    pub fn from_vec(boxes: Vec<FaceBox>) -> Self {
        Self { boxes }
    }

    pub fn as_slice(&self) -> &[FaceBox] {
        &self.boxes
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Sort by confidence, larger boxes first on ties
    pub fn sort_by_confidence(&mut self) {
        self.boxes.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then(b.area().total_cmp(&a.area()))
        });
    }

    /// Drop boxes smaller than `min_size` on either side
    pub fn filter_by_size(mut self, min_size: i32) -> Self {
        self.boxes
            .retain(|face| face.width >= min_size && face.height >= min_size);
        self
    }

    /// Apply non-maximum suppression
    pub fn apply_nms(mut self, threshold: f64) -> Self {
        if self.boxes.is_empty() {
            return self;
        }

        self.sort_by_confidence();

        let mut keep = Vec::new();
        let mut suppressed = vec![false; self.boxes.len()];

        for i in 0..self.boxes.len() {
            if suppressed[i] {
                continue;
            }

            keep.push(self.boxes[i]);

            for j in (i + 1)..self.boxes.len() {
                if !suppressed[j] && self.boxes[i].overlaps(&self.boxes[j], threshold) {
                    suppressed[j] = true;
                }
            }
        }

        Self::from_vec(keep)
    }

    /// Keep at most `n` boxes in current order
    pub fn truncate(mut self, n: usize) -> Self {
        self.boxes.truncate(n);
        self
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FaceBox> {
        self.boxes.iter()
    }
}

impl IntoIterator for FaceBoxCollection {
    type Item = FaceBox;
    type IntoIter = std::vec::IntoIter<FaceBox>;

    fn into_iter(self) -> Self::IntoIter {
        self.boxes.into_iter()
    }
}

impl FromIterator<FaceBox> for FaceBoxCollection {
    fn from_iter<T: IntoIterator<Item = FaceBox>>(iter: T) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}
