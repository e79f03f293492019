//! Model collaborators: subject detection and identity classification.
//!
//! The pipeline only sees the [`Detector`] and [`Classifier`] traits. Both
//! are `Send + Sync` and may be called from several requests at once; an
//! implementation wrapping an engine that is not safe for concurrent use
//! must serialize calls itself. The ONNX adapters in this module hold their
//! session behind a mutex.

mod classifier;
mod detector;
mod onnx;

pub use classifier::OnnxClassifier;
pub use detector::{YoloDetector, decode_predictions, non_max_suppression};

use crate::error::Result;
use crate::pipeline::{DetectionBox, NormalizedImage};
use image::DynamicImage;

/// Finds candidate objects in a photo.
pub trait Detector: Send + Sync {
    /// Detect objects in `image`, returning boxes in source-image pixels.
    ///
    /// Failures should be reported as [`crate::Error::DetectionFailure`].
    fn detect(&self, image: &DynamicImage) -> Result<Vec<DetectionBox>>;
}

/// Scores a normalized image against a fixed identity set.
pub trait Classifier: Send + Sync {
    /// Score `image`; position `i` of the result belongs to identity `i`.
    ///
    /// Failures should be reported as [`crate::Error::ClassificationFailure`].
    fn classify(&self, image: &NormalizedImage) -> Result<Vec<f32>>;
}
