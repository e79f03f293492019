//! YOLOv5-style ONNX subject detector.

use crate::config::{DetectorConfig, ResizeFilter};
use crate::constants::detector::ROW_PREFIX;
use crate::constants::geometry::PAD_COLOR;
use crate::error::{Error, Result};
use crate::inference::Detector;
use crate::inference::onnx::OnnxModel;
use crate::pipeline::{DetectionBox, LetterboxLayout, letterbox, to_tensor};
use crate::utils::read_labels;
use image::DynamicImage;
use tracing::{debug, info};

/// Object detector for models emitting `[1, N, 5 + classes]` rows of
/// `(cx, cy, w, h, objectness, class scores...)` in letterboxed input
/// pixels.
pub struct YoloDetector {
    model: OnnxModel,
    labels: Vec<String>,
    input_side: u32,
    confidence_threshold: f32,
    iou_threshold: f32,
    max_detections: usize,
}

impl YoloDetector {
    /// Load the detector and its class names.
    pub fn from_config(config: &DetectorConfig) -> Result<Self> {
        let labels = read_labels(&config.labels)?;
        let model = OnnxModel::load(&config.path, &config.input_name, &config.output_name)?;
        info!(
            "Loaded detector: {}, {} classes, input {}x{}",
            config.path.display(),
            labels.len(),
            config.input_side,
            config.input_side
        );
        Ok(Self {
            model,
            labels,
            input_side: config.input_side,
            confidence_threshold: config.confidence_threshold,
            iou_threshold: config.iou_threshold,
            max_detections: config.max_detections,
        })
    }

    /// Class names in model output order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

impl Detector for YoloDetector {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<DetectionBox>> {
        let rgb = image.to_rgb8();
        let (canvas, layout) = letterbox(&rgb, self.input_side, PAD_COLOR, ResizeFilter::Bilinear);
        let tensor = to_tensor(&canvas).ok_or_else(|| Error::DetectionFailure {
            reason: "letterbox produced a non-square canvas".to_string(),
        })?;

        let output = self
            .model
            .run(tensor.shape(), tensor.into_vec())
            .map_err(|reason| Error::DetectionFailure { reason })?;

        let candidates = decode_predictions(
            &output.shape,
            &output.data,
            self.confidence_threshold,
            &self.labels,
        )
        .map_err(|reason| Error::DetectionFailure { reason })?;
        let raw_count = candidates.len();

        let kept = non_max_suppression(candidates, self.iou_threshold, self.max_detections);
        debug!("Detector kept {} of {} candidate boxes", kept.len(), raw_count);

        let (width, height) = rgb.dimensions();
        Ok(kept
            .into_iter()
            .map(|b| to_source(b, &layout, width, height))
            .collect())
    }
}

/// Decode raw detector rows into boxes in input-canvas coordinates.
///
/// A row's confidence is `objectness × best class score`; rows below
/// `threshold` are dropped. Class indices without a name are labelled by
/// their number.
pub fn decode_predictions(
    shape: &[i64],
    data: &[f32],
    threshold: f32,
    labels: &[String],
) -> std::result::Result<Vec<DetectionBox>, String> {
    let row_len = shape
        .last()
        .and_then(|&n| usize::try_from(n).ok())
        .filter(|&n| n > ROW_PREFIX)
        .ok_or_else(|| format!("unexpected detector output shape {shape:?}"))?;

    if data.len() % row_len != 0 {
        return Err(format!(
            "detector output of {} values does not divide into rows of {row_len}",
            data.len()
        ));
    }

    let mut boxes = Vec::new();
    for row in data.chunks_exact(row_len) {
        let objectness = row[4];
        let Some((class, class_score)) = row[ROW_PREFIX..]
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))
        else {
            continue;
        };

        let confidence = objectness * class_score;
        if confidence < threshold {
            continue;
        }

        let (cx, cy, w, h) = (row[0], row[1], row[2], row[3]);
        boxes.push(DetectionBox {
            xmin: cx - w / 2.0,
            ymin: cy - h / 2.0,
            xmax: cx + w / 2.0,
            ymax: cy + h / 2.0,
            confidence,
            label: labels
                .get(class)
                .cloned()
                .unwrap_or_else(|| class.to_string()),
        });
    }

    Ok(boxes)
}

/// Greedy per-class non-maximum suppression.
///
/// Returns at most `max_detections` boxes ordered by confidence descending.
pub fn non_max_suppression(
    mut boxes: Vec<DetectionBox>,
    iou_threshold: f32,
    max_detections: usize,
) -> Vec<DetectionBox> {
    boxes.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<DetectionBox> = Vec::new();
    for candidate in boxes {
        if kept.len() >= max_detections {
            break;
        }
        let suppressed = kept
            .iter()
            .any(|k| k.label == candidate.label && k.iou(&candidate) > iou_threshold);
        if !suppressed {
            kept.push(candidate);
        }
    }
    kept
}

/// Map a canvas-space box back onto the source image and clamp it.
#[allow(clippy::cast_precision_loss)]
fn to_source(bbox: DetectionBox, layout: &LetterboxLayout, width: u32, height: u32) -> DetectionBox {
    let (w, h) = (width as f32, height as f32);
    let (xmin, ymin) = layout.to_source(bbox.xmin, bbox.ymin);
    let (xmax, ymax) = layout.to_source(bbox.xmax, bbox.ymax);
    DetectionBox {
        xmin: xmin.clamp(0.0, w),
        ymin: ymin.clamp(0.0, h),
        xmax: xmax.clamp(0.0, w),
        ymax: ymax.clamp(0.0, h),
        ..bbox
    }
}
