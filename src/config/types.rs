//! Configuration type definitions.

use crate::constants::{
    DEFAULT_BODY_LIMIT, DEFAULT_ENDPOINT, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_SUBJECT_LABEL,
    DEFAULT_TIMESTAMP_TOLERANCE_SECS, classifier, detector, geometry, limits, wire,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,

    /// Request signature settings.
    pub auth: AuthConfig,

    /// Subject detector settings.
    pub detector: DetectorConfig,

    /// Primary/fallback routing settings.
    pub routing: RoutingConfig,

    /// Response shaping settings.
    pub response: ResponseConfig,

    /// Classifier used on a cropped subject.
    pub primary: ClassifierConfig,

    /// Classifier used on the whole photo when no usable subject was found.
    pub fallback: ClassifierConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            detector: DetectorConfig::default(),
            routing: RoutingConfig::default(),
            response: ResponseConfig::default(),
            primary: ClassifierConfig::default(),
            fallback: ClassifierConfig {
                path: PathBuf::from("models/fallback.onnx"),
                identities: PathBuf::from("models/fallback-ids.json"),
                resize: ResizeMode::DirectSquare,
                ..ClassifierConfig::default()
            },
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,

    /// Bind port.
    pub port: u16,

    /// Path of the recognition endpoint.
    pub endpoint: String,

    /// Maximum request body size in bytes.
    pub body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

/// Request signature settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Whether requests must carry a valid signature.
    pub enabled: bool,

    /// Shared signing secret.
    pub secret: Option<String>,

    /// Sign the request timestamp and enforce the tolerance window.
    pub with_timestamp: bool,

    /// Allowed clock skew between client and server, in seconds.
    pub tolerance_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            secret: None,
            with_timestamp: true,
            tolerance_secs: DEFAULT_TIMESTAMP_TOLERANCE_SECS,
        }
    }
}

/// Subject detector settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Path to the ONNX detector model.
    pub path: PathBuf,

    /// Path to the detector class names (one per line).
    pub labels: PathBuf,

    /// Detector class name treated as the subject.
    pub subject_label: String,

    /// Detector input side length.
    pub input_side: u32,

    /// Minimum box confidence.
    pub confidence_threshold: f32,

    /// IoU threshold for non-maximum suppression.
    pub iou_threshold: f32,

    /// Maximum number of boxes kept.
    pub max_detections: usize,

    /// ONNX input tensor name.
    pub input_name: String,

    /// ONNX output tensor name.
    pub output_name: String,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("models/yolov5m.onnx"),
            labels: PathBuf::from("models/coco.names"),
            subject_label: DEFAULT_SUBJECT_LABEL.to_string(),
            input_side: detector::INPUT_SIDE,
            confidence_threshold: detector::CONFIDENCE_THRESHOLD,
            iou_threshold: detector::IOU_THRESHOLD,
            max_detections: detector::MAX_DETECTIONS,
            input_name: detector::INPUT_NAME.to_string(),
            output_name: detector::OUTPUT_NAME.to_string(),
        }
    }
}

/// Primary/fallback routing settings.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// What to do when more than one subject is detected.
    pub multi_subject_policy: MultiSubjectPolicy,
}

/// Response shaping settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseConfig {
    /// Maximum number of subject boxes returned.
    pub cat_box_max_return: usize,

    /// Maximum number of identity candidates returned.
    pub recognize_max_return: usize,

    /// Wire name of the identity key in each candidate.
    pub id_field: String,

    /// Wire name of the score key in each candidate.
    pub score_field: String,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            cat_box_max_return: limits::CAT_BOX_MAX_RETURN,
            recognize_max_return: limits::RECOGNIZE_MAX_RETURN,
            id_field: wire::ID_FIELD.to_string(),
            score_field: wire::SCORE_FIELD.to_string(),
        }
    }
}

/// Settings for one identity classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Path to the ONNX classifier model.
    pub path: PathBuf,

    /// Path to the identity table (JSON array of IDs).
    pub identities: PathBuf,

    /// Square input side length.
    pub side: u32,

    /// How the image is fitted to the square input.
    pub resize: ResizeMode,

    /// Border color for letterboxing.
    pub pad_color: [u8; 3],

    /// Resampling filter.
    pub filter: ResizeFilter,

    /// Convention of the classifier's output vector.
    pub score_transform: ScoreTransform,

    /// ONNX input tensor name.
    pub input_name: String,

    /// ONNX output tensor name.
    pub output_name: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("models/cat.onnx"),
            identities: PathBuf::from("models/cat-ids.json"),
            side: geometry::DEFAULT_SIDE,
            resize: ResizeMode::Letterbox,
            pad_color: geometry::PAD_COLOR,
            filter: ResizeFilter::default(),
            score_transform: ScoreTransform::Raw,
            input_name: classifier::INPUT_NAME.to_string(),
            output_name: classifier::OUTPUT_NAME.to_string(),
        }
    }
}

/// Routing policy when two or more subjects are detected.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum MultiSubjectPolicy {
    /// Classify the selected (or first) subject with the primary model.
    #[default]
    UseFirst,
    /// Treat the photo as ambiguous and classify it with the fallback model.
    UseFallback,
}

/// How an image is fitted to a classifier's square input.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ResizeMode {
    /// Aspect-preserving resize padded with the border color.
    #[default]
    Letterbox,
    /// Stretch directly to the square, ignoring aspect ratio.
    DirectSquare,
}

/// Resampling filter used when resizing.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResizeFilter {
    /// Nearest neighbour.
    Nearest,
    /// Linear interpolation.
    #[default]
    Bilinear,
    /// Catmull-Rom cubic interpolation.
    Bicubic,
    /// Lanczos with window 3.
    Lanczos3,
}

/// Convention of a classifier's output scores.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScoreTransform {
    /// Raw logits; softmax is applied before ranking.
    #[default]
    Raw,
    /// Already comparable probabilities; ranked as-is.
    Probability,
}

impl std::fmt::Display for MultiSubjectPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UseFirst => write!(f, "useFirst"),
            Self::UseFallback => write!(f, "useFallback"),
        }
    }
}

impl std::fmt::Display for ResizeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Letterbox => write!(f, "letterbox"),
            Self::DirectSquare => write!(f, "directSquare"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_classifier_modes_differ() {
        let config = Config::default();
        assert_eq!(config.primary.resize, ResizeMode::Letterbox);
        assert_eq!(config.fallback.resize, ResizeMode::DirectSquare);
        assert_ne!(config.primary.path, config.fallback.path);
    }

    #[test]
    fn test_enum_wire_names() {
        let policy: MultiSubjectPolicy = toml::from_str::<RoutingConfig>(
            r#"multi_subject_policy = "useFallback""#,
        )
        .unwrap()
        .multi_subject_policy;
        assert_eq!(policy, MultiSubjectPolicy::UseFallback);

        let classifier: ClassifierConfig = toml::from_str(
            r#"
resize = "directSquare"
score_transform = "probability"
filter = "lanczos3"
"#,
        )
        .unwrap();
        assert_eq!(classifier.resize, ResizeMode::DirectSquare);
        assert_eq!(classifier.score_transform, ScoreTransform::Probability);
        assert_eq!(classifier.filter, ResizeFilter::Lanczos3);
        assert_eq!(classifier.side, geometry::DEFAULT_SIDE);
    }

    #[test]
    fn test_response_defaults() {
        let response = ResponseConfig::default();
        assert_eq!(response.id_field, "catID");
        assert_eq!(response.score_field, "prob");
        assert_eq!(response.recognize_max_return, 20);
    }

    #[test]
    fn test_policy_display() {
        assert_eq!(MultiSubjectPolicy::UseFirst.to_string(), "useFirst");
        assert_eq!(ResizeMode::DirectSquare.to_string(), "directSquare");
    }
}
