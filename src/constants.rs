//! Application-wide constants.
//!
//! All magic numbers and strings are defined here to ensure consistency
//! and make changes easy to track.

/// Application name used for config directories and user-facing messages.
pub const APP_NAME: &str = "whisker";

/// Default bind address for the HTTP server.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default port for the HTTP server.
pub const DEFAULT_PORT: u16 = 3456;

/// Default path of the recognition endpoint.
pub const DEFAULT_ENDPOINT: &str = "/recognizeCatPhoto";

/// Path of the liveness endpoint.
pub const HEALTH_ENDPOINT: &str = "/health";

/// Maximum accepted request body (10 MiB).
pub const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Default detector class name that counts as a subject.
pub const DEFAULT_SUBJECT_LABEL: &str = "cat";

/// Default timestamp tolerance window in seconds.
pub const DEFAULT_TIMESTAMP_TOLERANCE_SECS: u64 = 30;

/// Message carried by every successful response envelope.
pub const OK_MESSAGE: &str = "OK";

/// Multipart field names of the recognition endpoint.
pub mod fields {
    /// Uploaded photo bytes.
    pub const PHOTO: &str = "photo";
    /// Hex-encoded request signature.
    pub const SIGNATURE: &str = "signature";
    /// Unix timestamp (seconds) used for signing.
    pub const TIMESTAMP: &str = "timestamp";
    /// Optional index selecting one of several detected subjects.
    pub const CAT_INDEX: &str = "catIdx";
}

/// Response payload limits.
pub mod limits {
    /// Default maximum number of subject boxes returned.
    pub const CAT_BOX_MAX_RETURN: usize = 5;
    /// Default maximum number of identity candidates returned.
    pub const RECOGNIZE_MAX_RETURN: usize = 20;
}

/// Image normalization defaults.
pub mod geometry {
    /// Default classifier input side length.
    pub const DEFAULT_SIDE: u32 = 224;
    /// Border color used when letterboxing.
    pub const PAD_COLOR: [u8; 3] = [114, 114, 114];
    /// Tie-break bias subtracted from the padding offset before rounding.
    pub const PAD_OFFSET_BIAS: f64 = 0.1;
    /// Divisor mapping 8-bit components into `[0, 1]`.
    pub const PIXEL_MAX: f32 = 255.0;
    /// Number of color channels in a normalized tensor.
    pub const CHANNELS: usize = 3;
}

/// Object detector defaults.
pub mod detector {
    /// Default detector input side length.
    pub const INPUT_SIDE: u32 = 640;
    /// Default minimum box confidence.
    pub const CONFIDENCE_THRESHOLD: f32 = 0.25;
    /// Default IoU threshold for non-maximum suppression.
    pub const IOU_THRESHOLD: f32 = 0.45;
    /// Default maximum number of boxes kept after NMS.
    pub const MAX_DETECTIONS: usize = 100;
    /// Default ONNX input tensor name.
    pub const INPUT_NAME: &str = "images";
    /// Default ONNX output tensor name.
    pub const OUTPUT_NAME: &str = "output0";
    /// Leading values per row before class scores (cx, cy, w, h, objectness).
    pub const ROW_PREFIX: usize = 5;
}

/// Classifier defaults.
pub mod classifier {
    /// Default ONNX input tensor name.
    pub const INPUT_NAME: &str = "photo";
    /// Default ONNX output tensor name.
    pub const OUTPUT_NAME: &str = "prob";
}

/// Default wire names of candidate fields.
pub mod wire {
    /// Identity key in `recognizeResults` entries.
    pub const ID_FIELD: &str = "catID";
    /// Score key in `recognizeResults` entries.
    pub const SCORE_FIELD: &str = "prob";
}
