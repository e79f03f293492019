//! Pipeline data types.

use crate::constants::geometry::CHANNELS;

/// One box reported by the subject detector, in source-image pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionBox {
    /// Left edge.
    pub xmin: f32,
    /// Top edge.
    pub ymin: f32,
    /// Right edge.
    pub xmax: f32,
    /// Bottom edge.
    pub ymax: f32,
    /// Detector confidence.
    pub confidence: f32,
    /// Detector class name.
    pub label: String,
}

impl DetectionBox {
    /// Box width (zero for inverted boxes).
    pub fn width(&self) -> f32 {
        (self.xmax - self.xmin).max(0.0)
    }

    /// Box height (zero for inverted boxes).
    pub fn height(&self) -> f32 {
        (self.ymax - self.ymin).max(0.0)
    }

    /// Box area.
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Intersection over union with another box.
    pub fn iou(&self, other: &Self) -> f32 {
        let ix = (self.xmax.min(other.xmax) - self.xmin.max(other.xmin)).max(0.0);
        let iy = (self.ymax.min(other.ymax) - self.ymin.max(other.ymin)).max(0.0);
        let intersection = ix * iy;
        let union = self.area() + other.area() - intersection;
        if union > 0.0 { intersection / union } else { 0.0 }
    }
}

/// One ranked identity guess.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Identity ID from the identity table.
    pub identity_id: String,
    /// Comparable score (probability when softmax was applied).
    pub score: f32,
}

/// Square channel-first float tensor with components in `[0, 1]`.
///
/// Layout is `[channel][row][column]` for three RGB channels.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedImage {
    side: u32,
    data: Vec<f32>,
}

impl NormalizedImage {
    /// Wrap channel-first data for a `side × side` image.
    ///
    /// Returns `None` if `data` does not hold exactly `3 × side × side`
    /// values.
    pub fn from_raw(side: u32, data: Vec<f32>) -> Option<Self> {
        let side_len = side as usize;
        (data.len() == CHANNELS * side_len * side_len).then_some(Self { side, data })
    }

    /// All-zero tensor for a `side × side` image.
    pub fn zeros(side: u32) -> Self {
        let side_len = side as usize;
        Self {
            side,
            data: vec![0.0; CHANNELS * side_len * side_len],
        }
    }

    /// Side length in pixels.
    pub const fn side(&self) -> u32 {
        self.side
    }

    /// Batched NCHW shape `[1, 3, side, side]`.
    pub const fn shape(&self) -> [usize; 4] {
        [1, CHANNELS, self.side as usize, self.side as usize]
    }

    /// Channel-first component values.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Component at `(channel, row, column)`.
    pub fn get(&self, channel: usize, row: usize, column: usize) -> Option<f32> {
        let side = self.side as usize;
        if channel >= CHANNELS || row >= side || column >= side {
            return None;
        }
        self.data.get(channel * side * side + row * side + column).copied()
    }

    /// Consume into the raw component vector.
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }
}

/// A recognition request after transport decoding.
#[derive(Debug, Clone, Default)]
pub struct RecognizeRequest {
    /// Encoded photo bytes, exactly as uploaded.
    pub photo: Vec<u8>,
    /// Unix timestamp the client signed, if any.
    pub timestamp: Option<i64>,
    /// Hex signature supplied by the client.
    pub signature: Option<String>,
    /// Requested subject index when several were detected.
    pub cat_index: Option<i64>,
}
