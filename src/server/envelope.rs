//! JSON response envelope.
//!
//! Every reply, success or failure, is `{"ok", "message", "data"}` with
//! HTTP status 200.

use crate::config::ResponseConfig;
use crate::constants::OK_MESSAGE;
use crate::pipeline::{Candidate, DetectionBox, Recognition};
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

/// Envelope wrapping every endpoint reply.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    /// Whether the request succeeded.
    pub ok: bool,
    /// `"OK"` on success, otherwise a description of the failure.
    pub message: String,
    /// Payload, `null` on failure.
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    /// Successful reply carrying `data`.
    pub fn success(data: T) -> Self {
        Self {
            ok: true,
            message: OK_MESSAGE.to_string(),
            data: Some(data),
        }
    }

    /// Failed reply with `data: null`.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            data: None,
        }
    }
}

impl Envelope<()> {
    /// Successful reply without a payload.
    pub fn acknowledge() -> Self {
        Self {
            ok: true,
            message: OK_MESSAGE.to_string(),
            data: None,
        }
    }
}

/// Subject box as sent to clients.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct WireBox {
    /// Left edge.
    pub xmin: f32,
    /// Top edge.
    pub ymin: f32,
    /// Right edge.
    pub xmax: f32,
    /// Bottom edge.
    pub ymax: f32,
}

impl From<&DetectionBox> for WireBox {
    fn from(b: &DetectionBox) -> Self {
        Self {
            xmin: b.xmin,
            ymin: b.ymin,
            xmax: b.xmax,
            ymax: b.ymax,
        }
    }
}

/// Candidate serialized under the configured key names.
#[derive(Debug)]
pub struct WireCandidate<'a> {
    candidate: &'a Candidate,
    id_field: &'a str,
    score_field: &'a str,
}

impl Serialize for WireCandidate<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(self.id_field, &self.candidate.identity_id)?;
        map.serialize_entry(self.score_field, &self.candidate.score)?;
        map.end()
    }
}

/// Payload of a successful recognition.
#[derive(Debug, Serialize)]
pub struct RecognizeData<'a> {
    /// Detected subject boxes.
    #[serde(rename = "catBoxes")]
    pub cat_boxes: Vec<WireBox>,
    /// Ranked identity candidates.
    #[serde(rename = "recognizeResults")]
    pub recognize_results: Vec<WireCandidate<'a>>,
}

impl<'a> RecognizeData<'a> {
    /// Shape `recognition` for the wire using the configured key names.
    pub fn new(recognition: &'a Recognition, response: &'a ResponseConfig) -> Self {
        Self {
            cat_boxes: recognition.cat_boxes.iter().map(WireBox::from).collect(),
            recognize_results: recognition
                .candidates
                .iter()
                .map(|candidate| WireCandidate {
                    candidate,
                    id_field: &response.id_field,
                    score_field: &response.score_field,
                })
                .collect(),
        }
    }
}
