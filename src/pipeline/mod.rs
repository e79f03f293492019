//! Request processing pipeline.
//!
//! Authentication gates the request, detector output is filtered to the
//! subject class, the router picks the primary or fallback classifier, the
//! photo (or the selected crop) is normalized for that classifier, and the
//! scores are ranked against its identity table.

pub mod geometry;
mod processor;
pub mod ranking;
pub mod router;
pub mod selector;
mod types;

pub use geometry::{
    LetterboxLayout, Normalization, crop, direct_square, letterbox, letterbox_layout, normalize,
    to_tensor,
};
pub use processor::{ClassifierSlot, PipelineSettings, Recognition, Recognizer};
pub use ranking::{rank, rank_candidates, softmax};
pub use router::{FallbackReason, Route, route};
pub use selector::{filter_subjects, select_index};
pub use types::{Candidate, DetectionBox, NormalizedImage, RecognizeRequest};
