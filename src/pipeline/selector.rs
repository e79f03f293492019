//! Subject filtering and single-box selection over detector output.

use crate::pipeline::DetectionBox;

/// Keep only boxes labelled `subject`, preserving detector order.
pub fn filter_subjects(boxes: &[DetectionBox], subject: &str) -> Vec<DetectionBox> {
    boxes.iter().filter(|b| b.label == subject).cloned().collect()
}

/// Pick one of `count` subjects.
///
/// An in-range `requested` index wins; anything else (absent, negative or
/// past the end) selects the first box. Returns `None` only when there is
/// nothing to select.
pub fn select_index(count: usize, requested: Option<i64>) -> Option<usize> {
    if count == 0 {
        return None;
    }
    let index = requested
        .and_then(|i| usize::try_from(i).ok())
        .filter(|&i| i < count)
        .unwrap_or(0);
    Some(index)
}
