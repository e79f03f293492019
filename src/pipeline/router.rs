//! Primary versus fallback classifier routing.

use crate::config::MultiSubjectPolicy;
use crate::pipeline::selector::select_index;
use std::fmt;

/// Why a request went to the fallback classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// No subject was detected.
    NoSubject,
    /// Several subjects were detected and the policy sends that case to the
    /// fallback model.
    MultipleSubjects(usize),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSubject => write!(f, "no subject detected"),
            Self::MultipleSubjects(n) => write!(f, "{n} subjects detected"),
        }
    }
}

/// Per-request classification path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Crop to the subject at `index` and run the primary classifier.
    Primary {
        /// Index into the filtered subject list.
        index: usize,
    },
    /// Classify the whole image with the fallback model.
    Fallback {
        /// Routing cause.
        reason: FallbackReason,
    },
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary { index } => write!(f, "primary (subject {index})"),
            Self::Fallback { reason } => write!(f, "fallback ({reason})"),
        }
    }
}

/// Decide the route for `subjects` detected subject boxes.
pub fn route(subjects: usize, requested: Option<i64>, policy: MultiSubjectPolicy) -> Route {
    if subjects > 1 && policy == MultiSubjectPolicy::UseFallback {
        return Route::Fallback {
            reason: FallbackReason::MultipleSubjects(subjects),
        };
    }
    match select_index(subjects, requested) {
        Some(index) => Route::Primary { index },
        None => Route::Fallback {
            reason: FallbackReason::NoSubject,
        },
    }
}
