//! Per-request recognition pipeline.

use crate::auth::SignatureVerifier;
use crate::config::{ClassifierConfig, Config, MultiSubjectPolicy, ScoreTransform};
use crate::error::{Error, Result};
use crate::inference::{Classifier, Detector, OnnxClassifier, YoloDetector};
use crate::pipeline::geometry::{Normalization, crop, normalize};
use crate::pipeline::ranking::{apply_transform, rank, truncate};
use crate::pipeline::router::{Route, route};
use crate::pipeline::selector::filter_subjects;
use crate::pipeline::{Candidate, DetectionBox, RecognizeRequest};
use crate::utils::IdentityTable;
use image::DynamicImage;
use std::time::Instant;
use tracing::{debug, warn};

/// A classifier together with the identity table and preprocessing it
/// expects.
pub struct ClassifierSlot {
    classifier: Box<dyn Classifier>,
    identities: IdentityTable,
    normalization: Normalization,
    score_transform: ScoreTransform,
}

impl ClassifierSlot {
    /// Pair a classifier with its identity table and preprocessing.
    pub fn new(
        classifier: Box<dyn Classifier>,
        identities: IdentityTable,
        normalization: Normalization,
        score_transform: ScoreTransform,
    ) -> Self {
        Self {
            classifier,
            identities,
            normalization,
            score_transform,
        }
    }

    /// Load the ONNX classifier and identity table named by `config`.
    pub fn from_config(config: &ClassifierConfig) -> Result<Self> {
        let identities = IdentityTable::load(&config.identities)?;
        let classifier = OnnxClassifier::from_config(config)?;
        Ok(Self::new(
            Box::new(classifier),
            identities,
            Normalization::from(config),
            config.score_transform,
        ))
    }

    /// Identity table labelling this classifier's output.
    pub const fn identities(&self) -> &IdentityTable {
        &self.identities
    }

    /// Normalize `image`, classify it and rank the labelled scores.
    fn run(&self, image: &DynamicImage) -> Result<Vec<Candidate>> {
        let tensor = normalize(image, &self.normalization);
        let scores = self.classifier.classify(&tensor)?;
        let scores = apply_transform(scores, self.score_transform);
        rank(&scores, &self.identities)
    }
}

/// Request-independent pipeline settings.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Detector class treated as the subject.
    pub subject_label: String,
    /// Routing when several subjects are found.
    pub policy: MultiSubjectPolicy,
    /// Maximum subject boxes returned.
    pub cat_box_max_return: usize,
    /// Maximum candidates returned.
    pub recognize_max_return: usize,
}

impl From<&Config> for PipelineSettings {
    fn from(config: &Config) -> Self {
        Self {
            subject_label: config.detector.subject_label.clone(),
            policy: config.routing.multi_subject_policy,
            cat_box_max_return: config.response.cat_box_max_return,
            recognize_max_return: config.response.recognize_max_return,
        }
    }
}

/// Outcome of one successful recognition.
#[derive(Debug, Clone)]
pub struct Recognition {
    /// Path the request took.
    pub route: Route,
    /// Detected subject boxes, truncated.
    pub cat_boxes: Vec<DetectionBox>,
    /// Ranked identity candidates, truncated.
    pub candidates: Vec<Candidate>,
}

/// Shared, read-only recognition context.
///
/// Holds the verifier, model handles and identity tables loaded at startup.
/// A single instance serves all concurrent requests.
pub struct Recognizer {
    verifier: Option<SignatureVerifier>,
    detector: Box<dyn Detector>,
    primary: ClassifierSlot,
    fallback: ClassifierSlot,
    settings: PipelineSettings,
}

impl Recognizer {
    /// Assemble a recognizer from its collaborators.
    ///
    /// `verifier` is `None` when requests are not authenticated.
    pub fn new(
        verifier: Option<SignatureVerifier>,
        detector: Box<dyn Detector>,
        primary: ClassifierSlot,
        fallback: ClassifierSlot,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            verifier,
            detector,
            primary,
            fallback,
            settings,
        }
    }

    /// Load all models and tables named by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let verifier = SignatureVerifier::from_config(&config.auth)?;
        if verifier.is_none() {
            warn!("Request authentication is disabled");
        }
        let detector = YoloDetector::from_config(&config.detector)?;
        let primary = ClassifierSlot::from_config(&config.primary)?;
        let fallback = ClassifierSlot::from_config(&config.fallback)?;

        Ok(Self::new(
            verifier,
            Box::new(detector),
            primary,
            fallback,
            PipelineSettings::from(config),
        ))
    }

    /// Primary classifier slot.
    pub const fn primary(&self) -> &ClassifierSlot {
        &self.primary
    }

    /// Fallback classifier slot.
    pub const fn fallback(&self) -> &ClassifierSlot {
        &self.fallback
    }

    /// Check the request signature (and timestamp) against `now`.
    pub fn authenticate(&self, request: &RecognizeRequest, now: i64) -> Result<()> {
        let Some(verifier) = &self.verifier else {
            return Ok(());
        };

        let signature = request
            .signature
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::malformed("missing signature"))?;

        if verifier.mode().requires_timestamp() && request.timestamp.is_none() {
            return Err(Error::malformed("missing timestamp"));
        }

        verifier.check(&request.photo, request.timestamp, signature, now)
    }

    /// Run the full pipeline against the current clock.
    pub fn recognize(&self, request: &RecognizeRequest) -> Result<Recognition> {
        self.recognize_at(request, chrono::Utc::now().timestamp())
    }

    /// Run the full pipeline with `now` as the server time (unix seconds).
    pub fn recognize_at(&self, request: &RecognizeRequest, now: i64) -> Result<Recognition> {
        let start = Instant::now();

        if request.photo.is_empty() {
            return Err(Error::malformed("missing photo"));
        }

        if let Err(e) = self.authenticate(request, now) {
            if matches!(e, Error::AuthenticationFailure { .. }) {
                warn!("Rejected request: {e}");
            }
            return Err(e);
        }

        let image = image::load_from_memory(&request.photo)
            .map_err(|e| Error::malformed(format!("cannot decode photo: {e}")))?;

        let detect_start = Instant::now();
        let detections = self.detector.detect(&image)?;
        let subjects = filter_subjects(&detections, &self.settings.subject_label);
        debug!(
            "Detected {} boxes, {} labelled '{}' in {:.1}ms",
            detections.len(),
            subjects.len(),
            self.settings.subject_label,
            detect_start.elapsed().as_secs_f64() * 1000.0
        );

        let route = route(subjects.len(), request.cat_index, self.settings.policy);
        debug!("Route: {route}");

        let classify_start = Instant::now();
        let ranked = match route {
            Route::Primary { index } => {
                let subject = crop(&image, &subjects[index]);
                self.primary.run(&subject)?
            }
            Route::Fallback { .. } => self.fallback.run(&image)?,
        };
        debug!(
            "Classified {} identities in {:.1}ms (total {:.1}ms)",
            ranked.len(),
            classify_start.elapsed().as_secs_f64() * 1000.0,
            start.elapsed().as_secs_f64() * 1000.0
        );

        Ok(Recognition {
            route,
            cat_boxes: truncate(subjects, self.settings.cat_box_max_return),
            candidates: truncate(ranked, self.settings.recognize_max_return),
        })
    }
}
