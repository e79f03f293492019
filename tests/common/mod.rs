//! Shared fakes for integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::panic)]

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use whisker::auth::{SignatureMode, SignatureVerifier};
use whisker::config::{MultiSubjectPolicy, ResizeFilter, ResizeMode, ScoreTransform};
use whisker::inference::{Classifier, Detector};
use whisker::pipeline::{
    ClassifierSlot, DetectionBox, Normalization, NormalizedImage, PipelineSettings, Recognizer,
};
use whisker::utils::IdentityTable;
use whisker::{Error, Result};

pub const SECRET: &str = "test-secret";
pub const NOW: i64 = 1_700_000_000;
pub const PRIMARY_SIDE: u32 = 32;
pub const FALLBACK_SIDE: u32 = 16;

/// Detector returning a fixed list of boxes.
pub struct FakeDetector {
    boxes: Vec<DetectionBox>,
    fail: bool,
    pub calls: Arc<AtomicUsize>,
}

impl Detector for FakeDetector {
    fn detect(&self, _image: &DynamicImage) -> Result<Vec<DetectionBox>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::DetectionFailure {
                reason: "detector exploded".to_string(),
            });
        }
        Ok(self.boxes.clone())
    }
}

/// Classifier returning fixed scores and recording the input side.
pub struct FakeClassifier {
    scores: Vec<f32>,
    panics: bool,
    calls: Arc<AtomicUsize>,
    sides: Arc<Mutex<Vec<u32>>>,
}

impl Classifier for FakeClassifier {
    fn classify(&self, image: &NormalizedImage) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.panics {
            panic!("classifier crashed");
        }
        self.sides.lock().unwrap().push(image.side());
        Ok(self.scores.clone())
    }
}

/// Call counters for one fake pipeline.
#[derive(Clone, Default)]
pub struct Probes {
    pub detector: Arc<AtomicUsize>,
    pub primary: Arc<AtomicUsize>,
    pub fallback: Arc<AtomicUsize>,
    pub primary_sides: Arc<Mutex<Vec<u32>>>,
    pub fallback_sides: Arc<Mutex<Vec<u32>>>,
}

impl Probes {
    pub fn detector_calls(&self) -> usize {
        self.detector.load(Ordering::SeqCst)
    }

    pub fn primary_calls(&self) -> usize {
        self.primary.load(Ordering::SeqCst)
    }

    pub fn fallback_calls(&self) -> usize {
        self.fallback.load(Ordering::SeqCst)
    }
}

/// Builder for a recognizer wired to fakes.
pub struct Harness {
    pub boxes: Vec<DetectionBox>,
    pub detector_fails: bool,
    pub policy: MultiSubjectPolicy,
    pub verifier: Option<SignatureVerifier>,
    pub primary_scores: Vec<f32>,
    pub classifiers_panic: bool,
    pub fallback_scores: Vec<f32>,
    pub primary_transform: ScoreTransform,
    pub recognize_max_return: usize,
    pub cat_box_max_return: usize,
}

impl Default for Harness {
    fn default() -> Self {
        Self {
            boxes: Vec::new(),
            detector_fails: false,
            policy: MultiSubjectPolicy::UseFirst,
            verifier: Some(SignatureVerifier::new(
                SECRET,
                SignatureMode::WithTimestamp { tolerance_secs: 30 },
            )),
            primary_scores: vec![0.1, 2.0, 0.5],
            classifiers_panic: false,
            fallback_scores: vec![0.3, 0.7],
            primary_transform: ScoreTransform::Raw,
            recognize_max_return: 20,
            cat_box_max_return: 5,
        }
    }
}

impl Harness {
    pub fn build(self) -> (Recognizer, Probes) {
        let probes = Probes::default();

        let detector = FakeDetector {
            boxes: self.boxes,
            fail: self.detector_fails,
            calls: Arc::clone(&probes.detector),
        };

        let primary = ClassifierSlot::new(
            Box::new(FakeClassifier {
                scores: self.primary_scores,
                panics: self.classifiers_panic,
                calls: Arc::clone(&probes.primary),
                sides: Arc::clone(&probes.primary_sides),
            }),
            table(&["tom", "felix", "garfield"]),
            Normalization {
                side: PRIMARY_SIDE,
                mode: ResizeMode::Letterbox,
                pad_color: [114, 114, 114],
                filter: ResizeFilter::Bilinear,
            },
            self.primary_transform,
        );

        let fallback = ClassifierSlot::new(
            Box::new(FakeClassifier {
                scores: self.fallback_scores,
                panics: self.classifiers_panic,
                calls: Arc::clone(&probes.fallback),
                sides: Arc::clone(&probes.fallback_sides),
            }),
            table(&["stray-a", "stray-b"]),
            Normalization {
                side: FALLBACK_SIDE,
                mode: ResizeMode::DirectSquare,
                pad_color: [114, 114, 114],
                filter: ResizeFilter::Nearest,
            },
            ScoreTransform::Probability,
        );

        let settings = PipelineSettings {
            subject_label: "cat".to_string(),
            policy: self.policy,
            cat_box_max_return: self.cat_box_max_return,
            recognize_max_return: self.recognize_max_return,
        };

        (
            Recognizer::new(self.verifier, Box::new(detector), primary, fallback, settings),
            probes,
        )
    }
}

pub fn table(ids: &[&str]) -> IdentityTable {
    IdentityTable::new(ids.iter().map(ToString::to_string).collect()).unwrap()
}

pub fn cat_box(xmin: f32, ymin: f32, xmax: f32, ymax: f32) -> DetectionBox {
    labelled_box("cat", xmin, ymin, xmax, ymax)
}

pub fn labelled_box(label: &str, xmin: f32, ymin: f32, xmax: f32, ymax: f32) -> DetectionBox {
    DetectionBox {
        xmin,
        ymin,
        xmax,
        ymax,
        confidence: 0.9,
        label: label.to_string(),
    }
}

/// A 200×150 PNG.
pub fn png_photo() -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(200, 150, Rgb([120, 80, 40])));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}
