//! End-to-end pipeline behavior with fake detector and classifiers.

#![allow(clippy::unwrap_used)]

mod common;

use common::{
    FALLBACK_SIDE, Harness, NOW, PRIMARY_SIDE, SECRET, cat_box, labelled_box, png_photo,
};
use whisker::Error;
use whisker::auth::compute_signature;
use whisker::config::{MultiSubjectPolicy, ScoreTransform};
use whisker::pipeline::{FallbackReason, RecognizeRequest, Route};

fn signed(photo: Vec<u8>, timestamp: i64) -> RecognizeRequest {
    let signature = compute_signature(&photo, Some(timestamp), SECRET);
    RecognizeRequest {
        photo,
        timestamp: Some(timestamp),
        signature: Some(signature),
        cat_index: None,
    }
}

#[test]
fn test_zero_subjects_use_fallback() {
    let (recognizer, probes) = Harness {
        boxes: vec![labelled_box("dog", 0.0, 0.0, 50.0, 50.0)],
        ..Harness::default()
    }
    .build();

    let result = recognizer.recognize_at(&signed(png_photo(), NOW), NOW).unwrap();

    assert_eq!(
        result.route,
        Route::Fallback {
            reason: FallbackReason::NoSubject
        }
    );
    assert!(result.cat_boxes.is_empty());
    let ids: Vec<&str> = result
        .candidates
        .iter()
        .map(|c| c.identity_id.as_str())
        .collect();
    assert_eq!(ids, vec!["stray-b", "stray-a"]);
    assert_eq!(probes.primary_calls(), 0);
    assert_eq!(probes.fallback_calls(), 1);
    assert_eq!(*probes.fallback_sides.lock().unwrap(), vec![FALLBACK_SIDE]);
}

#[test]
fn test_single_subject_uses_primary() {
    let (recognizer, probes) = Harness {
        boxes: vec![cat_box(10.0, 10.0, 110.0, 110.0)],
        ..Harness::default()
    }
    .build();

    let result = recognizer.recognize_at(&signed(png_photo(), NOW), NOW).unwrap();

    assert_eq!(result.route, Route::Primary { index: 0 });
    assert_eq!(result.cat_boxes.len(), 1);
    assert_eq!(result.candidates[0].identity_id, "felix");
    // raw logits are softmaxed
    let total: f32 = result.candidates.iter().map(|c| c.score).sum();
    assert!((total - 1.0).abs() < 1e-5);
    assert_eq!(*probes.primary_sides.lock().unwrap(), vec![PRIMARY_SIDE]);
    assert_eq!(probes.fallback_calls(), 0);
}

#[test]
fn test_out_of_range_index_selects_first() {
    let (recognizer, _probes) = Harness {
        boxes: vec![
            cat_box(0.0, 0.0, 50.0, 50.0),
            labelled_box("person", 0.0, 0.0, 10.0, 10.0),
            cat_box(60.0, 60.0, 120.0, 120.0),
        ],
        ..Harness::default()
    }
    .build();

    let mut request = signed(png_photo(), NOW);
    request.cat_index = Some(5);
    let result = recognizer.recognize_at(&request, NOW).unwrap();

    assert_eq!(result.route, Route::Primary { index: 0 });
    assert_eq!(result.cat_boxes.len(), 2);

    request.cat_index = Some(1);
    let result = recognizer.recognize_at(&request, NOW).unwrap();
    assert_eq!(result.route, Route::Primary { index: 1 });
}

#[test]
fn test_multi_subject_fallback_policy() {
    let (recognizer, probes) = Harness {
        boxes: vec![cat_box(0.0, 0.0, 50.0, 50.0), cat_box(60.0, 60.0, 120.0, 120.0)],
        policy: MultiSubjectPolicy::UseFallback,
        ..Harness::default()
    }
    .build();

    let result = recognizer.recognize_at(&signed(png_photo(), NOW), NOW).unwrap();

    assert_eq!(
        result.route,
        Route::Fallback {
            reason: FallbackReason::MultipleSubjects(2)
        }
    );
    assert_eq!(result.cat_boxes.len(), 2);
    assert_eq!(probes.fallback_calls(), 1);
    assert_eq!(probes.primary_calls(), 0);
}

#[test]
fn test_stale_timestamp_skips_inference() {
    let (recognizer, probes) = Harness {
        boxes: vec![cat_box(10.0, 10.0, 110.0, 110.0)],
        ..Harness::default()
    }
    .build();

    let err = recognizer
        .recognize_at(&signed(png_photo(), NOW - 31), NOW)
        .unwrap_err();

    assert!(matches!(err, Error::AuthenticationFailure { .. }));
    assert_eq!(probes.detector_calls(), 0);
    assert_eq!(probes.primary_calls() + probes.fallback_calls(), 0);

    // 30 seconds is still inside the window
    assert!(recognizer.recognize_at(&signed(png_photo(), NOW - 30), NOW).is_ok());
}

#[test]
fn test_tampered_photo_rejected() {
    let (recognizer, probes) = Harness::default().build();

    let mut request = signed(png_photo(), NOW);
    let last = request.photo.len() - 1;
    request.photo[last] ^= 0x01;

    let err = recognizer.recognize_at(&request, NOW).unwrap_err();
    assert!(matches!(err, Error::AuthenticationFailure { .. }));
    assert_eq!(probes.detector_calls(), 0);
}

#[test]
fn test_missing_fields_are_malformed() {
    let (recognizer, _probes) = Harness::default().build();

    let mut request = signed(png_photo(), NOW);
    request.signature = None;
    assert!(matches!(
        recognizer.recognize_at(&request, NOW),
        Err(Error::MalformedInput { .. })
    ));

    let mut request = signed(png_photo(), NOW);
    request.timestamp = None;
    assert!(matches!(
        recognizer.recognize_at(&request, NOW),
        Err(Error::MalformedInput { .. })
    ));

    let request = RecognizeRequest::default();
    assert!(matches!(
        recognizer.recognize_at(&request, NOW),
        Err(Error::MalformedInput { .. })
    ));
}

#[test]
fn test_undecodable_photo_is_malformed() {
    let (recognizer, probes) = Harness::default().build();

    let err = recognizer
        .recognize_at(&signed(b"definitely not an image".to_vec(), NOW), NOW)
        .unwrap_err();

    assert!(matches!(err, Error::MalformedInput { .. }));
    assert_eq!(probes.detector_calls(), 0);
}

#[test]
fn test_detector_failure_surfaces() {
    let (recognizer, _probes) = Harness {
        detector_fails: true,
        ..Harness::default()
    }
    .build();

    let err = recognizer
        .recognize_at(&signed(png_photo(), NOW), NOW)
        .unwrap_err();

    assert!(matches!(err, Error::DetectionFailure { .. }));
    assert!(err.envelope_message().contains("detector exploded"));
}

#[test]
fn test_score_length_mismatch_is_classification_failure() {
    let (recognizer, _probes) = Harness {
        boxes: vec![cat_box(10.0, 10.0, 110.0, 110.0)],
        primary_scores: vec![0.5, 0.5],
        ..Harness::default()
    }
    .build();

    let err = recognizer
        .recognize_at(&signed(png_photo(), NOW), NOW)
        .unwrap_err();
    assert!(matches!(err, Error::ClassificationFailure { .. }));
}

#[test]
fn test_results_truncated_independently() {
    let (recognizer, _probes) = Harness {
        boxes: vec![
            cat_box(0.0, 0.0, 50.0, 50.0),
            cat_box(60.0, 60.0, 120.0, 120.0),
            cat_box(100.0, 10.0, 190.0, 140.0),
        ],
        primary_transform: ScoreTransform::Probability,
        primary_scores: vec![0.2, 0.2, 0.6],
        recognize_max_return: 2,
        cat_box_max_return: 1,
        ..Harness::default()
    }
    .build();

    let result = recognizer.recognize_at(&signed(png_photo(), NOW), NOW).unwrap();

    assert_eq!(result.cat_boxes.len(), 1);
    let ranked: Vec<(&str, f32)> = result
        .candidates
        .iter()
        .map(|c| (c.identity_id.as_str(), c.score))
        .collect();
    assert_eq!(ranked, vec![("garfield", 0.6), ("tom", 0.2)]);
}

#[test]
fn test_auth_disabled_accepts_unsigned() {
    let (recognizer, _probes) = Harness {
        verifier: None,
        ..Harness::default()
    }
    .build();

    let request = RecognizeRequest {
        photo: png_photo(),
        ..RecognizeRequest::default()
    };
    assert!(recognizer.recognize_at(&request, NOW).is_ok());
}
