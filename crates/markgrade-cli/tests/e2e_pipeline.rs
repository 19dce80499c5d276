//! End-to-end pipeline tests wiring the grading engine to mock collaborators.
//!
//! These verify the whole flow (load key → detect → identify → grade →
//! store → export) without external programs.

use std::path::PathBuf;
use std::sync::Arc;

use markgrade_core::engine::{GradingEngine, GradingEngineConfig, NoopReporter};
use markgrade_core::report::{GradingReport, KeySummary};
use markgrade_core::store::{InMemoryResultStore, ResultStore};
use markgrade_core::GradingError;
use markgrade_extract::mock::{MockDetector, MockExtractor, MockOcr};
use markgrade_extract::{DocumentAnswerDetector, PlainTextExtractor, RandomAnswerDetector};
use markgrade_report::csv::{export_store, read_results_csv};

fn paths(names: &[&str]) -> Vec<PathBuf> {
    names.iter().map(PathBuf::from).collect()
}

fn engine_with(
    key_text: &str,
    detector: MockDetector,
) -> (GradingEngine, Arc<InMemoryResultStore>) {
    let store = Arc::new(InMemoryResultStore::new());
    let engine = GradingEngine::new(
        Arc::new(MockExtractor::with_document("key.docx", key_text)),
        Arc::new(detector),
        store.clone(),
        GradingEngineConfig::default(),
    );
    (engine, store)
}

#[tokio::test]
async fn e2e_grade_and_export() {
    let (engine, store) = engine_with(
        "Kunci jawaban\n1. A\n2. B\n3) c\n4. D",
        MockDetector::new(&[
            ("IMG-20230707-WA0001.jpg", "AXCD"),
            ("WhatsApp Image 2023-07-07 at 08.01.01.jpeg", "ABCD"),
            ("siti.pdf", "DCBA"),
        ]),
    );

    let key = engine.load_key("key.docx".as_ref()).await.unwrap();
    assert_eq!(key.to_letters(), "ABCD");

    let outcome = engine
        .grade_batch(
            &key,
            &paths(&[
                "IMG-20230707-WA0001.jpg",
                "WhatsApp Image 2023-07-07 at 08.01.01.jpeg",
                "siti.pdf",
            ]),
            &NoopReporter,
        )
        .await;
    assert!(outcome.failures.is_empty());

    let summary: Vec<(String, u32)> = outcome
        .results
        .iter()
        .map(|r| (r.name.clone(), r.score))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Student_0001".to_string(), 3),
            ("Student_080101".to_string(), 4),
            ("siti".to_string(), 0),
        ]
    );
    assert_eq!(store.len(), 3);

    let dir = tempfile::tempdir().unwrap();
    let csv_path = export_store(store.as_ref(), dir.path()).unwrap();
    let mut exported = read_results_csv(&csv_path).unwrap();
    let mut stored = store.snapshot();
    exported.sort_by(|a, b| a.name.cmp(&b.name));
    stored.sort_by(|a, b| a.name.cmp(&b.name));
    assert_eq!(exported, stored);

    let report = GradingReport::new(KeySummary::new("key.docx", &key), store.snapshot());
    assert_eq!(report.summary.submissions, 3);
    assert_eq!(report.summary.max_score, 4);
    assert!(!report.has_placeholder_results());
}

#[tokio::test]
async fn e2e_failures_do_not_stop_the_batch() {
    let (engine, store) = engine_with(
        "1. A\n2. B\n3. C",
        MockDetector::new(&[("good.jpg", "ABC"), ("short.jpg", "AB")]),
    );
    let key = engine.load_key("key.docx".as_ref()).await.unwrap();

    let outcome = engine
        .grade_batch(
            &key,
            &paths(&["short.jpg", "good.jpg", "unknown.jpg", "notes.gif"]),
            &NoopReporter,
        )
        .await;

    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.results[0].score, 3);
    assert_eq!(outcome.failures.len(), 3);
    assert!(matches!(
        outcome.failures[0].error,
        GradingError::LengthMismatch {
            expected: 3,
            found: 2
        }
    ));
    assert!(outcome.failures[1].error.is_collaborator_failure());
    assert!(matches!(
        outcome.failures[2].error,
        GradingError::UnsupportedFormat { .. }
    ));
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn e2e_ocr_name_and_fallback() {
    let detector = || MockDetector::new(&[("IMG-20230707-WA0007.jpg", "AB")]);
    let submission = paths(&["IMG-20230707-WA0007.jpg"]);

    let (engine, _) = engine_with("1. A\n2. B", detector());
    let engine = engine.with_ocr(Arc::new(MockOcr::with_text(" Dewi Lestari ")));
    let key = engine.load_key("key.docx".as_ref()).await.unwrap();
    let outcome = engine.grade_batch(&key, &submission, &NoopReporter).await;
    assert_eq!(outcome.results[0].name, "Dewi Lestari");

    let (engine, _) = engine_with("1. A\n2. B", detector());
    let ocr = Arc::new(MockOcr::failing());
    let engine = engine.with_ocr(ocr.clone());
    let outcome = engine.grade_batch(&key, &submission, &NoopReporter).await;
    assert_eq!(outcome.results[0].name, "Student_0007");
    assert_eq!(ocr.call_count(), 1);

    let (engine, _) = engine_with("1. A\n2. B", detector());
    let engine = engine.with_ocr(Arc::new(MockOcr::with_text("x")));
    let outcome = engine.grade_batch(&key, &submission, &NoopReporter).await;
    assert_eq!(outcome.results[0].name, "Student_0007");
}

#[tokio::test]
async fn e2e_placeholder_detector_is_flagged() {
    let store = Arc::new(InMemoryResultStore::new());
    let engine = GradingEngine::new(
        Arc::new(MockExtractor::with_document("key.docx", "1. A\n2. B\n3. C\n4. D")),
        Arc::new(RandomAnswerDetector::seeded(Default::default(), 7)),
        store.clone(),
        GradingEngineConfig::default(),
    );
    let key = engine.load_key("key.docx".as_ref()).await.unwrap();
    let result = engine
        .grade_submission(&key, "IMG-20230707-WA0002.jpg".as_ref())
        .await
        .unwrap();

    assert!(result.placeholder_answers);
    assert_eq!(result.total, 4);
    assert_eq!(result.correct.len() + result.incorrect.len(), 4);
}

#[tokio::test]
async fn e2e_document_submissions_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let key_path = dir.path().join("key.txt");
    let sub_path = dir.path().join("rina.txt");
    std::fs::write(&key_path, "1. A\n2. B\n3. C\n4. D\n").unwrap();
    std::fs::write(&sub_path, "Nama: Rina\n1. A\n2. B\n3. D\n4. D\n").unwrap();

    let extractor = Arc::new(PlainTextExtractor::new());
    let store = Arc::new(InMemoryResultStore::new());
    let engine = GradingEngine::new(
        extractor.clone(),
        Arc::new(DocumentAnswerDetector::new(extractor, &Default::default())),
        store.clone(),
        GradingEngineConfig::default(),
    );

    let key = engine.load_key(&key_path).await.unwrap();
    let result = engine.grade_submission(&key, &sub_path).await.unwrap();

    assert_eq!(result.name, "rina");
    assert_eq!(result.score, 3);
    assert_eq!(result.incorrect.iter().copied().collect::<Vec<_>>(), vec![3]);
    assert!(!result.placeholder_answers);
}

#[tokio::test]
async fn e2e_missing_key_text_is_a_parse_failure() {
    let (engine, store) = engine_with("no numbered answers here", MockDetector::new(&[]));
    let err = engine.load_key("key.docx".as_ref()).await.unwrap_err();
    assert!(matches!(err, GradingError::ParseFailure { .. }));
    assert_eq!(
        err.user_message(),
        "Answer key extraction failed. Please check the file format."
    );
    assert!(store.is_empty());
}
