//! End-to-end upload flows against an in-process analysis service.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use medportal::upload::{
    CandidateFile, HttpTransport, Severity, TransportConfig, UiState, UploadMachine,
    ValidationError,
};

const MIB: usize = 1024 * 1024;

#[derive(Clone)]
struct Service {
    calls: Arc<AtomicUsize>,
    status: StatusCode,
    body: Value,
}

async fn analyze(State(service): State<Service>, mut multipart: Multipart) -> impl IntoResponse {
    service.calls.fetch_add(1, Ordering::SeqCst);
    while let Some(field) = multipart.next_field().await.unwrap() {
        assert_eq!(field.name(), Some("file"));
        field.bytes().await.unwrap();
    }
    (service.status, Json(service.body.clone()))
}

async fn spawn(status: StatusCode, body: Value) -> (String, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let router = Router::new()
        .route("/analyze-report", post(analyze))
        .layer(DefaultBodyLimit::max(16 * MIB))
        .with_state(Service {
            calls: calls.clone(),
            status,
            body,
        });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://{}/analyze-report", addr), calls)
}

fn transport(endpoint: String) -> HttpTransport {
    HttpTransport::new(TransportConfig {
        endpoint,
        ..TransportConfig::default()
    })
    .unwrap()
}

fn cbc_report() -> Value {
    json!({
        "status": "success",
        "filename": "cbc.png",
        "summary": {
            "total_parameters": 5,
            "abnormal_parameters": 1,
            "report_type": "Complete Blood Count",
            "overall_status": "Mostly normal",
            "average_confidence": 0.91
        },
        "categories": {
            "Blood Counts": {
                "Hb": {"value": 10.2, "unit": "g/dL", "normal_range": "12-16", "status": "Low",
                       "interpretation": "Below reference range", "confidence": 0.93},
                "WBC": {"value": 6800, "unit": "/uL", "normal_range": "4000-11000",
                        "status": "Normal"},
                "Platelets": {"value": 250000, "unit": "/uL", "status": "Normal"}
            },
            "Chemistry": {
                "Glucose": {"value": 92, "unit": "mg/dL", "status": "Normal"},
                "Creatinine": {"value": 0.9, "unit": "mg/dL", "status": "Normal"}
            }
        },
        "confidence_scores": {"WBC": 0.88}
    })
}

#[tokio::test]
async fn png_upload_reaches_succeeded() {
    let (endpoint, calls) = spawn(StatusCode::OK, cbc_report()).await;
    let transport = transport(endpoint);

    let mut machine = UploadMachine::new();
    machine
        .select(CandidateFile::new("cbc.png", "image/png", vec![0u8; 2 * MIB]))
        .unwrap();
    assert_eq!(machine.state().name(), "selected");

    assert!(machine.submit(&transport).await);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let UiState::Succeeded(model) = machine.state() else {
        panic!("expected success, got {:?}", machine.state());
    };
    assert_eq!(model.total_parameters, 5);
    assert_eq!(model.abnormal_parameters, 1);
    assert_eq!(model.normal_count, 4);
    assert_eq!(model.report_type, "Complete Blood Count");

    let blood = model.category("Blood Counts").unwrap();
    let low: Vec<_> = blood
        .parameters
        .iter()
        .filter(|p| p.severity == Severity::Low)
        .collect();
    assert_eq!(low.len(), 1);
    assert_eq!(low[0].name, "Hb");

    let abnormal = model
        .parameters()
        .filter(|(_, p)| p.severity.is_abnormal())
        .count();
    assert_eq!(abnormal, 1);
    assert!(machine.error_message().is_none());
}

#[tokio::test]
async fn oversized_jpeg_never_reaches_the_service() {
    let (endpoint, calls) = spawn(StatusCode::OK, cbc_report()).await;
    let transport = transport(endpoint);

    let mut machine = UploadMachine::new();
    let err = machine
        .select(CandidateFile::new("scan.jpg", "image/jpeg", vec![0u8; 12 * MIB]))
        .unwrap_err();
    assert!(matches!(err, ValidationError::TooLarge { .. }));
    assert_eq!(machine.state(), &UiState::Idle);
    assert!(machine.error_message().unwrap().contains("too large"));

    assert!(!machine.submit(&transport).await);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn server_error_detail_is_shown() {
    let (endpoint, calls) = spawn(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"detail": "OCR engine unavailable"}),
    )
    .await;
    let transport = transport(endpoint);

    let mut machine = UploadMachine::new();
    machine
        .select(CandidateFile::new("cbc.png", "image/png", vec![1u8; 4096]))
        .unwrap();
    machine.submit(&transport).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let UiState::Failed { message, .. } = machine.state() else {
        panic!("expected failure, got {:?}", machine.state());
    };
    assert!(message.contains("OCR engine unavailable"));
    assert!(message.contains("500"));

    // The failed file can be sent again without reselecting it.
    assert!(machine.submit(&transport).await);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(machine.state().name(), "failed");

    // A new selection recovers from the failure.
    assert!(machine
        .select(CandidateFile::new("retry.png", "image/png", vec![1u8; 16]))
        .unwrap());
    assert_eq!(machine.state().name(), "selected");
    assert!(machine.error_message().is_none());
}

#[tokio::test]
async fn unsuccessful_status_never_succeeds() {
    let (endpoint, _calls) = spawn(
        StatusCode::OK,
        json!({"status": "error", "message": "could not read image"}),
    )
    .await;
    let transport = transport(endpoint);

    let mut machine = UploadMachine::new();
    machine
        .select(CandidateFile::new("blurry.png", "image/png", vec![2u8; 64]))
        .unwrap();
    machine.submit(&transport).await;

    let UiState::Failed { message, .. } = machine.state() else {
        panic!("expected failure, got {:?}", machine.state());
    };
    assert!(message.starts_with("Analysis failed"));
}

#[tokio::test]
async fn unsupported_type_is_rejected_before_upload() {
    let mut machine = UploadMachine::new();
    let err = machine
        .select(CandidateFile::new("report.pdf", "application/pdf", vec![0u8; 128]))
        .unwrap_err();
    assert!(matches!(err, ValidationError::UnsupportedType { .. }));
    assert_eq!(machine.state(), &UiState::Idle);
}
