//! End-to-end pipeline tests against an in-memory store and a disabled
//! inference client, so every enhancement resolves via the local fallback.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use image::{DynamicImage, Rgb, RgbImage};
use serde_json::Value;
use std::io::Cursor;
use tower::ServiceExt;

use frec_api::{create_router, ApiConfig, AppState};
use frec_hf_client::{HfClient, HfConfig};
use frec_store::Store;
use frec_vision::FaceDetector;

fn test_app() -> Router {
    let state = AppState::with_parts(
        ApiConfig::default(),
        Store::in_memory(),
        HfClient::new(HfConfig::default()).expect("client"),
        FaceDetector::disabled(),
    );
    create_router(state, None)
}

/// A 200x200 JPEG with a drawn face-like pattern.
fn face_jpeg() -> Vec<u8> {
    let img = RgbImage::from_fn(200, 200, |x, y| {
        let dx = x as i32 - 100;
        let dy = y as i32 - 100;
        if dx * dx + dy * dy < 70 * 70 {
            // Head disc with darker eye/mouth patches
            if (60..80).contains(&y) && ((70..90).contains(&x) || (110..130).contains(&x)) {
                Rgb([40, 30, 30])
            } else if (130..145).contains(&y) && (80..120).contains(&x) {
                Rgb([120, 50, 50])
            } else {
                Rgb([220, 180, 150])
            }
        } else {
            Rgb([90, 110, 140])
        }
    });
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Jpeg)
        .expect("encode jpeg");
    bytes
}

fn multipart_upload(content_type: &str, filename: &str, bytes: &[u8]) -> Request<Body> {
    let boundary = "testboundary1234";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; \
             filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/upload-image")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .expect("request")
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

async fn upload_case(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(multipart_upload("image/jpeg", "face.jpg", &face_jpeg()))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    json["case_id"].as_str().expect("case_id").to_string()
}

async fn enhance(app: &Router, case_id: &str, query: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/enhance-face/{case_id}{query}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    let status = response.status();
    (status, json_body(response).await)
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
        .await
        .expect("response");
    let status = response.status();
    (status, json_body(response).await)
}

#[tokio::test]
async fn health_reports_service_and_disabled_api() {
    let app = test_app();
    let (status, json) = get_json(&app, "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "AI Face Reconstruction API");
    assert_eq!(json["huggingface_api"], "disabled");
}

#[tokio::test]
async fn models_reports_fallback_mode() {
    let app = test_app();
    let (status, json) = get_json(&app, "/api/models").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["api_status"], "fallback_mode");
    assert_eq!(json["models"].as_object().unwrap().len(), 4);
    assert_eq!(
        json["models"]["restoration"]["model"],
        "microsoft/DiT-XL-2-256"
    );
}

#[tokio::test]
async fn non_image_upload_is_rejected_and_not_persisted() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(multipart_upload("text/plain", "notes.txt", b"hello"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["detail"], "File must be an image");

    let (_, cases) = get_json(&app, "/api/cases").await;
    assert_eq!(cases["statistics"]["total_cases"], 0);
    assert_eq!(cases["cases"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn upload_creates_uploaded_case_with_detection_summary() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(multipart_upload("image/jpeg", "face.jpg", &face_jpeg()))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;

    let case_id = json["case_id"].as_str().expect("case_id");
    assert!(!case_id.is_empty());
    let face_count = json["face_count"].as_u64().expect("face_count");
    assert_eq!(json["faces_detected"].as_bool().unwrap(), face_count > 0);
    assert!(json["file_size"].as_u64().unwrap() > 0);

    let (status, case) = get_json(&app, &format!("/api/case/{case_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(case["status"], "uploaded");
    assert_eq!(case["filename"], "face.jpg");
    assert_eq!(case["image_format"], "image/jpeg");
    assert!(case["original_image"]
        .as_str()
        .unwrap()
        .starts_with("data:image/jpeg;base64,"));
}

#[tokio::test]
async fn uploads_get_unique_case_ids() {
    let app = test_app();
    let first = upload_case(&app).await;
    let second = upload_case(&app).await;
    assert_ne!(first, second);
}

#[tokio::test]
async fn enhancing_unknown_case_is_not_found() {
    let app = test_app();
    let (status, json) = enhance(&app, "no-such-case", "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["detail"], "Case not found");

    let (status, json) = get_json(&app, "/api/result/no-such-result").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["detail"], "Result not found");
}

#[tokio::test]
async fn enhancement_resolves_via_local_fallback() {
    let app = test_app();
    let case_id = upload_case(&app).await;

    let (status, json) = enhance(&app, &case_id, "").await;
    assert_eq!(status, StatusCode::OK);

    let confidence = json["confidence_score"].as_f64().expect("confidence");
    assert_eq!(confidence, 0.75);
    assert_eq!(json["forensic_grade"], false);
    assert_eq!(json["method_used"], "Local filter pipeline");
    assert!(json["processing_time"].as_f64().unwrap() >= 0.0);

    // Enhanced image is a decodable PNG data URI
    let uri = json["enhanced_image"].as_str().expect("enhanced_image");
    assert!(uri.starts_with("data:image/png;base64,"));

    // Result is retrievable by its own id
    let result_id = json["result_id"].as_str().expect("result_id");
    let (status, result) = get_json(&app, &format!("/api/result/{result_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["case_id"], case_id.as_str());
    assert_eq!(result["status"], "completed");
    assert_eq!(result["enhancement_type"], "restoration");
}

#[tokio::test]
async fn forensic_grade_matches_threshold_rule() {
    let app = test_app();
    let case_id = upload_case(&app).await;

    let (_, json) = enhance(&app, &case_id, "").await;
    let confidence = json["confidence_score"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&confidence));
    assert_eq!(
        json["forensic_grade"].as_bool().unwrap(),
        confidence >= 0.8
    );
}

#[tokio::test]
async fn unknown_profile_maps_to_default() {
    let app = test_app();
    let case_id = upload_case(&app).await;

    let (status, json) = enhance(&app, &case_id, "?enhancement_type=deblur").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["model_description"],
        "High-fidelity face restoration with identity preservation"
    );

    let result_id = json["result_id"].as_str().unwrap();
    let (_, result) = get_json(&app, &format!("/api/result/{result_id}")).await;
    assert_eq!(result["enhancement_type"], "restoration");
}

#[tokio::test]
async fn re_enhancement_creates_new_result_and_relinks_case() {
    let app = test_app();
    let case_id = upload_case(&app).await;

    let (_, first) = enhance(&app, &case_id, "").await;
    let (_, second) = enhance(&app, &case_id, "?enhancement_type=forensic_enhancement").await;

    let first_id = first["result_id"].as_str().unwrap();
    let second_id = second["result_id"].as_str().unwrap();
    assert_ne!(first_id, second_id);

    // The case links the most recent result but stays processed
    let (_, case) = get_json(&app, &format!("/api/case/{case_id}")).await;
    assert_eq!(case["status"], "processed");
    assert_eq!(case["result_id"], second_id);

    // The superseded result is still retrievable
    let (status, _) = get_json(&app, &format!("/api/result/{first_id}")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn statistics_cover_the_full_case_set() {
    let app = test_app();
    let first = upload_case(&app).await;
    let _second = upload_case(&app).await;

    let (_, json) = enhance(&app, &first, "").await;
    assert_eq!(json["method_used"], "Local filter pipeline");

    let (status, cases) = get_json(&app, "/api/cases").await;
    assert_eq!(status, StatusCode::OK);

    let stats = &cases["statistics"];
    assert_eq!(stats["total_cases"], 2);
    assert_eq!(stats["processed_cases"], 1);
    assert_eq!(stats["processing_rate"], 50.0);
    assert_eq!(
        cases["cases"].as_array().unwrap().len() as u64,
        stats["total_cases"].as_u64().unwrap()
    );
}

#[tokio::test]
async fn ready_probe_reports_memory_backend() {
    let app = test_app();
    let (status, json) = get_json(&app, "/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ready");
    assert_eq!(json["checks"]["store"]["backend"], "memory");
}

#[tokio::test]
async fn missing_file_field_is_a_client_error() {
    let app = test_app();
    let boundary = "testboundary1234";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nvalue\r\n--{boundary}--\r\n"
    );
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/upload-image")
                .header(
                    "content-type",
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
