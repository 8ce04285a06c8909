//! Integration test: web pages and API endpoints

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use salary_predictor::data::{EmployeeRecord, SAMPLE_CSV};
use salary_predictor::server::{create_router, AppState, ServerConfig};
use std::sync::{Arc, OnceLock};
use tower::ServiceExt;

const BOUNDARY: &str = "salary-test-boundary";

fn test_app() -> axum::Router {
    static PREDICTOR: OnceLock<Arc<salary_predictor::inference::Predictor>> = OnceLock::new();
    let predictor = PREDICTOR
        .get_or_init(|| Arc::new(common::trained_predictor()))
        .clone();

    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        max_upload_size: 1024 * 1024,
        ..ServerConfig::default()
    };
    create_router(Arc::new(AppState::new(config, predictor)))
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

fn multipart_request(uri: &str, csv: &str) -> Request<Body> {
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"input.csv\"\r\n\
Content-Type: text/csv\r\n\r\n{csv}\r\n--{b}--\r\n",
        b = BOUNDARY,
        csv = csv
    );
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let response = test_app().oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(!json["model"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_root_serves_home_page() {
    let response = test_app().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Welcome to Salary Predictor"));
    assert!(html.contains("sambhasis.jena245@gmail.com"));
}

#[tokio::test]
async fn test_page_query_selects_page() {
    let html = body_text(test_app().oneshot(get("/?page=manual")).await.unwrap()).await;
    assert!(html.contains("<form method=\"post\" action=\"/manual\">"));

    let html = body_text(test_app().oneshot(get("/?page=bulk")).await.unwrap()).await;
    assert!(html.contains("Upload a CSV file"));

    let html = body_text(test_app().oneshot(get("/?page=feedback")).await.unwrap()).await;
    assert!(html.contains("Feedback / Suggestions"));
}

#[tokio::test]
async fn test_schema_endpoint() {
    let response = test_app().oneshot(get("/api/schema")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["features"].as_array().unwrap().len(), 9);
    assert_eq!(json["target"], "salary");
    assert_eq!(json["choices"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_predict_json() {
    let record = serde_json::to_string(&EmployeeRecord::sample()).unwrap();
    let request = Request::builder()
        .method("POST")
        .uri("/api/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(record))
        .unwrap();

    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["predicted_salary"].as_f64().unwrap() > 0.0);
    assert!(json["formatted"].as_str().unwrap().starts_with('$'));
}

#[tokio::test]
async fn test_predict_json_unknown_category() {
    let record = EmployeeRecord {
        location: "Atlantis".to_string(),
        ..EmployeeRecord::sample()
    };
    let request = Request::builder()
        .method("POST")
        .uri("/api/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&record).unwrap()))
        .unwrap();

    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["column"], "location");
}

#[tokio::test]
async fn test_manual_form_submission() {
    let form = "education_level=Bachelors&years_experience=5&job_title=Data+Scientist\
&industry=IT&location=New+York&company_size=Medium&certifications=2&age=30&working_hours=40";
    let request = Request::builder()
        .method("POST")
        .uri("/manual")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form))
        .unwrap();

    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Predicted Salary: <strong>$"));
}

#[tokio::test]
async fn test_manual_form_out_of_range() {
    let form = "education_level=Bachelors&years_experience=5&job_title=Analyst\
&industry=IT&location=London&company_size=Small&certifications=2&age=12&working_hours=40";
    let request = Request::builder()
        .method("POST")
        .uri("/manual")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form))
        .unwrap();

    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = body_text(response).await;
    assert!(html.contains("class=\"error\""));
    assert!(html.contains("age"));
}

#[tokio::test]
async fn test_bulk_preview() {
    let response = test_app()
        .oneshot(multipart_request("/api/bulk/preview", SAMPLE_CSV))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["rows"], 1);
    assert_eq!(json["columns"].as_array().unwrap().len(), 9);
    assert_eq!(json["preview"][0]["job_title"], "Data Scientist");

    let keys: Vec<&String> = json["preview"][0].as_object().unwrap().keys().collect();
    let columns: Vec<&String> = json["columns"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| match c {
            serde_json::Value::String(s) => s,
            _ => panic!("column names are strings"),
        })
        .collect();
    assert_eq!(keys, columns);
    assert_eq!(keys[0], "education_level");
}

#[tokio::test]
async fn test_bulk_preview_page() {
    let response = test_app()
        .oneshot(multipart_request("/bulk", SAMPLE_CSV))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<th>job_title</th>"));
}

#[tokio::test]
async fn test_bulk_predict_returns_csv() {
    let response = test_app()
        .oneshot(multipart_request("/api/bulk/predict", SAMPLE_CSV))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers().clone();
    assert!(headers[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/csv"));
    assert!(headers[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("salary_predictions.csv"));

    let csv = body_text(response).await;
    let mut lines = csv.lines();
    assert!(lines.next().unwrap().ends_with("Predicted_Salary"));
    assert_eq!(lines.count(), 1);
}

#[tokio::test]
async fn test_bulk_predict_unknown_job_title() {
    let csv = SAMPLE_CSV.replace("Data Scientist", "Astronaut");
    let response = test_app()
        .oneshot(multipart_request("/api/bulk/predict", &csv))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], true);
    assert_eq!(json["column"], "job_title");
    assert!(json["message"].as_str().unwrap().contains("job_title"));
}

#[tokio::test]
async fn test_bulk_predict_without_file() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/bulk/predict")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(format!("--{}--\r\n", BOUNDARY)))
        .unwrap();
    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sample_download() {
    let response = test_app().oneshot(get("/api/sample")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("sample_salary_input.csv"));
    assert_eq!(body_text(response).await, SAMPLE_CSV);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let response = test_app().oneshot(get("/api/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
