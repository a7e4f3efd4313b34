//! Endpoint tests for the train/predict API.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use http_body_util::BodyExt;
    use lendtree_model::ModelStore;
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::server::{build_router, AppState};

    const TRAINING_CSV: &str = "\
Credit_Score,Income,Loan_Amount(s),Loan_Approved
700,50000,10000,Yes
400,20000,30000,No
750,60000,5000,approved
380,18000,28000,REJECTED
";

    fn seeded_router(dir: &TempDir) -> Router {
        seeded_router_with_csv(dir, TRAINING_CSV)
    }

    fn seeded_router_with_csv(dir: &TempDir, csv: &str) -> Router {
        let csv_path = dir.path().join("loans.csv");
        std::fs::write(&csv_path, csv).unwrap();
        let state = AppState::new(csv_path, ModelStore::new(dir.path().join("ml_model")));
        build_router(Arc::new(state))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post(uri: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, body.to_vec())
    }

    async fn send_json(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let (status, body) = send(router, request).await;
        let value = serde_json::from_slice(&body).unwrap_or_else(|err| {
            panic!("non-JSON body ({err}): {}", String::from_utf8_lossy(&body))
        });
        (status, value)
    }

    #[tokio::test]
    async fn index_banner_lists_the_features() {
        let dir = TempDir::new().unwrap();
        let router = seeded_router(&dir);

        let (status, body) = send(&router, get("/")).await;
        let text = String::from_utf8(body).unwrap();
        assert_eq!(status, StatusCode::OK);
        assert!(text.contains("Credit_Score"), "banner was: {text}");
        assert!(text.contains("Loan_Amount(s)"));
    }

    #[tokio::test]
    async fn train_then_predict_round_trip() {
        let dir = TempDir::new().unwrap();
        let router = seeded_router(&dir);

        let (status, body) = send_json(&router, post("/train")).await;
        assert_eq!(status, StatusCode::OK, "train failed: {body}");
        assert_eq!(body["ok"], json!(true));
        assert_eq!(body["message"], json!("Model trained & saved."));
        assert_eq!(body["samples_used"], json!(4));
        assert_eq!(body["rows_skipped"], json!(0));
        assert_eq!(body["target"], json!("Loan_Approved"));
        assert_eq!(
            body["features"],
            json!(["Credit_Score", "Income", "Loan_Amount(s)"])
        );

        let request = post_json(
            "/predict",
            &json!({
                "record": {
                    "Credit_Score": 720,
                    "Income": 55000,
                    "Loan_Amount(s)": 8000,
                }
            }),
        );
        let (status, body) = send_json(&router, request).await;
        assert_eq!(status, StatusCode::OK, "predict failed: {body}");
        assert_eq!(body["ok"], json!(true));
        assert_eq!(body["label"], json!(1));
        assert_eq!(body["prediction"], json!("Approved ✅"));
        assert_eq!(body["input_vector"], json!([720.0, 55000.0, 8000.0]));

        let request = post_json(
            "/predict",
            &json!({
                "record": {
                    "Credit_Score": 390,
                    "Income": 19000,
                    "Loan_Amount(s)": 29000,
                }
            }),
        );
        let (status, body) = send_json(&router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["label"], json!(0));
        assert_eq!(body["prediction"], json!("Rejected ❌"));
    }

    #[tokio::test]
    async fn predict_accepts_numeric_strings() {
        let dir = TempDir::new().unwrap();
        let router = seeded_router(&dir);
        send_json(&router, post("/train")).await;

        let request = post_json(
            "/predict",
            &json!({
                "record": {
                    "Credit_Score": "720",
                    "Income": " 55000 ",
                    "Loan_Amount(s)": "8000",
                }
            }),
        );
        let (status, body) = send_json(&router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["label"], json!(1));
    }

    #[tokio::test]
    async fn predict_before_training_is_rejected() {
        let dir = TempDir::new().unwrap();
        let router = seeded_router(&dir);

        let request = post_json(
            "/predict",
            &json!({
                "record": {
                    "Credit_Score": 720,
                    "Income": 55000,
                    "Loan_Amount(s)": 8000,
                }
            }),
        );
        let (status, body) = send_json(&router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["ok"], json!(false));
        assert!(
            body["error"].as_str().unwrap().contains("not trained"),
            "error was: {body}"
        );
    }

    #[tokio::test]
    async fn predict_with_missing_feature_is_rejected() {
        let dir = TempDir::new().unwrap();
        let router = seeded_router(&dir);
        send_json(&router, post("/train")).await;

        let request = post_json(
            "/predict",
            &json!({ "record": { "Credit_Score": 720, "Loan_Amount(s)": 8000 } }),
        );
        let (status, body) = send_json(&router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["ok"], json!(false));
        assert!(
            body["error"].as_str().unwrap().contains("Income"),
            "error was: {body}"
        );
    }

    #[tokio::test]
    async fn predict_without_body_is_rejected() {
        let dir = TempDir::new().unwrap();
        let router = seeded_router(&dir);
        send_json(&router, post("/train")).await;

        let (status, body) = send_json(&router, post("/predict")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["ok"], json!(false));
    }

    #[tokio::test]
    async fn train_with_missing_column_is_a_server_error() {
        let dir = TempDir::new().unwrap();
        let csv = "\
Credit_Score,Loan_Amount(s),Loan_Approved
700,10000,Yes
400,30000,No
";
        let router = seeded_router_with_csv(&dir, csv);

        let (status, body) = send_json(&router, post("/train")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["ok"], json!(false));
        assert!(
            body["error"].as_str().unwrap().contains("Income"),
            "error was: {body}"
        );
    }

    #[tokio::test]
    async fn train_with_too_few_rows_is_a_server_error() {
        let dir = TempDir::new().unwrap();
        let csv = "Credit_Score,Income,Loan_Amount(s),Loan_Approved\n700,50000,10000,Yes\n";
        let router = seeded_router_with_csv(&dir, csv);

        let (status, body) = send_json(&router, post("/train")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(
            body["error"].as_str().unwrap().contains("not enough valid rows"),
            "error was: {body}"
        );
    }

    #[tokio::test]
    async fn health_reflects_model_presence() {
        let dir = TempDir::new().unwrap();
        let router = seeded_router(&dir);

        let (status, body) = send_json(&router, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], json!("ok"));
        assert_eq!(body["model_present"], json!(false));
        assert_eq!(body["req_total"], json!(1));

        send_json(&router, post("/train")).await;

        let (_, body) = send_json(&router, get("/health")).await;
        assert_eq!(body["model_present"], json!(true));
        assert_eq!(body["req_total"], json!(3));
    }

    #[tokio::test]
    async fn retraining_replaces_the_model() {
        let dir = TempDir::new().unwrap();
        let router = seeded_router(&dir);
        send_json(&router, post("/train")).await;

        let probe = json!({
            "record": {
                "Credit_Score": 720,
                "Income": 55000,
                "Loan_Amount(s)": 8000,
            }
        });
        let (_, body) = send_json(&router, post_json("/predict", &probe)).await;
        assert_eq!(body["label"], json!(1));

        // Same rows, opposite outcomes. Retraining must swap the verdict.
        let flipped = "\
Credit_Score,Income,Loan_Amount(s),Loan_Approved
700,50000,10000,No
400,20000,30000,Yes
750,60000,5000,No
380,18000,28000,Yes
";
        std::fs::write(dir.path().join("loans.csv"), flipped).unwrap();
        let (status, _) = send_json(&router, post("/train")).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send_json(&router, post_json("/predict", &probe)).await;
        assert_eq!(body["label"], json!(0));
        assert_eq!(body["prediction"], json!("Rejected ❌"));
    }
}
