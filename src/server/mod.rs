//! HTTP surface over `ForecastService`.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServiceConfig;
use crate::error::AppError;
use crate::forecast::ForecastService;

pub mod routes;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ForecastService>,
}

pub fn router(service: Arc<ForecastService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/drugs/types", get(routes::drug_types))
        .route("/model/info", get(routes::model_info))
        .route("/predict/forecast", post(routes::forecast))
        .route("/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(AppState { service })
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: &ServiceConfig, service: Arc<ForecastService>) -> Result<(), AppError> {
    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::config(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("{} v{} listening on {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), addr);

    axum::serve(listener, router(service))
        .await
        .map_err(|e| AppError::config(format!("Server error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::domain::CategoryCatalog;
    use crate::forecast::service::tests::{StubModel, service_with};

    fn app() -> Router {
        router(Arc::new(service_with(StubModel::constant(8))))
    }

    async fn call(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_forecast(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/predict/forecast")
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.into())
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn health_is_unconditional() {
        let (status, body) = call(app(), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "healthy"}));
    }

    #[tokio::test]
    async fn forecast_example_scenario() {
        let req = post_forecast(
            json!({"drug_type": "M01AB", "date": "2025-06-01", "days": 30, "stock_level": 100}).to_string(),
        );
        let (status, body) = call(app(), req).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["prediction"], json!(0.5));
        assert_eq!(body["date"], json!("2025-06-01"));
        assert_eq!(body["end_date"], json!("2025-07-01"));
        assert_eq!(body["predicted_quantity"], json!(50));
        assert!((body["average_daily"].as_f64().unwrap() - 1.6666666666666667).abs() < 1e-12);
        assert_eq!(body["drug_type"], json!("M01AB"));
        assert_eq!(body["days"], json!(30));
    }

    #[tokio::test]
    async fn client_errors_are_400_with_message() {
        let cases = [
            (
                json!({"drug_type": "XX99", "date": "2025-06-01", "days": 30, "stock_level": 100}),
                "Invalid drug type: XX99",
            ),
            (
                json!({"drug_type": "M01AB", "date": "06-01-2025", "days": 30, "stock_level": 100}),
                "Invalid date format. Use YYYY-MM-DD",
            ),
            (
                json!({"drug_type": "M01AB", "date": "2025-06-01", "days": 0, "stock_level": 100}),
                "Invalid days: must be a positive integer",
            ),
            (
                json!({"drug_type": "M01AB", "date": "2025-06-01", "stock_level": 100}),
                "Missing required field: days",
            ),
            (
                json!({"drug_type": "M01AB", "date": "2025-06-01", "days": 30, "stock_level": -5}),
                "Invalid stock_level: must be a non-negative number",
            ),
        ];
        for (payload, message) in cases {
            let (status, body) = call(app(), post_forecast(payload.to_string())).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
            assert_eq!(body, json!({"error": message}));
        }

        let (status, body) = call(app(), post_forecast("not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], json!("Request body must be a JSON object"));
    }

    #[tokio::test]
    async fn model_failure_is_500() {
        let service = service_with(StubModel {
            outputs: 8,
            f: |_| 0.0,
            fail: true,
        });
        let req = post_forecast(
            json!({"drug_type": "R03", "date": "2025-06-01", "days": 30, "stock_level": 100}).to_string(),
        );
        let (status, body) = call(router(Arc::new(service)), req).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], json!("Error making prediction: stub exploded"));
    }

    #[tokio::test]
    async fn listed_codes_are_accepted_by_forecast() {
        let (status, body) = call(app(), get("/drugs/types")).await;
        assert_eq!(status, StatusCode::OK);

        let items = body.as_array().unwrap();
        assert_eq!(items.len(), CategoryCatalog::pharma_sales().len());
        assert_eq!(items[3], json!({"code": "N02BE/B", "name": "Other analgesics and antipyretics (Pyrazolones and Anilides)"}));

        for item in items {
            let code = item["code"].as_str().unwrap();
            let req = post_forecast(
                json!({"drug_type": code, "date": "2025-01-10", "days": 7, "stock_level": 10}).to_string(),
            );
            let (status, body) = call(app(), req).await;
            assert_eq!(status, StatusCode::OK, "{code}");
            assert_eq!(body["drug_type"], json!(code.replace('/', "")));
        }
    }

    #[tokio::test]
    async fn model_info_lists_top_ten() {
        let (status, body) = call(app(), get("/model/info")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["model_type"], json!("Stub"));
        let items = body["feature_importance"].as_array().unwrap();
        assert_eq!(items.len(), 10);
        assert_eq!(items[0]["name"], json!("prediction_days (R06)"));
    }

    #[tokio::test]
    async fn model_info_failure_is_500() {
        let service = service_with(StubModel {
            outputs: 8,
            f: |_| 0.0,
            fail: true,
        });
        let (status, body) = call(router(Arc::new(service)), get("/model/info")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "stub exploded"}));
    }

    #[tokio::test]
    async fn cors_headers_are_present() {
        let req = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "http://localhost:3000")
            .body(Body::empty())
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(
            resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }
}
