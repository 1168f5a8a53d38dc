//! Blocking client for a running forecast service.
//!
//! Used by `forecast probe` to smoke-test a deployment: list the categories,
//! fetch model info, then run a fixed table of forecasts.

use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::{DrugCategory, ForecastResult, ModelInfo};
use crate::error::AppError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5003";

/// One forecast call in the probe table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeCase {
    pub drug_type: &'static str,
    pub date: &'static str,
    pub days: u32,
    pub stock_level: f64,
}

/// Category, season, stock level and horizon each varied against a baseline.
pub const PROBE_CASES: [ProbeCase; 10] = [
    ProbeCase { drug_type: "M01AB", date: "2025-06-01", days: 30, stock_level: 100.0 },
    ProbeCase { drug_type: "N02BA", date: "2025-06-01", days: 30, stock_level: 100.0 },
    ProbeCase { drug_type: "R03", date: "2025-06-01", days: 30, stock_level: 100.0 },
    ProbeCase { drug_type: "M01AB", date: "2025-01-01", days: 31, stock_level: 100.0 },
    ProbeCase { drug_type: "M01AB", date: "2025-07-01", days: 31, stock_level: 100.0 },
    ProbeCase { drug_type: "M01AB", date: "2025-12-01", days: 31, stock_level: 100.0 },
    ProbeCase { drug_type: "M01AB", date: "2025-06-01", days: 30, stock_level: 50.0 },
    ProbeCase { drug_type: "M01AB", date: "2025-06-01", days: 30, stock_level: 200.0 },
    ProbeCase { drug_type: "M01AB", date: "2025-06-01", days: 15, stock_level: 100.0 },
    ProbeCase { drug_type: "M01AB", date: "2025-06-01", days: 7, stock_level: 100.0 },
];

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

pub struct ForecastClient {
    client: Client,
    base_url: String,
}

impl ForecastClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub fn drug_types(&self) -> Result<Vec<DrugCategory>, AppError> {
        let resp = self.client.get(self.url("/drugs/types")).send().map_err(request_err)?;
        decode(resp)
    }

    pub fn model_info(&self) -> Result<ModelInfo, AppError> {
        let resp = self.client.get(self.url("/model/info")).send().map_err(request_err)?;
        decode(resp)
    }

    pub fn forecast(&self, case: &ProbeCase) -> Result<ForecastResult, AppError> {
        let resp = self
            .client
            .post(self.url("/predict/forecast"))
            .json(case)
            .send()
            .map_err(request_err)?;
        decode(resp)
    }
}

fn request_err(e: reqwest::Error) -> AppError {
    AppError::config(format!("Request failed: {e}"))
}

/// Decode a success body, or surface the service's `{error}` message.
fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, AppError> {
    let status = resp.status();
    if status.is_success() {
        return resp
            .json()
            .map_err(|e| AppError::model(format!("Unexpected response body: {e}")));
    }
    let message = resp
        .json::<ErrorBody>()
        .map(|b| b.error)
        .unwrap_or_else(|_| "no error message".to_string());
    if status.is_client_error() {
        Err(AppError::validation(format!("HTTP {status}: {message}")))
    } else {
        Err(AppError::model(format!("HTTP {status}: {message}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CategoryCatalog;
    use crate::forecast::ForecastRequest;

    #[test]
    fn probe_cases_are_valid_requests() {
        let catalog = CategoryCatalog::pharma_sales();
        for case in &PROBE_CASES {
            let body = serde_json::to_value(case).unwrap();
            let req = ForecastRequest::from_json(&body).unwrap();
            assert!(catalog.index_of(&req.drug_type).is_some());
        }
    }

    #[test]
    fn base_url_is_normalized() {
        let client = ForecastClient::new("http://localhost:5003/");
        assert_eq!(client.url("/health"), "http://localhost:5003/health");
    }
}
