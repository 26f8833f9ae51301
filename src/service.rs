//! Client-side view of the conversion service's auxiliary endpoints.
//!
//! Besides `POST /convert`, the service answers `GET /health` and
//! `GET /usage` next to it, and explains failures with a small JSON body.
//! None of this is needed to convert a document; the CLI uses it for
//! `--health` / `--usage`, and [`crate::pipeline::submit`] uses
//! [`ServiceErrorBody`] to keep the service's explanation of a failure.

use crate::error::XlsxToPdfError;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// `GET /health` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub status: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub version: String,
    /// Present on rate-limited deployments, e.g. `"5 requests per IP per day"`.
    #[serde(default)]
    pub rate_limit: Option<String>,
}

impl ServiceHealth {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

/// `GET /usage` response: the caller's remaining daily quota.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceUsage {
    pub ip: String,
    pub used: u32,
    pub remaining: i64,
    pub limit: u32,
    pub reset_in: String,
}

/// JSON body the service sends with a non-2xx answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceErrorBody {
    pub error: Option<String>,
    pub message: Option<String>,
    pub details: Option<String>,
    pub reset_in: Option<String>,
}

impl ServiceErrorBody {
    /// `None` unless `body` is a JSON object of the expected shape.
    pub fn parse(body: &[u8]) -> Option<Self> {
        serde_json::from_slice(body).ok()
    }

    /// All non-empty fields joined into one line.
    pub fn summary(&self) -> Option<String> {
        let mut parts: Vec<String> = [&self.error, &self.message, &self.details]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if let Some(reset) = self.reset_in.as_deref().filter(|s| !s.trim().is_empty()) {
            parts.push(format!("resets in {reset}"));
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("; "))
        }
    }
}

/// Sibling endpoint of `api_url`: its last path segment replaced by `name`.
///
/// `http://host:5000/convert` + `health` → `http://host:5000/health`.
pub fn endpoint_for(api_url: &str, name: &str) -> Result<Url, XlsxToPdfError> {
    let mut url = Url::parse(api_url)
        .map_err(|e| XlsxToPdfError::InvalidConfig(format!("invalid API URL '{api_url}': {e}")))?;
    url.path_segments_mut()
        .map_err(|_| {
            XlsxToPdfError::InvalidConfig(format!("API URL '{api_url}' cannot have a path"))
        })?
        .pop()
        .push(name);
    url.set_query(None);
    Ok(url)
}

/// Query the service's `/health` endpoint.
pub async fn check_health(
    client: &reqwest::Client,
    api_url: &str,
) -> Result<ServiceHealth, XlsxToPdfError> {
    get_json(client, endpoint_for(api_url, "health")?).await
}

/// Query the caller's remaining quota from `/usage`.
pub async fn fetch_usage(
    client: &reqwest::Client,
    api_url: &str,
) -> Result<ServiceUsage, XlsxToPdfError> {
    get_json(client, endpoint_for(api_url, "usage")?).await
}

async fn get_json<T: serde::de::DeserializeOwned>(
    client: &reqwest::Client,
    url: Url,
) -> Result<T, XlsxToPdfError> {
    debug!("Probing {}", url);
    let probe_error = |reason: String| XlsxToPdfError::ServiceProbe {
        url: url.to_string(),
        reason,
    };

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| probe_error(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(probe_error(format!("HTTP {status}")));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| probe_error(format!("unexpected response body: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn endpoint_replaces_last_segment() {
        assert_eq!(
            endpoint_for("http://localhost:5000/convert", "health")
                .unwrap()
                .as_str(),
            "http://localhost:5000/health"
        );
        assert_eq!(
            endpoint_for("https://svc.example.com/api/v1/convert?x=1", "usage")
                .unwrap()
                .as_str(),
            "https://svc.example.com/api/v1/usage"
        );
        assert_eq!(
            endpoint_for("http://localhost:5000", "health")
                .unwrap()
                .as_str(),
            "http://localhost:5000/health"
        );
    }

    #[test]
    fn endpoint_rejects_garbage() {
        assert!(matches!(
            endpoint_for("not a url", "health"),
            Err(XlsxToPdfError::InvalidConfig(_))
        ));
        assert!(endpoint_for("mailto:ops@example.com", "health").is_err());
    }

    #[test]
    fn error_body_summary_joins_fields() {
        let body = ServiceErrorBody::parse(
            br#"{"error":"Rate limit exceeded","message":"You have used all 5 free requests for today.","reset_in":"3h 12m","tip":"Deploy your own server"}"#,
        )
        .unwrap();
        let summary = body.summary().unwrap();
        assert!(summary.starts_with("Rate limit exceeded"));
        assert!(summary.contains("5 free requests"));
        assert!(summary.ends_with("resets in 3h 12m"));
    }

    #[test]
    fn error_body_without_fields_has_no_summary() {
        assert_eq!(ServiceErrorBody::parse(b"{}").unwrap().summary(), None);
        assert!(ServiceErrorBody::parse(b"Internal Server Error").is_none());
    }

    #[tokio::test]
    async fn health_and_usage_probes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "ok",
                "service": "xlsx-to-pdf-converter",
                "version": "1.0.0",
                "rate_limit": "5 requests per IP per day"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/usage"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ip": "203.0.113.7",
                "used": 2,
                "remaining": 3,
                "limit": 5,
                "reset_in": "20h 5m"
            })))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let api_url = format!("{}/convert", server.uri());

        let health = check_health(&client, &api_url).await.unwrap();
        assert!(health.is_ok());
        assert_eq!(health.service, "xlsx-to-pdf-converter");
        assert_eq!(health.rate_limit.as_deref(), Some("5 requests per IP per day"));

        let usage = fetch_usage(&client, &api_url).await.unwrap();
        assert_eq!(usage.used, 2);
        assert_eq!(usage.remaining, 3);
        assert_eq!(usage.limit, 5);
    }

    #[tokio::test]
    async fn probe_failure_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let err = check_health(&client, &format!("{}/convert", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, XlsxToPdfError::ServiceProbe { .. }));
        assert!(err.to_string().contains("503"));
    }
}
