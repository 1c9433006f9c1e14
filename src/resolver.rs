//! Seller identity resolution
//!
//! Callers address seller-scoped reports either by the internal numeric
//! seller id or by the external user reference issued by the auth service.
//! Unlike collection fetches, a failed resolution aborts the dependent
//! report: aggregating under a wrong seller id would silently corrupt the
//! numbers instead of merely emptying them.

use crate::config::ReportConfig;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug)]
pub enum ResolveError {
    /// The external reference is unknown upstream.
    NotFound(String),
    /// Transport failure or unusable response shape.
    Upstream(String),
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveError::NotFound(id) => write!(f, "No seller found for identifier '{}'", id),
            ResolveError::Upstream(msg) => write!(f, "Seller lookup failed: {}", msg),
        }
    }
}

impl std::error::Error for ResolveError {}

pub struct SellerResolver {
    client: reqwest::Client,
    config: ReportConfig,
}

impl SellerResolver {
    pub fn new(config: ReportConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// Map a caller-supplied identifier to the internal numeric seller id.
    ///
    /// A numeric identifier is returned as-is with no network call. Anything
    /// else is treated as an external user reference and resolved through
    /// `/sellers/by-user/{identifier}`.
    pub async fn resolve(&self, identifier: &str) -> Result<i64, ResolveError> {
        if let Ok(id) = identifier.trim().parse::<i64>() {
            return Ok(id);
        }

        let url = format!("{}/sellers/by-user/{}", self.config.base_url, identifier);
        let response = self
            .client
            .get(&url)
            .header("X-Service-Token", &self.config.service_token)
            .header("X-Internal-Service", &self.config.service_name)
            .send()
            .await
            .map_err(|e| ResolveError::Upstream(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ResolveError::NotFound(identifier.to_string()));
        }
        if !response.status().is_success() {
            return Err(ResolveError::Upstream(format!(
                "lookup returned HTTP {}",
                response.status()
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| ResolveError::Upstream(e.to_string()))?;

        extract_seller_id(&payload).ok_or_else(|| {
            ResolveError::Upstream(format!(
                "lookup response for '{}' carried no seller id",
                identifier
            ))
        })
    }
}

/// Pull the seller id out of a lookup response, with or without a `data`
/// wrapper.
fn extract_seller_id(payload: &Value) -> Option<i64> {
    let body = payload.get("data").unwrap_or(payload);
    body.get("id_seller")
        .or_else(|| body.get("id"))
        .and_then(|v| match v {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.parse::<i64>().ok(),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn offline_config() -> crate::config::ReportConfig {
        crate::config::ReportConfig {
            // port 9 (discard) - any accidental network call fails fast
            base_url: "http://127.0.0.1:9".to_string(),
            service_token: "test-token".to_string(),
            service_name: "report-service".to_string(),
            timeout_secs: 1,
        }
    }

    #[tokio::test]
    async fn test_numeric_identifier_short_circuits() {
        let resolver = SellerResolver::new(offline_config()).unwrap();
        assert_eq!(resolver.resolve("42").await.unwrap(), 42);
        assert_eq!(resolver.resolve(" 7 ").await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_unreachable_lookup_is_upstream_error() {
        let resolver = SellerResolver::new(offline_config()).unwrap();
        match resolver.resolve("uuid-abc").await {
            Err(ResolveError::Upstream(_)) => {}
            other => panic!("expected Upstream error, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_seller_id_shapes() {
        assert_eq!(extract_seller_id(&json!({"id_seller": 42})), Some(42));
        assert_eq!(extract_seller_id(&json!({"data": {"id_seller": 42}})), Some(42));
        assert_eq!(extract_seller_id(&json!({"data": {"id": "42"}})), Some(42));
        assert_eq!(extract_seller_id(&json!({"success": true})), None);
    }
}
