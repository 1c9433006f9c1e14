//! Upstream REST data fetcher
//!
//! Single outbound HTTP surface for the whole engine. A failed or oddly
//! shaped response degrades to an empty collection with a warning so that the
//! dependent report still produces a structurally valid (if empty) result.
//! No retries, no caching: the upstream's capacity is the only throttle.

use crate::config::ReportConfig;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Async source of raw upstream collections.
///
/// The aggregation engine only talks to this trait, which keeps every report
/// builder testable against a stub source.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch a list-shaped resource. Failures and unrecognized payload shapes
    /// yield an empty list.
    async fn fetch_list(&self, path: &str, params: &[(&str, String)]) -> Vec<Value>;

    /// Fetch an object-shaped resource. Failures yield `None`.
    async fn fetch_value(&self, path: &str, params: &[(&str, String)]) -> Option<Value>;
}

pub struct DataFetcher {
    client: reqwest::Client,
    config: ReportConfig,
}

impl DataFetcher {
    pub fn new(config: ReportConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    async fn get_json(&self, path: &str, params: &[(&str, String)]) -> Option<Value> {
        let url = format!("{}{}", self.config.base_url, path);

        let mut request = self
            .client
            .get(&url)
            .header("X-Service-Token", &self.config.service_token)
            .header("X-Internal-Service", &self.config.service_name);
        if !params.is_empty() {
            request = request.query(params);
        }

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Fetch failed for {}: {}", path, e);
                return None;
            }
        };

        if !response.status().is_success() {
            log::warn!("Fetch for {} returned HTTP {}", path, response.status());
            return None;
        }

        match response.json::<Value>().await {
            Ok(v) => Some(v),
            Err(e) => {
                log::warn!("Fetch for {} returned non-JSON body: {}", path, e);
                None
            }
        }
    }
}

#[async_trait]
impl RecordSource for DataFetcher {
    async fn fetch_list(&self, path: &str, params: &[(&str, String)]) -> Vec<Value> {
        match self.get_json(path, params).await {
            Some(payload) => unwrap_list(path, payload),
            None => Vec::new(),
        }
    }

    async fn fetch_value(&self, path: &str, params: &[(&str, String)]) -> Option<Value> {
        self.get_json(path, params).await
    }
}

/// Unwrap a list payload that may arrive bare or inside a paging envelope.
///
/// Envelope keys probed in order: `data`, then the resource key derived from
/// the last path segment (`/payment-methods` -> `payment_methods`). Anything
/// else is treated as an unrecognized shape.
pub fn unwrap_list(path: &str, payload: Value) -> Vec<Value> {
    match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            if let Some(Value::Array(items)) = map.remove("data") {
                return items;
            }
            let resource_key = path
                .rsplit('/')
                .next()
                .unwrap_or_default()
                .replace('-', "_");
            if let Some(Value::Array(items)) = map.remove(resource_key.as_str()) {
                return items;
            }
            log::warn!("Unrecognized envelope for {}: keys {:?}", path, map.keys().collect::<Vec<_>>());
            Vec::new()
        }
        other => {
            log::warn!("Unrecognized payload shape for {}: {}", path, other);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_array_passes_through() {
        let items = unwrap_list("/orders", json!([{"id_order": 1}, {"id_order": 2}]));
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_data_envelope_unwraps() {
        let items = unwrap_list("/orders", json!({"data": [{"id_order": 1}]}));
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_resource_key_envelope_unwraps() {
        let items = unwrap_list("/products", json!({"products": [{"id_product": 9}]}));
        assert_eq!(items.len(), 1);

        let items = unwrap_list(
            "/payment-methods",
            json!({"payment_methods": [{"id_payment_method": 1}]}),
        );
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_unrecognized_shapes_are_empty() {
        assert!(unwrap_list("/orders", json!({"weird": true})).is_empty());
        assert!(unwrap_list("/orders", json!(42)).is_empty());
        assert!(unwrap_list("/orders", json!("nope")).is_empty());
    }
}
