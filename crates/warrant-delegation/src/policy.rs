//! Policy engine seam and the OPA HTTP client behind it.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use crate::error::DelegationError;

/// Allow/deny decision source.
///
/// `Ok(false)` is a decision. `Err` means no decision could be obtained.
#[async_trait]
pub trait PolicyEngine: Send + Sync {
    async fn check_policy(&self, rule_path: &str, input: &Value) -> Result<bool, DelegationError>;
}

#[derive(Debug, Deserialize)]
struct OpaResponse {
    #[serde(default)]
    result: Option<OpaResult>,
}

#[derive(Debug, Deserialize)]
struct OpaResult {
    #[serde(default)]
    allow: Option<bool>,
}

/// Open Policy Agent data API client: `POST {base}/data/{rule_path}`.
pub struct OpaPolicyClient {
    http: reqwest::Client,
    base_url: Url,
}

impl OpaPolicyClient {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    fn endpoint(&self, rule_path: &str) -> String {
        format!(
            "{}/data/{}",
            self.base_url.as_str().trim_end_matches('/'),
            rule_path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl PolicyEngine for OpaPolicyClient {
    async fn check_policy(&self, rule_path: &str, input: &Value) -> Result<bool, DelegationError> {
        let url = self.endpoint(rule_path);

        let resp = self
            .http
            .post(&url)
            .json(&json!({ "input": input }))
            .send()
            .await
            .map_err(|e| DelegationError::UpstreamUnavailable(format!("POST {}: {}", url, e)))?;

        if !resp.status().is_success() {
            return Err(DelegationError::UpstreamUnavailable(format!(
                "POST {} returned {}",
                url,
                resp.status().as_u16()
            )));
        }

        let body: OpaResponse = resp.json().await.map_err(|e| {
            DelegationError::UpstreamUnavailable(format!("POST {}: undecodable body: {}", url, e))
        })?;

        let allow = body.result.and_then(|r| r.allow).unwrap_or(false);
        tracing::debug!(rule_path = %rule_path, allow, "policy decision");
        Ok(allow)
    }
}
