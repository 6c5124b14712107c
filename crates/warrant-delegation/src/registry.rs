use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use warrant_identity::VerifiableCredential;

use crate::error::DelegationError;

/// External credential registry, addressed by credential id.
#[async_trait]
pub trait CredentialRegistry: Send + Sync {
    /// `Ok(None)` when the registry reports the id as unknown.
    async fn fetch(&self, credential_id: &str)
        -> Result<Option<VerifiableCredential>, DelegationError>;
}

/// Cloud agent registry client: `GET {base}/vc/credentials/{id}`.
pub struct HttpCredentialRegistry {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpCredentialRegistry {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }
}

#[async_trait]
impl CredentialRegistry for HttpCredentialRegistry {
    async fn fetch(
        &self,
        credential_id: &str,
    ) -> Result<Option<VerifiableCredential>, DelegationError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                DelegationError::UpstreamUnavailable(format!(
                    "registry base url {} cannot take a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(["vc", "credentials", credential_id]);

        let resp = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| DelegationError::UpstreamUnavailable(format!("GET {}: {}", url, e)))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !resp.status().is_success() {
            return Err(DelegationError::UpstreamUnavailable(format!(
                "GET {} returned {}",
                url,
                resp.status().as_u16()
            )));
        }

        resp.json().await.map(Some).map_err(|e| {
            DelegationError::UpstreamUnavailable(format!("GET {}: undecodable body: {}", url, e))
        })
    }
}
