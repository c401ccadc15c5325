//! Custody-service HTTP client.
//!
//! [`CustodyApi`] is the seam the orchestrator and transfer builder talk
//! through; [`HttpCustodyClient`] is the production implementation. Tests
//! stub the trait instead of spinning up a server.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::{PrepareRequest, PrepareResponse, SubmitRequest, SubmitResponse};
use crate::error::{SignerError, Stage};

/// The two transaction endpoints plus the read-only existence lookup this
/// pipeline consumes. Everything else the service offers is out of scope.
pub trait CustodyApi {
    fn prepare(
        &self,
        account: &str,
        request: &PrepareRequest,
    ) -> impl std::future::Future<Output = Result<PrepareResponse, SignerError>>;

    fn submit(
        &self,
        account: &str,
        request: &SubmitRequest,
    ) -> impl std::future::Future<Output = Result<SubmitResponse, SignerError>>;

    fn account_exists(
        &self,
        address: &str,
    ) -> impl std::future::Future<Output = Result<bool, SignerError>>;
}

/// Connection settings, passed explicitly; the library reads no environment
/// variables of its own.
#[derive(Debug, Clone)]
pub struct CustodyConfig {
    pub base_url: String,
    pub api_key: String,
    pub environment: String,
}

pub struct HttpCustodyClient {
    config: CustodyConfig,
    http: reqwest::Client,
}

impl HttpCustodyClient {
    pub fn new(config: CustodyConfig) -> Self {
        Self { config, http: reqwest::Client::new() }
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(&self.config.api_key)
            .header("x-custody-environment", &self.config.environment)
            .header("x-idempotency-key", uuid::Uuid::new_v4().to_string())
    }

    async fn post_json<B: Serialize, R: DeserializeOwned>(
        &self,
        stage: Stage,
        url: String,
        body: &B,
    ) -> Result<R, SignerError> {
        tracing::debug!(%stage, %url, "custody request");
        let response = self
            .request(reqwest::Method::POST, url)
            .json(body)
            .send()
            .await
            .map_err(|e| SignerError::Transport { stage, detail: e.to_string() })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SignerError::Transport { stage, detail: e.to_string() })?;

        if !status.is_success() {
            tracing::warn!(%stage, status = status.as_u16(), "custody request rejected");
            return Err(SignerError::Remote {
                stage,
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| SignerError::Decode(format!("{stage} response: {e}")))
    }
}

impl CustodyApi for HttpCustodyClient {
    async fn prepare(
        &self,
        account: &str,
        request: &PrepareRequest,
    ) -> Result<PrepareResponse, SignerError> {
        let url = format!("{}/accounts/{account}/transactions", self.config.base_url);
        self.post_json(Stage::Prepare, url, request).await
    }

    async fn submit(
        &self,
        account: &str,
        request: &SubmitRequest,
    ) -> Result<SubmitResponse, SignerError> {
        let url = format!("{}/accounts/{account}/submit", self.config.base_url);
        self.post_json(Stage::Submit, url, request).await
    }

    async fn account_exists(&self, address: &str) -> Result<bool, SignerError> {
        let url = format!("{}/accounts/{address}", self.config.base_url);
        tracing::debug!(%url, "account existence lookup");
        let response = self
            .request(reqwest::Method::GET, url)
            .send()
            .await
            .map_err(|e| SignerError::Transport { stage: Stage::Lookup, detail: e.to_string() })?;

        let status = response.status();
        if status.is_success() {
            Ok(true)
        } else if status == reqwest::StatusCode::NOT_FOUND {
            Ok(false)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(SignerError::Remote {
                stage: Stage::Lookup,
                status: status.as_u16(),
                body,
            })
        }
    }
}
