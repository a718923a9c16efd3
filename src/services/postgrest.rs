// SPDX-License-Identifier: MIT

//! Low-level PostgREST client.
//!
//! Handles:
//! - Schema selection via `Accept-Profile` / `Content-Profile` headers
//! - Bearer token attachment from the credential store
//! - `Prefer: return=representation` inserts and updates
//! - Status classification into [`AppError`]

use crate::credentials::CredentialStore;
use crate::error::{AppError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Thin client for one PostgREST schema.
#[derive(Clone)]
pub struct PostgrestClient {
    http: reqwest::Client,
    base_url: String,
    /// Schema namespace sent as Accept-Profile/Content-Profile
    profile: &'static str,
    credentials: CredentialStore,
}

impl PostgrestClient {
    /// Create a client for `profile` ("auth" or "alc") with a bounded
    /// per-request timeout.
    pub fn new(
        base_url: &str,
        profile: &'static str,
        timeout_secs: u64,
        credentials: CredentialStore,
    ) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            profile,
            credentials,
        }
    }

    /// GET a collection or filtered resource, parsing the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path_and_query: &str) -> Result<T> {
        let response = self
            .request(reqwest::Method::GET, path_and_query)
            .send()
            .await
            .map_err(AppError::from_transport)?;
        Self::check_response_json(response).await
    }

    /// POST an insert with `Prefer: return=representation`; PostgREST
    /// answers with an array containing the created row(s).
    pub async fn post_returning<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Vec<T>> {
        let response = self
            .request(reqwest::Method::POST, path)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await
            .map_err(AppError::from_transport)?;
        Self::check_response_json(response).await
    }

    /// POST without asking for the row back (RPC calls parse their own
    /// body; membership inserts need none).
    pub async fn post_no_content<B: Serialize>(&self, path: &str, body: &B) -> Result<()> {
        let response = self
            .request(reqwest::Method::POST, path)
            .json(body)
            .send()
            .await
            .map_err(AppError::from_transport)?;
        Self::check_response(response).await
    }

    /// POST an RPC call, parsing its JSON response body.
    pub async fn rpc<T: DeserializeOwned, B: Serialize>(&self, name: &str, body: &B) -> Result<T> {
        let response = self
            .request(reqwest::Method::POST, &format!("/rpc/{}", name))
            .json(body)
            .send()
            .await
            .map_err(AppError::from_transport)?;
        Self::check_response_json(response).await
    }

    /// Filtered PATCH with `Prefer: return=representation`.
    pub async fn patch_returning<T: DeserializeOwned, B: Serialize>(
        &self,
        path_and_query: &str,
        body: &B,
    ) -> Result<Vec<T>> {
        let response = self
            .request(reqwest::Method::PATCH, path_and_query)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await
            .map_err(AppError::from_transport)?;
        Self::check_response_json(response).await
    }

    /// Filtered DELETE.
    pub async fn delete(&self, path_and_query: &str) -> Result<()> {
        let response = self
            .request(reqwest::Method::DELETE, path_and_query)
            .send()
            .await
            .map_err(AppError::from_transport)?;
        Self::check_response(response).await
    }

    fn request(&self, method: reqwest::Method, path_and_query: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path_and_query);
        let mut builder = self
            .http
            .request(method, &url)
            .header("Accept-Profile", self.profile)
            .header("Content-Profile", self.profile);
        if let Some(token) = self.credentials.token() {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Check response status, discarding the body.
    async fn check_response(response: reqwest::Response) -> Result<()> {
        if response.status().is_success() {
            return Ok(());
        }
        Err(Self::status_error(response).await)
    }

    /// Check response status and parse the JSON body.
    async fn check_response_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }
        response
            .json()
            .await
            .map_err(|e| AppError::Backend(format!("JSON parse error: {}", e)))
    }

    async fn status_error(response: reqwest::Response) -> AppError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        AppError::from_status(status, body)
    }
}
