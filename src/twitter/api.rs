//! Core Twitter API utilities.
//!
//! This module contains the low-level client used by every command: it signs
//! each request with OAuth 1.0a, sends it, and retries a bounded number of
//! times when the API answers 502 Bad Gateway.

use log::{debug, error, info, warn};
use reqwest::{Client, Method, StatusCode};

use crate::error::{CliError, Result};
use crate::oauth::{OAuthSigner, TokenPair};

/// Total attempts for a request that keeps failing with 502.
pub const MAX_ATTEMPTS: u32 = 3;

/// Request parameters, sent as a query string (GET/DELETE) or form body (POST).
pub type Params = Vec<(String, String)>;

/// Builds a parameter list from string pairs.
pub fn params(pairs: &[(&str, &str)]) -> Params {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Outcome of a single HTTP attempt.
#[derive(Debug)]
enum Attempt {
    Success(String),
    Retryable,
    Fatal { status: u16, body: String },
}

/// Sanitizes text for safe logging by truncating and escaping control characters.
pub(crate) fn sanitize_for_logging(text: &str, max_len: usize) -> String {
    let sanitized: String = text
        .chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => ' ',
            c if c.is_control() => '?',
            c => c,
        })
        .collect();

    if sanitized.chars().count() > max_len {
        let head: String = sanitized.chars().take(max_len).collect();
        format!("{}... [truncated, {} total bytes]", head, text.len())
    } else {
        sanitized
    }
}

/// Authenticated client for the v1 REST API.
#[derive(Debug, Clone)]
pub struct TwitterClient {
    http: Client,
    api_url: String,
    signer: OAuthSigner,
}

impl TwitterClient {
    /// Creates a client rooted at `api_url` (e.g. `https://api.twitter.com`).
    pub fn new(api_url: &str, signer: OAuthSigner) -> Self {
        TwitterClient {
            http: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            signer,
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Shared HTTP connection pool, also used for unsigned lookups.
    pub fn http(&self) -> &Client {
        &self.http
    }

    /// Full URL of a v1 resource, e.g. `/statuses/update` → `.../1/statuses/update.json`.
    pub fn resource_url(&self, resource: &str) -> String {
        format!("{}/1{}.json", self.api_url, resource)
    }

    pub async fn get(&self, resource: &str, params: &Params) -> Result<String> {
        self.call(Method::GET, resource, params).await
    }

    pub async fn post(&self, resource: &str, params: &Params) -> Result<String> {
        self.call(Method::POST, resource, params).await
    }

    pub async fn delete(&self, resource: &str, params: &Params) -> Result<String> {
        self.call(Method::DELETE, resource, params).await
    }

    /// Calls a v1 resource with the profile's credentials.
    pub async fn call(&self, method: Method, resource: &str, params: &Params) -> Result<String> {
        let url = self.resource_url(resource);
        self.send_signed(&self.signer, method, &url, params, &[])
            .await
    }

    /// Sends a signed request, retrying on 502 up to [`MAX_ATTEMPTS`] times.
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: the body of the first 2xx response
    /// - `Err(CliError::ServiceUnavailable)`: every attempt answered 502
    /// - `Err(CliError::Api { .. })`: any other non-2xx status, without retry
    /// - `Err(CliError::Http(..))`: transport failure
    pub async fn send_signed(
        &self,
        signer: &OAuthSigner,
        method: Method,
        url: &str,
        params: &Params,
        oauth_extra: &[(&str, &str)],
    ) -> Result<String> {
        let operation = format!("{} {}", method, url);

        for attempt in 1..=MAX_ATTEMPTS {
            debug!("Attempt {}/{} for {}", attempt, MAX_ATTEMPTS, operation);
            match self
                .attempt(signer, &method, url, params, oauth_extra)
                .await?
            {
                Attempt::Success(body) => {
                    info!("Operation '{}' completed successfully", operation);
                    debug!(
                        "Response summary for '{}': {} bytes received",
                        operation,
                        body.len()
                    );
                    return Ok(body);
                }
                Attempt::Retryable => {
                    warn!(
                        "Received 502 for '{}' (attempt {}/{})",
                        operation, attempt, MAX_ATTEMPTS
                    );
                }
                Attempt::Fatal { status, body } => {
                    error!("Operation '{}' failed - Status: {}", operation, status);
                    debug!(
                        "Error response for '{}': {}",
                        operation,
                        sanitize_for_logging(&body, 200)
                    );
                    return Err(CliError::Api { status, body });
                }
            }
        }

        error!(
            "Operation '{}' gave up after {} attempts",
            operation, MAX_ATTEMPTS
        );
        Err(CliError::ServiceUnavailable)
    }

    async fn attempt(
        &self,
        signer: &OAuthSigner,
        method: &Method,
        url: &str,
        params: &Params,
        oauth_extra: &[(&str, &str)],
    ) -> Result<Attempt> {
        let authorization = signer.authorization(method.as_str(), url, params, oauth_extra)?;

        let mut request = self
            .http
            .request(method.clone(), url)
            .header("Authorization", authorization);
        if !params.is_empty() {
            request = if *method == Method::POST {
                request.form(params)
            } else {
                request.query(params)
            };
        }

        let response = request.send().await?;
        let status = response.status();
        debug!("Received response with status: {} for {} {}", status, method, url);

        if status.is_success() {
            return Ok(Attempt::Success(response.text().await?));
        }
        if status == StatusCode::BAD_GATEWAY {
            return Ok(Attempt::Retryable);
        }
        let body = response.text().await?;
        Ok(Attempt::Fatal {
            status: status.as_u16(),
            body,
        })
    }

    /// First step of the PIN flow: obtain a temporary request token.
    pub async fn request_token(&self, consumer: &OAuthSigner) -> Result<TokenPair> {
        info!("Requesting OAuth request token");
        let url = format!("{}/oauth/request_token", self.api_url);
        let body = self
            .send_signed(
                consumer,
                Method::POST,
                &url,
                &Params::new(),
                &[("oauth_callback", "oob")],
            )
            .await?;
        TokenPair::parse(&body)
    }

    /// Last step of the PIN flow: trade the request token and PIN for an access token.
    pub async fn access_token(
        &self,
        consumer: &OAuthSigner,
        request_token: &TokenPair,
        pin: &str,
    ) -> Result<TokenPair> {
        info!("Exchanging PIN for OAuth access token");
        let signer = consumer
            .clone()
            .with_token(&request_token.oauth_token, &request_token.oauth_token_secret);
        let url = format!("{}/oauth/access_token", self.api_url);
        let body = self
            .send_signed(
                &signer,
                Method::POST,
                &url,
                &Params::new(),
                &[("oauth_verifier", pin)],
            )
            .await?;
        TokenPair::parse(&body)
    }
}
