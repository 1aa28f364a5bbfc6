use crate::error::{PipelineError, Result};
use crate::logw;
use crate::retry::RetryPolicy;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

const USER_AGENT: &str = concat!("book-reels/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP plumbing for providers: one client, one timeout, one retry
/// policy applied to every call.
#[derive(Clone)]
pub struct ProviderHttp {
    client: Client,
    timeout: Duration,
    retry: RetryPolicy,
}

enum Attempt {
    Done(String),
    Retryable(String),
    Fatal(String),
}

impl ProviderHttp {
    pub fn new(client: Client, timeout: Duration, retry: RetryPolicy) -> Self {
        Self {
            client,
            timeout,
            retry,
        }
    }

    pub fn build_client() -> Result<Client> {
        Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| PipelineError::Config(format!("failed to build HTTP client: {e}")))
    }

    pub async fn get_json(&self, provider: &str, url: &str) -> Result<Value> {
        self.get_json_with_params(provider, url, &[]).await
    }

    /// Like [`Self::get_json`], with extra query parameters that never appear
    /// in error messages or log lines. Credentials go here.
    pub async fn get_json_with_params(
        &self,
        provider: &str,
        url: &str,
        secret_params: &[(&str, &str)],
    ) -> Result<Value> {
        let body = self.get_text_with_params(provider, url, secret_params).await?;
        serde_json::from_str(&body)
            .map_err(|e| PipelineError::provider(provider, format!("invalid JSON from {url}: {e}")))
    }

    pub async fn get_text(&self, provider: &str, url: &str) -> Result<String> {
        self.get_text_with_params(provider, url, &[]).await
    }

    pub async fn get_text_with_params(
        &self,
        provider: &str,
        url: &str,
        secret_params: &[(&str, &str)],
    ) -> Result<String> {
        let attempts = self.retry.attempts();
        let mut attempt = 1;
        loop {
            match self.attempt(url, secret_params).await {
                Attempt::Done(body) => return Ok(body),
                Attempt::Retryable(why) if attempt < attempts => {
                    let backoff = self.retry.delay_after(attempt);
                    logw(format!(
                        "{} attempt {}/{} failed ({}); retrying in {:?}",
                        provider, attempt, attempts, why, backoff
                    ));
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Attempt::Retryable(why) | Attempt::Fatal(why) => {
                    return Err(PipelineError::provider(provider, why));
                }
            }
        }
    }

    // Messages only ever name `url`; reqwest errors are stripped of the full
    // request URL since it carries `secret_params`.
    async fn attempt(&self, url: &str, secret_params: &[(&str, &str)]) -> Attempt {
        let mut request = self.client.get(url).timeout(self.timeout);
        if !secret_params.is_empty() {
            request = request.query(secret_params);
        }
        let resp = match request.send().await {
            Ok(resp) => resp,
            Err(err) if err.is_timeout() => {
                return Attempt::Retryable(format!("timed out after {:?}", self.timeout));
            }
            Err(err) => {
                return Attempt::Retryable(format!(
                    "request to {url} failed: {}",
                    err.without_url()
                ));
            }
        };

        let status = resp.status();
        if !status.is_success() {
            let why = format!("HTTP {} for {}", status.as_u16(), url);
            return if is_retryable_status(status) {
                Attempt::Retryable(why)
            } else {
                Attempt::Fatal(why)
            };
        }

        match resp.text().await {
            Ok(body) => Attempt::Done(body),
            Err(err) if err.is_timeout() => {
                Attempt::Retryable(format!("body timed out after {:?}", self.timeout))
            }
            Err(err) => Attempt::Retryable(format!(
                "body read from {url} failed: {}",
                err.without_url()
            )),
        }
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
}

/// Percent-encodes one query-string component.
pub fn url_encode_component(input: &str) -> String {
    let mut out = String::new();
    for b in input.as_bytes() {
        let c = *b as char;
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' || c == '~' {
            out.push(c);
        } else if c == ' ' {
            out.push_str("%20");
        } else {
            out.push('%');
            out.push_str(&format!("{:02X}", b));
        }
    }
    out
}

/// Substitutes `{name}` placeholders in a URL template.
pub fn expand_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (name, value) in vars {
        out = out.replace(&format!("{{{name}}}"), value);
    }
    out
}
