//! HTTP fetcher
//!
//! Builds the crawler's HTTP client and classifies fetch results. Redirects
//! are followed automatically (bounded), TLS peer and host verification stay
//! enabled, and the configured timeout applies to the whole request.

use crate::config::UserAgentConfig;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

const MAX_REDIRECTS: usize = 10;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchOutcome {
    /// Successfully fetched a non-empty body
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Response body bytes
        body: Vec<u8>,
    },

    /// The server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// The response completed but carried no body
    EmptyBody,

    /// Connection, TLS, or timeout failure
    NetworkError {
        /// Error description
        error: String,
    },
}

/// Builds the crawler's HTTP client
///
/// The user agent is `name/version (+contact-url; contact-email)` so site
/// operators can identify and reach us.
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Total per-request timeout
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    let user_agent = format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .build()
}

/// Fetches a URL and classifies the outcome
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
pub async fn fetch_url(client: &Client, url: &str) -> FetchOutcome {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            let error = if e.is_timeout() {
                "Request timeout".to_string()
            } else if e.is_connect() {
                "Connection failed".to_string()
            } else {
                e.to_string()
            };
            return FetchOutcome::NetworkError { error };
        }
    };

    let status = response.status();
    if !status.is_success() {
        return FetchOutcome::HttpError {
            status_code: status.as_u16(),
        };
    }

    let final_url = response.url().to_string();
    match response.bytes().await {
        Ok(bytes) if bytes.is_empty() => FetchOutcome::EmptyBody,
        Ok(bytes) => FetchOutcome::Success {
            final_url,
            status_code: status.as_u16(),
            body: bytes.to_vec(),
        },
        Err(e) => FetchOutcome::NetworkError {
            error: e.to_string(),
        },
    }
}
