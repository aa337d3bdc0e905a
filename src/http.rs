use std::io::Read;
use std::thread;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::config::Config;

pub(crate) const XHR_HEADER: (&str, &str) = ("X-Requested-With", "XMLHttpRequest");

#[derive(Debug, Error)]
pub(crate) enum HttpError {
    #[error("request failed: {detail}")]
    Status { status: u16, detail: String },
    #[error("request failed after {attempts} attempt(s): {detail}")]
    Exhausted {
        attempts: usize,
        status: Option<u16>,
        detail: String,
    },
    #[error("request failed: response decode failed: {0}")]
    Decode(String),
}

/// Network seam shared by every discovery, resolution and download step.
pub(crate) trait Transport: Send + Sync {
    fn get_text(&self, url: &str, headers: &[(&str, &str)]) -> Result<String, HttpError>;

    fn get_bytes(&self, url: &str, headers: &[(&str, &str)]) -> Result<Vec<u8>, HttpError>;

    fn post_form(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        form: &[(&str, &str)],
    ) -> Result<String, HttpError>;

    fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &Value,
    ) -> Result<String, HttpError>;
}

pub(crate) fn get_json(
    transport: &dyn Transport,
    url: &str,
    headers: &[(&str, &str)],
) -> Result<Value, HttpError> {
    let body = transport.get_text(url, headers)?;
    serde_json::from_str(&body).map_err(|err| HttpError::Decode(err.to_string()))
}

pub(crate) fn parse_json_body(body: &str) -> Result<Value, HttpError> {
    serde_json::from_str(body).map_err(|err| HttpError::Decode(err.to_string()))
}

/// Appends url-encoded query pairs, keeping the url untouched when it does not parse.
pub(crate) fn with_query(base: &str, query: &[(&str, &str)]) -> String {
    match url::Url::parse_with_params(base, query) {
        Ok(url) => url.to_string(),
        Err(_) => base.to_string(),
    }
}

fn should_retry_http_status(status: u16) -> bool {
    status == 408 || status == 429 || (500..=599).contains(&status)
}

/// Blocking client built on two pooled `ureq` agents: one with short timeouts for
/// pages and API calls, one with a long read timeout for media transfers.
pub(crate) struct HttpClient {
    metadata: ureq::Agent,
    transfer: ureq::Agent,
    attempts: usize,
    retry_delay: Duration,
}

impl HttpClient {
    pub(crate) fn new(
        user_agent: &str,
        metadata_timeout: Duration,
        transfer_timeout: Duration,
        attempts: usize,
        retry_delay: Duration,
    ) -> Self {
        let builder = |timeout: Duration| {
            ureq::AgentBuilder::new()
                .user_agent(user_agent)
                .timeout_connect(metadata_timeout)
                .timeout_read(timeout)
                .timeout_write(timeout)
        };

        // Metadata calls also get a whole-request deadline so a trickling
        // server cannot stretch them past `metadata_timeout`.
        Self {
            metadata: builder(metadata_timeout).timeout(metadata_timeout).build(),
            transfer: builder(transfer_timeout).build(),
            attempts: attempts.max(1),
            retry_delay,
        }
    }

    pub(crate) fn from_config(config: &Config) -> Self {
        Self::new(
            &config.user_agent,
            Duration::from_secs(config.metadata_timeout_secs),
            Duration::from_secs(config.transfer_timeout_secs),
            config.http_attempts,
            Duration::from_millis(config.retry_delay_ms),
        )
    }

    fn execute<T>(
        &self,
        send: impl Fn() -> Result<ureq::Response, ureq::Error>,
        read: impl Fn(ureq::Response) -> std::io::Result<T>,
    ) -> Result<T, HttpError> {
        let attempts = self.attempts;

        for attempt in 1..=attempts {
            match send() {
                Ok(response) => {
                    return read(response).map_err(|err| HttpError::Decode(err.to_string()));
                }
                Err(ureq::Error::Status(status, response)) => {
                    let response_body = response.into_string().ok().unwrap_or_default();
                    let body = response_body.trim();
                    let status_error = if body.is_empty() {
                        format!("HTTP status {status}")
                    } else {
                        let truncated = body.chars().take(240).collect::<String>();
                        format!("HTTP status {status} ({truncated})")
                    };

                    if should_retry_http_status(status) && attempt < attempts {
                        thread::sleep(self.retry_delay);
                        continue;
                    }

                    if should_retry_http_status(status) {
                        return Err(HttpError::Exhausted {
                            attempts,
                            status: Some(status),
                            detail: status_error,
                        });
                    }

                    return Err(HttpError::Status {
                        status,
                        detail: status_error,
                    });
                }
                Err(ureq::Error::Transport(err)) => {
                    let transport_error = format!("transport error: {err}");
                    if attempt < attempts {
                        thread::sleep(self.retry_delay);
                        continue;
                    }
                    return Err(HttpError::Exhausted {
                        attempts,
                        status: None,
                        detail: transport_error,
                    });
                }
            }
        }

        Err(HttpError::Exhausted {
            attempts,
            status: None,
            detail: "exhausted attempts without a concrete error".to_string(),
        })
    }
}

fn apply_headers(mut request: ureq::Request, headers: &[(&str, &str)]) -> ureq::Request {
    for (name, value) in headers {
        request = request.set(name, value);
    }
    request
}

fn read_text(response: ureq::Response) -> std::io::Result<String> {
    response.into_string()
}

impl Transport for HttpClient {
    fn get_text(&self, url: &str, headers: &[(&str, &str)]) -> Result<String, HttpError> {
        self.execute(
            || apply_headers(self.metadata.get(url), headers).call(),
            read_text,
        )
    }

    fn get_bytes(&self, url: &str, headers: &[(&str, &str)]) -> Result<Vec<u8>, HttpError> {
        self.execute(
            || apply_headers(self.transfer.get(url), headers).call(),
            |response| {
                let mut bytes = Vec::new();
                response.into_reader().read_to_end(&mut bytes)?;
                Ok(bytes)
            },
        )
    }

    fn post_form(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        form: &[(&str, &str)],
    ) -> Result<String, HttpError> {
        self.execute(
            || apply_headers(self.metadata.post(url), headers).send_form(form),
            read_text,
        )
    }

    fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &Value,
    ) -> Result<String, HttpError> {
        let payload = body.to_string();
        self.execute(
            || {
                apply_headers(self.metadata.post(url), headers)
                    .set("Content-Type", "application/json")
                    .send_string(&payload)
            },
            read_text,
        )
    }
}
