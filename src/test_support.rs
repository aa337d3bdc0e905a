use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use serde_json::Value;

use crate::http::{HttpError, Transport};

#[derive(Debug, Clone)]
pub(crate) enum Canned {
    Body(String),
    Status(u16),
}

/// In-memory transport keyed by `"METHOD url"`. Each key serves its queued
/// responses in order and repeats the last one once the queue is drained.
#[derive(Default)]
pub(crate) struct FakeTransport {
    routes: Mutex<HashMap<String, VecDeque<Canned>>>,
    fallback: Option<String>,
    log: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_fallback_body(body: &str) -> Self {
        Self {
            fallback: Some(body.to_string()),
            ..Self::default()
        }
    }

    pub(crate) fn route(self, method: &str, url: &str, responses: Vec<Canned>) -> Self {
        self.routes
            .lock()
            .expect("lock routes")
            .insert(format!("{method} {url}"), VecDeque::from(responses));
        self
    }

    pub(crate) fn get(self, url: &str, body: &str) -> Self {
        self.route("GET", url, vec![Canned::Body(body.to_string())])
    }

    pub(crate) fn post(self, url: &str, body: &str) -> Self {
        self.route("POST", url, vec![Canned::Body(body.to_string())])
    }

    pub(crate) fn requests(&self) -> Vec<String> {
        self.log.lock().expect("lock log").clone()
    }

    pub(crate) fn request_count(&self, prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|line| line.starts_with(prefix))
            .count()
    }

    fn respond(&self, method: &str, url: &str) -> Result<String, HttpError> {
        let key = format!("{method} {url}");
        self.log.lock().expect("lock log").push(key.clone());

        let canned = {
            let mut routes = self.routes.lock().expect("lock routes");
            match routes.get_mut(&key) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match canned {
            Some(Canned::Body(body)) => Ok(body),
            Some(Canned::Status(status)) => Err(HttpError::Status {
                status,
                detail: format!("HTTP status {status}"),
            }),
            None => match &self.fallback {
                Some(body) => Ok(body.clone()),
                None => Err(HttpError::Status {
                    status: 404,
                    detail: "HTTP status 404".to_string(),
                }),
            },
        }
    }
}

impl Transport for FakeTransport {
    fn get_text(&self, url: &str, _headers: &[(&str, &str)]) -> Result<String, HttpError> {
        self.respond("GET", url)
    }

    fn get_bytes(&self, url: &str, _headers: &[(&str, &str)]) -> Result<Vec<u8>, HttpError> {
        self.respond("GET", url).map(String::into_bytes)
    }

    fn post_form(
        &self,
        url: &str,
        _headers: &[(&str, &str)],
        form: &[(&str, &str)],
    ) -> Result<String, HttpError> {
        let encoded = form
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&");
        self.respond("POST", &format!("{url}#{encoded}"))
    }

    fn post_json(
        &self,
        url: &str,
        _headers: &[(&str, &str)],
        body: &Value,
    ) -> Result<String, HttpError> {
        self.respond("POST", &format!("{url}#{body}"))
    }
}
