use serde_json::Value;

use crate::error::FetchError;

const USER_AGENT: &str = concat!("streamplan/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Method {
    Get,
    Post,
}

impl Method {
    fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct HttpRequest {
    pub(crate) method: Method,
    pub(crate) url: String,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) json_body: Option<Value>,
}

impl HttpRequest {
    pub(crate) fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            query: Vec::new(),
            json_body: None,
        }
    }

    pub(crate) fn post_json(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            query: Vec::new(),
            json_body: Some(body),
        }
    }

    pub(crate) fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct HttpResponse {
    pub(crate) http_status: u16,
    pub(crate) body: Value,
}

pub(crate) fn build_agent() -> ureq::Agent {
    ureq::AgentBuilder::new().user_agent(USER_AGENT).build()
}

/// Performs exactly one request. Non-2xx statuses come back as a
/// [`FetchError`] carrying the status and the parsed (or raw text) body.
pub(crate) fn fetch_json(
    agent: &ureq::Agent,
    request: &HttpRequest,
) -> Result<HttpResponse, FetchError> {
    let mut call = agent
        .request(request.method.as_str(), &request.url)
        .set("Accept", "application/json")
        .set("Cache-Control", "no-cache, no-store")
        .set("Pragma", "no-cache");
    for (key, value) in &request.query {
        call = call.query(key, value);
    }

    tracing::debug!(method = request.method.as_str(), url = %request.url, "issuing request");
    let result = match &request.json_body {
        Some(body) => call
            .set("Content-Type", "application/json")
            .send_string(&body.to_string()),
        None => call.call(),
    };

    match result {
        Ok(response) => {
            let http_status = response.status();
            let raw = response.into_string().map_err(|err| {
                FetchError::new(format!("response decode failed: {err}")).with_status(http_status)
            })?;
            let body = parse_body(raw);
            if !(200..=299).contains(&http_status) {
                return Err(FetchError::status(http_status, body));
            }
            Ok(HttpResponse { http_status, body })
        }
        Err(ureq::Error::Status(status, response)) => {
            let raw = response.into_string().unwrap_or_default();
            Err(FetchError::status(status, parse_body(raw)))
        }
        Err(ureq::Error::Transport(err)) => {
            Err(FetchError::new(format!("transport error: {err}")))
        }
    }
}

/// JSON when it parses, the raw text otherwise.
pub(crate) fn parse_body(raw: String) -> Value {
    match serde_json::from_str::<Value>(&raw) {
        Ok(value) => value,
        Err(_) => Value::String(raw),
    }
}
