//! HTTP request descriptor and response value types.
//!
//! [`HttpRequest`] is built once and then only borrowed by the retry loop, so
//! every attempt sends exactly the same method, URL, headers and body.
//! [`HttpResponse`] owns its body; the accessors that decode it take `self`
//! so a body is consumed at most once.

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

// ---------------------------------------------------------------------------
// HttpRequest
// ---------------------------------------------------------------------------

/// An immutable description of one logical HTTP call.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: Method,
    url: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl HttpRequest {
    /// A bodiless `GET` request.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// A `POST` request whose body is `payload` serialised as JSON.
    ///
    /// Sets `Content-Type: application/json`.
    pub fn post_json<T: Serialize + ?Sized>(
        url: impl Into<String>,
        payload: &T,
    ) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_vec(payload)?;
        Ok(Self {
            method: Method::POST,
            url: url.into(),
            headers: vec![("Content-Type".into(), "application/json".into())],
            body,
        })
    }

    /// Append a header.  Only usable while building; once the request is
    /// handed to a client it is borrowed immutably.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

// ---------------------------------------------------------------------------
// ResponseClass
// ---------------------------------------------------------------------------

/// How the retry loop treats a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    /// 2xx: returned to the caller.
    Success,
    /// 429 or ≥ 500: retried until the attempt budget runs out.
    Retryable,
    /// Anything else (notably 4xx other than 429): returned without retry;
    /// the caller inspects the status.
    Terminal,
}

impl ResponseClass {
    /// Classify a raw status code.
    ///
    /// ```
    /// use studio_assist::http::ResponseClass;
    ///
    /// assert_eq!(ResponseClass::of(200), ResponseClass::Success);
    /// assert_eq!(ResponseClass::of(429), ResponseClass::Retryable);
    /// assert_eq!(ResponseClass::of(503), ResponseClass::Retryable);
    /// assert_eq!(ResponseClass::of(404), ResponseClass::Terminal);
    /// ```
    pub fn of(status: u16) -> Self {
        match status {
            200..=299 => ResponseClass::Success,
            429 | 500..=u16::MAX => ResponseClass::Retryable,
            _ => ResponseClass::Terminal,
        }
    }
}

// ---------------------------------------------------------------------------
// HttpResponse
// ---------------------------------------------------------------------------

/// A fully received HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, headers: Vec<(String, String)>, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.classify() == ResponseClass::Success
    }

    pub fn classify(&self) -> ResponseClass {
        ResponseClass::of(self.status)
    }

    /// Response headers in the order the server sent them.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Take the body as text, replacing invalid UTF-8.
    pub fn into_text(self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
