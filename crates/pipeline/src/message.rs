//! Outgoing request and incoming response types.
//!
//! A [`Request`] is owned by the caller of [`crate::Pipeline::send`]. Each
//! policy receives `&mut Request` for the duration of its own call and keeps
//! no reference afterwards.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{RequestId, StatusCode};

// ---------------------------------------------------------------------------
// Method
// ---------------------------------------------------------------------------

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// `GET`
    #[default]
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
    /// `HEAD`
    Head,
}

impl Method {
    /// Returns the canonical upper-case token.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
        }
    }
}

impl std::str::FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            "HEAD" => Ok(Self::Head),
            other => Err(format!("unsupported HTTP method '{other}'")),
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// URI
// ---------------------------------------------------------------------------

/// Absolute target URI of a request, with a gettable/settable raw query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestUri(Url);

impl RequestUri {
    /// Parses an absolute URI.
    pub fn parse(input: &str) -> Result<Self, url::ParseError> {
        Url::parse(input).map(Self)
    }

    /// Resolves `reference` against this URI (e.g. a path relative to a
    /// configured endpoint).
    pub fn join(&self, reference: &str) -> Result<Self, url::ParseError> {
        self.0.join(reference).map(Self)
    }

    /// Returns the raw query component without its leading `?`.
    ///
    /// An absent query and an empty query both read as `""`.
    pub fn query(&self) -> &str {
        self.0.query().unwrap_or("")
    }

    /// Replaces the raw query component. `query` must not start with `?`;
    /// an empty string removes the component.
    pub fn set_query(&mut self, query: &str) {
        if query.is_empty() {
            self.0.set_query(None);
        } else {
            self.0.set_query(Some(query));
        }
    }

    /// Returns the full URI as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the underlying [`Url`].
    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

impl From<Url> for RequestUri {
    fn from(url: Url) -> Self {
        Self(url)
    }
}

impl std::str::FromStr for RequestUri {
    type Err = url::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for RequestUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// An outgoing HTTP request travelling through the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    id: RequestId,
    method: Method,
    uri: RequestUri,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl Request {
    /// Creates a body-less request with a fresh [`RequestId`].
    pub fn new(method: Method, uri: RequestUri) -> Self {
        Self {
            id: RequestId::new_random(),
            method,
            uri,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Adds a header, keeping any existing header of the same name.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Returns the correlation id of this request.
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Returns the request method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// Returns the target URI.
    pub fn uri(&self) -> &RequestUri {
        &self.uri
    }

    /// Returns the target URI for in-place modification.
    pub fn uri_mut(&mut self) -> &mut RequestUri {
        &mut self.uri
    }

    /// Returns the headers in insertion order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Returns the body, if any.
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// A response returned by the terminal stage and passed back up the chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Status code.
    pub status: StatusCode,
    /// Response headers in the order received.
    pub headers: Vec<(String, String)>,
    /// Full response body.
    pub body: Vec<u8>,
}

impl Response {
    /// Creates a response with no headers and an empty body.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Returns `true` for `2xx` statuses.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns the first header matching `name`, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_reads_empty_when_absent() {
        let uri = RequestUri::parse("https://example.com/path").expect("valid uri");
        assert_eq!(uri.query(), "");
    }

    #[test]
    fn test_set_query_replaces_component() {
        let mut uri = RequestUri::parse("https://example.com/p?old=1#frag").expect("valid uri");
        uri.set_query("api-version=v1");
        assert_eq!(uri.as_str(), "https://example.com/p?api-version=v1#frag");
        uri.set_query("");
        assert_eq!(uri.as_str(), "https://example.com/p#frag");
    }

    #[test]
    fn test_join_relative_path() {
        let base = RequestUri::parse("https://example.com/openai/").expect("valid uri");
        let joined = base.join("v1/models?x=1").expect("joins");
        assert_eq!(joined.as_str(), "https://example.com/openai/v1/models?x=1");
    }

    #[test]
    fn test_method_parses_case_insensitively() {
        assert_eq!("post".parse::<Method>(), Ok(Method::Post));
        assert!("TRACE".parse::<Method>().is_err());
    }

    #[test]
    fn test_response_header_lookup_ignores_case() {
        let mut response = Response::new(StatusCode::OK);
        response.headers.push(("X-Dry-Run".into(), "true".into()));
        assert_eq!(response.header("x-dry-run"), Some("true"));
        assert_eq!(response.header("missing"), None);
    }
}
