//! HTTP response wrapper and classification.

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::{HttpClientError, Result};

/// HTTP response wrapper.
///
/// Read-only once constructed; the body is read from the wire eagerly and
/// exposed as raw bytes or decoded on demand.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    url: Url,
}

impl Response {
    /// Create a response from its parts.
    ///
    /// Transport implementations use this to hand finished responses to
    /// the client.
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>, url: Url) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
            url,
        }
    }

    /// Create a response from a reqwest response.
    pub(crate) async fn from_reqwest(response: reqwest::Response) -> Result<Self> {
        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().clone();
        let body = response.bytes().await?;

        Ok(Self {
            status,
            headers,
            body,
            url,
        })
    }

    /// Get the status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Check if the response was successful (2xx).
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Get the response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a specific header value.
    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        self.headers
            .get(name.as_ref())
            .and_then(|v| v.to_str().ok())
    }

    /// Get the response URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Get the response body as bytes.
    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// Consume the response and return the body as bytes.
    pub fn into_bytes(self) -> Bytes {
        self.body
    }

    /// Get the response body as text.
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.to_vec()).map_err(HttpClientError::transport)
    }

    /// Parse the response body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Get the content type if available.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

/// Classified outcome of a request.
///
/// A request resolves to the decoded JSON body when automatic parsing
/// applies, or to the raw response otherwise.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Body decoded from a JSON response.
    Json(serde_json::Value),
    /// Raw response for caller inspection.
    Raw(Response),
}

impl Reply {
    /// Get the decoded JSON value, if this reply was decoded.
    pub fn json_value(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Raw(_) => None,
        }
    }

    /// Get the raw response, if this reply carries one.
    pub fn as_raw(&self) -> Option<&Response> {
        match self {
            Self::Json(_) => None,
            Self::Raw(response) => Some(response),
        }
    }

    /// Deserialize the reply into a typed value.
    ///
    /// Works for both decoded and raw replies; a raw reply is parsed from
    /// its body bytes.
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T> {
        match self {
            Self::Json(value) => Ok(serde_json::from_value(value)?),
            Self::Raw(response) => response.json(),
        }
    }
}

/// Turn a raw response into a reply or a typed failure.
///
/// Status codes outside `[200, 300)` fail immediately. Successful responses
/// that declare a JSON content type are decoded when `parse_json` is set;
/// everything else passes through unchanged.
pub(crate) fn classify(response: Response, parse_json: bool) -> Result<Reply> {
    if !response.is_success() {
        return Err(HttpClientError::Http {
            status: response.status(),
            response,
        });
    }

    let is_json = response
        .content_type()
        .is_some_and(|ct| ct.contains("application/json"));

    if parse_json && is_json {
        let value: serde_json::Value = serde_json::from_slice(response.bytes())?;
        return Ok(Reply::Json(value));
    }

    Ok(Reply::Raw(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::CONTENT_TYPE;
    use http::HeaderValue;

    fn response(status: u16, content_type: Option<&'static str>, body: &'static str) -> Response {
        let mut headers = HeaderMap::new();
        if let Some(ct) = content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(ct));
        }
        Response::new(
            StatusCode::from_u16(status).unwrap(),
            headers,
            body,
            "http://localhost/test".parse().unwrap(),
        )
    }

    #[test]
    fn test_error_status_fails_classification() {
        let err = classify(response(404, None, "missing"), true).unwrap_err();
        match err {
            HttpClientError::Http { status, response } => {
                assert_eq!(status.as_u16(), 404);
                assert_eq!(response.text().unwrap(), "missing");
            }
            other => panic!("expected Http error, got {other:?}"),
        }
    }

    #[test]
    fn test_json_response_is_decoded() {
        let reply = classify(
            response(200, Some("application/json"), r#"{"ok":true}"#),
            true,
        )
        .unwrap();
        assert_eq!(reply.json_value().unwrap()["ok"], true);
    }

    #[test]
    fn test_charset_suffix_still_counts_as_json() {
        let reply = classify(
            response(200, Some("application/json; charset=utf-8"), "[1,2]"),
            true,
        )
        .unwrap();
        assert!(matches!(reply, Reply::Json(_)));
    }

    #[test]
    fn test_no_content_type_passes_through_raw() {
        let reply = classify(response(204, None, ""), true).unwrap();
        let raw = reply.as_raw().unwrap();
        assert_eq!(raw.status().as_u16(), 204);
    }

    #[test]
    fn test_parsing_disabled_passes_through_raw() {
        let reply = classify(
            response(200, Some("application/json"), r#"{"ok":true}"#),
            false,
        )
        .unwrap();
        assert!(matches!(reply, Reply::Raw(_)));
    }

    #[test]
    fn test_undecodable_body_is_a_transport_fault() {
        let err = classify(response(200, Some("application/json"), "not json"), true).unwrap_err();
        assert!(matches!(err, HttpClientError::Transport(_)));
    }

    #[test]
    fn test_reply_into_typed_json() {
        #[derive(serde::Deserialize)]
        struct Flag {
            ok: bool,
        }

        let reply = classify(
            response(200, Some("application/json"), r#"{"ok":true}"#),
            true,
        )
        .unwrap();
        let flag: Flag = reply.into_json().unwrap();
        assert!(flag.ok);

        let raw = classify(response(200, None, r#"{"ok":false}"#), true).unwrap();
        let flag: Flag = raw.into_json().unwrap();
        assert!(!flag.ok);
    }
}
