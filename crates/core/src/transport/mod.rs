//! Request/response plumbing between the session and the remote API.

mod http;
#[cfg(test)]
pub(crate) mod mock;

use std::{fmt, rc::Rc};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::error::{Error, Result};

pub use self::http::HttpTransport;
pub use reqwest::Method;

/// A single outgoing API call.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// HTTP verb.
    pub method: Method,
    /// Fully qualified URL.
    pub url: String,
    /// Optional JSON body.
    pub body: Option<Value>,
}

/// Raw answer to a [`Request`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Undecoded response body.
    pub body: String,
}

impl Response {
    /// Whether the status code is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Something that can perform one blocking request/response cycle.
pub trait Transport {
    /// Send `request` and return whatever the server answered.
    fn send(&self, request: &Request) -> Result<Response>;
}

/// Handle used by the session and the entity proxies to reach the API.
///
/// Cloning is cheap and every clone shares the same transport. The handle is
/// deliberately `!Send`: sessions are single-threaded.
#[derive(Clone)]
pub struct Api {
    base_url: String,
    transport: Rc<dyn Transport>,
}

impl fmt::Debug for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Api")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Api {
    /// Wrap a transport talking to `base_url`.
    pub fn new(base_url: impl Into<String>, transport: impl Transport + 'static) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            transport: Rc::new(transport),
        }
    }

    /// Base URL every endpoint is appended to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Effective URL for an endpoint. Path segments are not escaped.
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    /// Perform a call and decode the body as JSON.
    ///
    /// A non-success status is logged but does not fail the call: the body
    /// is still decoded and returned. A body that is not JSON is an error.
    pub fn request(&self, method: Method, endpoint: &str, body: Option<Value>) -> Result<Value> {
        self.execute(method, endpoint, body, false)
    }

    /// GET `endpoint` and convert the answer into `T`.
    pub fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let value = self.request(Method::GET, endpoint, None)?;
        self.convert(endpoint, value)
    }

    /// POST `body` to `endpoint` and convert the answer into `T`.
    pub fn post<B, T>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let value = self.request(Method::POST, endpoint, Some(encode(endpoint, body)?))?;
        self.convert(endpoint, value)
    }

    /// PUT `body` to `endpoint` and convert the answer into `T`.
    pub fn put<B, T>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let value = self.request(Method::PUT, endpoint, Some(encode(endpoint, body)?))?;
        self.convert(endpoint, value)
    }

    /// PUT for calls whose answer is not used. An empty body is accepted.
    pub fn put_ignoring_answer<B>(&self, endpoint: &str, body: Option<&B>) -> Result<Value>
    where
        B: Serialize + ?Sized,
    {
        let body = body.map(|body| encode(endpoint, body)).transpose()?;
        self.execute(Method::PUT, endpoint, body, true)
    }

    /// DELETE `endpoint`. An empty body is accepted.
    pub fn delete(&self, endpoint: &str) -> Result<Value> {
        self.execute(Method::DELETE, endpoint, None, true)
    }

    fn execute(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
        allow_empty: bool,
    ) -> Result<Value> {
        let request = Request {
            method,
            url: self.url(endpoint),
            body,
        };
        debug!("{} {}", request.method, request.url);
        let response = self.transport.send(&request)?;

        if !response.is_success() {
            warn!(
                url = %request.url,
                status = response.status,
                body = %response.body,
                request_body = ?request.body,
                "Got response status {} for {} {}",
                response.status,
                request.method,
                request.url
            );
        }

        if allow_empty && response.body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&response.body).map_err(|source| {
            error!("Could not parse JSON for {}: {}", request.url, source);
            Error::Decode {
                url: request.url,
                body: response.body,
                source,
            }
        })
    }

    fn convert<T: DeserializeOwned>(&self, endpoint: &str, value: Value) -> Result<T> {
        serde_json::from_value(value).map_err(|source| Error::Payload {
            url: self.url(endpoint),
            source,
        })
    }
}

fn encode<B: Serialize + ?Sized>(endpoint: &str, body: &B) -> Result<Value> {
    serde_json::to_value(body).map_err(|source| Error::Encode {
        endpoint: endpoint.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::mock::MockTransport;
    use super::*;
    use serde_json::json;

    fn api() -> (Api, MockTransport) {
        let transport = MockTransport::new();
        (Api::new("http://mock.test/", transport.clone()), transport)
    }

    #[test]
    fn builds_urls_by_plain_interpolation() {
        let (api, _) = api();
        assert_eq!(api.base_url(), "http://mock.test");
        assert_eq!(api.url("lists/7/items"), "http://mock.test/lists/7/items");
        assert_eq!(
            api.url("unique_items/salt & pepper"),
            "http://mock.test/unique_items/salt & pepper"
        );
    }

    #[test]
    fn failed_status_with_json_body_returns_decoded_body() -> Result<()> {
        let (api, transport) = api();
        transport.respond(Method::GET, "restrictions", 500, r#"{"error":"boom"}"#);

        let value = api.request(Method::GET, "restrictions", None)?;
        assert_eq!(value, json!({"error": "boom"}));
        Ok(())
    }

    #[test]
    fn failed_status_with_non_json_body_is_a_decode_error() {
        let (api, transport) = api();
        transport.respond(Method::GET, "restrictions", 502, "<html>Bad Gateway</html>");

        match api.request(Method::GET, "restrictions", None) {
            Err(Error::Decode { url, body, .. }) => {
                assert_eq!(url, "http://mock.test/restrictions");
                assert_eq!(body, "<html>Bad Gateway</html>");
            }
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn successful_status_with_non_json_body_is_a_decode_error() {
        let (api, transport) = api();
        transport.respond(Method::GET, "bauth", 200, "welcome");
        assert!(matches!(
            api.request(Method::GET, "bauth", None),
            Err(Error::Decode { .. })
        ));
    }

    #[test]
    fn empty_bodies_are_only_accepted_when_the_answer_is_ignored() -> Result<()> {
        let (api, transport) = api();
        transport.respond(Method::DELETE, "lists/1", 200, "");
        transport.respond(Method::PUT, "clear_cache", 200, "");
        transport.respond(Method::PUT, "lists/1", 200, "");

        assert_eq!(api.delete("lists/1")?, Value::Null);
        assert_eq!(api.put_ignoring_answer::<Value>("clear_cache", None)?, Value::Null);
        assert!(matches!(
            api.request(Method::PUT, "lists/1", None),
            Err(Error::Decode { .. })
        ));
        Ok(())
    }

    #[test]
    fn typed_helpers_report_shape_mismatches() {
        let (api, transport) = api();
        transport.respond_json(Method::GET, "lists", json!({"error": "unauthorised"}));

        let result: Result<Vec<crate::models::ListRecord>> = api.get("lists");
        assert!(matches!(result, Err(Error::Payload { .. })));
    }

    #[test]
    fn request_bodies_are_forwarded_as_json() -> Result<()> {
        let (api, transport) = api();
        transport.respond_json(Method::POST, "lists", json!({"id": 1, "name": "New"}));

        let body = json!({"name": "New"});
        let _: crate::models::ListRecord = api.post("lists", &body)?;

        let sent = transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, Method::POST);
        assert_eq!(sent[0].url, "http://mock.test/lists");
        assert_eq!(sent[0].body, Some(body));
        Ok(())
    }
}
