use std::{borrow::Cow, fmt::Display, str::FromStr};

use indexmap::IndexMap;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::Profile;

pub mod dashboard;
pub mod datamodel;
pub mod folder;
mod error;
pub mod user;

pub use error::*;

/// An HTTP method supported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl Method {
    /// The canonical, upper-case name of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// Whether a JSON payload is sent with this method.
    pub fn allows_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put | Method::Patch)
    }

    /// Whether query parameters are sent with this method.
    pub fn allows_query(&self) -> bool {
        !matches!(self, Method::Delete)
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    /// Parses a method name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_uppercase().as_str() {
            "GET" => Method::Get,
            "POST" => Method::Post,
            "PUT" => Method::Put,
            "PATCH" => Method::Patch,
            "DELETE" => Method::Delete,
            _ => return Err(Error::UnsupportedMethod(s.to_owned())),
        })
    }
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => http::Method::GET,
            Method::Post => http::Method::POST,
            Method::Put => http::Method::PUT,
            Method::Patch => http::Method::PATCH,
            Method::Delete => http::Method::DELETE,
        }
    }
}

/// The value of a single query parameter. Lists are sent as repeated keys,
/// e.g. `fields=a&fields=b`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryValue {
    /// A single value.
    One(String),
    /// A list of values for the same key.
    Many(Vec<String>),
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::One(value.to_owned())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::One(value)
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(values: Vec<String>) -> Self {
        QueryValue::Many(values)
    }
}

impl From<&[&str]> for QueryValue {
    fn from(values: &[&str]) -> Self {
        QueryValue::Many(values.iter().map(|v| (*v).to_owned()).collect())
    }
}

/// Query parameters for a call, in insertion order.
pub type Query = IndexMap<String, QueryValue>;

/// A single endpoint call: method, path relative to the profile's base URL,
/// query parameters and an optional JSON payload.
#[derive(Debug, Clone)]
pub struct Call {
    /// The method to use.
    pub method: Method,
    /// The path, appended to the base URL. May already contain a query
    /// string.
    pub path: String,
    /// Query parameters. Never sent with `DELETE`.
    pub query: Query,
    /// The JSON payload. Only sent with `POST`, `PUT` and `PATCH`.
    pub body: Option<Value>,
}

impl Call {
    /// Create a call with no query parameters and no payload.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Query::new(),
            body: None,
        }
    }

    /// The query parameters that will actually be sent.
    pub fn effective_query(&self) -> Option<&Query> {
        (self.method.allows_query() && !self.query.is_empty()).then_some(&self.query)
    }

    /// The payload that will actually be sent.
    pub fn effective_body(&self) -> Option<&Value> {
        self.body.as_ref().filter(|_| self.method.allows_body())
    }

    /// The full URL for this call against the given profile.
    pub fn url(&self, profile: &Profile) -> String {
        let mut url = profile.base_url();
        if !self.path.starts_with('/') {
            url.push('/');
        }
        url.push_str(&self.path);

        if let Some(query) = self.effective_query() {
            let mut qs = url::form_urlencoded::Serializer::new(String::new());
            for (key, value) in query {
                match value {
                    QueryValue::One(v) => {
                        qs.append_pair(key, v);
                    }
                    QueryValue::Many(vs) => {
                        for v in vs {
                            qs.append_pair(key, v);
                        }
                    }
                }
            }

            url.push(if self.path.contains('?') { '&' } else { '?' });
            url.push_str(&qs.finish());
        }

        url
    }

    /// Consume the call and return an [http::Request] carrying the profile's
    /// credentials, suitable for passing to any HTTP client.
    pub fn into_request(self, profile: &Profile) -> Result<http::Request<String>, Error> {
        let uri: http::Uri = self.url(profile).parse()?;
        let body = match self.effective_body() {
            Some(body) => serde_json::to_string(body)?,
            None => String::new(),
        };

        let req = http::Request::builder()
            .method(http::Method::from(self.method))
            .uri(uri)
            .header(
                http::header::AUTHORIZATION,
                format!("Bearer {}", profile.token),
            )
            .header(http::header::CONTENT_TYPE, "application/json")
            .header(http::header::USER_AGENT, &profile.user_agent)
            .body(body)?;

        Ok(req)
    }
}

/// The body of a response: parsed JSON when possible, the raw text
/// otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// The body parsed as JSON.
    Json(Value),
    /// The body was empty or not valid JSON.
    Text(String),
}

/// A response from the API. Returned for every status code; use
/// [`Response::is_success`] or an [`ApiResponse`] to interpret it.
#[derive(Debug, Clone)]
pub struct Response {
    /// The HTTP status.
    pub status: http::StatusCode,
    /// The response headers.
    pub headers: http::HeaderMap,
    /// The response body.
    pub body: Body,
}

impl Response {
    /// Build a response from raw parts, parsing the body as JSON if it is
    /// valid JSON.
    pub fn from_http(resp: http::Response<Vec<u8>>) -> Self {
        let (parts, bytes) = resp.into_parts();
        let body = match serde_json::from_slice(&bytes) {
            Ok(value) => Body::Json(value),
            Err(_) => Body::Text(String::from_utf8_lossy(&bytes).into_owned()),
        };

        Self {
            status: parts.status,
            headers: parts.headers,
            body,
        }
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// The JSON body, if the body was valid JSON.
    pub fn json(&self) -> Option<&Value> {
        match &self.body {
            Body::Json(value) => Some(value),
            Body::Text(_) => None,
        }
    }

    /// The body as text.
    pub fn text(&self) -> Cow<'_, str> {
        match &self.body {
            Body::Json(value) => Cow::Owned(value.to_string()),
            Body::Text(text) => Cow::Borrowed(text),
        }
    }

    /// A human-readable error message taken from the body: the `error` or
    /// `message` field of a JSON body if there is one, otherwise the whole
    /// body.
    pub fn error_message(&self) -> String {
        match &self.body {
            Body::Json(value) => json_error_message(value).unwrap_or_else(|| value.to_string()),
            Body::Text(text) => text.clone(),
        }
    }
}

fn json_error_message(value: &Value) -> Option<String> {
    match value.get("error") {
        Some(Value::String(s)) => return Some(s.clone()),
        Some(err @ Value::Object(_)) => {
            if let Some(Value::String(s)) = err.get("message") {
                return Some(s.clone());
            }
        }
        _ => (),
    }

    match value.get("message") {
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    }
}

/// Implemented by types that can be sent as requests to the API.
pub trait ApiRequest: Sized {
    /// The corresponding response type.
    type Response: ApiResponse;

    /// The path that the request should take.
    fn path(&self) -> String;

    /// The method to use.
    fn method(&self) -> Method {
        Method::Get
    }

    /// The serializable request body.
    fn body(&self) -> Option<impl Serialize> {
        None::<&()>
    }

    /// The query parameters.
    fn query(&self) -> Query {
        Query::new()
    }

    /// Consume the request and return the equivalent [Call].
    fn into_call(self) -> Result<Call, Error> {
        let body = match self.body() {
            Some(body) => Some(serde_json::to_value(body)?),
            None => None,
        };

        Ok(Call {
            method: self.method(),
            path: self.path(),
            query: self.query(),
            body,
        })
    }
}

/// Implemented by types that can be read from an API [Response].
pub trait ApiResponse: Sized {
    /// Interpret the response.
    fn from_response(resp: Response) -> Result<Self, Error>;
}

impl ApiResponse for Response {
    fn from_response(resp: Response) -> Result<Self, Error> {
        Ok(resp)
    }
}

/// A private trait for types that are deserialized from the JSON body of a
/// successful response.
pub(crate) trait JsonResponse: DeserializeOwned {}

impl JsonResponse for Value {}
impl<T: JsonResponse> JsonResponse for Vec<T> {}

impl<T: JsonResponse> ApiResponse for T {
    fn from_response(resp: Response) -> Result<Self, Error> {
        if !resp.is_success() {
            return Err(Error::Api {
                status: resp.status,
                message: resp.error_message(),
            });
        }

        let value = match resp.body {
            Body::Json(value) => value,
            Body::Text(text) if text.is_empty() => Value::Null,
            Body::Text(text) => {
                tracing::debug!(%text, "response body is not JSON");
                return Err(Error::InvalidResponse(resp.status));
            }
        };

        serde_json::from_value(value).map_err(|e| {
            tracing::error!("Failed to parse API response: {e:#}");
            Error::InvalidResponse(resp.status)
        })
    }
}
