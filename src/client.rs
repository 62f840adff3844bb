//! The request executor.
//!
//! [`Client::dispatch`] is the single path every call takes: build the
//! authenticated request, send it once, classify the status, log the
//! outcome.

use std::{fmt, path::Path};

use serde_json::Value;
use tracing::{Dispatch, error, info, warn};

use crate::{
    ApiRequest, ApiResponse, Call, Error, Method, Profile, Query, Response, Table, TransportError,
    logging, table,
};

/// Sends a fully built request and returns the raw response.
///
/// Implementations must return `Ok` for every status code the server sends;
/// `Err` means the call did not complete.
pub trait Transport {
    /// Send the request, blocking until the response body has been read.
    fn send(&self, req: http::Request<String>) -> Result<http::Response<Vec<u8>>, TransportError>;
}

impl Transport for ureq::Agent {
    fn send(&self, req: http::Request<String>) -> Result<http::Response<Vec<u8>>, TransportError> {
        let resp = self.run(req)?;
        let (parts, mut body) = resp.into_parts();
        let bytes = body.read_to_vec()?;
        Ok(http::Response::from_parts(parts, bytes))
    }
}

/// Build the blocking HTTP agent for a profile.
fn agent_for(profile: &Profile) -> ureq::Agent {
    let tls = ureq::tls::TlsConfig::builder()
        .disable_verification(!profile.verify_tls)
        .build();

    // Allows error responses to be read and classified.
    let cfg = ureq::config::Config::builder()
        .http_status_as_error(false)
        .timeout_global(Some(profile.timeout))
        .tls_config(tls)
        .build();

    ureq::Agent::new_with_config(cfg)
}

/// How a completed call is reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Outcome {
    Ok,
    Created,
    ClientError(String),
    Unexpected,
}

impl Outcome {
    pub(crate) fn of(resp: &Response) -> Self {
        match resp.status.as_u16() {
            200 => Outcome::Ok,
            201 => Outcome::Created,
            400 | 401 | 403 => Outcome::ClientError(resp.error_message()),
            _ => Outcome::Unexpected,
        }
    }
}

/// A client for one Sisense deployment.
///
/// The token, base URL and transport settings are fixed at construction.
/// Every operation logs to the profile's log file, and only there.
pub struct Client<T = ureq::Agent> {
    profile: Profile,
    transport: T,
    log: Dispatch,
}

impl<T> fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("profile", &self.profile)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a client that sends requests with a blocking HTTP agent
    /// configured from the profile (timeout, certificate verification).
    pub fn new(profile: Profile) -> Result<Self, Error> {
        let agent = agent_for(&profile);
        Self::with_transport(profile, agent)
    }
}

impl<T: Transport> Client<T> {
    /// Create a client that sends requests through the given transport.
    /// Opens (or creates) the profile's log file.
    pub fn with_transport(profile: Profile, transport: T) -> Result<Self, Error> {
        let log = logging::file_dispatch(&profile.log_file, profile.debug)?;
        Ok(Self {
            profile,
            transport,
            log,
        })
    }

    /// The profile this client was created with.
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run `f` with this client's log file as the destination for events.
    pub(crate) fn logged<R>(&self, f: impl FnOnce() -> R) -> R {
        tracing::dispatcher::with_default(&self.log, f)
    }

    /// Dispatch a call given a method name. Fails with
    /// [Error::UnsupportedMethod] before anything is sent if the method is
    /// not one of GET, POST, PUT, PATCH or DELETE.
    pub fn dispatch(
        &self,
        method: &str,
        path: &str,
        query: Option<&Query>,
        body: Option<&Value>,
    ) -> Result<Response, Error> {
        self.logged(|| {
            let method: Method = method.parse().inspect_err(|e| error!("{e}"))?;
            let call = Call {
                method,
                path: path.to_owned(),
                query: query.cloned().unwrap_or_default(),
                body: body.cloned(),
            };

            self.send(call)
        })
    }

    /// Perform a GET request.
    pub fn get(&self, path: &str, query: Option<&Query>) -> Result<Response, Error> {
        let mut call = Call::new(Method::Get, path);
        call.query = query.cloned().unwrap_or_default();
        self.execute(call)
    }

    /// Perform a POST request.
    pub fn post(&self, path: &str, body: Option<&Value>) -> Result<Response, Error> {
        self.execute(with_body(Method::Post, path, body))
    }

    /// Perform a PUT request.
    pub fn put(&self, path: &str, body: Option<&Value>) -> Result<Response, Error> {
        self.execute(with_body(Method::Put, path, body))
    }

    /// Perform a PATCH request.
    pub fn patch(&self, path: &str, body: Option<&Value>) -> Result<Response, Error> {
        self.execute(with_body(Method::Patch, path, body))
    }

    /// Perform a DELETE request.
    pub fn delete(&self, path: &str) -> Result<Response, Error> {
        self.execute(Call::new(Method::Delete, path))
    }

    /// Send a call exactly once and classify the response.
    ///
    /// Returns the response for every status code, including 4xx and 5xx.
    /// Returns [Error::Transport] if the call did not complete.
    pub fn execute(&self, call: Call) -> Result<Response, Error> {
        self.logged(|| self.send(call))
    }

    /// Send a typed request, and interpret the response.
    pub fn roundtrip<R: ApiRequest>(&self, req: R) -> Result<R::Response, Error> {
        self.logged(|| {
            let call = req.into_call()?;
            let resp = self.send(call)?;
            R::Response::from_response(resp)
        })
    }

    /// Convert JSON data into a table. See [normalize](crate::normalize).
    pub fn normalize(&self, data: &Value) -> Result<Table, Error> {
        self.logged(|| table::normalize(data))
    }

    /// Convert JSON data into a table and write it to a CSV file. See
    /// [export_csv](crate::export_csv).
    pub fn export_csv(&self, data: &Value, destination: impl AsRef<Path>) -> Result<(), Error> {
        self.logged(|| table::export_csv(data, destination))
    }

    fn send(&self, call: Call) -> Result<Response, Error> {
        let method = call.method;
        let url = call.url(&self.profile);

        let data = call
            .effective_body()
            .map_or_else(|| "null".to_string(), Value::to_string);
        let params = call
            .effective_query()
            .and_then(|q| serde_json::to_string(q).ok())
            .unwrap_or_else(|| "null".to_string());
        info!("Making {method} request to {url} with data: {data} and params: {params}");

        let req = call.into_request(&self.profile).inspect_err(|e| {
            error!("{method} request to {url} could not be built: {e}");
        })?;

        let resp = match self.transport.send(req) {
            Ok(resp) => Response::from_http(resp),
            Err(source) => {
                error!("{method} request to {url} failed: {source}");
                return Err(Error::Transport {
                    method,
                    url,
                    source,
                });
            }
        };

        let status = resp.status.as_u16();
        match Outcome::of(&resp) {
            Outcome::Ok => info!("{method} request to {url} succeeded with status code {status}"),
            Outcome::Created => {
                info!("{method} request to {url} succeeded with status code {status} (Created)")
            }
            Outcome::ClientError(message) => {
                error!("{method} request to {url} failed with status code {status}: {message}")
            }
            Outcome::Unexpected => {
                warn!("{method} request to {url} returned unexpected status code {status}")
            }
        }

        Ok(resp)
    }
}

// A client is shared across threads as-is.
const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Client>();
};

fn with_body(method: Method, path: &str, body: Option<&Value>) -> Call {
    let mut call = Call::new(method, path);
    call.body = body.cloned();
    call
}
