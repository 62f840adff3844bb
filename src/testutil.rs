//! Test utilities: a recording transport and helpers for reading client
//! logs.

use std::{
    io,
    path::Path,
    sync::Mutex,
};

use crate::{Client, Profile, Transport, TransportError};

/// A request as seen by the transport.
#[derive(Debug, Clone)]
pub(crate) struct Recorded {
    pub method: http::Method,
    pub uri: http::Uri,
    pub headers: http::HeaderMap,
    pub body: String,
}

impl Recorded {
    pub(crate) fn path(&self) -> &str {
        self.uri.path()
    }

    pub(crate) fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body should be JSON")
    }
}

type Reply = Result<http::Response<Vec<u8>>, TransportError>;
type Handler = dyn Fn(&Recorded) -> Reply + Send + Sync;

/// A transport that records every request and answers from a handler.
pub(crate) struct MockTransport {
    handler: Box<Handler>,
    calls: Mutex<Vec<Recorded>>,
}

impl MockTransport {
    pub(crate) fn new(handler: impl Fn(&Recorded) -> Reply + Send + Sync + 'static) -> Self {
        Self {
            handler: Box::new(handler),
            calls: Default::default(),
        }
    }

    /// Answer every request with the same status and body.
    pub(crate) fn fixed(status: u16, body: &'static str) -> Self {
        Self::new(move |_| reply(status, body))
    }

    /// Fail every request as if the server were unreachable.
    pub(crate) fn refused() -> Self {
        Self::new(|_| {
            Err(io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused").into())
        })
    }

    pub(crate) fn calls(&self) -> Vec<Recorded> {
        self.calls.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    fn send(&self, req: http::Request<String>) -> Reply {
        let (parts, body) = req.into_parts();
        let recorded = Recorded {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
        };

        let reply = (self.handler)(&recorded);
        self.calls.lock().unwrap().push(recorded);
        reply
    }
}

/// Build a response with a status and body.
pub(crate) fn reply(status: u16, body: impl Into<String>) -> Reply {
    Ok(http::Response::builder()
        .status(status)
        .body(body.into().into_bytes())?)
}

/// A profile pointing at a fake deployment, logging into `dir`.
pub(crate) fn test_profile(dir: &Path) -> Profile {
    let mut profile = Profile::new("bi.example.com", "secret-token");
    profile.log_file = dir.join("sisense.log");
    profile.debug = false;
    profile
}

pub(crate) fn test_client(dir: &Path, transport: MockTransport) -> Client<MockTransport> {
    Client::with_transport(test_profile(dir), transport).expect("Failed to create client")
}

/// The contents of the client log written by [test_client].
pub(crate) fn read_log(dir: &Path) -> String {
    std::fs::read_to_string(dir.join("sisense.log")).unwrap_or_default()
}

/// The number of log lines at the given level.
pub(crate) fn count_level(log: &str, level: &str) -> usize {
    let needle = format!(" {level} ");
    log.lines().filter(|line| line.contains(&needle)).count()
}
