//! A process-wide default client.
//!
//! Most applications want exactly one [`Client`] without threading it through every call site.
//! This module holds a single, explicitly-configured global client: call [`configure`] once
//! during startup, then use the free functions anywhere in the process. The core [`Client`]
//! type knows nothing about this module; it is a convenience layer only.
//!
//! The global client may only be configured once in the lifetime of a program. Calls made
//! before [`configure`] fail with [`GlobalClientError::Unconfigured`].

use std::{io, sync::OnceLock, time::Duration};

use thiserror::Error;

use crate::{builder::BuildError, client::Client, ClientBuilder};

static GLOBAL_CLIENT: OnceLock<Client> = OnceLock::new();

/// Errors that could occur while sending through the global client.
#[derive(Debug, Error)]
pub enum GlobalClientError {
    /// No global client has been configured yet.
    #[error("no global client has been configured")]
    Unconfigured,

    /// The underlying transport write failed.
    #[error(transparent)]
    Write(#[from] io::Error),
}

/// Builds a client and installs it as the process-wide default.
///
/// This function may only be called once in the lifetime of a program. Any calls made through
/// this module before it succeeds fail with [`GlobalClientError::Unconfigured`].
///
/// # Errors
///
/// If the address cannot be parsed, the socket cannot be opened, or a global client has
/// already been configured, an error is returned.
pub fn configure<A, I, S>(addr: A, namespace: &str, tags: I) -> Result<(), BuildError>
where
    A: AsRef<str>,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let client = ClientBuilder::default()
        .with_remote_address(addr)?
        .with_namespace(namespace)
        .with_global_tags(tags)
        .build()?;

    GLOBAL_CLIENT.set(client).map_err(|_| BuildError::AlreadyConfigured)
}

fn client() -> Result<&'static Client, GlobalClientError> {
    GLOBAL_CLIENT.get().ok_or(GlobalClientError::Unconfigured)
}

/// Measures the value of a metric at a particular time, via the global client.
///
/// # Errors
///
/// Fails if no global client has been configured, or if the datagram write fails.
pub fn gauge(name: &str, value: f64, tags: &[&str], rate: f64) -> Result<(), GlobalClientError> {
    client()?.gauge(name, value, tags, rate).map_err(Into::into)
}

/// Tracks how many times something happened, via the global client.
///
/// # Errors
///
/// Fails if no global client has been configured, or if the datagram write fails.
pub fn count(name: &str, value: i64, tags: &[&str], rate: f64) -> Result<(), GlobalClientError> {
    client()?.count(name, value, tags, rate).map_err(Into::into)
}

/// Tracks the statistical distribution of a set of values, via the global client.
///
/// # Errors
///
/// Fails if no global client has been configured, or if the datagram write fails.
pub fn histogram(
    name: &str,
    value: f64,
    tags: &[&str],
    rate: f64,
) -> Result<(), GlobalClientError> {
    client()?.histogram(name, value, tags, rate).map_err(Into::into)
}

/// Tracks the statistical distribution of a set of durations, via the global client.
///
/// # Errors
///
/// Fails if no global client has been configured, or if the datagram write fails.
pub fn timer(
    name: &str,
    value: Duration,
    tags: &[&str],
    rate: f64,
) -> Result<(), GlobalClientError> {
    client()?.timer(name, value, tags, rate).map_err(Into::into)
}

/// Counts the number of unique elements in a group, via the global client.
///
/// # Errors
///
/// Fails if no global client has been configured, or if the datagram write fails.
pub fn set(name: &str, value: &str, tags: &[&str], rate: f64) -> Result<(), GlobalClientError> {
    client()?.set(name, value, tags, rate).map_err(Into::into)
}

/// Posts to the event stream, via the global client.
///
/// # Errors
///
/// Fails if no global client has been configured, or if the datagram write fails.
pub fn event(title: &str, text: &str, tags: &[&str]) -> Result<(), GlobalClientError> {
    client()?.event(title, text, tags).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use std::{net::UdpSocket, time::Duration};

    use super::{configure, gauge, set, BuildError, GlobalClientError};

    // The global client is per-process state, so the whole lifecycle lives in one test to keep
    // the ordering deterministic under the parallel test runner.
    #[test]
    fn global_client_lifecycle() {
        let server = UdpSocket::bind("127.0.0.1:0").unwrap();
        server.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        let addr = server.local_addr().unwrap().to_string();

        match gauge("test.gauge", 1.0, &[], 1.0) {
            Err(GlobalClientError::Unconfigured) => {}
            _ => panic!("expected unconfigured error"),
        }

        configure(&addr, "flubber.", ["tagC"]).unwrap();

        set("test.set", "uuid", &["tagA"], 1.0).unwrap();
        let mut buf = [0; 1024];
        let n = server.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"flubber.test.set:uuid|s|#tagC,tagA");

        match configure(&addr, "", std::iter::empty::<String>()) {
            Err(BuildError::AlreadyConfigured) => {}
            _ => panic!("expected already configured error"),
        }
    }
}
