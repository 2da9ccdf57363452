use std::{io, net::SocketAddr, time::Duration};

use thiserror::Error;

use crate::{
    client::Client,
    transport::{RemoteAddr, Transport},
};

/// Errors that could occur while building or installing a DogStatsD client.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Failed to parse the remote address.
    #[error("invalid remote address: {reason}")]
    InvalidRemoteAddress {
        /// Details about the parsing failure.
        reason: String,
    },

    /// Failed to open the datagram socket to the remote agent.
    #[error(transparent)]
    Connect(#[from] io::Error),

    /// Failed to install the client as the process-wide global client because one has already
    /// been configured.
    #[error("a global client has already been configured")]
    AlreadyConfigured,
}

/// Builder for a DogStatsD [`Client`].
pub struct ClientBuilder {
    remote_addr: RemoteAddr,
    write_timeout: Option<Duration>,
    namespace: String,
    global_tags: Vec<String>,
}

impl ClientBuilder {
    /// Set the remote address to send metrics to.
    ///
    /// For UDP, the address simply needs to be in the format of `<host>:<port>`. On Linux, an
    /// address in the format of `unixgram://<path>` selects a Unix datagram socket instead.
    ///
    /// Defaults to sending to `127.0.0.1:8125` over UDP.
    ///
    /// # Errors
    ///
    /// If the given address is not able to be parsed as a valid address, an error will be
    /// returned indicating the reason.
    pub fn with_remote_address<A>(mut self, addr: A) -> Result<Self, BuildError>
    where
        A: AsRef<str>,
    {
        self.remote_addr = RemoteAddr::try_from(addr.as_ref())
            .map_err(|reason| BuildError::InvalidRemoteAddress { reason })?;
        Ok(self)
    }

    /// Set the write timeout applied to the underlying socket.
    ///
    /// When the write timeout is reached, the write operation is aborted and its error is
    /// returned to the caller; the payload being sent at the time is not retried.
    ///
    /// Defaults to no timeout.
    #[must_use]
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = Some(timeout);
        self
    }

    /// Set the namespace prefix applied to every metric name.
    ///
    /// The namespace is concatenated directly in front of the metric name, with no inserted
    /// delimiter: include a trailing separator (conventionally `.`) yourself if you want one.
    ///
    /// Defaults to no namespace.
    #[must_use]
    pub fn with_namespace<S>(mut self, namespace: S) -> Self
    where
        S: Into<String>,
    {
        self.namespace = namespace.into();
        self
    }

    /// Set the global tags added to every metric and event.
    ///
    /// Global tags are written ahead of call-specific tags, in the order given here.
    ///
    /// Defaults to no global tags.
    #[must_use]
    pub fn with_global_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.global_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Builds the client.
    ///
    /// This opens the datagram socket and associates it with the configured remote address.
    ///
    /// # Errors
    ///
    /// If the socket cannot be opened or associated with the remote address, an error is
    /// returned.
    pub fn build(self) -> Result<Client, BuildError> {
        let transport = Transport::connect(&self.remote_addr, self.write_timeout)?;
        Ok(Client::from_parts(transport, self.namespace, self.global_tags))
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        ClientBuilder {
            remote_addr: RemoteAddr::Udp(vec![SocketAddr::from(([127, 0, 0, 1], 8125))]),
            write_timeout: None,
            namespace: String::new(),
            global_tags: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BuildError, ClientBuilder};

    #[test]
    fn invalid_remote_address() {
        match ClientBuilder::default().with_remote_address("not a valid address") {
            Err(BuildError::InvalidRemoteAddress { .. }) => {}
            _ => panic!("expected invalid remote address error"),
        }
    }
}
