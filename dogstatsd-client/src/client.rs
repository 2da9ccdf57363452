use std::{io, time::Duration};

use crate::{
    builder::{BuildError, ClientBuilder},
    transport::Transport,
    writer::{MetricType, MetricValue, PayloadWriter},
};

/// A DogStatsD client.
///
/// A client owns one datagram socket to the configured agent, along with the namespace prefix
/// and global tags applied to everything it sends. Every non-sampled-out call to one of the
/// metric methods ([`gauge`][Self::gauge], [`count`][Self::count],
/// [`histogram`][Self::histogram], [`timer`][Self::timer], [`set`][Self::set]) or to
/// [`event`][Self::event] performs exactly one datagram write: no buffering, no batching, no
/// retry. A write error is returned to the caller verbatim.
///
/// Sending takes `&self`, so a client can be shared across threads; reconfiguring the namespace
/// or global tags takes `&mut self` and therefore requires exclusive access.
pub struct Client {
    transport: Transport,
    namespace: String,
    global_tags: Vec<String>,
}

impl Client {
    /// Creates a client sending to the given remote address.
    ///
    /// This is shorthand for [`ClientBuilder`] with only the remote address set. The address
    /// must be in the format of `<host>:<port>`, e.g. `127.0.0.1:8125`.
    ///
    /// # Errors
    ///
    /// If the address cannot be parsed, or the datagram socket cannot be opened, an error is
    /// returned.
    pub fn new<A>(addr: A) -> Result<Self, BuildError>
    where
        A: AsRef<str>,
    {
        ClientBuilder::default().with_remote_address(addr)?.build()
    }

    pub(crate) fn from_parts(
        transport: Transport,
        namespace: String,
        global_tags: Vec<String>,
    ) -> Self {
        Client { transport, namespace, global_tags }
    }

    /// Sets the namespace prefix applied to every metric name.
    ///
    /// The namespace is concatenated directly in front of the metric name, with no inserted
    /// delimiter: include a trailing separator (conventionally `.`) yourself if you want one.
    /// Takes effect on all subsequent sends.
    pub fn set_namespace<S>(&mut self, namespace: S)
    where
        S: Into<String>,
    {
        self.namespace = namespace.into();
    }

    /// Replaces the global tags added to every metric and event.
    ///
    /// Global tags are written ahead of call-specific tags, in the order given here. Takes
    /// effect on all subsequent sends.
    pub fn set_global_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.global_tags = tags.into_iter().map(Into::into).collect();
    }

    /// Measures the value of a metric at a particular time.
    ///
    /// # Errors
    ///
    /// If the datagram write fails, the transport error is returned verbatim.
    pub fn gauge(&self, name: &str, value: f64, tags: &[&str], rate: f64) -> io::Result<()> {
        self.send_metric(name, MetricValue::FloatingPoint(value), MetricType::Gauge, tags, rate)
    }

    /// Tracks how many times something happened.
    ///
    /// # Errors
    ///
    /// If the datagram write fails, the transport error is returned verbatim.
    pub fn count(&self, name: &str, value: i64, tags: &[&str], rate: f64) -> io::Result<()> {
        self.send_metric(name, MetricValue::Integer(value), MetricType::Count, tags, rate)
    }

    /// Tracks the statistical distribution of a set of values.
    ///
    /// # Errors
    ///
    /// If the datagram write fails, the transport error is returned verbatim.
    pub fn histogram(&self, name: &str, value: f64, tags: &[&str], rate: f64) -> io::Result<()> {
        self.send_metric(
            name,
            MetricValue::FloatingPoint(value),
            MetricType::Histogram,
            tags,
            rate,
        )
    }

    /// Tracks the statistical distribution of a set of durations.
    ///
    /// The duration is converted to fractional milliseconds before encoding, so 44 876
    /// microseconds goes out as `44.876`.
    ///
    /// # Errors
    ///
    /// If the datagram write fails, the transport error is returned verbatim.
    pub fn timer(&self, name: &str, value: Duration, tags: &[&str], rate: f64) -> io::Result<()> {
        let millis = value.as_nanos() as f64 / 1_000_000.0;
        self.send_metric(name, MetricValue::FloatingPoint(millis), MetricType::Timer, tags, rate)
    }

    /// Counts the number of unique elements in a group.
    ///
    /// # Errors
    ///
    /// If the datagram write fails, the transport error is returned verbatim.
    pub fn set(&self, name: &str, value: &str, tags: &[&str], rate: f64) -> io::Result<()> {
        self.send_metric(name, MetricValue::Raw(value), MetricType::Set, tags, rate)
    }

    /// Posts to the event stream.
    ///
    /// Events are never sampled; every call performs one datagram write. The client's global
    /// tags are merged ahead of `tags`, exactly as for metrics, but the namespace does not
    /// apply to event titles.
    ///
    /// # Errors
    ///
    /// If the datagram write fails, the transport error is returned verbatim.
    pub fn event(&self, title: &str, text: &str, tags: &[&str]) -> io::Result<()> {
        let mut writer = PayloadWriter::new();
        writer.write_event(title, text, &self.global_tags, tags);
        self.transport.send(writer.payload())
    }

    /// Closes the connection to the agent.
    ///
    /// Consumes the client, so sending after close is rejected at compile time rather than
    /// being a runtime error.
    ///
    /// # Errors
    ///
    /// Releasing a datagram socket cannot currently fail; the `Result` mirrors the transport
    /// contract.
    pub fn close(self) -> io::Result<()> {
        drop(self.transport);
        Ok(())
    }

    fn send_metric(
        &self,
        name: &str,
        value: MetricValue<'_>,
        metric_type: MetricType,
        tags: &[&str],
        rate: f64,
    ) -> io::Result<()> {
        if rate < 1.0 && !sampled_in(rate, &mut rand::rng()) {
            // A sampled-out call is a successful no-op, not an error.
            return Ok(());
        }

        let mut writer = PayloadWriter::new();
        writer.write_metric(
            &self.namespace,
            name,
            value,
            metric_type,
            (rate < 1.0).then_some(rate),
            &self.global_tags,
            tags,
        );

        self.transport.send(writer.payload())
    }
}

// One uniform draw in [0, 1) per call; strictly less than the rate means the call is sent.
fn sampled_in<R>(rate: f64, rng: &mut R) -> bool
where
    R: rand::Rng + ?Sized,
{
    rng.random::<f64>() < rate
}
