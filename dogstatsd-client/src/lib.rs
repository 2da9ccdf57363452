//! A client for sending metrics and events to a [DogStatsD][dsd]-compatible agent.
//!
//! [dsd]: https://docs.datadoghq.com/developers/dogstatsd/
//!
//! DogStatsD extends StatsD with tags and histograms. This crate speaks the tagged wire format
//! over a connectionless datagram transport (UDP, or a Unix datagram socket on Linux): every
//! metric or event is encoded into a single payload and written to the agent as one datagram,
//! with no buffering, batching, or retry.
//!
//! # Usage
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use dogstatsd_client::Client;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Create the client.
//! let mut client = Client::new("127.0.0.1:8125")?;
//!
//! // Prefix every metric with the app name, and tag everything with the availability zone.
//! client.set_namespace("flubber.");
//! client.set_global_tags(["us-east-1a"]);
//!
//! client.gauge("request.duration", 1.2, &[], 1.0)?;
//! client.timer("db.query", Duration::from_millis(14), &["table:users"], 0.5)?;
//! client.event("deploy", "version 1.2.3 is live", &[])?;
//!
//! client.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! ## Sampling
//!
//! Every metric method takes a sample rate in `(0, 1]`. A rate of one always sends. A lower
//! rate performs one uniform draw per call: sampled-in calls go out carrying a `|@<rate>`
//! token so the agent can scale counts back up, and sampled-out calls are successful no-ops
//! that write nothing. This is a per-call Bernoulli trial, so callers relying on exact
//! statistical counts must account for variance.
//!
//! ## Tags and namespacing
//!
//! A client carries a namespace prefix and a list of global tags. The namespace is written
//! verbatim in front of every metric name (bring your own trailing `.`), and global tags are
//! merged ahead of call-specific tags on every metric and event. Neither names, values, nor
//! tags are escaped or validated -- what you pass is what goes on the wire.
//!
//! ## Process-wide client
//!
//! The [`global`] module holds an explicitly-configured process-wide client behind free
//! functions, for applications that don't want to thread a [`Client`] through every call
//! site.
//!
//! # Missing
//!
//! ## Aggregation and batching
//!
//! Multi-metric payloads, client-side aggregation, and `|T` timestamps (DSD v1.1/v1.3) are
//! deliberately out of scope: each call maps to exactly one datagram.
//!
//! ## Container ID detection
//!
//! We do not support container ID detection (DSD v1.2) which is used to help aid the
//! downstream DogStatsD server in enriching the metrics with additional metadata relevant to
//! the host/application emitting the metrics.

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![deny(missing_docs)]

mod builder;
pub use self::builder::{BuildError, ClientBuilder};

mod client;
pub use self::client::Client;

pub mod global;

mod transport;
mod writer;
