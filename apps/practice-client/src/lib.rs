//! HTTP front end for the practice core.
//!
//! [`ApiClient`] implements the core's `Scheduler` and `ImportSource`
//! traits against the practice service, and [`ImportPoller`] follows a
//! quiz's import job in the background until it settles.

mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod poller;
pub mod telemetry;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use poller::{Clock, ImportPoller, PollConfig, PollHandle, PollOutcome, TokioClock};
