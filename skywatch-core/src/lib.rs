//! Core library for the `skywatch` weather aggregator.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The pluggable backend contract and its registry
//! - Generic time-series decoding for provider observation arrays
//! - The normalized output model shared by all backends
//!
//! It is used by `skywatch-cli`, but can also be reused by other binaries or services.

pub mod backend;
pub mod config;
pub mod model;
pub mod timeseries;

pub use backend::{Backend, BackendRegistry, FetchError};
pub use config::{BackendConfig, Config};
pub use model::{CurrentConditions, HourlyPoint, NormalizedOutput};
pub use timeseries::{TimeSeriesValue, TimestampFormatError};
