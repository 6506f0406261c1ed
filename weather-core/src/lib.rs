//! Core library for the `weather` report CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weather record model, unit conversions and rendering
//! - A single-location fetcher over the provider's HTTP API
//! - Batch orchestration (sequential or bounded-concurrent) with order
//!   preservation and per-location failures
//! - Wall-clock instrumentation for comparing strategies
//!
//! It is used by `weather-cli`, but can also be reused by other binaries or services.

pub mod batch;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod model;
pub mod timing;
pub mod units;

pub use batch::{BatchOrchestrator, BatchSummary, FetchMode, FetchOutcome};
pub use config::{Config, FetchSettings};
pub use error::{ConfigError, FailureKind, FetchError};
pub use fetcher::{OpenWeatherFetcher, WeatherFetcher};
pub use model::{Condition, Coordinates, WeatherRecord};
pub use timing::timed;
