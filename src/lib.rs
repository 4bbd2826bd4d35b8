#![warn(missing_docs)]
//! Skywatch notifies subscribers when aircraft enter their monitored area,
//! polling an OpenSky-style flight-state feed.

pub mod config;
pub mod engine;
pub mod geo;
pub mod http_client;
pub mod http_server;
pub mod models;
pub mod notifier;
pub mod persistence;
pub mod source;
pub mod supervisor;
pub mod test_helpers;
