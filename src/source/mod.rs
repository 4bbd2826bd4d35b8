//! The flight-state feed interface and its OpenSky-style implementation.

pub mod opensky;
pub mod traits;

pub use traits::{FlightSource, SourceError};
