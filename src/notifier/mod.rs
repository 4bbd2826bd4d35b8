//! The notification sink interface, the webhook implementation and the alert
//! text formatter.

pub mod format;
pub mod traits;
pub mod webhook;

pub use traits::{NotificationSink, SinkError};
