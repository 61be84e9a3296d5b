//! Feed event handlers and telemetry sinks

pub mod console;
pub mod composite;
pub mod status;

// Re-export for convenience
pub use console::{ConsoleFeedHandler, TracingTelemetry};
pub use composite::{CompositeFeedHandler, CompositeTelemetry};
pub use status::FeedStatusHandler;
