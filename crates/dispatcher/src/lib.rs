//! # Dispatcher
//!
//! Renderer-side output of the overlay plan.
//!
//! Responsibilities:
//! - Fan the plan out to every configured sink
//! - Give each sink its own bounded queue and worker task
//! - Keep a failing sink from affecting the others

pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod sinks;

pub use contracts::{DataSink, OverlayFrame, OverlayHeader, OverlayPlan};
pub use dispatcher::{
    create_dispatcher, DispatchReport, Dispatcher, DispatcherBuilder, DispatcherConfig,
};
pub use error::DispatcherError;
pub use handle::SinkHandle;
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use sinks::{FileSink, FileSinkConfig, LogSink};
