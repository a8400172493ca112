//! Sink implementations
//!
//! Contains LogSink and FileSink.

mod file;
mod log;

pub use self::file::{FileSink, FileSinkConfig, FRAMES_FILE, HEADER_FILE};
pub use self::log::LogSink;
