//! FileSink - writes the overlay plan to disk
//!
//! Layout under `base_path`:
//! - `overlay_header.json`: generation time, sink name and the overlay header
//! - `overlay_frames.jsonl`: one overlay frame per line

use chrono::{DateTime, Utc};
use contracts::{ContractError, DataSink, OverlayFrame, OverlayHeader};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, error, instrument};

pub const HEADER_FILE: &str = "overlay_header.json";
pub const FRAMES_FILE: &str = "overlay_frames.jsonl";

#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Output directory, created if missing
    pub base_path: PathBuf,
}

impl FileSinkConfig {
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let base_path = params
            .get("base_path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./output"));

        Self { base_path }
    }
}

#[derive(Serialize)]
struct HeaderDocument<'a> {
    generated_at: DateTime<Utc>,
    sink: &'a str,
    header: &'a OverlayHeader,
}

/// Sink that persists the overlay as JSON files
pub struct FileSink {
    name: String,
    config: FileSinkConfig,
    frames: Option<BufWriter<File>>,
    written: usize,
}

impl FileSink {
    pub fn new(name: impl Into<String>, config: FileSinkConfig) -> std::io::Result<Self> {
        fs::create_dir_all(&config.base_path)?;

        Ok(Self {
            name: name.into(),
            config,
            frames: None,
            written: 0,
        })
    }

    /// Create from a sink's `params` map
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        Self::new(name, FileSinkConfig::from_params(params))
    }

    pub fn header_path(&self) -> PathBuf {
        self.config.base_path.join(HEADER_FILE)
    }

    pub fn frames_path(&self) -> PathBuf {
        self.config.base_path.join(FRAMES_FILE)
    }

    fn write_header(&mut self, header: &OverlayHeader) -> std::io::Result<()> {
        let document = HeaderDocument {
            generated_at: Utc::now(),
            sink: &self.name,
            header,
        };
        let mut writer = BufWriter::new(File::create(self.header_path())?);
        serde_json::to_writer_pretty(&mut writer, &document)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writer.flush()?;

        self.frames = Some(BufWriter::new(File::create(self.frames_path())?));
        Ok(())
    }

    fn append_frame(&mut self, frame: &OverlayFrame) -> std::io::Result<()> {
        let writer = self.frames.as_mut().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotConnected, "sink was not opened")
        })?;
        serde_json::to_writer(&mut *writer, frame)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    fn sink_error(&self, e: std::io::Error) -> ContractError {
        error!(sink = %self.name, error = %e, "File sink I/O failed");
        ContractError::sink_write(&self.name, e.to_string())
    }
}

impl DataSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_open",
        skip(self, header),
        fields(sink = %self.name, base_path = %self.config.base_path.display())
    )]
    async fn open(&mut self, header: &OverlayHeader) -> Result<(), ContractError> {
        self.write_header(header).map_err(|e| self.sink_error(e))
    }

    async fn write(&mut self, frame: &OverlayFrame) -> Result<(), ContractError> {
        self.append_frame(frame).map_err(|e| self.sink_error(e))
    }

    #[instrument(name = "file_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        match self.frames.as_mut() {
            Some(writer) => writer.flush().map_err(|e| self.sink_error(e)),
            None => Ok(()),
        }
    }

    #[instrument(name = "file_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        if let Some(mut writer) = self.frames.take() {
            writer.flush().map_err(|e| self.sink_error(e))?;
        }
        debug!(sink = %self.name, frames = self.written, "FileSink closed");
        Ok(())
    }
}
