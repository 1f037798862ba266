//! The `fdcat` stream consumer.
//!
//! [`App`] writes every chunk to an output, optionally throttling the stream
//! by pausing after each chunk and resuming from a timer task. It keeps the
//! first failure so the process can exit with it once `close` arrives.

use anyhow::{Context, Result};
use fdstream::{StreamControl, StreamEvent, StreamListener, StreamState};
use std::io::Write;
use std::time::Duration;

/// Stream listener that copies chunk payloads to `out`.
pub struct App<W> {
    out: W,
    label: String,
    throttle: Option<Duration>,
    bytes_written: u64,
    chunks: usize,
    error: Option<anyhow::Error>,
}

impl<W: Write> App<W> {
    /// Create a consumer writing to `out`. `label` names the source in
    /// error messages.
    pub fn new(out: W, label: impl Into<String>) -> Self {
        Self {
            out,
            label: label.into(),
            throttle: None,
            bytes_written: 0,
            chunks: 0,
            error: None,
        }
    }

    /// Pause after every chunk and resume after `delay`.
    ///
    /// Must be used from within a tokio runtime.
    pub fn with_throttle(mut self, delay: Duration) -> Self {
        self.throttle = Some(delay);
        self
    }

    /// Bytes written so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Data events received so far.
    pub fn chunks(&self) -> usize {
        self.chunks
    }

    /// Turn the terminal state into the command result.
    ///
    /// # Errors
    ///
    /// Returns the first stream or output error, or an error when the stream
    /// stopped without one being reported.
    pub fn finish(self, state: StreamState) -> Result<()> {
        if let Some(error) = self.error {
            return Err(error);
        }
        if state != StreamState::Closed {
            anyhow::bail!("Reading {} stopped early ({})", self.label, state);
        }
        Ok(())
    }

    fn record(&mut self, error: anyhow::Error) {
        log::debug!("{:#}", error);
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn write(&mut self, bytes: &[u8], control: &StreamControl) {
        if let Err(e) = self.out.write_all(bytes) {
            let label = self.label.clone();
            self.record(anyhow::Error::new(e).context(format!("Writing data read from {}", label)));
            control.destroy();
            return;
        }
        self.bytes_written += bytes.len() as u64;

        if let Some(delay) = self.throttle {
            control.pause();
            let control = control.clone();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                control.resume();
            });
        }
    }
}

impl<W, D, E> StreamListener<D, E> for App<W>
where
    W: Write,
    D: core::fmt::Debug,
    E: core::error::Error + Send + Sync + 'static,
{
    fn on_event(&mut self, event: StreamEvent<D, E>, control: &StreamControl) {
        match event {
            StreamEvent::Open(fd) => log::info!("open {} as {:?}", self.label, fd),
            StreamEvent::Data(data) => {
                self.chunks += 1;
                log::info!("data {} bytes at offset {}", data.len(), data.offset());
                self.write(data.as_bytes(), control);
            }
            StreamEvent::End => {
                log::info!("end after {} bytes", self.bytes_written);
                let flushed = self
                    .out
                    .flush()
                    .with_context(|| format!("Flushing output for {}", self.label));
                if let Err(e) = flushed {
                    self.record(e);
                }
            }
            StreamEvent::Error(e) => {
                log::info!("error {}", e);
                let label = self.label.clone();
                self.record(anyhow::Error::new(e).context(format!("Reading {}", label)));
            }
            StreamEvent::Close => log::info!("close {}", self.label),
        }
    }
}
