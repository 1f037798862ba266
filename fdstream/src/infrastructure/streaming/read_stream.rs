//! The read stream driver.

use crate::{
    domain::{
        Chunk, ChunkReader, ConfigError, DescriptorHandle, FileAccess, Lifecycle, RangeValidator,
        RawOptions, ReadCursor, ReadOutcome, Source, StreamConfig, StreamError, StreamState,
        TextDecoder,
    },
    infrastructure::streaming::{
        ChunkData, FlowController, Gate, StreamControl, StreamEvent, StreamListener,
    },
};
use std::path::Path;

/// How the read loop stopped when it did not fail.
enum Stop {
    /// The range is exhausted.
    End,
    /// The consumer asked for teardown.
    Destroy,
}

/// Reads a byte range of one file as a sequence of chunks.
///
/// The stream is driven by [`run`](Self::run), which performs every read
/// and delivers every event before returning the terminal state. Each
/// read is issued at an explicit offset, so a caller-supplied descriptor
/// is never moved.
///
/// # Type Parameters
///
/// - `F`: The file access port implementation
///
/// # Disposal
///
/// | outcome | descriptor |
/// |---------|------------|
/// | end, `auto_close` | released (adopted ones too) |
/// | end, no `auto_close` | left open, handle untouched |
/// | error, owned or `auto_close` | released |
/// | error, adopted without `auto_close` | left open, handle untouched |
/// | [`StreamControl::destroy`] | released |
///
/// # Examples
///
/// ```
/// use fdstream::adapters::MemoryFiles;
/// use fdstream::domain::{Source, StreamConfig, StreamState};
/// use fdstream::infrastructure::{ReadStream, StreamControl, StreamEvent};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let files = MemoryFiles::new();
/// files.insert("/x.txt", b"xyz\n".to_vec());
///
/// let config = StreamConfig::builder(Source::Path("/x.txt".into()))
///     .start(1)
///     .end(2)
///     .build()
///     .unwrap();
/// let mut stream = ReadStream::new(files, config);
///
/// let mut out = Vec::new();
/// let state = stream
///     .run(&mut |event: StreamEvent<_, _>, _: &StreamControl| {
///         if let StreamEvent::Data(data) = event {
///             out.extend_from_slice(data.as_bytes());
///         }
///     })
///     .await;
///
/// assert_eq!(state, StreamState::Closed);
/// assert_eq!(out, b"yz");
/// assert_eq!(stream.bytes_read(), 2);
/// # });
/// ```
pub struct ReadStream<F: FileAccess> {
    files: F,
    config: StreamConfig<F::Descriptor>,
    handle: DescriptorHandle<F::Descriptor>,
    cursor: ReadCursor,
    reader: ChunkReader,
    decoder: Option<TextDecoder>,
    flow: FlowController,
    control: StreamControl,
    lifecycle: Lifecycle,
}

impl<F: FileAccess> ReadStream<F> {
    /// Create a stream. No I/O happens until [`run`](Self::run).
    pub fn new(files: F, config: StreamConfig<F::Descriptor>) -> Self {
        let handle = match config.source() {
            Source::Path(_) => DescriptorHandle::unopened(),
            Source::Descriptor(descriptor) => DescriptorHandle::adopt(*descriptor),
        };
        let flow = FlowController::new();

        Self {
            cursor: ReadCursor::new(&config.range()),
            reader: ChunkReader::new(config.buffer_size()),
            decoder: config.encoding().map(TextDecoder::new),
            control: flow.control(),
            flow,
            handle,
            files,
            config,
            lifecycle: Lifecycle::new(),
        }
    }

    /// Create a stream from a loosely-typed option bag.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for an invalid range or encoding; no I/O is
    /// performed in that case.
    pub fn with_options(
        files: F,
        source: Source<F::Descriptor>,
        options: &RawOptions,
    ) -> Result<Self, ConfigError> {
        let config = RangeValidator::validate(source, options)?;
        Ok(Self::new(files, config))
    }

    /// A handle for pausing, resuming or destroying the stream from another
    /// task.
    pub fn control(&self) -> StreamControl {
        self.control.clone()
    }

    /// The validated configuration.
    #[inline]
    pub fn config(&self) -> &StreamConfig<F::Descriptor> {
        &self.config
    }

    /// Current lifecycle state.
    #[inline]
    pub fn state(&self) -> StreamState {
        self.lifecycle.state()
    }

    /// Bytes read from the file so far.
    #[inline]
    pub fn bytes_read(&self) -> u64 {
        self.cursor.bytes_read()
    }

    /// The descriptor, once available.
    #[inline]
    pub fn fd(&self) -> Option<F::Descriptor> {
        self.handle.descriptor()
    }

    /// The path being read, when the stream was created from one.
    #[inline]
    pub fn path(&self) -> Option<&Path> {
        self.config.source().path()
    }

    /// Whether the descriptor is still being waited for.
    #[inline]
    pub fn pending(&self) -> bool {
        self.handle.descriptor().is_none()
    }

    /// Whether the descriptor wrapper has been closed.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.handle.is_closed()
    }

    /// Whether the stream has been destroyed.
    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.handle.is_destroyed()
    }

    /// Drive the stream to completion, delivering events to `listener`.
    ///
    /// Returns the terminal state: [`StreamState::Closed`] after a normal
    /// end, [`StreamState::Errored`] or [`StreamState::Destroyed`] otherwise.
    /// Calling `run` again after it has returned emits nothing.
    pub async fn run<L>(&mut self, listener: &mut L) -> StreamState
    where
        L: StreamListener<F::Descriptor, F::Error>,
    {
        if self.lifecycle.state() != StreamState::Idle {
            log::warn!("run called on a {} stream", self.lifecycle.state());
            return self.lifecycle.state();
        }

        match self.drive(listener).await {
            Ok(Stop::End) => self.end(listener).await,
            Ok(Stop::Destroy) => self.teardown(listener).await,
            Err(error) => self.fail(error, listener).await,
        }

        self.flow.finish();
        if self.config.emit_close() {
            self.emit(listener, StreamEvent::Close);
        }
        self.lifecycle.state()
    }

    fn emit<L>(&self, listener: &mut L, event: StreamEvent<F::Descriptor, F::Error>)
    where
        L: StreamListener<F::Descriptor, F::Error>,
    {
        log::trace!("emit {}", event.name());
        listener.on_event(event, &self.control);
    }

    async fn drive<L>(&mut self, listener: &mut L) -> Result<Stop, StreamError<F::Error>>
    where
        L: StreamListener<F::Descriptor, F::Error>,
    {
        self.lifecycle.transition(StreamState::Opening);
        let descriptor = match self.config.source() {
            Source::Path(path) => self
                .handle
                .open(&self.files, path)
                .await
                .map_err(|source| StreamError::Open {
                    path: path.clone(),
                    source,
                })?,
            Source::Descriptor(_) => self.handle.descriptor().ok_or(StreamError::NotOpen)?,
        };

        self.lifecycle.transition(StreamState::Open);
        self.emit(listener, StreamEvent::Open(descriptor));
        self.lifecycle.transition(StreamState::Reading);

        loop {
            if self.gate().await == Gate::Destroy {
                return Ok(Stop::Destroy);
            }
            if let Some(chunk) = self.flow.take_pending() {
                self.deliver(chunk, listener)?;
                continue;
            }

            let outcome = self
                .reader
                .read_next(&self.files, &self.handle, &mut self.cursor)
                .await?;
            if self.flow.destroy_requested() {
                return Ok(Stop::Destroy);
            }

            match outcome {
                ReadOutcome::Chunk(chunk) => {
                    if let Some(chunk) = self.flow.admit(chunk) {
                        self.deliver(chunk, listener)?;
                    }
                }
                ReadOutcome::Eof => {
                    // `end` waits for a paused consumer like data does
                    if self.gate().await == Gate::Destroy {
                        return Ok(Stop::Destroy);
                    }
                    return Ok(Stop::End);
                }
            }
        }
    }

    /// Wait while paused. Moves through [`StreamState::Paused`] when it
    /// actually has to wait.
    async fn gate(&mut self) -> Gate {
        if self.flow.destroy_requested() {
            return Gate::Destroy;
        }
        if !self.flow.is_paused() {
            return Gate::Flow;
        }

        self.lifecycle.transition(StreamState::Paused);
        let gate = self.flow.wait_until_flowing().await;
        if gate == Gate::Flow {
            self.lifecycle.transition(StreamState::Reading);
        }
        gate
    }

    fn deliver<L>(&mut self, chunk: Chunk, listener: &mut L) -> Result<(), StreamError<F::Error>>
    where
        L: StreamListener<F::Descriptor, F::Error>,
    {
        let data = match &mut self.decoder {
            None => ChunkData::Bytes(chunk),
            Some(decoder) => match decoder.decode(&chunk).map_err(StreamError::Decode)? {
                Some(text) => ChunkData::Text(text),
                // Only part of a character so far
                None => return Ok(()),
            },
        };
        self.emit(listener, StreamEvent::Data(data));
        Ok(())
    }

    async fn end<L>(&mut self, listener: &mut L)
    where
        L: StreamListener<F::Descriptor, F::Error>,
    {
        self.lifecycle.transition(StreamState::Ending);
        if let Some(decoder) = &mut self.decoder {
            if let Err(error) = decoder.finish() {
                return self.fail(StreamError::Decode(error), listener).await;
            }
        }

        self.emit(listener, StreamEvent::End);

        if self.config.auto_close() {
            if let Err(error) = self.handle.destroy(&self.files, true).await {
                log::warn!("closing descriptor after end failed: {}", error);
                self.emit(listener, StreamEvent::Error(StreamError::Close(error)));
                self.lifecycle.transition(StreamState::Destroyed);
                return;
            }
        }
        self.lifecycle.transition(StreamState::Closed);
    }

    async fn fail<L>(&mut self, error: StreamError<F::Error>, listener: &mut L)
    where
        L: StreamListener<F::Descriptor, F::Error>,
    {
        log::debug!("stream failed: {}", error);

        let dispose = self.handle.is_owned() || self.config.auto_close();
        let close_error = if dispose {
            self.handle.destroy(&self.files, true).await.err()
        } else {
            None
        };

        self.emit(listener, StreamEvent::Error(error));
        if let Some(close_error) = close_error {
            log::warn!("closing descriptor after error failed: {}", close_error);
            self.emit(listener, StreamEvent::Error(StreamError::Close(close_error)));
        }

        self.lifecycle.transition(if dispose {
            StreamState::Destroyed
        } else {
            StreamState::Errored
        });
    }

    async fn teardown<L>(&mut self, listener: &mut L)
    where
        L: StreamListener<F::Descriptor, F::Error>,
    {
        log::debug!("destroy requested at offset {}", self.cursor.position());
        if let Err(error) = self.handle.destroy(&self.files, true).await {
            log::warn!("closing descriptor on destroy failed: {}", error);
            self.emit(listener, StreamEvent::Error(StreamError::Close(error)));
        }
        self.lifecycle.transition(StreamState::Destroyed);
    }
}

impl<F: FileAccess> core::fmt::Debug for ReadStream<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ReadStream")
            .field("source", self.config.source())
            .field("range", &self.config.range())
            .field("state", &self.lifecycle.state())
            .field("position", &self.cursor.position())
            .field("handle", &self.handle)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MemoryFd, MemoryError, MemoryFiles};

    type Event = StreamEvent<MemoryFd, MemoryError>;

    fn names(events: &[Event]) -> Vec<&'static str> {
        events.iter().map(Event::name).collect()
    }

    #[tokio::test]
    async fn test_events_in_order() {
        let files = MemoryFiles::new();
        files.insert("/abc", b"abcdef".to_vec());
        let config = StreamConfig::builder(Source::Path("/abc".into()))
            .buffer_size(4)
            .build()
            .unwrap();
        let mut stream = ReadStream::new(files.clone(), config);

        let mut events = Vec::new();
        let state = stream
            .run(&mut |event: Event, _: &StreamControl| events.push(event))
            .await;

        assert_eq!(state, StreamState::Closed);
        assert_eq!(names(&events), ["open", "data", "data", "end", "close"]);
        assert!(stream.is_closed());
        assert!(stream.is_destroyed());
        assert_eq!(files.close_count(), 1);
    }

    #[tokio::test]
    async fn test_second_run_is_a_noop() {
        let files = MemoryFiles::new();
        files.insert("/a", b"a".to_vec());
        let mut stream =
            ReadStream::with_options(files, Source::Path("/a".into()), &RawOptions::default())
                .unwrap();

        let mut count = 0;
        stream.run(&mut |_: Event, _: &StreamControl| count += 1).await;
        let first = count;
        let state = stream.run(&mut |_: Event, _: &StreamControl| count += 1).await;

        assert_eq!(state, StreamState::Closed);
        assert_eq!(count, first);
    }

    #[tokio::test]
    async fn test_accessors_before_run() {
        let files = MemoryFiles::new();
        let stream = ReadStream::with_options(
            files,
            Source::Path("/x.txt".into()),
            &RawOptions {
                start: Some(1),
                ..RawOptions::default()
            },
        )
        .unwrap();

        assert_eq!(stream.state(), StreamState::Idle);
        assert!(stream.pending());
        assert_eq!(stream.fd(), None);
        assert_eq!(stream.path(), Some(Path::new("/x.txt")));
        assert_eq!(stream.bytes_read(), 0);
    }

    #[tokio::test]
    async fn test_adopted_descriptor_is_not_pending() {
        let files = MemoryFiles::new();
        let fd = files.adopt_bytes(b"x".to_vec());
        let config = StreamConfig::builder(Source::Descriptor(fd)).build().unwrap();
        let stream = ReadStream::new(files, config);

        assert!(!stream.pending());
        assert_eq!(stream.fd(), Some(fd));
        assert_eq!(stream.path(), None);
    }
}
