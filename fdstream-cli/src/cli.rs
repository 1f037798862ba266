//! Command-line definition and entry point for `fdcat`.

use crate::app::App;
use crate::source_spec::{ByteSpan, SourceSpec, parse_span};
use anyhow::{Context, Result};
use clap::Parser;
use fdstream::{BufferSize, RawOptions, ReadStream};
use fdstream_platform::PosixFiles;
use std::convert::Infallible;
use std::time::Duration;

/// Print a byte range of a file or an inherited descriptor.
#[derive(Parser, Debug)]
#[command(name = "fdcat")]
#[command(about = "Print a byte range of a file or an inherited descriptor")]
#[command(version)]
pub struct Cli {
    /// What to read: a path, `fd:N` for an open descriptor, or `-` for stdin
    pub source: SourceSpec,

    /// Inclusive byte range, e.g. `10-19`, `10-` or `-19`
    #[arg(
        long,
        value_name = "A-B",
        value_parser = parse_span,
        allow_hyphen_values = true,
        conflicts_with_all = ["start", "end"]
    )]
    pub range: Option<ByteSpan>,

    /// First byte to print (inclusive)
    #[arg(long)]
    pub start: Option<u64>,

    /// Last byte to print (inclusive)
    #[arg(long)]
    pub end: Option<u64>,

    /// Bytes per read; zero, negative or unparsable values use the default
    #[arg(long, env = "FDCAT_BUFFER_SIZE", value_parser = parse_buffer_size, allow_hyphen_values = true)]
    pub buffer_size: Option<BufferSize>,

    /// Decode the input as text in this encoding (e.g. `utf8`)
    #[arg(long)]
    pub encoding: Option<String>,

    /// Leave the descriptor open at the end and on error
    #[arg(long)]
    pub no_auto_close: bool,

    /// Pause after every chunk for this many milliseconds
    #[arg(long, value_name = "MS")]
    pub throttle_ms: Option<u64>,

    /// Log every stream event to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_buffer_size(raw: &str) -> Result<BufferSize, Infallible> {
    Ok(BufferSize::parse_lossy(raw))
}

impl Cli {
    /// The stream options these flags describe.
    pub fn raw_options(&self) -> RawOptions {
        let span = self.range.unwrap_or(ByteSpan {
            start: self.start,
            end: self.end,
        });

        RawOptions {
            start: span.start,
            end: span.end,
            buffer_size: self.buffer_size.map(|size| size.get() as f64),
            encoding: self.encoding.clone(),
            auto_close: Some(!self.no_auto_close),
            emit_close: Some(true),
        }
    }
}

/// Run `fdcat`.
pub async fn run(cli: Cli) -> Result<()> {
    let options = cli.raw_options();
    let source = cli.source.to_source();
    let mut stream = ReadStream::with_options(PosixFiles::new(), source, &options)
        .with_context(|| format!("Invalid options for {}", cli.source))?;
    log::debug!("{:?}", stream);

    let mut app = App::new(std::io::stdout().lock(), cli.source.to_string());
    if let Some(ms) = cli.throttle_ms {
        app = app.with_throttle(Duration::from_millis(ms));
    }

    let state = stream.run(&mut app).await;
    log::debug!(
        "{} bytes in {} chunks, stream {}",
        app.bytes_written(),
        app.chunks(),
        state
    );
    app.finish(state)
}
