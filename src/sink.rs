//! Batched output for matched paths.
//!
//! Traversal workers push matches into a channel through a [`SinkHandle`].
//! A single consumer thread drains the channel, groups paths into batches and
//! writes each batch to the output with one `write_all`, so console I/O never
//! serializes the walk.
//!
//! Shutdown is "stop producing, then drain": once every producer is done, call
//! [`ResultSink::request_drain_and_stop`] and then
//! [`DrainingSink::await_stopped`]. The consumer only exits after the channel is
//! closed *and* empty, so nothing enqueued before the close is lost.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use tracing::{debug, trace, warn};

use crate::error::FanscanError;

/// Lines per bulk write.
pub const DEFAULT_BATCH_SIZE: usize = 128;

/// How long a partial batch may sit before it is written anyway.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(100);

// ---------------------------------------------------------------------------
// Options / summary
// ---------------------------------------------------------------------------

/// Consumer tuning.
#[derive(Debug, Clone)]
pub struct SinkOptions {
    /// Paths per bulk write. Must be at least 1.
    pub batch_size: usize,

    /// `None` for an unbounded queue; `Some(n)` makes `enqueue` wait while
    /// `n` paths are already pending.
    pub capacity: Option<usize>,

    /// Partial batches are written after this much idle time.
    pub flush_interval: Duration,

    /// Keep every drained path in [`SinkSummary::paths`].
    pub collect_paths: bool,
}

impl Default for SinkOptions {
    fn default() -> Self {
        Self {
            batch_size:     DEFAULT_BATCH_SIZE,
            capacity:       None,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            collect_paths:  false,
        }
    }
}

/// What the consumer did, returned once it has stopped.
#[derive(Debug, Default)]
pub struct SinkSummary {
    /// Paths drained from the queue. Equals the number of lines written
    /// when an output was attached and never failed.
    pub lines_written: u64,

    /// Bulk writes performed.
    pub batches_written: u64,

    /// Drained paths in drain order, if collection was enabled.
    pub paths: Vec<PathBuf>,
}

// ---------------------------------------------------------------------------
// Producer side
// ---------------------------------------------------------------------------

/// Cheap, cloneable producer handle. Shared by all traversal workers.
#[derive(Clone)]
pub struct SinkHandle {
    sender: Sender<PathBuf>,
}

impl SinkHandle {
    /// Hand a matched path to the consumer.
    ///
    /// Never blocks on an unbounded sink. On a bounded sink it waits for room.
    pub fn enqueue(&self, path: PathBuf) {
        // Only fails if the consumer thread is gone, which `await_stopped`
        // reports on its own.
        if let Err(e) = self.sender.send(path) {
            trace!(path = %e.0.display(), "sink consumer gone, dropping match");
        }
    }
}

// ---------------------------------------------------------------------------
// ResultSink
// ---------------------------------------------------------------------------

/// Owns the consumer thread and the sink's own sender.
pub struct ResultSink {
    sender: Sender<PathBuf>,
    handle: JoinHandle<Result<SinkSummary, FanscanError>>,
}

impl ResultSink {
    /// Spawn the consumer thread.
    ///
    /// With `output` set to `None` the consumer still drains and counts (and
    /// optionally collects) paths, it just doesn't write them anywhere.
    pub fn start(
        output: Option<Box<dyn Write + Send>>,
        options: SinkOptions,
    ) -> Result<Self, FanscanError> {
        if options.batch_size == 0 {
            return Err(FanscanError::InvalidBatchSize(0));
        }

        let (sender, receiver) = match options.capacity {
            Some(cap) => bounded(cap),
            None      => unbounded(),
        };

        let handle = thread::Builder::new()
            .name("fanscan-sink".into())
            .spawn(move || consume(receiver, output, options))
            .map_err(|e| FanscanError::ThreadPool(format!("failed to spawn sink consumer: {e}")))?;

        Ok(Self { sender, handle })
    }

    /// A producer handle for traversal workers.
    pub fn handle(&self) -> SinkHandle {
        SinkHandle {
            sender: self.sender.clone(),
        }
    }

    /// Tell the consumer no more paths are coming from this sink.
    ///
    /// The channel only closes once every [`SinkHandle`] has been dropped as
    /// well, so call this after the traversal has fully joined.
    pub fn request_drain_and_stop(self) -> DrainingSink {
        drop(self.sender);
        DrainingSink {
            handle: self.handle,
        }
    }

    /// [`request_drain_and_stop`](Self::request_drain_and_stop) followed by
    /// [`await_stopped`](DrainingSink::await_stopped).
    pub fn finish(self) -> Result<SinkSummary, FanscanError> {
        self.request_drain_and_stop().await_stopped()
    }
}

/// A sink whose producers are closed; only waiting is left.
pub struct DrainingSink {
    handle: JoinHandle<Result<SinkSummary, FanscanError>>,
}

impl DrainingSink {
    /// Block until the consumer has written the last partial batch and exited.
    pub fn await_stopped(self) -> Result<SinkSummary, FanscanError> {
        self.handle.join().map_err(|_| FanscanError::SinkPanicked)?
    }
}

// ---------------------------------------------------------------------------
// Consumer
// ---------------------------------------------------------------------------

fn consume(
    receiver: Receiver<PathBuf>,
    mut output: Option<Box<dyn Write + Send>>,
    options: SinkOptions,
) -> Result<SinkSummary, FanscanError> {
    let mut summary = SinkSummary::default();
    let mut batch: Vec<PathBuf> = Vec::with_capacity(options.batch_size);
    let mut buf: Vec<u8> = Vec::new();
    let mut failure: Option<std::io::Error> = None;

    loop {
        match receiver.recv_timeout(options.flush_interval) {
            Ok(path) => {
                batch.push(path);
                if batch.len() >= options.batch_size {
                    write_batch(&mut batch, &mut buf, &mut output, &mut failure, &mut summary, &options);
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                if !batch.is_empty() {
                    write_batch(&mut batch, &mut buf, &mut output, &mut failure, &mut summary, &options);
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                // Closed and empty: the final partial batch is all that's left
                if !batch.is_empty() {
                    write_batch(&mut batch, &mut buf, &mut output, &mut failure, &mut summary, &options);
                }
                break;
            }
        }
    }

    debug!(
        lines = summary.lines_written,
        batches = summary.batches_written,
        "sink drained"
    );

    match failure {
        Some(e) => Err(FanscanError::Output(e)),
        None    => Ok(summary),
    }
}

fn write_batch(
    batch: &mut Vec<PathBuf>,
    buf: &mut Vec<u8>,
    output: &mut Option<Box<dyn Write + Send>>,
    failure: &mut Option<std::io::Error>,
    summary: &mut SinkSummary,
    options: &SinkOptions,
) {
    if let Some(out) = output.as_mut() {
        buf.clear();
        for path in batch.iter() {
            push_line(buf, path);
        }
        let res = out.write_all(buf).and_then(|()| out.flush());
        if let Err(e) = res {
            // Keep draining so producers never stall; just stop writing.
            warn!(error = %e, "output write failed, discarding further matches");
            *failure = Some(e);
            *output = None;
        } else {
            summary.batches_written += 1;
        }
    }

    summary.lines_written += batch.len() as u64;
    if options.collect_paths {
        summary.paths.append(batch);
    } else {
        batch.clear();
    }
}

#[cfg(unix)]
fn push_line(buf: &mut Vec<u8>, path: &Path) {
    use std::os::unix::ffi::OsStrExt;
    buf.extend_from_slice(path.as_os_str().as_bytes());
    buf.push(b'\n');
}

#[cfg(not(unix))]
fn push_line(buf: &mut Vec<u8>, path: &Path) {
    buf.extend_from_slice(path.to_string_lossy().as_bytes());
    buf.push(b'\n');
}
