// Line-oriented link to an external agent process.
//
// Wire format, one UTF-8 line per message in each direction:
//
//   -> pose                       <- {"x":..,"y":..,"z":..,"yaw":..,"pitch":..} | null
//   -> grid                       <- {"blocks":[..],"bounds":[[..],[..],[..]]} | null
//   -> move 0.7 / turn -0.6 / jump 1      (no reply)
//
// Queries block until the reply line arrives. A `null` reply, a closed
// stream, an I/O error or a line that does not parse all surface as "not
// available" (`None`) to the caller, with a warning logged. Commands are
// fire-and-forget: they are buffered and flushed at the next query or
// `wait_tick`.
//
// `MAX_LINE_BYTES` bounds a single reply so a peer that never sends a
// newline cannot make the reader allocate without limit. Grid replies for the
// default 21 x 6 x 21 view are the largest expected lines. An oversized reply
// is skipped up to its newline without buffering it, so the next query still
// reads the next reply.

use blockpath_core::{AgentPose, Command, Environment, GridObservation};
use serde::de::DeserializeOwned;
use std::io::{BufRead, Read, Write};
use std::time::Duration;
use tracing::warn;

/// Maximum reply line length (4 MB).
pub const MAX_LINE_BYTES: u64 = 4 * 1024 * 1024;

pub struct LinkEnvironment<R, W> {
    reader: R,
    writer: W,
    line: Vec<u8>,
    max_line_bytes: u64,
    /// Sleep for the tick duration in `wait_tick`. Off for scripted peers.
    sleep: bool,
}

impl<R: BufRead, W: Write> LinkEnvironment<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            line: Vec::new(),
            max_line_bytes: MAX_LINE_BYTES,
            sleep: true,
        }
    }

    /// Don't sleep in `wait_tick`; only flush.
    pub fn without_sleep(mut self) -> Self {
        self.sleep = false;
        self
    }

    /// Replace the reply length limit.
    pub fn with_max_line_bytes(mut self, limit: u64) -> Self {
        self.max_line_bytes = limit;
        self
    }

    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }

    /// Write one request line and parse the reply.
    fn query<T: DeserializeOwned>(&mut self, request: &str) -> Option<T> {
        if let Err(e) = writeln!(self.writer, "{request}").and_then(|()| self.writer.flush()) {
            warn!(request, error = %e, "link write failed");
            return None;
        }

        self.line.clear();
        match (&mut self.reader)
            .take(self.max_line_bytes)
            .read_until(b'\n', &mut self.line)
        {
            Ok(0) => {
                warn!(request, "link closed");
                return None;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(request, error = %e, "link read failed");
                return None;
            }
        }
        if self.line.last() != Some(&b'\n') && self.line.len() as u64 >= self.max_line_bytes {
            warn!(request, limit = self.max_line_bytes, "link reply too long");
            if let Err(e) = self.skip_line() {
                warn!(request, error = %e, "link read failed");
            }
            return None;
        }

        match serde_json::from_slice::<Option<T>>(&self.line) {
            Ok(reply) => reply,
            Err(e) => {
                warn!(request, error = %e, "malformed link reply");
                None
            }
        }
    }

    /// Discard the rest of the current line, including its newline.
    fn skip_line(&mut self) -> std::io::Result<()> {
        loop {
            let buf = self.reader.fill_buf()?;
            if buf.is_empty() {
                return Ok(());
            }
            match buf.iter().position(|&b| b == b'\n') {
                Some(i) => {
                    self.reader.consume(i + 1);
                    return Ok(());
                }
                None => {
                    let n = buf.len();
                    self.reader.consume(n);
                }
            }
        }
    }
}

impl<R: BufRead, W: Write> Environment for LinkEnvironment<R, W> {
    fn pose(&mut self) -> Option<AgentPose> {
        self.query("pose")
    }

    fn observe_grid(&mut self) -> Option<GridObservation> {
        self.query("grid")
    }

    fn send(&mut self, command: Command) {
        if let Err(e) = writeln!(self.writer, "{command}") {
            warn!(%command, error = %e, "link write failed");
        }
    }

    fn wait_tick(&mut self, duration: Duration) {
        if let Err(e) = self.writer.flush() {
            warn!(error = %e, "link flush failed");
        }
        if self.sleep {
            std::thread::sleep(duration);
        }
    }
}
