//! Kernel logger behind the `log` facade.
//!
//! Records are kept in a fixed boot buffer until a console sink is
//! attached; at that point the buffer is flushed to the sink and later
//! records go straight to it. The buffer lock masks interrupts, so an
//! interrupt handler that logs can never spin on a lock held by the task it
//! interrupted.

use conquer_once::spin::OnceCell;
use core::fmt::{self, Write};
use log::{LevelFilter, Log, Metadata, Record};

use crate::spinlock::SpinLockIrq;

const BUFFER_SIZE: usize = 8192;
const LINE_SIZE: usize = 256;

/// Console output routine, e.g. a serial port writer.
pub type ConsoleSink = fn(&str);

/// Buffer for storing log messages before a console is attached
pub struct LogBuffer {
    buffer: [u8; BUFFER_SIZE],
    position: usize,
}

impl LogBuffer {
    const fn new() -> Self {
        Self {
            buffer: [0; BUFFER_SIZE],
            position: 0,
        }
    }

    fn append(&mut self, s: &str) -> fmt::Result {
        let bytes = s.as_bytes();
        let remaining = BUFFER_SIZE - self.position;

        if bytes.len() > remaining {
            // Buffer is full: keep what we have, drop the newcomer
            return Ok(());
        }

        self.buffer[self.position..self.position + bytes.len()].copy_from_slice(bytes);
        self.position += bytes.len();

        Ok(())
    }

    pub fn contents(&self) -> &str {
        core::str::from_utf8(&self.buffer[..self.position]).unwrap_or("<invalid UTF-8>")
    }

    fn clear(&mut self) {
        self.position = 0;
    }
}

impl Write for LogBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.append(s)
    }
}

/// One formatted line on the stack; longer lines are truncated.
struct LineBuffer {
    bytes: [u8; LINE_SIZE],
    len: usize,
}

impl LineBuffer {
    const fn new() -> Self {
        LineBuffer {
            bytes: [0; LINE_SIZE],
            len: 0,
        }
    }

    fn as_str(&self) -> &str {
        match core::str::from_utf8(&self.bytes[..self.len]) {
            Ok(s) => s,
            // Truncation split a character; keep the valid prefix
            Err(e) => core::str::from_utf8(&self.bytes[..e.valid_up_to()]).unwrap_or(""),
        }
    }
}

impl Write for LineBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let take = s.len().min(LINE_SIZE - self.len);
        self.bytes[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take;
        Ok(())
    }
}

pub struct KernelLogger {
    buffer: SpinLockIrq<LogBuffer>,
    console: OnceCell<ConsoleSink>,
}

impl KernelLogger {
    pub const fn new() -> Self {
        KernelLogger {
            buffer: SpinLockIrq::new(LogBuffer::new()),
            console: OnceCell::uninit(),
        }
    }

    /// Route output to `sink`, flushing everything buffered so far.
    ///
    /// Returns false if a console was already attached.
    pub fn attach_console(&self, sink: ConsoleSink) -> bool {
        if self.console.try_init_once(|| sink).is_err() {
            return false;
        }
        let mut buffer = self.buffer.lock();
        if !buffer.contents().is_empty() {
            sink(buffer.contents());
            buffer.clear();
        }
        true
    }

    /// Run `f` over the text buffered while no console was attached.
    pub fn with_buffered<R>(&self, f: impl FnOnce(&str) -> R) -> R {
        f(self.buffer.lock().contents())
    }
}

impl Default for KernelLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Log for KernelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let mut line = LineBuffer::new();
        let _ = writeln!(line, "[{:>5}] {}: {}", record.level(), record.target(), record.args());

        match self.console.get() {
            Some(sink) => sink(line.as_str()),
            None => {
                let _ = self.buffer.lock().append(line.as_str());
            }
        }
    }

    fn flush(&self) {}
}

/// The kernel-wide logger instance.
pub static LOGGER: KernelLogger = KernelLogger::new();

/// Install [`LOGGER`] as the `log` backend.
pub fn init(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}
