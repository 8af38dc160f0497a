// Output destinations for reporter text: console, file or debugger channel

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::error::{Error, Result};

/// Selector token for the debugger channel
pub const DEBUG_SELECTOR: &str = "%debug";

/// Where reporter output goes, resolved from the `--out` value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Console,
    File(PathBuf),
    Debug,
}

impl OutputTarget {
    /// Resolve a selector without touching the file system.
    ///
    /// Empty selects the console, `%debug` the debugger channel, any other
    /// `%`-prefixed value is rejected, and everything else is a file path.
    pub fn parse(selector: &str) -> Result<Self> {
        if selector.is_empty() {
            Ok(Self::Console)
        } else if selector.starts_with('%') {
            if selector == DEBUG_SELECTOR {
                Ok(Self::Debug)
            } else {
                Err(Error::UnrecognisedStream(selector.to_string()))
            }
        } else {
            Ok(Self::File(PathBuf::from(selector)))
        }
    }
}

/// Cloneable handle to the run's output sink.
///
/// All clones write into the same destination; reporters hold one of these
/// rather than the stream itself.
#[derive(Clone)]
pub struct StreamWriter {
    inner: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl StreamWriter {
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    fn with<T>(&self, f: impl FnOnce(&mut dyn Write) -> io::Result<T>) -> io::Result<T> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| io::Error::other("output stream lock poisoned"))?;
        f(guard.as_mut())
    }
}

impl Write for StreamWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.with(|w| w.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.with(|w| w.flush())
    }
}

impl std::fmt::Debug for StreamWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamWriter").finish_non_exhaustive()
    }
}

/// Sink for the OS debugger channel
struct DebugChannel {
    attached: bool,
}

impl Write for DebugChannel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.attached {
            io::stderr().write(buf)
        } else {
            Ok(buf.len())
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.attached {
            io::stderr().flush()
        } else {
            Ok(())
        }
    }
}

/// Whether a tracer (debugger) is attached to this process
pub fn is_debugger_present() -> bool {
    #[cfg(target_os = "linux")]
    {
        std::fs::read_to_string("/proc/self/status")
            .ok()
            .and_then(|status| {
                status
                    .lines()
                    .find_map(|line| line.strip_prefix("TracerPid:"))
                    .and_then(|pid| pid.trim().parse::<u32>().ok())
            })
            .is_some_and(|pid| pid != 0)
    }

    #[cfg(not(target_os = "linux"))]
    {
        false
    }
}

/// The resolved destination for a run, owned by its `RunConfiguration`.
///
/// A file stream is opened (truncated) on construction and flushed when
/// dropped. The console stream never closes stdout.
#[derive(Debug)]
pub struct OutputStream {
    target: OutputTarget,
    writer: StreamWriter,
}

impl OutputStream {
    pub fn resolve(selector: &str) -> Result<Self> {
        Self::open(OutputTarget::parse(selector)?)
    }

    pub fn open(target: OutputTarget) -> Result<Self> {
        match target {
            OutputTarget::Console => Ok(Self::console()),
            OutputTarget::Debug => Ok(Self::debug()),
            OutputTarget::File(path) => Self::file(&path),
        }
    }

    pub fn console() -> Self {
        Self {
            target: OutputTarget::Console,
            writer: StreamWriter::new(io::stdout()),
        }
    }

    pub fn file(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Writing reporter output to {}", path.display());

        Ok(Self {
            target: OutputTarget::File(path.to_path_buf()),
            writer: StreamWriter::new(BufWriter::new(file)),
        })
    }

    pub fn debug() -> Self {
        let attached = is_debugger_present();
        debug!("Debug channel selected (debugger attached: {})", attached);

        Self {
            target: OutputTarget::Debug,
            writer: StreamWriter::new(DebugChannel { attached }),
        }
    }

    pub fn target(&self) -> &OutputTarget {
        &self.target
    }

    pub fn write(&self, text: &str) -> io::Result<()> {
        self.writer.clone().write_all(text.as_bytes())
    }

    pub fn flush(&self) -> io::Result<()> {
        self.writer.clone().flush()
    }

    /// Direct handle for reporters that write incrementally
    pub fn underlying_stream(&self) -> StreamWriter {
        self.writer.clone()
    }

    /// Only the console can render terminal colour
    pub fn is_console(&self) -> bool {
        matches!(self.target, OutputTarget::Console)
    }
}

impl Drop for OutputStream {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!("Failed to flush output stream: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selectors() {
        assert_eq!(OutputTarget::parse("").unwrap(), OutputTarget::Console);
        assert_eq!(OutputTarget::parse("%debug").unwrap(), OutputTarget::Debug);
        assert_eq!(
            OutputTarget::parse("out.tap").unwrap(),
            OutputTarget::File(PathBuf::from("out.tap"))
        );
    }

    #[test]
    fn test_parse_rejects_unknown_percent_selector() {
        let err = OutputTarget::parse("%bogus").unwrap_err();
        assert!(matches!(err, Error::UnrecognisedStream(ref s) if s == "%bogus"));
    }

    #[test]
    fn test_file_stream_truncates_and_flushes_on_drop() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.txt");
        std::fs::write(&path, "stale content that should vanish").unwrap();

        {
            let stream = OutputStream::file(&path).unwrap();
            stream.write("fresh\n").unwrap();
        }

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "fresh\n");
    }

    #[test]
    fn test_file_stream_unopenable_path_is_io_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("missing").join("out.txt");
        let err = OutputStream::file(&path).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
    }

    #[test]
    fn test_debug_channel_accepts_writes() {
        let stream = OutputStream::debug();
        assert!(stream.write("ignored unless traced\n").is_ok());
        assert!(!stream.is_console());
    }
}
