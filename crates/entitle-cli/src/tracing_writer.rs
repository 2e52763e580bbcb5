//! File writer for the optional log file layer.
//!
//! The terminal layer writes straight to stderr. The file layer gets its
//! own [`MakeWriter`](tracing_subscriber::fmt::MakeWriter) so it can run
//! under an independent `EnvFilter`; it should be built with
//! `.with_ansi(false)` so no escape codes reach the file.

use parking_lot::Mutex;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

/// Log file name inside the configured log directory.
pub const LOG_FILE_NAME: &str = "entitle.log";

/// [`MakeWriter`](tracing_subscriber::fmt::MakeWriter) appending to the
/// shared log file.
#[derive(Clone)]
pub struct FileMakeWriter {
    file: Arc<Mutex<std::fs::File>>,
}

impl FileMakeWriter {
    /// Opens `<log_dir>/entitle.log` in append mode.
    ///
    /// Returns `None` (after a warning on stderr) if the directory or file
    /// cannot be created; file logging is never fatal.
    pub fn open(log_dir: &Path) -> Option<Self> {
        if let Err(e) = std::fs::create_dir_all(log_dir) {
            eprintln!(
                "Warning: cannot create log directory {}: {e}",
                log_dir.display()
            );
            return None;
        }

        let log_path = log_dir.join(LOG_FILE_NAME);
        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
        {
            Ok(file) => Some(Self {
                file: Arc::new(Mutex::new(file)),
            }),
            Err(e) => {
                eprintln!("Warning: cannot open log file {}: {e}", log_path.display());
                None
            }
        }
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for FileMakeWriter {
    type Writer = FileWriter;

    fn make_writer(&'a self) -> Self::Writer {
        FileWriter {
            file: Arc::clone(&self.file),
            buf: Vec::with_capacity(256),
        }
    }
}

/// Per-event writer.
///
/// Buffers one formatted event and appends it under the lock on drop,
/// so concurrent events never interleave mid-line.
pub struct FileWriter {
    file: Arc<Mutex<std::fs::File>>,
    buf: Vec<u8>,
}

impl Write for FileWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for FileWriter {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }

        let mut file = self.file.lock();
        let _ = file.write_all(&self.buf);
        let _ = file.flush();
    }
}
