//! User-facing progress output.
//!
//! Diagnostics go through `tracing` to stderr. The lines written here are the
//! command's actual output and go to stdout, optionally colored.

use std::io::Write;
use std::sync::{Arc, Mutex};

use crossterm::style::Stylize;
use tracing::debug;

/// Sink for progress and result lines.
pub struct Console {
    out: Box<dyn Write + Send>,
    colors: bool,
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console")
            .field("colors", &self.colors)
            .finish_non_exhaustive()
    }
}

impl Console {
    pub fn new(out: Box<dyn Write + Send>, colors: bool) -> Self {
        Self { out, colors }
    }

    pub fn stdout(colors: bool) -> Self {
        Self::new(Box::new(std::io::stdout()), colors)
    }

    /// Console writing uncolored text into a shared buffer.
    pub fn captured() -> (Self, CapturedOutput) {
        let captured = CapturedOutput::default();
        (Self::new(Box::new(captured.clone()), false), captured)
    }

    pub fn line(&mut self, text: &str) {
        self.write_line(text.to_string());
    }

    /// Bold line announcing the item about to be processed.
    pub fn progress(&mut self, text: &str) {
        let text = if self.colors {
            text.bold().to_string()
        } else {
            text.to_string()
        };
        self.write_line(text);
    }

    pub fn success(&mut self, text: &str) {
        let text = if self.colors {
            text.green().to_string()
        } else {
            text.to_string()
        };
        self.write_line(text);
    }

    pub fn failure(&mut self, text: &str) {
        let text = if self.colors {
            text.red().to_string()
        } else {
            text.to_string()
        };
        self.write_line(text);
    }

    pub fn notice(&mut self, text: &str) {
        let text = if self.colors {
            text.yellow().to_string()
        } else {
            text.to_string()
        };
        self.write_line(text);
    }

    pub fn muted(&mut self, text: &str) {
        let text = if self.colors {
            text.dark_grey().to_string()
        } else {
            text.to_string()
        };
        self.write_line(text);
    }

    fn write_line(&mut self, text: String) {
        if let Err(e) = writeln!(self.out, "{}", text).and_then(|_| self.out.flush()) {
            debug!(error = %e, "Failed to write console output");
        }
    }
}

/// Shared in-memory buffer behind [`Console::captured`].
#[derive(Debug, Clone, Default)]
pub struct CapturedOutput(Arc<Mutex<Vec<u8>>>);

impl CapturedOutput {
    pub fn contents(&self) -> String {
        let buffer = self.0.lock().unwrap_or_else(|p| p.into_inner());
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

impl Write for CapturedOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut buffer = self.0.lock().unwrap_or_else(|p| p.into_inner());
        buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
