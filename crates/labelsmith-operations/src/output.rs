use std::{
    fmt,
    io::{self, Write},
    sync::{Arc, Mutex, PoisonError},
};

struct Sink {
    writer: Box<dyn Write + Send>,
    progress_width: usize,
}

/// Shared, line-serialized destination for operation output.
///
/// Every write takes the inner lock, so lines from concurrent workers never
/// interleave. A progress line is drawn with a leading `\r` and no newline
/// and is overwritten by the next one.
#[derive(Clone)]
pub struct Output {
    sink: Arc<Mutex<Sink>>,
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Output").finish_non_exhaustive()
    }
}

impl Output {
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Sink {
                writer: Box::new(writer),
                progress_width: 0,
            })),
        }
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    fn with_sink(&self, f: impl FnOnce(&mut Sink) -> io::Result<()>) {
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        // Write errors are not reported to the batch.
        let _ = f(&mut sink).and_then(|_| sink.writer.flush());
    }

    /// Writes `text` followed by a newline.
    pub fn line(&self, text: impl AsRef<str>) {
        self.with_sink(|sink| writeln!(sink.writer, "{}", text.as_ref()));
    }

    /// Writes a pre-formatted block verbatim.
    pub fn block(&self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.with_sink(|sink| sink.writer.write_all(text.as_bytes()));
    }

    /// Draws `completed/total` over the previous progress line.
    pub fn progress(&self, completed: usize, total: usize) {
        self.with_sink(|sink| {
            let text = format!("{completed}/{total}");
            sink.progress_width = sink.progress_width.max(text.len());
            write!(sink.writer, "\r{text}")
        });
    }

    /// Blanks out the progress line, if one was drawn.
    pub fn clear_progress(&self) {
        self.with_sink(|sink| {
            if sink.progress_width == 0 {
                return Ok(());
            }
            let width = std::mem::take(&mut sink.progress_width);
            write!(sink.writer, "\r{}\r", " ".repeat(width))
        });
    }
}
