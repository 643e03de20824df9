use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard};

use tracing_subscriber::fmt::MakeWriter;

static BUFFER: Mutex<Option<Vec<String>>> = Mutex::new(None);

fn lock() -> MutexGuard<'static, Option<Vec<String>>> {
    BUFFER.lock().unwrap_or_else(|e| e.into_inner())
}

/// Activate buffering. While active, log lines and `buffered_eprintln!()`
/// calls are stored instead of printed to stderr.
pub fn activate() {
    *lock() = Some(Vec::new());
}

/// Deactivate buffering and return all collected messages.
pub fn drain() -> Vec<String> {
    lock().take().unwrap_or_default()
}

/// Write a message. If buffering is active the message is stored;
/// otherwise it is printed to stderr immediately.
pub fn warn(msg: String) {
    let mut guard = lock();
    if let Some(buf) = guard.as_mut() {
        buf.push(msg);
    } else {
        drop(guard);
        eprintln!("{}", msg);
    }
}

/// Convenience macro that works like `eprintln!` but routes through the
/// stderr buffer when it is active.
#[macro_export]
macro_rules! buffered_eprintln {
    ($($arg:tt)*) => {
        $crate::stderr_buffer::warn(format!($($arg)*))
    };
}

/// `tracing_subscriber` writer that sends each formatted event through the buffer.
#[derive(Debug, Clone, Copy, Default)]
pub struct BufferedStderr;

impl<'a> MakeWriter<'a> for BufferedStderr {
    type Writer = EventWriter;

    fn make_writer(&'a self) -> Self::Writer {
        EventWriter::default()
    }
}

/// Collects one event's bytes and emits them when dropped.
#[derive(Debug, Default)]
pub struct EventWriter {
    pending: Vec<u8>,
}

impl Write for EventWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for EventWriter {
    fn drop(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let text = String::from_utf8_lossy(&self.pending);
        warn(text.trim_end_matches('\n').to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test so the shared buffer is not raced by parallel tests
    #[test]
    fn test_buffering_and_event_writer() {
        activate();
        warn("first".to_string());
        {
            let mut writer = BufferedStderr.make_writer();
            writeln!(writer, "second line").unwrap();
        }
        {
            // Nothing written, nothing buffered
            let _writer = BufferedStderr.make_writer();
        }
        let messages = drain();
        assert_eq!(messages, vec!["first".to_string(), "second line".to_string()]);
        assert!(drain().is_empty());
    }
}
