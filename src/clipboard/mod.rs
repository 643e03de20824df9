use anyhow::{Context, Result};
use base64::Engine;
use std::io::Write;
use std::time::Instant;

/// How the text reached the clipboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyMethod {
    /// The operating system clipboard
    System,
    /// An OSC 52 escape sequence asking the terminal to set its clipboard
    Terminal,
}

/// A system clipboard handle kept open between copies.
///
/// On X11 and Wayland the copied text is served by the process that set it,
/// and only while its `arboard::Clipboard` is alive. Long-running callers
/// such as the TUI hold one of these so that a copy outlives the call.
#[derive(Default)]
pub struct ClipboardHandle {
    system: Option<arboard::Clipboard>,
}

impl ClipboardHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a system clipboard is currently held open.
    pub fn is_open(&self) -> bool {
        self.system.is_some()
    }

    /// Copy text, falling back to OSC 52 on stdout.
    pub fn copy_text(&mut self, text: &str) -> Result<CopyMethod> {
        self.copy_text_to(&mut std::io::stdout(), text)
    }

    /// Copy text, writing the OSC 52 fallback to `out` if the system
    /// clipboard is unavailable.
    pub fn copy_text_to<W: Write>(&mut self, out: &mut W, text: &str) -> Result<CopyMethod> {
        let system = self.set_system_text(text);
        if system.is_err() {
            // Reopen on the next copy
            self.system = None;
        }
        copy_or_fallback(system, out, text)
    }

    fn set_system_text(&mut self, text: &str) -> Result<(), arboard::Error> {
        let clipboard = match self.system.take() {
            Some(clipboard) => clipboard,
            None => arboard::Clipboard::new()?,
        };
        self.system.insert(clipboard).set_text(text)
    }
}

/// Copy text from a process that exits right after the copy
///
/// On Linux the text only lives as long as this process serves it, so the
/// call blocks until another program (usually a clipboard manager) takes
/// the clipboard over or `deadline` passes. Elsewhere it returns at once.
/// Falls back to an OSC 52 escape sequence on stdout, which most modern
/// terminals (and tmux/ssh sessions) understand.
///
/// # Errors
/// Returns error only if both mechanisms fail
pub fn copy_text_and_wait(text: &str, deadline: Instant) -> Result<CopyMethod> {
    let system = set_text_and_wait(text, deadline);
    copy_or_fallback(system, &mut std::io::stdout(), text)
}

#[cfg(target_os = "linux")]
fn set_text_and_wait(text: &str, deadline: Instant) -> Result<(), arboard::Error> {
    use arboard::SetExtLinux;

    let mut clipboard = arboard::Clipboard::new()?;
    clipboard.set().wait_until(deadline).text(text)
}

#[cfg(not(target_os = "linux"))]
fn set_text_and_wait(text: &str, _deadline: Instant) -> Result<(), arboard::Error> {
    let mut clipboard = arboard::Clipboard::new()?;
    clipboard.set_text(text)
}

fn copy_or_fallback<W: Write>(
    system: Result<(), arboard::Error>,
    out: &mut W,
    text: &str,
) -> Result<CopyMethod> {
    match system {
        Ok(()) => Ok(CopyMethod::System),
        Err(e) => {
            tracing::warn!(error = %e, "System clipboard unavailable, falling back to OSC 52");
            copy_with_osc52(out, text)?;
            Ok(CopyMethod::Terminal)
        }
    }
}

/// Build the OSC 52 "set clipboard" sequence for `text`
pub fn osc52_sequence(text: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text);
    format!("\x1b]52;c;{}\x07", encoded)
}

pub fn copy_with_osc52<W: Write>(out: &mut W, text: &str) -> Result<()> {
    out.write_all(osc52_sequence(text).as_bytes())
        .context("Failed to write clipboard escape sequence")?;
    out.flush().context("Failed to flush clipboard escape sequence")?;
    Ok(())
}
