use std::io::{self, Write};

/// Resets the terminal (RIS)
const CLEAR_SCREEN: &str = "\x1bc";

/// Human-readable report sink
///
/// The report goes to `out` (stdout in production). Connection failure
/// notices go to `err` (stderr in production). Tests use buffers for both.
pub struct Console<W: Write, E: Write = io::Stderr> {
    out: W,
    err: E,
    clear_screen: bool,
}

impl<W: Write> Console<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            err: io::stderr(),
            clear_screen: false,
        }
    }
}

impl<W: Write, E: Write> Console<W, E> {
    /// Send failure notices to `err` instead of stderr
    pub fn with_errors<E2: Write>(self, err: E2) -> Console<W, E2> {
        Console {
            out: self.out,
            err,
            clear_screen: self.clear_screen,
        }
    }

    pub fn with_clear_screen(mut self, clear_screen: bool) -> Self {
        self.clear_screen = clear_screen;
        self
    }

    pub fn line(&mut self, text: impl AsRef<str>) -> io::Result<()> {
        writeln!(self.out, "{}", text.as_ref())?;
        self.out.flush()
    }

    pub fn blank(&mut self) -> io::Result<()> {
        self.line("")
    }

    pub fn warn(&mut self, text: impl AsRef<str>) -> io::Result<()> {
        writeln!(self.err, "{}", text.as_ref())?;
        self.err.flush()
    }

    /// Start a fresh screen, if enabled
    pub fn clear(&mut self) -> io::Result<()> {
        if self.clear_screen {
            write!(self.out, "{}", CLEAR_SCREEN)?;
            self.out.flush()?;
        }
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn into_parts(self) -> (W, E) {
        (self.out, self.err)
    }
}
