//! Decode feed adapters.
//!
//! The session never talks to cameras or scanners directly; it consumes
//! decode events through a [`SessionHandle`]. This module adapts concrete
//! sources to that boundary. The keyboard-wedge feed serves USB QR scanners
//! that present as keyboards: every decoded code arrives as one line of
//! text, and a bare Enter from the operator maps to the retry action.

use crate::error::Result;
use crate::session::SessionHandle;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info};

/// Pumps newline-delimited decode events into a session.
pub struct KeyboardWedgeFeed {
    handle: SessionHandle,
}

impl KeyboardWedgeFeed {
    /// Create a feed that forwards into `handle`.
    #[must_use]
    pub fn new(handle: SessionHandle) -> Self {
        Self { handle }
    }

    /// Read lines from `reader` until end of input.
    ///
    /// A non-empty line is delivered as a decoded payload; an empty line is
    /// the operator retry action.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from the source fails.
    pub async fn pump<R>(self, reader: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                debug!("Blank line from wedge, treating as operator retry");
                self.handle.retry();
            } else {
                self.handle.decode(Some(trimmed.to_owned()), None);
            }
        }

        info!("Decode feed reached end of input");
        Ok(())
    }

    /// Pump from standard input.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from stdin fails.
    pub async fn pump_stdin(self) -> Result<()> {
        self.pump(BufReader::new(tokio::io::stdin())).await
    }
}
