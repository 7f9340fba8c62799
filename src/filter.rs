// Debug log payload extraction
//
//  Copyright (C) 2026 The ast2dot Authors
//
//  This file is part of ast2dot.
//
//  This program is free software: you can redistribute it and/or modify
//  it under the terms of the GNU General Public License as published by
//  the Free Software Foundation, either version 3 of the License, or
//  (at your option) any later version.
//
//  This program is distributed in the hope that it will be useful,
//  but WITHOUT ANY WARRANTY; without even the implied warranty of
//  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//  GNU General Public License for more details.
//
//  You should have received a copy of the GNU General Public License
//  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Extract an embedded XML payload from a parser debug log.
//!
//! The parser prints its AST between two marker lines:
//!
//! ```text
//! ... AST vvv
//! <Module location="1:1">...</Module>
//! ... AST ^^^
//! ```
//!
//! [`StreamFilter`] wraps the log and exposes only the payload through
//!   [`Read`] and [`BufRead`],
//!     so that it can be handed directly to the XML reader without first
//!     buffering the log.
//!
//! The filter moves through three states
//!   (see [`FilterState`]):
//!
//!   1. _Seeking_ discards whole lines until one ends with the start
//!      marker;
//!   2. _Streaming_ serves the payload until the end marker is found; and
//!   3. _Closed_ yields EOF forever.
//!
//! Locating the End
//! ================
//! The end marker may be preceded on its line by logger output.
//! When the end marker is found,
//!   the payload is cut at the last newline within
//!   [`FilterConfig::lookback`] bytes before the marker;
//!     if there is no such newline,
//!       it is cut at the marker itself.
//! This is a heuristic:
//!   a payload whose marker lines do not fall on line boundaries may lose
//!   or retain a few bytes of log output.
//!
//! Bytes that could still fall within the lookback window of a marker that
//!   has not yet been fully read are held back until more input arrives,
//!     so the result does not depend on how the source chunks its reads.

use crate::error::{Error, MissingStartMarker, Result};
use memchr::{memmem, memrchr};
use std::io::{self, BufRead, Read};
use tracing::{debug, trace};

#[cfg(test)]
mod test;

/// Marker ending the line that precedes the payload.
pub const START_MARKER: &str = "AST vvv";

/// Marker that follows the payload.
pub const END_MARKER: &str = "AST ^^^";

/// Default number of bytes before [`END_MARKER`] searched for a newline.
pub const DEFAULT_LOOKBACK: usize = 80;

/// Markers and lookback used by [`StreamFilter`].
///
/// Markers must not be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    /// Suffix of the line preceding the payload.
    pub start_marker: String,
    /// Text following the payload.
    pub end_marker: String,
    /// Number of bytes before the end marker to search for a newline.
    pub lookback: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            start_marker: START_MARKER.into(),
            end_marker: END_MARKER.into(),
            lookback: DEFAULT_LOOKBACK,
        }
    }
}

impl FilterConfig {
    /// Default markers with the provided lookback.
    pub fn with_lookback(lookback: usize) -> Self {
        Self {
            lookback,
            ..Default::default()
        }
    }
}

/// Filter state.
///
/// Transitions are one-way,
///   in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterState {
    /// Discarding log lines until the start marker.
    Seeking,
    /// Serving the payload.
    Streaming,
    /// Payload exhausted or filter closed;
    ///   the source has been released.
    Closed,
}

/// Expose only the payload between marker lines of a debug log.
///
/// See the [module-level documentation](self) for more information.
pub struct StreamFilter<R: BufRead> {
    /// Wrapped log,
    ///   released upon entering [`FilterState::Closed`].
    src: Option<R>,

    state: FilterState,

    config: FilterConfig,

    /// Payload read from `src`,
    ///   of which everything before `pos` has been served.
    pending: Vec<u8>,

    /// Offset of the first unserved byte of `pending`.
    pos: usize,

    /// Whether the end of the payload is known,
    ///   meaning that `pending` holds all that remains to be served.
    at_end: bool,
}

impl<R: BufRead> StreamFilter<R> {
    /// Filter `src` using the default markers and lookback.
    pub fn new(src: R) -> Self {
        Self::with_config(src, FilterConfig::default())
    }

    pub fn with_config(src: R, config: FilterConfig) -> Self {
        Self {
            src: Some(src),
            state: FilterState::Seeking,
            config,
            pending: Vec::new(),
            pos: 0,
            at_end: false,
        }
    }

    pub fn state(&self) -> FilterState {
        self.state
    }

    /// Discard input up to and including the start marker line.
    ///
    /// This happens implicitly on the first read,
    ///   but calling it first allows a missing start marker to be
    ///   reported as [`Error::MissingStartMarker`] rather than as an
    ///   [`io::Error`].
    /// This has no effect outside of [`FilterState::Seeking`].
    pub fn seek(&mut self) -> Result<()> {
        self.seek_start().map_err(Error::from_filter_io)
    }

    /// Force [`FilterState::Closed`],
    ///   releasing the source.
    ///
    /// Subsequent reads yield EOF.
    pub fn close(&mut self) {
        if self.state != FilterState::Closed {
            debug!("closing AST stream filter");
        }

        self.finish();
    }

    fn finish(&mut self) {
        self.state = FilterState::Closed;
        self.src = None;
        self.pending = Vec::new();
        self.pos = 0;
        self.at_end = true;
    }

    fn seek_start(&mut self) -> io::Result<()> {
        if self.state != FilterState::Seeking {
            return Ok(());
        }

        let marker = self.config.start_marker.as_bytes();
        let src = match self.src.as_mut() {
            Some(src) => src,
            None => return Err(self.missing_start()),
        };

        let mut line = Vec::new();
        let mut discarded = 0usize;

        loop {
            line.clear();

            if src.read_until(b'\n', &mut line)? == 0 {
                debug!(lines = discarded, "start marker not found");
                return Err(self.missing_start());
            }

            if strip_eol(&line).ends_with(marker) {
                debug!(lines = discarded, "found AST start marker");
                self.state = FilterState::Streaming;

                return Ok(());
            }

            discarded += 1;
        }
    }

    fn missing_start(&self) -> io::Error {
        MissingStartMarker(self.config.start_marker.clone()).into()
    }

    /// Number of unserved bytes that may be served from `pending`.
    ///
    /// This reads from the source until either enough bytes are available
    ///   beyond the holdback or the end of the payload is known.
    fn servable(&mut self) -> io::Result<usize> {
        self.seek_start()?;

        loop {
            if self.state == FilterState::Closed {
                return Ok(0);
            }

            let avail = self.pending.len() - self.pos;

            if self.at_end {
                if avail == 0 {
                    debug!("AST payload exhausted");
                    self.finish();
                }

                return Ok(avail);
            }

            let hold = self.holdback();
            if avail > hold {
                return Ok(avail - hold);
            }

            if !self.fill()? {
                debug!("input ended before end marker");
                self.at_end = true;
            }
        }
    }

    /// Bytes that must remain unserved until the end marker is ruled out.
    fn holdback(&self) -> usize {
        self.config.lookback + self.config.end_marker.len().saturating_sub(1)
    }

    /// Append the next chunk of the source to `pending` and look for the
    ///   end marker.
    ///
    /// Returns `false` if the source is exhausted.
    fn fill(&mut self) -> io::Result<bool> {
        let src = match self.src.as_mut() {
            Some(src) => src,
            None => return Ok(false),
        };

        let chunk = src.fill_buf()?;
        if chunk.is_empty() {
            return Ok(false);
        }

        let read = chunk.len();

        self.pending.drain(..self.pos);
        self.pos = 0;

        let marker = self.config.end_marker.as_bytes();

        // The marker may straddle the previous chunk.
        let search_from = self
            .pending
            .len()
            .saturating_sub(marker.len().saturating_sub(1));

        self.pending.extend_from_slice(chunk);
        src.consume(read);

        trace!(read, pending = self.pending.len(), "read payload chunk");

        if let Some(offset) = memmem::find(&self.pending[search_from..], marker)
        {
            let at = search_from + offset;
            let window = at.saturating_sub(self.config.lookback).max(self.pos);

            let cut = memrchr(b'\n', &self.pending[window..at])
                .map(|nl| window + nl)
                .unwrap_or(at);

            debug!(marker_at = at, cut, "found AST end marker");

            self.pending.truncate(cut);
            self.at_end = true;
        }

        Ok(true)
    }
}

impl<R: BufRead> BufRead for StreamFilter<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        let n = self.servable()?;
        Ok(&self.pending[self.pos..self.pos + n])
    }

    fn consume(&mut self, amt: usize) {
        self.pos = (self.pos + amt).min(self.pending.len());
    }
}

impl<R: BufRead> Read for StreamFilter<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let avail = self.fill_buf()?;
        let n = avail.len().min(buf.len());

        buf[..n].copy_from_slice(&avail[..n]);
        self.consume(n);

        Ok(n)
    }
}

/// Strip a trailing `\n` or `\r\n`.
fn strip_eol(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
