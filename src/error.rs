// Conversion errors
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

//! Errors that abort a conversion.
//!
//! Every failure is fatal:
//!   a conversion is a single pass over its input and there is no
//!   recovery from a malformed tree.
//! Some DOT output may already have been written when an error is
//!   returned;
//!     callers must not treat that output as a complete graph.

use std::{fmt::Display, io, str::Utf8Error, sync::Arc};

/// Result of a conversion step.
pub type Result<T> = std::result::Result<T, Error>;

/// Error during AST to DOT conversion.
#[derive(Debug)]
pub enum Error {
    /// The input was exhausted before a line ending in the start marker
    ///   was found.
    ///
    /// This is distinct from an empty document so that a debug log that
    ///   simply lacks an AST dump is never rendered as an empty graph.
    MissingStartMarker(String),

    /// The XML payload is not well-formed.
    ///
    /// The second field is the byte offset into the XML payload
    ///   (after filtering) at which the problem was detected.
    MalformedInput(Malformed, usize),

    /// Failure reading the source or writing the destination.
    Io(io::Error),

    /// Element events did not nest properly at the given depth,
    ///   such as a document ending while elements other than the
    ///   synthetic root were still open.
    ///
    /// The reader rejects malformed nesting itself,
    ///   so this indicates an inconsistent event stream.
    UnbalancedTree(usize),
}

/// Ways in which the XML payload may be malformed.
#[derive(Debug)]
pub enum Malformed {
    /// Error reported by the XML parser itself.
    Xml(quick_xml::Error),
    /// Input ended while the named element was still open.
    UnclosedElement(String),
    /// The payload contains no root element.
    MissingRoot,
    /// An element was opened after the root element was closed.
    ExtraRoot(String),
    /// Character data appeared outside of the root element.
    TextOutsideRoot(String),
    /// An end tag was found with no element open.
    UnexpectedClose(String),
    /// A name or character data is not valid UTF-8.
    InvalidUtf8(Utf8Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingStartMarker(marker) => write!(
                f,
                "no line ending in start marker `{marker}` found in input"
            ),
            Self::MalformedInput(inner, pos) => {
                write!(f, "malformed AST XML at byte {pos}: {inner}")
            }
            Self::Io(e) => e.fmt(f),
            Self::UnbalancedTree(depth) => {
                write!(f, "unbalanced element events at depth {depth}")
            }
        }
    }
}

impl Display for Malformed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Xml(e) => e.fmt(f),
            Self::UnclosedElement(tag) => {
                write!(f, "unexpected end of input; `{tag}` is still open")
            }
            Self::MissingRoot => write!(f, "no root element"),
            Self::ExtraRoot(tag) => {
                write!(f, "element `{tag}` found after the root element")
            }
            Self::TextOutsideRoot(text) => {
                write!(f, "text `{text}` found outside of the root element")
            }
            Self::UnexpectedClose(tag) => {
                write!(f, "end tag `{tag}` does not close any element")
            }
            Self::InvalidUtf8(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MalformedInput(Malformed::Xml(e), _) => Some(e),
            Self::MalformedInput(Malformed::InvalidUtf8(e), _) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl Error {
    /// Translate an error from [`quick_xml`] detected at byte `pos`.
    ///
    /// I/O errors retain their identity so that they are not reported as
    ///   malformed input;
    ///     this includes a missing start marker raised from within
    ///     [`StreamFilter`](crate::filter::StreamFilter).
    pub fn from_xml(e: quick_xml::Error, pos: usize) -> Self {
        match e {
            quick_xml::Error::Io(inner) => Self::from_io_arc(inner),
            e => Self::MalformedInput(Malformed::Xml(e), pos),
        }
    }

    fn from_io_arc(inner: Arc<io::Error>) -> Self {
        match Arc::try_unwrap(inner) {
            Ok(e) => Self::from_filter_io(e),
            Err(shared) => Self::Io(io::Error::new(
                shared.kind(),
                shared.to_string(),
            )),
        }
    }

    /// Recover a typed error smuggled through an [`io::Error`].
    pub(crate) fn from_filter_io(e: io::Error) -> Self {
        let missing = e
            .get_ref()
            .and_then(|inner| inner.downcast_ref::<MissingStartMarker>())
            .map(|m| m.0.clone());

        match missing {
            Some(marker) => Self::MissingStartMarker(marker),
            None => Self::Io(e),
        }
    }

    /// Whether this error was caused by the input rather than by the
    ///   environment.
    pub fn is_data_error(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}

/// [`Error::MissingStartMarker`] in a form that can travel inside of an
///   [`io::Error`] through [`std::io::Read`].
#[derive(Debug)]
pub(crate) struct MissingStartMarker(pub String);

impl Display for MissingStartMarker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "no line ending in start marker `{}` found", self.0)
    }
}

impl std::error::Error for MissingStartMarker {}

impl From<MissingStartMarker> for io::Error {
    fn from(e: MissingStartMarker) -> Self {
        io::Error::new(io::ErrorKind::UnexpectedEof, e)
    }
}
