// AST XML event reader
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

//! Read an AST XML document into a stream of [`TreeEvent`]s.
//!
//! This uses [`quick_xml`] as the parser.
//! [`TreeReader`] is an [`Iterator`] producing events in document order,
//!   which keeps memory use proportional to the depth of the tree rather
//!   than its size.
//!
//! The AST dump uses only a small subset of XML:
//!   elements,
//!   an optional `location` attribute,
//!   and character data.
//! Comments,
//!   processing instructions,
//!   declarations,
//!   and doctypes are skipped;
//!     all other attributes are ignored.
//!
//! Well-formedness is enforced here rather than left to consumers:
//!   mismatched tags,
//!   unclosed elements at EOF,
//!   a missing or repeated root element,
//!   and text outside of the root
//!     all yield [`Error::MalformedInput`].
//! After the first error,
//!   the iterator is exhausted.

use crate::error::{Error, Malformed, Result};
use quick_xml::{
    events::{BytesStart, Event as XmlEvent},
    Reader,
};
use std::{borrow::Cow, io::BufRead, str};
use tracing::trace;


/// Attribute holding the source location of an AST node.
pub const LOCATION_ATTR: &str = "location";

/// A parse event of the AST document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEvent {
    /// Element start,
    ///   with the unescaped value of its `location` attribute.
    ///
    /// Self-closing elements produce [`TreeEvent::Open`] immediately
    ///   followed by [`TreeEvent::Close`].
    Open {
        tag: String,
        location: Option<String>,
    },

    /// Unescaped character data.
    ///
    /// A single run of text may be delivered as multiple events.
    Text(String),

    /// Element end.
    Close { tag: String },
}

/// Parse XML into a [`TreeEvent`] stream.
///
/// [`None`] is returned only at the end of a well-formed document or
///   after an error has been yielded.
pub struct TreeReader<B: BufRead> {
    /// Inner parser.
    reader: Reader<B>,

    /// Buffer for [`quick_xml::Reader`].
    readbuf: Vec<u8>,

    /// Close event of a self-closing element,
    ///   to be yielded after its open event.
    pending_close: Option<String>,

    /// Names of currently open elements,
    ///   innermost last.
    open: Vec<String>,

    seen_root: bool,

    done: bool,
}

impl<B: BufRead> TreeReader<B> {
    pub fn new(src: B) -> Self {
        Self {
            reader: Reader::from_reader(src),
            readbuf: Vec::new(),
            pending_close: None,
            open: Vec::new(),
            seen_root: false,
            done: false,
        }
    }

    /// Current nesting depth.
    #[cfg(test)]
    pub(crate) fn depth(&self) -> usize {
        self.open.len()
    }

    /// Byte offset of the parser within the source.
    fn offset(&self) -> usize {
        self.reader.buffer_position() as usize
    }

    /// Read from the underlying parser until an event is available.
    ///
    /// `Ok(None)` indicates EOF of a well-formed document.
    fn read_next(&mut self) -> Result<Option<TreeEvent>> {
        loop {
            self.readbuf.clear();
            let pos = self.offset();

            let event = self
                .reader
                .read_event_into(&mut self.readbuf)
                .map_err(|e| Error::from_xml(e, pos))
                .and_then(|event| RawEvent::lower(event, pos))?;

            match event {
                RawEvent::Open { tag, location } => {
                    return self.open_element(tag, location, pos).map(Some);
                }

                RawEvent::Empty { tag, location } => {
                    let open = self.open_element(tag.clone(), location, pos)?;

                    self.open.pop();
                    self.pending_close = Some(tag);

                    return Ok(Some(open));
                }

                RawEvent::Close { tag } => {
                    return match self.open.pop() {
                        Some(_) => {
                            trace!(%tag, depth = self.open.len(), "close");
                            Ok(Some(TreeEvent::Close { tag }))
                        }
                        None => Err(malformed(
                            Malformed::UnexpectedClose(tag),
                            pos,
                        )),
                    };
                }

                RawEvent::Text(text) => {
                    if let Some(text) = self.text(text, pos)? {
                        return Ok(Some(text));
                    }
                }

                RawEvent::Skip => (),

                RawEvent::Eof => {
                    let pos = self.offset();

                    return match self.open.last() {
                        Some(tag) => Err(malformed(
                            Malformed::UnclosedElement(tag.clone()),
                            pos,
                        )),
                        None if !self.seen_root => {
                            Err(malformed(Malformed::MissingRoot, pos))
                        }
                        None => Ok(None),
                    };
                }
            }
        }
    }

    fn open_element(
        &mut self,
        tag: String,
        location: Option<String>,
        pos: usize,
    ) -> Result<TreeEvent> {
        if self.open.is_empty() && self.seen_root {
            return Err(malformed(Malformed::ExtraRoot(tag), pos));
        }

        trace!(%tag, depth = self.open.len(), "open");

        self.seen_root = true;
        self.open.push(tag.clone());

        Ok(TreeEvent::Open { tag, location })
    }

    /// Produce a text event unless `text` is insignificant whitespace
    ///   outside of the root element.
    fn text(&self, text: String, pos: usize) -> Result<Option<TreeEvent>> {
        if !self.open.is_empty() {
            return Ok(Some(TreeEvent::Text(text)));
        }

        match text.trim() {
            "" => Ok(None),
            junk => Err(malformed(
                Malformed::TextOutsideRoot(junk.to_string()),
                pos,
            )),
        }
    }
}

impl<B: BufRead> Iterator for TreeReader<B> {
    type Item = Result<TreeEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(tag) = self.pending_close.take() {
            return Some(Ok(TreeEvent::Close { tag }));
        }

        if self.done {
            return None;
        }

        match self.read_next() {
            Ok(Some(event)) => Some(Ok(event)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Owned form of a [`quick_xml`] event,
///   releasing the read buffer.
enum RawEvent {
    Open {
        tag: String,
        location: Option<String>,
    },
    Empty {
        tag: String,
        location: Option<String>,
    },
    Close {
        tag: String,
    },
    Text(String),
    Skip,
    Eof,
}

impl RawEvent {
    fn lower(event: XmlEvent, pos: usize) -> Result<Self> {
        Ok(match event {
            XmlEvent::Start(ele) => {
                let (tag, location) = element_parts(&ele, pos)?;
                Self::Open { tag, location }
            }

            XmlEvent::Empty(ele) => {
                let (tag, location) = element_parts(&ele, pos)?;
                Self::Empty { tag, location }
            }

            XmlEvent::End(ele) => Self::Close {
                tag: utf8(ele.name().as_ref(), pos)?.to_string(),
            },

            XmlEvent::Text(bytes) if bytes.is_empty() => Self::Skip,

            XmlEvent::Text(bytes) => Self::Text(
                bytes
                    .unescape()
                    .map_err(|e| Error::from_xml(e.into(), pos))?
                    .into_owned(),
            ),

            // CDATA is not escaped.
            XmlEvent::CData(bytes) => {
                Self::Text(utf8(&bytes.into_inner(), pos)?.to_string())
            }

            XmlEvent::Comment(..)
            | XmlEvent::Decl(..)
            | XmlEvent::PI(..)
            | XmlEvent::DocType(..) => Self::Skip,

            XmlEvent::Eof => Self::Eof,
        })
    }
}

/// Element name and `location` attribute value.
fn element_parts(
    ele: &BytesStart,
    pos: usize,
) -> Result<(String, Option<String>)> {
    let tag = utf8(ele.name().as_ref(), pos)?.to_string();

    let location = ele
        .try_get_attribute(LOCATION_ATTR)
        .map_err(|e| Error::from_xml(e.into(), pos))?
        .map(|attr| {
            attr.unescape_value()
                .map(Cow::into_owned)
                .map_err(|e| Error::from_xml(e.into(), pos))
        })
        .transpose()?;

    Ok((tag, location))
}

fn utf8(bytes: &[u8], pos: usize) -> Result<&str> {
    str::from_utf8(bytes).map_err(|e| malformed(Malformed::InvalidUtf8(e), pos))
}

fn malformed(kind: Malformed, pos: usize) -> Error {
    Error::MalformedInput(kind, pos)
}
