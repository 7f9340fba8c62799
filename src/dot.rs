// Graphviz DOT writer
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

//! Incremental Graphviz DOT writer.
//!
//! [`DotWriter`] writes each statement as soon as it is requested;
//!   no part of the graph is retained,
//!     and so memory use does not grow with the size of the graph.
//! Its only state is the current indentation level.
//!
//! Attribute values are written verbatim.
//! Use [`quote`] to produce a string value that is safe to write.

use std::{
    fmt::Display,
    io::{self, Write},
};

#[cfg(test)]
mod test;

/// Ordered `key=value` attribute list for a node or edge.
pub type Attrs<'a> = [(&'a str, &'a str)];

/// Write DOT statements to a sink,
///   one per line.
///
/// Output order is exactly call order.
/// It is the caller's responsibility to pair [`start_graph`] with
///   [`end_graph`].
///
/// [`start_graph`]: DotWriter::start_graph
/// [`end_graph`]: DotWriter::end_graph
pub struct DotWriter<W: Write> {
    sink: W,
    indent: usize,
}

impl<W: Write> DotWriter<W> {
    pub fn new(sink: W) -> Self {
        Self { sink, indent: 0 }
    }

    /// Begin a directed graph named `name` and indent its body.
    pub fn start_graph(&mut self, name: &str) -> io::Result<()> {
        self.write_indent()?;
        writeln!(self.sink, "digraph {name} {{")?;
        self.indent += 1;

        Ok(())
    }

    /// Close the graph opened by [`DotWriter::start_graph`].
    pub fn end_graph(&mut self) -> io::Result<()> {
        self.indent = self.indent.saturating_sub(1);
        self.write_indent()?;
        writeln!(self.sink, "}}")
    }

    pub fn declare_node(
        &mut self,
        id: impl Display,
        attrs: &Attrs,
    ) -> io::Result<()> {
        self.write_indent()?;
        write!(self.sink, "{id}")?;
        self.write_attrs_and_lf(attrs)
    }

    pub fn put_edge(
        &mut self,
        from: impl Display,
        to: impl Display,
        attrs: &Attrs,
    ) -> io::Result<()> {
        self.write_indent()?;
        write!(self.sink, "{from} -> {to}")?;
        self.write_attrs_and_lf(attrs)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    fn write_indent(&mut self) -> io::Result<()> {
        for _ in 0..self.indent {
            self.sink.write_all(b"\t")?;
        }

        Ok(())
    }

    fn write_attrs_and_lf(&mut self, attrs: &Attrs) -> io::Result<()> {
        if let Some(((key, value), rest)) = attrs.split_first() {
            write!(self.sink, " [{key}={value}")?;

            for (key, value) in rest {
                write!(self.sink, " {key}={value}")?;
            }

            self.sink.write_all(b"]")?;
        }

        self.sink.write_all(b"\n")
    }
}

/// Produce a double-quoted DOT string containing `s`.
///
/// Quotes and backslashes are escaped and newlines become the DOT line
///   break `\n`.
/// Carriage returns and other control characters are dropped,
///   since DOT has no escape for them;
///     tabs are retained.
/// All other characters,
///   including non-ASCII,
///   are written unchanged
///     (DOT input is UTF-8).
pub fn quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');

    for c in s.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push('\t'),
            c if c.is_control() => (),
            c => quoted.push(c),
        }
    }

    quoted.push('"');
    quoted
}
