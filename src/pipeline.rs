// AST to DOT pipeline
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

//! Compose the filter,
//!   reader,
//!   and converter into a single pass from input to DOT output.
//!
//! ```text
//! raw input -> StreamFilter -> TreeReader -> Converter -> DotWriter
//! ```
//!
//! The filter is bypassed for [`InputMode::Plain`] input.

use crate::{
    dot::DotWriter,
    error::Result,
    filter::{FilterConfig, StreamFilter},
    graph::Converter,
    reader::TreeReader,
};
use std::io::{BufRead, Write};
use tracing::debug;


/// What the input contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Only the XML document.
    Plain,
    /// Parser debug output with the XML document between marker lines.
    #[default]
    Filtered,
}

/// Conversion configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub mode: InputMode,
    /// Marker configuration for [`InputMode::Filtered`].
    pub filter: FilterConfig,
}

/// Convert the AST in `src` into a DOT graph written to `dest`.
///
/// `dest` is flushed and returned on success.
/// On failure,
///   `dest` may have received a partial graph that must not be used.
pub fn ast_to_dot<R, W>(src: R, dest: W, config: &Config) -> Result<W>
where
    R: BufRead,
    W: Write,
{
    debug!(mode = ?config.mode, "converting AST to DOT");

    match config.mode {
        InputMode::Plain => convert(src, dest),
        InputMode::Filtered => {
            let mut filter =
                StreamFilter::with_config(src, config.filter.clone());

            filter.seek()?;

            let result = convert(&mut filter, dest);
            filter.close();

            result
        }
    }
}

fn convert<R: BufRead, W: Write>(src: R, dest: W) -> Result<W> {
    let mut dot = DotWriter::new(dest);

    Converter::new().convert(TreeReader::new(src), &mut dot)?;
    dot.flush()?;

    Ok(dot.into_inner())
}
